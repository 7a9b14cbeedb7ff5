use std::time::Duration;

pub struct NotificationsApiConfig {
    /// Scheme and authority of the API, e.g. `http://localhost:3000`
    pub base_url: String,
    pub request_timeout: Duration,
}
