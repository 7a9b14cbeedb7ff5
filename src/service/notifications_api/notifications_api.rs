use crate::{dto::input, error::Error};
use async_trait::async_trait;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait NotificationsApi: Send + Sync {
    ///
    /// Fetch all notifications of the user that owns the access token.
    ///
    /// ### Returns
    /// Notifications in the order the server returned them
    ///
    /// ### Errors
    /// - [Error::ResponseStatus] when the server responds with non-success status
    /// - [Error::Http] when
    ///     - request could not be sent or timed out
    ///     - response body is not a valid list of notifications
    ///
    async fn fetch_notifications(&self, access_token: &str)
        -> Result<Vec<input::Notification>, Error>;

    ///
    /// Mark single notification as read.
    ///
    /// ### Errors
    /// - [Error::ResponseStatus] when the server responds with non-success status
    /// - [Error::Http] when request could not be sent or timed out
    ///
    async fn mark_as_read(&self, access_token: &str, id: &str) -> Result<(), Error>;
}
