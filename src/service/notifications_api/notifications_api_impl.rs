use super::{NotificationsApi, NotificationsApiConfig};
use crate::{
    dto::{input, output},
    error::Error,
};
use async_trait::async_trait;
use reqwest::{Client, Response};

pub struct NotificationsApiImpl {
    base_url: String,
    client: Client,
}

impl NotificationsApiImpl {
    pub fn new(config: NotificationsApiConfig) -> Result<Self, Error> {
        let client = Client::builder()
            .timeout(config.request_timeout)
            .build()?;
        let base_url = config.base_url.trim_end_matches('/').to_string();

        Ok(Self { base_url, client })
    }

    fn notifications_url(&self) -> String {
        format!("{}/api/notifications", self.base_url)
    }

    fn notification_url(&self, id: &str) -> String {
        format!(
            "{}/api/notifications/{}",
            self.base_url,
            urlencoding::encode(id)
        )
    }

    fn ensure_success(response: Response) -> Result<Response, Error> {
        let status = response.status();
        if !status.is_success() {
            return Err(Error::ResponseStatus(status));
        }

        Ok(response)
    }
}

#[async_trait]
impl NotificationsApi for NotificationsApiImpl {
    async fn fetch_notifications(
        &self,
        access_token: &str,
    ) -> Result<Vec<input::Notification>, Error> {
        tracing::debug!("fetching notifications");

        let response = self
            .client
            .get(self.notifications_url())
            .bearer_auth(access_token)
            .send()
            .await?;
        let notifications = Self::ensure_success(response)?
            .json::<Vec<input::Notification>>()
            .await?;

        tracing::debug!(count = notifications.len(), "fetched notifications");

        Ok(notifications)
    }

    async fn mark_as_read(&self, access_token: &str, id: &str) -> Result<(), Error> {
        tracing::debug!(id, "marking notification as read");

        let response = self
            .client
            .patch(self.notification_url(id))
            .bearer_auth(access_token)
            .json(&output::NotificationReadUpdate { read: true })
            .send()
            .await?;
        Self::ensure_success(response)?;

        tracing::debug!(id, "marked notification as read");

        Ok(())
    }
}
