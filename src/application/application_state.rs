use super::ApplicationEnv;
use crate::{
    service::{
        notifications_api::{NotificationsApiConfig, NotificationsApiImpl},
        notifications_widget::NotificationsWidget,
    },
    session::SessionProvider,
};
use jwt_auth::JwtDecoder;
use std::{sync::Arc, time::Duration};

pub struct ApplicationState {
    pub session_provider: Arc<SessionProvider>,
    pub widget: NotificationsWidget,
    pub refresh_interval: Duration,
}

pub fn create_state(env: &ApplicationEnv) -> anyhow::Result<ApplicationState> {
    tracing::info!("creating session provider");
    let decoder = JwtDecoder::new(env.jwt_algorithms.clone(), env.jwt_key.clone())?;
    let session_provider = SessionProvider::new(decoder);
    if let Some(session_token) = &env.session_token {
        if let Err(err) = session_provider.sign_in(session_token.clone()) {
            tracing::warn!(%err, "startup session token rejected, staying signed out");
        }
    }
    let session_provider = Arc::new(session_provider);

    tracing::info!("creating services");
    let config = NotificationsApiConfig {
        base_url: env.api_base_url.clone(),
        request_timeout: env.api_request_timeout,
    };
    let notifications_api = NotificationsApiImpl::new(config)?;
    let notifications_api = Arc::new(notifications_api);

    let widget = NotificationsWidget::new(notifications_api);

    Ok(ApplicationState {
        session_provider,
        widget,
        refresh_interval: env.refresh_interval,
    })
}
