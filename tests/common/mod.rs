use jwt_auth::{test::create_jwt, JwtDecoder};
use serde_json::{json, Value};
use std::{sync::Arc, sync::Once, time::Duration};
use tom_notifier_bell::{
    service::{
        notifications_api::{NotificationsApiConfig, NotificationsApiImpl},
        notifications_widget::NotificationsWidget,
    },
    session::SessionProvider,
};
use uuid::Uuid;
use wiremock::MockServer;

pub const JWT_ALGORITHMS: &str = "HS256";
pub const JWT_KEY: &str = "tom-notifier-bell-test-secret";

static INIT_TRACING_ONCE: Once = Once::new();

pub fn init_tracing() {
    INIT_TRACING_ONCE.call_once(|| {
        let _ = tracing_subscriber::fmt().with_test_writer().try_init();
    });
}

pub fn create_token() -> String {
    create_jwt(
        Uuid::new_v4(),
        JWT_ALGORITHMS.to_string(),
        JWT_KEY.to_string(),
    )
}

pub fn create_session_provider() -> SessionProvider {
    let decoder = JwtDecoder::parse(JWT_ALGORITHMS.to_string(), JWT_KEY.to_string()).unwrap();

    SessionProvider::new(decoder)
}

pub fn create_widget(server: &MockServer) -> NotificationsWidget {
    let config = NotificationsApiConfig {
        base_url: server.uri(),
        request_timeout: Duration::from_secs(2),
    };
    let api = NotificationsApiImpl::new(config).unwrap();

    NotificationsWidget::new(Arc::new(api))
}

///
/// Signs in with a fresh token and runs the session effect
///
/// ### Returns
/// access token of the signed in user
///
pub async fn sign_in(session_provider: &SessionProvider, widget: &NotificationsWidget) -> String {
    let token = create_token();
    session_provider.sign_in(token.clone()).unwrap();
    widget.on_session_change(session_provider.current()).await;

    token
}

pub fn bearer(token: &str) -> String {
    format!("Bearer {token}")
}

pub fn notification_json(id: &str, notification_type: &str, read: bool) -> Value {
    json!({
        "id": id,
        "type": notification_type,
        "title": format!("title {id}"),
        "message": format!("message {id}"),
        "read": read,
        "relatedId": null,
        "relatedType": null,
        "createdAt": "2024-05-01T10:15:00.000Z",
    })
}

pub fn scenario_json() -> Value {
    json!([
        notification_json("1", "bounty_created", false),
        notification_json("2", "payment_received", true),
    ])
}
