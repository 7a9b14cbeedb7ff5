use serde::Serialize;

///
/// Body of `PATCH /api/notifications/{id}`
///
#[derive(Debug, Serialize)]
pub struct NotificationReadUpdate {
    pub read: bool,
}
