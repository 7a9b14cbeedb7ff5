use crate::dto::input;

#[derive(Debug, Clone, PartialEq)]
pub struct WidgetSnapshot {
    pub notifications: Vec<input::Notification>,
    pub loading: bool,
    pub show_notifications: bool,
    pub unread_count: usize,
}
