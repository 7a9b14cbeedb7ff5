use super::WidgetSnapshot;
use crate::{dto::input, session::Session};

pub struct WidgetState {
    pub notifications: Vec<input::Notification>,
    pub loading: bool,
    pub show_notifications: bool,
    pub unread_count: usize,

    pub session: Session,

    /// Incremented on every session change.
    /// Responses dispatched under older generation are discarded.
    pub generation: u64,
}

impl WidgetState {
    pub fn new() -> Self {
        Self {
            notifications: Vec::new(),
            loading: true,
            show_notifications: false,
            unread_count: 0,
            session: Session::anonymous(),
            generation: 0,
        }
    }

    pub fn reset(&mut self) {
        self.notifications.clear();
        self.loading = true;
        self.show_notifications = false;
        self.unread_count = 0;
    }

    pub fn replace_notifications(&mut self, notifications: Vec<input::Notification>) {
        self.unread_count = notifications
            .iter()
            .filter(|notification| !notification.read)
            .count();
        self.notifications = notifications;
    }

    ///
    /// Returns true when the notification went from unread to read
    ///
    pub fn mark_read(&mut self, id: &str) -> bool {
        let Some(notification) = self
            .notifications
            .iter_mut()
            .find(|notification| notification.id == id)
        else {
            return false;
        };

        if notification.read {
            return false;
        }

        notification.read = true;
        self.unread_count = self.unread_count.saturating_sub(1);

        true
    }

    pub fn unread_ids(&self) -> Vec<String> {
        self.notifications
            .iter()
            .filter(|notification| !notification.read)
            .map(|notification| notification.id.clone())
            .collect()
    }

    pub fn snapshot(&self) -> WidgetSnapshot {
        WidgetSnapshot {
            notifications: self.notifications.clone(),
            loading: self.loading,
            show_notifications: self.show_notifications,
            unread_count: self.unread_count,
        }
    }
}
