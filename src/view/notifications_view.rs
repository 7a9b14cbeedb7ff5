use crate::{dto::input, service::notifications_widget::WidgetSnapshot};
use std::fmt::Write;
use time::macros::format_description;

const BELL: &str = "🔔";
const MAX_BADGE_COUNT: usize = 9;

pub fn render(snapshot: &WidgetSnapshot) -> String {
    let mut view = String::new();

    view.push_str(BELL);
    if let Some(badge) = badge(snapshot.unread_count) {
        let _ = write!(view, " ({badge})");
    }
    view.push('\n');

    if !snapshot.show_notifications {
        return view;
    }

    view.push_str("Notifications");
    if snapshot.unread_count > 0 {
        view.push_str("  [read-all] mark all as read");
    }
    view.push('\n');

    if snapshot.loading {
        view.push_str("  Loading...\n");
    } else if snapshot.notifications.is_empty() {
        view.push_str("  No notifications yet\n");
    } else {
        for notification in &snapshot.notifications {
            render_notification(&mut view, notification);
        }
    }

    view
}

fn badge(unread_count: usize) -> Option<String> {
    match unread_count {
        0 => None,
        count if count > MAX_BADGE_COUNT => Some(format!("{MAX_BADGE_COUNT}+")),
        count => Some(count.to_string()),
    }
}

fn render_notification(view: &mut String, notification: &input::Notification) {
    let presentation = notification.notification_type.presentation();
    let marker = if notification.read { ' ' } else { '•' };
    let created_at = notification
        .created_at
        .format(format_description!("[year]-[month]-[day] [hour]:[minute]"))
        .unwrap_or_else(|_| notification.created_at.to_string());

    let _ = writeln!(
        view,
        "{marker} {glyph} [{color}] {title} [click {id}]\n    {message}\n    {created_at}",
        glyph = presentation.glyph,
        color = presentation.color,
        title = notification.title,
        id = notification.id,
        message = notification.message,
    );
}
