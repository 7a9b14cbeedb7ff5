mod dto;
mod notifications_widget;

pub use dto::{MarkAllAsReadReport, WidgetSnapshot};
pub use notifications_widget::*;
