pub mod notifications_api;
pub mod notifications_widget;
