mod dto;
mod notifications_api;
mod notifications_api_impl;

pub use dto::NotificationsApiConfig;
pub use notifications_api::*;
pub use notifications_api_impl::*;
