mod notification;
mod notification_type;

pub use notification::*;
pub use notification_type::*;
