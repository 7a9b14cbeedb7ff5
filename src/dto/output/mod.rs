mod notification_read_update;

pub use notification_read_update::*;
