mod mark_all_as_read_report;
mod widget_snapshot;
mod widget_state;

pub use mark_all_as_read_report::*;
pub use widget_snapshot::*;
pub use widget_state::*;
