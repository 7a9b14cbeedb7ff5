mod notifications_view;

pub use notifications_view::*;
