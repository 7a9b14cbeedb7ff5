mod session;
mod session_provider;

pub use session::*;
pub use session_provider::*;
