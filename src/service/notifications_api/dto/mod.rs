mod notifications_api_config;

pub use notifications_api_config::*;
