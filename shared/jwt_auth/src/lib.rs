pub mod dto;
pub mod error;
pub mod util;

mod jwt_decoder;

pub use jwt_decoder::*;
