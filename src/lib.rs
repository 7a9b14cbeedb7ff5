pub mod application;
pub mod dto;
pub mod error;
pub mod service;
pub mod session;
pub mod view;
