//! Core business logic for menlog.

pub mod services;

pub use services::*;
