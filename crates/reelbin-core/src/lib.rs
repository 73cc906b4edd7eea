//! Core types shared across the reelbin workspace: configuration, error
//! types, domain models, and validation helpers.

pub mod config;
pub mod error;
pub mod models;
pub mod validation;

pub use config::Config;
pub use error::{AppError, ErrorMetadata, LogLevel};
