//! Validation modules

pub mod duration;
pub mod media;

pub use duration::{format_duration, is_valid_duration};
pub use media::{MediaValidator, ValidationError};
