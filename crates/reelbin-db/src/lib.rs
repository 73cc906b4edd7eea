//! Database access for the reelbin catalog.

pub mod videos;

pub use videos::{NewVideo, VideoRepository};

/// Embedded migrations, applied at API startup.
pub static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!();
