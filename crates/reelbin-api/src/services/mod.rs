//! Clients for the external providers the catalog delegates to.

pub mod cdn;
pub mod host;

pub use cdn::ImageCdnClient;
pub use host::VideoHostClient;
