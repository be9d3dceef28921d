//! Objstamp Core Library
//!
//! Core types, configuration, and metadata rules for the Objstamp
//! object-finalize webhook.

pub mod config;
pub mod decode;
pub mod error;
pub mod rules;
pub mod types;
pub mod utils;

pub use config::ObjstampConfig;
pub use error::{Error, Result};
pub use rules::Profile;

/// Objstamp version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Event type that triggers a metadata update
pub const OBJECT_FINALIZE: &str = "OBJECT_FINALIZE";

/// Default GCS JSON API endpoint
pub const DEFAULT_GCS_ENDPOINT: &str = "https://storage.googleapis.com";

/// Fallback content type for unknown extensions
pub const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";
