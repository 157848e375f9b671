//! Object storage for transform results.
//!
//! This crate provides:
//! - The [`ObjectStore`] seam with an R2/S3 implementation and an in-memory one
//! - Public URL publishing with per-segment key encoding
//! - Content type inference from key extensions

pub mod client;
pub mod content_type;
pub mod error;
pub mod publish;
pub mod store;

pub use client::{R2Client, R2Config};
pub use content_type::{content_type_for, DEFAULT_CONTENT_TYPE};
pub use error::{StorageError, StorageResult};
pub use publish::{encode_key_path, PublicUrl, Publisher};
pub use store::{MemoryStore, ObjectInfo, ObjectStore};
