//! Media storage for uploaded files.
//!
//! Uploads are streamed chunk by chunk into `{media_root}/{subdir}/` under a
//! random name and exposed at `/{url_prefix}/{subdir}/{name}`.
//!
//! ```text
//!   upload stream ──► MediaStorage::save ──► {root}/users/3f2a…9c.png
//!                            │
//!                            └──► "/uploads/users/3f2a…9c.png"  (persisted by caller)
//! ```
//!
//! The original filename only contributes its (lower-cased) extension, so a
//! client cannot choose where a file lands or overwrite an existing one.

mod config;
mod error;
mod naming;
mod service;

pub use config::StorageConfig;
pub use error::StorageError;
pub use service::{MediaStorage, StoredAsset};
