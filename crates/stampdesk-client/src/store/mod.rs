//! # Credential Stores
//!
//! A minimal key/value byte-store contract used by [`crate::SessionManager`]
//! to persist the bearer token between process runs.
//!
//! ## Implementations
//!
//! - [`MemoryCredentialStore`]: process-local, for tests and as a fallback.
//! - [`FileCredentialStore`]: a JSON object file on disk.
//! - [`FallbackCredentialStore`]: routes to a primary store and falls back
//!   to a secondary one when the primary is unavailable.
//!
//! Callers treat every [`StoreError`] as non-fatal: a failed read means
//! "no saved session", a failed write means the session will not survive
//! a restart.

mod fallback;
mod file;
mod memory;

pub use fallback::FallbackCredentialStore;
pub use file::FileCredentialStore;
pub use memory::MemoryCredentialStore;

use std::fmt::Debug;
use std::path::PathBuf;

use async_trait::async_trait;

/// Errors from a credential store backend.
#[derive(thiserror::Error, Debug)]
pub enum StoreError {
    /// The backing file could not be read or written.
    #[error("credential store I/O error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The backing file exists but is not a JSON object of strings.
    #[error("credential store at {} is corrupt: {reason}", path.display())]
    Corrupt { path: PathBuf, reason: String },

    /// The backend is not available on this platform or right now.
    #[error("credential store unavailable: {0}")]
    Unavailable(String),
}

/// Key/value contract for persisted credentials.
///
/// Implementations must be `Send + Sync` so they can be shared behind an
/// `Arc`. The trait is object-safe so the backend can be chosen at runtime.
#[async_trait]
pub trait CredentialStore: Send + Sync + Debug {
    /// Read the value stored at `key`, or `None` if absent.
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Store `value` at `key`, replacing any existing value.
    async fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;

    /// Remove `key`. Removing an absent key is not an error.
    async fn remove(&self, key: &str) -> Result<(), StoreError>;

    /// Human-readable name of this backend, for logs.
    fn store_name(&self) -> &str;
}
