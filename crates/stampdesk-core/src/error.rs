//! # Validation Errors
//!
//! Raised when a domain primitive is constructed from a value it cannot
//! represent. Built with `thiserror`; no `.unwrap()` outside tests.

use thiserror::Error;

/// Domain primitive validation failure.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// An identifier was empty or whitespace only.
    #[error("invalid {kind}: must be non-empty")]
    EmptyIdentifier {
        /// Which identifier was being built (e.g. "member ID").
        kind: &'static str,
    },

    /// A point adjustment of zero was requested.
    #[error("invalid point delta: must be non-zero")]
    ZeroDelta,
}
