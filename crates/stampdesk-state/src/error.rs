//! # Flow Errors
//!
//! [`FlowError`] is what the presentation layer sees. Gateway failures pass
//! through unchanged so their user message survives; guard rejections
//! (`Busy`, `NoMember`, `InvalidTransition`) are local and never reach the
//! network. [`FlowError::kind`] folds everything onto the five error
//! categories staff can act on.

use thiserror::Error;

use stampdesk_client::GatewayError;
use stampdesk_core::ValidationError;

/// Message shown when the camera may not be used.
pub const PERMISSION_MESSAGE: &str =
    "Camera permission needed: please allow camera to scan QR codes.";

/// Errors surfaced by [`crate::ScanFlow`] operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FlowError {
    /// Camera permission was not granted.
    #[error("{}", PERMISSION_MESSAGE)]
    PermissionDenied,

    /// A request is already outstanding; the command was ignored.
    #[error("{machine} is busy ({state}); wait for the current request to finish")]
    Busy {
        /// Which machine rejected the command ("scanner" or "member session").
        machine: &'static str,
        /// State it was in.
        state: &'static str,
    },

    /// A point adjustment was requested with no member on screen.
    #[error("no member loaded; scan a member code first")]
    NoMember,

    /// The command does not apply in the current state.
    #[error("invalid {machine} transition: cannot {action} from {from}")]
    InvalidTransition {
        /// Which machine rejected the command.
        machine: &'static str,
        /// State it was in.
        from: &'static str,
        /// The attempted action.
        action: &'static str,
    },

    /// The stamp service call failed.
    #[error(transparent)]
    Gateway(#[from] GatewayError),

    /// A command argument was invalid.
    #[error(transparent)]
    Validation(#[from] ValidationError),
}

/// Error categories surfaced to staff.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Camera permission denied.
    PermissionDenied,
    /// Login failed or the service refused the session.
    Auth,
    /// Member not found or the lookup response was unusable.
    Lookup,
    /// A point adjustment was rejected.
    Mutation,
    /// The service could not be reached.
    Transport,
    /// Rejected locally by a state guard; nothing was sent.
    Rejected,
}

impl ErrorKind {
    /// Stable lowercase name, for logs and the console front-end.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PermissionDenied => "permission_denied",
            Self::Auth => "auth",
            Self::Lookup => "lookup",
            Self::Mutation => "mutation",
            Self::Transport => "transport",
            Self::Rejected => "rejected",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FlowError {
    /// The category of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::PermissionDenied => ErrorKind::PermissionDenied,
            Self::Gateway(GatewayError::Auth { .. }) => ErrorKind::Auth,
            Self::Gateway(GatewayError::Lookup { .. }) => ErrorKind::Lookup,
            Self::Gateway(GatewayError::Mutation { .. }) => ErrorKind::Mutation,
            Self::Gateway(GatewayError::Transport { .. } | GatewayError::Config(_)) => {
                ErrorKind::Transport
            }
            Self::Busy { .. }
            | Self::NoMember
            | Self::InvalidTransition { .. }
            | Self::Validation(_) => ErrorKind::Rejected,
        }
    }

    /// The message to show staff.
    pub fn user_message(&self) -> String {
        self.to_string()
    }
}
