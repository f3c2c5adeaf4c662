//! Stamp service client error types.
//!
//! Each variant carries the one human-readable message that is shown to
//! staff. Raw `reqwest` and `serde_json` failures never escape this crate.

/// Message used whenever a response body cannot be decoded.
pub const PARSE_FAILURE: &str = "Unable to parse server response.";

/// Errors from stamp service calls.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GatewayError {
    /// Login rejected, credentials missing, or the service answered 401/403.
    #[error("{message}")]
    Auth {
        /// HTTP status, if the error came from the service.
        status: Option<u16>,
        message: String,
    },
    /// Member not found, or the lookup response was unusable.
    #[error("{message}")]
    Lookup {
        /// HTTP status, if the error came from the service.
        status: Option<u16>,
        message: String,
    },
    /// The service rejected a point adjustment, or its response was unusable.
    #[error("{message}")]
    Mutation {
        /// HTTP status, if the error came from the service.
        status: Option<u16>,
        message: String,
    },
    /// The service could not be reached or the request timed out.
    #[error("{message}")]
    Transport {
        /// Operation that failed, e.g. `POST auth/login`.
        endpoint: String,
        message: String,
    },
    /// The client could not be configured.
    #[error("configuration error: {0}")]
    Config(String),
}

impl GatewayError {
    /// Local authentication failure raised before any network call.
    pub fn auth(message: impl Into<String>) -> Self {
        Self::Auth {
            status: None,
            message: message.into(),
        }
    }

    /// Local lookup failure (e.g. `success: false`).
    pub fn lookup(message: impl Into<String>) -> Self {
        Self::Lookup {
            status: None,
            message: message.into(),
        }
    }

    /// Local mutation failure (e.g. `success: false`).
    pub fn mutation(message: impl Into<String>) -> Self {
        Self::Mutation {
            status: None,
            message: message.into(),
        }
    }

    /// The message to surface to staff.
    pub fn user_message(&self) -> String {
        self.to_string()
    }

    /// HTTP status reported by the service, when there was one.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Auth { status, .. } | Self::Lookup { status, .. } | Self::Mutation { status, .. } => {
                *status
            }
            Self::Transport { .. } | Self::Config(_) => None,
        }
    }
}

impl From<crate::config::ConfigError> for GatewayError {
    fn from(err: crate::config::ConfigError) -> Self {
        Self::Config(err.to_string())
    }
}
