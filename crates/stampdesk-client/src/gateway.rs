//! # Stamp Gateway
//!
//! The typed request/response boundary to the remote stamp service.
//!
//! ## Contract
//!
//! | Operation | Success | Failure |
//! |-----------|---------|---------|
//! | [`StampGateway::login`] | [`LoginResponse`], token stored in the session | [`GatewayError::Auth`] |
//! | [`StampGateway::lookup_member_by_code`] | [`MemberRecord`] | [`GatewayError::Lookup`] |
//! | [`StampGateway::adjust_points`] | [`PointsUpdate`] | [`GatewayError::Mutation`] |
//!
//! Any call may also fail with [`GatewayError::Transport`], and a 401/403
//! from any endpoint surfaces as [`GatewayError::Auth`].
//!
//! The remote is authoritative on balance rules. Implementations do not
//! check a delta against the current balance.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use stampdesk_core::{MemberId, MemberRecord, PointDelta, Points, ProgramId, StaffProfile};

use crate::error::GatewayError;
use crate::session::BearerToken;

/// Result of a successful login. The token has already been handed to the
/// session manager by the time this is returned.
#[derive(Debug, Clone)]
pub struct LoginResponse {
    /// The issued bearer token.
    pub token: BearerToken,
    /// The authenticated staff member, when the service sent a usable
    /// profile. Only the token is required for a successful login.
    pub staff: Option<StaffProfile>,
}

/// Authoritative result of a point adjustment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PointsUpdate {
    /// Member the service applied the adjustment to.
    pub member_id: MemberId,
    /// Resulting balance.
    pub points: Points,
    /// Tier points, when the program tracks them.
    #[serde(default)]
    pub tier_points: Option<u64>,
    /// Secondary points, when the program tracks them.
    #[serde(default)]
    pub secondary_points: Option<u64>,
}

/// Adapter trait for the remote stamp service.
///
/// Implementations must be `Send + Sync` so they can be shared across
/// async tasks behind an `Arc`. The trait is object-safe to support
/// runtime selection (live vs. mock).
#[async_trait]
pub trait StampGateway: Send + Sync {
    /// Authenticate staff and store the issued token in the session.
    ///
    /// Blank identifier or password fails with [`GatewayError::Auth`]
    /// before any request is made.
    async fn login(&self, identifier: &str, password: &str) -> Result<LoginResponse, GatewayError>;

    /// Resolve a decoded scan payload to a member record. The payload is
    /// passed through uninterpreted.
    async fn lookup_member_by_code(&self, payload: &str) -> Result<MemberRecord, GatewayError>;

    /// Apply a signed point adjustment and return the resulting balance.
    async fn adjust_points(
        &self,
        program_id: &ProgramId,
        member_id: &MemberId,
        delta: PointDelta,
    ) -> Result<PointsUpdate, GatewayError>;

    /// Human-readable name of this implementation (e.g. "HttpGateway").
    fn gateway_name(&self) -> &str;
}

/// Trim and check login credentials. Runs before any network call.
pub fn validate_credentials(
    identifier: &str,
    password: &str,
) -> Result<(String, String), GatewayError> {
    let identifier = identifier.trim();
    if identifier.is_empty() {
        return Err(GatewayError::auth("Please provide email or username."));
    }
    let password = password.trim();
    if password.is_empty() {
        return Err(GatewayError::auth("Please provide password."));
    }
    Ok((identifier.to_string(), password.to_string()))
}
