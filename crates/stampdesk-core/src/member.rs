//! # Member Records and Point Arithmetic Boundaries
//!
//! [`MemberRecord`] is the entity currently on screen. [`Points`] is a
//! non-negative balance as reported by the server, and [`PointDelta`] is the
//! signed, non-zero adjustment staff may request.
//!
//! The remote service is authoritative on balance rules (e.g. a burn that
//! would go negative), so none of these types validate a delta against a
//! balance.

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::identity::{MemberId, ProgramId, StaffId};

/// A member's point (stamp) balance.
///
/// Deserializes from a JSON integer. Negative or fractional numbers fail to
/// deserialize rather than being clamped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Points(u64);

impl Points {
    /// Wrap a raw balance.
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    /// The raw balance.
    pub const fn value(self) -> u64 {
        self.0
    }
}

impl From<u64> for Points {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

impl std::fmt::Display for Points {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A signed, non-zero point adjustment.
///
/// Staff controls only ever issue [`PointDelta::ADD_ONE`] and
/// [`PointDelta::REMOVE_ONE`]; other magnitudes are accepted for callers
/// that need them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PointDelta(i64);

impl PointDelta {
    /// Add one stamp.
    pub const ADD_ONE: PointDelta = PointDelta(1);

    /// Remove (burn) one stamp.
    pub const REMOVE_ONE: PointDelta = PointDelta(-1);

    /// Create a delta.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::ZeroDelta`] for `0`.
    pub fn new(value: i64) -> Result<Self, ValidationError> {
        if value == 0 {
            return Err(ValidationError::ZeroDelta);
        }
        Ok(Self(value))
    }

    /// The signed value.
    pub const fn value(self) -> i64 {
        self.0
    }

    /// Whether this delta adds points.
    pub const fn is_credit(self) -> bool {
        self.0 > 0
    }

    /// The unsigned magnitude sent on the wire.
    pub const fn magnitude(self) -> u64 {
        self.0.unsigned_abs()
    }
}

impl std::fmt::Display for PointDelta {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:+}", self.0)
    }
}

/// The member currently displayed to staff.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberRecord {
    /// Member identifier resolved from the scanned code.
    pub member_id: MemberId,
    /// Program the member belongs to.
    pub program_id: ProgramId,
    /// Authoritative balance from the last server response.
    pub points: Points,
}

impl MemberRecord {
    /// Build a record from a successful lookup.
    pub fn new(member_id: MemberId, program_id: ProgramId, points: Points) -> Self {
        Self {
            member_id,
            program_id,
            points,
        }
    }

    /// Build the replacement record for a confirmed mutation.
    ///
    /// The mutation response carries `memberId` and `points` but not the
    /// program, which is carried over from the record the request targeted.
    pub fn confirmed(&self, member_id: MemberId, points: Points) -> Self {
        Self {
            member_id,
            program_id: self.program_id.clone(),
            points,
        }
    }
}

/// Profile of the staff member who logged in.
///
/// Every field other than `id` is display-only and defaults to empty when
/// the service omits it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StaffProfile {
    /// Staff account identifier.
    pub id: StaffId,
    /// Display name.
    #[serde(default)]
    pub name: String,
    /// Contact phone number.
    #[serde(default)]
    pub phone: String,
    /// Business the staff member works for.
    #[serde(default)]
    pub business_name: String,
}
