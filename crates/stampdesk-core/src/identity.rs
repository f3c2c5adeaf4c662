//! # Identity Newtypes
//!
//! Identifiers handed out by the remote loyalty service. Each is a distinct
//! type: you cannot pass a [`ProgramId`] where a [`MemberId`] is expected.
//!
//! ## Validation
//!
//! The service owns the identifier formats, so the client treats them as
//! opaque strings. The only rule enforced at construction (and during
//! deserialization) is that the value is non-empty after trimming: a lookup
//! response with a blank `memberId` is a malformed response, not a member.

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

fn non_empty(value: String, kind: &'static str) -> Result<String, ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::EmptyIdentifier { kind });
    }
    Ok(value)
}

/// Identifier of a loyalty member, as resolved from a scanned code.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct MemberId(String);

impl MemberId {
    /// Create a member identifier.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::EmptyIdentifier`] for blank input.
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        non_empty(value.into(), "member ID").map(Self)
    }

    /// Access the identifier string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for MemberId {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<MemberId> for String {
    fn from(id: MemberId) -> Self {
        id.0
    }
}

impl std::fmt::Display for MemberId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier of the loyalty program a member belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ProgramId(String);

impl ProgramId {
    /// Create a program identifier.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::EmptyIdentifier`] for blank input.
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        non_empty(value.into(), "program ID").map(Self)
    }

    /// Access the identifier string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for ProgramId {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<ProgramId> for String {
    fn from(id: ProgramId) -> Self {
        id.0
    }
}

impl std::fmt::Display for ProgramId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier of the authenticated staff account.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct StaffId(String);

impl StaffId {
    /// Create a staff identifier.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::EmptyIdentifier`] for blank input.
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        non_empty(value.into(), "staff ID").map(Self)
    }

    /// Access the identifier string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for StaffId {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<StaffId> for String {
    fn from(id: StaffId) -> Self {
        id.0
    }
}

impl std::fmt::Display for StaffId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn member_id_accepts_opaque_values() {
        let id = MemberId::new("3hG7kPq").unwrap();
        assert_eq!(id.as_str(), "3hG7kPq");
        assert_eq!(id.to_string(), "3hG7kPq");
    }

    #[test]
    fn member_id_rejects_blank() {
        assert_eq!(
            MemberId::new("   ").unwrap_err(),
            ValidationError::EmptyIdentifier { kind: "member ID" }
        );
        assert!(MemberId::new("").is_err());
    }

    #[test]
    fn program_id_rejects_blank() {
        assert!(matches!(
            ProgramId::new(""),
            Err(ValidationError::EmptyIdentifier { kind: "program ID" })
        ));
    }

    #[test]
    fn staff_id_display() {
        assert_eq!(StaffId::new("staff-1").unwrap().to_string(), "staff-1");
    }

    #[test]
    fn serde_is_transparent() {
        let id = ProgramId::new("P1").unwrap();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"P1\"");
        let back: ProgramId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }

    #[test]
    fn deserialization_rejects_empty_member_id() {
        let result: Result<MemberId, _> = serde_json::from_str("\"\"");
        assert!(result.is_err());
    }
}
