#![deny(missing_docs)]

//! # stampdesk-core — Foundational Types for the Stamp Scanner
//!
//! This crate defines the types every other crate in the workspace shares.
//! It has no internal crate dependencies, only `serde` and `thiserror`.
//!
//! ## Design Principles
//!
//! 1. **Newtype wrappers for identifiers.** A [`MemberId`] cannot be passed
//!    where a [`ProgramId`] is expected. Identifiers are opaque to the client
//!    and only checked for emptiness.
//!
//! 2. **One live record.** [`MemberRecord`] is replaced wholesale on every
//!    authoritative response; there is no partial patching API.
//!
//! 3. **Balances come from the server.** [`Points`] has no arithmetic. The
//!    client never predicts a balance, it only displays what it was told.

pub mod error;
pub mod identity;
pub mod member;

pub use error::ValidationError;
pub use identity::{MemberId, ProgramId, StaffId};
pub use member::{MemberRecord, PointDelta, Points, StaffProfile};
