#![deny(missing_docs)]

//! # stampdesk-state — Scan-to-Update Flow
//!
//! The client-side state machines behind the stamp scanner.
//!
//! ## State Machines
//!
//! - **Scan lock** (`scan.rs`): `Idle → Active → Locked → Idle`. At most
//!   one decoded payload is forwarded per camera activation.
//!
//! - **Member session** (`member.rs`): `NoMember → Loading → MemberLoaded
//!   ⇄ Mutating`. Owns the one live member record and allows a single
//!   outstanding request against it.
//!
//! - **Flow** (`flow.rs`): [`ScanFlow`] drives both machines against a
//!   [`stampdesk_client::StampGateway`] and is what a front-end talks to.
//!
//! ## Design
//!
//! States are runtime enums with explicit guard methods rather than
//! typestates, because the flow is shared behind one mutex and overlapping
//! commands must be rejected at runtime. Balances are never predicted
//! locally: the member record only changes when the service answers.

pub mod error;
pub mod flow;
pub mod member;
pub mod permission;
pub mod scan;
pub mod transition;

pub use error::{ErrorKind, FlowError, PERMISSION_MESSAGE};
pub use flow::{AdjustOutcome, DecodeOutcome, FlowSnapshot, ScanFlow};
pub use member::{Completion, LookupTicket, MemberSession, MemberState, MutationTicket};
pub use permission::{CameraPermissions, StaticPermissions};
pub use scan::{Capture, ScanLock, ScanState};
pub use transition::TransitionRecord;
