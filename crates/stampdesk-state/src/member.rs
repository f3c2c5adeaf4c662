//! # Member Session State Machine
//!
//! Owns the one live [`MemberRecord`] and sequences lookup and mutation.
//!
//! ## States
//!
//! ```text
//! NoMember ──begin_lookup──▶ Loading ──ok──▶ MemberLoaded ──begin_mutation──▶ Mutating
//!    ▲                         │                  ▲   │                          │
//!    └─────────err─────────────┘                  │   │                          │
//!    ▲                                            └───┼────────ok / err──────────┘
//!    └──────────────────discard───────────────────────┴──────────────────────────┘
//! ```
//!
//! The record is never patched. A confirmed mutation replaces it with the
//! balance the service returned; a failed one leaves it as it was.
//!
//! ## Stale responses
//!
//! Every request is issued against a ticket carrying the session
//! generation. [`MemberSession::discard`] bumps the generation, so a
//! response that arrives after "scan another" or logout no longer matches
//! and is dropped instead of overwriting newer state.

use serde::Serialize;

use stampdesk_client::{GatewayError, PointsUpdate};
use stampdesk_core::{MemberId, MemberRecord, PointDelta, ProgramId};

use crate::error::FlowError;
use crate::transition::TransitionRecord;

const MACHINE: &str = "member session";

/// Member session state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum MemberState {
    /// Nothing on screen.
    NoMember,
    /// A lookup is in flight.
    Loading,
    /// A member is on screen and controls are enabled.
    MemberLoaded,
    /// A point adjustment is in flight.
    Mutating,
}

impl MemberState {
    /// Uppercase name used in logs and errors.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NoMember => "NO_MEMBER",
            Self::Loading => "LOADING",
            Self::MemberLoaded => "MEMBER_LOADED",
            Self::Mutating => "MUTATING",
        }
    }

    /// Whether a request is outstanding.
    pub fn is_busy(&self) -> bool {
        matches!(self, Self::Loading | Self::Mutating)
    }
}

impl std::fmt::Display for MemberState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Handle for an in-flight lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LookupTicket {
    generation: u64,
}

impl LookupTicket {
    /// Session generation the lookup was issued in.
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

/// Handle for an in-flight point adjustment, tagged with its target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MutationTicket {
    generation: u64,
    member_id: MemberId,
    program_id: ProgramId,
    delta: PointDelta,
}

impl MutationTicket {
    /// Session generation the adjustment was issued in.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Member the adjustment targets.
    pub fn member_id(&self) -> &MemberId {
        &self.member_id
    }

    /// Program of the targeted member.
    pub fn program_id(&self) -> &ProgramId {
        &self.program_id
    }

    /// Requested adjustment.
    pub fn delta(&self) -> PointDelta {
        self.delta
    }
}

/// Result of feeding a response back into the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Completion {
    /// The response was applied; this is the new live record.
    Applied(MemberRecord),
    /// The session moved on while the request was in flight; the response
    /// was dropped.
    Stale,
}

/// The live member and the state gating requests against it.
#[derive(Debug, Clone)]
pub struct MemberSession {
    state: MemberState,
    record: Option<MemberRecord>,
    generation: u64,
    last_transition: Option<TransitionRecord<MemberState>>,
}

impl Default for MemberSession {
    fn default() -> Self {
        Self::new()
    }
}

impl MemberSession {
    /// An empty session.
    pub fn new() -> Self {
        Self {
            state: MemberState::NoMember,
            record: None,
            generation: 0,
            last_transition: None,
        }
    }

    /// Current state.
    pub fn state(&self) -> MemberState {
        self.state
    }

    /// The live record, if any.
    pub fn record(&self) -> Option<&MemberRecord> {
        self.record.as_ref()
    }

    /// Current generation; bumped every time the record is discarded.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// The most recent state change.
    pub fn last_transition(&self) -> Option<&TransitionRecord<MemberState>> {
        self.last_transition.as_ref()
    }

    /// `NoMember → Loading`.
    pub fn begin_lookup(&mut self) -> Result<LookupTicket, FlowError> {
        match self.state {
            MemberState::NoMember => {
                self.transition(MemberState::Loading);
                Ok(LookupTicket {
                    generation: self.generation,
                })
            }
            MemberState::Loading => Err(self.busy()),
            MemberState::MemberLoaded | MemberState::Mutating => Err(self.invalid("look up a member")),
        }
    }

    /// `Loading → MemberLoaded` on success, `Loading → NoMember` on
    /// failure. The failure is handed back for the caller to surface.
    pub fn complete_lookup(
        &mut self,
        ticket: LookupTicket,
        result: Result<MemberRecord, GatewayError>,
    ) -> Result<Completion, GatewayError> {
        if ticket.generation != self.generation || self.state != MemberState::Loading {
            tracing::debug!(
                ticket = ticket.generation,
                generation = self.generation,
                state = %self.state,
                ok = result.is_ok(),
                "dropping stale lookup response"
            );
            return Ok(Completion::Stale);
        }

        match result {
            Ok(record) => {
                self.record = Some(record.clone());
                self.transition(MemberState::MemberLoaded);
                Ok(Completion::Applied(record))
            }
            Err(e) => {
                self.record = None;
                self.transition(MemberState::NoMember);
                Err(e)
            }
        }
    }

    /// `MemberLoaded → Mutating`. Only one adjustment may be outstanding.
    pub fn begin_mutation(&mut self, delta: PointDelta) -> Result<MutationTicket, FlowError> {
        match self.state {
            MemberState::MemberLoaded => {}
            MemberState::Loading | MemberState::Mutating => return Err(self.busy()),
            MemberState::NoMember => return Err(FlowError::NoMember),
        }
        let Some(record) = self.record.as_ref() else {
            return Err(FlowError::NoMember);
        };
        let ticket = MutationTicket {
            generation: self.generation,
            member_id: record.member_id.clone(),
            program_id: record.program_id.clone(),
            delta,
        };
        self.transition(MemberState::Mutating);
        Ok(ticket)
    }

    /// `Mutating → MemberLoaded`. On success the record is replaced by the
    /// service's result; on failure it is kept unchanged and the error is
    /// handed back.
    pub fn complete_mutation(
        &mut self,
        ticket: &MutationTicket,
        result: Result<PointsUpdate, GatewayError>,
    ) -> Result<Completion, GatewayError> {
        let current = match (&self.record, self.state) {
            (Some(record), MemberState::Mutating)
                if ticket.generation == self.generation && record.member_id == ticket.member_id =>
            {
                record
            }
            _ => {
                tracing::debug!(
                    member_id = %ticket.member_id,
                    ticket = ticket.generation,
                    generation = self.generation,
                    state = %self.state,
                    ok = result.is_ok(),
                    "dropping stale adjustment response"
                );
                return Ok(Completion::Stale);
            }
        };

        match result {
            Ok(update) => {
                let confirmed = current.confirmed(update.member_id, update.points);
                self.record = Some(confirmed.clone());
                self.transition(MemberState::MemberLoaded);
                Ok(Completion::Applied(confirmed))
            }
            Err(e) => {
                self.transition(MemberState::MemberLoaded);
                Err(e)
            }
        }
    }

    /// Drop the live record (`* → NoMember`) and invalidate every
    /// outstanding ticket. Returns the discarded record.
    pub fn discard(&mut self) -> Option<MemberRecord> {
        self.generation += 1;
        if self.state != MemberState::NoMember {
            self.transition(MemberState::NoMember);
        }
        self.record.take()
    }

    /// Undo the request state entered for `generation` when its request
    /// will never complete (the awaiting task was dropped).
    pub fn abandon(&mut self, generation: u64) {
        if generation != self.generation {
            return;
        }
        match self.state {
            MemberState::Loading => self.transition(MemberState::NoMember),
            MemberState::Mutating => self.transition(MemberState::MemberLoaded),
            MemberState::NoMember | MemberState::MemberLoaded => {}
        }
    }

    fn busy(&self) -> FlowError {
        FlowError::Busy {
            machine: MACHINE,
            state: self.state.as_str(),
        }
    }

    fn invalid(&self, action: &'static str) -> FlowError {
        FlowError::InvalidTransition {
            machine: MACHINE,
            from: self.state.as_str(),
            action,
        }
    }

    fn transition(&mut self, to: MemberState) {
        let record = TransitionRecord::now(self.state, to);
        tracing::debug!(from = %record.from, to = %record.to, generation = self.generation, "member session transition");
        self.state = to;
        self.last_transition = Some(record);
    }
}
