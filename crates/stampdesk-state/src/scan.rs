//! # Scan Lock
//!
//! Camera decode callbacks fire several times for one physical code. The
//! lock guarantees at most one decoded payload is forwarded per activation.
//!
//! ## States
//!
//! ```text
//! Idle ──activate──▶ Active ──capture──▶ Locked ──release──▶ Idle
//!                      │
//!                      └──cancel──▶ Idle
//! ```
//!
//! Payloads decoded while `Idle` or `Locked` are discarded. Every
//! activation gets a fresh number; a [`Capture`] can only release the lock
//! of the activation that produced it, so a late release after a reset is
//! a no-op.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::error::FlowError;
use crate::transition::TransitionRecord;

/// Camera capture state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ScanState {
    /// Camera off.
    Idle,
    /// Camera on, waiting for the first decode.
    Active,
    /// A payload has been forwarded; further decodes are dropped.
    Locked,
}

impl ScanState {
    /// Uppercase name used in logs and errors.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "IDLE",
            Self::Active => "ACTIVE",
            Self::Locked => "LOCKED",
        }
    }
}

impl std::fmt::Display for ScanState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The payload that took the lock, tagged with its activation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Capture {
    /// Decoded payload, passed through uninterpreted.
    pub payload: String,
    /// Activation that produced this capture.
    pub activation: u64,
}

/// Single-shot capture lock.
#[derive(Debug, Clone)]
pub struct ScanLock {
    state: ScanState,
    activation: u64,
    activated_at: Option<DateTime<Utc>>,
    last_transition: Option<TransitionRecord<ScanState>>,
}

impl Default for ScanLock {
    fn default() -> Self {
        Self::new()
    }
}

impl ScanLock {
    /// A lock with the camera off.
    pub fn new() -> Self {
        Self {
            state: ScanState::Idle,
            activation: 0,
            activated_at: None,
            last_transition: None,
        }
    }

    /// Current state.
    pub fn state(&self) -> ScanState {
        self.state
    }

    /// Number of the current (or most recent) activation.
    pub fn activation(&self) -> u64 {
        self.activation
    }

    /// When the current activation started. `None` once the camera is off.
    pub fn activated_at(&self) -> Option<DateTime<Utc>> {
        self.activated_at
    }

    /// The most recent state change.
    pub fn last_transition(&self) -> Option<&TransitionRecord<ScanState>> {
        self.last_transition.as_ref()
    }

    /// Turn the camera on (`Idle`/`Active` → `Active`).
    ///
    /// Re-activating an `Active` lock starts a new activation. Fails with
    /// [`FlowError::Busy`] while `Locked`, because a forwarded payload is
    /// still being handled.
    pub fn activate(&mut self) -> Result<u64, FlowError> {
        if self.state == ScanState::Locked {
            return Err(FlowError::Busy {
                machine: "scanner",
                state: self.state.as_str(),
            });
        }
        self.activation += 1;
        self.activated_at = Some(Utc::now());
        self.transition(ScanState::Active);
        Ok(self.activation)
    }

    /// Close the camera before any decode (`Active` → `Idle`). Returns
    /// whether anything changed.
    pub fn cancel(&mut self) -> bool {
        if self.state != ScanState::Active {
            return false;
        }
        self.activated_at = None;
        self.transition(ScanState::Idle);
        true
    }

    /// Offer a decoded payload. Only the first payload of an activation is
    /// returned; everything else is dropped.
    pub fn capture(&mut self, payload: &str) -> Option<Capture> {
        if self.state != ScanState::Active {
            tracing::debug!(state = %self.state, "discarding decoded payload");
            return None;
        }
        self.transition(ScanState::Locked);
        Some(Capture {
            payload: payload.to_string(),
            activation: self.activation,
        })
    }

    /// Release the lock taken by `activation` (`Locked` → `Idle`), whatever
    /// the outcome of handling the payload. Returns `false` if the lock has
    /// since been reset or re-taken.
    pub fn release(&mut self, activation: u64) -> bool {
        if self.state != ScanState::Locked || self.activation != activation {
            return false;
        }
        self.activated_at = None;
        self.transition(ScanState::Idle);
        true
    }

    /// Force the camera off from any state.
    pub fn reset(&mut self) {
        self.activated_at = None;
        if self.state != ScanState::Idle {
            self.transition(ScanState::Idle);
        }
    }

    fn transition(&mut self, to: ScanState) {
        let record = TransitionRecord::now(self.state, to);
        tracing::debug!(from = %record.from, to = %record.to, activation = self.activation, "scanner transition");
        self.state = to;
        self.last_transition = Some(record);
    }
}
