//! Timestamped record of the last state change of a machine.

use chrono::{DateTime, Utc};
use serde::Serialize;

/// One state change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TransitionRecord<S> {
    /// State before the transition.
    pub from: S,
    /// State after the transition.
    pub to: S,
    /// When the transition happened.
    pub at: DateTime<Utc>,
}

impl<S: Copy> TransitionRecord<S> {
    /// Record a transition happening now.
    pub fn now(from: S, to: S) -> Self {
        Self {
            from,
            to,
            at: Utc::now(),
        }
    }
}
