//! # Scan Flow
//!
//! [`ScanFlow`] binds the [`ScanLock`], the [`MemberSession`] and a
//! [`StampGateway`] into the scan → lookup → display → adjust loop staff
//! drive from the presentation layer.
//!
//! The flow is shared by reference, so commands may overlap (a double tap
//! on "add stamp" issues two `adjust` calls before the first resolves).
//! Both machines sit behind one `parking_lot::Mutex` that is taken only
//! between awaits. The state gates decide which overlapping command wins;
//! the loser gets [`FlowError::Busy`] without a request being sent.
//!
//! If a future returned by [`ScanFlow::on_decoded`] or [`ScanFlow::adjust`]
//! is dropped mid-request, the lock and request state it holds are rolled
//! back on drop.

use std::sync::Arc;

use parking_lot::Mutex;
use serde::Serialize;

use stampdesk_client::{SessionManager, StampGateway};
use stampdesk_core::{MemberRecord, PointDelta, StaffProfile};

use crate::error::FlowError;
use crate::member::{Completion, MemberSession, MemberState};
use crate::permission::CameraPermissions;
use crate::scan::{ScanLock, ScanState};

/// What happened to a decoded payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodeOutcome {
    /// The scanner was not waiting for a code; nothing was sent.
    Ignored,
    /// The member was resolved and is now on screen.
    Loaded(MemberRecord),
    /// The flow moved on (e.g. logout) while the lookup was in flight.
    Stale,
}

/// What happened to a point adjustment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdjustOutcome {
    /// The service confirmed the adjustment; this is the new live record.
    Applied(MemberRecord),
    /// The member was discarded while the request was in flight.
    Stale,
}

/// Render-ready view of the flow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FlowSnapshot {
    /// Scanner state.
    pub scan_state: ScanState,
    /// Member session state.
    pub member_state: MemberState,
    /// The live member, if any.
    pub member: Option<MemberRecord>,
    /// Whether a staff session token is held.
    pub authenticated: bool,
}

impl FlowSnapshot {
    /// Whether add/remove controls should be enabled.
    pub fn controls_enabled(&self) -> bool {
        self.member_state == MemberState::MemberLoaded
    }

    /// Whether any request is outstanding.
    pub fn is_busy(&self) -> bool {
        self.scan_state == ScanState::Locked || self.member_state.is_busy()
    }
}

#[derive(Debug, Default)]
struct FlowInner {
    scan: ScanLock,
    member: MemberSession,
}

impl FlowInner {
    /// A new scan may not start while a lookup is in flight.
    fn check_can_scan(&self) -> Result<(), FlowError> {
        if self.member.state() == MemberState::Loading {
            return Err(FlowError::Busy {
                machine: "member session",
                state: MemberState::Loading.as_str(),
            });
        }
        if self.scan.state() == ScanState::Locked {
            return Err(FlowError::Busy {
                machine: "scanner",
                state: ScanState::Locked.as_str(),
            });
        }
        Ok(())
    }
}

/// The scan-to-update controller.
pub struct ScanFlow {
    gateway: Arc<dyn StampGateway>,
    session: Arc<SessionManager>,
    camera: Arc<dyn CameraPermissions>,
    inner: Mutex<FlowInner>,
}

impl std::fmt::Debug for ScanFlow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScanFlow")
            .field("gateway", &self.gateway.gateway_name())
            .field("session", &self.session)
            .field("snapshot", &self.snapshot())
            .finish()
    }
}

impl ScanFlow {
    /// Build a flow over a gateway and the session it authenticates with.
    pub fn new(
        gateway: Arc<dyn StampGateway>,
        session: Arc<SessionManager>,
        camera: Arc<dyn CameraPermissions>,
    ) -> Self {
        Self {
            gateway,
            session,
            camera,
            inner: Mutex::new(FlowInner::default()),
        }
    }

    /// The session shared with the gateway.
    pub fn session(&self) -> &Arc<SessionManager> {
        &self.session
    }

    /// Log staff in. The gateway stores the token in the session. The
    /// profile is `None` when the service sent a token without one.
    pub async fn login(
        &self,
        identifier: &str,
        password: &str,
    ) -> Result<Option<StaffProfile>, FlowError> {
        let resp = self.gateway.login(identifier, password).await?;
        tracing::info!(gateway = self.gateway.gateway_name(), "login succeeded");
        Ok(resp.staff)
    }

    /// Turn the scanner on, discarding any member on screen.
    ///
    /// Rejected with [`FlowError::Busy`] while a lookup is in flight, before
    /// the camera permission is asked for. When permission is denied the
    /// scanner stays `Idle` and the current member is kept. The gates are
    /// checked again once permission is granted.
    pub async fn start_scan(&self) -> Result<(), FlowError> {
        self.inner.lock().check_can_scan()?;

        if !self.camera.is_granted().await && !self.camera.request().await {
            tracing::info!("camera permission denied");
            return Err(FlowError::PermissionDenied);
        }

        let mut inner = self.inner.lock();
        inner.check_can_scan()?;
        if let Some(dropped) = inner.member.discard() {
            tracing::debug!(member_id = %dropped.member_id, "discarded member for new scan");
        }
        inner.scan.activate()?;
        Ok(())
    }

    /// "Scan another": drop the current member and reopen the scanner. An
    /// adjustment still in flight for the dropped member becomes stale.
    pub async fn scan_another(&self) -> Result<(), FlowError> {
        self.start_scan().await
    }

    /// Close the scanner before anything was decoded. Returns whether the
    /// scanner was open.
    pub fn cancel_scan(&self) -> bool {
        self.inner.lock().scan.cancel()
    }

    /// Feed a decoded payload from the camera.
    ///
    /// Only the first payload of an activation is looked up; the rest are
    /// [`DecodeOutcome::Ignored`]. The scanner returns to `Idle` once the
    /// lookup finishes, whatever its result.
    pub async fn on_decoded(&self, payload: &str) -> Result<DecodeOutcome, FlowError> {
        let (capture, ticket) = {
            let mut inner = self.inner.lock();
            let Some(capture) = inner.scan.capture(payload) else {
                return Ok(DecodeOutcome::Ignored);
            };
            match inner.member.begin_lookup() {
                Ok(ticket) => (capture, ticket),
                Err(e) => {
                    inner.scan.release(capture.activation);
                    return Err(e);
                }
            }
        };

        let mut guard = InFlight::new(self, Some(capture.activation), ticket.generation());
        let result = self.gateway.lookup_member_by_code(&capture.payload).await;
        guard.disarm();

        let completion = {
            let mut inner = self.inner.lock();
            inner.scan.release(capture.activation);
            inner.member.complete_lookup(ticket, result)
        };
        match completion {
            Ok(Completion::Applied(record)) => {
                tracing::info!(member_id = %record.member_id, points = %record.points, "member loaded");
                Ok(DecodeOutcome::Loaded(record))
            }
            Ok(Completion::Stale) => Ok(DecodeOutcome::Stale),
            Err(e) => {
                tracing::info!(kind = "lookup", "member lookup failed: {e}");
                Err(e.into())
            }
        }
    }

    /// Apply a point adjustment to the member on screen.
    ///
    /// The displayed balance only changes when the service confirms; on
    /// failure the record is kept as it was.
    pub async fn adjust(&self, delta: PointDelta) -> Result<AdjustOutcome, FlowError> {
        let ticket = {
            let mut inner = self.inner.lock();
            inner.member.begin_mutation(delta)?
        };

        let mut guard = InFlight::new(self, None, ticket.generation());
        let result = self
            .gateway
            .adjust_points(ticket.program_id(), ticket.member_id(), ticket.delta())
            .await;
        guard.disarm();

        let completion = {
            let mut inner = self.inner.lock();
            inner.member.complete_mutation(&ticket, result)
        };
        match completion {
            Ok(Completion::Applied(record)) => {
                tracing::info!(member_id = %record.member_id, %delta, points = %record.points, "stamp adjustment applied");
                Ok(AdjustOutcome::Applied(record))
            }
            Ok(Completion::Stale) => Ok(AdjustOutcome::Stale),
            Err(e) => {
                tracing::info!(member_id = %ticket.member_id(), %delta, "stamp adjustment failed: {e}");
                Err(e.into())
            }
        }
    }

    /// Apply a raw signed adjustment. Zero fails with
    /// [`FlowError::Validation`] before any state is touched.
    pub async fn adjust_by(&self, points: i64) -> Result<AdjustOutcome, FlowError> {
        let delta = PointDelta::new(points)?;
        self.adjust(delta).await
    }

    /// Add one stamp.
    pub async fn add_stamp(&self) -> Result<AdjustOutcome, FlowError> {
        self.adjust(PointDelta::ADD_ONE).await
    }

    /// Remove one stamp.
    pub async fn remove_stamp(&self) -> Result<AdjustOutcome, FlowError> {
        self.adjust(PointDelta::REMOVE_ONE).await
    }

    /// End the staff session: turn the scanner off, drop the member and
    /// clear the stored token.
    pub async fn logout(&self) {
        {
            let mut inner = self.inner.lock();
            inner.scan.reset();
            inner.member.discard();
        }
        self.session.clear_token().await;
        tracing::info!("logged out");
    }

    /// Current view for rendering.
    pub fn snapshot(&self) -> FlowSnapshot {
        let inner = self.inner.lock();
        FlowSnapshot {
            scan_state: inner.scan.state(),
            member_state: inner.member.state(),
            member: inner.member.record().cloned(),
            authenticated: self.session.is_authenticated(),
        }
    }
}

/// Rolls back the scan lock and request state of a request whose future
/// was dropped before the response arrived.
struct InFlight<'a> {
    flow: &'a ScanFlow,
    activation: Option<u64>,
    generation: u64,
    armed: bool,
}

impl<'a> InFlight<'a> {
    fn new(flow: &'a ScanFlow, activation: Option<u64>, generation: u64) -> Self {
        Self {
            flow,
            activation,
            generation,
            armed: true,
        }
    }

    fn disarm(&mut self) {
        self.armed = false;
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        tracing::warn!(generation = self.generation, "request dropped before completion");
        let mut inner = self.flow.inner.lock();
        if let Some(activation) = self.activation {
            inner.scan.release(activation);
        }
        inner.member.abandon(self.generation);
    }
}
