//! In-memory stand-in for the stamp service.
//!
//! `MockStampGateway` is for demos and tests; it is not a model of the
//! service's internals. It accepts a single demo staff account, keeps a
//! small member table keyed by scan payload, and enforces the two rules
//! staff are likely to run into: lookups and adjustments need a session
//! token, and a burn cannot take a balance below zero.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;

use stampdesk_core::{MemberId, MemberRecord, PointDelta, Points, ProgramId, StaffId, StaffProfile};

use crate::error::GatewayError;
use crate::gateway::{validate_credentials, LoginResponse, PointsUpdate, StampGateway};
use crate::session::{BearerToken, SessionManager};

/// Identifier accepted by the demo staff account.
pub const DEMO_IDENTIFIER: &str = "staff@demo.test";
/// Password of the demo staff account.
pub const DEMO_PASSWORD: &str = "staff123";
/// Program every seeded demo member belongs to.
pub const DEMO_PROGRAM: &str = "demo-program";

/// Mock stamp service for development and tests.
#[derive(Debug)]
pub struct MockStampGateway {
    session: Arc<SessionManager>,
    /// Scan payload -> member.
    members: Mutex<HashMap<String, MemberRecord>>,
    latency: Duration,
    calls: AtomicU64,
}

impl MockStampGateway {
    /// Create an empty mock with no latency.
    pub fn new(session: Arc<SessionManager>) -> Self {
        Self {
            session,
            members: Mutex::new(HashMap::new()),
            latency: Duration::ZERO,
            calls: AtomicU64::new(0),
        }
    }

    /// Create a mock seeded with three demo members, reachable by the
    /// payloads `customer-1`, `customer-2` and `customer-3`.
    pub fn with_demo_data(session: Arc<SessionManager>) -> Self {
        let mock = Self::new(session);
        for (payload, member, points) in [
            ("customer-1", "member-1001", 3),
            ("customer-2", "member-1002", 10),
            ("customer-3", "member-1003", 7),
        ] {
            mock.seed(payload, member, DEMO_PROGRAM, points);
        }
        mock
    }

    /// Simulate network latency on every call.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// Register a member reachable by `payload`. Blank identifiers are
    /// ignored with a warning.
    pub fn seed(&self, payload: &str, member_id: &str, program_id: &str, points: u64) {
        match (MemberId::new(member_id), ProgramId::new(program_id)) {
            (Ok(member_id), Ok(program_id)) => {
                self.members.lock().insert(
                    payload.to_string(),
                    MemberRecord::new(member_id, program_id, Points::new(points)),
                );
            }
            _ => tracing::warn!(payload, "ignoring mock member with blank identifiers"),
        }
    }

    /// Number of gateway operations received, including rejected ones.
    pub fn call_count(&self) -> u64 {
        self.calls.load(Ordering::SeqCst)
    }

    async fn enter(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
    }

    fn require_session(&self) -> Result<(), GatewayError> {
        if self.session.is_authenticated() {
            Ok(())
        } else {
            Err(GatewayError::Auth {
                status: Some(401),
                message: "Not authenticated".into(),
            })
        }
    }
}

#[async_trait]
impl StampGateway for MockStampGateway {
    async fn login(&self, identifier: &str, password: &str) -> Result<LoginResponse, GatewayError> {
        let (identifier, password) = validate_credentials(identifier, password)?;
        self.enter().await;
        if identifier != DEMO_IDENTIFIER || password != DEMO_PASSWORD {
            return Err(GatewayError::Auth {
                status: Some(401),
                message: "Invalid email/username or password".into(),
            });
        }

        let token = BearerToken::new(format!(
            "mock-token-{}",
            chrono::Utc::now().timestamp_millis()
        ));
        let staff = StaffProfile {
            id: StaffId::new("1").map_err(|e| GatewayError::auth(e.to_string()))?,
            name: "Demo Staff".into(),
            phone: "+1234567890".into(),
            business_name: "Demo Business".into(),
        };
        self.session.set_token(token.clone()).await;
        Ok(LoginResponse {
            token,
            staff: Some(staff),
        })
    }

    async fn lookup_member_by_code(&self, payload: &str) -> Result<MemberRecord, GatewayError> {
        self.enter().await;
        self.require_session()?;
        self.members.lock().get(payload).cloned().ok_or_else(|| GatewayError::Lookup {
            status: Some(404),
            message: "Member not found".into(),
        })
    }

    async fn adjust_points(
        &self,
        program_id: &ProgramId,
        member_id: &MemberId,
        delta: PointDelta,
    ) -> Result<PointsUpdate, GatewayError> {
        self.enter().await;
        self.require_session()?;

        let mut members = self.members.lock();
        let record = members
            .values_mut()
            .find(|m| &m.member_id == member_id && &m.program_id == program_id)
            .ok_or_else(|| GatewayError::Mutation {
                status: Some(404),
                message: "Member not found".into(),
            })?;

        let current = record.points.value();
        let next = if delta.is_credit() {
            current.checked_add(delta.magnitude())
        } else {
            current.checked_sub(delta.magnitude())
        }
        .ok_or_else(|| GatewayError::Mutation {
            status: Some(400),
            message: "Insufficient points".into(),
        })?;

        record.points = Points::new(next);
        Ok(PointsUpdate {
            member_id: record.member_id.clone(),
            points: record.points,
            tier_points: Some(0),
            secondary_points: Some(0),
        })
    }

    fn gateway_name(&self) -> &str {
        "MockStampGateway"
    }
}
