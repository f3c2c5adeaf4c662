//! Live HTTP implementation of [`StampGateway`].
//!
//! ## Live API Paths
//!
//! | Method | Path (relative to base URL) | Operation |
//! |--------|-----------------------------|-----------|
//! | POST   | `auth/login` | Staff login |
//! | POST   | `passkit/get-member-by-barcode` | Member lookup by scan payload |
//! | POST   | `passkit/add-points` | Credit points |
//! | POST   | `passkit/burn-points` | Debit points |
//!
//! Every request carries `Content-Type: application/json`, and
//! `Authorization: Bearer <token>` when the session holds a token. A missing
//! token does not block the call; the service decides.
//!
//! Requests are sent once. A transport failure is terminal for the
//! operation and staff must re-initiate it.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use stampdesk_core::{MemberId, MemberRecord, PointDelta, Points, ProgramId, StaffProfile};

use crate::config::GatewayConfig;
use crate::error::{GatewayError, PARSE_FAILURE};
use crate::gateway::{validate_credentials, LoginResponse, PointsUpdate, StampGateway};
use crate::session::{BearerToken, SessionManager};

const LOGIN_PATH: &str = "auth/login";
const LOOKUP_PATH: &str = "passkit/get-member-by-barcode";
const ADD_POINTS_PATH: &str = "passkit/add-points";
const BURN_POINTS_PATH: &str = "passkit/burn-points";

// -- Request/Response types matching the service schemas ----------------------

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct LoginRequest<'a> {
    email_or_username: &'a str,
    password: &'a str,
}

#[derive(Debug, Deserialize)]
struct LoginBody {
    #[serde(default)]
    token: Option<String>,
    #[serde(default)]
    staff: Option<Value>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct LookupRequest<'a> {
    decode_barcode_payload: &'a str,
}

/// `{"success": true, "data": {...}}` envelope of the lookup endpoint.
#[derive(Debug, Deserialize)]
struct LookupBody {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    data: Option<Value>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LookupData {
    member_id: MemberId,
    program_id: ProgramId,
    member_data: MemberData,
}

/// Pass record as returned by the service. Only `points` is used; the
/// remaining fields are accepted so schema additions do not break parsing.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MemberData {
    points: Points,
    #[serde(default)]
    #[allow(dead_code)]
    external_id: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct AdjustRequest<'a> {
    program_id: &'a str,
    member_id: &'a str,
    points: u64,
}

/// `{"success": true, "result": {...}}` envelope of both adjust endpoints.
#[derive(Debug, Deserialize)]
struct AdjustBody {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    result: Option<Value>,
}

/// Which operation a response belongs to; decides the error variant for
/// non-auth failures.
#[derive(Debug, Clone, Copy)]
enum Operation {
    Login,
    Lookup,
    Mutation,
}

impl Operation {
    fn error(self, status: Option<u16>, message: impl Into<String>) -> GatewayError {
        let message = message.into();
        match self {
            Self::Login => GatewayError::Auth { status, message },
            Self::Lookup => GatewayError::Lookup { status, message },
            Self::Mutation => GatewayError::Mutation { status, message },
        }
    }
}

/// Status plus JSON body. `body` is `None` when the payload was not JSON.
struct RawResponse {
    status: StatusCode,
    body: Option<Value>,
}

/// Message for a failed response: body `message`, then body `error`, then
/// the HTTP status. An unparsable body yields the generic parse message.
fn error_message(status: StatusCode, body: Option<&Value>) -> String {
    let Some(body) = body else {
        return PARSE_FAILURE.to_string();
    };
    ["message", "error"]
        .iter()
        .filter_map(|key| body.get(*key).and_then(Value::as_str))
        .find(|msg| !msg.trim().is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| format!("HTTP {}", status.as_u16()))
}

/// Normalize a non-2xx response. 401/403 are authentication failures
/// whichever endpoint produced them.
fn failure(op: Operation, raw: &RawResponse) -> GatewayError {
    let status = raw.status.as_u16();
    let message = error_message(raw.status, raw.body.as_ref());
    match raw.status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => GatewayError::Auth {
            status: Some(status),
            message,
        },
        _ => op.error(Some(status), message),
    }
}

/// Decode a 2xx body into `T`, mapping every decode failure to the
/// operation's error with the generic parse message.
fn decode<T: serde::de::DeserializeOwned>(
    op: Operation,
    status: StatusCode,
    body: Option<Value>,
) -> Result<T, GatewayError> {
    let body = body.ok_or_else(|| op.error(Some(status.as_u16()), PARSE_FAILURE))?;
    serde_json::from_value(body).map_err(|e| {
        tracing::debug!(?op, "response did not match schema: {e}");
        op.error(Some(status.as_u16()), PARSE_FAILURE)
    })
}

/// The token alone decides whether a login succeeded. A missing or
/// malformed profile is dropped.
fn staff_profile(raw: Option<Value>) -> Option<StaffProfile> {
    let raw = raw.filter(|v| !v.is_null())?;
    serde_json::from_value(raw)
        .map_err(|e| tracing::debug!("ignoring malformed staff profile: {e}"))
        .ok()
}

// -- Client -------------------------------------------------------------------

/// HTTP client for the live stamp service.
#[derive(Debug, Clone)]
pub struct HttpGateway {
    http: reqwest::Client,
    config: GatewayConfig,
    session: Arc<SessionManager>,
}

impl HttpGateway {
    /// Create a gateway from configuration. The session is shared with the
    /// rest of the application and only read here, except on login.
    pub fn new(config: GatewayConfig, session: Arc<SessionManager>) -> Result<Self, GatewayError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| GatewayError::Config(format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            http,
            config,
            session,
        })
    }

    /// The session this gateway authenticates with.
    pub fn session(&self) -> &Arc<SessionManager> {
        &self.session
    }

    /// POST a JSON body and read back a JSON body.
    async fn post<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> Result<RawResponse, GatewayError> {
        let endpoint = format!("POST {path}");
        let url = self.config.endpoint(path)?;

        let mut request = self.http.post(url).json(body);
        if let Some(token) = self.session.current_token() {
            request = request.bearer_auth(token.as_str());
        }

        let resp = request.send().await.map_err(|e| transport(&endpoint, &e))?;
        let status = resp.status();
        let bytes = resp.bytes().await.map_err(|e| transport(&endpoint, &e))?;
        let body = serde_json::from_slice::<Value>(&bytes).ok();
        tracing::debug!(%endpoint, status = status.as_u16(), parsed = body.is_some(), "stamp service responded");

        Ok(RawResponse { status, body })
    }
}

fn transport(endpoint: &str, err: &reqwest::Error) -> GatewayError {
    let message = if err.is_timeout() {
        "Request timed out. Please try again."
    } else if err.is_connect() {
        "Unable to reach the server. Check your connection."
    } else {
        "Network request failed."
    };
    tracing::warn!(%endpoint, "transport error: {err}");
    GatewayError::Transport {
        endpoint: endpoint.to_string(),
        message: message.to_string(),
    }
}

#[async_trait]
impl StampGateway for HttpGateway {
    async fn login(&self, identifier: &str, password: &str) -> Result<LoginResponse, GatewayError> {
        let (identifier, password) = validate_credentials(identifier, password)?;
        let raw = self
            .post(
                LOGIN_PATH,
                &LoginRequest {
                    email_or_username: &identifier,
                    password: &password,
                },
            )
            .await?;
        if !raw.status.is_success() {
            return Err(failure(Operation::Login, &raw));
        }

        let body: LoginBody = decode(Operation::Login, raw.status, raw.body)?;
        let token = body
            .token
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| GatewayError::auth("Login failed: token missing in response."))?;
        let staff = staff_profile(body.staff);

        let token = BearerToken::new(token);
        self.session.set_token(token.clone()).await;
        match &staff {
            Some(profile) => tracing::info!(staff_id = %profile.id, "staff logged in"),
            None => tracing::info!("staff logged in without a profile"),
        }
        Ok(LoginResponse { token, staff })
    }

    async fn lookup_member_by_code(&self, payload: &str) -> Result<MemberRecord, GatewayError> {
        let raw = self
            .post(
                LOOKUP_PATH,
                &LookupRequest {
                    decode_barcode_payload: payload,
                },
            )
            .await?;
        if !raw.status.is_success() {
            return Err(failure(Operation::Lookup, &raw));
        }

        let status = raw.status;
        let body: LookupBody = decode(Operation::Lookup, status, raw.body)?;
        if !body.success {
            return Err(GatewayError::Lookup {
                status: Some(status.as_u16()),
                message: "Member not found".into(),
            });
        }
        let data: LookupData = decode(Operation::Lookup, status, body.data)?;
        Ok(MemberRecord::new(
            data.member_id,
            data.program_id,
            data.member_data.points,
        ))
    }

    async fn adjust_points(
        &self,
        program_id: &ProgramId,
        member_id: &MemberId,
        delta: PointDelta,
    ) -> Result<PointsUpdate, GatewayError> {
        let path = if delta.is_credit() {
            ADD_POINTS_PATH
        } else {
            BURN_POINTS_PATH
        };
        let raw = self
            .post(
                path,
                &AdjustRequest {
                    program_id: program_id.as_str(),
                    member_id: member_id.as_str(),
                    points: delta.magnitude(),
                },
            )
            .await?;
        if !raw.status.is_success() {
            return Err(failure(Operation::Mutation, &raw));
        }

        let status = raw.status;
        let body: AdjustBody = decode(Operation::Mutation, status, raw.body)?;
        if !body.success {
            return Err(GatewayError::Mutation {
                status: Some(status.as_u16()),
                message: "Update failed".into(),
            });
        }
        let update: PointsUpdate = decode(Operation::Mutation, status, body.result)?;
        if &update.member_id != member_id {
            tracing::warn!(
                requested = %member_id,
                returned = %update.member_id,
                "adjustment response names a different member"
            );
            return Err(GatewayError::Mutation {
                status: Some(status.as_u16()),
                message: "Update response did not match the scanned member.".into(),
            });
        }
        tracing::info!(member_id = %member_id, %delta, points = %update.points, "points adjusted");
        Ok(update)
    }

    fn gateway_name(&self) -> &str {
        "HttpGateway"
    }
}
