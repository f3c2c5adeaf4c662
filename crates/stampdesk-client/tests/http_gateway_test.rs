//! Contract tests for HttpGateway against the stamp service.
//!
//! ## Endpoints Tested
//!
//! | Method | Path | Test |
//! |--------|------|------|
//! | POST   | `/api/auth/login` | `login_*` |
//! | POST   | `/api/passkit/get-member-by-barcode` | `lookup_*` |
//! | POST   | `/api/passkit/add-points` | `add_*` |
//! | POST   | `/api/passkit/burn-points` | `burn_*` |

use std::sync::Arc;
use std::time::Duration;

use stampdesk_client::{
    BearerToken, GatewayConfig, GatewayError, HttpGateway, MemoryCredentialStore, SessionManager,
    StampGateway, TOKEN_KEY,
};
use stampdesk_client::CredentialStore;
use stampdesk_core::{MemberId, PointDelta, Points, ProgramId};
use wiremock::matchers::{body_json, header, header_exists, method, path};
use wiremock::{Mock, MockServer, Request, ResponseTemplate};

struct Harness {
    gateway: HttpGateway,
    session: Arc<SessionManager>,
    store: MemoryCredentialStore,
}

fn harness(mock_server: &MockServer) -> Harness {
    let store = MemoryCredentialStore::new();
    let session = Arc::new(SessionManager::new(Arc::new(store.clone())));
    let config = GatewayConfig::new(&format!("{}/api", mock_server.uri()))
        .unwrap()
        .with_timeout_secs(5);
    let gateway = HttpGateway::new(config, session.clone()).unwrap();
    Harness {
        gateway,
        session,
        store,
    }
}

async fn authenticated(mock_server: &MockServer) -> Harness {
    let h = harness(mock_server);
    h.session.set_token(BearerToken::new("test-token")).await;
    h
}

fn ids() -> (ProgramId, MemberId) {
    (ProgramId::new("P1").unwrap(), MemberId::new("M1").unwrap())
}

// ── POST /auth/login ─────────────────────────────────────────────────

#[tokio::test]
async fn login_sends_credentials_and_persists_token() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .and(header("content-type", "application/json"))
        .and(body_json(serde_json::json!({
            "emailOrUsername": "staff@demo.test",
            "password": "staff123"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "token": "jwt-abc",
            "staff": {
                "id": "1",
                "name": "Demo Staff",
                "phone": "+1234567890",
                "businessName": "Demo Business"
            }
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let h = harness(&mock_server);
    let resp = h.gateway.login(" staff@demo.test ", "staff123").await.unwrap();

    assert_eq!(resp.token.as_str(), "jwt-abc");
    assert_eq!(resp.staff.unwrap().name, "Demo Staff");
    assert_eq!(h.session.current_token().unwrap().as_str(), "jwt-abc");
    assert_eq!(h.store.get(TOKEN_KEY).await.unwrap().as_deref(), Some("jwt-abc"));
}

#[tokio::test]
async fn login_with_empty_password_makes_no_request() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&mock_server)
        .await;

    let h = harness(&mock_server);
    let err = h.gateway.login("staff@demo.test", "").await.unwrap_err();
    assert!(matches!(err, GatewayError::Auth { status: None, .. }));
    assert!(h.session.current_token().is_none());
}

#[tokio::test]
async fn login_failure_uses_body_message() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .respond_with(
            ResponseTemplate::new(401)
                .set_body_json(serde_json::json!({"message": "Invalid credentials"})),
        )
        .mount(&mock_server)
        .await;

    let h = harness(&mock_server);
    let err = h.gateway.login("staff", "wrong").await.unwrap_err();
    assert_eq!(
        err,
        GatewayError::Auth {
            status: Some(401),
            message: "Invalid credentials".into()
        }
    );
}

#[tokio::test]
async fn login_without_token_in_response_fails() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "staff": {"id": "1"}
        })))
        .mount(&mock_server)
        .await;

    let h = harness(&mock_server);
    let err = h.gateway.login("staff", "pw").await.unwrap_err();
    assert_eq!(err.to_string(), "Login failed: token missing in response.");
    assert!(h.session.current_token().is_none());
}

#[tokio::test]
async fn login_with_token_only_succeeds() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"token": "t"})))
        .mount(&mock_server)
        .await;

    let h = harness(&mock_server);
    let resp = h.gateway.login("staff", "pw").await.unwrap();
    assert_eq!(resp.token.as_str(), "t");
    assert!(resp.staff.is_none());
    assert_eq!(h.session.current_token().unwrap().as_str(), "t");
    assert_eq!(h.store.get("auth_token").await.unwrap().as_deref(), Some("t"));
}

#[tokio::test]
async fn login_with_incomplete_staff_profile_still_succeeds() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "token": "tok-2",
            "staff": {"name": "A"}
        })))
        .mount(&mock_server)
        .await;

    let h = harness(&mock_server);
    let resp = h.gateway.login("staff", "pw").await.unwrap();
    assert!(resp.staff.is_none());
    assert_eq!(h.store.get(TOKEN_KEY).await.unwrap().as_deref(), Some("tok-2"));
}

#[tokio::test]
async fn login_server_error_without_json_body() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .respond_with(ResponseTemplate::new(502).set_body_string("<html>Bad Gateway</html>"))
        .mount(&mock_server)
        .await;

    let h = harness(&mock_server);
    let err = h.gateway.login("staff", "pw").await.unwrap_err();
    assert_eq!(
        err,
        GatewayError::Auth {
            status: Some(502),
            message: "Unable to parse server response.".into()
        }
    );
}

// ── POST /passkit/get-member-by-barcode ──────────────────────────────

#[tokio::test]
async fn lookup_returns_member_record_and_sends_bearer() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/passkit/get-member-by-barcode"))
        .and(header("authorization", "Bearer test-token"))
        .and(body_json(serde_json::json!({"decodeBarcodePayload": "QR-PAYLOAD"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "success": true,
            "data": {
                "memberId": "M1",
                "programId": "P1",
                "memberData": {"id": "M1", "externalId": "ext-9", "points": 3, "status": 1}
            }
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let h = authenticated(&mock_server).await;
    let record = h.gateway.lookup_member_by_code("QR-PAYLOAD").await.unwrap();
    assert_eq!(record.member_id.as_str(), "M1");
    assert_eq!(record.program_id.as_str(), "P1");
    assert_eq!(record.points, Points::new(3));
}

#[tokio::test]
async fn lookup_without_token_still_calls_remote() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/passkit/get-member-by-barcode"))
        .respond_with(move |req: &Request| {
            assert!(!req.headers.contains_key("authorization"));
            ResponseTemplate::new(401).set_body_json(serde_json::json!({"error": "Unauthorized"}))
        })
        .expect(1)
        .mount(&mock_server)
        .await;

    let h = harness(&mock_server);
    let err = h.gateway.lookup_member_by_code("QR").await.unwrap_err();
    assert_eq!(
        err,
        GatewayError::Auth {
            status: Some(401),
            message: "Unauthorized".into()
        }
    );
}

#[tokio::test]
async fn lookup_not_found_is_lookup_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/passkit/get-member-by-barcode"))
        .respond_with(
            ResponseTemplate::new(404).set_body_json(serde_json::json!({"message": "Pass not found"})),
        )
        .mount(&mock_server)
        .await;

    let h = authenticated(&mock_server).await;
    let err = h.gateway.lookup_member_by_code("QR").await.unwrap_err();
    assert_eq!(
        err,
        GatewayError::Lookup {
            status: Some(404),
            message: "Pass not found".into()
        }
    );
}

#[tokio::test]
async fn lookup_success_false_is_lookup_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/passkit/get-member-by-barcode"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"success": false})))
        .mount(&mock_server)
        .await;

    let h = authenticated(&mock_server).await;
    let err = h.gateway.lookup_member_by_code("QR").await.unwrap_err();
    assert_eq!(err.to_string(), "Member not found");
}

#[tokio::test]
async fn lookup_missing_member_id_is_lookup_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/passkit/get-member-by-barcode"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "success": true,
            "data": {"programId": "P1", "memberData": {"points": 3}}
        })))
        .mount(&mock_server)
        .await;

    let h = authenticated(&mock_server).await;
    let err = h.gateway.lookup_member_by_code("QR").await.unwrap_err();
    assert!(matches!(err, GatewayError::Lookup { .. }));
    assert_eq!(err.to_string(), "Unable to parse server response.");
}

#[tokio::test]
async fn lookup_non_json_success_body_is_lookup_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/passkit/get-member-by-barcode"))
        .respond_with(ResponseTemplate::new(200).set_body_string("OK"))
        .mount(&mock_server)
        .await;

    let h = authenticated(&mock_server).await;
    let err = h.gateway.lookup_member_by_code("QR").await.unwrap_err();
    assert!(matches!(err, GatewayError::Lookup { status: Some(200), .. }));
}

// ── POST /passkit/add-points, /passkit/burn-points ──────────────────

#[tokio::test]
async fn add_posts_positive_magnitude() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/passkit/add-points"))
        .and(header_exists("authorization"))
        .and(body_json(serde_json::json!({"programId": "P1", "memberId": "M1", "points": 1})))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "success": true,
            "result": {"memberId": "M1", "points": 4, "tierPoints": 0, "secondaryPoints": 0}
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let h = authenticated(&mock_server).await;
    let (program, member) = ids();
    let update = h
        .gateway
        .adjust_points(&program, &member, PointDelta::ADD_ONE)
        .await
        .unwrap();
    assert_eq!(update.points, Points::new(4));
    assert_eq!(update.member_id, member);
}

#[tokio::test]
async fn burn_posts_absolute_magnitude() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/passkit/burn-points"))
        .and(body_json(serde_json::json!({"programId": "P1", "memberId": "M1", "points": 2})))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "success": true,
            "result": {"memberId": "M1", "points": 1}
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let h = authenticated(&mock_server).await;
    let (program, member) = ids();
    let update = h
        .gateway
        .adjust_points(&program, &member, PointDelta::new(-2).unwrap())
        .await
        .unwrap();
    assert_eq!(update.points, Points::new(1));
    assert_eq!(update.tier_points, None);
}

#[tokio::test]
async fn burn_rejected_by_remote_is_mutation_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/passkit/burn-points"))
        .respond_with(
            ResponseTemplate::new(400)
                .set_body_json(serde_json::json!({"message": "Insufficient points"})),
        )
        .mount(&mock_server)
        .await;

    let h = authenticated(&mock_server).await;
    let (program, member) = ids();
    let err = h
        .gateway
        .adjust_points(&program, &member, PointDelta::REMOVE_ONE)
        .await
        .unwrap_err();
    assert_eq!(
        err,
        GatewayError::Mutation {
            status: Some(400),
            message: "Insufficient points".into()
        }
    );
}

#[tokio::test]
async fn add_response_for_other_member_is_rejected() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/passkit/add-points"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "success": true,
            "result": {"memberId": "M2", "points": 9}
        })))
        .mount(&mock_server)
        .await;

    let h = authenticated(&mock_server).await;
    let (program, member) = ids();
    let err = h
        .gateway
        .adjust_points(&program, &member, PointDelta::ADD_ONE)
        .await
        .unwrap_err();
    assert!(matches!(err, GatewayError::Mutation { .. }));
}

#[tokio::test]
async fn add_timeout_is_transport_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/passkit/add-points"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_delay(Duration::from_secs(3))
                .set_body_json(serde_json::json!({"success": true})),
        )
        .mount(&mock_server)
        .await;

    let session = Arc::new(SessionManager::new(Arc::new(MemoryCredentialStore::new())));
    let config = GatewayConfig::new(&format!("{}/api", mock_server.uri()))
        .unwrap()
        .with_timeout_secs(1);
    let gateway = HttpGateway::new(config, session).unwrap();
    let (program, member) = ids();
    let err = gateway
        .adjust_points(&program, &member, PointDelta::ADD_ONE)
        .await
        .unwrap_err();
    assert!(matches!(err, GatewayError::Transport { .. }));
}

#[tokio::test]
async fn unreachable_server_is_transport_error() {
    let session = Arc::new(SessionManager::new(Arc::new(MemoryCredentialStore::new())));
    let config = GatewayConfig::new("http://127.0.0.1:1/api")
        .unwrap()
        .with_timeout_secs(1);
    let gateway = HttpGateway::new(config, session).unwrap();
    let err = gateway.lookup_member_by_code("QR").await.unwrap_err();
    match err {
        GatewayError::Transport { endpoint, .. } => {
            assert_eq!(endpoint, "POST passkit/get-member-by-barcode");
        }
        other => panic!("expected Transport, got: {other:?}"),
    }
}
