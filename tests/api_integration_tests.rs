use std::time::Duration;

use aibaby::api::dispatch::execute;
use aibaby::api::{ApiClient, ApiError, ErrorKind, Role};
use aibaby::core::action::{Request, Response};
use aibaby::core::session::{Session, User};
use serde_json::json;
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{body_json, body_string_contains, header, method, path},
};

// ============================================================================
// Helper Functions
// ============================================================================

const MAX_UPLOAD: u64 = 1024 * 1024;

fn client_for(server: &MockServer) -> ApiClient {
    ApiClient::new(format!("{}/api", server.uri()), Duration::from_secs(5)).unwrap()
}

fn session(role: Role) -> Session {
    Session::logged_in(User {
        email: "me@example.com".to_string(),
        role,
        token: "test-token".to_string(),
        selected_baby_id: None,
    })
}

fn baby_json(id: i64, name: &str, visible: bool) -> serde_json::Value {
    json!({
        "id": id,
        "name": name,
        "age": "6 months",
        "attributes": ["Curious", "Playful"],
        "image_path": format!("/images/baby{id}.png"),
        "is_visible": visible,
        "life_stages": [
            {"age": "5 years", "description": "Loves drawing", "image_path": format!("/images/baby{id}_5.png")}
        ]
    })
}

// ============================================================================
// Auth
// ============================================================================

#[tokio::test]
async fn test_login_posts_credentials_and_parses_role() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .and(body_json(json!({"email": "a@b.com", "password": "secret1"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "token": "jwt-123",
            "role": "admin",
            "email": "a@b.com"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let auth = client_for(&server).login("a@b.com", "secret1").await.unwrap();
    assert_eq!(auth.token, "jwt-123");
    assert_eq!(auth.role, Role::Admin);
}

#[tokio::test]
async fn test_bad_credentials_surface_server_message() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .respond_with(
            ResponseTemplate::new(401).set_body_json(json!({"error": "Invalid credentials"})),
        )
        .mount(&server)
        .await;

    let err = client_for(&server).login("a@b.com", "nope12").await.unwrap_err();
    assert!(err.is_unauthenticated());
    assert_eq!(err.user_message(), "Invalid credentials");
}

#[tokio::test]
async fn test_requests_carry_bearer_token() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/auth/me"))
        .and(header("authorization", "Bearer test-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": 3,
            "email": "me@example.com",
            "role": "user",
            "selected_baby_id": 2,
            "partner": "Sam"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let me = client_for(&server).me(&session(Role::User)).await.unwrap();
    assert_eq!(me.selected_baby_id, Some(2));
    assert_eq!(me.partner.as_deref(), Some("Sam"));
}

// ============================================================================
// Error Mapping
// ============================================================================

#[tokio::test]
async fn test_error_kinds_by_status() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/questionnaires/all"))
        .respond_with(ResponseTemplate::new(403).set_body_json(json!({"message": "Admins only"})))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/babies"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/settings"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let s = session(Role::User);

    let forbidden = client.all_questionnaires(&s).await.unwrap_err();
    assert_eq!(forbidden.kind(), ErrorKind::Authorization);
    assert_eq!(forbidden.user_message(), "Admins only");

    let server_error = client.babies(&s).await.unwrap_err();
    assert_eq!(server_error.kind(), ErrorKind::Server);
    assert_eq!(server_error.user_message(), "boom");

    let garbled = client.settings(&s).await.unwrap_err();
    assert!(matches!(garbled, ApiError::Parse(_)));
}

#[tokio::test]
async fn test_unreachable_server_is_transport_error() {
    // Nothing listens on the discard port.
    let client = ApiClient::new("http://127.0.0.1:9/api", Duration::from_secs(2)).unwrap();
    let err = client.babies(&session(Role::User)).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Transport);
    assert_eq!(err.user_message(), "Could not reach the server");
}

// ============================================================================
// Chat
// ============================================================================

#[tokio::test]
async fn test_send_message_with_stage() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/chat/4"))
        .and(body_json(json!({
            "message": "What do you like?",
            "stage": {"age": "5 years", "description": "Loves drawing", "image_path": "/images/baby4_5.png"}
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "message": "Crayons!",
            "message_count": 2,
            "limit_reached": false
        })))
        .expect(1)
        .mount(&server)
        .await;

    let stage = aibaby::api::LifeStage {
        age: "5 years".to_string(),
        description: "Loves drawing".to_string(),
        image_path: "/images/baby4_5.png".to_string(),
    };
    let reply = client_for(&server)
        .send_message(&session(Role::User), 4, "What do you like?", Some(&stage))
        .await
        .unwrap();
    assert_eq!(reply.message, "Crayons!");
    assert_eq!(reply.message_count, 2);
}

#[tokio::test]
async fn test_message_cap_error_carries_limit_flag() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/chat/4"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": "Message limit reached",
            "limit_reached": true
        })))
        .mount(&server)
        .await;

    let err = client_for(&server)
        .send_message(&session(Role::User), 4, "one more", None)
        .await
        .unwrap_err();
    assert!(err.limit_reached());
    assert_eq!(err.kind(), ErrorKind::Validation);
}

// ============================================================================
// Uploads
// ============================================================================

#[tokio::test]
async fn test_upload_sends_multipart_image() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/questionnaire/upload"))
        .and(header("authorization", "Bearer test-token"))
        .and(body_string_contains("filename=\"me.png\""))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"filename": "u3_me.png"})))
        .expect(1)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("me.png");
    std::fs::write(&file, b"not really a png").unwrap();

    let uploaded = client_for(&server)
        .upload_image(&session(Role::User), &file, MAX_UPLOAD)
        .await
        .unwrap();
    assert_eq!(uploaded.filename, "u3_me.png");
}

#[tokio::test]
async fn test_upload_of_wrong_type_never_reaches_server() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/questionnaire/upload"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("notes.txt");
    std::fs::write(&file, b"hello").unwrap();

    let err = client_for(&server)
        .upload_image(&session(Role::User), &file, MAX_UPLOAD)
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);
}

// ============================================================================
// Dispatch
// ============================================================================

#[tokio::test]
async fn test_load_babies_joins_selected_baby() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/babies"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!([baby_json(1, "Ava", true), baby_json(2, "Ben", true)])),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/babies/selected"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"selected_baby": baby_json(2, "Ben", true)})),
        )
        .mount(&server)
        .await;

    let response = execute(
        &client_for(&server),
        &session(Role::User),
        Request::LoadBabies,
        MAX_UPLOAD,
    )
    .await
    .unwrap();
    let Response::Babies { babies, selected } = response else {
        panic!("expected babies, got {response:?}");
    };
    assert_eq!(babies.len(), 2);
    assert_eq!(babies[0].life_stages[0].age, "5 years");
    assert_eq!(selected.map(|b| b.name), Some("Ben".to_string()));
}

#[tokio::test]
async fn test_load_my_babies_reports_visibility() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/babies/my-babies"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([baby_json(1, "Ava", false)])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/babies"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([baby_json(1, "Ava", false)])))
        .mount(&server)
        .await;

    let response = execute(
        &client_for(&server),
        &session(Role::User),
        Request::LoadMyBabies,
        MAX_UPLOAD,
    )
    .await
    .unwrap();
    let Response::MyBabies {
        babies,
        babies_visible,
    } = response
    else {
        panic!("expected my babies, got {response:?}");
    };
    assert_eq!(babies.len(), 1);
    assert!(!babies_visible);
}

#[tokio::test]
async fn test_admin_dashboard_tolerates_missing_user_list() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/questionnaires/all"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{
            "user_id": 3,
            "email": "mom@example.com",
            "answers": {"energy_level": "Calm"},
            "image_paths": ["u3_me.png"],
            "updated_at": "2026-01-02T03:04:05"
        }])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/babies"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([baby_json(1, "Ava", true)])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/auth/users"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({"error": "Not found"})))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/settings"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"questionnaires_locked": "true"})),
        )
        .mount(&server)
        .await;

    let response = execute(
        &client_for(&server),
        &session(Role::Admin),
        Request::LoadAdmin,
        MAX_UPLOAD,
    )
    .await
    .unwrap();
    let Response::Admin {
        questionnaires,
        babies,
        users,
        locked,
    } = response
    else {
        panic!("expected admin data, got {response:?}");
    };
    assert_eq!(questionnaires[0].email, "mom@example.com");
    assert_eq!(babies.len(), 1);
    assert!(users.is_empty());
    assert!(locked);
}

#[tokio::test]
async fn test_select_and_assign_post_ids() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/babies/selected"))
        .and(body_json(json!({"baby_id": 2})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"message": "ok"})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/babies/2/assign"))
        .and(body_json(json!({"baby_id": 2, "user_id": 3})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"message": "ok"})))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let selected = execute(&client, &session(Role::User), Request::SelectBaby(2), MAX_UPLOAD)
        .await
        .unwrap();
    assert!(matches!(selected, Response::BabySelected(2)));

    let assigned = execute(
        &client,
        &session(Role::Admin),
        Request::AssignBaby {
            baby_id: 2,
            user_id: 3,
        },
        MAX_UPLOAD,
    )
    .await
    .unwrap();
    assert!(matches!(
        assigned,
        Response::BabyAssigned {
            baby_id: 2,
            user_id: 3
        }
    ));
}
