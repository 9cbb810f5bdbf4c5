//! Integration tests: build the router over an in-memory store and a
//! scripted completion provider, then drive it with `oneshot`.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use chrono::Utc;
use mealcraft_api::config::ApiConfig;
use mealcraft_api::{AppState, routes};
use mealcraft_core::completion::{CompletionError, CompletionProvider, CompletionRequest};
use mealcraft_core::store::{MemoryUserStore, UserStore};
use serde_json::{Value, json};
use tower::ServiceExt;

/// Replies with a fixed text, or fails the way it was told to.
struct Scripted(fn(&CompletionRequest) -> Result<String, CompletionError>);

#[async_trait]
impl CompletionProvider for Scripted {
    async fn complete(&self, request: &CompletionRequest) -> Result<String, CompletionError> {
        (self.0)(request)
    }
}

fn echo_instruction(req: &CompletionRequest) -> Result<String, CompletionError> {
    Ok(format!("[{}] {}", req.system_instruction, req.user_text))
}

fn config() -> ApiConfig {
    ApiConfig::from_lookup(|key| match key {
        "JWT_SECRET_KEY" => Some("integration-secret".into()),
        "OPENAI_API_KEY" => Some("sk-test".into()),
        _ => None,
    })
    .expect("config")
}

struct Harness {
    app: Router,
    users: Arc<MemoryUserStore>,
    state: AppState,
}

fn harness(provider: Scripted) -> Harness {
    let users = Arc::new(MemoryUserStore::new());
    let state = AppState::new(config(), users.clone(), Arc::new(provider)).expect("state");
    Harness {
        app: mealcraft_api::router(state.clone()),
        users,
        state,
    }
}

async fn send(app: &Router, req: Request<Body>) -> (StatusCode, header::HeaderMap, Value) {
    let resp = app.clone().oneshot(req).await.expect("request");
    let status = resp.status();
    let headers = resp.headers().clone();
    let body = axum::body::to_bytes(resp.into_body(), usize::MAX)
        .await
        .expect("read body");
    let json = if body.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&body).unwrap_or(Value::Null)
    };
    (status, headers, json)
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn post_login(username: &str, password: &str) -> Request<Body> {
    let form = format!(
        "username={}&password={}",
        username.replace('@', "%40").replace('+', "%2B"),
        password
    );
    Request::builder()
        .method("POST")
        .uri(routes::POST_AUTH_LOGIN)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(form))
        .unwrap()
}

fn get_me(token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().uri(routes::GET_AUTH_USERS_ME);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(Body::empty()).unwrap()
}

async fn register(app: &Router, email: &str, password: &str) -> (StatusCode, Value) {
    let (status, _, json) = send(
        app,
        post_json(
            routes::POST_AUTH_REGISTER,
            json!({"email": email, "password": password}),
        ),
    )
    .await;
    (status, json)
}

#[tokio::test]
async fn health_is_ok_without_dependencies() {
    let h = harness(Scripted(|_| Err(CompletionError::MissingCredential)));
    let req = Request::builder()
        .uri(routes::GET_HEALTH)
        .body(Body::empty())
        .unwrap();
    let (status, _, json) = send(&h.app, req).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json, json!({"status": "ok"}));
}

#[tokio::test]
async fn root_welcomes() {
    let h = harness(Scripted(echo_instruction));
    let req = Request::builder().uri("/").body(Body::empty()).unwrap();
    let (status, _, json) = send(&h.app, req).await;
    assert_eq!(status, StatusCode::OK);
    assert!(json["message"].as_str().unwrap().contains("MealCraft"));
}

#[tokio::test]
async fn register_login_me_round_trip() {
    let h = harness(Scripted(echo_instruction));

    let (status, json) = register(&h.app, "cook@example.com", "password123").await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(json, json!({"email": "cook@example.com"}));

    let (status, _, json) = send(&h.app, post_login("cook@example.com", "password123")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["token_type"], "bearer");
    let token = json["access_token"].as_str().unwrap().to_string();

    let claims = h.state.tokens.verify(&token).unwrap();
    assert_eq!(claims.sub, "cook@example.com");

    let (status, _, json) = send(&h.app, get_me(Some(&token))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json, json!({"email": "cook@example.com"}));
}

#[tokio::test]
async fn duplicate_registration_keeps_one_record() {
    let h = harness(Scripted(echo_instruction));
    let (first, _) = register(&h.app, "cook@example.com", "password123").await;
    assert_eq!(first, StatusCode::CREATED);

    let (second, json) = register(&h.app, "cook@example.com", "different-pass").await;
    assert_eq!(second, StatusCode::BAD_REQUEST);
    assert_eq!(json["message"], "Email already registered");
    assert_eq!(h.users.len(), 1);

    // The first password still works.
    let (status, _, _) = send(&h.app, post_login("cook@example.com", "password123")).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn login_failures_are_indistinguishable() {
    let h = harness(Scripted(echo_instruction));
    register(&h.app, "cook@example.com", "password123").await;

    let unknown = send(&h.app, post_login("nobody@example.com", "password123")).await;
    let wrong = send(&h.app, post_login("cook@example.com", "wrong-password")).await;

    assert_eq!(unknown.0, StatusCode::BAD_REQUEST);
    assert_eq!(unknown.0, wrong.0);
    assert_eq!(unknown.2, wrong.2);
    assert_eq!(unknown.2["message"], "Incorrect email or password");
}

#[tokio::test]
async fn me_rejects_missing_tampered_and_expired_tokens() {
    let h = harness(Scripted(echo_instruction));
    register(&h.app, "cook@example.com", "password123").await;

    let (_, _, json) = send(&h.app, post_login("cook@example.com", "password123")).await;
    let token = json["access_token"].as_str().unwrap().to_string();
    let tampered = format!("{}x", token);
    let expired = h
        .state
        .tokens
        .issue_at(
            "cook@example.com",
            chrono::Duration::minutes(1),
            Utc::now() - chrono::Duration::minutes(2),
        )
        .unwrap();

    for candidate in [None, Some("garbage"), Some(tampered.as_str()), Some(expired.as_str())] {
        let (status, headers, json) = send(&h.app, get_me(candidate)).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED, "token {candidate:?}");
        assert_eq!(headers.get(header::WWW_AUTHENTICATE).unwrap(), "Bearer");
        assert_eq!(json["message"], "Could not validate credentials");
        assert!(json.get("email").is_none());
    }
}

#[tokio::test]
async fn me_rejects_token_for_unknown_user() {
    let h = harness(Scripted(echo_instruction));
    let token = h.state.tokens.issue("ghost@example.com").unwrap();
    let (status, headers, json) = send(&h.app, get_me(Some(&token))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(headers.contains_key(header::WWW_AUTHENTICATE));
    assert_eq!(json["message"], "Could not validate credentials");
    assert!(h.users.find_by_email("ghost@example.com").await.unwrap().is_none());
}

#[tokio::test]
async fn respond_classifies_recipe_reply() {
    let h = harness(Scripted(|_| {
        Ok("## Ingredients\n- 4 eggs\n- spinach\n## Steps\n1. Whisk".into())
    }));
    let (status, _, json) = send(
        &h.app,
        post_json(routes::POST_RESPOND, json!({"query": "high protein breakfast"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["type"], "recipe");
    assert!(json["content"].as_str().unwrap().contains("Ingredients"));
    assert!(json["latency_seconds"].is_number());
    assert!(json["timestamp"].is_string());
}

#[tokio::test]
async fn respond_without_keywords_is_text() {
    let h = harness(Scripted(|_| Ok("Greek yoghurt has about 10g protein per 100g.".into())));
    let (status, _, json) = send(
        &h.app,
        post_json(routes::POST_RESPOND, json!({"query": "protein in yoghurt"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["type"], "text");
}

#[tokio::test]
async fn pairing_endpoints_use_their_own_instruction() {
    let h = harness(Scripted(echo_instruction));

    let (status, _, json) = send(
        &h.app,
        post_json(routes::POST_BEVERAGE_PAIRINGS, json!({"query": "grilled salmon"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let content = json["content"].as_str().unwrap();
    assert!(content.contains("sommelier"));
    assert!(content.ends_with("grilled salmon"));

    let (status, _, json) = send(
        &h.app,
        post_json(routes::POST_DISH_PAIRINGS, json!({"query": "Rioja"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(json["content"].as_str().unwrap().contains("pairing specialist"));
}

#[tokio::test]
async fn completion_failures_map_to_statuses() {
    let cases: [(Scripted, StatusCode, &str); 3] = [
        (
            Scripted(|_| Err(CompletionError::MissingCredential)),
            StatusCode::INTERNAL_SERVER_ERROR,
            "service_misconfigured",
        ),
        (
            Scripted(|_| Err(CompletionError::Timeout(Duration::from_secs(30)))),
            StatusCode::GATEWAY_TIMEOUT,
            "gateway_timeout",
        ),
        (
            Scripted(|_| {
                Err(CompletionError::Upstream {
                    kind: "UpstreamStatus",
                    message: "500 internal details".into(),
                })
            }),
            StatusCode::BAD_GATEWAY,
            "generation_failed",
        ),
    ];

    for (provider, expected_status, expected_error) in cases {
        let h = harness(provider);
        let (status, _, json) = send(
            &h.app,
            post_json(routes::POST_RESPOND, json!({"query": "dinner ideas"})),
        )
        .await;
        assert_eq!(status, expected_status);
        assert_eq!(json["error"], expected_error);
        assert!(!json["message"].as_str().unwrap().contains("internal details"));
    }
}

#[tokio::test]
async fn blank_query_is_rejected() {
    let h = harness(Scripted(echo_instruction));
    let (status, _, json) = send(
        &h.app,
        post_json(routes::POST_RESPOND, json!({"query": "  "})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"], "validation_error");
}

#[tokio::test]
async fn malformed_json_bodies_get_error_envelope() {
    let h = harness(Scripted(echo_instruction));

    let (status, _, json) = send(
        &h.app,
        post_json(routes::POST_AUTH_REGISTER, json!({"email": "cook@example.com"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"], "validation_error");
    assert!(json["message"].as_str().unwrap().contains("password"));

    let (status, _, json) = send(
        &h.app,
        post_json(routes::POST_RESPOND, json!({"query": 42})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"], "validation_error");

    let untyped = Request::builder()
        .method("POST")
        .uri(routes::POST_DISH_PAIRINGS)
        .body(Body::from(r#"{"query": "port"}"#))
        .unwrap();
    let (status, _, json) = send(&h.app, untyped).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"], "validation_error");
    assert!(h.users.is_empty());
}

#[tokio::test]
async fn login_form_missing_field_gets_error_envelope() {
    let h = harness(Scripted(echo_instruction));
    let req = Request::builder()
        .method("POST")
        .uri(routes::POST_AUTH_LOGIN)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from("username=cook%40example.com"))
        .unwrap();
    let (status, _, json) = send(&h.app, req).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"], "validation_error");
    assert!(json["message"].as_str().unwrap().contains("password"));
}

#[tokio::test]
async fn short_passwords_are_accepted() {
    let h = harness(Scripted(echo_instruction));
    let (status, json) = register(&h.app, "brief@example.com", "pw").await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(json["email"], "brief@example.com");

    let (status, _, json) = send(&h.app, post_login("brief@example.com", "pw")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["token_type"], "bearer");
}
