// Request-gate behavior through the real router: bearer extraction, tenant
// binding, panic recovery and the error envelope. No database is required;
// the pool is lazy and the gate never touches it.
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::middleware;
use axum::routing::get;
use axum::Router;
use chrono::Utc;
use serde_json::Value;
use sqlx::postgres::PgPoolOptions;
use tower::ServiceExt;
use uuid::Uuid;

use phyto_api::app::{router, AppState};
use phyto_api::auth::TokenService;
use phyto_api::config::TokenConfig;
use phyto_api::database::models::user::User;
use phyto_api::middleware::{auth, recover, request_id, tenant};

fn test_state() -> AppState {
    let pool = PgPoolOptions::new()
        .connect_lazy("postgres://postgres@localhost/phyto_test")
        .expect("lazy pool");
    let tokens = TokenService::new(TokenConfig {
        secret: "test-secret".to_string(),
        issuer: "phyto-api".to_string(),
        audience: "phyto-api".to_string(),
        ttl_minutes: 60,
    });
    AppState::new(pool, tokens)
}

fn mint_token(state: &AppState, tenant: Option<&str>) -> String {
    let user = User {
        id: Uuid::new_v4(),
        email: "ana@terra.eco".to_string(),
        name: "Ana".to_string(),
        password_hash: String::new(),
        tenant_id: tenant.map(str::to_string),
        role_id: None,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    };
    state.tokens.mint(&user).expect("mint")
}

async fn boom_handler() -> &'static str {
    panic!("boom in handler")
}

/// The full gate around handlers that never reach the database
fn gated_router(state: AppState) -> Router {
    let protected = Router::new()
        .route("/ok", get(|| async { "ok" }))
        .route("/boom", get(boom_handler))
        .layer(middleware::from_fn(tenant::tenant_middleware))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth::auth_middleware,
        ));

    Router::new()
        .merge(protected)
        .layer(middleware::from_fn(recover::recover_middleware))
        .layer(middleware::from_fn(request_id::request_id_middleware))
        .with_state(state)
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    serde_json::from_slice(&bytes).expect("json body")
}

#[tokio::test]
async fn missing_token_is_unauthorized() {
    let app = router(test_state());

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/v1/users")
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = body_json(response).await;
    assert_eq!(body["error"]["code"], "unauthorized");
    assert!(!body["requestId"].as_str().unwrap_or_default().is_empty());
}

#[tokio::test]
async fn valid_token_without_tenant_is_forbidden() {
    let state = test_state();
    let token = mint_token(&state, None);
    let app = router(state);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/v1/users")
                .header("authorization", format!("Bearer {token}"))
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    let body = body_json(response).await;
    assert_eq!(body["error"]["code"], "forbidden");
}

#[tokio::test]
async fn tenantless_token_never_reaches_the_handler() {
    let state = test_state();
    let token = mint_token(&state, None);
    let app = gated_router(state);

    // /boom would panic and respond 500 if the gate let the request through
    let response = app
        .oneshot(
            Request::builder()
                .uri("/boom")
                .header("authorization", format!("Bearer {token}"))
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn tenant_bound_request_is_admitted() {
    let state = test_state();
    let token = mint_token(&state, Some("tenant-a"));
    let app = gated_router(state);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/ok")
                .header("authorization", format!("Bearer {token}"))
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn panic_is_isolated_and_service_keeps_running() {
    let state = test_state();
    let token = mint_token(&state, Some("tenant-a"));
    let app = gated_router(state);

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/boom")
                .header("authorization", format!("Bearer {token}"))
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = body_json(response).await;
    assert_eq!(body["error"]["code"], "internal");
    // the panic value must never leak into the public message
    assert_eq!(body["error"]["message"], "internal server error");

    // subsequent requests are still served
    let response = app
        .oneshot(
            Request::builder()
                .uri("/ok")
                .header("authorization", format!("Bearer {token}"))
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn incoming_correlation_id_is_echoed() {
    let app = router(test_state());

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/v1/users")
                .header("x-request-id", "corr-123")
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("response");

    assert_eq!(
        response
            .headers()
            .get("x-request-id")
            .and_then(|v| v.to_str().ok()),
        Some("corr-123")
    );
    let body = body_json(response).await;
    assert_eq!(body["requestId"], "corr-123");
}

#[tokio::test]
async fn garbage_bearer_token_is_unauthorized() {
    let app = router(test_state());

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/v1/auth/me")
                .header("authorization", "Bearer not.a.token")
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = body_json(response).await;
    assert_eq!(body["error"]["code"], "unauthorized");
}

#[tokio::test]
async fn malformed_json_body_fails_inside_the_envelope() {
    let app = router(test_state());

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/v1/auth/login")
                .header("content-type", "application/json")
                .body(Body::from("{not json"))
                .expect("request"),
        )
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(
        response
            .headers()
            .get("content-type")
            .and_then(|v| v.to_str().ok()),
        Some("application/json; charset=utf-8")
    );
    let body = body_json(response).await;
    assert_eq!(body["error"]["code"], "invalid");
    assert!(!body["requestId"].as_str().unwrap_or_default().is_empty());
}

#[tokio::test]
async fn bad_path_parameter_fails_inside_the_envelope() {
    let state = test_state();
    let token = mint_token(&state, Some("tenant-a"));
    let app = router(state);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/v1/phyto-analyses/not-a-uuid")
                .header("authorization", format!("Bearer {token}"))
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = body_json(response).await;
    assert_eq!(body["error"]["code"], "invalid");
}

#[tokio::test]
async fn bad_query_parameter_fails_inside_the_envelope() {
    let state = test_state();
    let token = mint_token(&state, Some("tenant-a"));
    let app = router(state);

    // limit fails to parse, so the handler never reaches the database
    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/v1/users?limit=abc")
                .header("authorization", format!("Bearer {token}"))
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = body_json(response).await;
    assert_eq!(body["error"]["code"], "invalid");
}

#[tokio::test]
async fn me_returns_claim_projection() {
    let state = test_state();
    let token = mint_token(&state, Some("tenant-a"));
    let app = router(state);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/v1/auth/me")
                .header("authorization", format!("Bearer {token}"))
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["email"], "ana@terra.eco");
    assert_eq!(body["tenantId"], "tenant-a");
}
