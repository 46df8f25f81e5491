use axum_test::TestServer;
use http::StatusCode;
use sea_orm::DatabaseConnection;
use serde_json::{Value, json};
use uuid::Uuid;

use phonemart_auth_types::bearer::BearerAuth;
use phonemart_testing::auth::MockAuth;

use phonemart_marketplace::infra::mail::Mailer;
use phonemart_marketplace::infra::media::MediaClient;
use phonemart_marketplace::infra::notify::NotificationHub;
use phonemart_marketplace::router::build_router;
use phonemart_marketplace::state::AppState;

/// Router over a disconnected database: only requests rejected before storage succeed.
fn server(bearer: Option<BearerAuth>) -> TestServer {
    let client = reqwest::Client::new();
    let state = AppState {
        db: DatabaseConnection::Disconnected,
        hub: NotificationHub::new(16),
        mailer: Mailer::new(client.clone(), None, "no-reply@phonemart.test"),
        media: MediaClient::new(client, None),
    };
    TestServer::new(build_router(state, bearer)).unwrap()
}

fn with_identity(request: axum_test::TestRequest, auth: MockAuth) -> axum_test::TestRequest {
    auth.header_pairs()
        .into_iter()
        .fold(request, |request, (name, value)| request.add_header(name, value))
}

// ── Health ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn should_report_liveness() {
    let response = server(None).get("/healthz").await;
    response.assert_status(StatusCode::OK);
}

#[tokio::test]
async fn should_report_not_ready_without_database() {
    let response = server(None).get("/readyz").await;
    response.assert_status(StatusCode::SERVICE_UNAVAILABLE);
}

// ── Identity ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn should_reject_missing_identity() {
    let response = server(None).get("/cart").await;
    response.assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn should_forbid_buyer_on_admin_dashboard() {
    let server = server(None);
    let response = with_identity(server.get("/admin/dashboard"), MockAuth::buyer()).await;
    response.assert_status(StatusCode::FORBIDDEN);
    let body: Value = response.json();
    assert_eq!(body["kind"], "FORBIDDEN");
}

#[tokio::test]
async fn should_strip_identity_headers_when_bearer_auth_is_enabled() {
    let server = server(Some(BearerAuth::new("router-test-secret")));
    let response = with_identity(server.get("/cart"), MockAuth::buyer()).await;
    response.assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn should_forbid_non_admin_before_reading_moderation_body() {
    let server = server(None);
    let id = Uuid::now_v7();
    for path in [
        format!("/admin/phones/{id}/approve"),
        format!("/admin/phones/{id}/reject"),
        "/admin/phones/batch-approve".to_owned(),
    ] {
        let response = with_identity(server.post(&path), MockAuth::seller())
            .bytes("{not json".into())
            .content_type("application/json")
            .await;
        response.assert_status(StatusCode::FORBIDDEN);
        let body: Value = response.json();
        assert_eq!(body["kind"], "FORBIDDEN", "{path}");
    }
}

#[tokio::test]
async fn should_reject_malformed_batch_body_from_admin() {
    let server = server(None);
    let response = with_identity(server.post("/admin/phones/batch-approve"), MockAuth::admin())
        .bytes("{not json".into())
        .content_type("application/json")
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["kind"], "MISSING_DATA");
}

// ── Validation before storage ────────────────────────────────────────────────

#[tokio::test]
async fn should_reject_unknown_brand_filter() {
    let response = server(None).get("/phones?brand=nokia-3310-ultra").await;
    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["kind"], "MISSING_DATA");
}

#[tokio::test]
async fn should_reject_negative_cart_quantity() {
    let server = server(None);
    let response = with_identity(server.post("/cart/items"), MockAuth::buyer())
        .json(&json!({ "phone_id": Uuid::now_v7(), "quantity": -1 }))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["kind"], "INVALID_QUANTITY");
}

#[tokio::test]
async fn should_reject_zero_cart_quantity() {
    let server = server(None);
    let response = with_identity(server.post("/cart/items"), MockAuth::buyer())
        .json(&json!({ "phone_id": Uuid::now_v7(), "quantity": 0 }))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn should_reject_out_of_range_rating() {
    let server = server(None);
    let path = format!("/users/{}/ratings", Uuid::new_v4());
    for score in [0, 6, 300] {
        let response = with_identity(server.post(&path), MockAuth::buyer())
            .json(&json!({ "score": score }))
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);
        let body: Value = response.json();
        assert_eq!(body["kind"], "INVALID_RATING");
    }
}

#[tokio::test]
async fn should_require_rejection_reason() {
    let server = server(None);
    let path = format!("/admin/phones/{}/reject", Uuid::now_v7());
    let response = with_identity(server.post(&path), MockAuth::admin()).await;
    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["kind"], "MISSING_REJECTION_REASON");
}

#[tokio::test]
async fn should_refuse_order_without_delivery_details() {
    let server = server(None);
    let response = with_identity(server.post("/orders"), MockAuth::buyer())
        .json(&json!({ "delivery_address": "", "contact_number": "555" }))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn should_forbid_seller_changing_order_status() {
    let server = server(None);
    let path = format!("/orders/{}/status", Uuid::now_v7());
    let response = with_identity(server.patch(&path), MockAuth::seller())
        .json(&json!({ "status": "confirmed" }))
        .await;
    response.assert_status(StatusCode::FORBIDDEN);
}
