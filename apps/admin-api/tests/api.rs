//! Router-level tests: every request goes through the full middleware stack
//! against a fresh in-memory database.

use axum::body::{to_bytes, Body};
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;

use meridian_api::bootstrap::ensure_superuser;
use meridian_api::{router, ApiConfig, AppState};
use meridian_db::{Database, DbConfig};

const API: &str = "/api/v1";

async fn app() -> Router {
    let db = Database::new(DbConfig::in_memory()).await.unwrap();
    let config = ApiConfig::for_tests();
    ensure_superuser(&db, &config).await.unwrap();
    router(AppState::new(db, config))
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

fn request(method: Method, uri: &str, token: Option<&str>, body: Option<Value>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(format!("{API}{uri}"));
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

async fn login(app: &Router, username: &str, password: &str) -> (StatusCode, Value) {
    let form = format!("username={username}&password={password}");
    let request = Request::builder()
        .method(Method::POST)
        .uri(format!("{API}/login/access-token"))
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(form))
        .unwrap();
    send(app, request).await
}

async fn admin_token(app: &Router) -> String {
    let (status, body) = login(app, "admin", "admin123").await;
    assert_eq!(status, StatusCode::OK);
    body["access_token"].as_str().unwrap().to_string()
}

async fn create_product(app: &Router, token: &str, product_id: i64, sku: &str) -> (StatusCode, Value) {
    let body = json!({
        "product_id": product_id,
        "product_name": "iPhone 15 Pro 128GB",
        "sku": sku,
        "unit_price_cents": 799_900,
    });
    send(app, request(Method::POST, "/products/", Some(token), Some(body))).await
}

#[tokio::test]
async fn test_health_needs_no_token() {
    let app = app().await;
    let request = Request::builder().uri("/health").body(Body::empty()).unwrap();

    let (status, body) = send(&app, request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["database"], "connected");
}

#[tokio::test]
async fn test_missing_token_is_unauthorized() {
    let app = app().await;

    let (status, body) = send(&app, request(Method::GET, "/products/", None, None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "unauthorized");
}

#[tokio::test]
async fn test_login() {
    let app = app().await;

    let (status, _) = login(&app, "admin", "wrong-password").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let token = admin_token(&app).await;
    let (status, body) = send(&app, request(Method::POST, "/login/test-token", Some(&token), None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["username"], "admin");
    assert!(body.get("password_hash").is_none());
}

#[tokio::test]
async fn test_duplicate_sku_conflicts() {
    let app = app().await;
    let token = admin_token(&app).await;

    let (status, body) = create_product(&app, &token, 1001, "IP15P-128").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["sku"], "IP15P-128");

    let (status, body) = create_product(&app, &token, 1002, "IP15P-128").await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "conflict");
}

#[tokio::test]
async fn test_product_list_query_validation() {
    let app = app().await;
    let token = admin_token(&app).await;
    create_product(&app, &token, 1001, "IP15P-128").await;

    let (status, body) = send(&app, request(Method::GET, "/products/?limit=0", Some(&token), None)).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["code"], "validation_error");

    // Unknown status values are ignored, not rejected
    let (status, body) = send(
        &app,
        request(Method::GET, "/products/?status=discontinued", Some(&token), None),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 1);
}

#[tokio::test]
async fn test_low_stock_raises_single_alert() {
    let app = app().await;
    let token = admin_token(&app).await;
    create_product(&app, &token, 1001, "IP15P-128").await;

    let inventory = json!({
        "inventory_id": 1,
        "product_id": 1001,
        "current_stock_quantity": 15,
        "alert_threshold": 20,
    });
    let (status, _) = send(&app, request(Method::POST, "/inventory/", Some(&token), Some(inventory))).await;
    assert_eq!(status, StatusCode::OK);

    let (status, alerts) = send(&app, request(Method::GET, "/inventory/alerts/", Some(&token), None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(alerts.as_array().unwrap().len(), 1);
    assert_eq!(alerts[0]["alert_status"], "unsent");

    // Still below threshold after the first update, then restocked: the open
    // alert is neither duplicated nor closed automatically
    let update = json!({ "current_stock_quantity": 10 });
    send(&app, request(Method::PUT, "/inventory/1", Some(&token), Some(update))).await;
    let update = json!({ "current_stock_quantity": 25 });
    let (status, body) = send(&app, request(Method::PUT, "/inventory/1", Some(&token), Some(update))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["current_stock_quantity"], 25);

    let (_, alerts) = send(&app, request(Method::GET, "/inventory/alerts/", Some(&token), None)).await;
    assert_eq!(alerts.as_array().unwrap().len(), 1);
    assert_eq!(alerts[0]["alert_status"], "unsent");

    // One inventory record per product
    let duplicate = json!({
        "inventory_id": 2,
        "product_id": 1001,
        "current_stock_quantity": 50,
        "alert_threshold": 20,
    });
    let (status, _) = send(&app, request(Method::POST, "/inventory/", Some(&token), Some(duplicate))).await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_resolve_alert() {
    let app = app().await;
    let token = admin_token(&app).await;
    create_product(&app, &token, 1001, "IP15P-128").await;
    let inventory = json!({
        "inventory_id": 1,
        "product_id": 1001,
        "current_stock_quantity": 5,
        "alert_threshold": 20,
    });
    send(&app, request(Method::POST, "/inventory/", Some(&token), Some(inventory))).await;
    let (_, alerts) = send(&app, request(Method::GET, "/inventory/alerts/", Some(&token), None)).await;
    let alert_id = alerts[0]["alert_id"].as_i64().unwrap();

    let (status, _) = send(
        &app,
        request(
            Method::PUT,
            &format!("/inventory/alerts/{alert_id}?alert_status=ignored"),
            Some(&token),
            None,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let (status, body) = send(
        &app,
        request(
            Method::PUT,
            &format!("/inventory/alerts/{alert_id}?alert_status=resolved&handler_name=Dana"),
            Some(&token),
            None,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["alert_status"], "resolved");
    assert_eq!(body["handler_name"], "Dana");
    assert!(!body["resolved_at"].is_null());
}

#[tokio::test]
async fn test_regular_user_privileges() {
    let app = app().await;
    let token = admin_token(&app).await;
    create_product(&app, &token, 1001, "IP15P-128").await;

    let new_user = json!({ "username": "clerk", "password": "clerk-pass", "full_name": "Store Clerk" });
    let (status, body) = send(&app, request(Method::POST, "/users/", Some(&token), Some(new_user))).await;
    assert_eq!(status, StatusCode::OK);
    let clerk_id = body["user_id"].as_i64().unwrap();

    let (status, body) = login(&app, "clerk", "clerk-pass").await;
    assert_eq!(status, StatusCode::OK);
    let clerk = body["access_token"].as_str().unwrap().to_string();

    let (status, _) = send(&app, request(Method::GET, &format!("/users/{clerk_id}"), Some(&clerk), None)).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(&app, request(Method::DELETE, "/products/1001", Some(&clerk), None)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["code"], "forbidden");

    let (status, _) = send(&app, request(Method::GET, "/users/", Some(&clerk), None)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // No linked messaging contact
    let (status, _) = send(&app, request(Method::GET, "/communication/messages/1", Some(&clerk), None)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = send(&app, request(Method::DELETE, "/products/1001", Some(&token), None)).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["message"].is_string());
}

#[tokio::test]
async fn test_deleted_contact_keeps_history() {
    let app = app().await;
    let token = admin_token(&app).await;

    let contact = json!({ "name": "Acme Supply", "role": "supplier", "contact_info": "acme@example.com" });
    let (status, body) = send(&app, request(Method::POST, "/communication/contacts", Some(&token), Some(contact))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "offline");
    let contact_id = body["contact_id"].as_i64().unwrap();

    let message = json!({ "receiver_id": contact_id, "message_content": "Restock ETA?" });
    let (status, _) = send(&app, request(Method::POST, "/communication/messages", Some(&token), Some(message))).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(
        &app,
        request(Method::DELETE, &format!("/communication/contacts/{contact_id}"), Some(&token), None),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, list) = send(&app, request(Method::GET, "/communication/contacts", Some(&token), None)).await;
    let ids: Vec<i64> = list["contacts"]
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["contact_id"].as_i64().unwrap())
        .collect();
    assert!(!ids.contains(&contact_id));

    let (status, messages) = send(
        &app,
        request(Method::GET, &format!("/communication/messages/{contact_id}"), Some(&token), None),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(messages.as_array().unwrap().len(), 1);
    assert_eq!(messages[0]["message_content"], "Restock ETA?");
}

#[tokio::test]
async fn test_sync_trigger_and_order_channel() {
    let app = app().await;
    let token = admin_token(&app).await;

    let (status, _) = send(&app, request(Method::POST, "/order-sync/sync/NOPE", Some(&token), None)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let channel = json!({
        "channel_id": 1,
        "channel_name": "Tmall Flagship",
        "channel_code": "TMALL",
        "platform_type": "marketplace",
        "commission_rate_bps": 550,
    });
    let (status, _) = send(&app, request(Method::POST, "/sales-channels/", Some(&token), Some(channel))).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(&app, request(Method::POST, "/order-sync/sync/TMALL", Some(&token), None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "processing");

    let order = json!({
        "order_id": 5001,
        "customer_user_id": "cust-1",
        "channel_id": 99,
        "order_amount_cents": 10_000,
        "order_status": "pending",
    });
    let (status, body) = send(&app, request(Method::POST, "/sales-orders/", Some(&token), Some(order))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "not_found");
}

#[tokio::test]
async fn test_oversized_amounts_are_rejected() {
    let app = app().await;
    let token = admin_token(&app).await;

    let huge = i64::MAX / 2 + 1;
    let order = json!({
        "order_id": 5001,
        "customer_user_id": "cust-1",
        "channel_id": 1,
        "order_amount_cents": 0,
        "order_status": "pending",
        "order_items": [
            { "product_id": 1, "quantity": 1, "unit_price_cents": 100, "total_price_cents": huge },
            { "product_id": 2, "quantity": 1, "unit_price_cents": 100, "total_price_cents": huge },
        ],
    });
    let (status, body) = send(&app, request(Method::POST, "/sales-orders/", Some(&token), Some(order))).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["code"], "validation_error");

    let product = json!({
        "product_id": 1001,
        "product_name": "Gold Bar",
        "sku": "GOLD-1",
        "unit_price_cents": i64::MAX / 2,
    });
    let (status, _) = send(&app, request(Method::POST, "/products/", Some(&token), Some(product))).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    create_product(&app, &token, 1001, "IP15P-128").await;
    let inventory = json!({
        "inventory_id": 1,
        "product_id": 1001,
        "current_stock_quantity": i64::MAX,
        "alert_threshold": 20,
    });
    let (status, _) = send(&app, request(Method::POST, "/inventory/", Some(&token), Some(inventory))).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let (status, body) = send(&app, request(Method::GET, "/dashboard/statistics", Some(&token), None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total_orders"], 0);
}
