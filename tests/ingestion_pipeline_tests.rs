//! End-to-end ingestion pipeline tests driving the full router against an
//! in-memory database with migrations applied.

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use migration::{Migrator, MigratorTrait};
use sea_orm::{DatabaseConnection, EntityTrait};
use tower::ServiceExt;
use uuid::Uuid;

use shopstream::config::AppConfig;
use shopstream::db::init_pool;
use shopstream::models;
use shopstream::repositories::tenant::CreateTenantRequest;
use shopstream::repositories::{
    CustomEventRepository, CustomerRepository, OrderRepository, ProductRepository,
    TenantRepository, WebhookLogRepository,
};
use shopstream::server::{AppState, create_app};
use shopstream::webhook_verification::compute_signature;

const SECRET: &str = "integration_secret";
const DOMAIN: &str = "demo-store.example.com";

async fn setup() -> (Router, DatabaseConnection, Uuid) {
    let config = AppConfig {
        profile: "test".to_string(),
        database_url: "sqlite::memory:".to_string(),
        webhook_secret: Some(SECRET.to_string()),
        ..Default::default()
    };

    let db = init_pool(&config).await.expect("test pool");
    Migrator::up(&db, None).await.expect("migrations");

    let tenant = TenantRepository::new(&db)
        .create_tenant(CreateTenantRequest {
            name: "Demo Store".to_string(),
            shop_domain: DOMAIN.to_string(),
            webhook_secret: None,
        })
        .await
        .expect("seed tenant");

    let state = AppState {
        db: db.clone(),
        config: Arc::new(config),
    };
    (create_app(state), db, tenant.id)
}

fn signed(path: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(path)
        .header("content-type", "application/json")
        .header("X-Shop-Domain", DOMAIN)
        .header("X-Webhook-Signature", compute_signature(body.as_bytes(), SECRET))
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn post_ok(app: &Router, path: &str, body: &str) {
    let response = app.clone().oneshot(signed(path, body)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK, "POST {path}");
}

#[tokio::test]
async fn order_redelivery_is_idempotent() {
    let (app, db, tenant_id) = setup().await;

    let first = r#"{
        "id": 5001,
        "total_price": "30.00",
        "line_items": [
            {"title": "Mug", "quantity": 1, "price": "10.00"},
            {"title": "Shirt", "quantity": 1, "price": "20.00"}
        ]
    }"#;
    post_ok(&app, "/webhooks/orders/create", first).await;

    let second = r#"{
        "id": 5001,
        "total_price": "10.00",
        "line_items": [
            {"title": "Mug", "quantity": 1, "price": "10.00"}
        ]
    }"#;
    post_ok(&app, "/webhooks/orders/create", second).await;

    let orders = models::Order::find().all(&db).await.unwrap();
    assert_eq!(orders.len(), 1, "replay must not create a second order");
    assert_eq!(orders[0].total_price_cents, 1000);

    let repo = OrderRepository::new(&db);
    let order = repo
        .find_by_external_id(tenant_id, "5001")
        .await
        .unwrap()
        .unwrap();
    let items = repo.line_items(order.id).await.unwrap();
    assert_eq!(items.len(), 1, "line items are replaced, not merged");
    assert_eq!(items[0].title.as_deref(), Some("Mug"));
}

#[tokio::test]
async fn order_with_unknown_customer_keeps_null_reference() {
    let (app, db, tenant_id) = setup().await;

    let body = r#"{
        "id": 7001,
        "customer": {"id": 999},
        "total_price": "5.00"
    }"#;
    post_ok(&app, "/webhooks/orders/create", body).await;

    let order = OrderRepository::new(&db)
        .find_by_external_id(tenant_id, "7001")
        .await
        .unwrap()
        .expect("order persisted despite unresolved customer");
    assert!(order.customer_id.is_none());
}

#[tokio::test]
async fn no_reference_backfill_after_customer_arrives() {
    let (app, db, tenant_id) = setup().await;

    post_ok(
        &app,
        "/webhooks/orders/create",
        r#"{"id": 7002, "customer": {"id": 42}}"#,
    )
    .await;
    post_ok(
        &app,
        "/webhooks/customers/create",
        r#"{"id": 42, "email": "late@example.com"}"#,
    )
    .await;

    let order = OrderRepository::new(&db)
        .find_by_external_id(tenant_id, "7002")
        .await
        .unwrap()
        .unwrap();
    assert!(
        order.customer_id.is_none(),
        "historical null references stay null"
    );
}

#[tokio::test]
async fn empty_money_fields_default_to_zero() {
    let (app, db, tenant_id) = setup().await;

    post_ok(
        &app,
        "/webhooks/orders/create",
        r#"{"id": 7003, "total_price": "", "subtotal_price": "garbage"}"#,
    )
    .await;

    let order = OrderRepository::new(&db)
        .find_by_external_id(tenant_id, "7003")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(order.total_price_cents, 0);
    assert_eq!(order.subtotal_price_cents, 0);
    assert_eq!(order.currency, "USD");
}

#[tokio::test]
async fn customer_update_leaves_absent_fields_unchanged() {
    let (app, db, tenant_id) = setup().await;

    post_ok(
        &app,
        "/webhooks/customers/create",
        r#"{"id": 11, "email": "a@example.com", "first_name": "Ada", "total_spent": "100.00"}"#,
    )
    .await;
    post_ok(
        &app,
        "/webhooks/customers/update",
        r#"{"id": 11, "email": "new@example.com"}"#,
    )
    .await;

    let customer = CustomerRepository::new(&db)
        .find_by_external_id(tenant_id, "11")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(customer.email.as_deref(), Some("new@example.com"));
    assert_eq!(customer.first_name.as_deref(), Some("Ada"));
    assert_eq!(customer.total_spent_cents, 10000);
}

#[tokio::test]
async fn customer_create_replay_overwrites_full_state() {
    let (app, db, tenant_id) = setup().await;

    post_ok(
        &app,
        "/webhooks/customers/create",
        r#"{"id": 12, "email": "x@example.com", "first_name": "Max", "total_spent": "50.00"}"#,
    )
    .await;
    post_ok(
        &app,
        "/webhooks/customers/create",
        r#"{"id": 12, "email": "x@example.com"}"#,
    )
    .await;

    let customers = models::Customer::find().all(&db).await.unwrap();
    assert_eq!(customers.len(), 1);

    let customer = CustomerRepository::new(&db)
        .find_by_external_id(tenant_id, "12")
        .await
        .unwrap()
        .unwrap();
    assert!(customer.first_name.is_none(), "create replay zero-defaults");
    assert_eq!(customer.total_spent_cents, 0);
}

#[tokio::test]
async fn unknown_tenant_creates_no_entity_rows() {
    let (app, db, _tenant_id) = setup().await;

    let body = r#"{"id": 1, "email": "a@example.com"}"#;
    let request = Request::builder()
        .method("POST")
        .uri("/webhooks/customers/create")
        .header("content-type", "application/json")
        .header("X-Shop-Domain", "other.example.com")
        .header(
            "X-Webhook-Signature",
            compute_signature(body.as_bytes(), SECRET),
        )
        .body(Body::from(body))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    assert!(models::Customer::find().all(&db).await.unwrap().is_empty());
    let logs = models::WebhookLog::find().all(&db).await.unwrap();
    assert_eq!(logs.len(), 1);
    assert!(logs[0].tenant_id.is_none());
}

#[tokio::test]
async fn cart_and_checkout_events_are_recorded() {
    let (app, db, tenant_id) = setup().await;

    post_ok(
        &app,
        "/webhooks/customers/create",
        r#"{"id": 77, "email": "c@example.com"}"#,
    )
    .await;
    post_ok(
        &app,
        "/webhooks/carts/create",
        r#"{"id": 301, "customer": {"id": 77}, "total_price": "15.00", "line_items": [{}, {}, {}]}"#,
    )
    .await;
    post_ok(
        &app,
        "/webhooks/checkouts/create",
        r#"{"id": 302, "total_price": "15.00", "email": "c@example.com"}"#,
    )
    .await;

    let repo = CustomEventRepository::new(&db);
    let carts = repo.list_by_type(tenant_id, "cart_abandoned").await.unwrap();
    assert_eq!(carts.len(), 1);
    assert!(carts[0].customer_id.is_some());
    assert_eq!(carts[0].event_data["total_price_cents"], 1500);
    assert_eq!(carts[0].event_data["line_items_count"], 3);

    let checkouts = repo
        .list_by_type(tenant_id, "checkout_started")
        .await
        .unwrap();
    assert_eq!(checkouts.len(), 1);
    assert!(checkouts[0].customer_id.is_none());
}

#[tokio::test]
async fn full_scenario_resolves_known_references() {
    let (app, db, tenant_id) = setup().await;

    post_ok(
        &app,
        "/webhooks/customers/create",
        r#"{"id": 500, "email": "buyer@example.com"}"#,
    )
    .await;
    post_ok(
        &app,
        "/webhooks/products/create",
        r#"{
            "id": 900,
            "title": "Espresso Beans",
            "variants": [{"price": "18.00", "inventory_quantity": 12}]
        }"#,
    )
    .await;

    // One line item references the known product, one an unknown product.
    post_ok(
        &app,
        "/webhooks/orders/create",
        r#"{
            "id": 8001,
            "customer": {"id": 500},
            "total_price": "28.00",
            "line_items": [
                {"product_id": 900, "title": "Espresso Beans", "quantity": 1, "price": "18.00"},
                {"product_id": 901, "title": "Mystery Item", "quantity": 1, "price": "10.00"}
            ]
        }"#,
    )
    .await;

    let customer = CustomerRepository::new(&db)
        .find_by_external_id(tenant_id, "500")
        .await
        .unwrap()
        .unwrap();
    let product = ProductRepository::new(&db)
        .find_by_external_id(tenant_id, "900")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(product.price_cents, 1800);
    assert_eq!(product.inventory_quantity, 12);

    let order_repo = OrderRepository::new(&db);
    let order = order_repo
        .find_by_external_id(tenant_id, "8001")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(order.customer_id, Some(customer.id));
    assert_eq!(order.total_price_cents, 2800);

    let mut items = order_repo.line_items(order.id).await.unwrap();
    items.sort_by(|a, b| a.title.cmp(&b.title));
    assert_eq!(items.len(), 2);
    assert_eq!(items[0].product_id, Some(product.id));
    assert!(items[1].product_id.is_none());

    // Every delivery in the scenario left an audit row.
    let logs = WebhookLogRepository::new(&db)
        .list_for_tenant(tenant_id)
        .await
        .unwrap();
    assert_eq!(logs.len(), 3);
    assert!(logs.iter().all(|log| log.processed));
    assert!(logs.iter().all(|log| log.tenant_id == Some(tenant_id)));
}
