//! # Webhook Handlers
//!
//! Ingestion endpoints for store webhooks. Each handler runs the same
//! pipeline: verify the signature over the raw body, resolve the tenant from
//! the shop domain header, decode the typed payload, reconcile external
//! references, persist, and append an audit log row. The audit row is
//! written for every delivery regardless of outcome, and its own write
//! failure never alters the HTTP response.

use axum::{body::Bytes, extract::State, http::HeaderMap, response::Json};
use sea_orm::DatabaseConnection;
use serde::{Deserialize, Serialize};
use serde_json::{Value as JsonValue, json};
use tracing::{error, info, warn};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::config::VerificationMode;
use crate::error::ApiError;
use crate::events::{
    CartEventData, CartPayload, CheckoutEventData, CheckoutPayload, CustomerPayload, EventKind,
    OrderPayload, ProductPayload, parse_timestamp,
};
use crate::models::tenant::Model as TenantModel;
use crate::reconcile::Reconciler;
use crate::repositories::{
    CustomEventRepository, CustomerRepository, OrderRepository, ProductRepository,
    TenantRepository, WebhookLogRepository,
};
use crate::server::AppState;
use crate::webhook_verification::{SHOP_DOMAIN_HEADER, SIGNATURE_HEADER, verify_signature};

/// Success response returned by every webhook route
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct WebhookSuccessResponse {
    pub success: bool,
}

impl WebhookSuccessResponse {
    fn ok() -> Json<Self> {
        Json(Self { success: true })
    }
}

/// Error response shape, mirrored by [`ApiError`]
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct WebhookErrorResponse {
    pub error: String,
}

/// Why a delivery failed. Stored in the audit log's error_message column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureReason {
    SignatureInvalid,
    TenantNotFound,
    MalformedPayload,
    PayloadTooLarge,
    PersistError,
}

impl FailureReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SignatureInvalid => "signature_invalid",
            Self::TenantNotFound => "tenant_not_found",
            Self::MalformedPayload => "malformed_payload",
            Self::PayloadTooLarge => "payload_too_large",
            Self::PersistError => "persist_error",
        }
    }
}

/// Terminal state of one delivery.
#[derive(Debug)]
pub enum IngestOutcome {
    Persisted,
    Failed(FailureReason),
}

impl IngestOutcome {
    fn error_message(&self, detail: Option<&str>) -> Option<String> {
        match self {
            Self::Persisted => None,
            Self::Failed(reason) => Some(match detail {
                Some(detail) => format!("{}: {detail}", reason.as_str()),
                None => reason.as_str().to_string(),
            }),
        }
    }
}

/// A delivery that passed verification and tenant resolution.
struct Delivery {
    tenant: TenantModel,
    payload: JsonValue,
}

/// Appends the audit log row, swallowing write failures.
async fn log_delivery(
    db: &DatabaseConnection,
    tenant_id: Option<Uuid>,
    kind: EventKind,
    payload: JsonValue,
    outcome: &IngestOutcome,
    detail: Option<&str>,
) {
    if let Err(err) = WebhookLogRepository::new(db)
        .log(
            tenant_id,
            kind.as_str(),
            payload,
            outcome.error_message(detail),
        )
        .await
    {
        error!(
            error = %err,
            webhook_type = kind.as_str(),
            "failed to write webhook log"
        );
    }
}

/// How much of an oversized body the audit row keeps.
const AUDIT_BODY_PREFIX_BYTES: usize = 1024;

fn header_str<'h>(headers: &'h HeaderMap, name: &str) -> &'h str {
    headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .unwrap_or("")
}

/// Shared front of the pipeline: size cap, tenant resolution, signature
/// verification. The tenant lookup runs before verification because the
/// signing secret may be tenant-specific, but a signature failure is
/// reported ahead of an unknown tenant.
async fn accept_delivery(
    state: &AppState,
    headers: &HeaderMap,
    body: &Bytes,
    kind: EventKind,
) -> Result<Delivery, ApiError> {
    let db = &state.db;
    let config = &state.config;

    if body.len() > config.webhook_max_body_kb * 1024 {
        // The body is too large to store whole, but the audit trail still
        // keeps a prefix of what arrived.
        let prefix = String::from_utf8_lossy(&body[..body.len().min(AUDIT_BODY_PREFIX_BYTES)]);
        log_delivery(
            db,
            None,
            kind,
            json!({
                "truncated_body": prefix,
                "body_bytes": body.len(),
            }),
            &IngestOutcome::Failed(FailureReason::PayloadTooLarge),
            Some(&format!(
                "body {} bytes exceeds {} KiB",
                body.len(),
                config.webhook_max_body_kb
            )),
        )
        .await;
        return Err(ApiError::new(
            crate::error::ErrorType::PayloadTooLarge,
            "payload too large",
        ));
    }

    // Kept for audit rows even when typed decoding later fails.
    let raw_payload: JsonValue = serde_json::from_slice(body).unwrap_or(JsonValue::Null);

    let shop_domain = header_str(headers, SHOP_DOMAIN_HEADER);
    let tenant = match TenantRepository::new(db).find_by_domain(shop_domain).await {
        Ok(tenant) => tenant,
        Err(err) => {
            log_delivery(
                db,
                None,
                kind,
                raw_payload,
                &IngestOutcome::Failed(FailureReason::PersistError),
                Some(&err.to_string()),
            )
            .await;
            return Err(err.into());
        }
    };

    let secret = tenant
        .as_ref()
        .and_then(|t| t.webhook_secret.clone())
        .or_else(|| config.webhook_secret.clone());

    let signature = header_str(headers, SIGNATURE_HEADER);
    let verified = match secret.as_deref() {
        Some(secret) => verify_signature(body, signature, secret),
        None => Err(crate::webhook_verification::VerificationError::NoSecret),
    };

    if let Err(err) = verified {
        match config.webhook_verification {
            VerificationMode::Strict => {
                log_delivery(
                    db,
                    tenant.as_ref().map(|t| t.id),
                    kind,
                    raw_payload,
                    &IngestOutcome::Failed(FailureReason::SignatureInvalid),
                    None,
                )
                .await;
                warn!(
                    shop_domain,
                    webhook_type = kind.as_str(),
                    error = %err,
                    "webhook rejected: signature verification failed"
                );
                return Err(ApiError::signature_invalid());
            }
            VerificationMode::Permissive => {
                warn!(
                    shop_domain,
                    webhook_type = kind.as_str(),
                    error = %err,
                    "signature verification failed, proceeding (permissive mode)"
                );
            }
        }
    }

    let Some(tenant) = tenant else {
        log_delivery(
            db,
            None,
            kind,
            raw_payload,
            &IngestOutcome::Failed(FailureReason::TenantNotFound),
            None,
        )
        .await;
        return Err(ApiError::tenant_not_found(shop_domain));
    };

    Ok(Delivery {
        tenant,
        payload: raw_payload,
    })
}

/// Decodes the typed payload, logging a malformed delivery on failure.
async fn decode_payload<T: serde::de::DeserializeOwned>(
    db: &DatabaseConnection,
    delivery: &Delivery,
    kind: EventKind,
) -> Result<T, ApiError> {
    match serde_json::from_value(delivery.payload.clone()) {
        Ok(payload) => Ok(payload),
        Err(err) => {
            log_delivery(
                db,
                Some(delivery.tenant.id),
                kind,
                delivery.payload.clone(),
                &IngestOutcome::Failed(FailureReason::MalformedPayload),
                Some(&err.to_string()),
            )
            .await;
            Err(ApiError::malformed(
                format!("invalid {} payload: {err}", kind.as_str()).into_boxed_str(),
            ))
        }
    }
}

/// Logs a persistence failure and converts it to a 500.
async fn fail_persist(
    db: &DatabaseConnection,
    delivery: &Delivery,
    kind: EventKind,
    err: crate::error::RepositoryError,
) -> ApiError {
    log_delivery(
        db,
        Some(delivery.tenant.id),
        kind,
        delivery.payload.clone(),
        &IngestOutcome::Failed(FailureReason::PersistError),
        Some(&err.to_string()),
    )
    .await;
    err.into()
}

async fn finish(db: &DatabaseConnection, delivery: &Delivery, kind: EventKind) {
    log_delivery(
        db,
        Some(delivery.tenant.id),
        kind,
        delivery.payload.clone(),
        &IngestOutcome::Persisted,
        None,
    )
    .await;
    info!(
        tenant_id = %delivery.tenant.id,
        webhook_type = kind.as_str(),
        "webhook processed"
    );
}

async fn ingest_customer(
    state: AppState,
    headers: HeaderMap,
    body: Bytes,
    kind: EventKind,
) -> Result<Json<WebhookSuccessResponse>, ApiError> {
    let delivery = accept_delivery(&state, &headers, &body, kind).await?;
    let db = &state.db;
    let payload: CustomerPayload = decode_payload(db, &delivery, kind).await?;

    let repo = CustomerRepository::new(db);
    let result = match kind {
        EventKind::CustomerUpdate => repo
            .apply_update(delivery.tenant.id, &payload)
            .await
            .map(|_| ()),
        _ => repo
            .upsert_from_create(delivery.tenant.id, &payload)
            .await
            .map(|_| ()),
    };

    if let Err(err) = result {
        return Err(fail_persist(db, &delivery, kind, err).await);
    }

    finish(db, &delivery, kind).await;
    Ok(WebhookSuccessResponse::ok())
}

/// Customer created webhook
#[utoipa::path(
    post,
    path = "/webhooks/customers/create",
    params(
        ("X-Shop-Domain" = String, Header, description = "Originating shop domain"),
        ("X-Webhook-Signature" = Option<String>, Header, description = "Base64 HMAC-SHA256 signature of the raw body")
    ),
    request_body(content = JsonValue, description = "Customer payload", content_type = "application/json"),
    responses(
        (status = 200, description = "Customer persisted", body = WebhookSuccessResponse),
        (status = 401, description = "Signature verification failed", body = WebhookErrorResponse),
        (status = 404, description = "Unknown shop domain", body = WebhookErrorResponse),
        (status = 500, description = "Persistence failure", body = WebhookErrorResponse)
    ),
    tag = "webhooks"
)]
pub async fn customers_create(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<WebhookSuccessResponse>, ApiError> {
    ingest_customer(state, headers, body, EventKind::CustomerCreate).await
}

/// Customer updated webhook. Fields absent from the payload are left
/// unchanged; an update for an unknown customer is a no-op.
#[utoipa::path(
    post,
    path = "/webhooks/customers/update",
    params(
        ("X-Shop-Domain" = String, Header, description = "Originating shop domain"),
        ("X-Webhook-Signature" = Option<String>, Header, description = "Base64 HMAC-SHA256 signature of the raw body")
    ),
    request_body(content = JsonValue, description = "Customer payload", content_type = "application/json"),
    responses(
        (status = 200, description = "Update applied (or no matching customer)", body = WebhookSuccessResponse),
        (status = 401, description = "Signature verification failed", body = WebhookErrorResponse),
        (status = 404, description = "Unknown shop domain", body = WebhookErrorResponse),
        (status = 500, description = "Persistence failure", body = WebhookErrorResponse)
    ),
    tag = "webhooks"
)]
pub async fn customers_update(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<WebhookSuccessResponse>, ApiError> {
    ingest_customer(state, headers, body, EventKind::CustomerUpdate).await
}

/// Order created webhook. The order row and its line items are written in
/// one transaction; re-delivery replaces the line item set.
#[utoipa::path(
    post,
    path = "/webhooks/orders/create",
    params(
        ("X-Shop-Domain" = String, Header, description = "Originating shop domain"),
        ("X-Webhook-Signature" = Option<String>, Header, description = "Base64 HMAC-SHA256 signature of the raw body")
    ),
    request_body(content = JsonValue, description = "Order payload with nested customer and line items", content_type = "application/json"),
    responses(
        (status = 200, description = "Order persisted", body = WebhookSuccessResponse),
        (status = 401, description = "Signature verification failed", body = WebhookErrorResponse),
        (status = 404, description = "Unknown shop domain", body = WebhookErrorResponse),
        (status = 500, description = "Persistence failure", body = WebhookErrorResponse)
    ),
    tag = "webhooks"
)]
pub async fn orders_create(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<WebhookSuccessResponse>, ApiError> {
    let kind = EventKind::OrderCreate;
    let delivery = accept_delivery(&state, &headers, &body, kind).await?;
    let db = &state.db;
    let payload: OrderPayload = decode_payload(db, &delivery, kind).await?;

    let reconciler = Reconciler::new(db);
    let tenant_id = delivery.tenant.id;

    let resolved = async {
        let customer_id = reconciler
            .resolve_customer(
                tenant_id,
                payload.customer.as_ref().map(|c| c.id.as_str()),
            )
            .await?;
        let line_items = reconciler.resolve_line_items(tenant_id, &payload).await?;
        OrderRepository::new(db)
            .upsert_with_line_items(tenant_id, &payload, customer_id, line_items)
            .await
    }
    .await;

    if let Err(err) = resolved {
        return Err(fail_persist(db, &delivery, kind, err).await);
    }

    finish(db, &delivery, kind).await;
    Ok(WebhookSuccessResponse::ok())
}

/// Product created webhook
#[utoipa::path(
    post,
    path = "/webhooks/products/create",
    params(
        ("X-Shop-Domain" = String, Header, description = "Originating shop domain"),
        ("X-Webhook-Signature" = Option<String>, Header, description = "Base64 HMAC-SHA256 signature of the raw body")
    ),
    request_body(content = JsonValue, description = "Product payload with variants", content_type = "application/json"),
    responses(
        (status = 200, description = "Product persisted", body = WebhookSuccessResponse),
        (status = 401, description = "Signature verification failed", body = WebhookErrorResponse),
        (status = 404, description = "Unknown shop domain", body = WebhookErrorResponse),
        (status = 500, description = "Persistence failure", body = WebhookErrorResponse)
    ),
    tag = "webhooks"
)]
pub async fn products_create(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<WebhookSuccessResponse>, ApiError> {
    let kind = EventKind::ProductCreate;
    let delivery = accept_delivery(&state, &headers, &body, kind).await?;
    let db = &state.db;
    let payload: ProductPayload = decode_payload(db, &delivery, kind).await?;

    if let Err(err) = ProductRepository::new(db)
        .upsert_from_create(delivery.tenant.id, &payload)
        .await
    {
        return Err(fail_persist(db, &delivery, kind, err).await);
    }

    finish(db, &delivery, kind).await;
    Ok(WebhookSuccessResponse::ok())
}

/// Cart created webhook, recorded as a cart_abandoned behavioral event
#[utoipa::path(
    post,
    path = "/webhooks/carts/create",
    params(
        ("X-Shop-Domain" = String, Header, description = "Originating shop domain"),
        ("X-Webhook-Signature" = Option<String>, Header, description = "Base64 HMAC-SHA256 signature of the raw body")
    ),
    request_body(content = JsonValue, description = "Cart payload", content_type = "application/json"),
    responses(
        (status = 200, description = "Event recorded", body = WebhookSuccessResponse),
        (status = 401, description = "Signature verification failed", body = WebhookErrorResponse),
        (status = 404, description = "Unknown shop domain", body = WebhookErrorResponse),
        (status = 500, description = "Persistence failure", body = WebhookErrorResponse)
    ),
    tag = "webhooks"
)]
pub async fn carts_create(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<WebhookSuccessResponse>, ApiError> {
    let kind = EventKind::CartCreate;
    let delivery = accept_delivery(&state, &headers, &body, kind).await?;
    let db = &state.db;
    let payload: CartPayload = decode_payload(db, &delivery, kind).await?;
    let tenant_id = delivery.tenant.id;

    let result = async {
        let customer_id = Reconciler::new(db)
            .resolve_customer(
                tenant_id,
                payload.customer.as_ref().map(|c| c.id.as_str()),
            )
            .await?;
        let event_data = serde_json::to_value(CartEventData::from(&payload))
            .unwrap_or(JsonValue::Null);
        CustomEventRepository::new(db)
            .record(
                tenant_id,
                customer_id,
                "cart_abandoned",
                event_data,
                parse_timestamp(payload.created_at.as_deref()),
            )
            .await
    }
    .await;

    if let Err(err) = result {
        return Err(fail_persist(db, &delivery, kind, err).await);
    }

    finish(db, &delivery, kind).await;
    Ok(WebhookSuccessResponse::ok())
}

/// Checkout created webhook, recorded as a checkout_started behavioral event
#[utoipa::path(
    post,
    path = "/webhooks/checkouts/create",
    params(
        ("X-Shop-Domain" = String, Header, description = "Originating shop domain"),
        ("X-Webhook-Signature" = Option<String>, Header, description = "Base64 HMAC-SHA256 signature of the raw body")
    ),
    request_body(content = JsonValue, description = "Checkout payload", content_type = "application/json"),
    responses(
        (status = 200, description = "Event recorded", body = WebhookSuccessResponse),
        (status = 401, description = "Signature verification failed", body = WebhookErrorResponse),
        (status = 404, description = "Unknown shop domain", body = WebhookErrorResponse),
        (status = 500, description = "Persistence failure", body = WebhookErrorResponse)
    ),
    tag = "webhooks"
)]
pub async fn checkouts_create(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<WebhookSuccessResponse>, ApiError> {
    let kind = EventKind::CheckoutCreate;
    let delivery = accept_delivery(&state, &headers, &body, kind).await?;
    let db = &state.db;
    let payload: CheckoutPayload = decode_payload(db, &delivery, kind).await?;
    let tenant_id = delivery.tenant.id;

    let result = async {
        let customer_id = Reconciler::new(db)
            .resolve_customer(
                tenant_id,
                payload.customer.as_ref().map(|c| c.id.as_str()),
            )
            .await?;
        let event_data = serde_json::to_value(CheckoutEventData::from(&payload))
            .unwrap_or(JsonValue::Null);
        CustomEventRepository::new(db)
            .record(
                tenant_id,
                customer_id,
                "checkout_started",
                event_data,
                parse_timestamp(payload.created_at.as_deref()),
            )
            .await
    }
    .await;

    if let Err(err) = result {
        return Err(fail_persist(db, &delivery, kind, err).await);
    }

    finish(db, &delivery, kind).await;
    Ok(WebhookSuccessResponse::ok())
}

/// Development echo route. Logs the payload without verification or tenant
/// attribution.
#[utoipa::path(
    post,
    path = "/webhooks/test",
    request_body(content = JsonValue, description = "Arbitrary payload", content_type = "application/json"),
    responses(
        (status = 200, description = "Payload logged", body = WebhookSuccessResponse)
    ),
    tag = "webhooks"
)]
pub async fn test_webhook(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<WebhookSuccessResponse>, ApiError> {
    let payload: JsonValue = serde_json::from_slice(&body).unwrap_or(JsonValue::Null);
    info!(webhook_type = "test", "test webhook received");
    log_delivery(
        &state.db,
        None,
        EventKind::Test,
        payload,
        &IngestOutcome::Persisted,
        None,
    )
    .await;
    Ok(WebhookSuccessResponse::ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use crate::server::{AppState, create_app};
    use crate::webhook_verification::compute_signature;
    use axum::Router;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use crate::db::init_pool;
    use migration::{Migrator, MigratorTrait};
    use std::sync::Arc;
    use tower::ServiceExt;

    async fn setup_test_app(config: AppConfig) -> (Router, sea_orm::DatabaseConnection) {
        let db = init_pool(&config).await.unwrap();
        Migrator::up(&db, None).await.unwrap();

        let state = AppState {
            db: db.clone(),
            config: Arc::new(config),
        };
        (create_app(state), db)
    }

    fn test_config() -> AppConfig {
        AppConfig {
            profile: "test".to_string(),
            database_url: "sqlite::memory:".to_string(),
            webhook_secret: Some("test_secret".to_string()),
            ..Default::default()
        }
    }

    async fn seed_tenant(db: &sea_orm::DatabaseConnection, domain: &str) -> Uuid {
        let tenant = TenantRepository::new(db)
            .create_tenant(crate::repositories::tenant::CreateTenantRequest {
                name: "Test Shop".to_string(),
                shop_domain: domain.to_string(),
                webhook_secret: None,
            })
            .await
            .unwrap();
        tenant.id
    }

    fn signed_request(path: &str, domain: &str, body: &str) -> Request<Body> {
        let signature = compute_signature(body.as_bytes(), "test_secret");
        Request::builder()
            .method("POST")
            .uri(path)
            .header("content-type", "application/json")
            .header("X-Shop-Domain", domain)
            .header("X-Webhook-Signature", signature)
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_customer_create_persists_row() {
        let (app, db) = setup_test_app(test_config()).await;
        let tenant_id = seed_tenant(&db, "shop.example.com").await;

        let body = r#"{"id": 101, "email": "ada@example.com", "total_spent": "42.50"}"#;
        let response = app
            .oneshot(signed_request(
                "/webhooks/customers/create",
                "shop.example.com",
                body,
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let customer = CustomerRepository::new(&db)
            .find_by_external_id(tenant_id, "101")
            .await
            .unwrap()
            .expect("customer row");
        assert_eq!(customer.email.as_deref(), Some("ada@example.com"));
        assert_eq!(customer.total_spent_cents, 4250);
    }

    #[tokio::test]
    async fn test_unknown_tenant_rejected_and_logged() {
        let (app, db) = setup_test_app(test_config()).await;

        let body = r#"{"id": 1}"#;
        let response = app
            .oneshot(signed_request(
                "/webhooks/customers/create",
                "nobody.example.com",
                body,
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        use sea_orm::EntityTrait;
        let logs = crate::models::WebhookLog::find().all(&db).await.unwrap();
        assert_eq!(logs.len(), 1);
        assert!(logs[0].tenant_id.is_none());
        assert!(!logs[0].processed);
        assert_eq!(logs[0].error_message.as_deref(), Some("tenant_not_found"));
    }

    #[tokio::test]
    async fn test_invalid_signature_strict() {
        let (app, db) = setup_test_app(test_config()).await;
        seed_tenant(&db, "shop.example.com").await;

        let request = Request::builder()
            .method("POST")
            .uri("/webhooks/customers/create")
            .header("content-type", "application/json")
            .header("X-Shop-Domain", "shop.example.com")
            .header("X-Webhook-Signature", "bogus")
            .body(Body::from(r#"{"id": 1}"#))
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        use sea_orm::EntityTrait;
        let customers = crate::models::Customer::find().all(&db).await.unwrap();
        assert!(customers.is_empty());
    }

    #[tokio::test]
    async fn test_invalid_signature_permissive_proceeds() {
        let config = AppConfig {
            webhook_verification: VerificationMode::Permissive,
            ..test_config()
        };
        let (app, db) = setup_test_app(config).await;
        let tenant_id = seed_tenant(&db, "shop.example.com").await;

        let request = Request::builder()
            .method("POST")
            .uri("/webhooks/customers/create")
            .header("content-type", "application/json")
            .header("X-Shop-Domain", "shop.example.com")
            .header("X-Webhook-Signature", "bogus")
            .body(Body::from(r#"{"id": 7}"#))
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let customer = CustomerRepository::new(&db)
            .find_by_external_id(tenant_id, "7")
            .await
            .unwrap();
        assert!(customer.is_some());
    }

    #[tokio::test]
    async fn test_per_tenant_secret_overrides_global() {
        let (app, db) = setup_test_app(test_config()).await;
        TenantRepository::new(&db)
            .create_tenant(crate::repositories::tenant::CreateTenantRequest {
                name: "Keyed Shop".to_string(),
                shop_domain: "keyed.example.com".to_string(),
                webhook_secret: Some("tenant_secret".to_string()),
            })
            .await
            .unwrap();

        let body = r#"{"id": 5}"#;
        // Signed with the global secret: must fail, tenant secret wins.
        let response = app
            .clone()
            .oneshot(signed_request(
                "/webhooks/customers/create",
                "keyed.example.com",
                body,
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let signature = compute_signature(body.as_bytes(), "tenant_secret");
        let request = Request::builder()
            .method("POST")
            .uri("/webhooks/customers/create")
            .header("content-type", "application/json")
            .header("X-Shop-Domain", "keyed.example.com")
            .header("X-Webhook-Signature", signature)
            .body(Body::from(body))
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_test_route_logs_without_tenant() {
        let (app, db) = setup_test_app(test_config()).await;

        let request = Request::builder()
            .method("POST")
            .uri("/webhooks/test")
            .header("content-type", "application/json")
            .body(Body::from(r#"{"ping": true}"#))
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        use sea_orm::EntityTrait;
        let logs = crate::models::WebhookLog::find().all(&db).await.unwrap();
        assert_eq!(logs.len(), 1);
        assert_eq!(logs[0].webhook_type, "test");
        assert!(logs[0].processed);
        assert!(logs[0].tenant_id.is_none());
    }

    #[tokio::test]
    async fn test_oversized_body_rejected() {
        let config = AppConfig {
            webhook_max_body_kb: 1,
            ..test_config()
        };
        let (app, db) = setup_test_app(config).await;

        let big = format!(r#"{{"id": 1, "pad": "{}"}}"#, "x".repeat(2048));
        let response = app
            .oneshot(signed_request(
                "/webhooks/customers/create",
                "shop.example.com",
                &big,
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);

        // The audit row keeps a prefix of the rejected body.
        use sea_orm::EntityTrait;
        let logs = crate::models::WebhookLog::find().all(&db).await.unwrap();
        assert_eq!(logs.len(), 1);
        assert!(!logs[0].processed);
        assert_eq!(logs[0].payload["body_bytes"], big.len());
        let prefix = logs[0].payload["truncated_body"].as_str().unwrap();
        assert_eq!(prefix.len(), 1024);
        assert!(big.starts_with(prefix));
    }
}
