//! # Server Configuration
//!
//! Router setup and server startup for the Shopstream ingestion API.

use std::sync::Arc;

use axum::{
    Router,
    extract::Request,
    middleware::{self, Next},
    response::Response,
    routing::{get, post},
};
use sea_orm::DatabaseConnection;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::config::AppConfig;
use crate::handlers::{self, webhooks};

/// Application state containing shared resources
#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub config: Arc<AppConfig>,
}

/// Binds a fresh trace context to each request task.
async fn trace_context_middleware(request: Request, next: Next) -> Response {
    crate::telemetry::with_trace_context(next.run(request)).await
}

/// Creates and configures the Axum application router
pub fn create_app(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::root))
        .route("/health", get(handlers::health))
        .route("/webhooks/customers/create", post(webhooks::customers_create))
        .route("/webhooks/customers/update", post(webhooks::customers_update))
        .route("/webhooks/orders/create", post(webhooks::orders_create))
        .route("/webhooks/products/create", post(webhooks::products_create))
        .route("/webhooks/carts/create", post(webhooks::carts_create))
        .route("/webhooks/checkouts/create", post(webhooks::checkouts_create))
        .route("/webhooks/test", post(webhooks::test_webhook))
        .layer(middleware::from_fn(trace_context_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
        .merge(SwaggerUi::new("/docs").url("/openapi.json", ApiDoc::openapi()))
}

/// Starts the server with the given configuration
pub async fn run_server(
    config: AppConfig,
    db: DatabaseConnection,
) -> Result<(), Box<dyn std::error::Error>> {
    let addr = config
        .bind_addr()
        .map_err(|e| format!("Invalid server address: {}", e))?;
    let profile = config.profile.clone();

    let state = AppState {
        db,
        config: Arc::new(config),
    };
    let app = create_app(state);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, %profile, "server listening");

    axum::serve(listener, app).await?;

    Ok(())
}

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    paths(
        crate::handlers::root,
        crate::handlers::health,
        crate::handlers::webhooks::customers_create,
        crate::handlers::webhooks::customers_update,
        crate::handlers::webhooks::orders_create,
        crate::handlers::webhooks::products_create,
        crate::handlers::webhooks::carts_create,
        crate::handlers::webhooks::checkouts_create,
        crate::handlers::webhooks::test_webhook,
    ),
    components(
        schemas(
            crate::models::ServiceInfo,
            crate::handlers::HealthResponse,
            crate::handlers::webhooks::WebhookSuccessResponse,
            crate::handlers::webhooks::WebhookErrorResponse,
        )
    ),
    info(
        title = "Shopstream Ingestion API",
        description = "Multi-tenant e-commerce webhook ingestion and reconciliation",
        version = env!("CARGO_PKG_VERSION"),
    )
)]
pub struct ApiDoc;
