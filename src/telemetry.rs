//! Tracing and log setup plus per-request trace context propagation.

use std::sync::atomic::{AtomicBool, Ordering};

use tokio::task_local;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::AppConfig;

/// Per-request trace context, made available to error responses and logs.
#[derive(Debug, Clone)]
pub struct TraceContext {
    pub trace_id: String,
}

impl TraceContext {
    pub fn new() -> Self {
        Self {
            trace_id: uuid::Uuid::new_v4().to_string(),
        }
    }
}

impl Default for TraceContext {
    fn default() -> Self {
        Self::new()
    }
}

task_local! {
    static TRACE_CONTEXT: TraceContext;
}

/// Runs `fut` with a fresh trace context bound to the current task.
pub async fn with_trace_context<F, T>(fut: F) -> T
where
    F: std::future::Future<Output = T>,
{
    TRACE_CONTEXT.scope(TraceContext::new(), fut).await
}

/// Returns the trace id for the current task, if one is bound.
pub fn current_trace_id() -> Option<String> {
    TRACE_CONTEXT
        .try_with(|ctx| ctx.trace_id.clone())
        .ok()
}

static TRACING_INITIALIZED: AtomicBool = AtomicBool::new(false);

/// Initializes the global tracing subscriber. Safe to call more than once;
/// only the first call takes effect.
pub fn init_tracing(config: &AppConfig) {
    if TRACING_INITIALIZED.swap(true, Ordering::SeqCst) {
        return;
    }

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.log_level.clone()));

    let registry = tracing_subscriber::registry().with(filter);

    if config.log_format == "pretty" {
        registry
            .with(tracing_subscriber::fmt::layer().pretty())
            .init();
    } else {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    }

    // Bridge `log` records from dependencies into tracing.
    if let Err(err) = tracing_log::LogTracer::init() {
        tracing::debug!(error = %err, "log tracer already initialized");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_trace_context_scoped() {
        assert!(current_trace_id().is_none());
        let id = with_trace_context(async {
            let id = current_trace_id();
            assert!(id.is_some());
            id.unwrap()
        })
        .await;
        assert!(uuid::Uuid::parse_str(&id).is_ok());
    }
}
