//! HTTP surface
//!
//! Routes mirror the hosted function paths so existing callers keep working:
//! - `POST /functions/v1/sync-lemlist`
//! - `POST /functions/v1/create-checkout`
//! - `GET /health`

mod error;

use std::any::Any;
use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use mes_domain::{CheckoutRequest, CheckoutSession, MesError, Result, SyncEnvelope};
use tokio::net::TcpListener;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

pub use error::ApiError;

use crate::commands;
use crate::context::AppContext;

pub fn router(ctx: Arc<AppContext>) -> Router {
    with_middleware(
        Router::new()
            .route("/functions/v1/sync-lemlist", post(sync_lemlist))
            .route("/functions/v1/create-checkout", post(create_checkout))
            .route("/health", get(health))
            .with_state(ctx),
    )
}

/// Request tracing, and a panic boundary that answers with the error envelope.
fn with_middleware(router: Router) -> Router {
    router.layer(CatchPanicLayer::custom(panic_response)).layer(TraceLayer::new_for_http())
}

fn panic_response(panic: Box<dyn Any + Send + 'static>) -> Response {
    let detail = panic
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| panic.downcast_ref::<&str>().copied())
        .unwrap_or("non-string panic payload");
    tracing::error!(panic = detail, "request handler panicked");

    ApiError(MesError::Internal("internal server error".to_string())).into_response()
}

/// Bind `bind_addr` and serve until Ctrl-C.
pub async fn serve(ctx: Arc<AppContext>, bind_addr: &str) -> Result<()> {
    let listener = TcpListener::bind(bind_addr)
        .await
        .map_err(|e| MesError::Config(format!("failed to bind {bind_addr}: {e}")))?;

    info!(bind_addr, "http server listening");

    axum::serve(listener, router(ctx))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| MesError::Internal(format!("http server failed: {e}")))
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %err, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("shutdown signal received");
}

async fn sync_lemlist(
    State(ctx): State<Arc<AppContext>>,
) -> std::result::Result<Json<SyncEnvelope>, ApiError> {
    Ok(Json(commands::sync_lemlist(&ctx).await?))
}

async fn create_checkout(
    State(ctx): State<Arc<AppContext>>,
    payload: std::result::Result<Json<CheckoutRequest>, JsonRejection>,
) -> std::result::Result<Json<CheckoutSession>, ApiError> {
    let Json(request) = payload.map_err(|rejection| {
        ApiError(MesError::InvalidInput(format!("invalid request body: {}", rejection.body_text())))
    })?;
    Ok(Json(commands::create_checkout(&ctx, request).await?))
}

async fn health(State(ctx): State<Arc<AppContext>>) -> Response {
    let status = commands::get_app_health(&ctx).await;
    let code = if status.is_healthy { StatusCode::OK } else { StatusCode::SERVICE_UNAVAILABLE };
    (code, Json(status)).into_response()
}
