//! HTTP server setup and routing

use crate::dashboard::{handlers, AppState};
use anyhow::{Context, Result};
use axum::{
    routing::{get, post},
    Router,
};
use std::net::SocketAddr;
use tower_http::trace::TraceLayer;
use tracing::info;

/// Build the dashboard router
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        // Validation
        .route("/api/validation/report", get(handlers::validation_report))
        .route("/api/validation/regenerate", post(handlers::regenerate_report))
        .route("/api/validation/missing", get(handlers::missing_translations))
        .route("/api/consistency/report", get(handlers::consistency_report))
        .route("/api/content/stats", get(handlers::content_stats))
        // Alerts
        .route("/api/alerts", get(handlers::alerts))
        .route("/api/alerts/run", post(handlers::run_alerts))
        .route("/api/alerts/rules", get(handlers::alert_rules))
        .route("/api/alerts/rules/:id/run", post(handlers::run_alert_rule))
        // Experiments
        .route("/api/experiments/:id/variant", get(handlers::experiment_variant))
        .route(
            "/api/experiments/:id/conversion",
            post(handlers::experiment_conversion),
        )
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

/// Run the dashboard HTTP server until the process exits
pub async fn run(port: u16, state: AppState) -> Result<()> {
    let app = router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    info!("Dashboard listening on http://{}", addr);
    axum::serve(listener, app).await?;

    Ok(())
}
