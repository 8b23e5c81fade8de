use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use chrono::Utc;
use serde::Serialize;

use crate::store::InvoiceSource;

#[derive(Clone)]
pub struct HealthState {
    source: Arc<dyn InvoiceSource>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct HealthCheck {
    pub status: &'static str,
    pub detail: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: HealthCheck,
    pub snapshot: HealthCheck,
    pub checked_at: String,
}

pub fn router(source: Arc<dyn InvoiceSource>) -> Router {
    Router::new().route("/health", get(health)).with_state(HealthState { source })
}

pub async fn health(State(state): State<HealthState>) -> (StatusCode, Json<HealthResponse>) {
    let snapshot = snapshot_check(state.source.as_ref()).await;
    let ready = snapshot.status == "ready";

    let payload = HealthResponse {
        status: if ready { "ready" } else { "degraded" },
        service: HealthCheck {
            status: "ready",
            detail: "ariva-server runtime initialized".to_string(),
        },
        snapshot,
        checked_at: Utc::now().to_rfc3339(),
    };

    let status_code = if ready { StatusCode::OK } else { StatusCode::SERVICE_UNAVAILABLE };
    (status_code, Json(payload))
}

async fn snapshot_check(source: &dyn InvoiceSource) -> HealthCheck {
    match source.snapshot().await {
        Ok(snapshot) => HealthCheck {
            status: "ready",
            detail: format!(
                "snapshot readable: {} invoices, {} skipped",
                snapshot.quality.accepted,
                snapshot.quality.skipped_count()
            ),
        },
        Err(error) => HealthCheck { status: "unavailable", detail: error.to_string() },
    }
}
