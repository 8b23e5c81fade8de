//! Guarded report API.
//!
//! Every `/api/dashboard/{area}/...` request is admitted by the route
//! policy before any invoice data is touched: the subject's role must be
//! allowed the `/dashboard/{area}` prefix. Denials are 403, never silent.

use std::sync::Arc;

use ariva_core::authz::RouteAccessPolicy;
use ariva_core::config::ReportsConfig;
use ariva_core::domain::user::UserId;
use ariva_core::errors::InterfaceError;
use ariva_core::reports::{
    customer_report, dispute_report, overview, performance_report, ptp_report, region_report,
};
use ariva_core::session::SessionCache;
use ariva_core::snapshot::InvoiceSnapshot;
use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::store::InvoiceSource;

pub const ROLE_HEADER: &str = "x-ariva-role";
pub const SESSION_HEADER: &str = "x-ariva-session";
pub const USER_HEADER: &str = "x-ariva-user";

#[derive(Clone)]
pub struct AppState {
    pub policy: Arc<RouteAccessPolicy>,
    pub sessions: Arc<SessionCache>,
    pub source: Arc<dyn InvoiceSource>,
    pub reports: ReportsConfig,
}

#[derive(Debug, Deserialize)]
pub struct ReportQuery {
    #[serde(rename = "asOf")]
    pub as_of: Option<NaiveDate>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiError {
    pub error: &'static str,
    pub reason: String,
    pub correlation_id: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SignOutResponse {
    pub signed_out: bool,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/dashboard/{area}/overview", get(dashboard_overview))
        .route("/api/dashboard/{area}/reports/{kind}", get(dashboard_report))
        .route("/api/navigation", get(navigation))
        .route("/api/session/sign-out", post(sign_out))
        .with_state(state)
}

async fn dashboard_overview(
    State(state): State<AppState>,
    Path(area): Path<String>,
    Query(query): Query<ReportQuery>,
    headers: HeaderMap,
) -> Response {
    let correlation_id = Uuid::new_v4().to_string();
    let role_label = match admit(&state, &headers, &area, &correlation_id) {
        Ok(role_label) => role_label,
        Err(response) => return response,
    };

    let snapshot = match fetch_scoped_snapshot(&state, &area, &headers, &correlation_id).await {
        Ok(snapshot) => snapshot,
        Err(response) => return response,
    };

    let as_of = query.as_of.unwrap_or_else(|| Utc::now().date_naive());
    let payload = overview(
        &snapshot,
        as_of,
        state.reports.top_overdue_limit,
        state.reports.trend_weeks,
    );

    info!(
        event_name = "api.overview.served",
        role = %role_label,
        area = %area,
        correlation_id = %correlation_id,
        invoice_count = snapshot.invoices.len(),
        "dashboard overview served"
    );
    Json(payload).into_response()
}

async fn dashboard_report(
    State(state): State<AppState>,
    Path((area, kind)): Path<(String, String)>,
    Query(query): Query<ReportQuery>,
    headers: HeaderMap,
) -> Response {
    let correlation_id = Uuid::new_v4().to_string();
    if let Err(response) = admit(&state, &headers, &area, &correlation_id) {
        return response;
    }

    let snapshot = match fetch_scoped_snapshot(&state, &area, &headers, &correlation_id).await {
        Ok(snapshot) => snapshot,
        Err(response) => return response,
    };

    let as_of = query.as_of.unwrap_or_else(|| Utc::now().date_naive());
    match kind.as_str() {
        "aging" => Json(overview(
            &snapshot,
            as_of,
            state.reports.top_overdue_limit,
            state.reports.trend_weeks,
        ))
        .into_response(),
        "disputes" => {
            Json(dispute_report(&snapshot, as_of, state.reports.trend_months)).into_response()
        }
        "ptp" => Json(ptp_report(&snapshot)).into_response(),
        "performance" => Json(performance_report(&snapshot, as_of)).into_response(),
        "regions" => {
            Json(region_report(&snapshot, as_of, state.reports.top_overdue_limit)).into_response()
        }
        "customers" => {
            Json(customer_report(&snapshot, as_of, state.reports.top_overdue_limit)).into_response()
        }
        other => (
            StatusCode::NOT_FOUND,
            Json(ApiError {
                error: "unknown_report",
                reason: format!("no report named `{other}`"),
                correlation_id,
            }),
        )
            .into_response(),
    }
}

async fn navigation(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let correlation_id = Uuid::new_v4().to_string();
    let Some(role_label) = resolve_role_label(&state, &headers) else {
        return anonymous_denied(correlation_id);
    };

    let Ok(role) = role_label.parse::<ariva_core::domain::user::Role>() else {
        return (
            StatusCode::FORBIDDEN,
            Json(ApiError {
                error: "forbidden",
                reason: format!("unknown role `{role_label}`"),
                correlation_id,
            }),
        )
            .into_response();
    };

    Json(serde_json::json!({
        "role": role,
        "home": role.dashboard_path(),
        "items": ariva_core::authz::nav::navigation_for(role),
    }))
    .into_response()
}

async fn sign_out(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let Some(token) = header_value(&headers, SESSION_HEADER) else {
        let correlation_id = Uuid::new_v4().to_string();
        return (
            StatusCode::BAD_REQUEST,
            Json(ApiError {
                error: "bad_request",
                reason: format!("`{SESSION_HEADER}` header is required"),
                correlation_id,
            }),
        )
            .into_response();
    };

    let signed_out = state.sessions.invalidate(&token);
    Json(SignOutResponse { signed_out }).into_response()
}

/// Authorization gate: resolve the subject's role label and check it against
/// the `/dashboard/{area}` prefix. Runs before any data access.
fn admit(
    state: &AppState,
    headers: &HeaderMap,
    area: &str,
    correlation_id: &str,
) -> Result<String, Response> {
    let Some(role_label) = resolve_role_label(state, headers) else {
        return Err(anonymous_denied(correlation_id.to_owned()));
    };

    let guarded_path = format!("/dashboard/{area}");
    let decision = state.policy.decision(&role_label, &guarded_path);
    if decision.allowed {
        return Ok(role_label);
    }

    Err((
        StatusCode::FORBIDDEN,
        Json(ApiError {
            error: "forbidden",
            reason: decision.reason,
            correlation_id: correlation_id.to_owned(),
        }),
    )
        .into_response())
}

/// The auth collaborator resolves identity; this only reads its output:
/// either an already-resolved role header or a cached session token.
fn resolve_role_label(state: &AppState, headers: &HeaderMap) -> Option<String> {
    if let Some(role) = header_value(headers, ROLE_HEADER) {
        return Some(role);
    }

    header_value(headers, SESSION_HEADER)
        .and_then(|token| state.sessions.resolve(&token))
        .map(|role| role.as_str().to_owned())
}

fn anonymous_denied(correlation_id: String) -> Response {
    (
        StatusCode::FORBIDDEN,
        Json(ApiError {
            error: "forbidden",
            reason: "no resolvable role for this request".to_owned(),
            correlation_id,
        }),
    )
        .into_response()
}

async fn fetch_scoped_snapshot(
    state: &AppState,
    area: &str,
    headers: &HeaderMap,
    correlation_id: &str,
) -> Result<InvoiceSnapshot, Response> {
    let snapshot = match state.source.snapshot().await {
        Ok(snapshot) => snapshot,
        Err(error) => {
            let interface = error.into_interface(correlation_id.to_owned());
            return Err(interface_response(interface));
        }
    };

    Ok(scope_to_area(snapshot, area, headers))
}

/// Collector and biller dashboards show the caller's own queue when the
/// caller is identified; admin and manager areas see everything.
fn scope_to_area(mut snapshot: InvoiceSnapshot, area: &str, headers: &HeaderMap) -> InvoiceSnapshot {
    if !matches!(area, "collector" | "biller") {
        return snapshot;
    }
    let Some(user) = header_value(headers, USER_HEADER) else {
        return snapshot;
    };

    // Scoping narrows the view only; `quality` keeps the boundary counters.
    let user = UserId(user);
    snapshot.invoices.retain(|invoice| invoice.assigned_to.as_ref() == Some(&user));
    snapshot
}

fn header_value(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_owned)
}

fn interface_response(error: InterfaceError) -> Response {
    let status = match &error {
        InterfaceError::BadRequest { .. } => StatusCode::BAD_REQUEST,
        InterfaceError::Forbidden { .. } => StatusCode::FORBIDDEN,
        InterfaceError::ServiceUnavailable { .. } => StatusCode::SERVICE_UNAVAILABLE,
        InterfaceError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
    };

    let body = ApiError {
        error: match status {
            StatusCode::BAD_REQUEST => "bad_request",
            StatusCode::FORBIDDEN => "forbidden",
            StatusCode::SERVICE_UNAVAILABLE => "service_unavailable",
            _ => "internal",
        },
        reason: error.user_message().to_owned(),
        correlation_id: error.correlation_id().to_owned(),
    };

    (status, Json(body)).into_response()
}
