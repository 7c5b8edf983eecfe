//! Referral HTTP handlers
//!
//! Request-shape validation (address and email format, status names) lives
//! here at the edge; everything past this point works on already-validated,
//! normalized values.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    Json,
    extract::{ConnectInfo, Path, Query, State},
    http::HeaderMap,
};
use serde::Deserialize;

use super::state::AppState;
use super::types::{ApiError, ApiResult, ok};
use crate::referral::{
    ProgressFilter, ProgressSummary, ReferralEmail, ReferralProgress, ReferralStatus,
};

const MAX_ADDRESS_LEN: usize = 256;
const MAX_EMAIL_LEN: usize = 254;

fn validate_address(field: &str, value: &str) -> Result<(), ApiError> {
    let trimmed = value.trim();
    if trimmed.is_empty() || trimmed.len() > MAX_ADDRESS_LEN {
        return Err(ApiError::bad_request(format!("Invalid {}", field)));
    }
    if trimmed.chars().any(|c| c.is_whitespace() || c.is_control()) {
        return Err(ApiError::bad_request(format!("Invalid {}", field)));
    }
    Ok(())
}

fn validate_email(value: &str) -> Result<(), ApiError> {
    let trimmed = value.trim();
    let well_formed = trimmed.len() >= 3
        && trimmed.len() <= MAX_EMAIL_LEN
        && trimmed.contains('@')
        && !trimmed.starts_with('@')
        && !trimmed.ends_with('@')
        && !trimmed
            .chars()
            .any(|c| c.is_whitespace() || c.is_control() || c == '<' || c == '>');
    if !well_formed {
        return Err(ApiError::bad_request("Invalid email"));
    }
    Ok(())
}

/// Client IP: proxy header when present, socket peer otherwise
fn client_ip(headers: &HeaderMap, peer: &SocketAddr) -> String {
    headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| peer.ip().to_string())
}

// ============================================================================
// Request / query DTOs
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct CreateReferralRequest {
    pub referrer: String,
    pub invited_user: String,
}

#[derive(Debug, Deserialize)]
pub struct SignedUpRequest {
    pub invited_user: String,
}

#[derive(Debug, Deserialize)]
pub struct SetEmailRequest {
    pub referrer: String,
    pub email: String,
}

#[derive(Debug, Deserialize, Default)]
pub struct ListQuery {
    pub referrer: Option<String>,
    pub invited_user: Option<String>,
    pub status: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /api/v1/referral
pub async fn create_referral(
    State(state): State<Arc<AppState>>,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
    Json(req): Json<CreateReferralRequest>,
) -> ApiResult<ReferralProgress> {
    validate_address("referrer", &req.referrer)?;
    validate_address("invited_user", &req.invited_user)?;

    let ip = client_ip(&headers, &peer);
    let record = state
        .referral
        .create(&req.referrer, &req.invited_user, &ip)
        .await?;
    ok(record)
}

/// POST /api/v1/referral/signed-up
pub async fn mark_signed_up(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SignedUpRequest>,
) -> ApiResult<()> {
    validate_address("invited_user", &req.invited_user)?;
    state.referral.mark_signed_up(&req.invited_user).await?;
    ok(())
}

/// GET /api/v1/referral
pub async fn list_referrals(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListQuery>,
) -> ApiResult<Vec<ReferralProgress>> {
    let status = match query.status.as_deref() {
        Some(name) => Some(
            ReferralStatus::from_str_name(name)
                .ok_or_else(|| ApiError::bad_request(format!("Unknown status: {}", name)))?,
        ),
        None => None,
    };

    let rows = state
        .referral
        .find(&ProgressFilter {
            referrer: query.referrer,
            invited_user: query.invited_user,
            status,
            limit: query.limit,
            offset: query.offset,
        })
        .await?;
    ok(rows)
}

/// GET /api/v1/referral/summary/{referrer}
pub async fn progress_summary(
    State(state): State<Arc<AppState>>,
    Path(referrer): Path<String>,
) -> ApiResult<ProgressSummary> {
    validate_address("referrer", &referrer)?;
    let summary = state.referral.progress_summary(&referrer).await?;
    ok(summary)
}

/// POST /api/v1/referral/email
pub async fn set_email(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SetEmailRequest>,
) -> ApiResult<ReferralEmail> {
    validate_address("referrer", &req.referrer)?;
    validate_email(&req.email)?;

    let record = state
        .referral
        .set_email(&req.referrer, req.email.trim())
        .await?;
    ok(record)
}

/// GET /health
pub async fn health(State(state): State<Arc<AppState>>) -> ApiResult<&'static str> {
    state
        .db
        .health_check()
        .await
        .map_err(|e| ApiError::internal(format!("Database unreachable: {}", e)))?;
    ok("ok")
}

/// POST /api/v1/internal/event
///
/// Mock transport endpoint: injects a lifecycle event into the progression
/// trigger. Dev/test only, compiled out of production builds.
#[cfg(feature = "mock-api")]
pub async fn inject_event(
    State(state): State<Arc<AppState>>,
    Json(event): Json<crate::progression::LifecycleEvent>,
) -> ApiResult<()> {
    state
        .events
        .send(event)
        .await
        .map_err(|_| ApiError::internal("Event channel closed"))?;
    ok(())
}
