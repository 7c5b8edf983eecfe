//! API response types and error codes
//!
//! - `ApiResponse<T>`: Unified response wrapper
//! - `error_codes`: Standard error code constants
//! - `ApiError`: error + HTTP status carrier implementing `IntoResponse`

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use crate::referral::ReferralError;

/// Unified API response wrapper
///
/// All API responses follow this structure:
/// - code: 0 = success, non-zero = error code
/// - msg: short message description
/// - data: actual data (success) or null (error)
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub code: i32,
    pub msg: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T> ApiResponse<T> {
    /// Create success response
    pub fn success(data: T) -> Self {
        Self {
            code: 0,
            msg: "ok".to_string(),
            data: Some(data),
        }
    }
}

pub mod error_codes {
    // Success
    pub const SUCCESS: i32 = 0;

    // Client errors (1xxx)
    pub const INVALID_PARAMETER: i32 = 1001;

    // Resource errors (4xxx)
    pub const PROGRESS_NOT_FOUND: i32 = 4041;
    pub const ALREADY_REFERRED: i32 = 4091;
    pub const EMAIL_COOLDOWN: i32 = 4092;
    pub const INVALID_TRANSITION: i32 = 4093;
    pub const NOT_ELIGIBLE: i32 = 4221;

    // Server errors (5xxx)
    pub const INTERNAL_ERROR: i32 = 5000;
}

/// Error carrier for handlers
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub code: i32,
    pub msg: String,
}

pub type ApiResult<T> = Result<Json<ApiResponse<T>>, ApiError>;

/// Wrap a success payload
pub fn ok<T>(data: T) -> ApiResult<T> {
    Ok(Json(ApiResponse::success(data)))
}

impl ApiError {
    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            code: error_codes::INVALID_PARAMETER,
            msg: msg.into(),
        }
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            code: error_codes::INTERNAL_ERROR,
            msg: msg.into(),
        }
    }
}

impl From<ReferralError> for ApiError {
    fn from(e: ReferralError) -> Self {
        let code = match &e {
            ReferralError::InvalidAddress(_) | ReferralError::InvalidEmail => {
                error_codes::INVALID_PARAMETER
            }
            ReferralError::AlreadyReferred => error_codes::ALREADY_REFERRED,
            ReferralError::EmailCooldown(_) => error_codes::EMAIL_COOLDOWN,
            ReferralError::InvalidTransition => error_codes::INVALID_TRANSITION,
            ReferralError::ProgressNotFound => error_codes::PROGRESS_NOT_FOUND,
            ReferralError::NotEligible { .. } => error_codes::NOT_ELIGIBLE,
            ReferralError::DatabaseError(_) => error_codes::INTERNAL_ERROR,
        };

        Self {
            status: StatusCode::from_u16(e.http_status())
                .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
            code,
            msg: e.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ApiResponse::<()> {
            code: self.code,
            msg: self.msg,
            data: None,
        };
        (self.status, Json(body)).into_response()
    }
}
