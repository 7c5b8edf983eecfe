//! Referral Error Types

use thiserror::Error;

/// Referral engine error types
///
/// Error codes are stable strings for API responses.
#[derive(Error, Debug, Clone)]
pub enum ReferralError {
    // === Validation Errors ===
    #[error("Malformed address: {0}")]
    InvalidAddress(String),

    #[error("Malformed email")]
    InvalidEmail,

    // === Conflict Errors ===
    #[error("Invited user already has a referral record")]
    AlreadyReferred,

    #[error("Referral email was updated less than {0} hours ago")]
    EmailCooldown(i64),

    #[error("Referral is not in the required state for this transition")]
    InvalidTransition,

    // === Not-found Conditions ===
    #[error("No referral progress found for invited user")]
    ProgressNotFound,

    // === Eligibility ===
    #[error("Referrer has fewer accepted invites than required ({required})")]
    NotEligible { required: i64 },

    // === System Errors ===
    #[error("Database error: {0}")]
    DatabaseError(String),
}

impl ReferralError {
    /// Get the error code for API responses
    pub fn code(&self) -> &'static str {
        match self {
            ReferralError::InvalidAddress(_) => "INVALID_ADDRESS",
            ReferralError::InvalidEmail => "INVALID_EMAIL",
            ReferralError::AlreadyReferred => "ALREADY_REFERRED",
            ReferralError::EmailCooldown(_) => "EMAIL_COOLDOWN",
            ReferralError::InvalidTransition => "INVALID_TRANSITION",
            ReferralError::ProgressNotFound => "PROGRESS_NOT_FOUND",
            ReferralError::NotEligible { .. } => "NOT_ELIGIBLE",
            ReferralError::DatabaseError(_) => "DATABASE_ERROR",
        }
    }

    /// Get HTTP status code suggestion
    pub fn http_status(&self) -> u16 {
        match self {
            ReferralError::InvalidAddress(_) | ReferralError::InvalidEmail => 400,
            ReferralError::AlreadyReferred
            | ReferralError::EmailCooldown(_)
            | ReferralError::InvalidTransition => 409,
            ReferralError::ProgressNotFound => 404,
            ReferralError::NotEligible { .. } => 422,
            ReferralError::DatabaseError(_) => 500,
        }
    }
}

impl From<sqlx::Error> for ReferralError {
    fn from(e: sqlx::Error) -> Self {
        // A unique violation on referral_progress_tb(invited_user) means the
        // invited user is already attributed; surface it as the domain
        // conflict rather than a generic store failure.
        if let sqlx::Error::Database(ref db_err) = e {
            if db_err.code().as_deref() == Some("23505") {
                return ReferralError::AlreadyReferred;
            }
        }
        ReferralError::DatabaseError(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(ReferralError::AlreadyReferred.code(), "ALREADY_REFERRED");
        assert_eq!(ReferralError::EmailCooldown(24).code(), "EMAIL_COOLDOWN");
        assert_eq!(ReferralError::ProgressNotFound.code(), "PROGRESS_NOT_FOUND");
    }

    #[test]
    fn test_http_status() {
        assert_eq!(ReferralError::InvalidEmail.http_status(), 400);
        assert_eq!(ReferralError::AlreadyReferred.http_status(), 409);
        assert_eq!(ReferralError::EmailCooldown(24).http_status(), 409);
        assert_eq!(ReferralError::ProgressNotFound.http_status(), 404);
        assert_eq!(
            ReferralError::NotEligible { required: 5 }.http_status(),
            422
        );
        assert_eq!(
            ReferralError::DatabaseError("boom".into()).http_status(),
            500
        );
    }

    #[test]
    fn test_display() {
        let err = ReferralError::EmailCooldown(24);
        assert_eq!(
            err.to_string(),
            "Referral email was updated less than 24 hours ago"
        );
    }
}
