//! Data models for the referral program

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::status::ReferralStatus;

/// Lowercase-normalize an address.
///
/// Every read and write path goes through this, so lookups and the
/// uniqueness invariant always compare the normalized form.
pub fn normalize_address(addr: &str) -> String {
    addr.trim().to_lowercase()
}

/// One row per (referrer, invited user) pair
#[derive(Debug, Clone, Serialize)]
pub struct ReferralProgress {
    pub id: String,
    pub referrer: String,
    pub invited_user: String,
    /// Network-origin signal captured at creation; fraud scoring only
    #[serde(skip_serializing)]
    pub invited_user_ip: String,
    pub status: ReferralStatus,
    pub signed_up_at: Option<DateTime<Utc>>,
    pub tier_granted_at: Option<DateTime<Utc>>,
    /// Denormalized mirror of `status == TierGranted` for cheap counting
    pub tier_granted: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Append-only contact email history; current email = newest `updated_at` row
#[derive(Debug, Clone, Serialize)]
pub struct ReferralEmail {
    pub referrer: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// One row per (referrer, tier) unlock; never revoked
#[derive(Debug, Clone, Serialize)]
pub struct ReferralRewardImage {
    pub referrer: String,
    pub reward_image_url: String,
    pub tier: i32,
    pub created_at: DateTime<Utc>,
}
