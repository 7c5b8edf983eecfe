//! Referral attribution engine
//!
//! Tracks referrer -> invited-user relationships through a staged
//! lifecycle (PENDING -> SIGNED_UP -> TIER_GRANTED, with a creation-time
//! REJECTED_IP_MATCH fraud gate) plus the bookkeeping around it: viewed
//! counters, reward-tier unlocks, and cooldown-gated contact emails.

pub mod error;
pub mod models;
pub mod schema;
pub mod service;
pub mod status;
pub mod store;

pub use error::ReferralError;
pub use models::{ReferralEmail, ReferralProgress, ReferralRewardImage, normalize_address};
pub use service::{ProgressSummary, ReferralService};
pub use status::{ProgressAdvance, ReferralStatus};
pub use store::{DEFAULT_LIMIT, ProgressFilter, ReferralStore};
