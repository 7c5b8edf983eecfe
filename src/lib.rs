//! Referral Engine
//!
//! Tracks referrer -> invited-user relationships through a multi-stage
//! lifecycle with an atomic creation-time fraud gate, and advances records
//! in response to observed engagement events rather than client claims.
//!
//! # Modules
//!
//! - [`referral`] - Store, status machine, policy service, schema
//! - [`progression`] - Event-driven SIGNED_UP -> TIER_GRANTED trigger
//! - [`gateway`] - HTTP surface (axum)
//! - [`db`] - PostgreSQL connection pool
//! - [`config`] - YAML application config
//! - [`logging`] - tracing setup

pub mod config;
pub mod db;
pub mod gateway;
pub mod logging;
pub mod progression;
pub mod referral;

// Convenient re-exports at crate root
pub use config::{AppConfig, ReferralConfig};
pub use db::Database;
pub use progression::{LifecycleEvent, ProgressionTrigger};
pub use referral::{
    ProgressAdvance, ProgressFilter, ProgressSummary, ReferralError, ReferralProgress,
    ReferralService, ReferralStatus, ReferralStore,
};
