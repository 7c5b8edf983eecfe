//! PostgreSQL schema for the referral tables
//!
//! All four tables are owned exclusively by the Referral Store; nothing
//! else writes to them.

use sqlx::PgPool;

use super::error::ReferralError;

const CREATE_PROGRESS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS referral_progress_tb (
    id              TEXT PRIMARY KEY,
    referrer        TEXT NOT NULL,
    invited_user    TEXT NOT NULL,
    invited_user_ip TEXT NOT NULL,
    status          SMALLINT NOT NULL,
    signed_up_at    TIMESTAMPTZ,
    tier_granted_at TIMESTAMPTZ,
    tier_granted    BOOLEAN NOT NULL DEFAULT FALSE,
    created_at      TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at      TIMESTAMPTZ NOT NULL DEFAULT NOW()
)
"#;

// An invited user is attributed to exactly one referrer, ever.
const CREATE_PROGRESS_INVITED_USER_IDX: &str = r#"
CREATE UNIQUE INDEX IF NOT EXISTS referral_progress_invited_user_uq
    ON referral_progress_tb (invited_user)
"#;

// Serves the fraud-gate count inside the atomic insert.
const CREATE_PROGRESS_IP_IDX: &str = r#"
CREATE INDEX IF NOT EXISTS referral_progress_referrer_ip_idx
    ON referral_progress_tb (referrer, invited_user_ip)
"#;

const CREATE_PROGRESS_REFERRER_IDX: &str = r#"
CREATE INDEX IF NOT EXISTS referral_progress_referrer_idx
    ON referral_progress_tb (referrer, created_at DESC)
"#;

const CREATE_TIER_SEEN_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS referral_tier_seen_tb (
    referrer                TEXT PRIMARY KEY,
    invites_accepted_viewed BIGINT NOT NULL DEFAULT 0,
    updated_at              TIMESTAMPTZ NOT NULL DEFAULT NOW()
)
"#;

const CREATE_EMAIL_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS referral_email_tb (
    id         BIGSERIAL PRIMARY KEY,
    referrer   TEXT NOT NULL,
    email      TEXT NOT NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
)
"#;

const CREATE_EMAIL_IDX: &str = r#"
CREATE INDEX IF NOT EXISTS referral_email_referrer_idx
    ON referral_email_tb (referrer, updated_at DESC)
"#;

const CREATE_REWARD_IMAGE_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS referral_reward_image_tb (
    id               BIGSERIAL PRIMARY KEY,
    referrer         TEXT NOT NULL,
    reward_image_url TEXT NOT NULL,
    tier             INT NOT NULL,
    created_at       TIMESTAMPTZ NOT NULL DEFAULT NOW()
)
"#;

const CREATE_REWARD_IMAGE_IDX: &str = r#"
CREATE INDEX IF NOT EXISTS referral_reward_image_referrer_idx
    ON referral_reward_image_tb (referrer, tier)
"#;

/// Create the referral tables and indexes if they do not exist
pub async fn init_schema(pool: &PgPool) -> Result<(), ReferralError> {
    tracing::info!("Initializing referral schema...");

    let statements = [
        CREATE_PROGRESS_TABLE,
        CREATE_PROGRESS_INVITED_USER_IDX,
        CREATE_PROGRESS_IP_IDX,
        CREATE_PROGRESS_REFERRER_IDX,
        CREATE_TIER_SEEN_TABLE,
        CREATE_EMAIL_TABLE,
        CREATE_EMAIL_IDX,
        CREATE_REWARD_IMAGE_TABLE,
        CREATE_REWARD_IMAGE_IDX,
    ];

    for stmt in statements {
        sqlx::query(stmt).execute(pool).await?;
    }

    tracing::info!("Referral schema initialized");
    Ok(())
}
