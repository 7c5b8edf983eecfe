//! Progression Trigger
//!
//! Consumes domain lifecycle events from the transport boundary and
//! advances SIGNED_UP referrals to TIER_GRANTED when the invited user shows
//! real engagement (joining a live room), not merely account creation.
//!
//! Delivery is at-least-once; the status-filtered lookup makes redelivery a
//! natural no-op. A single bad event never takes the consumer loop down.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::{debug, error, info};

use crate::referral::{
    ProgressAdvance, ProgressFilter, ReferralError, ReferralStatus, ReferralStore,
    normalize_address,
};

/// Event kind this trigger reacts to; everything else is a no-op
pub const ROOM_JOINED_TYPE: &str = "USER_ACTIVITY";
pub const ROOM_JOINED_SUB_TYPE: &str = "ROOM_JOINED";

/// Lifecycle event as delivered by the external transport
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LifecycleEvent {
    #[serde(rename = "type")]
    pub event_type: String,
    pub sub_type: String,
    #[serde(default)]
    pub metadata: EventMetadata,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EventMetadata {
    #[serde(default)]
    pub user_address: Option<String>,
}

impl LifecycleEvent {
    fn is_room_joined(&self) -> bool {
        self.event_type == ROOM_JOINED_TYPE && self.sub_type == ROOM_JOINED_SUB_TYPE
    }
}

/// Store operations the trigger needs, behind a trait so the consumer loop
/// can be exercised without a live database.
#[async_trait]
pub trait ProgressionStore: Send + Sync {
    /// Referral records for this invited user still in SIGNED_UP
    async fn find_signed_up(
        &self,
        invited_user: &str,
    ) -> Result<Vec<String>, ReferralError>;

    /// Advance SIGNED_UP -> TIER_GRANTED; false when nothing matched
    async fn grant_tier(&self, invited_user: &str) -> Result<bool, ReferralError>;
}

#[async_trait]
impl ProgressionStore for ReferralStore {
    async fn find_signed_up(&self, invited_user: &str) -> Result<Vec<String>, ReferralError> {
        let rows = self
            .find_referral_progress(&ProgressFilter {
                invited_user: Some(invited_user.to_string()),
                status: Some(ReferralStatus::SignedUp),
                ..Default::default()
            })
            .await?;
        Ok(rows.into_iter().map(|r| r.invited_user).collect())
    }

    async fn grant_tier(&self, invited_user: &str) -> Result<bool, ReferralError> {
        self.update_referral_progress(invited_user, ProgressAdvance::TierGranted)
            .await
    }
}

/// Event-driven referral progression
pub struct ProgressionTrigger<S: ProgressionStore> {
    store: Arc<S>,
}

impl<S: ProgressionStore> ProgressionTrigger<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Run the consumer loop until the transport channel closes.
    ///
    /// Store failures are logged and the event left for the transport's
    /// redelivery policy; the loop never exits on a bad event.
    pub async fn run(&self, mut events: mpsc::Receiver<LifecycleEvent>) {
        info!("Progression trigger started");

        while let Some(event) = events.recv().await {
            if let Err(e) = self.handle_event(&event).await {
                error!(
                    event_type = %event.event_type,
                    sub_type = %event.sub_type,
                    error = %e,
                    "Failed to process lifecycle event, leaving for redelivery"
                );
            }
        }

        info!("Progression trigger stopped: event channel closed");
    }

    /// Process a single event. Returns the number of referrals advanced.
    pub async fn handle_event(&self, event: &LifecycleEvent) -> Result<usize, ReferralError> {
        if !event.is_room_joined() {
            return Ok(0);
        }

        let Some(address) = event
            .metadata
            .user_address
            .as_deref()
            .filter(|a| !a.trim().is_empty())
        else {
            // Data-quality defect upstream, not a referral-engine fault:
            // drop without retry.
            error!(
                event_type = %event.event_type,
                sub_type = %event.sub_type,
                "Room-joined event missing user_address, dropping"
            );
            return Ok(0);
        };

        let address = normalize_address(address);
        let matches = self.store.find_signed_up(&address).await?;
        if matches.is_empty() {
            // Common case: user was never referred, or already graduated
            debug!(user = %address, "No SIGNED_UP referral for room-joined user");
            return Ok(0);
        }

        let mut granted = 0;
        for invited_user in &matches {
            if self.store.grant_tier(invited_user).await? {
                info!(invited_user = %invited_user, "Referral advanced to TIER_GRANTED");
                granted += 1;
            }
        }

        Ok(granted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    /// In-memory store: invited users currently in SIGNED_UP
    struct MockStore {
        signed_up: Mutex<Vec<String>>,
        fail: bool,
    }

    impl MockStore {
        fn with_signed_up(users: &[&str]) -> Self {
            Self {
                signed_up: Mutex::new(users.iter().map(|s| s.to_string()).collect()),
                fail: false,
            }
        }

        fn failing() -> Self {
            Self {
                signed_up: Mutex::new(Vec::new()),
                fail: true,
            }
        }
    }

    #[async_trait]
    impl ProgressionStore for MockStore {
        async fn find_signed_up(&self, invited_user: &str) -> Result<Vec<String>, ReferralError> {
            if self.fail {
                return Err(ReferralError::DatabaseError("connection reset".into()));
            }
            Ok(self
                .signed_up
                .lock()
                .unwrap()
                .iter()
                .filter(|u| u.as_str() == invited_user)
                .cloned()
                .collect())
        }

        async fn grant_tier(&self, invited_user: &str) -> Result<bool, ReferralError> {
            if self.fail {
                return Err(ReferralError::DatabaseError("connection reset".into()));
            }
            let mut signed_up = self.signed_up.lock().unwrap();
            if let Some(pos) = signed_up.iter().position(|u| u == invited_user) {
                signed_up.remove(pos);
                Ok(true)
            } else {
                Ok(false)
            }
        }
    }

    fn room_joined(address: Option<&str>) -> LifecycleEvent {
        LifecycleEvent {
            event_type: ROOM_JOINED_TYPE.to_string(),
            sub_type: ROOM_JOINED_SUB_TYPE.to_string(),
            metadata: EventMetadata {
                user_address: address.map(|s| s.to_string()),
            },
        }
    }

    #[tokio::test]
    async fn test_room_joined_grants_tier() {
        let store = Arc::new(MockStore::with_signed_up(&["bob"]));
        let trigger = ProgressionTrigger::new(store.clone());

        let granted = trigger.handle_event(&room_joined(Some("bob"))).await.unwrap();
        assert_eq!(granted, 1);

        // Redelivery: no SIGNED_UP match remains, safe no-op
        let granted = trigger.handle_event(&room_joined(Some("bob"))).await.unwrap();
        assert_eq!(granted, 0);
    }

    #[tokio::test]
    async fn test_address_normalized_before_lookup() {
        let store = Arc::new(MockStore::with_signed_up(&["bob"]));
        let trigger = ProgressionTrigger::new(store);

        let granted = trigger
            .handle_event(&room_joined(Some("  BoB  ")))
            .await
            .unwrap();
        assert_eq!(granted, 1);
    }

    #[tokio::test]
    async fn test_foreign_events_ignored() {
        let store = Arc::new(MockStore::with_signed_up(&["bob"]));
        let trigger = ProgressionTrigger::new(store.clone());

        let event = LifecycleEvent {
            event_type: "USER_ACTIVITY".to_string(),
            sub_type: "PROFILE_UPDATED".to_string(),
            metadata: EventMetadata {
                user_address: Some("bob".to_string()),
            },
        };
        assert_eq!(trigger.handle_event(&event).await.unwrap(), 0);
        assert_eq!(store.signed_up.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_missing_address_dropped_not_error() {
        let store = Arc::new(MockStore::with_signed_up(&["bob"]));
        let trigger = ProgressionTrigger::new(store);

        assert_eq!(trigger.handle_event(&room_joined(None)).await.unwrap(), 0);
        assert_eq!(trigger.handle_event(&room_joined(Some("   "))).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_unreferred_user_is_noop() {
        let store = Arc::new(MockStore::with_signed_up(&[]));
        let trigger = ProgressionTrigger::new(store);

        assert_eq!(
            trigger.handle_event(&room_joined(Some("stranger"))).await.unwrap(),
            0
        );
    }

    #[tokio::test]
    async fn test_run_survives_store_failure() {
        let store = Arc::new(MockStore::failing());
        let trigger = ProgressionTrigger::new(store);

        let (tx, rx) = mpsc::channel(4);
        tx.send(room_joined(Some("bob"))).await.unwrap();
        tx.send(room_joined(Some("carol"))).await.unwrap();
        drop(tx);

        // Both events fail against the store; the loop must still drain the
        // channel and return when it closes.
        trigger.run(rx).await;
    }

    #[test]
    fn test_event_deserialization() {
        let json = r#"{
            "type": "USER_ACTIVITY",
            "sub_type": "ROOM_JOINED",
            "metadata": { "user_address": "0xAbc" }
        }"#;
        let event: LifecycleEvent = serde_json::from_str(json).unwrap();
        assert!(event.is_room_joined());
        assert_eq!(event.metadata.user_address.as_deref(), Some("0xAbc"));

        // Metadata may be absent entirely
        let json = r#"{ "type": "USER_ACTIVITY", "sub_type": "ROOM_JOINED" }"#;
        let event: LifecycleEvent = serde_json::from_str(json).unwrap();
        assert!(event.metadata.user_address.is_none());
    }
}
