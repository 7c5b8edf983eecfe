//! Shared state for the gateway

use std::sync::Arc;

use tokio::sync::mpsc;

use crate::db::Database;
use crate::progression::LifecycleEvent;
use crate::referral::ReferralService;

pub struct AppState {
    pub db: Arc<Database>,
    pub referral: Arc<ReferralService>,
    /// Transport boundary: adapters (and the mock-api endpoint) feed
    /// lifecycle events into the progression trigger through this sender.
    pub events: mpsc::Sender<LifecycleEvent>,
}
