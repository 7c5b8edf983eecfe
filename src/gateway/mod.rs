//! HTTP gateway for the referral engine
//!
//! Thin surface over [`crate::referral::ReferralService`]: request parsing,
//! format validation, and status-code mapping. Authentication middleware is
//! wired by the deployment, not here.

pub mod handlers;
pub mod state;
pub mod types;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post},
};
use tokio::net::TcpListener;

pub use state::AppState;

pub fn build_router(state: Arc<AppState>) -> Router {
    let router = Router::new()
        .route("/health", get(handlers::health))
        .route(
            "/api/v1/referral",
            post(handlers::create_referral).get(handlers::list_referrals),
        )
        .route("/api/v1/referral/signed-up", post(handlers::mark_signed_up))
        .route(
            "/api/v1/referral/summary/{referrer}",
            get(handlers::progress_summary),
        )
        .route("/api/v1/referral/email", post(handlers::set_email));

    #[cfg(feature = "mock-api")]
    let router = router.route("/api/v1/internal/event", post(handlers::inject_event));

    router.with_state(state)
}

/// Bind and serve the gateway until the process exits
pub async fn serve(state: Arc<AppState>, host: &str, port: u16) -> anyhow::Result<()> {
    let addr = format!("{}:{}", host, port);
    let listener = TcpListener::bind(&addr).await?;
    tracing::info!("Gateway listening on {}", addr);

    axum::serve(
        listener,
        build_router(state).into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}
