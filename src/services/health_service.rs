use tracing::warn;

use crate::{dto::health::HealthResponse, state::SharedState};

/// Report whether the player store is reachable, logging the failure when it is not.
pub async fn health_status(state: &SharedState) -> HealthResponse {
    match state.store().health_check().await {
        Ok(()) => HealthResponse::ok(),
        Err(err) => {
            warn!(error = %err, "player store health check failed");
            HealthResponse::degraded()
        }
    }
}
