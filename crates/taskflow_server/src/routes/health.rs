use crate::extract::AppJson;
use taskflow_core::HealthEnvelope;

/// Liveness probe; touches no state.
pub async fn health() -> AppJson<HealthEnvelope> {
    AppJson(HealthEnvelope {
        success: true,
        status: "ok".to_string(),
        version: taskflow_core::core_version().to_string(),
    })
}
