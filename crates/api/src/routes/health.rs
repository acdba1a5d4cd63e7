//! Health check endpoint.

/// GET /health: liveness probe, always `Ok`.
pub async fn check() -> &'static str {
    "Ok"
}
