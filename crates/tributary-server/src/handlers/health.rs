use axum::Json;
use serde::Serialize;

use crate::extractors::BoundRemote;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    /// Key of the bound remote.
    pub remote: String,
}

pub async fn health_check(remote: BoundRemote) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "UP".to_string(),
        remote: remote.name().to_string(),
    })
}
