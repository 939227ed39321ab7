//! Response DTOs.

use serde::Serialize;

use filegate_service::UploadOutcome;

#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub sources: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct UploadResponse {
    pub outcome: UploadOutcome,
}

#[derive(Debug, Clone, Serialize)]
pub struct MessageResponse {
    pub message: String,
}
