use serde::{Deserialize, Serialize};
use crate::core::selection::FilterSelection;
use crate::models::domain::{Gym, MapMarker};

/// Response for search and filter endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GymListResponse {
    pub location: String,
    pub gyms: Vec<Gym>,
    pub total_results: usize,
    pub category: Option<String>,
    pub filters: FilterSelection,
    /// A newer search superseded this one; `gyms` is the newer state
    #[serde(default)]
    pub stale: bool,
}

/// Search failure that still carries the last-known-good results
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchErrorResponse {
    pub error: String,
    pub message: String,
    pub status_code: u16,
    pub location: String,
    pub gyms: Vec<Gym>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarkersResponse {
    pub markers: Vec<MapMarker>,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub backend: String,
    pub version: String,
    pub active_sessions: u64,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

/// Error response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    pub status_code: u16,
}

/// Acknowledgement for create operations
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatedResponse {
    pub success: bool,
    pub id: String,
}
