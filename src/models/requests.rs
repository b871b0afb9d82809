use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use validator::Validate;
use crate::core::selection::{FilterGroup, FilterSelection};
use crate::models::domain::{ReviewStatus, Role, TravelMode};

/// Request to search gyms near a location
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SearchGymsRequest {
    #[validate(length(min = 1))]
    #[serde(alias = "session_id", rename = "sessionId")]
    pub session_id: String,
    #[validate(length(min = 1, max = 200))]
    pub location: String,
    #[validate(range(min = 100, max = 50000))]
    #[serde(default)]
    pub radius: Option<u32>,
    #[validate(length(min = 1, max = 100))]
    #[serde(default)]
    pub keyword: Option<String>,
}

/// Request to narrow a session's current results
///
/// When `filters` is omitted the session's stored selection is reused.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct FilterGymsRequest {
    #[validate(length(min = 1))]
    #[serde(alias = "session_id", rename = "sessionId")]
    pub session_id: String,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub filters: Option<FilterSelection>,
}

impl FilterGymsRequest {
    /// Blank and `"all"` categories mean no category
    pub fn category_id(&self) -> Option<&str> {
        self.category
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty() && !c.eq_ignore_ascii_case("all"))
    }
}

/// Toggle one option of one filter group
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ToggleFilterRequest {
    #[validate(length(min = 1))]
    #[serde(alias = "session_id", rename = "sessionId")]
    pub session_id: String,
    pub group: FilterGroup,
    #[validate(length(min = 1))]
    pub option: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SessionQuery {
    #[validate(length(min = 1))]
    #[serde(alias = "session_id", rename = "sessionId")]
    pub session_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct DirectionsQuery {
    #[serde(default, alias = "session_id", rename = "sessionId")]
    pub session_id: Option<String>,
    #[validate(range(min = -180.0, max = 180.0))]
    #[serde(rename = "fromLng")]
    pub from_lng: f64,
    #[validate(range(min = -90.0, max = 90.0))]
    #[serde(rename = "fromLat")]
    pub from_lat: f64,
    #[serde(default)]
    pub mode: TravelMode,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SubmitFeedbackRequest {
    #[validate(length(min = 1))]
    #[serde(rename = "gymId")]
    pub gym_id: String,
    #[validate(range(min = 1, max = 5))]
    pub rating: u8,
    #[validate(length(max = 2000))]
    #[serde(default)]
    pub review: String,
    #[serde(rename = "amenitiesConfirmed", default)]
    pub amenities_confirmed: HashMap<String, bool>,
    #[serde(rename = "amenitiesMissing", default)]
    pub amenities_missing: Vec<String>,
    #[serde(rename = "isAccurate", default)]
    pub is_accurate: Option<bool>,
    #[validate(length(max = 2000))]
    #[serde(rename = "inaccuracyDetails", default)]
    pub inaccuracy_details: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SubmitReviewRequest {
    #[validate(length(min = 1))]
    #[serde(rename = "gymId")]
    pub gym_id: String,
    #[validate(range(min = 1, max = 5))]
    pub rating: u8,
    #[validate(length(min = 1, max = 5000))]
    pub content: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct VerificationRequest {
    #[validate(email)]
    #[serde(rename = "recipientEmail")]
    pub recipient_email: String,
    #[validate(length(min = 1, max = 5000))]
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateRoleRequest {
    pub role: Role,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewStatusRequest {
    pub status: ReviewStatus,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_category_means_none() {
        let req: FilterGymsRequest =
            serde_json::from_str(r#"{"sessionId":"s1","category":"All"}"#).unwrap();
        assert_eq!(req.category_id(), None);

        let req: FilterGymsRequest =
            serde_json::from_str(r#"{"sessionId":"s1","category":" yoga "}"#).unwrap();
        assert_eq!(req.category_id(), Some("yoga"));
    }

    #[test]
    fn test_search_request_validation() {
        let req = SearchGymsRequest {
            session_id: "s1".to_string(),
            location: String::new(),
            radius: Some(10),
            keyword: None,
        };
        let errors = req.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("location"));
        assert!(fields.contains_key("radius"));
    }

    #[test]
    fn test_feedback_rating_bounds() {
        let req: SubmitFeedbackRequest =
            serde_json::from_str(r#"{"gymId":"g1","rating":6}"#).unwrap();
        assert!(req.validate().is_err());
    }
}
