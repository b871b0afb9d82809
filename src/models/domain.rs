use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use validator::Validate;

/// Geographic position, serialized as `[longitude, latitude]`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 2]", into = "[f64; 2]")]
pub struct Coordinates {
    pub longitude: f64,
    pub latitude: f64,
}

impl Coordinates {
    pub fn new(longitude: f64, latitude: f64) -> Self {
        Self { longitude, latitude }
    }

    /// Both components are finite and inside the WGS84 ranges
    pub fn is_valid(&self) -> bool {
        self.longitude.is_finite()
            && self.latitude.is_finite()
            && (-180.0..=180.0).contains(&self.longitude)
            && (-90.0..=90.0).contains(&self.latitude)
    }
}

impl From<[f64; 2]> for Coordinates {
    fn from(value: [f64; 2]) -> Self {
        Self::new(value[0], value[1])
    }
}

impl From<Coordinates> for [f64; 2] {
    fn from(value: Coordinates) -> Self {
        [value.longitude, value.latitude]
    }
}

/// Moderation state of a directory entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GymStatus {
    Verified,
    Pending,
    Flagged,
}

impl GymStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            GymStatus::Verified => "verified",
            GymStatus::Pending => "pending",
            GymStatus::Flagged => "flagged",
        }
    }
}

impl FromStr for GymStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "verified" => Ok(GymStatus::Verified),
            "pending" => Ok(GymStatus::Pending),
            "flagged" => Ok(GymStatus::Flagged),
            other => Err(format!("unknown gym status: {}", other)),
        }
    }
}

/// A directory entry for a fitness facility
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Gym {
    pub id: String,
    pub name: String,
    pub location: String,
    #[serde(default)]
    pub description: String,
    pub coordinates: Coordinates,
    #[serde(default)]
    pub rating: f64,
    #[serde(rename = "reviewCount", default)]
    pub review_count: u32,
    #[serde(rename = "priceRange", default)]
    pub price_range: Option<String>,
    #[serde(default)]
    pub hours: String,
    #[serde(default)]
    pub images: Vec<String>,
    pub status: GymStatus,
    #[serde(rename = "ownerId", default)]
    pub owner_id: Option<String>,
    #[serde(rename = "placeId", default)]
    pub place_id: Option<String>,
    #[serde(rename = "isFeatured", default)]
    pub is_featured: bool,
    #[serde(default)]
    pub distance: Option<String>,
    #[serde(rename = "createdAt", default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(rename = "updatedAt", default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Gym {
    /// The image shown on cards and map popups
    pub fn cover_image(&self) -> Option<&str> {
        self.images.first().map(String::as_str)
    }

    pub fn is_owned_by(&self, user_id: &str) -> bool {
        self.owner_id.as_deref() == Some(user_id)
    }
}

/// Partial update of a gym; absent fields are left untouched
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
pub struct GymPatch {
    #[validate(length(min = 1, max = 200))]
    pub name: Option<String>,
    #[validate(length(min = 1, max = 300))]
    pub location: Option<String>,
    pub description: Option<String>,
    pub coordinates: Option<Coordinates>,
    #[serde(rename = "priceRange")]
    #[validate(length(min = 1, max = 4))]
    pub price_range: Option<String>,
    pub hours: Option<String>,
    pub images: Option<Vec<String>>,
    pub status: Option<GymStatus>,
}

impl GymPatch {
    pub fn is_empty(&self) -> bool {
        self == &GymPatch::default()
    }

    /// Status transitions are a moderation action, not an ordinary edit
    pub fn changes_status(&self) -> bool {
        self.status.is_some()
    }
}

/// Classification tag for a gym's primary offering
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub icon: String,
}

/// Named facility attribute
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Amenity {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub icon: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GymCategory {
    pub id: String,
    #[serde(rename = "gymId")]
    pub gym_id: String,
    #[serde(rename = "categoryId")]
    pub category_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GymAmenity {
    pub id: String,
    #[serde(rename = "gymId")]
    pub gym_id: String,
    #[serde(rename = "amenityId")]
    pub amenity_id: String,
    #[serde(rename = "isAvailable")]
    pub is_available: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReviewStatus {
    Published,
    Pending,
    Rejected,
}

impl ReviewStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReviewStatus::Published => "published",
            ReviewStatus::Pending => "pending",
            ReviewStatus::Rejected => "rejected",
        }
    }
}

impl FromStr for ReviewStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "published" => Ok(ReviewStatus::Published),
            "pending" => Ok(ReviewStatus::Pending),
            "rejected" => Ok(ReviewStatus::Rejected),
            other => Err(format!("unknown review status: {}", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Review {
    pub id: String,
    #[serde(rename = "gymId")]
    pub gym_id: String,
    #[serde(rename = "userId")]
    pub user_id: String,
    pub rating: u8,
    pub content: String,
    pub status: ReviewStatus,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
}

/// Accuracy feedback a visitor leaves about a listing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Feedback {
    pub id: String,
    #[serde(rename = "gymId")]
    pub gym_id: String,
    #[serde(rename = "userId")]
    pub user_id: String,
    pub rating: u8,
    pub review: String,
    #[serde(rename = "amenitiesConfirmed", default)]
    pub amenities_confirmed: HashMap<String, bool>,
    #[serde(rename = "amenitiesMissing", default)]
    pub amenities_missing: Vec<String>,
    #[serde(rename = "isAccurate")]
    pub is_accurate: bool,
    #[serde(rename = "inaccuracyDetails", default)]
    pub inaccuracy_details: Option<String>,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub id: String,
    #[serde(rename = "senderId")]
    pub sender_id: String,
    #[serde(rename = "recipientId")]
    pub recipient_id: String,
    pub subject: String,
    pub content: String,
    #[serde(rename = "isRead")]
    pub is_read: bool,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    User,
    GymOwner,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::GymOwner => "gym_owner",
            Role::Admin => "admin",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(Role::User),
            "gym_owner" => Ok(Role::GymOwner),
            "admin" => Ok(Role::Admin),
            other => Err(format!("unknown role: {}", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub email: String,
    pub name: String,
    pub role: Role,
    #[serde(rename = "avatarUrl", default)]
    pub avatar_url: Option<String>,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
}

/// Amenity association joined with the amenity row, as shown on a gym page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GymAmenityDetail {
    pub amenity: Amenity,
    #[serde(rename = "isAvailable")]
    pub is_available: bool,
}

/// Everything the gym page needs in one payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GymDetails {
    pub gym: Gym,
    pub amenities: Vec<GymAmenityDetail>,
    pub categories: Vec<Category>,
    pub reviews: Vec<Review>,
}

/// Categories and amenities offered as filter options
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Catalog {
    pub categories: Vec<Category>,
    pub amenities: Vec<Amenity>,
}

/// Marker handed to the map renderer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapMarker {
    pub id: String,
    pub coordinates: Coordinates,
    pub popup: MarkerPopup,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarkerPopup {
    pub name: String,
    pub location: String,
    pub rating: f64,
    #[serde(rename = "reviewCount")]
    pub review_count: u32,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TravelMode {
    #[default]
    Driving,
    Walking,
    Cycling,
}

impl TravelMode {
    /// Routing profile name used by the directions service
    pub fn profile(&self) -> &'static str {
        match self {
            TravelMode::Driving => "driving",
            TravelMode::Walking => "walking",
            TravelMode::Cycling => "cycling",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteStep {
    pub instruction: String,
    #[serde(rename = "distanceM")]
    pub distance_m: f64,
    #[serde(rename = "durationS")]
    pub duration_s: f64,
}

/// Turn-by-turn path between two coordinates
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Route {
    pub mode: TravelMode,
    #[serde(rename = "distanceM")]
    pub distance_m: f64,
    #[serde(rename = "durationS")]
    pub duration_s: f64,
    /// GeoJSON LineString
    pub geometry: serde_json::Value,
    pub steps: Vec<RouteStep>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coordinates_serialize_as_lng_lat_pair() {
        let coords = Coordinates::new(-82.4572, 27.9506);
        let json = serde_json::to_string(&coords).unwrap();
        assert_eq!(json, "[-82.4572,27.9506]");

        let parsed: Coordinates = serde_json::from_str("[-82.4572,27.9506]").unwrap();
        assert_eq!(parsed, coords);
    }

    #[test]
    fn test_coordinates_validity() {
        assert!(Coordinates::new(-82.4, 27.9).is_valid());
        assert!(!Coordinates::new(-200.0, 27.9).is_valid());
        assert!(!Coordinates::new(0.0, f64::NAN).is_valid());
    }

    #[test]
    fn test_role_wire_names() {
        assert_eq!(serde_json::to_string(&Role::GymOwner).unwrap(), "\"gym_owner\"");
        assert_eq!("admin".parse::<Role>().unwrap(), Role::Admin);
        assert!("owner".parse::<Role>().is_err());
    }

    #[test]
    fn test_patch_status_is_moderation() {
        let patch = GymPatch {
            status: Some(GymStatus::Verified),
            ..Default::default()
        };
        assert!(patch.changes_status());
        assert!(!patch.is_empty());
        assert!(GymPatch::default().is_empty());
    }
}
