use async_trait::async_trait;
use std::sync::Arc;
use crate::core::resolver::ResolvedLocation;
use crate::core::selection::PriceTier;
use crate::error::FinderError;
use crate::models::{Coordinates, Gym, GymStatus, PlaceRecord};
use crate::services::GymDirectory;

/// Places rated at or above this are shown as featured
pub const FEATURED_RATING: f64 = 4.5;

pub const DEFAULT_RADIUS_M: u32 = 5000;
pub const DEFAULT_KEYWORD: &str = "gym fitness";

/// Knobs for one search call
#[derive(Debug, Clone, PartialEq)]
pub struct SearchOptions {
    /// Meters; ignored by the store-backed search
    pub radius_m: u32,
    pub keyword: String,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            radius_m: DEFAULT_RADIUS_M,
            keyword: DEFAULT_KEYWORD.to_string(),
        }
    }
}

impl SearchOptions {
    /// Fill unset request values from these defaults
    pub fn overridden(&self, radius_m: Option<u32>, keyword: Option<&str>) -> Self {
        Self {
            radius_m: radius_m.unwrap_or(self.radius_m),
            keyword: keyword
                .map(str::trim)
                .filter(|k| !k.is_empty())
                .unwrap_or(self.keyword.as_str())
                .to_string(),
        }
    }
}

/// Third-party nearby-search index
#[async_trait]
pub trait PlacesIndex: Send + Sync {
    async fn nearby_search(
        &self,
        origin: Coordinates,
        radius_m: u32,
        keyword: &str,
    ) -> Result<Vec<PlaceRecord>, FinderError>;

    /// Public URL for a photo reference
    fn photo_url(&self, photo_reference: &str) -> String;
}

/// One strategy for turning a resolved location into candidate gyms
///
/// A failed search yields no partial results.
#[async_trait]
pub trait SearchBackend: Send + Sync {
    async fn search(
        &self,
        location: &ResolvedLocation,
        options: &SearchOptions,
    ) -> Result<Vec<Gym>, FinderError>;

    fn name(&self) -> &'static str;
}

/// Case-insensitive substring match against stored location labels
pub struct StoreSearch {
    directory: Arc<dyn GymDirectory>,
}

impl StoreSearch {
    pub fn new(directory: Arc<dyn GymDirectory>) -> Self {
        Self { directory }
    }
}

#[async_trait]
impl SearchBackend for StoreSearch {
    async fn search(
        &self,
        location: &ResolvedLocation,
        _options: &SearchOptions,
    ) -> Result<Vec<Gym>, FinderError> {
        self.directory
            .gyms_by_location(&location.query)
            .await
            .map_err(|e| FinderError::SearchFailed(format!("directory lookup failed: {}", e)))
    }

    fn name(&self) -> &'static str {
        "store"
    }
}

/// Coordinate + radius + keyword search against the places index
pub struct PlacesSearch {
    index: Arc<dyn PlacesIndex>,
    placeholder_image: String,
}

impl PlacesSearch {
    pub fn new(index: Arc<dyn PlacesIndex>, placeholder_image: impl Into<String>) -> Self {
        Self {
            index,
            placeholder_image: placeholder_image.into(),
        }
    }
}

#[async_trait]
impl SearchBackend for PlacesSearch {
    async fn search(
        &self,
        location: &ResolvedLocation,
        options: &SearchOptions,
    ) -> Result<Vec<Gym>, FinderError> {
        let origin = location.coordinates.ok_or_else(|| {
            FinderError::InvalidLocation(format!(
                "'{}' has no coordinates for a nearby search",
                location.query
            ))
        })?;

        let records = self
            .index
            .nearby_search(origin, options.radius_m, &options.keyword)
            .await?;

        tracing::debug!("Places index returned {} records", records.len());

        Ok(records
            .into_iter()
            .map(|record| {
                let image = record
                    .photos
                    .first()
                    .map(|photo| self.index.photo_url(&photo.photo_reference))
                    .unwrap_or_else(|| self.placeholder_image.clone());
                gym_from_place(record, image)
            })
            .collect())
    }

    fn name(&self) -> &'static str {
        "places"
    }
}

/// Map an external place into the directory shape
pub fn gym_from_place(record: PlaceRecord, image: String) -> Gym {
    let rating = record.rating.unwrap_or(0.0);
    let open_now = record
        .opening_hours
        .as_ref()
        .and_then(|hours| hours.open_now)
        .unwrap_or(false);

    Gym {
        id: record.place_id.clone(),
        name: record.name,
        location: record.vicinity.unwrap_or_default(),
        description: String::new(),
        coordinates: Coordinates::new(record.geometry.location.lng, record.geometry.location.lat),
        rating,
        review_count: record.user_ratings_total.unwrap_or(0),
        price_range: record
            .price_level
            .and_then(PriceTier::from_price_level)
            .map(|tier| tier.label().to_string()),
        hours: if open_now { "Open now" } else { "Closed" }.to_string(),
        images: vec![image],
        status: GymStatus::Pending,
        owner_id: None,
        place_id: Some(record.place_id),
        is_featured: rating >= FEATURED_RATING,
        distance: None,
        created_at: None,
        updated_at: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{LatLng, OpeningHours, PlaceGeometry, PlacePhoto};

    fn create_place(rating: Option<f64>, open_now: Option<bool>) -> PlaceRecord {
        PlaceRecord {
            place_id: "place-1".to_string(),
            name: "Iron Temple".to_string(),
            vicinity: Some("123 Main St, Tampa".to_string()),
            geometry: PlaceGeometry {
                location: LatLng { lat: 27.95, lng: -82.45 },
            },
            rating,
            user_ratings_total: Some(87),
            price_level: Some(2),
            photos: vec![],
            opening_hours: open_now.map(|open_now| OpeningHours {
                open_now: Some(open_now),
            }),
        }
    }

    #[test]
    fn test_place_mapping() {
        let gym = gym_from_place(create_place(Some(4.6), Some(true)), "img".to_string());

        assert_eq!(gym.id, "place-1");
        assert_eq!(gym.place_id.as_deref(), Some("place-1"));
        assert_eq!(gym.location, "123 Main St, Tampa");
        assert_eq!(gym.coordinates, Coordinates::new(-82.45, 27.95));
        assert_eq!(gym.hours, "Open now");
        assert_eq!(gym.price_range.as_deref(), Some("$$"));
        assert_eq!(gym.review_count, 87);
        assert!(gym.is_featured);
    }

    #[test]
    fn test_featured_threshold_and_closed_label() {
        let gym = gym_from_place(create_place(Some(4.49), None), "img".to_string());
        assert!(!gym.is_featured);
        assert_eq!(gym.hours, "Closed");

        let gym = gym_from_place(create_place(Some(4.5), Some(false)), "img".to_string());
        assert!(gym.is_featured);
        assert_eq!(gym.hours, "Closed");
    }

    #[test]
    fn test_unrated_place() {
        let gym = gym_from_place(create_place(None, None), "img".to_string());
        assert_eq!(gym.rating, 0.0);
        assert!(!gym.is_featured);
    }

    struct StaticIndex(Vec<PlaceRecord>);

    #[async_trait]
    impl PlacesIndex for StaticIndex {
        async fn nearby_search(
            &self,
            _origin: Coordinates,
            _radius_m: u32,
            _keyword: &str,
        ) -> Result<Vec<PlaceRecord>, FinderError> {
            Ok(self.0.clone())
        }

        fn photo_url(&self, photo_reference: &str) -> String {
            format!("https://photos.test/{}", photo_reference)
        }
    }

    #[tokio::test]
    async fn test_places_search_image_selection() {
        let mut with_photo = create_place(Some(4.0), None);
        with_photo.photos = vec![
            PlacePhoto { photo_reference: "first".to_string() },
            PlacePhoto { photo_reference: "second".to_string() },
        ];
        let without_photo = create_place(Some(4.0), None);

        let search = PlacesSearch::new(
            Arc::new(StaticIndex(vec![with_photo, without_photo])),
            "https://placeholder.test/gym.jpg",
        );
        let location = ResolvedLocation::geocoded("Tampa", Coordinates::new(-82.45, 27.95));

        let gyms = search.search(&location, &SearchOptions::default()).await.unwrap();

        assert_eq!(gyms[0].cover_image(), Some("https://photos.test/first"));
        assert_eq!(gyms[1].cover_image(), Some("https://placeholder.test/gym.jpg"));
    }

    #[tokio::test]
    async fn test_places_search_requires_coordinates() {
        let search = PlacesSearch::new(Arc::new(StaticIndex(vec![])), "img");
        let err = search
            .search(&ResolvedLocation::text("Tampa"), &SearchOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(err, FinderError::InvalidLocation(_)));
    }

    #[test]
    fn test_search_option_overrides() {
        let defaults = SearchOptions::default();
        assert_eq!(defaults.radius_m, 5000);
        assert_eq!(defaults.keyword, "gym fitness");

        let options = defaults.overridden(Some(8000), Some("  "));
        assert_eq!(options.radius_m, 8000);
        assert_eq!(options.keyword, "gym fitness");
    }
}
