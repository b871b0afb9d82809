use async_trait::async_trait;
use std::sync::Arc;
use crate::error::FinderError;
use crate::models::Coordinates;

/// Free-text address to best-match coordinates
///
/// `Ok(None)` means the service answered but found nothing.
#[async_trait]
pub trait Geocoder: Send + Sync {
    async fn geocode(&self, address: &str) -> Result<Option<Coordinates>, FinderError>;
}

/// A location ready to hand to a search backend
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedLocation {
    /// Trimmed text the user typed, used for label matching
    pub query: String,
    /// Present when the query was geocoded
    pub coordinates: Option<Coordinates>,
}

impl ResolvedLocation {
    pub fn text(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            coordinates: None,
        }
    }

    pub fn geocoded(query: impl Into<String>, coordinates: Coordinates) -> Self {
        Self {
            query: query.into(),
            coordinates: Some(coordinates),
        }
    }
}

/// Normalizes a location string
///
/// With a geocoder every query must geocode; without one the text is
/// passed through for store-backed label matching. Each call is
/// independent and failures are not retried here.
#[derive(Clone)]
pub struct LocationResolver {
    geocoder: Option<Arc<dyn Geocoder>>,
}

impl LocationResolver {
    pub fn new(geocoder: Arc<dyn Geocoder>) -> Self {
        Self {
            geocoder: Some(geocoder),
        }
    }

    pub fn text_only() -> Self {
        Self { geocoder: None }
    }

    pub async fn resolve(&self, location: &str) -> Result<ResolvedLocation, FinderError> {
        let query = location.trim();
        if query.is_empty() {
            return Err(FinderError::InvalidLocation(
                "location must not be empty".to_string(),
            ));
        }

        let Some(geocoder) = &self.geocoder else {
            return Ok(ResolvedLocation::text(query));
        };

        match geocoder.geocode(query).await? {
            Some(coordinates) if coordinates.is_valid() => {
                tracing::debug!(
                    "Geocoded '{}' to [{}, {}]",
                    query,
                    coordinates.longitude,
                    coordinates.latitude
                );
                Ok(ResolvedLocation::geocoded(query, coordinates))
            }
            _ => Err(FinderError::InvalidLocation(format!(
                "Could not geocode location '{}'",
                query
            ))),
        }
    }
}
