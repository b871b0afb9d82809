use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;
use crate::core::resolver::Geocoder;
use crate::core::search::PlacesIndex;
use crate::error::FinderError;
use crate::models::{Coordinates, LatLng, PlaceRecord};

pub const DEFAULT_PLACES_URL: &str = "https://maps.googleapis.com/maps/api";

/// Errors that can occur when talking to the places service
#[derive(Debug, Error)]
pub enum PlacesError {
    #[error("HTTP request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("Places API error: {0}")]
    ApiError(String),

    #[error("Invalid response format: {0}")]
    InvalidResponse(String),
}

impl From<PlacesError> for FinderError {
    fn from(err: PlacesError) -> Self {
        FinderError::SearchFailed(err.to_string())
    }
}

#[derive(Debug, Deserialize)]
struct GeocodeResponse {
    status: String,
    #[serde(default)]
    results: Vec<GeocodeResult>,
    #[serde(default)]
    error_message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GeocodeResult {
    geometry: GeocodeGeometry,
}

#[derive(Debug, Deserialize)]
struct GeocodeGeometry {
    location: LatLng,
}

#[derive(Debug, Deserialize)]
struct NearbyResponse {
    status: String,
    #[serde(default)]
    results: Vec<PlaceRecord>,
    #[serde(default)]
    error_message: Option<String>,
}

const ZERO_RESULTS: &str = "ZERO_RESULTS";

/// Geocoding and nearby-search client
///
/// Handles the two places endpoints the finder needs:
/// - Address geocoding
/// - Gym nearby search with photo URLs
pub struct PlacesClient {
    base_url: String,
    api_key: String,
    client: Client,
}

impl PlacesClient {
    /// Create a new places client
    pub fn new(base_url: String, api_key: String, timeout: Duration) -> Result<Self, PlacesError> {
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            client,
        })
    }

    fn api_failure(status: &str, message: Option<String>) -> PlacesError {
        match message {
            Some(message) => PlacesError::ApiError(format!("{} ({})", status, message)),
            None => PlacesError::ApiError(status.to_string()),
        }
    }

    /// Best match for an address; `None` when nothing matched
    pub async fn geocode_address(&self, address: &str) -> Result<Option<Coordinates>, PlacesError> {
        let url = format!(
            "{}/geocode/json?address={}&key={}",
            self.base_url,
            urlencoding::encode(address),
            urlencoding::encode(&self.api_key)
        );

        tracing::debug!("Geocoding '{}'", address);

        let response = self.client.get(&url).send().await?;
        if !response.status().is_success() {
            return Err(PlacesError::ApiError(format!(
                "Geocoding request failed: {}",
                response.status()
            )));
        }

        let body: GeocodeResponse = response
            .json()
            .await
            .map_err(|e| PlacesError::InvalidResponse(format!("Failed to parse geocode: {}", e)))?;

        match body.status.as_str() {
            "OK" => Ok(body
                .results
                .first()
                .map(|r| Coordinates::new(r.geometry.location.lng, r.geometry.location.lat))),
            ZERO_RESULTS => Ok(None),
            status => Err(Self::api_failure(status, body.error_message)),
        }
    }

    /// Gyms within `radius_m` of `origin`, in provider order
    pub async fn nearby_gyms(
        &self,
        origin: Coordinates,
        radius_m: u32,
        keyword: &str,
    ) -> Result<Vec<PlaceRecord>, PlacesError> {
        let url = format!(
            "{}/place/nearbysearch/json?location={},{}&radius={}&type=gym&keyword={}&key={}",
            self.base_url,
            origin.latitude,
            origin.longitude,
            radius_m,
            urlencoding::encode(keyword),
            urlencoding::encode(&self.api_key)
        );

        let response = self.client.get(&url).send().await?;
        if !response.status().is_success() {
            return Err(PlacesError::ApiError(format!(
                "Nearby search failed: {}",
                response.status()
            )));
        }

        let body: NearbyResponse = response.json().await.map_err(|e| {
            PlacesError::InvalidResponse(format!("Failed to parse nearby search: {}", e))
        })?;

        match body.status.as_str() {
            "OK" => {
                tracing::debug!(
                    "Nearby search at [{}, {}] returned {} places",
                    origin.longitude,
                    origin.latitude,
                    body.results.len()
                );
                Ok(body.results)
            }
            ZERO_RESULTS => Ok(vec![]),
            status => Err(Self::api_failure(status, body.error_message)),
        }
    }
}

#[async_trait]
impl Geocoder for PlacesClient {
    async fn geocode(&self, address: &str) -> Result<Option<Coordinates>, FinderError> {
        Ok(self.geocode_address(address).await?)
    }
}

#[async_trait]
impl PlacesIndex for PlacesClient {
    async fn nearby_search(
        &self,
        origin: Coordinates,
        radius_m: u32,
        keyword: &str,
    ) -> Result<Vec<PlaceRecord>, FinderError> {
        Ok(self.nearby_gyms(origin, radius_m, keyword).await?)
    }

    fn photo_url(&self, photo_reference: &str) -> String {
        format!(
            "{}/place/photo?maxwidth=500&photo_reference={}&key={}",
            self.base_url,
            urlencoding::encode(photo_reference),
            urlencoding::encode(&self.api_key)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;

    fn client(base_url: String) -> PlacesClient {
        PlacesClient::new(base_url, "test-key".to_string(), Duration::from_secs(5)).unwrap()
    }

    #[tokio::test]
    async fn test_geocode_returns_lng_lat() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/geocode/json")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("address".into(), "Tampa, FL".into()),
                Matcher::UrlEncoded("key".into(), "test-key".into()),
            ]))
            .with_header("content-type", "application/json")
            .with_body(
                r#"{"status":"OK","results":[{"geometry":{"location":{"lat":27.9506,"lng":-82.4572}}}]}"#,
            )
            .create_async()
            .await;

        let coords = client(server.url()).geocode("Tampa, FL").await.unwrap();

        mock.assert_async().await;
        assert_eq!(coords, Some(Coordinates::new(-82.4572, 27.9506)));
    }

    #[tokio::test]
    async fn test_geocode_zero_results_is_none() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/geocode/json")
            .match_query(Matcher::Any)
            .with_body(r#"{"status":"ZERO_RESULTS","results":[]}"#)
            .create_async()
            .await;

        let coords = client(server.url()).geocode("????").await.unwrap();
        assert_eq!(coords, None);
    }

    #[tokio::test]
    async fn test_nearby_non_ok_status_is_search_failure() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/place/nearbysearch/json")
            .match_query(Matcher::Any)
            .with_body(r#"{"status":"OVER_QUERY_LIMIT","error_message":"quota"}"#)
            .create_async()
            .await;

        let err = client(server.url())
            .nearby_search(Coordinates::new(-82.45, 27.95), 5000, "gym fitness")
            .await
            .unwrap_err();

        assert!(matches!(err, FinderError::SearchFailed(_)));
        assert!(err.to_string().contains("OVER_QUERY_LIMIT"));
    }

    #[tokio::test]
    async fn test_nearby_parses_place_records() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/place/nearbysearch/json")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("location".into(), "27.95,-82.45".into()),
                Matcher::UrlEncoded("radius".into(), "5000".into()),
                Matcher::UrlEncoded("type".into(), "gym".into()),
            ]))
            .with_body(
                r#"{"status":"OK","results":[{
                    "place_id":"abc","name":"Iron Temple","vicinity":"1 Main St",
                    "geometry":{"location":{"lat":27.96,"lng":-82.46}},
                    "rating":4.7,"user_ratings_total":120,"price_level":2,
                    "photos":[{"photo_reference":"ref1"}],
                    "opening_hours":{"open_now":true}
                }]}"#,
            )
            .create_async()
            .await;

        let records = client(server.url())
            .nearby_search(Coordinates::new(-82.45, 27.95), 5000, "gym fitness")
            .await
            .unwrap();

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].place_id, "abc");
        assert_eq!(records[0].price_level, Some(2));
    }

    #[test]
    fn test_photo_url_encodes_reference() {
        let places = client("https://maps.example.com/api/".to_string());
        assert_eq!(
            places.photo_url("a b"),
            "https://maps.example.com/api/place/photo?maxwidth=500&photo_reference=a%20b&key=test-key"
        );
    }
}
