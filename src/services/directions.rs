use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;
use crate::core::finder::RouteProvider;
use crate::error::FinderError;
use crate::models::{Coordinates, Route, RouteStep, TravelMode};

pub const DEFAULT_MAPBOX_URL: &str = "https://api.mapbox.com";

/// Errors that can occur when requesting directions
#[derive(Debug, Error)]
pub enum DirectionsError {
    #[error("HTTP request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("Directions API error: {0}")]
    ApiError(String),

    #[error("Invalid response format: {0}")]
    InvalidResponse(String),
}

impl From<DirectionsError> for FinderError {
    fn from(err: DirectionsError) -> Self {
        FinderError::SearchFailed(err.to_string())
    }
}

#[derive(Debug, Deserialize)]
struct DirectionsResponse {
    code: String,
    #[serde(default)]
    routes: Vec<RouteBody>,
    #[serde(default)]
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RouteBody {
    distance: f64,
    duration: f64,
    geometry: Value,
    #[serde(default)]
    legs: Vec<LegBody>,
}

#[derive(Debug, Deserialize)]
struct LegBody {
    #[serde(default)]
    steps: Vec<StepBody>,
}

#[derive(Debug, Deserialize)]
struct StepBody {
    distance: f64,
    duration: f64,
    maneuver: Maneuver,
}

#[derive(Debug, Deserialize)]
struct Maneuver {
    #[serde(default)]
    instruction: String,
}

impl RouteBody {
    fn into_route(self, mode: TravelMode) -> Route {
        let steps = self
            .legs
            .into_iter()
            .flat_map(|leg| leg.steps)
            .map(|step| RouteStep {
                instruction: step.maneuver.instruction,
                distance_m: step.distance,
                duration_s: step.duration,
            })
            .collect();

        Route {
            mode,
            distance_m: self.distance,
            duration_s: self.duration,
            geometry: self.geometry,
            steps,
        }
    }
}

/// Mapbox directions client
pub struct MapboxClient {
    base_url: String,
    access_token: String,
    client: Client,
}

impl MapboxClient {
    pub fn new(
        base_url: String,
        access_token: String,
        timeout: Duration,
    ) -> Result<Self, DirectionsError> {
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            access_token,
            client,
        })
    }

    /// First route between two points, `None` when no route exists
    pub async fn fetch_route(
        &self,
        from: Coordinates,
        to: Coordinates,
        mode: TravelMode,
    ) -> Result<Option<Route>, DirectionsError> {
        let url = format!(
            "{}/directions/v5/mapbox/{}/{},{};{},{}?steps=true&geometries=geojson&access_token={}",
            self.base_url,
            mode.profile(),
            from.longitude,
            from.latitude,
            to.longitude,
            to.latitude,
            urlencoding::encode(&self.access_token)
        );

        let response = self.client.get(&url).send().await?;
        let status = response.status();

        let body: DirectionsResponse = response.json().await.map_err(|e| {
            DirectionsError::InvalidResponse(format!("Failed to parse directions: {}", e))
        })?;

        match body.code.as_str() {
            "Ok" => Ok(body
                .routes
                .into_iter()
                .next()
                .map(|route| route.into_route(mode))),
            "NoRoute" | "NoSegment" => Ok(None),
            code => Err(DirectionsError::ApiError(format!(
                "{} ({}): {}",
                code,
                status,
                body.message.unwrap_or_default()
            ))),
        }
    }
}

#[async_trait]
impl RouteProvider for MapboxClient {
    async fn route(
        &self,
        from: Coordinates,
        to: Coordinates,
        mode: TravelMode,
    ) -> Result<Option<Route>, FinderError> {
        Ok(self.fetch_route(from, to, mode).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;

    fn client(base_url: String) -> MapboxClient {
        MapboxClient::new(base_url, "pk.test".to_string(), Duration::from_secs(5)).unwrap()
    }

    #[tokio::test]
    async fn test_route_flattens_leg_steps() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock(
                "GET",
                "/directions/v5/mapbox/walking/-82.45,27.95;-82.46,27.96",
            )
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("steps".into(), "true".into()),
                Matcher::UrlEncoded("geometries".into(), "geojson".into()),
                Matcher::UrlEncoded("access_token".into(), "pk.test".into()),
            ]))
            .with_body(
                r#"{"code":"Ok","routes":[{
                    "distance":1520.5,"duration":1100.0,
                    "geometry":{"type":"LineString","coordinates":[[-82.45,27.95],[-82.46,27.96]]},
                    "legs":[{"steps":[
                        {"distance":1000.0,"duration":700.0,"maneuver":{"instruction":"Head north"}},
                        {"distance":520.5,"duration":400.0,"maneuver":{"instruction":"Arrive"}}
                    ]}]
                }]}"#,
            )
            .create_async()
            .await;

        let route = client(server.url())
            .route(
                Coordinates::new(-82.45, 27.95),
                Coordinates::new(-82.46, 27.96),
                TravelMode::Walking,
            )
            .await
            .unwrap()
            .unwrap();

        mock.assert_async().await;
        assert_eq!(route.mode, TravelMode::Walking);
        assert_eq!(route.steps.len(), 2);
        assert_eq!(route.steps[0].instruction, "Head north");
        assert_eq!(route.geometry["type"], "LineString");
    }

    #[tokio::test]
    async fn test_no_route_is_none() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", Matcher::Any)
            .with_body(r#"{"code":"NoRoute","routes":[]}"#)
            .create_async()
            .await;

        let route = client(server.url())
            .route(
                Coordinates::new(-82.45, 27.95),
                Coordinates::new(10.0, 50.0),
                TravelMode::Driving,
            )
            .await
            .unwrap();

        assert!(route.is_none());
    }

    #[tokio::test]
    async fn test_invalid_token_is_search_failure() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", Matcher::Any)
            .with_status(401)
            .with_body(r#"{"code":"InvalidToken","message":"Not Authorized - Invalid Token"}"#)
            .create_async()
            .await;

        let err = client(server.url())
            .route(
                Coordinates::new(-82.45, 27.95),
                Coordinates::new(-82.46, 27.96),
                TravelMode::Cycling,
            )
            .await
            .unwrap_err();

        assert!(matches!(err, FinderError::SearchFailed(_)));
    }
}
