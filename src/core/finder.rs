use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use crate::core::authz::{Policy, RolePolicy};
use crate::core::distance::label_distances;
use crate::core::engine::FilterEngine;
use crate::core::filters::GymAssociations;
use crate::core::resolver::LocationResolver;
use crate::core::search::{SearchBackend, SearchOptions};
use crate::core::selection::FilterSelection;
use crate::core::session::{Completion, SearchSession, SessionSnapshot};
use crate::error::FinderError;
use crate::models::{
    Catalog, Coordinates, Gym, GymAmenity, GymAmenityDetail, GymCategory, GymDetails, MapMarker,
    MarkerPopup, Route, TravelMode,
};
use crate::services::GymDirectory;

/// Turn-by-turn routing between two points
///
/// `Ok(None)` means the service answered but has no route.
#[async_trait]
pub trait RouteProvider: Send + Sync {
    async fn route(
        &self,
        from: Coordinates,
        to: Coordinates,
        mode: TravelMode,
    ) -> Result<Option<Route>, FinderError>;
}

/// Result of a search run through a session
#[derive(Debug)]
pub struct SessionSearch {
    pub completion: Completion,
    pub snapshot: SessionSnapshot,
    /// Set when this search failed and was the latest one issued
    pub error: Option<FinderError>,
}

/// The search and filter pipeline
///
/// Owns the injected collaborators and wires them in order:
/// resolve the location, run the backend, label distances, then filter the
/// candidate set with associations loaded from the directory.
pub struct GymFinder {
    pub(crate) resolver: LocationResolver,
    pub(crate) backend: Arc<dyn SearchBackend>,
    pub(crate) directory: Arc<dyn GymDirectory>,
    pub(crate) router: Option<Arc<dyn RouteProvider>>,
    pub(crate) policy: Arc<dyn Policy>,
    pub(crate) engine: FilterEngine,
    pub(crate) defaults: SearchOptions,
}

impl GymFinder {
    pub fn new(
        resolver: LocationResolver,
        backend: Arc<dyn SearchBackend>,
        directory: Arc<dyn GymDirectory>,
    ) -> Self {
        Self {
            resolver,
            backend,
            directory,
            router: None,
            policy: Arc::new(RolePolicy),
            engine: FilterEngine::new(),
            defaults: SearchOptions::default(),
        }
    }

    pub fn with_router(mut self, router: Arc<dyn RouteProvider>) -> Self {
        self.router = Some(router);
        self
    }

    pub fn with_policy(mut self, policy: Arc<dyn Policy>) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_defaults(mut self, defaults: SearchOptions) -> Self {
        self.defaults = defaults;
        self
    }

    pub fn defaults(&self) -> &SearchOptions {
        &self.defaults
    }

    pub fn backend_name(&self) -> &'static str {
        self.backend.name()
    }

    pub async fn directory_healthy(&self) -> bool {
        match self.directory.health_check().await {
            Ok(healthy) => healthy,
            Err(e) => {
                tracing::warn!("Directory health check failed: {}", e);
                false
            }
        }
    }

    /// Resolve, search and label distances
    ///
    /// Nothing is filtered here; a failure at any step returns no gyms.
    pub async fn search(
        &self,
        location: &str,
        options: &SearchOptions,
    ) -> Result<Vec<Gym>, FinderError> {
        let resolved = self.resolver.resolve(location).await?;

        tracing::info!(
            "Searching '{}' with {} backend (radius: {}m, keyword: '{}')",
            resolved.query,
            self.backend.name(),
            options.radius_m,
            options.keyword
        );

        let mut gyms = self.backend.search(&resolved, options).await?;

        if let Some(origin) = resolved.coordinates {
            label_distances(&mut gyms, origin);
        }

        tracing::info!("Found {} gyms for '{}'", gyms.len(), resolved.query);
        Ok(gyms)
    }

    /// Run a search and record its outcome in `session`
    ///
    /// A stale completion leaves the session untouched.
    pub async fn search_session(
        &self,
        session: &SearchSession,
        location: &str,
        options: &SearchOptions,
    ) -> SessionSearch {
        let ticket = session.begin(location).await;
        let outcome = self.search(location, options).await;
        let completion = session.complete(&ticket, &outcome).await;

        if let Err(e) = &outcome {
            tracing::warn!("Search for '{}' failed: {}", ticket.location(), e);
        }

        let error = match completion {
            Completion::Applied => outcome.err(),
            Completion::Stale => None,
        };

        SessionSearch {
            completion,
            snapshot: session.snapshot().await,
            error,
        }
    }

    /// Directory gym by id, or by the provider place id it is linked to
    pub async fn find_gym(&self, gym_id: &str) -> Result<Option<Gym>, FinderError> {
        if let Some(gym) = self.directory.gym_by_id(gym_id).await? {
            return Ok(Some(gym));
        }

        let linked = self
            .directory
            .gyms_by_place_ids(&[gym_id.to_string()])
            .await?;
        Ok(linked.into_iter().next())
    }

    /// Directory id for each candidate, in candidate order
    ///
    /// Places results use the provider place id as their id; the ones the
    /// directory lists are mapped to the directory's own id. Unlisted
    /// candidates keep their id and simply have no associations.
    async fn directory_ids(&self, candidates: &[Gym]) -> Result<Vec<String>, FinderError> {
        let place_ids: Vec<String> = candidates
            .iter()
            .filter(|gym| gym.place_id.as_deref() == Some(gym.id.as_str()))
            .map(|gym| gym.id.clone())
            .collect();

        if place_ids.is_empty() {
            return Ok(candidates.iter().map(|gym| gym.id.clone()).collect());
        }

        let linked: HashMap<String, String> = self
            .directory
            .gyms_by_place_ids(&place_ids)
            .await?
            .into_iter()
            .filter_map(|gym| gym.place_id.map(|place_id| (place_id, gym.id)))
            .collect();

        tracing::debug!(
            "Linked {} of {} place results to directory gyms",
            linked.len(),
            place_ids.len()
        );

        Ok(candidates
            .iter()
            .map(|gym| linked.get(&gym.id).cloned().unwrap_or_else(|| gym.id.clone()))
            .collect())
    }

    /// Load category and amenity associations for the candidates
    ///
    /// Rows are loaded under directory ids and keyed back to the
    /// candidate ids the engine sees.
    pub async fn associations(&self, candidates: &[Gym]) -> Result<GymAssociations, FinderError> {
        let directory_ids = self.directory_ids(candidates).await?;

        let mut candidate_ids: HashMap<&str, Vec<&str>> = HashMap::new();
        let mut ids: Vec<String> = Vec::with_capacity(directory_ids.len());
        for (gym, directory_id) in candidates.iter().zip(&directory_ids) {
            let entry = candidate_ids.entry(directory_id.as_str()).or_default();
            if entry.is_empty() {
                ids.push(directory_id.clone());
            }
            entry.push(gym.id.as_str());
        }

        let categories: Vec<GymCategory> = self
            .directory
            .gym_categories(&ids)
            .await?
            .into_iter()
            .flat_map(|row| {
                candidate_ids
                    .get(row.gym_id.as_str())
                    .into_iter()
                    .flatten()
                    .map(move |candidate_id| GymCategory {
                        gym_id: candidate_id.to_string(),
                        ..row.clone()
                    })
            })
            .collect();
        let amenities: Vec<GymAmenity> = self
            .directory
            .gym_amenities(&ids)
            .await?
            .into_iter()
            .flat_map(|row| {
                candidate_ids
                    .get(row.gym_id.as_str())
                    .into_iter()
                    .flatten()
                    .map(move |candidate_id| GymAmenity {
                        gym_id: candidate_id.to_string(),
                        ..row.clone()
                    })
            })
            .collect();

        Ok(GymAssociations::from_rows(&categories, &amenities))
    }

    /// Narrow `candidates`; the pure engine step runs only after
    /// associations load
    pub async fn filter(
        &self,
        candidates: &[Gym],
        category_id: Option<&str>,
        selection: &FilterSelection,
    ) -> Result<Vec<Gym>, FinderError> {
        if category_id.is_none() && selection.is_empty() {
            return Ok(candidates.to_vec());
        }

        let associations = self.associations(candidates).await?;
        Ok(self
            .engine
            .filter(candidates, category_id, selection, &associations))
    }

    /// Store the selection on the session and filter its current results
    pub async fn filter_session(
        &self,
        session: &SearchSession,
        category_id: Option<&str>,
        selection: FilterSelection,
    ) -> Result<Vec<Gym>, FinderError> {
        session
            .set_filters(category_id.map(str::to_string), selection.clone())
            .await;
        let candidates = session.candidates().await;
        self.filter(&candidates, category_id, &selection).await
    }

    pub async fn catalog(&self) -> Result<Catalog, FinderError> {
        Ok(Catalog {
            categories: self.directory.categories().await?,
            amenities: self.directory.amenities().await?,
        })
    }

    /// Gym page payload: associations joined with their catalog rows
    pub async fn gym_details(&self, gym_id: &str) -> Result<GymDetails, FinderError> {
        let gym = self
            .find_gym(gym_id)
            .await?
            .ok_or_else(|| FinderError::NotFound(format!("gym {}", gym_id)))?;

        let ids = [gym.id.clone()];
        let category_rows = self.directory.gym_categories(&ids).await?;
        let amenity_rows = self.directory.gym_amenities(&ids).await?;

        let categories: HashMap<String, _> = self
            .directory
            .categories()
            .await?
            .into_iter()
            .map(|c| (c.id.clone(), c))
            .collect();
        let amenities: HashMap<String, _> = self
            .directory
            .amenities()
            .await?
            .into_iter()
            .map(|a| (a.id.clone(), a))
            .collect();

        let amenities = amenity_rows
            .iter()
            .filter_map(|row| {
                amenities.get(&row.amenity_id).map(|amenity| GymAmenityDetail {
                    amenity: amenity.clone(),
                    is_available: row.is_available,
                })
            })
            .collect();
        let categories = category_rows
            .iter()
            .filter_map(|row| categories.get(&row.category_id).cloned())
            .collect();

        let reviews = self.directory.published_reviews(&gym.id).await?;

        Ok(GymDetails {
            gym,
            amenities,
            categories,
            reviews,
        })
    }

    /// Route from `from` to the gym, looking in `candidates` before the
    /// directory
    pub async fn directions(
        &self,
        gym_id: &str,
        candidates: &[Gym],
        from: Coordinates,
        mode: TravelMode,
    ) -> Result<Route, FinderError> {
        let router = self
            .router
            .as_ref()
            .ok_or_else(|| FinderError::SearchFailed("directions are not configured".to_string()))?;

        let destination = match candidates.iter().find(|gym| gym.id == gym_id) {
            Some(gym) => gym.coordinates,
            None => {
                self.find_gym(gym_id)
                    .await?
                    .ok_or_else(|| FinderError::NotFound(format!("gym {}", gym_id)))?
                    .coordinates
            }
        };

        tracing::debug!(
            "Routing {} from [{}, {}] to gym {}",
            mode.profile(),
            from.longitude,
            from.latitude,
            gym_id
        );

        router
            .route(from, destination, mode)
            .await?
            .ok_or_else(|| FinderError::SearchFailed(format!("no {} route to gym {}", mode.profile(), gym_id)))
    }
}

/// One marker per gym, in result order
pub fn markers(gyms: &[Gym]) -> Vec<MapMarker> {
    gyms.iter()
        .map(|gym| MapMarker {
            id: gym.id.clone(),
            coordinates: gym.coordinates,
            popup: MarkerPopup {
                name: gym.name.clone(),
                location: gym.location.clone(),
                rating: gym.rating,
                review_count: gym.review_count,
            },
        })
        .collect()
}
