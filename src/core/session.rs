use serde::Serialize;
use tokio::sync::Mutex;
use crate::core::selection::{FilterGroup, FilterSelection};
use crate::error::FinderError;
use crate::models::Gym;

/// Visible state of one user's search page
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SessionSnapshot {
    pub location: String,
    /// Last-known-good candidate set
    pub gyms: Vec<Gym>,
    pub category: Option<String>,
    pub filters: FilterSelection,
    pub error: Option<String>,
    pub loading: bool,
    pub latest_token: u64,
}

/// Issued when a search starts; only the latest ticket may complete
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchTicket {
    token: u64,
    location: String,
}

impl SearchTicket {
    pub fn token(&self) -> u64 {
        self.token
    }

    pub fn location(&self) -> &str {
        &self.location
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    Applied,
    /// A newer search was started; the outcome was discarded
    Stale,
}

/// Search state for one session
///
/// The displayed location changes as soon as a search begins. Responses
/// may arrive out of order, so each completion is checked against the
/// latest issued token. A failure records the error and keeps the
/// previous result set.
#[derive(Debug)]
pub struct SearchSession {
    state: Mutex<SessionSnapshot>,
}

impl SearchSession {
    pub fn new(initial_location: impl Into<String>) -> Self {
        Self {
            state: Mutex::new(SessionSnapshot {
                location: initial_location.into(),
                ..Default::default()
            }),
        }
    }

    pub async fn begin(&self, location: &str) -> SearchTicket {
        let mut state = self.state.lock().await;
        state.latest_token += 1;
        state.location = location.trim().to_string();
        state.loading = true;
        state.error = None;

        SearchTicket {
            token: state.latest_token,
            location: state.location.clone(),
        }
    }

    pub async fn complete(
        &self,
        ticket: &SearchTicket,
        outcome: &Result<Vec<Gym>, FinderError>,
    ) -> Completion {
        let mut state = self.state.lock().await;
        if ticket.token != state.latest_token {
            tracing::debug!(
                "Discarding stale search {} for '{}' (latest is {})",
                ticket.token,
                ticket.location,
                state.latest_token
            );
            return Completion::Stale;
        }

        state.loading = false;
        match outcome {
            Ok(gyms) => {
                state.gyms = gyms.clone();
                state.error = None;
            }
            Err(e) => {
                state.error = Some(e.to_string());
            }
        }

        Completion::Applied
    }

    pub async fn snapshot(&self) -> SessionSnapshot {
        self.state.lock().await.clone()
    }

    pub async fn candidates(&self) -> Vec<Gym> {
        self.state.lock().await.gyms.clone()
    }

    pub async fn set_filters(&self, category: Option<String>, filters: FilterSelection) {
        let mut state = self.state.lock().await;
        state.category = category;
        state.filters = filters;
    }

    /// Flip one option and return the resulting selection
    pub async fn toggle_filter(&self, group: FilterGroup, option: &str) -> FilterSelection {
        let mut state = self.state.lock().await;
        state.filters.toggle(group, option);
        state.filters.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Coordinates, GymStatus};

    fn create_gym(id: &str) -> Gym {
        Gym {
            id: id.to_string(),
            name: id.to_string(),
            location: "Tampa, FL".to_string(),
            description: String::new(),
            coordinates: Coordinates::new(-82.45, 27.95),
            rating: 0.0,
            review_count: 0,
            price_range: None,
            hours: String::new(),
            images: vec![],
            status: GymStatus::Verified,
            owner_id: None,
            place_id: None,
            is_featured: false,
            distance: None,
            created_at: None,
            updated_at: None,
        }
    }

    #[tokio::test]
    async fn test_location_updates_on_begin() {
        let session = SearchSession::new("Tampa, FL");
        session.begin("Orlando, FL").await;

        let snapshot = session.snapshot().await;
        assert_eq!(snapshot.location, "Orlando, FL");
        assert!(snapshot.loading);
    }

    #[tokio::test]
    async fn test_stale_completion_is_discarded() {
        let session = SearchSession::new("Tampa, FL");
        let first = session.begin("Tampa").await;
        let second = session.begin("Miami").await;

        let applied = session.complete(&second, &Ok(vec![create_gym("miami")])).await;
        let stale = session.complete(&first, &Ok(vec![create_gym("tampa")])).await;

        assert_eq!(applied, Completion::Applied);
        assert_eq!(stale, Completion::Stale);

        let snapshot = session.snapshot().await;
        assert_eq!(snapshot.location, "Miami");
        assert_eq!(snapshot.gyms[0].id, "miami");
    }

    #[tokio::test]
    async fn test_failure_keeps_last_known_good() {
        let session = SearchSession::new("Tampa, FL");
        let ticket = session.begin("Tampa").await;
        session.complete(&ticket, &Ok(vec![create_gym("g1")])).await;

        let ticket = session.begin("Nowhere").await;
        let outcome: Result<Vec<Gym>, FinderError> =
            Err(FinderError::SearchFailed("Places API error: UNKNOWN_ERROR".into()));
        session.complete(&ticket, &outcome).await;

        let snapshot = session.snapshot().await;
        assert_eq!(snapshot.gyms.len(), 1);
        assert!(snapshot.error.is_some());
        assert!(!snapshot.loading);
    }

    #[tokio::test]
    async fn test_toggle_filter_round_trip() {
        let session = SearchSession::new("Tampa, FL");
        let selected = session.toggle_filter(FilterGroup::Amenities, "sauna").await;
        assert!(selected.is_selected(FilterGroup::Amenities, "sauna"));

        let cleared = session.toggle_filter(FilterGroup::Amenities, "sauna").await;
        assert!(cleared.is_empty());
    }
}
