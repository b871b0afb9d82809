use crate::core::filters::{matches_selection, GymAssociations};
use crate::core::selection::FilterSelection;
use crate::models::Gym;

/// Narrows a candidate set by category and filter selection
///
/// # Combination rules
/// 1. No category and no selection returns the candidates unchanged
/// 2. A category keeps only gyms associated with it
/// 3. `amenities` keeps gyms with any selected amenity available
/// 4. `equipment`, `services` and `price` are further ANDed predicates
///
/// Survivors keep their input order and the input is never mutated.
#[derive(Debug, Clone, Copy, Default)]
pub struct FilterEngine;

impl FilterEngine {
    pub fn new() -> Self {
        Self
    }

    pub fn filter(
        &self,
        candidates: &[Gym],
        category_id: Option<&str>,
        selection: &FilterSelection,
        associations: &GymAssociations,
    ) -> Vec<Gym> {
        if category_id.is_none() && selection.is_empty() {
            return candidates.to_vec();
        }

        let filtered: Vec<Gym> = candidates
            .iter()
            .filter(|gym| matches_selection(gym, category_id, selection, associations))
            .cloned()
            .collect();

        tracing::debug!(
            "Filtered {} candidates down to {} (category: {:?})",
            candidates.len(),
            filtered.len(),
            category_id
        );

        filtered
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::selection::FilterGroup;
    use crate::models::{Coordinates, GymStatus};

    fn create_gym(id: &str) -> Gym {
        Gym {
            id: id.to_string(),
            name: format!("Gym {}", id),
            location: "Tampa, FL".to_string(),
            description: String::new(),
            coordinates: Coordinates::new(-82.45, 27.95),
            rating: 4.0,
            review_count: 3,
            price_range: Some("$$".to_string()),
            hours: "Closed".to_string(),
            images: vec![],
            status: GymStatus::Pending,
            owner_id: None,
            place_id: None,
            is_featured: false,
            distance: None,
            created_at: None,
            updated_at: None,
        }
    }

    #[test]
    fn test_no_filters_returns_candidates() {
        let engine = FilterEngine::new();
        let candidates = vec![create_gym("1"), create_gym("2")];

        let result = engine.filter(
            &candidates,
            None,
            &FilterSelection::new(),
            &GymAssociations::new(),
        );

        assert_eq!(result, candidates);
    }

    #[test]
    fn test_sauna_scenario_keeps_order() {
        let engine = FilterEngine::new();
        let candidates: Vec<Gym> = (1..=6).map(|i| create_gym(&i.to_string())).collect();

        let mut associations = GymAssociations::new();
        for id in ["2", "3", "6"] {
            associations.add_amenity(id, "sauna", true);
        }
        associations.add_amenity("4", "sauna", false);

        let selection = FilterSelection::new().with(FilterGroup::Amenities, ["sauna"]);
        let result = engine.filter(&candidates, None, &selection, &associations);

        let ids: Vec<&str> = result.iter().map(|g| g.id.as_str()).collect();
        assert_eq!(ids, vec!["2", "3", "6"]);
    }

    #[test]
    fn test_unknown_category_is_empty() {
        let engine = FilterEngine::new();
        let candidates = vec![create_gym("1"), create_gym("2")];

        let result = engine.filter(
            &candidates,
            Some("yoga"),
            &FilterSelection::new(),
            &GymAssociations::new(),
        );

        assert!(result.is_empty());
    }

    #[test]
    fn test_filter_is_idempotent() {
        let engine = FilterEngine::new();
        let candidates: Vec<Gym> = (1..=5).map(|i| create_gym(&i.to_string())).collect();

        let mut associations = GymAssociations::new();
        associations.add_category("1", "crossfit");
        associations.add_category("3", "crossfit");
        associations.add_amenity("3", "wifi", true);
        associations.add_amenity("1", "towel", true);

        let selection = FilterSelection::new()
            .with(FilterGroup::Amenities, ["wifi", "towel"])
            .with(FilterGroup::Price, ["moderate"]);

        let once = engine.filter(&candidates, Some("crossfit"), &selection, &associations);
        let twice = engine.filter(&once, Some("crossfit"), &selection, &associations);

        assert_eq!(once.len(), 2);
        assert_eq!(once, twice);
    }
}
