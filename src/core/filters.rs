use std::collections::{BTreeSet, HashMap, HashSet};
use crate::core::selection::{FilterGroup, FilterSelection, PriceTier};
use crate::models::{Gym, GymAmenity, GymCategory};

/// Gym-to-category and gym-to-amenity lookups for a candidate set
#[derive(Debug, Clone, Default)]
pub struct GymAssociations {
    categories: HashMap<String, HashSet<String>>,
    amenities: HashMap<String, HashMap<String, bool>>,
}

impl GymAssociations {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_rows(categories: &[GymCategory], amenities: &[GymAmenity]) -> Self {
        let mut associations = Self::new();
        for row in categories {
            associations.add_category(&row.gym_id, &row.category_id);
        }
        for row in amenities {
            associations.add_amenity(&row.gym_id, &row.amenity_id, row.is_available);
        }
        associations
    }

    pub fn add_category(&mut self, gym_id: &str, category_id: &str) {
        self.categories
            .entry(gym_id.to_string())
            .or_default()
            .insert(category_id.to_string());
    }

    pub fn add_amenity(&mut self, gym_id: &str, amenity_id: &str, is_available: bool) {
        self.amenities
            .entry(gym_id.to_string())
            .or_default()
            .insert(amenity_id.to_string(), is_available);
    }

    pub fn has_category(&self, gym_id: &str, category_id: &str) -> bool {
        self.categories
            .get(gym_id)
            .is_some_and(|ids| ids.contains(category_id))
    }

    /// An association flagged unavailable does not count
    pub fn has_available_amenity(&self, gym_id: &str, amenity_id: &str) -> bool {
        self.amenities
            .get(gym_id)
            .and_then(|ids| ids.get(amenity_id))
            .copied()
            .unwrap_or(false)
    }
}

/// Category predicate; a real membership lookup
#[inline]
pub fn matches_category(gym: &Gym, category_id: &str, associations: &GymAssociations) -> bool {
    associations.has_category(&gym.id, category_id)
}

/// Amenities are inclusive: any one selected amenity available is enough
#[inline]
pub fn matches_any_amenity(
    gym: &Gym,
    selected: &BTreeSet<String>,
    associations: &GymAssociations,
) -> bool {
    selected
        .iter()
        .any(|amenity_id| associations.has_available_amenity(&gym.id, amenity_id))
}

/// Equipment and services require every selected option to be available
#[inline]
pub fn matches_all_options(
    gym: &Gym,
    selected: &BTreeSet<String>,
    associations: &GymAssociations,
) -> bool {
    selected
        .iter()
        .all(|option_id| associations.has_available_amenity(&gym.id, option_id))
}

/// The gym's price label must map to one of the selected tiers
#[inline]
pub fn matches_price(gym: &Gym, selected: &BTreeSet<String>) -> bool {
    let Some(tier) = gym.price_range.as_deref().and_then(PriceTier::from_label) else {
        return false;
    };
    selected.contains(tier.id())
}

/// Per-group test for one non-empty filter group
#[inline]
pub fn matches_group(
    gym: &Gym,
    group: FilterGroup,
    selected: &BTreeSet<String>,
    associations: &GymAssociations,
) -> bool {
    match group {
        FilterGroup::Amenities => matches_any_amenity(gym, selected, associations),
        FilterGroup::Equipment | FilterGroup::Services => {
            matches_all_options(gym, selected, associations)
        }
        FilterGroup::Price => matches_price(gym, selected),
    }
}

/// Category AND every non-empty group
#[inline]
pub fn matches_selection(
    gym: &Gym,
    category_id: Option<&str>,
    selection: &FilterSelection,
    associations: &GymAssociations,
) -> bool {
    if let Some(category_id) = category_id {
        if !matches_category(gym, category_id, associations) {
            return false;
        }
    }

    selection
        .groups()
        .all(|(group, selected)| matches_group(gym, group, selected, associations))
}
