// Unit tests for Gym Finder

use gym_finder::core::{
    distance::{distance_label, haversine_meters, label_distances},
    filters::{matches_all_options, matches_price},
    FilterEngine, FilterGroup, FilterSelection, GymAssociations, LocationResolver, PriceTier,
};
use gym_finder::models::{Coordinates, Gym, GymStatus};
use gym_finder::FinderError;
use std::collections::BTreeSet;

fn create_test_gym(id: &str, price: Option<&str>) -> Gym {
    Gym {
        id: id.to_string(),
        name: format!("Gym {}", id),
        location: "Tampa, FL".to_string(),
        description: String::new(),
        coordinates: Coordinates::new(-82.4572, 27.9506),
        rating: 4.2,
        review_count: 12,
        price_range: price.map(str::to_string),
        hours: "Open now".to_string(),
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

fn six_gyms_three_saunas() -> (Vec<Gym>, GymAssociations) {
    let gyms: Vec<Gym> = (1..=6).map(|i| create_test_gym(&format!("g{}", i), Some("$$"))).collect();

    let mut associations = GymAssociations::new();
    associations.add_amenity("g1", "sauna", true);
    associations.add_amenity("g2", "sauna", false);
    associations.add_amenity("g3", "sauna", true);
    associations.add_amenity("g4", "pool", true);
    associations.add_amenity("g6", "sauna", true);
    associations.add_category("g1", "crossfit");
    associations.add_category("g4", "crossfit");
    associations.add_category("g5", "yoga");

    (gyms, associations)
}

fn ids(gyms: &[Gym]) -> Vec<&str> {
    gyms.iter().map(|g| g.id.as_str()).collect()
}

#[test]
fn test_no_filters_returns_candidates_unchanged() {
    let (gyms, associations) = six_gyms_three_saunas();
    let result = FilterEngine::new().filter(&gyms, None, &FilterSelection::new(), &associations);
    assert_eq!(result, gyms);
}

#[test]
fn test_sauna_selection_keeps_available_in_order() {
    let (gyms, associations) = six_gyms_three_saunas();
    let selection = FilterSelection::new().with(FilterGroup::Amenities, ["sauna"]);

    let result = FilterEngine::new().filter(&gyms, None, &selection, &associations);
    assert_eq!(ids(&result), vec!["g1", "g3", "g6"]);
}

#[test]
fn test_category_outputs_are_members() {
    let (gyms, associations) = six_gyms_three_saunas();
    let result = FilterEngine::new().filter(&gyms, Some("crossfit"), &FilterSelection::new(), &associations);

    assert_eq!(ids(&result), vec!["g1", "g4"]);
    for gym in &result {
        assert!(associations.has_category(&gym.id, "crossfit"));
    }
}

#[test]
fn test_category_and_amenity_are_anded() {
    let (gyms, associations) = six_gyms_three_saunas();
    let selection = FilterSelection::new().with(FilterGroup::Amenities, ["sauna", "pool"]);

    let result = FilterEngine::new().filter(&gyms, Some("crossfit"), &selection, &associations);
    assert_eq!(ids(&result), vec!["g1", "g4"]);
}

#[test]
fn test_category_without_members_is_empty() {
    let (gyms, associations) = six_gyms_three_saunas();
    let result = FilterEngine::new().filter(&gyms, Some("boxing"), &FilterSelection::new(), &associations);
    assert!(result.is_empty());
}

#[test]
fn test_filtering_is_idempotent() {
    let (gyms, associations) = six_gyms_three_saunas();
    let engine = FilterEngine::new();
    let selection = FilterSelection::new().with(FilterGroup::Amenities, ["sauna"]);

    let once = engine.filter(&gyms, Some("crossfit"), &selection, &associations);
    let twice = engine.filter(&once, Some("crossfit"), &selection, &associations);
    assert_eq!(once, twice);
}

#[test]
fn test_equipment_requires_every_option() {
    let gym = create_test_gym("g1", None);
    let mut associations = GymAssociations::new();
    associations.add_amenity("g1", "squat-rack", true);
    associations.add_amenity("g1", "rower", false);

    let rack: BTreeSet<String> = ["squat-rack".to_string()].into();
    let rack_and_rower: BTreeSet<String> = ["squat-rack".to_string(), "rower".to_string()].into();

    assert!(matches_all_options(&gym, &rack, &associations));
    assert!(!matches_all_options(&gym, &rack_and_rower, &associations));
}

#[test]
fn test_price_tiers() {
    let moderate: BTreeSet<String> = ["moderate".to_string()].into();

    assert!(matches_price(&create_test_gym("g1", Some("$$")), &moderate));
    assert!(!matches_price(&create_test_gym("g2", Some("$$$$")), &moderate));
    assert!(!matches_price(&create_test_gym("g3", None), &moderate));

    assert_eq!(PriceTier::from_id("luxury").map(|t| t.label()), Some("$$$$"));
    assert_eq!(PriceTier::from_price_level(0), None);
}

#[test]
fn test_toggle_symmetry_and_group_purging() {
    let mut selection = FilterSelection::new();

    assert!(selection.toggle(FilterGroup::Equipment, "rower"));
    assert!(selection.contains_group(FilterGroup::Equipment));

    assert!(!selection.toggle(FilterGroup::Equipment, "rower"));
    assert!(!selection.contains_group(FilterGroup::Equipment));
    assert!(selection.is_empty());
}

#[test]
fn test_selection_json_drops_empty_groups() {
    let selection: FilterSelection =
        serde_json::from_str(r#"{"amenities":["sauna"],"equipment":[],"price":[" "]}"#).unwrap();

    assert!(selection.is_selected(FilterGroup::Amenities, "sauna"));
    assert!(!selection.contains_group(FilterGroup::Equipment));
    assert!(!selection.contains_group(FilterGroup::Price));
}

#[test]
fn test_distance_labels_from_origin() {
    let origin = Coordinates::new(-82.4572, 27.9506);
    let mut gyms = vec![create_test_gym("g1", None)];
    gyms[0].coordinates = Coordinates::new(-82.4572, 27.9651);

    label_distances(&mut gyms, origin);

    let meters = haversine_meters(origin, gyms[0].coordinates);
    assert_eq!(gyms[0].distance.as_deref(), Some(distance_label(meters).as_str()));
    assert_eq!(gyms[0].distance.as_deref(), Some("1 mile away"));
}

#[test]
fn test_blank_location_is_invalid() {
    let resolver = LocationResolver::text_only();
    let result = tokio_test::block_on(resolver.resolve("   "));
    assert!(matches!(result, Err(FinderError::InvalidLocation(_))));

    let resolved = tokio_test::block_on(resolver.resolve(" Tampa, FL ")).unwrap();
    assert_eq!(resolved.query, "Tampa, FL");
    assert!(resolved.coordinates.is_none());
}
