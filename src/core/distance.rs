use geo::{HaversineDistance, Point};
use crate::models::{Coordinates, Gym};

const METERS_PER_MILE: f64 = 1609.344;

/// Great-circle distance between two positions in meters
#[inline]
pub fn haversine_meters(from: Coordinates, to: Coordinates) -> f64 {
    let a = Point::new(from.longitude, from.latitude);
    let b = Point::new(to.longitude, to.latitude);
    a.haversine_distance(&b)
}

#[inline]
pub fn meters_to_miles(meters: f64) -> f64 {
    meters / METERS_PER_MILE
}

/// Card label such as `"1.2 miles away"`
pub fn distance_label(meters: f64) -> String {
    let miles = meters_to_miles(meters);
    if miles < 0.1 {
        "Less than 0.1 miles away".to_string()
    } else if (miles - 1.0).abs() < 0.05 {
        "1 mile away".to_string()
    } else {
        format!("{:.1} miles away", miles)
    }
}

/// Label every gym with its distance from the search origin
pub fn label_distances(gyms: &mut [Gym], origin: Coordinates) {
    for gym in gyms.iter_mut() {
        let meters = haversine_meters(origin, gym.coordinates);
        gym.distance = Some(distance_label(meters));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_haversine_tampa_to_orlando() {
        // Tampa to Orlando is roughly 125 km
        let tampa = Coordinates::new(-82.4572, 27.9506);
        let orlando = Coordinates::new(-81.3792, 28.5383);

        let km = haversine_meters(tampa, orlando) / 1000.0;
        assert!((km - 125.0).abs() < 10.0, "Distance should be ~125km, got {}", km);
    }

    #[test]
    fn test_same_point_is_zero() {
        let tampa = Coordinates::new(-82.4572, 27.9506);
        assert!(haversine_meters(tampa, tampa) < 0.01);
    }

    #[test]
    fn test_distance_labels() {
        assert_eq!(distance_label(50.0), "Less than 0.1 miles away");
        assert_eq!(distance_label(1609.0), "1 mile away");
        assert_eq!(distance_label(1931.2), "1.2 miles away");
    }
}
