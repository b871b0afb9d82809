//! Gym Finder - gym directory search and filtering service
//!
//! This library provides the search pipeline behind the gym finder:
//! location resolution, store- or places-backed search, and the
//! category/amenity filter engine, plus the gated community and
//! management operations around the directory.

pub mod config;
pub mod core;
pub mod error;
pub mod models;
pub mod routes;
pub mod services;

// Re-export commonly used types
pub use crate::core::{FilterEngine, FilterGroup, FilterSelection, GymAssociations, GymFinder, SearchSession};
pub use error::FinderError;
pub use models::{Coordinates, Gym, GymStatus};
