// Core pipeline exports
pub mod authz;
pub mod distance;
pub mod engine;
pub mod filters;
pub mod finder;
pub mod management;
pub mod resolver;
pub mod search;
pub mod selection;
pub mod session;

pub use authz::{authorize, Action, Policy, Principal, Resource, RolePolicy};
pub use distance::{distance_label, haversine_meters, label_distances};
pub use engine::FilterEngine;
pub use filters::GymAssociations;
pub use finder::{markers, GymFinder, RouteProvider, SessionSearch};
pub use resolver::{Geocoder, LocationResolver, ResolvedLocation};
pub use search::{gym_from_place, PlacesIndex, PlacesSearch, SearchBackend, SearchOptions, StoreSearch};
pub use selection::{FilterGroup, FilterSelection, PriceTier};
pub use session::{Completion, SearchSession, SearchTicket, SessionSnapshot};
