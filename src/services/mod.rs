// Service exports
pub mod cache;
pub mod directions;
pub mod directory;
pub mod memory;
pub mod places;
pub mod postgres;

pub use cache::{CacheKey, CacheStats, CatalogCache, SessionStore};
pub use directions::{DirectionsError, MapboxClient};
pub use directory::{GymDirectory, StoreError};
pub use memory::{InMemoryDirectory, InMemoryDirectoryBuilder};
pub use places::{PlacesClient, PlacesError};
pub use postgres::PostgresDirectory;
