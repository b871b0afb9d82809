use async_trait::async_trait;
use thiserror::Error;
use crate::models::{
    Amenity, Category, Feedback, Gym, GymAmenity, GymCategory, GymPatch, Message, Review,
    ReviewStatus, Role, User,
};

/// Errors that can occur when reading or writing the gym directory
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("SQLx error: {0}")]
    SqlxError(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    MigrateError(#[from] sqlx::migrate::MigrateError),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Directory unavailable: {0}")]
    Unavailable(String),
}

/// Relational gym directory
///
/// Handles all table access the pipeline needs:
/// - Gyms by location label, id or owner
/// - Category and amenity catalogs plus their gym associations
/// - Reviews, feedback, messages and users
#[async_trait]
pub trait GymDirectory: Send + Sync {
    /// Case-insensitive substring match on the location label
    async fn gyms_by_location(&self, text: &str) -> Result<Vec<Gym>, StoreError>;

    async fn gym_by_id(&self, id: &str) -> Result<Option<Gym>, StoreError>;

    /// Directory gyms linked to provider place ids
    async fn gyms_by_place_ids(&self, place_ids: &[String]) -> Result<Vec<Gym>, StoreError>;

    async fn gyms_by_owner(&self, owner_id: &str) -> Result<Vec<Gym>, StoreError>;

    async fn update_gym(&self, id: &str, patch: &GymPatch) -> Result<Gym, StoreError>;

    async fn categories(&self) -> Result<Vec<Category>, StoreError>;

    async fn amenities(&self) -> Result<Vec<Amenity>, StoreError>;

    async fn gym_categories(&self, gym_ids: &[String]) -> Result<Vec<GymCategory>, StoreError>;

    async fn gym_amenities(&self, gym_ids: &[String]) -> Result<Vec<GymAmenity>, StoreError>;

    /// Published reviews, newest first
    async fn published_reviews(&self, gym_id: &str) -> Result<Vec<Review>, StoreError>;

    async fn insert_review(&self, review: &Review) -> Result<(), StoreError>;

    async fn update_review_status(
        &self,
        id: &str,
        status: ReviewStatus,
    ) -> Result<Review, StoreError>;

    async fn insert_feedback(&self, feedback: &Feedback) -> Result<(), StoreError>;

    async fn insert_message(&self, message: &Message) -> Result<(), StoreError>;

    async fn user_by_id(&self, id: &str) -> Result<Option<User>, StoreError>;

    async fn users(&self) -> Result<Vec<User>, StoreError>;

    async fn update_user_role(&self, id: &str, role: Role) -> Result<User, StoreError>;

    async fn health_check(&self) -> Result<bool, StoreError>;
}
