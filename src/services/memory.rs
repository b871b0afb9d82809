use async_trait::async_trait;
use chrono::Utc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::RwLock;
use crate::models::{
    Amenity, Category, Feedback, Gym, GymAmenity, GymCategory, GymPatch, Message, Review,
    ReviewStatus, Role, User,
};
use crate::services::directory::{GymDirectory, StoreError};

#[derive(Debug, Default, Clone)]
struct Tables {
    gyms: Vec<Gym>,
    categories: Vec<Category>,
    amenities: Vec<Amenity>,
    gym_categories: Vec<GymCategory>,
    gym_amenities: Vec<GymAmenity>,
    reviews: Vec<Review>,
    feedback: Vec<Feedback>,
    messages: Vec<Message>,
    users: Vec<User>,
}

/// Directory held in process memory
///
/// Rows keep insertion order, which stands in for provider order.
/// `set_unavailable(true)` makes every call fail, for exercising error paths.
#[derive(Debug, Default)]
pub struct InMemoryDirectory {
    tables: RwLock<Tables>,
    unavailable: AtomicBool,
}

/// Seeds an [`InMemoryDirectory`]
#[derive(Debug, Default)]
pub struct InMemoryDirectoryBuilder {
    tables: Tables,
}

impl InMemoryDirectoryBuilder {
    pub fn gym(mut self, gym: Gym) -> Self {
        self.tables.gyms.push(gym);
        self
    }

    pub fn category(mut self, id: &str, name: &str) -> Self {
        self.tables.categories.push(Category {
            id: id.to_string(),
            name: name.to_string(),
            icon: String::new(),
        });
        self
    }

    pub fn amenity(mut self, id: &str, name: &str) -> Self {
        self.tables.amenities.push(Amenity {
            id: id.to_string(),
            name: name.to_string(),
            icon: String::new(),
        });
        self
    }

    pub fn gym_category(mut self, gym_id: &str, category_id: &str) -> Self {
        let id = format!("gc-{}", self.tables.gym_categories.len() + 1);
        self.tables.gym_categories.push(GymCategory {
            id,
            gym_id: gym_id.to_string(),
            category_id: category_id.to_string(),
        });
        self
    }

    pub fn gym_amenity(mut self, gym_id: &str, amenity_id: &str, is_available: bool) -> Self {
        let id = format!("ga-{}", self.tables.gym_amenities.len() + 1);
        self.tables.gym_amenities.push(GymAmenity {
            id,
            gym_id: gym_id.to_string(),
            amenity_id: amenity_id.to_string(),
            is_available,
        });
        self
    }

    pub fn review(mut self, review: Review) -> Self {
        self.tables.reviews.push(review);
        self
    }

    pub fn user(mut self, id: &str, name: &str, role: Role) -> Self {
        self.tables.users.push(User {
            id: id.to_string(),
            email: format!("{}@example.com", id),
            name: name.to_string(),
            role,
            avatar_url: None,
            created_at: Utc::now(),
        });
        self
    }

    pub fn build(self) -> InMemoryDirectory {
        InMemoryDirectory {
            tables: RwLock::new(self.tables),
            unavailable: AtomicBool::new(false),
        }
    }
}

impl InMemoryDirectory {
    pub fn builder() -> InMemoryDirectoryBuilder {
        InMemoryDirectoryBuilder::default()
    }

    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    fn check_available(&self) -> Result<(), StoreError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("connection refused".to_string()));
        }
        Ok(())
    }

    pub async fn reviews(&self) -> Vec<Review> {
        self.tables.read().await.reviews.clone()
    }

    pub async fn feedback(&self) -> Vec<Feedback> {
        self.tables.read().await.feedback.clone()
    }

    pub async fn messages(&self) -> Vec<Message> {
        self.tables.read().await.messages.clone()
    }
}

#[async_trait]
impl GymDirectory for InMemoryDirectory {
    async fn gyms_by_location(&self, text: &str) -> Result<Vec<Gym>, StoreError> {
        self.check_available()?;
        let needle = text.to_lowercase();
        let tables = self.tables.read().await;
        Ok(tables
            .gyms
            .iter()
            .filter(|gym| gym.location.to_lowercase().contains(&needle))
            .cloned()
            .collect())
    }

    async fn gym_by_id(&self, id: &str) -> Result<Option<Gym>, StoreError> {
        self.check_available()?;
        let tables = self.tables.read().await;
        Ok(tables.gyms.iter().find(|gym| gym.id == id).cloned())
    }

    async fn gyms_by_place_ids(&self, place_ids: &[String]) -> Result<Vec<Gym>, StoreError> {
        self.check_available()?;
        let tables = self.tables.read().await;
        Ok(tables
            .gyms
            .iter()
            .filter(|gym| {
                gym.place_id
                    .as_ref()
                    .is_some_and(|place_id| place_ids.contains(place_id))
            })
            .cloned()
            .collect())
    }

    async fn gyms_by_owner(&self, owner_id: &str) -> Result<Vec<Gym>, StoreError> {
        self.check_available()?;
        let tables = self.tables.read().await;
        Ok(tables
            .gyms
            .iter()
            .filter(|gym| gym.is_owned_by(owner_id))
            .cloned()
            .collect())
    }

    async fn update_gym(&self, id: &str, patch: &GymPatch) -> Result<Gym, StoreError> {
        self.check_available()?;
        let mut tables = self.tables.write().await;
        let gym = tables
            .gyms
            .iter_mut()
            .find(|gym| gym.id == id)
            .ok_or_else(|| StoreError::NotFound(format!("gym {}", id)))?;

        if let Some(name) = &patch.name {
            gym.name = name.clone();
        }
        if let Some(location) = &patch.location {
            gym.location = location.clone();
        }
        if let Some(description) = &patch.description {
            gym.description = description.clone();
        }
        if let Some(coordinates) = patch.coordinates {
            gym.coordinates = coordinates;
        }
        if let Some(price_range) = &patch.price_range {
            gym.price_range = Some(price_range.clone());
        }
        if let Some(hours) = &patch.hours {
            gym.hours = hours.clone();
        }
        if let Some(images) = &patch.images {
            gym.images = images.clone();
        }
        if let Some(status) = patch.status {
            gym.status = status;
        }
        gym.updated_at = Some(Utc::now());

        Ok(gym.clone())
    }

    async fn categories(&self) -> Result<Vec<Category>, StoreError> {
        self.check_available()?;
        Ok(self.tables.read().await.categories.clone())
    }

    async fn amenities(&self) -> Result<Vec<Amenity>, StoreError> {
        self.check_available()?;
        Ok(self.tables.read().await.amenities.clone())
    }

    async fn gym_categories(&self, gym_ids: &[String]) -> Result<Vec<GymCategory>, StoreError> {
        self.check_available()?;
        let tables = self.tables.read().await;
        Ok(tables
            .gym_categories
            .iter()
            .filter(|row| gym_ids.contains(&row.gym_id))
            .cloned()
            .collect())
    }

    async fn gym_amenities(&self, gym_ids: &[String]) -> Result<Vec<GymAmenity>, StoreError> {
        self.check_available()?;
        let tables = self.tables.read().await;
        Ok(tables
            .gym_amenities
            .iter()
            .filter(|row| gym_ids.contains(&row.gym_id))
            .cloned()
            .collect())
    }

    async fn published_reviews(&self, gym_id: &str) -> Result<Vec<Review>, StoreError> {
        self.check_available()?;
        let tables = self.tables.read().await;
        let mut reviews: Vec<Review> = tables
            .reviews
            .iter()
            .filter(|r| r.gym_id == gym_id && r.status == ReviewStatus::Published)
            .cloned()
            .collect();
        reviews.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(reviews)
    }

    async fn insert_review(&self, review: &Review) -> Result<(), StoreError> {
        self.check_available()?;
        self.tables.write().await.reviews.push(review.clone());
        Ok(())
    }

    async fn update_review_status(
        &self,
        id: &str,
        status: ReviewStatus,
    ) -> Result<Review, StoreError> {
        self.check_available()?;
        let mut tables = self.tables.write().await;
        let review = tables
            .reviews
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or_else(|| StoreError::NotFound(format!("review {}", id)))?;
        review.status = status;
        Ok(review.clone())
    }

    async fn insert_feedback(&self, feedback: &Feedback) -> Result<(), StoreError> {
        self.check_available()?;
        self.tables.write().await.feedback.push(feedback.clone());
        Ok(())
    }

    async fn insert_message(&self, message: &Message) -> Result<(), StoreError> {
        self.check_available()?;
        self.tables.write().await.messages.push(message.clone());
        Ok(())
    }

    async fn user_by_id(&self, id: &str) -> Result<Option<User>, StoreError> {
        self.check_available()?;
        let tables = self.tables.read().await;
        Ok(tables.users.iter().find(|u| u.id == id).cloned())
    }

    async fn users(&self) -> Result<Vec<User>, StoreError> {
        self.check_available()?;
        Ok(self.tables.read().await.users.clone())
    }

    async fn update_user_role(&self, id: &str, role: Role) -> Result<User, StoreError> {
        self.check_available()?;
        let mut tables = self.tables.write().await;
        let user = tables
            .users
            .iter_mut()
            .find(|u| u.id == id)
            .ok_or_else(|| StoreError::NotFound(format!("user {}", id)))?;
        user.role = role;
        Ok(user.clone())
    }

    async fn health_check(&self) -> Result<bool, StoreError> {
        Ok(!self.unavailable.load(Ordering::SeqCst))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Coordinates, GymStatus};

    fn create_gym(id: &str, location: &str) -> Gym {
        Gym {
            id: id.to_string(),
            name: id.to_string(),
            location: location.to_string(),
            description: String::new(),
            coordinates: Coordinates::new(-82.45, 27.95),
            rating: 0.0,
            review_count: 0,
            price_range: None,
            hours: String::new(),
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

    #[tokio::test]
    async fn test_location_match_is_case_insensitive_substring() {
        let directory = InMemoryDirectory::builder()
            .gym(create_gym("g1", "100 Bayshore Blvd, Tampa, FL"))
            .gym(create_gym("g2", "Orlando, FL"))
            .build();

        let gyms = directory.gyms_by_location("tampa").await.unwrap();
        assert_eq!(gyms.len(), 1);
        assert_eq!(gyms[0].id, "g1");
    }

    #[tokio::test]
    async fn test_place_ids_match_linked_gyms() {
        let mut linked = create_gym("g1", "Tampa, FL");
        linked.place_id = Some("place-1".to_string());
        let directory = InMemoryDirectory::builder()
            .gym(linked)
            .gym(create_gym("g2", "Tampa, FL"))
            .build();

        let gyms = directory
            .gyms_by_place_ids(&["place-1".to_string(), "place-9".to_string()])
            .await
            .unwrap();
        assert_eq!(gyms.len(), 1);
        assert_eq!(gyms[0].id, "g1");
    }

    #[tokio::test]
    async fn test_unavailable_directory_fails() {
        let directory = InMemoryDirectory::builder().build();
        directory.set_unavailable(true);
        assert!(directory.gyms_by_location("tampa").await.is_err());
        assert!(!directory.health_check().await.unwrap());
    }

    #[tokio::test]
    async fn test_update_missing_gym_is_not_found() {
        let directory = InMemoryDirectory::builder().build();
        let err = directory
            .update_gym("missing", &GymPatch::default())
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::NotFound(_)));
    }
}
