use chrono::Utc;
use validator::Validate;
use crate::core::authz::{authorize, Action, Principal, Resource};
use crate::core::finder::GymFinder;
use crate::error::FinderError;
use crate::models::{
    Feedback, Gym, GymPatch, Message, Review, ReviewStatus, Role, SubmitFeedbackRequest,
    SubmitReviewRequest, User, VerificationRequest,
};

/// Community contributions and directory management
///
/// Every operation is checked against the policy before it touches the
/// directory. Operations on a specific gym look the gym up first so the
/// policy can see its owner.
impl GymFinder {
    /// Principal for an authenticated user id; unknown users act as `user`
    pub async fn principal_for(&self, user_id: &str) -> Result<Principal, FinderError> {
        let role = self
            .directory
            .user_by_id(user_id)
            .await?
            .map(|user| user.role)
            .unwrap_or(Role::User);

        Ok(Principal::new(user_id, role))
    }

    async fn existing_gym(&self, gym_id: &str) -> Result<Gym, FinderError> {
        self.find_gym(gym_id)
            .await?
            .ok_or_else(|| FinderError::NotFound(format!("gym {}", gym_id)))
    }

    pub async fn submit_feedback(
        &self,
        principal: Option<&Principal>,
        request: SubmitFeedbackRequest,
    ) -> Result<Feedback, FinderError> {
        authorize(self.policy.as_ref(), principal, Action::SubmitFeedback, Resource::Any)?;
        request.validate()?;
        let user_id = principal.map(|p| p.user_id.clone()).unwrap_or_default();

        let gym = self.existing_gym(&request.gym_id).await?;

        let feedback = Feedback {
            id: uuid::Uuid::new_v4().to_string(),
            gym_id: gym.id,
            user_id,
            rating: request.rating,
            review: request.review,
            amenities_confirmed: request.amenities_confirmed,
            amenities_missing: request.amenities_missing,
            is_accurate: request.is_accurate.unwrap_or(true),
            inaccuracy_details: request.inaccuracy_details.filter(|d| !d.trim().is_empty()),
            created_at: Utc::now(),
        };

        self.directory.insert_feedback(&feedback).await?;
        tracing::info!("Recorded feedback {} for gym {}", feedback.id, feedback.gym_id);
        Ok(feedback)
    }

    /// New reviews wait for moderation
    pub async fn submit_review(
        &self,
        principal: Option<&Principal>,
        request: SubmitReviewRequest,
    ) -> Result<Review, FinderError> {
        authorize(self.policy.as_ref(), principal, Action::SubmitReview, Resource::Any)?;
        request.validate()?;
        let user_id = principal.map(|p| p.user_id.clone()).unwrap_or_default();

        let gym = self.existing_gym(&request.gym_id).await?;

        let review = Review {
            id: uuid::Uuid::new_v4().to_string(),
            gym_id: gym.id,
            user_id,
            rating: request.rating,
            content: request.content.trim().to_string(),
            status: ReviewStatus::Pending,
            created_at: Utc::now(),
        };

        self.directory.insert_review(&review).await?;
        tracing::info!("Queued review {} for gym {}", review.id, review.gym_id);
        Ok(review)
    }

    /// Message the gym's owner asking them to confirm the listing
    ///
    /// Unclaimed gyms have no owner to notify, so the message lands in the
    /// sender's own inbox.
    pub async fn send_verification(
        &self,
        principal: Option<&Principal>,
        gym_id: &str,
        request: VerificationRequest,
    ) -> Result<Message, FinderError> {
        authorize(self.policy.as_ref(), principal, Action::SendVerification, Resource::Any)?;
        request.validate()?;
        let sender_id = principal.map(|p| p.user_id.clone()).unwrap_or_default();

        let gym = self.existing_gym(gym_id).await?;
        let recipient_id = gym.owner_id.clone().unwrap_or_else(|| sender_id.clone());

        let message = Message {
            id: uuid::Uuid::new_v4().to_string(),
            sender_id,
            recipient_id,
            subject: format!("Gym Verification Request: {}", gym.name),
            content: format!(
                "Verification request sent to {}\n\n{}",
                request.recipient_email, request.message
            ),
            is_read: false,
            created_at: Utc::now(),
        };

        self.directory.insert_message(&message).await?;
        tracing::info!(
            "Sent verification request for gym {} to {}",
            gym.id,
            message.recipient_id
        );
        Ok(message)
    }

    pub async fn owned_gyms(&self, principal: Option<&Principal>) -> Result<Vec<Gym>, FinderError> {
        authorize(self.policy.as_ref(), principal, Action::ViewOwnedGyms, Resource::Any)?;
        let owner_id = principal.map(|p| p.user_id.as_str()).unwrap_or_default();
        Ok(self.directory.gyms_by_owner(owner_id).await?)
    }

    /// Apply a partial update; a status change also needs moderation rights
    ///
    /// Callers who may not edit any gym are refused before the lookup, so
    /// they cannot tell missing ids from existing ones.
    pub async fn update_gym(
        &self,
        principal: Option<&Principal>,
        gym_id: &str,
        patch: GymPatch,
    ) -> Result<Gym, FinderError> {
        authorize(self.policy.as_ref(), principal, Action::UpdateGym, Resource::Any)?;
        let gym = self.existing_gym(gym_id).await?;

        authorize(self.policy.as_ref(), principal, Action::UpdateGym, Resource::Gym(&gym))?;
        if patch.changes_status() {
            authorize(self.policy.as_ref(), principal, Action::ModerateGym, Resource::Gym(&gym))?;
        }

        patch.validate()?;
        if patch.is_empty() {
            return Err(FinderError::Validation("no fields to update".to_string()));
        }
        if let Some(coordinates) = patch.coordinates {
            if !coordinates.is_valid() {
                return Err(FinderError::Validation(format!(
                    "coordinates [{}, {}] are out of range",
                    coordinates.longitude, coordinates.latitude
                )));
            }
        }

        Ok(self.directory.update_gym(&gym.id, &patch).await?)
    }

    pub async fn all_users(&self, principal: Option<&Principal>) -> Result<Vec<User>, FinderError> {
        authorize(self.policy.as_ref(), principal, Action::ViewAllUsers, Resource::Any)?;
        Ok(self.directory.users().await?)
    }

    pub async fn update_user_role(
        &self,
        principal: Option<&Principal>,
        user_id: &str,
        role: Role,
    ) -> Result<User, FinderError> {
        authorize(self.policy.as_ref(), principal, Action::UpdateUserRole, Resource::User(user_id))?;
        Ok(self.directory.update_user_role(user_id, role).await?)
    }

    pub async fn moderate_review(
        &self,
        principal: Option<&Principal>,
        review_id: &str,
        status: ReviewStatus,
    ) -> Result<Review, FinderError> {
        authorize(self.policy.as_ref(), principal, Action::ModerateReview, Resource::Any)?;
        let review = self.directory.update_review_status(review_id, status).await?;
        tracing::info!("Review {} is now {}", review.id, review.status.as_str());
        Ok(review)
    }
}
