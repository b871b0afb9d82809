use crate::error::FinderError;
use crate::models::{Gym, Role};

/// The signed-in caller
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    pub user_id: String,
    pub role: Role,
}

impl Principal {
    pub fn new(user_id: impl Into<String>, role: Role) -> Self {
        Self {
            user_id: user_id.into(),
            role,
        }
    }
}

/// Operations that require a signed-in caller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    SubmitFeedback,
    SubmitReview,
    SendVerification,
    ViewOwnedGyms,
    UpdateGym,
    ModerateGym,
    ViewAllUsers,
    UpdateUserRole,
    ModerateReview,
}

impl Action {
    fn requirement(&self) -> &'static str {
        match self {
            Action::SubmitFeedback => "logged in to submit feedback",
            Action::SubmitReview => "logged in to submit a review",
            Action::SendVerification => "logged in to send verification emails",
            Action::ViewOwnedGyms => "logged in as a gym owner to view owned gyms",
            Action::UpdateGym => "logged in as the gym's owner or an admin to update gyms",
            Action::ModerateGym => "logged in as an admin to change a gym's status",
            Action::ViewAllUsers => "logged in as an admin to view all users",
            Action::UpdateUserRole => "logged in as an admin to update user roles",
            Action::ModerateReview => "logged in as an admin to moderate reviews",
        }
    }
}

/// What the action is applied to
#[derive(Debug, Clone, Copy)]
pub enum Resource<'a> {
    Any,
    Gym(&'a Gym),
    User(&'a str),
}

/// Capability check over role, action and resource
pub trait Policy: Send + Sync {
    fn permits(&self, principal: &Principal, action: Action, resource: &Resource<'_>) -> bool;
}

/// Role rules of the directory
///
/// Any signed-in user may contribute feedback, reviews and verification
/// requests. Owners edit only their own gyms. Admins may do everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct RolePolicy;

impl Policy for RolePolicy {
    fn permits(&self, principal: &Principal, action: Action, resource: &Resource<'_>) -> bool {
        if principal.role == Role::Admin {
            return true;
        }

        match action {
            Action::SubmitFeedback | Action::SubmitReview | Action::SendVerification => true,
            Action::ViewOwnedGyms => principal.role == Role::GymOwner,
            // `Any` asks whether the caller may edit gyms at all
            Action::UpdateGym => match resource {
                Resource::Gym(gym) => {
                    principal.role == Role::GymOwner && gym.is_owned_by(&principal.user_id)
                }
                Resource::Any => principal.role == Role::GymOwner,
                Resource::User(_) => false,
            },
            Action::ModerateGym
            | Action::ViewAllUsers
            | Action::UpdateUserRole
            | Action::ModerateReview => false,
        }
    }
}

/// Evaluate the policy once at the boundary
pub fn authorize(
    policy: &dyn Policy,
    principal: Option<&Principal>,
    action: Action,
    resource: Resource<'_>,
) -> Result<(), FinderError> {
    let allowed = principal.is_some_and(|p| policy.permits(p, action, &resource));
    if allowed {
        return Ok(());
    }

    tracing::info!(
        "Denied {:?} for {}",
        action,
        principal
            .map(|p| format!("{} ({})", p.user_id, p.role))
            .unwrap_or_else(|| "anonymous caller".to_string())
    );

    Err(FinderError::Unauthorized(format!(
        "You must be {}",
        action.requirement()
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Coordinates, GymStatus};

    fn owned_gym(owner: Option<&str>) -> Gym {
        Gym {
            id: "g1".to_string(),
            name: "Iron Temple".to_string(),
            location: "Tampa, FL".to_string(),
            description: String::new(),
            coordinates: Coordinates::new(-82.45, 27.95),
            rating: 4.0,
            review_count: 1,
            price_range: None,
            hours: String::new(),
            images: vec![],
            status: GymStatus::Verified,
            owner_id: owner.map(str::to_string),
            place_id: None,
            is_featured: false,
            distance: None,
            created_at: None,
            updated_at: None,
        }
    }

    #[test]
    fn test_anonymous_is_unauthorized() {
        let err = authorize(&RolePolicy, None, Action::SubmitReview, Resource::Any).unwrap_err();
        assert!(matches!(err, FinderError::Unauthorized(_)));
        assert_eq!(err.to_string(), "You must be logged in to submit a review");
    }

    #[test]
    fn test_owner_updates_only_own_gym() {
        let owner = Principal::new("owner-1", Role::GymOwner);
        let mine = owned_gym(Some("owner-1"));
        let theirs = owned_gym(Some("owner-2"));

        assert!(authorize(&RolePolicy, Some(&owner), Action::UpdateGym, Resource::Gym(&mine)).is_ok());
        assert!(authorize(&RolePolicy, Some(&owner), Action::UpdateGym, Resource::Gym(&theirs)).is_err());
        assert!(authorize(&RolePolicy, Some(&owner), Action::ModerateGym, Resource::Gym(&mine)).is_err());
    }

    #[test]
    fn test_admin_can_do_everything() {
        let admin = Principal::new("admin-1", Role::Admin);
        let gym = owned_gym(None);

        assert!(authorize(&RolePolicy, Some(&admin), Action::UpdateGym, Resource::Gym(&gym)).is_ok());
        assert!(authorize(&RolePolicy, Some(&admin), Action::ViewAllUsers, Resource::Any).is_ok());
        assert!(authorize(&RolePolicy, Some(&admin), Action::UpdateUserRole, Resource::User("u1")).is_ok());
    }

    #[test]
    fn test_regular_user_gates() {
        let user = Principal::new("user-1", Role::User);

        assert!(authorize(&RolePolicy, Some(&user), Action::SubmitFeedback, Resource::Any).is_ok());
        assert!(authorize(&RolePolicy, Some(&user), Action::ViewOwnedGyms, Resource::Any).is_err());
        assert!(authorize(&RolePolicy, Some(&user), Action::ViewAllUsers, Resource::Any).is_err());
        assert!(authorize(&RolePolicy, Some(&user), Action::UpdateGym, Resource::Any).is_err());
    }

    #[test]
    fn test_only_owners_and_admins_may_edit_gyms() {
        let owner = Principal::new("owner-1", Role::GymOwner);
        let admin = Principal::new("admin-1", Role::Admin);

        assert!(authorize(&RolePolicy, None, Action::UpdateGym, Resource::Any).is_err());
        assert!(authorize(&RolePolicy, Some(&owner), Action::UpdateGym, Resource::Any).is_ok());
        assert!(authorize(&RolePolicy, Some(&admin), Action::UpdateGym, Resource::Any).is_ok());
    }
}
