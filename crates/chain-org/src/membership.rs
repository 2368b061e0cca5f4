//! Membership domain models
//!
//! Memberships link users to organizations (with a role) or directly to a
//! single restaurant. A user may belong to any number of organizations.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::roles::OrganizationRole;

/// A platform user as seen by the organization core.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
}

impl User {
    /// Creates a new user with a fresh id.
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            id: Uuid::now_v7(),
            name: name.into(),
            email: email.into(),
        }
    }
}

/// Organization membership linking a user to an organization.
///
/// `role` is optional because legacy records may lack one; a missing role
/// grants nothing.
///
/// # Examples
///
/// ```
/// use chain_org::{OrganizationMembership, OrganizationRole};
/// use uuid::Uuid;
///
/// let membership =
///     OrganizationMembership::new(Uuid::now_v7(), Uuid::now_v7(), OrganizationRole::Admin);
/// assert!(membership.can_manage());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrganizationMembership {
    /// Unique membership ID
    pub id: Uuid,

    /// Organization ID
    pub organization_id: Uuid,

    /// User ID
    pub user_id: Uuid,

    /// Role within the organization
    #[serde(default)]
    pub role: Option<OrganizationRole>,

    /// When the user joined
    pub joined_at: DateTime<Utc>,
}

impl OrganizationMembership {
    /// Creates a new organization membership.
    pub fn new(organization_id: Uuid, user_id: Uuid, role: OrganizationRole) -> Self {
        Self {
            id: Uuid::now_v7(),
            organization_id,
            user_id,
            role: Some(role),
            joined_at: Utc::now(),
        }
    }

    /// Whether this membership carries management rights.
    pub fn can_manage(&self) -> bool {
        self.role.map(|r| r.can_manage()).unwrap_or(false)
    }
}

/// Direct membership of a user in a single restaurant.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RestaurantMembership {
    /// Unique membership ID
    pub id: Uuid,

    /// Restaurant ID
    pub restaurant_id: Uuid,

    /// User ID
    pub user_id: Uuid,

    /// When the user was added
    pub added_at: DateTime<Utc>,
}

impl RestaurantMembership {
    /// Creates a new restaurant membership.
    pub fn new(restaurant_id: Uuid, user_id: Uuid) -> Self {
        Self {
            id: Uuid::now_v7(),
            restaurant_id,
            user_id,
            added_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_organization_membership_creation() {
        let org_id = Uuid::now_v7();
        let user_id = Uuid::now_v7();
        let membership = OrganizationMembership::new(org_id, user_id, OrganizationRole::Owner);

        assert_eq!(membership.organization_id, org_id);
        assert_eq!(membership.user_id, user_id);
        assert!(membership.can_manage());
    }

    #[test]
    fn test_missing_or_unknown_role_cannot_manage() {
        let mut membership =
            OrganizationMembership::new(Uuid::now_v7(), Uuid::now_v7(), OrganizationRole::Staff);
        assert!(!membership.can_manage());

        membership.role = None;
        assert!(!membership.can_manage());

        membership.role = Some(OrganizationRole::Unknown);
        assert!(!membership.can_manage());
    }

    #[test]
    fn test_membership_without_role_deserializes() {
        let json = serde_json::json!({
            "id": Uuid::now_v7(),
            "organization_id": Uuid::now_v7(),
            "user_id": Uuid::now_v7(),
            "joined_at": Utc::now()
        });
        let membership: OrganizationMembership = serde_json::from_value(json).unwrap();
        assert!(membership.role.is_none());
    }
}
