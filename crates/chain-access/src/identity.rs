//! Caller identity context
//!
//! The identity context is produced by the authentication layer and handed
//! to every operation. It carries the caller's organization roles indexed by
//! organization id, their direct restaurant memberships, and the platform
//! administrator flag. This crate only reads it.

use chain_org::{OrganizationMembership, OrganizationRole, RestaurantMembership};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use uuid::Uuid;

/// Resolved membership set of an authenticated caller.
///
/// # Example
///
/// ```
/// use chain_access::IdentityContext;
/// use chain_org::OrganizationRole;
/// use uuid::Uuid;
///
/// let org_id = Uuid::now_v7();
/// let identity = IdentityContext::new(Uuid::now_v7()).with_org(org_id, OrganizationRole::Owner);
///
/// assert_eq!(identity.org_role(org_id), Some(OrganizationRole::Owner));
/// assert_eq!(identity.managed_organizations(), vec![org_id]);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdentityContext {
    /// Authenticated user
    pub user_id: Uuid,

    /// Caller-level administration flag, independent of memberships
    #[serde(default)]
    pub platform_admin: bool,

    /// Organization roles, keyed by organization id
    #[serde(default)]
    pub orgs: HashMap<Uuid, OrganizationRole>,

    /// Restaurants the caller is a direct member of
    #[serde(default)]
    pub restaurants: HashSet<Uuid>,
}

impl IdentityContext {
    /// Create an identity with no memberships.
    pub fn new(user_id: Uuid) -> Self {
        Self {
            user_id,
            platform_admin: false,
            orgs: HashMap::new(),
            restaurants: HashSet::new(),
        }
    }

    /// Build the identity from stored membership records of `user_id`.
    ///
    /// Records belonging to other users are ignored. A membership without a
    /// role is indexed as [`OrganizationRole::Unknown`].
    pub fn from_memberships(
        user_id: Uuid,
        org_memberships: &[OrganizationMembership],
        restaurant_memberships: &[RestaurantMembership],
    ) -> Self {
        let orgs = org_memberships
            .iter()
            .filter(|m| m.user_id == user_id)
            .map(|m| (m.organization_id, m.role.unwrap_or(OrganizationRole::Unknown)))
            .collect();
        let restaurants = restaurant_memberships
            .iter()
            .filter(|m| m.user_id == user_id)
            .map(|m| m.restaurant_id)
            .collect();

        Self {
            user_id,
            platform_admin: false,
            orgs,
            restaurants,
        }
    }

    /// Add an organization role.
    pub fn with_org(mut self, org_id: Uuid, role: OrganizationRole) -> Self {
        self.orgs.insert(org_id, role);
        self
    }

    /// Add a direct restaurant membership.
    pub fn with_restaurant(mut self, restaurant_id: Uuid) -> Self {
        self.restaurants.insert(restaurant_id);
        self
    }

    /// Set the platform administrator flag.
    pub fn with_platform_admin(mut self, platform_admin: bool) -> Self {
        self.platform_admin = platform_admin;
        self
    }

    /// Get the caller's role in an organization.
    pub fn org_role(&self, org_id: Uuid) -> Option<OrganizationRole> {
        self.orgs.get(&org_id).copied()
    }

    /// Whether the caller is a direct member of a restaurant.
    pub fn is_restaurant_member(&self, restaurant_id: Uuid) -> bool {
        self.restaurants.contains(&restaurant_id)
    }

    /// Whether the caller holds any membership at all.
    pub fn has_memberships(&self) -> bool {
        !self.orgs.is_empty() || !self.restaurants.is_empty()
    }

    /// Organizations where the caller is owner or admin, in ascending id order.
    pub fn managed_organizations(&self) -> Vec<Uuid> {
        let mut ids: Vec<Uuid> = self
            .orgs
            .iter()
            .filter(|(_, role)| role.can_manage())
            .map(|(id, _)| *id)
            .collect();
        ids.sort();
        ids
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_memberships_indexes_by_organization() {
        let user_id = Uuid::now_v7();
        let other_user = Uuid::now_v7();
        let org_a = Uuid::now_v7();
        let org_b = Uuid::now_v7();
        let restaurant = Uuid::now_v7();

        let mut roleless = OrganizationMembership::new(org_b, user_id, OrganizationRole::Admin);
        roleless.role = None;
        let memberships = vec![
            OrganizationMembership::new(org_a, user_id, OrganizationRole::Owner),
            roleless,
            OrganizationMembership::new(org_a, other_user, OrganizationRole::Staff),
        ];
        let restaurants = vec![RestaurantMembership::new(restaurant, user_id)];

        let identity = IdentityContext::from_memberships(user_id, &memberships, &restaurants);

        assert_eq!(identity.org_role(org_a), Some(OrganizationRole::Owner));
        assert_eq!(identity.org_role(org_b), Some(OrganizationRole::Unknown));
        assert!(identity.is_restaurant_member(restaurant));
        assert_eq!(identity.managed_organizations(), vec![org_a]);
        assert!(!identity.platform_admin);
    }

    #[test]
    fn test_managed_organizations_excludes_staff() {
        let org_a = Uuid::now_v7();
        let org_b = Uuid::now_v7();
        let org_c = Uuid::now_v7();
        let identity = IdentityContext::new(Uuid::now_v7())
            .with_org(org_c, OrganizationRole::Admin)
            .with_org(org_b, OrganizationRole::Staff)
            .with_org(org_a, OrganizationRole::Owner);

        assert_eq!(identity.managed_organizations(), vec![org_a, org_c]);
    }

    #[test]
    fn test_has_memberships() {
        let identity = IdentityContext::new(Uuid::now_v7());
        assert!(!identity.has_memberships());
        assert!(identity.with_restaurant(Uuid::now_v7()).has_memberships());
    }

    #[test]
    fn test_identity_deserializes_with_unknown_role() {
        let org_id = Uuid::now_v7();
        let json = serde_json::json!({
            "user_id": Uuid::now_v7(),
            "orgs": { org_id.to_string(): "org_superuser" }
        });
        let identity: IdentityContext = serde_json::from_value(json).unwrap();

        assert_eq!(identity.org_role(org_id), Some(OrganizationRole::Unknown));
        assert!(identity.managed_organizations().is_empty());
        assert!(!identity.platform_admin);
    }
}
