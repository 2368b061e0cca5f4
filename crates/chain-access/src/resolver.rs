//! # Access resolution
//!
//! Decides whether a caller may act on an organization or restaurant, and
//! which [`OrgAction`]s the decision permits.
//!
//! Two independent grants exist and are combined with OR semantics:
//!
//! ```text
//! platform_admin flag  ──┐
//!                        ├──> ALLOW
//! org_owner / org_admin ─┘
//! ```
//!
//! Nothing is cached: a decision is a pure function of the identity passed
//! in, so it reflects the membership set of the current request only.

use chain_org::{OrganizationRole, Restaurant};
use serde::Serialize;
use uuid::Uuid;

use crate::actions::OrgAction;
use crate::identity::IdentityContext;

/// Why access was granted (or not).
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Grant {
    /// Caller carries the platform administrator flag
    PlatformAdmin,
    /// Caller is owner or admin of the target organization
    OrganizationManager,
    /// Caller is a direct member of the target restaurant
    RestaurantMember,
    /// No grant applies
    Denied,
}

/// Outcome of resolving a caller against a target.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct AccessDecision {
    /// Whether any access was granted
    pub allowed: bool,

    /// Caller's role in the target organization, if a member
    pub role: Option<OrganizationRole>,

    /// The grant that applied
    pub grant: Grant,
}

impl AccessDecision {
    fn new(grant: Grant, role: Option<OrganizationRole>) -> Self {
        Self {
            allowed: grant != Grant::Denied,
            role,
            grant,
        }
    }

    /// A denial carrying no role.
    pub fn deny() -> Self {
        Self::new(Grant::Denied, None)
    }

    /// Check whether this decision permits an action.
    ///
    /// # Example
    ///
    /// ```
    /// use chain_access::{resolve, IdentityContext, OrgAction};
    /// use chain_org::OrganizationRole;
    /// use uuid::Uuid;
    ///
    /// let org_id = Uuid::now_v7();
    /// let owner = IdentityContext::new(Uuid::now_v7()).with_org(org_id, OrganizationRole::Owner);
    /// let decision = resolve(&owner, org_id);
    ///
    /// assert!(decision.permits(OrgAction::CreateBranchRequest));
    /// assert!(!decision.permits(OrgAction::ResolveBranchRequest));
    /// ```
    pub fn permits(&self, action: OrgAction) -> bool {
        match self.grant {
            Grant::PlatformAdmin => true,
            Grant::OrganizationManager => action.is_manager_action(),
            Grant::RestaurantMember => action == OrgAction::ViewRestaurant,
            Grant::Denied => false,
        }
    }

    /// All actions this decision permits.
    pub fn permitted_actions(&self) -> Vec<OrgAction> {
        OrgAction::all()
            .into_iter()
            .filter(|a| self.permits(*a))
            .collect()
    }
}

/// Resolve a caller against an organization.
///
/// The caller's role is looked up by organization id. Access is granted when
/// the role is owner or admin, or when the caller is a platform admin;
/// staff and unknown roles are denied.
pub fn resolve(identity: &IdentityContext, org_id: Uuid) -> AccessDecision {
    let role = identity.org_role(org_id);
    let grant = if identity.platform_admin {
        Grant::PlatformAdmin
    } else if role.map(|r| r.can_manage()).unwrap_or(false) {
        Grant::OrganizationManager
    } else {
        Grant::Denied
    };
    AccessDecision::new(grant, role)
}

/// Resolve a caller against a restaurant via its owning organization.
///
/// Independent restaurants have no organization to resolve against; only
/// platform admins and direct members reach them. A direct membership only
/// ever yields [`Grant::RestaurantMember`], never organization rights.
pub fn resolve_for_restaurant(identity: &IdentityContext, restaurant: &Restaurant) -> AccessDecision {
    let decision = match restaurant.organization_id {
        Some(org_id) => resolve(identity, org_id),
        None if identity.platform_admin => AccessDecision::new(Grant::PlatformAdmin, None),
        None => AccessDecision::deny(),
    };

    if !decision.allowed && identity.is_restaurant_member(restaurant.id) {
        return AccessDecision::new(Grant::RestaurantMember, decision.role);
    }
    decision
}

/// Whether resolving this caller could ever succeed.
///
/// Callers with no memberships and no admin flag are denied up front, so
/// operations can skip store lookups for them.
pub fn may_hold_access(identity: &IdentityContext) -> bool {
    identity.platform_admin || identity.has_memberships()
}
