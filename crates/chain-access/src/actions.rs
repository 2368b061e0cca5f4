//! # Actions
//!
//! The organization-scoped operations an access decision can permit.

use serde::{Deserialize, Serialize};

/// Operations gated by the access resolver.
///
/// - **ViewOrganization**: Read organization detail, restaurants and members
/// - **UpdateOrganization**: Change organization settings (default language)
/// - **ListRestaurants**: Page through the organization's restaurants
/// - **ViewRestaurant**: Read a single restaurant
/// - **CreateBranchRequest**: Propose a new branch
/// - **ListBranchRequests**: Browse the organization's branch requests
/// - **ResolveBranchRequest**: Approve or reject a branch request
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum OrgAction {
    ViewOrganization,
    UpdateOrganization,
    ListRestaurants,
    ViewRestaurant,
    CreateBranchRequest,
    ListBranchRequests,
    /// Reserved for platform administrators.
    ResolveBranchRequest,
}

impl OrgAction {
    /// Get the string representation of the action.
    pub fn as_str(&self) -> &'static str {
        match self {
            OrgAction::ViewOrganization => "organization:read",
            OrgAction::UpdateOrganization => "organization:update",
            OrgAction::ListRestaurants => "restaurant:list",
            OrgAction::ViewRestaurant => "restaurant:read",
            OrgAction::CreateBranchRequest => "branch_request:create",
            OrgAction::ListBranchRequests => "branch_request:list",
            OrgAction::ResolveBranchRequest => "branch_request:resolve",
        }
    }

    /// Parse action from its string representation.
    ///
    /// # Example
    ///
    /// ```
    /// use chain_access::OrgAction;
    ///
    /// assert_eq!(OrgAction::parse("restaurant:list"), Some(OrgAction::ListRestaurants));
    /// assert_eq!(OrgAction::parse("restaurant:delete"), None);
    /// ```
    pub fn parse(s: &str) -> Option<Self> {
        Self::all().into_iter().find(|a| a.as_str() == s)
    }

    /// Get all actions.
    pub fn all() -> Vec<OrgAction> {
        vec![
            OrgAction::ViewOrganization,
            OrgAction::UpdateOrganization,
            OrgAction::ListRestaurants,
            OrgAction::ViewRestaurant,
            OrgAction::CreateBranchRequest,
            OrgAction::ListBranchRequests,
            OrgAction::ResolveBranchRequest,
        ]
    }

    /// Whether the action is available to organization owners and admins.
    pub fn is_manager_action(&self) -> bool {
        !matches!(self, OrgAction::ResolveBranchRequest)
    }
}

impl std::fmt::Display for OrgAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_string_round_trip() {
        for action in OrgAction::all() {
            assert_eq!(OrgAction::parse(action.as_str()), Some(action));
        }
    }

    #[test]
    fn test_only_resolution_is_reserved() {
        let reserved: Vec<_> = OrgAction::all()
            .into_iter()
            .filter(|a| !a.is_manager_action())
            .collect();
        assert_eq!(reserved, vec![OrgAction::ResolveBranchRequest]);
    }
}
