//! Organization roles
//!
//! This module defines the closed set of roles a user can hold inside an
//! organization. Roles are flat: there is no inheritance between them, and
//! platform administration is a caller-level flag rather than a role.

use serde::{Deserialize, Serialize};

/// User role within an organization.
///
/// # Permission Model
///
/// - **Owner**: Full management of the organization and its restaurants
/// - **Admin**: Same management rights as the owner
/// - **Staff**: Display-only membership, no management rights
/// - **Unknown**: Any role value this build does not recognise
///
/// Unknown role values deserialize into [`OrganizationRole::Unknown`] so that a
/// stale or mistyped membership record can never be mistaken for an elevated one.
///
/// # Examples
///
/// ```
/// use chain_org::OrganizationRole;
///
/// assert!(OrganizationRole::Owner.can_manage());
/// assert!(OrganizationRole::Admin.can_manage());
/// assert!(!OrganizationRole::Staff.can_manage());
/// assert!(!OrganizationRole::Unknown.can_manage());
/// ```
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum OrganizationRole {
    /// Organization owner
    #[serde(rename = "org_owner")]
    Owner,

    /// Organization administrator
    #[serde(rename = "org_admin")]
    Admin,

    /// Organization staff (read-only)
    #[serde(rename = "org_staff")]
    Staff,

    /// Unrecognised role value
    #[serde(other)]
    Unknown,
}

impl OrganizationRole {
    /// Check if this role carries management rights over the organization.
    ///
    /// # Returns
    ///
    /// `true` only for Owner and Admin
    pub fn can_manage(&self) -> bool {
        matches!(self, Self::Owner | Self::Admin)
    }

    /// Parse role from its wire representation.
    ///
    /// Parsing is exact: `"org_owner"`, `"org_admin"` and `"org_staff"` are the
    /// only accepted values. Anything else maps to `Unknown`.
    ///
    /// # Examples
    ///
    /// ```
    /// use chain_org::OrganizationRole;
    ///
    /// assert_eq!(OrganizationRole::parse("org_admin"), OrganizationRole::Admin);
    /// assert_eq!(OrganizationRole::parse("superuser"), OrganizationRole::Unknown);
    /// ```
    pub fn parse(s: &str) -> Self {
        match s {
            "org_owner" => Self::Owner,
            "org_admin" => Self::Admin,
            "org_staff" => Self::Staff,
            _ => Self::Unknown,
        }
    }

    /// Get string representation of the role.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Owner => "org_owner",
            Self::Admin => "org_admin",
            Self::Staff => "org_staff",
            Self::Unknown => "unknown",
        }
    }

    /// Role shown to other members in listings.
    ///
    /// Unknown or missing roles are displayed as staff. This is a presentation
    /// default only and must never feed an access decision.
    pub fn for_display(role: Option<Self>) -> Self {
        match role {
            Some(Self::Owner) => Self::Owner,
            Some(Self::Admin) => Self::Admin,
            _ => Self::Staff,
        }
    }
}
