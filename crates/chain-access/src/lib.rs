//! # Chain Access
//!
//! This crate decides what an authenticated caller may do inside a
//! restaurant chain.
//!
//! ## Overview
//!
//! The chain-access crate handles:
//! - **Identity context**: The caller's resolved membership set, supplied by
//!   the authentication layer
//! - **Resolution**: ALLOW/DENY for an organization or restaurant target
//! - **Actions**: The operations a decision permits
//!
//! ## Usage
//!
//! ```rust
//! use chain_access::{resolve, IdentityContext, OrgAction};
//! use chain_org::OrganizationRole;
//! use uuid::Uuid;
//!
//! let org_a = Uuid::now_v7();
//! let org_b = Uuid::now_v7();
//! let identity = IdentityContext::new(Uuid::now_v7())
//!     .with_org(org_a, OrganizationRole::Owner)
//!     .with_org(org_b, OrganizationRole::Staff);
//!
//! assert!(resolve(&identity, org_a).permits(OrgAction::ListRestaurants));
//! assert!(!resolve(&identity, org_b).allowed);
//! ```
//!
//! ## Rules
//!
//! - Only `org_owner` and `org_admin` grant organization access
//! - The platform-admin flag grants access regardless of membership
//! - Unknown roles grant nothing
//! - Decisions are never cached across requests

pub mod actions;
pub mod identity;
pub mod resolver;

// Re-export main types for convenience
pub use actions::OrgAction;
pub use identity::IdentityContext;
pub use resolver::{may_hold_access, resolve, resolve_for_restaurant, AccessDecision, Grant};
