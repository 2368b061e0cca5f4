//! # Chain Organization Model
//!
//! This crate provides the domain records for delegated management of
//! restaurant chains.
//!
//! ## Overview
//!
//! The chain-org crate handles:
//! - **Organizations**: Restaurant chains, the tenants of the platform
//! - **Restaurants**: Branches of an organization, or independent venues
//! - **Memberships**: User-organization (with role) and user-restaurant links
//! - **Roles**: The closed set of organization roles
//! - **Branch requests**: Proposals for new restaurants and their lifecycle
//! - **Languages**: The supported language set
//!
//! ## Architecture
//!
//! ```text
//! User
//!   ├─ OrganizationMembership ─→ Organization
//!   │                               ├─ Restaurant (organization_id)
//!   │                               └─ BranchRequest ─(approved)─→ Restaurant
//!   └─ RestaurantMembership ───→ Restaurant
//! ```
//!
//! ## Usage
//!
//! ```rust
//! use chain_org::{
//!     BranchDraft, BranchDraftInput, BranchRequest, BusinessType, Organization,
//!     OrganizationMembership, OrganizationRole, User,
//! };
//!
//! let org = Organization::new("Harbor Group", "TR");
//! let owner = User::new("Ayla", "ayla@example.com");
//! let membership = OrganizationMembership::new(org.id, owner.id, OrganizationRole::Owner);
//!
//! let draft = BranchDraft::from_input(
//!     BranchDraftInput {
//!         name: Some("Shore Bistro".into()),
//!         region: Some("TR".into()),
//!         ..Default::default()
//!     },
//!     BusinessType::Restaurant,
//! )
//! .unwrap();
//! let request = BranchRequest::new(org.id, owner.id, draft);
//! assert!(!request.status.is_terminal());
//! ```

pub mod branch_request;
pub mod error;
pub mod language;
pub mod membership;
pub mod organization;
pub mod restaurant;
pub mod roles;

// Re-export main types for convenience
pub use branch_request::{
    BranchDraft, BranchDraftInput, BranchRequest, BranchRequestStatus, BusinessType, PriceRange,
    TransitionError, DRAFT_SCHEMA_VERSION,
};
pub use error::ValidationError;
pub use language::Language;
pub use membership::{OrganizationMembership, RestaurantMembership, User};
pub use organization::Organization;
pub use restaurant::Restaurant;
pub use roles::OrganizationRole;
