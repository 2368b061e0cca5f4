//! # Chain Directory
//!
//! Organization directory and branch request workflow for restaurant chains.
//!
//! ## Overview
//!
//! The chain-directory crate handles:
//! - **Organization directory**: Accessible organizations, detail, language
//!   settings and restaurant listings
//! - **Branch requests**: Proposal, listing and administrative resolution of
//!   new restaurant branches
//! - **Pagination**: Stateless newest-first cursor paging for every listing
//! - **Store**: The access patterns the above need, with an in-memory backend
//! - **API**: A `/org/...` facade producing JSON envelopes and error bodies
//!
//! ## Architecture
//!
//! ```text
//! request + IdentityContext
//!        │
//!        ▼
//!     OrgApi ──> OrganizationDirectory ──┐
//!        │                               ├──> DirectoryStore
//!        └────> BranchRequestWorkflow ───┘
//!                    (both gated by chain_access::resolve)
//! ```
//!
//! ## Usage
//!
//! ```rust
//! use chain_access::IdentityContext;
//! use chain_directory::{DirectoryConfig, DirectoryStore, MemoryStore, OrgApi, Query};
//! use chain_org::{Organization, OrganizationRole};
//! use serde_json::json;
//! use std::sync::Arc;
//! use uuid::Uuid;
//!
//! # tokio_test_runtime(async {
//! let store = Arc::new(MemoryStore::new());
//! let org = store.insert_organization(Organization::new("Harbor Group", "TR")).await.unwrap();
//! let api = OrgApi::new(store, DirectoryConfig::default()).unwrap();
//!
//! let owner = IdentityContext::new(Uuid::now_v7()).with_org(org.id, OrganizationRole::Owner);
//! let response = api
//!     .create_branch_request(
//!         Some(&owner),
//!         &json!({ "organizationId": org.id, "name": "Shore Bistro", "region": "TR" }),
//!     )
//!     .await;
//!
//! assert_eq!(response.status, 201);
//! assert_eq!(response.body["branchRequest"]["status"], "pending");
//! # });
//! # fn tokio_test_runtime<F: std::future::Future>(f: F) -> F::Output {
//! #     tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(f)
//! # }
//! ```

pub mod api;
pub mod branch_requests;
pub mod config;
pub mod dto;
pub mod error;
pub mod memory;
pub mod organizations;
pub mod pagination;
pub mod store;

// Re-export main types for convenience
pub use api::{ApiResponse, OrgApi, Query};
pub use branch_requests::{BranchRequestQuery, BranchRequestWorkflow};
pub use config::{ConfigError, DirectoryConfig};
pub use dto::{
    BranchRequestDto, MemberDto, OrganizationDetailDto, OrganizationDto, OrganizationRef,
    OrganizationSummaryDto, RestaurantDto, RestaurantRef,
};
pub use error::{DirectoryError, DirectoryResult, ErrorBody};
pub use memory::MemoryStore;
pub use organizations::{load_identity, OrganizationDirectory};
pub use pagination::{paginate, CursorKey, Page, PageLimits, PageRequest};
pub use store::{BranchRequestFilter, ConditionalUpdate, DirectoryStore, StoreError, StoreResult};
