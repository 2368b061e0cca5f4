//! Persistent store abstraction
//!
//! The directory and workflow only need the access patterns below. Every
//! listing method returns rows ordered by id descending, restricted to
//! `id < cursor` when a cursor is given, and at most `take` rows, which is
//! the contract [`crate::pagination::paginate`] relies on.

use async_trait::async_trait;
use chain_org::{
    BranchRequest, BranchRequestStatus, Language, Organization, OrganizationMembership,
    Restaurant, RestaurantMembership, User,
};
use std::collections::HashMap;
use thiserror::Error;
use uuid::Uuid;

/// Store error types.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The backing store could not be reached
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// A record addressed by a write does not exist
    #[error("{0} not found")]
    NotFound(String),

    /// A write would break a record invariant
    #[error("invariant violated: {0}")]
    InvariantViolation(String),
}

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Outcome of a write guarded by an expected current state.
#[derive(Debug, Clone, PartialEq)]
pub enum ConditionalUpdate<T> {
    /// The guard held and the write was applied
    Applied(T),
    /// The record was no longer in the expected state; nothing was written
    Stale(BranchRequestStatus),
}

/// Filter for branch request listings.
#[derive(Debug, Clone, Default)]
pub struct BranchRequestFilter {
    /// Only requests of these organizations
    pub organization_ids: Vec<Uuid>,
    /// Only requests in this state
    pub status: Option<BranchRequestStatus>,
}

impl BranchRequestFilter {
    /// Check whether a request passes the filter.
    pub fn matches(&self, request: &BranchRequest) -> bool {
        self.organization_ids.contains(&request.organization_id)
            && self.status.map(|s| s == request.status).unwrap_or(true)
    }
}

/// Storage operations used by the organization directory and the branch
/// request workflow.
#[async_trait]
pub trait DirectoryStore: Send + Sync {
    // ----- organizations -----

    /// Insert a new organization.
    async fn insert_organization(&self, organization: Organization) -> StoreResult<Organization>;

    /// Get an organization by id.
    async fn get_organization(&self, id: Uuid) -> StoreResult<Option<Organization>>;

    /// Get the organizations among `ids` that exist.
    async fn organizations_by_ids(&self, ids: &[Uuid]) -> StoreResult<Vec<Organization>>;

    /// Page through the organizations among `ids`.
    async fn list_organizations(
        &self,
        ids: &[Uuid],
        cursor: Option<Uuid>,
        take: usize,
    ) -> StoreResult<Vec<Organization>>;

    /// Set the default language and return the updated record in one step.
    ///
    /// Returns `None` when the organization does not exist.
    async fn set_default_language(
        &self,
        id: Uuid,
        language: Language,
    ) -> StoreResult<Option<Organization>>;

    // ----- restaurants -----

    /// Insert a restaurant. Its organization, when set, must exist.
    async fn insert_restaurant(&self, restaurant: Restaurant) -> StoreResult<Restaurant>;

    /// Get a restaurant by id.
    async fn get_restaurant(&self, id: Uuid) -> StoreResult<Option<Restaurant>>;

    /// Get the restaurants among `ids` that exist.
    async fn restaurants_by_ids(&self, ids: &[Uuid]) -> StoreResult<Vec<Restaurant>>;

    /// Page through an organization's restaurants.
    async fn list_restaurants(
        &self,
        organization_id: Uuid,
        cursor: Option<Uuid>,
        take: usize,
    ) -> StoreResult<Vec<Restaurant>>;

    /// All restaurants of an organization, ordered by name.
    async fn restaurants_by_name(&self, organization_id: Uuid) -> StoreResult<Vec<Restaurant>>;

    /// Restaurant counts grouped by organization, in one aggregation.
    ///
    /// Organizations without restaurants are absent from the map.
    async fn count_restaurants(&self, organization_ids: &[Uuid]) -> StoreResult<HashMap<Uuid, u64>>;

    // ----- users and memberships -----

    /// Insert a user.
    async fn insert_user(&self, user: User) -> StoreResult<User>;

    /// Get the users among `ids` that exist.
    async fn users_by_ids(&self, ids: &[Uuid]) -> StoreResult<Vec<User>>;

    /// Insert or replace the membership of a user in an organization.
    ///
    /// At most one membership exists per (user, organization).
    async fn upsert_membership(
        &self,
        membership: OrganizationMembership,
    ) -> StoreResult<OrganizationMembership>;

    /// Insert a direct restaurant membership.
    async fn insert_restaurant_membership(
        &self,
        membership: RestaurantMembership,
    ) -> StoreResult<RestaurantMembership>;

    /// All memberships referencing an organization, oldest first.
    async fn organization_members(
        &self,
        organization_id: Uuid,
    ) -> StoreResult<Vec<OrganizationMembership>>;

    /// All memberships held by a user.
    async fn memberships_of_user(
        &self,
        user_id: Uuid,
    ) -> StoreResult<(Vec<OrganizationMembership>, Vec<RestaurantMembership>)>;

    // ----- branch requests -----

    /// Insert a new branch request.
    async fn insert_branch_request(&self, request: BranchRequest) -> StoreResult<BranchRequest>;

    /// Get a branch request by id.
    async fn get_branch_request(&self, id: Uuid) -> StoreResult<Option<BranchRequest>>;

    /// Page through branch requests passing `filter`.
    async fn list_branch_requests(
        &self,
        filter: &BranchRequestFilter,
        cursor: Option<Uuid>,
        take: usize,
    ) -> StoreResult<Vec<BranchRequest>>;

    /// Approve a request if and only if it is still pending.
    ///
    /// Inserting `restaurant` and transitioning the request happen as one
    /// write; when the guard fails neither is applied.
    async fn approve_branch_request(
        &self,
        id: Uuid,
        resolved_by: Uuid,
        restaurant: Restaurant,
    ) -> StoreResult<ConditionalUpdate<(BranchRequest, Restaurant)>>;

    /// Reject a request if and only if it is still pending.
    async fn reject_branch_request(
        &self,
        id: Uuid,
        resolved_by: Uuid,
        reason: &str,
    ) -> StoreResult<ConditionalUpdate<BranchRequest>>;
}
