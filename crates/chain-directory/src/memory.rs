//! In-memory directory store
//!
//! Suitable for single-process deployments and testing. Records live in
//! `BTreeMap`s keyed by UUID v7 ids, so range scans give creation order for
//! free. Each write takes the state lock once, which makes the conditional
//! branch request transitions atomic.

use async_trait::async_trait;
use chain_org::{
    BranchRequest, Language, Organization, OrganizationMembership, Restaurant,
    RestaurantMembership, TransitionError, User,
};
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::store::{
    BranchRequestFilter, ConditionalUpdate, DirectoryStore, StoreError, StoreResult,
};

#[derive(Default)]
struct State {
    organizations: BTreeMap<Uuid, Organization>,
    restaurants: BTreeMap<Uuid, Restaurant>,
    users: HashMap<Uuid, User>,
    /// Keyed by (user, organization)
    memberships: HashMap<(Uuid, Uuid), OrganizationMembership>,
    restaurant_memberships: Vec<RestaurantMembership>,
    branch_requests: BTreeMap<Uuid, BranchRequest>,
}

/// Rows of `map` with `id < cursor`, newest first.
fn newest_first<'a, T>(
    map: &'a BTreeMap<Uuid, T>,
    cursor: Option<Uuid>,
) -> Box<dyn Iterator<Item = &'a T> + 'a> {
    match cursor {
        Some(cursor) => Box::new(map.range(..cursor).rev().map(|(_, v)| v)),
        None => Box::new(map.values().rev()),
    }
}

/// In-memory [`DirectoryStore`].
///
/// Clones share the same state.
#[derive(Clone)]
pub struct MemoryStore {
    state: Arc<RwLock<State>>,
    unavailable: Arc<AtomicBool>,
}

impl std::fmt::Debug for MemoryStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryStore")
            .field("unavailable", &self.unavailable.load(Ordering::Relaxed))
            .finish()
    }
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self {
            state: Arc::new(RwLock::new(State::default())),
            unavailable: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Simulate an outage: while set, every operation fails with
    /// [`StoreError::Unavailable`].
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::Relaxed);
    }

    fn ensure_available(&self) -> StoreResult<()> {
        if self.unavailable.load(Ordering::Relaxed) {
            return Err(StoreError::Unavailable("memory store is offline".to_string()));
        }
        Ok(())
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

fn ensure_organization(state: &State, organization_id: Uuid) -> StoreResult<()> {
    if state.organizations.contains_key(&organization_id) {
        Ok(())
    } else {
        Err(StoreError::InvariantViolation(format!(
            "organization {} does not exist",
            organization_id
        )))
    }
}

#[async_trait]
impl DirectoryStore for MemoryStore {
    async fn insert_organization(&self, organization: Organization) -> StoreResult<Organization> {
        self.ensure_available()?;
        organization
            .validate()
            .map_err(|e| StoreError::InvariantViolation(e.to_string()))?;
        let mut state = self.state.write().await;
        state
            .organizations
            .insert(organization.id, organization.clone());
        Ok(organization)
    }

    async fn get_organization(&self, id: Uuid) -> StoreResult<Option<Organization>> {
        self.ensure_available()?;
        let state = self.state.read().await;
        Ok(state.organizations.get(&id).cloned())
    }

    async fn organizations_by_ids(&self, ids: &[Uuid]) -> StoreResult<Vec<Organization>> {
        self.ensure_available()?;
        let state = self.state.read().await;
        Ok(ids
            .iter()
            .filter_map(|id| state.organizations.get(id).cloned())
            .collect())
    }

    async fn list_organizations(
        &self,
        ids: &[Uuid],
        cursor: Option<Uuid>,
        take: usize,
    ) -> StoreResult<Vec<Organization>> {
        self.ensure_available()?;
        let state = self.state.read().await;
        Ok(newest_first(&state.organizations, cursor)
            .filter(|org| ids.contains(&org.id))
            .take(take)
            .cloned()
            .collect())
    }

    async fn set_default_language(
        &self,
        id: Uuid,
        language: Language,
    ) -> StoreResult<Option<Organization>> {
        self.ensure_available()?;
        let mut state = self.state.write().await;
        Ok(state.organizations.get_mut(&id).map(|org| {
            org.set_default_language(language);
            org.clone()
        }))
    }

    async fn insert_restaurant(&self, restaurant: Restaurant) -> StoreResult<Restaurant> {
        self.ensure_available()?;
        let mut state = self.state.write().await;
        if let Some(org_id) = restaurant.organization_id {
            ensure_organization(&state, org_id)?;
        }
        state.restaurants.insert(restaurant.id, restaurant.clone());
        Ok(restaurant)
    }

    async fn get_restaurant(&self, id: Uuid) -> StoreResult<Option<Restaurant>> {
        self.ensure_available()?;
        let state = self.state.read().await;
        Ok(state.restaurants.get(&id).cloned())
    }

    async fn restaurants_by_ids(&self, ids: &[Uuid]) -> StoreResult<Vec<Restaurant>> {
        self.ensure_available()?;
        let state = self.state.read().await;
        Ok(ids
            .iter()
            .filter_map(|id| state.restaurants.get(id).cloned())
            .collect())
    }

    async fn list_restaurants(
        &self,
        organization_id: Uuid,
        cursor: Option<Uuid>,
        take: usize,
    ) -> StoreResult<Vec<Restaurant>> {
        self.ensure_available()?;
        let state = self.state.read().await;
        Ok(newest_first(&state.restaurants, cursor)
            .filter(|r| r.organization_id == Some(organization_id))
            .take(take)
            .cloned()
            .collect())
    }

    async fn restaurants_by_name(&self, organization_id: Uuid) -> StoreResult<Vec<Restaurant>> {
        self.ensure_available()?;
        let state = self.state.read().await;
        let mut restaurants: Vec<Restaurant> = state
            .restaurants
            .values()
            .filter(|r| r.organization_id == Some(organization_id))
            .cloned()
            .collect();
        restaurants.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
        Ok(restaurants)
    }

    async fn count_restaurants(&self, organization_ids: &[Uuid]) -> StoreResult<HashMap<Uuid, u64>> {
        self.ensure_available()?;
        let state = self.state.read().await;
        let mut counts = HashMap::new();
        for org_id in state.restaurants.values().filter_map(|r| r.organization_id) {
            if organization_ids.contains(&org_id) {
                *counts.entry(org_id).or_insert(0) += 1;
            }
        }
        Ok(counts)
    }

    async fn insert_user(&self, user: User) -> StoreResult<User> {
        self.ensure_available()?;
        let mut state = self.state.write().await;
        state.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn users_by_ids(&self, ids: &[Uuid]) -> StoreResult<Vec<User>> {
        self.ensure_available()?;
        let state = self.state.read().await;
        Ok(ids.iter().filter_map(|id| state.users.get(id).cloned()).collect())
    }

    async fn upsert_membership(
        &self,
        membership: OrganizationMembership,
    ) -> StoreResult<OrganizationMembership> {
        self.ensure_available()?;
        let mut state = self.state.write().await;
        ensure_organization(&state, membership.organization_id)?;
        state.memberships.insert(
            (membership.user_id, membership.organization_id),
            membership.clone(),
        );
        Ok(membership)
    }

    async fn insert_restaurant_membership(
        &self,
        membership: RestaurantMembership,
    ) -> StoreResult<RestaurantMembership> {
        self.ensure_available()?;
        let mut state = self.state.write().await;
        if !state.restaurants.contains_key(&membership.restaurant_id) {
            return Err(StoreError::InvariantViolation(format!(
                "restaurant {} does not exist",
                membership.restaurant_id
            )));
        }
        state.restaurant_memberships.push(membership.clone());
        Ok(membership)
    }

    async fn organization_members(
        &self,
        organization_id: Uuid,
    ) -> StoreResult<Vec<OrganizationMembership>> {
        self.ensure_available()?;
        let state = self.state.read().await;
        let mut members: Vec<OrganizationMembership> = state
            .memberships
            .values()
            .filter(|m| m.organization_id == organization_id)
            .cloned()
            .collect();
        members.sort_by(|a, b| a.joined_at.cmp(&b.joined_at).then(a.id.cmp(&b.id)));
        Ok(members)
    }

    async fn memberships_of_user(
        &self,
        user_id: Uuid,
    ) -> StoreResult<(Vec<OrganizationMembership>, Vec<RestaurantMembership>)> {
        self.ensure_available()?;
        let state = self.state.read().await;
        let orgs = state
            .memberships
            .values()
            .filter(|m| m.user_id == user_id)
            .cloned()
            .collect();
        let restaurants = state
            .restaurant_memberships
            .iter()
            .filter(|m| m.user_id == user_id)
            .cloned()
            .collect();
        Ok((orgs, restaurants))
    }

    async fn insert_branch_request(&self, request: BranchRequest) -> StoreResult<BranchRequest> {
        self.ensure_available()?;
        let mut state = self.state.write().await;
        ensure_organization(&state, request.organization_id)?;
        state.branch_requests.insert(request.id, request.clone());
        Ok(request)
    }

    async fn get_branch_request(&self, id: Uuid) -> StoreResult<Option<BranchRequest>> {
        self.ensure_available()?;
        let state = self.state.read().await;
        Ok(state.branch_requests.get(&id).cloned())
    }

    async fn list_branch_requests(
        &self,
        filter: &BranchRequestFilter,
        cursor: Option<Uuid>,
        take: usize,
    ) -> StoreResult<Vec<BranchRequest>> {
        self.ensure_available()?;
        let state = self.state.read().await;
        Ok(newest_first(&state.branch_requests, cursor)
            .filter(|r| filter.matches(r))
            .take(take)
            .cloned()
            .collect())
    }

    async fn approve_branch_request(
        &self,
        id: Uuid,
        resolved_by: Uuid,
        restaurant: Restaurant,
    ) -> StoreResult<ConditionalUpdate<(BranchRequest, Restaurant)>> {
        self.ensure_available()?;
        let mut state = self.state.write().await;

        let mut request = state
            .branch_requests
            .get(&id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound("branch request".to_string()))?;
        match request.approve(restaurant.id, resolved_by) {
            Ok(()) => {}
            Err(TransitionError::NotPending(status)) => return Ok(ConditionalUpdate::Stale(status)),
            Err(e) => return Err(StoreError::InvariantViolation(e.to_string())),
        }

        match restaurant.organization_id {
            Some(org_id) => ensure_organization(&state, org_id)?,
            None => {
                return Err(StoreError::InvariantViolation(
                    "approved branch must belong to an organization".to_string(),
                ))
            }
        }

        state.restaurants.insert(restaurant.id, restaurant.clone());
        state.branch_requests.insert(id, request.clone());
        Ok(ConditionalUpdate::Applied((request, restaurant)))
    }

    async fn reject_branch_request(
        &self,
        id: Uuid,
        resolved_by: Uuid,
        reason: &str,
    ) -> StoreResult<ConditionalUpdate<BranchRequest>> {
        self.ensure_available()?;
        let mut state = self.state.write().await;

        let mut request = state
            .branch_requests
            .get(&id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound("branch request".to_string()))?;
        match request.reject(resolved_by, reason) {
            Ok(()) => {}
            Err(TransitionError::NotPending(status)) => return Ok(ConditionalUpdate::Stale(status)),
            Err(e) => return Err(StoreError::InvariantViolation(e.to_string())),
        }

        state.branch_requests.insert(id, request.clone());
        Ok(ConditionalUpdate::Applied(request))
    }
}
