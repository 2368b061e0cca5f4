//! Branch request resolution losing to a concurrent writer.
//!
//! `InterleavingStore` wraps the in-memory store and resolves a request
//! right after the workflow has read it as pending, so the conditional write
//! that follows always finds it resolved.

use async_trait::async_trait;
use chain_access::IdentityContext;
use chain_directory::{
    BranchRequestFilter, ConditionalUpdate, DirectoryConfig, DirectoryStore, MemoryStore, OrgApi,
    Query, StoreResult,
};
use chain_org::{
    BranchRequest, BranchRequestStatus, Language, Organization, OrganizationMembership,
    OrganizationRole, Restaurant, RestaurantMembership, User,
};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use uuid::Uuid;

/// How the other writer resolves the request.
#[derive(Debug, Clone, Copy)]
enum Interloper {
    Approves,
    Rejects,
}

struct InterleavingStore {
    inner: MemoryStore,
    interloper: Interloper,
    armed: AtomicBool,
}

impl InterleavingStore {
    fn new(interloper: Interloper) -> Self {
        Self {
            inner: MemoryStore::new(),
            interloper,
            armed: AtomicBool::new(true),
        }
    }
}

#[async_trait]
impl DirectoryStore for InterleavingStore {
    async fn insert_organization(&self, organization: Organization) -> StoreResult<Organization> {
        self.inner.insert_organization(organization).await
    }

    async fn get_organization(&self, id: Uuid) -> StoreResult<Option<Organization>> {
        self.inner.get_organization(id).await
    }

    async fn organizations_by_ids(&self, ids: &[Uuid]) -> StoreResult<Vec<Organization>> {
        self.inner.organizations_by_ids(ids).await
    }

    async fn list_organizations(
        &self,
        ids: &[Uuid],
        cursor: Option<Uuid>,
        take: usize,
    ) -> StoreResult<Vec<Organization>> {
        self.inner.list_organizations(ids, cursor, take).await
    }

    async fn set_default_language(
        &self,
        id: Uuid,
        language: Language,
    ) -> StoreResult<Option<Organization>> {
        self.inner.set_default_language(id, language).await
    }

    async fn insert_restaurant(&self, restaurant: Restaurant) -> StoreResult<Restaurant> {
        self.inner.insert_restaurant(restaurant).await
    }

    async fn get_restaurant(&self, id: Uuid) -> StoreResult<Option<Restaurant>> {
        self.inner.get_restaurant(id).await
    }

    async fn restaurants_by_ids(&self, ids: &[Uuid]) -> StoreResult<Vec<Restaurant>> {
        self.inner.restaurants_by_ids(ids).await
    }

    async fn list_restaurants(
        &self,
        organization_id: Uuid,
        cursor: Option<Uuid>,
        take: usize,
    ) -> StoreResult<Vec<Restaurant>> {
        self.inner.list_restaurants(organization_id, cursor, take).await
    }

    async fn restaurants_by_name(&self, organization_id: Uuid) -> StoreResult<Vec<Restaurant>> {
        self.inner.restaurants_by_name(organization_id).await
    }

    async fn count_restaurants(&self, organization_ids: &[Uuid]) -> StoreResult<HashMap<Uuid, u64>> {
        self.inner.count_restaurants(organization_ids).await
    }

    async fn insert_user(&self, user: User) -> StoreResult<User> {
        self.inner.insert_user(user).await
    }

    async fn users_by_ids(&self, ids: &[Uuid]) -> StoreResult<Vec<User>> {
        self.inner.users_by_ids(ids).await
    }

    async fn upsert_membership(
        &self,
        membership: OrganizationMembership,
    ) -> StoreResult<OrganizationMembership> {
        self.inner.upsert_membership(membership).await
    }

    async fn insert_restaurant_membership(
        &self,
        membership: RestaurantMembership,
    ) -> StoreResult<RestaurantMembership> {
        self.inner.insert_restaurant_membership(membership).await
    }

    async fn organization_members(
        &self,
        organization_id: Uuid,
    ) -> StoreResult<Vec<OrganizationMembership>> {
        self.inner.organization_members(organization_id).await
    }

    async fn memberships_of_user(
        &self,
        user_id: Uuid,
    ) -> StoreResult<(Vec<OrganizationMembership>, Vec<RestaurantMembership>)> {
        self.inner.memberships_of_user(user_id).await
    }

    async fn insert_branch_request(&self, request: BranchRequest) -> StoreResult<BranchRequest> {
        self.inner.insert_branch_request(request).await
    }

    /// Returns the request as read, then resolves it once behind the caller's back.
    async fn get_branch_request(&self, id: Uuid) -> StoreResult<Option<BranchRequest>> {
        let read = self.inner.get_branch_request(id).await?;
        let pending = read
            .as_ref()
            .filter(|r| r.status == BranchRequestStatus::Pending);
        if let Some(request) = pending {
            if self.armed.swap(false, Ordering::SeqCst) {
                let other = Uuid::now_v7();
                match self.interloper {
                    Interloper::Approves => {
                        let restaurant = Restaurant::from_draft(
                            &request.payload,
                            request.organization_id,
                            Language::English,
                        );
                        self.inner.approve_branch_request(id, other, restaurant).await?;
                    }
                    Interloper::Rejects => {
                        self.inner.reject_branch_request(id, other, "duplicate").await?;
                    }
                }
            }
        }
        Ok(read)
    }

    async fn list_branch_requests(
        &self,
        filter: &BranchRequestFilter,
        cursor: Option<Uuid>,
        take: usize,
    ) -> StoreResult<Vec<BranchRequest>> {
        self.inner.list_branch_requests(filter, cursor, take).await
    }

    async fn approve_branch_request(
        &self,
        id: Uuid,
        resolved_by: Uuid,
        restaurant: Restaurant,
    ) -> StoreResult<ConditionalUpdate<(BranchRequest, Restaurant)>> {
        self.inner.approve_branch_request(id, resolved_by, restaurant).await
    }

    async fn reject_branch_request(
        &self,
        id: Uuid,
        resolved_by: Uuid,
        reason: &str,
    ) -> StoreResult<ConditionalUpdate<BranchRequest>> {
        self.inner.reject_branch_request(id, resolved_by, reason).await
    }
}

struct TestFixture {
    store: Arc<InterleavingStore>,
    api: OrgApi<InterleavingStore>,
    org: Organization,
    admin: IdentityContext,
    request_id: String,
}

impl TestFixture {
    async fn new(interloper: Interloper) -> Self {
        let store = Arc::new(InterleavingStore::new(interloper));
        let org = store
            .insert_organization(Organization::new("Harbor Group", "TR"))
            .await
            .unwrap();
        let owner = IdentityContext::new(Uuid::now_v7()).with_org(org.id, OrganizationRole::Owner);
        let admin = IdentityContext::new(Uuid::now_v7()).with_platform_admin(true);
        let api = OrgApi::new(store.clone(), DirectoryConfig::default()).unwrap();

        let created = api
            .route(
                "POST",
                "/org/branch-requests",
                Some(&owner),
                &Query::new(),
                &json!({ "organizationId": org.id, "name": "Shore Bistro", "region": "TR" }),
            )
            .await;
        assert_eq!(created.status, 201, "{}", created.body);
        let request_id = created.body["branchRequest"]["id"]
            .as_str()
            .unwrap()
            .to_string();

        Self {
            store,
            api,
            org,
            admin,
            request_id,
        }
    }

    async fn resolve(&self, action: &str, body: Value) -> (u16, Value) {
        let path = format!("/org/branch-requests/{}/{}", self.request_id, action);
        let response = self
            .api
            .route("POST", &path, Some(&self.admin), &Query::new(), &body)
            .await;
        (response.status, response.body)
    }

    async fn stored_status(&self) -> BranchRequestStatus {
        let id = Uuid::parse_str(&self.request_id).unwrap();
        self.store.inner.get_branch_request(id).await.unwrap().unwrap().status
    }

    async fn restaurant_count(&self) -> usize {
        self.store.restaurants_by_name(self.org.id).await.unwrap().len()
    }
}

#[tokio::test]
async fn test_approve_after_concurrent_approval_is_conflict() {
    let f = TestFixture::new(Interloper::Approves).await;

    let (status, body) = f.resolve("approve", Value::Null).await;

    assert_eq!(status, 409);
    assert_eq!(body["kind"], "CONFLICT");
    assert_eq!(f.stored_status().await, BranchRequestStatus::Approved);
    assert_eq!(f.restaurant_count().await, 1);
}

#[tokio::test]
async fn test_approve_after_concurrent_rejection_is_conflict() {
    let f = TestFixture::new(Interloper::Rejects).await;

    let (status, body) = f.resolve("approve", Value::Null).await;

    assert_eq!(status, 409);
    assert_eq!(body["kind"], "CONFLICT");
    assert_eq!(f.stored_status().await, BranchRequestStatus::Rejected);
    assert_eq!(f.restaurant_count().await, 0);
}

#[tokio::test]
async fn test_reject_after_concurrent_approval_is_conflict() {
    let f = TestFixture::new(Interloper::Approves).await;

    let (status, body) = f.resolve("reject", json!({ "reason": "Region not served" })).await;

    assert_eq!(status, 409);
    assert_eq!(body["kind"], "CONFLICT");
    assert_eq!(f.stored_status().await, BranchRequestStatus::Approved);
    assert_eq!(f.restaurant_count().await, 1);
}

#[tokio::test]
async fn test_resolved_request_reads_as_invalid_state_afterwards() {
    let f = TestFixture::new(Interloper::Rejects).await;

    let (first, _) = f.resolve("approve", Value::Null).await;
    let (second, body) = f.resolve("approve", Value::Null).await;

    assert_eq!(first, 409);
    assert_eq!(second, 409);
    assert_eq!(body["kind"], "INVALID_STATE");
}
