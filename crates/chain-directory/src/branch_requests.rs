//! Branch request workflow
//!
//! Organization managers propose new restaurants; platform administrators
//! approve or reject them.
//!
//! ```text
//!            approve
//! pending ───────────> approved
//!    │
//!    └───────────────> rejected
//!            reject
//! ```
//!
//! Both resolved states are terminal. Resolution goes through the store's
//! conditional transition, which only writes while the request is still
//! pending, so concurrent approve/reject calls resolve a request at most once.

use chain_access::{may_hold_access, IdentityContext, OrgAction};
use chain_org::{
    BranchDraft, BranchDraftInput, BranchRequest, BranchRequestStatus, Organization, Restaurant,
    TransitionError,
};
use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use crate::config::DirectoryConfig;
use crate::dto::BranchRequestDto;
use crate::error::{DirectoryError, DirectoryResult};
use crate::organizations::{authorize_organization, ensure_permitted};
use crate::pagination::{paginate, Page, PageRequest};
use crate::store::{BranchRequestFilter, ConditionalUpdate, DirectoryStore};

/// Filters for "list my branch requests".
#[derive(Debug, Clone, Copy, Default)]
pub struct BranchRequestQuery {
    pub status: Option<BranchRequestStatus>,
    /// Must be one of the caller's managed organizations
    pub organization_id: Option<Uuid>,
}

/// Branch request lifecycle operations.
pub struct BranchRequestWorkflow<S: DirectoryStore + ?Sized> {
    store: Arc<S>,
    config: DirectoryConfig,
}

impl<S: DirectoryStore + ?Sized> BranchRequestWorkflow<S> {
    /// Create a workflow over `store`.
    pub fn new(store: Arc<S>, config: DirectoryConfig) -> Self {
        Self { store, config }
    }

    /// Submit a new pending request for `organization_id`.
    ///
    /// Duplicate submissions create duplicate requests.
    #[instrument(skip(self, identity, draft, notes), fields(user_id = %identity.user_id))]
    pub async fn create(
        &self,
        identity: &IdentityContext,
        organization_id: Uuid,
        draft: BranchDraftInput,
        notes: Option<String>,
    ) -> DirectoryResult<BranchRequestDto> {
        let (organization, _) = authorize_organization(
            self.store.as_ref(),
            identity,
            organization_id,
            OrgAction::CreateBranchRequest,
        )
        .await?;

        let draft = BranchDraft::from_input(draft, self.config.default_business_type)?;
        let request = BranchRequest::new(organization_id, identity.user_id, draft).with_notes(notes);
        let request = self.store.insert_branch_request(request).await?;

        info!(
            request_id = %request.id,
            org_id = %organization_id,
            "Branch request submitted"
        );
        Ok(BranchRequestDto::new(&request, Some(&organization), None))
    }

    /// Requests of the caller's managed organizations, newest first.
    #[instrument(skip(self, identity), fields(user_id = %identity.user_id))]
    pub async fn list_mine(
        &self,
        identity: &IdentityContext,
        query: BranchRequestQuery,
        request: PageRequest,
    ) -> DirectoryResult<Page<BranchRequestDto>> {
        let managed = identity.managed_organizations();

        let organization_ids = match query.organization_id {
            Some(org_id) if managed.contains(&org_id) => vec![org_id],
            Some(org_id) => {
                return Err(DirectoryError::InvalidInput(format!(
                    "organization {} is not among the caller's organizations",
                    org_id
                )))
            }
            None => managed,
        };
        if organization_ids.is_empty() {
            debug!("Caller manages no organizations");
            return Ok(Page::empty());
        }

        let filter = BranchRequestFilter {
            organization_ids,
            status: query.status,
        };
        let page = paginate(request, |cursor, take| {
            self.store.list_branch_requests(&filter, cursor, take)
        })
        .await?;

        self.project(page).await
    }

    /// A single request, visible to managers of its organization.
    #[instrument(skip(self, identity), fields(user_id = %identity.user_id))]
    pub async fn get(
        &self,
        identity: &IdentityContext,
        request_id: Uuid,
    ) -> DirectoryResult<BranchRequestDto> {
        if !may_hold_access(identity) {
            warn!(request_id = %request_id, "Access denied: caller holds no memberships");
            return Err(DirectoryError::Forbidden(format!(
                "branch request {} is not accessible",
                request_id
            )));
        }

        let request = self.load(request_id).await?;
        ensure_permitted(identity, request.organization_id, OrgAction::ListBranchRequests)?;

        let organization = self.store.get_organization(request.organization_id).await?;
        let restaurant = match request.restaurant_id {
            Some(id) => self.store.get_restaurant(id).await?,
            None => None,
        };
        Ok(BranchRequestDto::new(
            &request,
            organization.as_ref(),
            restaurant.as_ref(),
        ))
    }

    /// Approve a pending request, creating its restaurant.
    ///
    /// The restaurant inherits the organization's default language.
    #[instrument(skip(self, identity), fields(user_id = %identity.user_id))]
    pub async fn approve(
        &self,
        identity: &IdentityContext,
        request_id: Uuid,
    ) -> DirectoryResult<BranchRequestDto> {
        ensure_platform_admin(identity)?;

        let request = self.load_pending(request_id).await?;
        let organization = self.organization_of(&request).await?;
        let restaurant = Restaurant::from_draft(
            &request.payload,
            organization.id,
            organization.default_language,
        );

        match self
            .store
            .approve_branch_request(request_id, identity.user_id, restaurant)
            .await?
        {
            ConditionalUpdate::Applied((request, restaurant)) => {
                info!(
                    request_id = %request_id,
                    restaurant_id = %restaurant.id,
                    "Branch request approved"
                );
                Ok(BranchRequestDto::new(
                    &request,
                    Some(&organization),
                    Some(&restaurant),
                ))
            }
            ConditionalUpdate::Stale(status) => Err(lost_race(request_id, status)),
        }
    }

    /// Reject a pending request. `reason` must not be blank.
    #[instrument(skip(self, identity, reason), fields(user_id = %identity.user_id))]
    pub async fn reject(
        &self,
        identity: &IdentityContext,
        request_id: Uuid,
        reason: &str,
    ) -> DirectoryResult<BranchRequestDto> {
        ensure_platform_admin(identity)?;
        if reason.trim().is_empty() {
            return Err(TransitionError::MissingReason.into());
        }

        let request = self.load_pending(request_id).await?;
        let organization = self.organization_of(&request).await?;

        match self
            .store
            .reject_branch_request(request_id, identity.user_id, reason)
            .await?
        {
            ConditionalUpdate::Applied(request) => {
                info!(request_id = %request_id, "Branch request rejected");
                Ok(BranchRequestDto::new(&request, Some(&organization), None))
            }
            ConditionalUpdate::Stale(status) => Err(lost_race(request_id, status)),
        }
    }

    async fn load(&self, request_id: Uuid) -> DirectoryResult<BranchRequest> {
        self.store
            .get_branch_request(request_id)
            .await?
            .ok_or_else(|| DirectoryError::NotFound(format!("branch request {}", request_id)))
    }

    async fn load_pending(&self, request_id: Uuid) -> DirectoryResult<BranchRequest> {
        let request = self.load(request_id).await?;
        if request.status.is_terminal() {
            debug!(request_id = %request_id, status = request.status.as_str(), "Request already resolved");
            return Err(TransitionError::NotPending(request.status).into());
        }
        Ok(request)
    }

    async fn organization_of(&self, request: &BranchRequest) -> DirectoryResult<Organization> {
        self.store
            .get_organization(request.organization_id)
            .await?
            .ok_or_else(|| {
                DirectoryError::NotFound(format!("organization {}", request.organization_id))
            })
    }

    /// Attach organization and restaurant summaries with one lookup each.
    async fn project(&self, page: Page<BranchRequest>) -> DirectoryResult<Page<BranchRequestDto>> {
        let org_ids: Vec<Uuid> = page
            .items
            .iter()
            .map(|r| r.organization_id)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        let restaurant_ids: Vec<Uuid> = page.items.iter().filter_map(|r| r.restaurant_id).collect();

        let organizations: HashMap<Uuid, Organization> = if org_ids.is_empty() {
            HashMap::new()
        } else {
            self.store
                .organizations_by_ids(&org_ids)
                .await?
                .into_iter()
                .map(|o| (o.id, o))
                .collect()
        };
        let restaurants: HashMap<Uuid, Restaurant> = if restaurant_ids.is_empty() {
            HashMap::new()
        } else {
            self.store
                .restaurants_by_ids(&restaurant_ids)
                .await?
                .into_iter()
                .map(|r| (r.id, r))
                .collect()
        };

        Ok(page.map(|r| BranchRequestDto::project(&r, &organizations, &restaurants)))
    }
}

fn ensure_platform_admin(identity: &IdentityContext) -> DirectoryResult<()> {
    if !identity.platform_admin {
        warn!(user_id = %identity.user_id, "Branch request resolution requires platform admin");
        return Err(DirectoryError::Forbidden(format!(
            "{} requires a platform administrator",
            OrgAction::ResolveBranchRequest
        )));
    }
    Ok(())
}

fn lost_race(request_id: Uuid, status: BranchRequestStatus) -> DirectoryError {
    warn!(request_id = %request_id, status = status.as_str(), "Concurrent resolution won");
    DirectoryError::Conflict(format!(
        "branch request {} was {} concurrently",
        request_id,
        status.as_str()
    ))
}
