//! Organization directory
//!
//! Read and update operations over organizations, gated per request by the
//! access resolver. Authorization always happens before the target is looked
//! up, so a denied caller never causes a store read for the target.

use chain_access::{
    may_hold_access, resolve, resolve_for_restaurant, AccessDecision, IdentityContext, OrgAction,
};
use chain_org::{Language, Organization, OrganizationRole, User};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use crate::config::DirectoryConfig;
use crate::dto::{
    MemberDto, OrganizationDetailDto, OrganizationDto, OrganizationSummaryDto, RestaurantDto,
};
use crate::error::{DirectoryError, DirectoryResult};
use crate::pagination::{paginate, Page, PageRequest};
use crate::store::DirectoryStore;

/// Check that `identity` may perform `action` on `org_id`.
///
/// Pure: no store access.
pub(crate) fn ensure_permitted(
    identity: &IdentityContext,
    org_id: Uuid,
    action: OrgAction,
) -> DirectoryResult<AccessDecision> {
    let decision = resolve(identity, org_id);
    if !decision.permits(action) {
        warn!(
            user_id = %identity.user_id,
            org_id = %org_id,
            action = %action,
            "Access denied"
        );
        return Err(DirectoryError::Forbidden(format!(
            "{} is not permitted on organization {}",
            action, org_id
        )));
    }
    Ok(decision)
}

/// Authorize, then load the organization.
///
/// A missing organization after an ALLOW is reported as `NotFound`.
pub(crate) async fn authorize_organization<S>(
    store: &S,
    identity: &IdentityContext,
    org_id: Uuid,
    action: OrgAction,
) -> DirectoryResult<(Organization, AccessDecision)>
where
    S: DirectoryStore + ?Sized,
{
    let decision = ensure_permitted(identity, org_id, action)?;
    let organization = store
        .get_organization(org_id)
        .await?
        .ok_or_else(|| DirectoryError::NotFound(format!("organization {}", org_id)))?;
    Ok((organization, decision))
}

/// Organization read and update operations.
pub struct OrganizationDirectory<S: DirectoryStore + ?Sized> {
    store: Arc<S>,
    config: DirectoryConfig,
}

impl<S: DirectoryStore + ?Sized> OrganizationDirectory<S> {
    /// Create a directory over `store`.
    pub fn new(store: Arc<S>, config: DirectoryConfig) -> Self {
        Self { store, config }
    }

    /// Paging bounds in effect.
    pub fn config(&self) -> &DirectoryConfig {
        &self.config
    }

    /// Organizations where the caller is owner or admin, with restaurant counts.
    ///
    /// Platform admins only see organizations they manage here; the flag
    /// grants access to targets, it does not enumerate them.
    #[instrument(skip(self, identity), fields(user_id = %identity.user_id))]
    pub async fn list_accessible(
        &self,
        identity: &IdentityContext,
        request: PageRequest,
    ) -> DirectoryResult<Page<OrganizationSummaryDto>> {
        let managed = identity.managed_organizations();
        if managed.is_empty() {
            debug!("Caller manages no organizations");
            return Ok(Page::empty());
        }

        let page = paginate(request, |cursor, take| {
            self.store.list_organizations(&managed, cursor, take)
        })
        .await?;

        let ids: Vec<Uuid> = page.items.iter().map(|org| org.id).collect();
        let counts = if ids.is_empty() {
            HashMap::new()
        } else {
            self.store.count_restaurants(&ids).await?
        };

        debug!(count = page.items.len(), has_more = page.has_more(), "Listed organizations");
        Ok(page.map(|org| OrganizationSummaryDto {
            restaurant_count: counts.get(&org.id).copied().unwrap_or(0),
            role: identity
                .org_role(org.id)
                .unwrap_or(OrganizationRole::Unknown),
            organization: OrganizationDto::from(&org),
        }))
    }

    /// Organization record joined with its restaurants and members.
    #[instrument(skip(self, identity), fields(user_id = %identity.user_id))]
    pub async fn get_detail(
        &self,
        identity: &IdentityContext,
        org_id: Uuid,
    ) -> DirectoryResult<OrganizationDetailDto> {
        let (organization, decision) = authorize_organization(
            self.store.as_ref(),
            identity,
            org_id,
            OrgAction::ViewOrganization,
        )
        .await?;

        let restaurants = self.store.restaurants_by_name(org_id).await?;
        let memberships = self.store.organization_members(org_id).await?;

        let user_ids: Vec<Uuid> = memberships.iter().map(|m| m.user_id).collect();
        let users: HashMap<Uuid, User> = self
            .store
            .users_by_ids(&user_ids)
            .await?
            .into_iter()
            .map(|u| (u.id, u))
            .collect();

        let members = memberships
            .iter()
            .filter_map(|m| match users.get(&m.user_id) {
                Some(user) => Some(MemberDto::new(user, m.role)),
                None => {
                    debug!(user_id = %m.user_id, "Skipping membership of unknown user");
                    None
                }
            })
            .collect();

        Ok(OrganizationDetailDto {
            organization: OrganizationDto::from(&organization),
            restaurants: restaurants.iter().map(RestaurantDto::from).collect(),
            members,
            permissions: decision
                .permitted_actions()
                .iter()
                .map(|a| a.as_str().to_string())
                .collect(),
        })
    }

    /// Change the organization's default language.
    ///
    /// `language` must be a supported language code.
    #[instrument(skip(self, identity), fields(user_id = %identity.user_id))]
    pub async fn update_default_language(
        &self,
        identity: &IdentityContext,
        org_id: Uuid,
        language: &str,
    ) -> DirectoryResult<OrganizationDto> {
        ensure_permitted(identity, org_id, OrgAction::UpdateOrganization)?;

        let language = Language::parse(language).ok_or_else(|| {
            DirectoryError::InvalidInput(format!("unsupported language: {}", language))
        })?;

        let organization = self
            .store
            .set_default_language(org_id, language)
            .await?
            .ok_or_else(|| DirectoryError::NotFound(format!("organization {}", org_id)))?;

        info!(org_id = %org_id, language = %language, "Organization language updated");
        Ok(OrganizationDto::from(&organization))
    }

    /// Page through the organization's restaurants.
    #[instrument(skip(self, identity), fields(user_id = %identity.user_id))]
    pub async fn list_restaurants(
        &self,
        identity: &IdentityContext,
        org_id: Uuid,
        request: PageRequest,
    ) -> DirectoryResult<Page<RestaurantDto>> {
        authorize_organization(
            self.store.as_ref(),
            identity,
            org_id,
            OrgAction::ListRestaurants,
        )
        .await?;

        let page = paginate(request, |cursor, take| {
            self.store.list_restaurants(org_id, cursor, take)
        })
        .await?;
        Ok(page.map(|r| RestaurantDto::from(&r)))
    }

    /// A single restaurant, resolved through its owning organization.
    #[instrument(skip(self, identity), fields(user_id = %identity.user_id))]
    pub async fn get_restaurant(
        &self,
        identity: &IdentityContext,
        restaurant_id: Uuid,
    ) -> DirectoryResult<RestaurantDto> {
        if !may_hold_access(identity) {
            warn!(restaurant_id = %restaurant_id, "Access denied: caller holds no memberships");
            return Err(DirectoryError::Forbidden(format!(
                "restaurant {} is not accessible",
                restaurant_id
            )));
        }

        let restaurant = self
            .store
            .get_restaurant(restaurant_id)
            .await?
            .ok_or_else(|| DirectoryError::NotFound(format!("restaurant {}", restaurant_id)))?;

        let decision = resolve_for_restaurant(identity, &restaurant);
        if !decision.permits(OrgAction::ViewRestaurant) {
            warn!(restaurant_id = %restaurant_id, "Access denied");
            return Err(DirectoryError::Forbidden(format!(
                "restaurant {} is not accessible",
                restaurant_id
            )));
        }

        Ok(RestaurantDto::from(&restaurant))
    }
}

/// Build the identity context of `user_id` from stored memberships.
///
/// The authentication layer normally supplies the identity; this is the
/// lookup it uses when it only knows the user.
pub async fn load_identity<S>(
    store: &S,
    user_id: Uuid,
    platform_admin: bool,
) -> DirectoryResult<IdentityContext>
where
    S: DirectoryStore + ?Sized,
{
    let (orgs, restaurants) = store.memberships_of_user(user_id).await?;
    Ok(IdentityContext::from_memberships(user_id, &orgs, &restaurants)
        .with_platform_admin(platform_admin))
}
