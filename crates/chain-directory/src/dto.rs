//! Response and request shapes
//!
//! Every endpoint builds its response explicitly from records. Storage
//! fields that are not listed here (a restaurant's IBAN, membership ids,
//! invitation metadata) never reach the wire.

use chain_access::OrgAction;
use chain_org::{
    BranchDraft, BranchDraftInput, BranchRequest, BranchRequestStatus, BusinessType, Language,
    Organization, OrganizationRole, PriceRange, Restaurant, User,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

/// Organization record as returned to callers.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrganizationDto {
    pub id: Uuid,
    pub name: String,
    pub legal_name: Option<String>,
    pub region: String,
    pub default_language: Language,
    pub tax_office: Option<String>,
    pub tax_number: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&Organization> for OrganizationDto {
    fn from(org: &Organization) -> Self {
        Self {
            id: org.id,
            name: org.name.clone(),
            legal_name: org.legal_name.clone(),
            region: org.region.clone(),
            default_language: org.default_language,
            tax_office: org.tax_office.clone(),
            tax_number: org.tax_number.clone(),
            created_at: org.created_at,
            updated_at: org.updated_at,
        }
    }
}

/// One row of "list my organizations".
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrganizationSummaryDto {
    #[serde(flatten)]
    pub organization: OrganizationDto,
    pub restaurant_count: u64,
    /// The caller's role in this organization
    pub role: OrganizationRole,
}

/// Organization detail with its restaurants and members.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrganizationDetailDto {
    #[serde(flatten)]
    pub organization: OrganizationDto,
    /// Ordered by name
    pub restaurants: Vec<RestaurantDto>,
    pub members: Vec<MemberDto>,
    /// Actions the caller may perform on this organization
    pub permissions: Vec<String>,
}

impl OrganizationDetailDto {
    /// Whether the caller may perform `action`.
    pub fn allows(&self, action: OrgAction) -> bool {
        self.permissions.iter().any(|p| p == action.as_str())
    }
}

/// Restaurant record as returned to callers.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RestaurantDto {
    pub id: Uuid,
    pub name: String,
    pub region: String,
    pub city: Option<String>,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub price_range: PriceRange,
    pub business_type: BusinessType,
    pub opening_hours: Option<String>,
    pub description: Option<String>,
    pub is_active: bool,
    pub preferred_language: Language,
    pub organization_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&Restaurant> for RestaurantDto {
    fn from(r: &Restaurant) -> Self {
        Self {
            id: r.id,
            name: r.name.clone(),
            region: r.region.clone(),
            city: r.city.clone(),
            address: r.address.clone(),
            phone: r.phone.clone(),
            price_range: r.price_range,
            business_type: r.business_type,
            opening_hours: r.opening_hours.clone(),
            description: r.description.clone(),
            is_active: r.is_active,
            preferred_language: r.preferred_language,
            organization_id: r.organization_id,
            created_at: r.created_at,
            updated_at: r.updated_at,
        }
    }
}

/// A member of an organization.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct MemberDto {
    pub user_id: Uuid,
    pub name: String,
    pub email: String,
    /// Display role; missing or unknown roles show as `org_staff`
    pub role: OrganizationRole,
}

impl MemberDto {
    pub fn new(user: &User, role: Option<OrganizationRole>) -> Self {
        Self {
            user_id: user.id,
            name: user.name.clone(),
            email: user.email.clone(),
            role: OrganizationRole::for_display(role),
        }
    }
}

/// Denormalized organization summary on a branch request.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct OrganizationRef {
    pub id: Uuid,
    pub name: String,
    pub region: String,
}

impl From<&Organization> for OrganizationRef {
    fn from(org: &Organization) -> Self {
        Self {
            id: org.id,
            name: org.name.clone(),
            region: org.region.clone(),
        }
    }
}

/// Denormalized restaurant summary on an approved branch request.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RestaurantRef {
    pub id: Uuid,
    pub name: String,
}

impl From<&Restaurant> for RestaurantRef {
    fn from(r: &Restaurant) -> Self {
        Self {
            id: r.id,
            name: r.name.clone(),
        }
    }
}

/// Branch request as returned to callers.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BranchRequestDto {
    pub id: Uuid,
    pub organization_id: Uuid,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub organization: Option<OrganizationRef>,
    pub requested_by: Uuid,
    pub status: BranchRequestStatus,
    pub payload: BranchDraft,
    pub notes: Option<String>,
    pub restaurant_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub restaurant: Option<RestaurantRef>,
    pub resolved_by: Option<Uuid>,
    pub resolved_at: Option<DateTime<Utc>>,
    pub reject_reason: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl BranchRequestDto {
    /// Project a request with already loaded organization and restaurant.
    pub fn new(
        request: &BranchRequest,
        organization: Option<&Organization>,
        restaurant: Option<&Restaurant>,
    ) -> Self {
        Self {
            id: request.id,
            organization_id: request.organization_id,
            organization: organization.map(OrganizationRef::from),
            requested_by: request.requested_by,
            status: request.status,
            payload: request.payload.clone(),
            notes: request.notes.clone(),
            restaurant_id: request.restaurant_id,
            restaurant: restaurant.map(RestaurantRef::from),
            resolved_by: request.resolved_by,
            resolved_at: request.resolved_at,
            reject_reason: request.reject_reason.clone(),
            created_at: request.created_at,
            updated_at: request.updated_at,
        }
    }

    /// Project a request using batch-loaded lookups.
    pub fn project(
        request: &BranchRequest,
        organizations: &HashMap<Uuid, Organization>,
        restaurants: &HashMap<Uuid, Restaurant>,
    ) -> Self {
        let restaurant = request.restaurant_id.and_then(|id| restaurants.get(&id));
        Self::new(request, organizations.get(&request.organization_id), restaurant)
    }
}

/// Body of `POST /org/branch-requests`.
///
/// The proposed restaurant fields sit next to `organizationId` and `notes`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateBranchRequestBody {
    #[serde(default)]
    pub organization_id: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(flatten)]
    pub draft: BranchDraftInput,
}

/// Body of `PATCH /org/organizations/:oid`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateOrganizationBody {
    #[serde(default)]
    pub default_language: Option<String>,
}

/// Body of the reject endpoint.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RejectBody {
    #[serde(default)]
    pub reason: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_restaurant_dto_omits_iban() {
        let mut restaurant = Restaurant::new("Shore Bistro", "TR");
        restaurant.iban = Some("TR330006100519786457841326".into());

        let json = serde_json::to_value(RestaurantDto::from(&restaurant)).unwrap();
        assert!(json.get("iban").is_none());
        assert_eq!(json["isActive"], serde_json::json!(true));
        assert_eq!(json["preferredLanguage"], serde_json::json!("en"));
    }

    #[test]
    fn test_summary_flattens_organization() {
        let org = Organization::new("Harbor Group", "TR");
        let summary = OrganizationSummaryDto {
            organization: OrganizationDto::from(&org),
            restaurant_count: 3,
            role: OrganizationRole::Owner,
        };

        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["name"], serde_json::json!("Harbor Group"));
        assert_eq!(json["restaurantCount"], serde_json::json!(3));
        assert_eq!(json["role"], serde_json::json!("org_owner"));
        assert_eq!(json["defaultLanguage"], serde_json::json!("en"));
    }

    #[test]
    fn test_member_role_defaults_to_staff_for_display() {
        let user = User::new("Deniz", "deniz@example.com");
        assert_eq!(MemberDto::new(&user, None).role, OrganizationRole::Staff);
        assert_eq!(
            MemberDto::new(&user, Some(OrganizationRole::Unknown)).role,
            OrganizationRole::Staff
        );
        assert_eq!(
            MemberDto::new(&user, Some(OrganizationRole::Admin)).role,
            OrganizationRole::Admin
        );
    }

    #[test]
    fn test_create_body_reads_flattened_draft() {
        let body: CreateBranchRequestBody = serde_json::from_value(serde_json::json!({
            "organizationId": "0190a0a0-0000-7000-8000-000000000000",
            "name": "Shore Bistro",
            "region": "TR",
            "businessType": "cafe",
            "notes": "near the marina"
        }))
        .unwrap();

        assert_eq!(body.notes.as_deref(), Some("near the marina"));
        assert_eq!(body.draft.name.as_deref(), Some("Shore Bistro"));
        assert_eq!(body.draft.business_type, Some(BusinessType::Cafe));
    }
}
