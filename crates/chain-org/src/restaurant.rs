//! Restaurant domain model
//!
//! A restaurant is either a branch of an organization (`organization_id` set)
//! or an independent venue (`organization_id` empty).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::branch_request::{BranchDraft, BusinessType, PriceRange};
use crate::language::Language;

/// A restaurant.
///
/// # Examples
///
/// ```
/// use chain_org::Restaurant;
/// use uuid::Uuid;
///
/// let independent = Restaurant::new("Corner Cafe", "TR");
/// assert!(independent.organization_id.is_none());
///
/// let org_id = Uuid::now_v7();
/// let branch = Restaurant::new("Shore Bistro", "TR").with_organization(org_id);
/// assert_eq!(branch.organization_id, Some(org_id));
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Restaurant {
    /// Unique identifier (UUID v7, creation ordered)
    pub id: Uuid,

    /// Display name
    pub name: String,

    /// Region code
    pub region: String,

    /// City
    pub city: Option<String>,

    /// Street address
    pub address: Option<String>,

    /// Contact phone number
    pub phone: Option<String>,

    /// Payout bank account
    pub iban: Option<String>,

    /// Price bracket
    pub price_range: PriceRange,

    /// Kind of venue
    pub business_type: BusinessType,

    /// Daily opening range, `HH:MM-HH:MM`
    pub opening_hours: Option<String>,

    /// Free-form description
    pub description: Option<String>,

    /// Whether the restaurant is taking orders
    pub is_active: bool,

    /// Preferred language for guests and staff
    pub preferred_language: Language,

    /// Owning organization, `None` for independents
    pub organization_id: Option<Uuid>,

    /// When the restaurant was created
    pub created_at: DateTime<Utc>,

    /// When the restaurant was last updated
    pub updated_at: DateTime<Utc>,
}

impl Restaurant {
    /// Creates a new active, independent restaurant.
    pub fn new(name: impl Into<String>, region: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::now_v7(),
            name: name.into(),
            region: region.into(),
            city: None,
            address: None,
            phone: None,
            iban: None,
            price_range: PriceRange::default(),
            business_type: BusinessType::default(),
            opening_hours: None,
            description: None,
            is_active: true,
            preferred_language: Language::default(),
            organization_id: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Attach the restaurant to an organization.
    pub fn with_organization(mut self, organization_id: Uuid) -> Self {
        self.organization_id = Some(organization_id);
        self
    }

    /// Set the preferred language.
    pub fn with_language(mut self, language: Language) -> Self {
        self.preferred_language = language;
        self
    }

    /// Materialise an approved branch draft as a restaurant of `organization_id`.
    ///
    /// The new restaurant is active and inherits the organization's default
    /// language.
    pub fn from_draft(draft: &BranchDraft, organization_id: Uuid, language: Language) -> Self {
        let mut restaurant = Self::new(draft.name.clone(), draft.region.clone())
            .with_organization(organization_id)
            .with_language(language);
        restaurant.city = draft.city.clone();
        restaurant.address = draft.address.clone();
        restaurant.phone = draft.phone.clone();
        restaurant.iban = draft.iban.clone();
        restaurant.price_range = draft.price_range;
        restaurant.business_type = draft.business_type;
        restaurant.opening_hours = draft.opening_hours.clone();
        restaurant.description = draft.description.clone();
        restaurant
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::branch_request::BranchDraftInput;

    #[test]
    fn test_restaurant_defaults() {
        let restaurant = Restaurant::new("Corner Cafe", "TR");
        assert!(restaurant.is_active);
        assert_eq!(restaurant.business_type, BusinessType::Restaurant);
        assert_eq!(restaurant.price_range, PriceRange::Moderate);
        assert!(restaurant.organization_id.is_none());
    }

    #[test]
    fn test_from_draft_copies_attributes() {
        let org_id = Uuid::now_v7();
        let input = BranchDraftInput {
            name: Some("Shore Bistro".into()),
            region: Some("TR".into()),
            city: Some("Izmir".into()),
            phone: Some("+90 232 000 00 00".into()),
            business_type: Some(BusinessType::Cafe),
            opening_hours: Some("08:00-22:00".into()),
            ..Default::default()
        };
        let draft = BranchDraft::from_input(input, BusinessType::Restaurant).unwrap();

        let restaurant = Restaurant::from_draft(&draft, org_id, Language::Turkish);

        assert_eq!(restaurant.name, "Shore Bistro");
        assert_eq!(restaurant.city.as_deref(), Some("Izmir"));
        assert_eq!(restaurant.business_type, BusinessType::Cafe);
        assert_eq!(restaurant.opening_hours.as_deref(), Some("08:00-22:00"));
        assert_eq!(restaurant.organization_id, Some(org_id));
        assert_eq!(restaurant.preferred_language, Language::Turkish);
        assert!(restaurant.is_active);
    }
}
