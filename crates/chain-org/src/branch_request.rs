//! Branch request domain model
//!
//! A branch request is an organization's proposal to open a new restaurant.
//! It is created `pending` by an organization manager and resolved exactly
//! once by a platform administrator:
//!
//! ```text
//! pending ──approve──> approved   (restaurant_id, resolved_by, resolved_at)
//!    │
//!    └─────reject────> rejected   (reject_reason, resolved_by, resolved_at)
//! ```
//!
//! Both resolved states are terminal.

use chrono::{DateTime, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::error::ValidationError;

/// Current version of the [`BranchDraft`] schema.
pub const DRAFT_SCHEMA_VERSION: u32 = 1;

/// Kind of venue a restaurant operates as.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum BusinessType {
    /// Full-service restaurant
    Restaurant,
    /// Cafe or coffee shop
    Cafe,
    /// Bar or pub
    Bar,
    /// Bakery or patisserie
    Bakery,
    /// Quick-service / fast food
    FastFood,
    /// Delivery-only kitchen
    CloudKitchen,
}

impl BusinessType {
    /// Get string representation of the business type.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Restaurant => "restaurant",
            Self::Cafe => "cafe",
            Self::Bar => "bar",
            Self::Bakery => "bakery",
            Self::FastFood => "fast_food",
            Self::CloudKitchen => "cloud_kitchen",
        }
    }

    /// Parse from the wire representation.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "restaurant" => Some(Self::Restaurant),
            "cafe" => Some(Self::Cafe),
            "bar" => Some(Self::Bar),
            "bakery" => Some(Self::Bakery),
            "fast_food" => Some(Self::FastFood),
            "cloud_kitchen" => Some(Self::CloudKitchen),
            _ => None,
        }
    }
}

impl Default for BusinessType {
    fn default() -> Self {
        Self::Restaurant
    }
}

/// Price bracket shown to guests.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum PriceRange {
    Budget,
    Moderate,
    Expensive,
    Luxury,
}

impl Default for PriceRange {
    fn default() -> Self {
        Self::Moderate
    }
}

/// Branch proposal as submitted by a client, before validation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BranchDraftInput {
    pub name: Option<String>,
    pub region: Option<String>,
    pub city: Option<String>,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub iban: Option<String>,
    pub price_range: Option<PriceRange>,
    pub business_type: Option<BusinessType>,
    pub opening_hours: Option<String>,
    pub description: Option<String>,
}

/// A validated proposal for a new restaurant.
///
/// Drafts are a closed schema: unknown fields are dropped at the input
/// boundary and every optional field has either a value or a default.
///
/// # Examples
///
/// ```
/// use chain_org::{BranchDraft, BranchDraftInput, BusinessType};
///
/// let input = BranchDraftInput {
///     name: Some("Shore Bistro".into()),
///     region: Some("TR".into()),
///     ..Default::default()
/// };
/// let draft = BranchDraft::from_input(input, BusinessType::Restaurant).unwrap();
/// assert_eq!(draft.business_type, BusinessType::Restaurant);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BranchDraft {
    /// Schema version of this draft
    pub version: u32,
    pub name: String,
    pub region: String,
    pub city: Option<String>,
    pub address: Option<String>,
    pub phone: Option<String>,
    /// Normalised: uppercase, no spaces
    pub iban: Option<String>,
    pub price_range: PriceRange,
    pub business_type: BusinessType,
    pub opening_hours: Option<String>,
    pub description: Option<String>,
}

impl BranchDraft {
    /// Validate a client proposal and apply defaults.
    ///
    /// # Arguments
    ///
    /// * `input` - The raw proposal
    /// * `default_business_type` - Used when the proposal names none
    ///
    /// # Errors
    ///
    /// Returns the first field that fails validation.
    pub fn from_input(
        input: BranchDraftInput,
        default_business_type: BusinessType,
    ) -> Result<Self, ValidationError> {
        let name = non_blank(input.name).ok_or(ValidationError::Required("name"))?;
        let region = non_blank(input.region)
            .map(|r| r.to_ascii_uppercase())
            .ok_or(ValidationError::Required("region"))?;

        let phone = non_blank(input.phone);
        if let Some(phone) = &phone {
            validate_phone(phone)?;
        }

        let iban = non_blank(input.iban).map(|i| normalize_iban(&i));
        if let Some(iban) = &iban {
            validate_iban(iban)?;
        }

        let opening_hours = non_blank(input.opening_hours);
        if let Some(hours) = &opening_hours {
            validate_opening_hours(hours)?;
        }

        Ok(Self {
            version: DRAFT_SCHEMA_VERSION,
            name,
            region,
            city: non_blank(input.city),
            address: non_blank(input.address),
            phone,
            iban,
            price_range: input.price_range.unwrap_or_default(),
            business_type: input.business_type.unwrap_or(default_business_type),
            opening_hours,
            description: non_blank(input.description),
        })
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn normalize_iban(iban: &str) -> String {
    iban.chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .to_ascii_uppercase()
}

fn validate_iban(iban: &str) -> Result<(), ValidationError> {
    if !(15..=34).contains(&iban.len()) {
        return Err(ValidationError::invalid("iban", "must be 15 to 34 characters"));
    }
    if !iban.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(ValidationError::invalid("iban", "must be alphanumeric"));
    }
    if !iban.chars().take(2).all(|c| c.is_ascii_alphabetic()) {
        return Err(ValidationError::invalid("iban", "must start with a country code"));
    }
    Ok(())
}

fn validate_phone(phone: &str) -> Result<(), ValidationError> {
    let allowed = |c: char| c.is_ascii_digit() || matches!(c, ' ' | '+' | '-' | '(' | ')');
    if !phone.chars().all(allowed) || !phone.chars().any(|c| c.is_ascii_digit()) {
        return Err(ValidationError::invalid("phone", "unexpected characters"));
    }
    Ok(())
}

fn validate_opening_hours(hours: &str) -> Result<(), ValidationError> {
    let malformed = || ValidationError::invalid("openingHours", "expected HH:MM-HH:MM");
    let (opens, closes) = hours.split_once('-').ok_or_else(malformed)?;
    let opens = NaiveTime::parse_from_str(opens.trim(), "%H:%M").map_err(|_| malformed())?;
    let closes = NaiveTime::parse_from_str(closes.trim(), "%H:%M").map_err(|_| malformed())?;
    if opens == closes {
        return Err(ValidationError::invalid(
            "openingHours",
            "opening and closing times are equal",
        ));
    }
    Ok(())
}

/// Lifecycle state of a branch request.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum BranchRequestStatus {
    Pending,
    Approved,
    Rejected,
}

impl BranchRequestStatus {
    /// Get string representation of the status.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        }
    }

    /// Parse from the wire representation.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pending" => Some(Self::Pending),
            "approved" => Some(Self::Approved),
            "rejected" => Some(Self::Rejected),
            _ => None,
        }
    }

    /// Approved and rejected requests accept no further transitions.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Pending)
    }
}

/// A transition was attempted that the lifecycle does not allow.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TransitionError {
    /// Request has already been resolved
    #[error("branch request is already {}", .0.as_str())]
    NotPending(BranchRequestStatus),

    /// Rejections must carry a reason
    #[error("reject reason is required")]
    MissingReason,
}

/// A proposal to create a new restaurant under an organization.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BranchRequest {
    /// Unique identifier (UUID v7, creation ordered)
    pub id: Uuid,

    /// Organization the branch would belong to
    pub organization_id: Uuid,

    /// User who submitted the request
    pub requested_by: Uuid,

    /// Lifecycle state
    pub status: BranchRequestStatus,

    /// Proposed restaurant attributes
    pub payload: BranchDraft,

    /// Submitter's notes for the reviewer
    pub notes: Option<String>,

    /// Restaurant created on approval
    pub restaurant_id: Option<Uuid>,

    /// Administrator who resolved the request
    pub resolved_by: Option<Uuid>,

    /// When the request was resolved
    pub resolved_at: Option<DateTime<Utc>>,

    /// Why the request was rejected
    pub reject_reason: Option<String>,

    /// When the request was submitted
    pub created_at: DateTime<Utc>,

    /// When the request was last updated
    pub updated_at: DateTime<Utc>,
}

impl BranchRequest {
    /// Creates a new pending request.
    pub fn new(organization_id: Uuid, requested_by: Uuid, payload: BranchDraft) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::now_v7(),
            organization_id,
            requested_by,
            status: BranchRequestStatus::Pending,
            payload,
            notes: None,
            restaurant_id: None,
            resolved_by: None,
            resolved_at: None,
            reject_reason: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Attach submitter notes; blank notes are dropped.
    pub fn with_notes(mut self, notes: Option<String>) -> Self {
        self.notes = non_blank(notes);
        self
    }

    /// Transition `pending -> approved`.
    ///
    /// On error the request is left untouched.
    pub fn approve(&mut self, restaurant_id: Uuid, resolved_by: Uuid) -> Result<(), TransitionError> {
        self.ensure_pending()?;
        let now = Utc::now();
        self.status = BranchRequestStatus::Approved;
        self.restaurant_id = Some(restaurant_id);
        self.resolved_by = Some(resolved_by);
        self.resolved_at = Some(now);
        self.updated_at = now;
        Ok(())
    }

    /// Transition `pending -> rejected`.
    ///
    /// On error the request is left untouched.
    pub fn reject(&mut self, resolved_by: Uuid, reason: &str) -> Result<(), TransitionError> {
        self.ensure_pending()?;
        let reason = reason.trim();
        if reason.is_empty() {
            return Err(TransitionError::MissingReason);
        }
        let now = Utc::now();
        self.status = BranchRequestStatus::Rejected;
        self.reject_reason = Some(reason.to_string());
        self.resolved_by = Some(resolved_by);
        self.resolved_at = Some(now);
        self.updated_at = now;
        Ok(())
    }

    fn ensure_pending(&self) -> Result<(), TransitionError> {
        if self.status.is_terminal() {
            return Err(TransitionError::NotPending(self.status));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft() -> BranchDraft {
        BranchDraft::from_input(
            BranchDraftInput {
                name: Some("Shore Bistro".into()),
                region: Some("tr".into()),
                ..Default::default()
            },
            BusinessType::Restaurant,
        )
        .unwrap()
    }

    #[test]
    fn test_draft_defaults() {
        let draft = draft();
        assert_eq!(draft.version, DRAFT_SCHEMA_VERSION);
        assert_eq!(draft.region, "TR");
        assert_eq!(draft.business_type, BusinessType::Restaurant);
        assert_eq!(draft.price_range, PriceRange::Moderate);
        assert!(draft.city.is_none());
    }

    #[test]
    fn test_draft_uses_supplied_default_business_type() {
        let input = BranchDraftInput {
            name: Some("Bean Corner".into()),
            region: Some("TR".into()),
            ..Default::default()
        };
        let draft = BranchDraft::from_input(input, BusinessType::Cafe).unwrap();
        assert_eq!(draft.business_type, BusinessType::Cafe);
    }

    #[test]
    fn test_draft_requires_name_and_region() {
        let err = BranchDraft::from_input(BranchDraftInput::default(), BusinessType::Restaurant)
            .unwrap_err();
        assert_eq!(err, ValidationError::Required("name"));

        let input = BranchDraftInput {
            name: Some("Shore Bistro".into()),
            region: Some("  ".into()),
            ..Default::default()
        };
        let err = BranchDraft::from_input(input, BusinessType::Restaurant).unwrap_err();
        assert_eq!(err, ValidationError::Required("region"));
    }

    #[test]
    fn test_draft_normalizes_iban() {
        let input = BranchDraftInput {
            name: Some("Shore Bistro".into()),
            region: Some("TR".into()),
            iban: Some("tr33 0006 1005 1978 6457 8413 26".into()),
            ..Default::default()
        };
        let draft = BranchDraft::from_input(input, BusinessType::Restaurant).unwrap();
        assert_eq!(draft.iban.as_deref(), Some("TR330006100519786457841326"));
    }

    #[test]
    fn test_draft_rejects_malformed_fields() {
        let base = || BranchDraftInput {
            name: Some("Shore Bistro".into()),
            region: Some("TR".into()),
            ..Default::default()
        };

        let bad_iban = BranchDraftInput {
            iban: Some("1234".into()),
            ..base()
        };
        assert!(matches!(
            BranchDraft::from_input(bad_iban, BusinessType::Restaurant),
            Err(ValidationError::Invalid { field: "iban", .. })
        ));

        let bad_phone = BranchDraftInput {
            phone: Some("call me".into()),
            ..base()
        };
        assert!(matches!(
            BranchDraft::from_input(bad_phone, BusinessType::Restaurant),
            Err(ValidationError::Invalid { field: "phone", .. })
        ));

        let bad_hours = BranchDraftInput {
            opening_hours: Some("9am-5pm".into()),
            ..base()
        };
        assert!(matches!(
            BranchDraft::from_input(bad_hours, BusinessType::Restaurant),
            Err(ValidationError::Invalid { field: "openingHours", .. })
        ));

        let late_night = BranchDraftInput {
            opening_hours: Some("18:00-02:00".into()),
            ..base()
        };
        assert!(BranchDraft::from_input(late_night, BusinessType::Restaurant).is_ok());
    }

    #[test]
    fn test_draft_input_ignores_unknown_fields() {
        let input: BranchDraftInput = serde_json::from_value(serde_json::json!({
            "name": "Shore Bistro",
            "region": "TR",
            "businessType": "bar",
            "isAdmin": true
        }))
        .unwrap();
        assert_eq!(input.business_type, Some(BusinessType::Bar));
    }

    #[test]
    fn test_approve_is_terminal() {
        let admin = Uuid::now_v7();
        let mut request = BranchRequest::new(Uuid::now_v7(), Uuid::now_v7(), draft());
        let restaurant_id = Uuid::now_v7();

        request.approve(restaurant_id, admin).unwrap();
        assert_eq!(request.status, BranchRequestStatus::Approved);
        assert_eq!(request.restaurant_id, Some(restaurant_id));
        assert_eq!(request.resolved_by, Some(admin));
        let resolved_at = request.resolved_at;
        assert!(resolved_at.is_some());

        assert_eq!(
            request.reject(admin, "duplicate"),
            Err(TransitionError::NotPending(BranchRequestStatus::Approved))
        );
        assert_eq!(
            request.approve(Uuid::now_v7(), admin),
            Err(TransitionError::NotPending(BranchRequestStatus::Approved))
        );
        assert_eq!(request.restaurant_id, Some(restaurant_id));
        assert_eq!(request.resolved_at, resolved_at);
    }

    #[test]
    fn test_reject_requires_reason() {
        let admin = Uuid::now_v7();
        let mut request = BranchRequest::new(Uuid::now_v7(), Uuid::now_v7(), draft());

        assert_eq!(request.reject(admin, "   "), Err(TransitionError::MissingReason));
        assert_eq!(request.status, BranchRequestStatus::Pending);

        request.reject(admin, "Region not served").unwrap();
        assert_eq!(request.status, BranchRequestStatus::Rejected);
        assert_eq!(request.reject_reason.as_deref(), Some("Region not served"));
        assert!(request.restaurant_id.is_none());
    }

    #[test]
    fn test_status_parse() {
        assert_eq!(BranchRequestStatus::parse("Approved"), Some(BranchRequestStatus::Approved));
        assert_eq!(BranchRequestStatus::parse("done"), None);
        assert!(!BranchRequestStatus::Pending.is_terminal());
        assert!(BranchRequestStatus::Rejected.is_terminal());
    }
}
