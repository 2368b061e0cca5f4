//! Organization domain model
//!
//! An organization is a restaurant chain: the tenant that owns restaurants,
//! members and branch requests. Restaurants reference their organization by
//! id; they are never embedded in the organization record.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ValidationError;
use crate::language::Language;

/// An organization (restaurant chain).
///
/// # Architecture
///
/// ```text
/// Organization
///   ├─ Restaurants (Restaurant.organization_id)
///   ├─ Members (via Membership)
///   └─ Branch requests (BranchRequest.organization_id)
/// ```
///
/// # Examples
///
/// ```
/// use chain_org::{Language, Organization};
///
/// let org = Organization::new("Harbor Group", "TR");
/// assert_eq!(org.name, "Harbor Group");
/// assert_eq!(org.default_language, Language::English);
/// assert!(org.validate().is_ok());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Organization {
    /// Unique identifier (UUID v7, creation ordered)
    pub id: Uuid,

    /// Display name
    pub name: String,

    /// Registered legal name
    pub legal_name: Option<String>,

    /// Operating region (country code)
    pub region: String,

    /// Default language for the organization's restaurants
    pub default_language: Language,

    /// Tax office the organization is registered with
    pub tax_office: Option<String>,

    /// Tax identification number
    pub tax_number: Option<String>,

    /// When the organization was created
    pub created_at: DateTime<Utc>,

    /// When the organization was last updated
    pub updated_at: DateTime<Utc>,
}

impl Organization {
    /// Creates a new organization with the default language.
    ///
    /// # Arguments
    ///
    /// * `name` - The organization display name
    /// * `region` - Operating region code
    pub fn new(name: impl Into<String>, region: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::now_v7(),
            name: name.into(),
            legal_name: None,
            region: region.into(),
            default_language: Language::default(),
            tax_office: None,
            tax_number: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Set the registered legal name.
    pub fn with_legal_name(mut self, legal_name: impl Into<String>) -> Self {
        self.legal_name = Some(legal_name.into());
        self
    }

    /// Set the default language.
    pub fn with_default_language(mut self, language: Language) -> Self {
        self.default_language = language;
        self
    }

    /// Set the tax identifiers.
    pub fn with_tax_identifiers(
        mut self,
        tax_office: impl Into<String>,
        tax_number: impl Into<String>,
    ) -> Self {
        self.tax_office = Some(tax_office.into());
        self.tax_number = Some(tax_number.into());
        self
    }

    /// Change the default language and bump `updated_at`.
    pub fn set_default_language(&mut self, language: Language) {
        self.default_language = language;
        self.updated_at = Utc::now();
    }

    /// Check the record invariants.
    ///
    /// `default_language` is closed by its type, so only the name needs
    /// checking at runtime.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.name.trim().is_empty() {
            return Err(ValidationError::Required("name"));
        }
        Ok(())
    }
}
