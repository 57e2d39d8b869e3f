use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::workflows::onboarding::store::DocumentRef;

/// Key identifying an application for moderation actions: the store id when
/// present, otherwise the applicant email.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApplicationKey {
    Id(String),
    Email(String),
}

impl ApplicationKey {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Id(value) | Self::Email(value) => value,
        }
    }
}

impl fmt::Display for ApplicationKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Review status. `Approved` and `Rejected` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApplicationStatus {
    Pending,
    Approved,
    Rejected,
}

impl ApplicationStatus {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        }
    }

    pub const fn is_terminal(self) -> bool {
        !matches!(self, Self::Pending)
    }
}

/// Featured-listing categories offered on the submission form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ListingCategory {
    Bakeries,
    BreweriesPubs,
    CafesCoffeeShops,
    IceCreamGelato,
    Restaurants,
    Shops,
}

impl ListingCategory {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Bakeries => "Bakeries",
            Self::BreweriesPubs => "Breweries & Pubs",
            Self::CafesCoffeeShops => "Cafés & Coffee Shops",
            Self::IceCreamGelato => "Ice Cream & Gelato",
            Self::Restaurants => "Restaurants",
            Self::Shops => "Shops",
        }
    }

    pub const fn is_food(self) -> bool {
        !matches!(self, Self::Shops)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GreenPlateCertification {
    Gold,
    Silver,
    Bronze,
    #[default]
    #[serde(rename = "none")]
    NotCertified,
}

/// Fields collected for food businesses (restaurants, bakeries, cafés,
/// breweries, ice cream).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FoodListing {
    pub business_name: String,
    pub location: String,
    pub hours: String,
    pub local_sourcing: String,
    pub veg_vegan: String,
    #[serde(default)]
    pub green_plate: GreenPlateCertification,
    #[serde(default)]
    pub notes: String,
}

/// Fields collected for shops.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShopListing {
    pub store_name: String,
    pub hours_operation: String,
    pub info: String,
    #[serde(default)]
    pub shop_category: String,
}

/// The two submission shapes, tagged so each variant carries exactly its own
/// fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ListingDetails {
    Food(FoodListing),
    Shop(ShopListing),
}

impl ListingDetails {
    pub fn business_name(&self) -> &str {
        match self {
            Self::Food(listing) => &listing.business_name,
            Self::Shop(listing) => &listing.store_name,
        }
    }
}

/// A "Get Featured" submission. Validation is owned here: the required
/// fields and the category/variant pairing are enforced before the store is
/// contacted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplicationSubmission {
    #[serde(default)]
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub contact: String,
    pub category: ListingCategory,
    pub details: ListingDetails,
}

impl ApplicationSubmission {
    pub fn validate(&self) -> Result<(), ApplicationFormError> {
        if self.email.trim().is_empty() {
            return Err(ApplicationFormError::MissingEmail);
        }

        let details_are_food = matches!(self.details, ListingDetails::Food(_));
        if details_are_food != self.category.is_food() {
            return Err(ApplicationFormError::CategoryMismatch {
                category: self.category,
            });
        }

        if self.details.business_name().trim().is_empty() {
            return Err(ApplicationFormError::MissingBusinessName);
        }

        Ok(())
    }

    pub fn business_name(&self) -> &str {
        self.details.business_name()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ApplicationFormError {
    #[error("applicant email is required")]
    MissingEmail,
    #[error("business name is required")]
    MissingBusinessName,
    #[error("submitted details do not match the {} category", .category.label())]
    CategoryMismatch { category: ListingCategory },
}

/// Application record as held by the external store. Legacy rows may lack an
/// id, so the email doubles as a fallback key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeaturedApplication {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default)]
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default)]
    pub contact: String,
    pub business_name: String,
    pub category: ListingCategory,
    pub status: ApplicationStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub document: Option<DocumentRef>,
    pub submitted_on: NaiveDate,
}

impl FeaturedApplication {
    pub fn key(&self) -> Option<ApplicationKey> {
        if let Some(id) = self.id.as_deref().filter(|id| !id.trim().is_empty()) {
            return Some(ApplicationKey::Id(id.to_string()));
        }
        self.email
            .as_deref()
            .filter(|email| !email.trim().is_empty())
            .map(|email| ApplicationKey::Email(email.to_string()))
    }

    pub fn matches(&self, key: &ApplicationKey) -> bool {
        match key {
            ApplicationKey::Id(id) => self.id.as_deref() == Some(id.as_str()),
            ApplicationKey::Email(email) => self
                .email
                .as_deref()
                .is_some_and(|candidate| candidate.eq_ignore_ascii_case(email)),
        }
    }
}
