//! "Get Featured" intake and the administrator moderation queue.

pub mod domain;
pub mod queue;
pub mod router;
pub mod store;

#[cfg(test)]
mod tests;

pub use domain::{
    ApplicationFormError, ApplicationKey, ApplicationStatus, ApplicationSubmission,
    FeaturedApplication, FoodListing, GreenPlateCertification, ListingCategory, ListingDetails,
    ShopListing,
};
pub use queue::{ModerationError, ModerationOutcome, ModerationQueue};
pub use router::moderation_router;
pub use store::{ApplicationStore, ApplicationStoreError, ModerationDecision};
