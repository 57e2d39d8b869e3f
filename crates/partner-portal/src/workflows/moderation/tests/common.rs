use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use chrono::NaiveDate;
use tokio::sync::Notify;

use crate::session::identity::AdminToken;
use crate::workflows::moderation::domain::{
    ApplicationKey, ApplicationStatus, ApplicationSubmission, FeaturedApplication, FoodListing,
    GreenPlateCertification, ListingCategory, ListingDetails, ShopListing,
};
use crate::workflows::moderation::queue::ModerationQueue;
use crate::workflows::moderation::store::{
    ApplicationStore, ApplicationStoreError, ModerationDecision,
};

pub(super) const ADMIN_TOKEN: &str = "admin-session-0001";

pub(super) fn admin() -> AdminToken {
    AdminToken(ADMIN_TOKEN.to_string())
}

pub(super) fn pending(id: &str, email: &str, business: &str) -> FeaturedApplication {
    FeaturedApplication {
        id: Some(id.to_string()),
        name: "Mara Hollis".to_string(),
        email: Some(email.to_string()),
        contact: "613-555-0142".to_string(),
        business_name: business.to_string(),
        category: ListingCategory::Bakeries,
        status: ApplicationStatus::Pending,
        document: None,
        submitted_on: NaiveDate::from_ymd_opt(2026, 3, 2).expect("valid date"),
    }
}

pub(super) fn food_submission(email: &str, business: &str) -> ApplicationSubmission {
    ApplicationSubmission {
        name: "Mara Hollis".to_string(),
        email: email.to_string(),
        contact: "613-555-0142".to_string(),
        category: ListingCategory::Bakeries,
        details: ListingDetails::Food(FoodListing {
            business_name: business.to_string(),
            location: "12 Mill St".to_string(),
            hours: "7-3 daily".to_string(),
            local_sourcing: "Flour from Forfar Mills".to_string(),
            veg_vegan: "Vegan sourdough".to_string(),
            green_plate: GreenPlateCertification::Silver,
            notes: String::new(),
        }),
    }
}

pub(super) fn shop_submission(email: &str, store: &str) -> ApplicationSubmission {
    ApplicationSubmission {
        name: "Dev Arora".to_string(),
        email: email.to_string(),
        contact: "613-555-0178".to_string(),
        category: ListingCategory::Shops,
        details: ListingDetails::Shop(ShopListing {
            store_name: store.to_string(),
            hours_operation: "10-6 Tue-Sun".to_string(),
            info: "Restored furniture and curios".to_string(),
            shop_category: "antiques".to_string(),
        }),
    }
}

/// Application store fake with call counting and an optional gate that parks
/// the next `set_status` call until released.
#[derive(Default)]
pub(super) struct MemoryApplicationStore {
    records: Mutex<Vec<FeaturedApplication>>,
    sequence: AtomicU64,
    set_status_gate: Mutex<Option<Arc<Notify>>>,
    pub(super) list_calls: AtomicUsize,
    pub(super) set_calls: AtomicUsize,
    pub(super) submit_calls: AtomicUsize,
}

impl MemoryApplicationStore {
    pub(super) fn seeded(records: Vec<FeaturedApplication>) -> Self {
        let store = Self::default();
        *store.records.lock().expect("record mutex") = records;
        store
    }

    pub(super) fn hold_next_set_status(&self, gate: Arc<Notify>) {
        *self.set_status_gate.lock().expect("gate mutex") = Some(gate);
    }

    pub(super) fn status_of(&self, key: &ApplicationKey) -> Option<ApplicationStatus> {
        self.records
            .lock()
            .expect("record mutex")
            .iter()
            .find(|record| record.matches(key))
            .map(|record| record.status)
    }

    fn check_admin(&self, admin: &AdminToken) -> Result<(), ApplicationStoreError> {
        if admin.0 == ADMIN_TOKEN {
            Ok(())
        } else {
            Err(ApplicationStoreError::Unauthorized)
        }
    }
}

#[async_trait::async_trait]
impl ApplicationStore for MemoryApplicationStore {
    async fn list(
        &self,
        admin: &AdminToken,
    ) -> Result<Vec<FeaturedApplication>, ApplicationStoreError> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        self.check_admin(admin)?;
        Ok(self.records.lock().expect("record mutex").clone())
    }

    async fn set_status(
        &self,
        admin: &AdminToken,
        key: &ApplicationKey,
        decision: ModerationDecision,
    ) -> Result<FeaturedApplication, ApplicationStoreError> {
        self.set_calls.fetch_add(1, Ordering::SeqCst);
        self.check_admin(admin)?;

        let gate = self.set_status_gate.lock().expect("gate mutex").take();
        if let Some(gate) = gate {
            gate.notified().await;
        }

        let mut records = self.records.lock().expect("record mutex");
        let record = records
            .iter_mut()
            .find(|record| record.matches(key))
            .ok_or(ApplicationStoreError::NotFound)?;
        if record.status.is_terminal() {
            return Err(ApplicationStoreError::NotPending {
                status: record.status,
            });
        }
        record.status = decision.resulting_status();
        Ok(record.clone())
    }

    async fn submit(
        &self,
        submission: ApplicationSubmission,
    ) -> Result<FeaturedApplication, ApplicationStoreError> {
        self.submit_calls.fetch_add(1, Ordering::SeqCst);

        let mut records = self.records.lock().expect("record mutex");
        let duplicate = records.iter().any(|record| {
            record
                .email
                .as_deref()
                .is_some_and(|email| email.eq_ignore_ascii_case(&submission.email))
        });
        if duplicate {
            return Err(ApplicationStoreError::DuplicateEmail);
        }

        let id = self.sequence.fetch_add(1, Ordering::Relaxed) + 1;
        let record = FeaturedApplication {
            id: Some(format!("app-{id:06}")),
            name: submission.name.clone(),
            email: Some(submission.email.clone()),
            contact: submission.contact.clone(),
            business_name: submission.business_name().to_string(),
            category: submission.category,
            status: ApplicationStatus::Pending,
            document: None,
            submitted_on: chrono::Utc::now().date_naive(),
        };
        records.push(record.clone());
        Ok(record)
    }
}

pub(super) fn build_queue(
    records: Vec<FeaturedApplication>,
) -> (
    Arc<ModerationQueue<MemoryApplicationStore>>,
    Arc<MemoryApplicationStore>,
) {
    let store = Arc::new(MemoryApplicationStore::seeded(records));
    let queue = Arc::new(ModerationQueue::new(store.clone()));
    (queue, store)
}
