use std::sync::Arc;

use clap::Args;

use crate::infra::{
    InMemoryApplicationStore, InMemoryDirectory, InMemoryLicenseVault, InMemoryProfileStore,
    TokenRegistry,
};
use partner_portal::error::AppError;
use partner_portal::session::{JsonFileSessionVault, SessionKind, SessionManager};
use partner_portal::workflows::moderation::{
    ApplicationSubmission, FoodListing, GreenPlateCertification, ListingCategory, ListingDetails,
    ModerationQueue, ShopListing,
};
use partner_portal::workflows::onboarding::{
    DashboardView, LicenseUpload, OnboardingService, PartnerId, PartnerProfile, StepOutcome,
    StepState,
};

const SAMPLE_PDF: &[u8] = b"%PDF-1.4 demo city license";

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Email used for the demo partner account
    #[arg(long, default_value = "mara@rivermill.ca")]
    pub(crate) partner_email: String,
    /// Skip the moderation portion of the demo
    #[arg(long)]
    pub(crate) skip_moderation: bool,
}

pub(crate) async fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let DemoArgs {
        partner_email,
        skip_moderation,
    } = args;

    println!("Partner Portal demo");

    let registry = Arc::new(TokenRegistry::default());
    let directory = Arc::new(InMemoryDirectory::new(registry.clone()));
    directory.seed_partner(
        &partner_email,
        "demo-password",
        "Mara",
        Some("Rivermill Bakery"),
    );
    directory.seed_admin("founder@portal.test", "founders-portal");

    let session_vault = Arc::new(JsonFileSessionVault::new(
        std::env::temp_dir().join("partner-portal-demo-sessions.json"),
    ));
    let sessions = SessionManager::new(directory, session_vault)?;

    let partner = PartnerId::from_email(&partner_email);
    let profiles = Arc::new(InMemoryProfileStore::default());
    profiles.seed(PartnerProfile {
        business_name: Some("Rivermill Bakery".to_string()),
        display_name: Some("Mara".to_string()),
        ..PartnerProfile::new(partner.clone())
    });
    let license_vault = Arc::new(InMemoryLicenseVault::default());
    let onboarding = OnboardingService::new(profiles, license_vault.clone());

    let identity = sessions.login_partner(&partner_email, "demo-password").await?;
    println!(
        "\nSigned in as {} <{}>",
        identity.display_name, identity.email
    );

    render_dashboard(&onboarding.dashboard(&partner).await?);

    for ordinal in 2..=6u8 {
        let outcome = onboarding.mark_step_done(&partner, ordinal).await?;
        println!(
            "Marked step {ordinal} as done -> progress is now {}",
            outcome.progress()
        );
    }

    match onboarding.mark_step_done(&partner, 3).await? {
        StepOutcome::Unchanged { progress } => {
            println!("Replaying step 3 changed nothing (progress stays {progress})");
        }
        StepOutcome::Advanced { progress } => {
            println!("Replaying step 3 advanced to {progress}");
        }
    }

    let receipt = onboarding
        .submit_license(
            &partner,
            LicenseUpload::from_file_name("city-license.pdf", SAMPLE_PDF.to_vec()),
        )
        .await?;
    println!(
        "\nCity license stored as {} -> the business is LIVE",
        receipt.document.0
    );
    println!("Documents held in the vault: {}", license_vault.document_count());

    render_dashboard(&onboarding.dashboard(&partner).await?);

    if let Err(err) = onboarding
        .submit_license(
            &partner,
            LicenseUpload::from_file_name("city-license.pdf", SAMPLE_PDF.to_vec()),
        )
        .await
    {
        println!("A second upload is refused: {err}");
    }

    if skip_moderation {
        return Ok(());
    }

    println!("\nFounder's review queue");
    let applications = Arc::new(InMemoryApplicationStore::new(registry));
    let queue = ModerationQueue::new(applications);
    let token = sessions
        .login_admin("founder@portal.test", "founders-portal")
        .await?;

    queue
        .submit(sample_food_application("nadia@harbourcafe.ca", "Harbour Café"))
        .await?;
    queue
        .submit(sample_shop_application("dev@millst.ca", "Mill St Curios"))
        .await?;

    let pending: Vec<_> = queue.list_pending(&token).await?.collect();
    println!("{} applications awaiting review", pending.len());

    let outcome = queue.approve(&token, pending[0].key()).await?;
    println!("Approved {}", outcome.application.business_name);

    let outcome = queue.reject(&token, pending[1].key()).await?;
    println!("Rejected {}", outcome.application.business_name);

    println!("\nReview table after moderation:");
    for application in &outcome.applications {
        println!(
            "  {:<20} {:<22} {}",
            application.business_name,
            application.category.label(),
            application.status.label()
        );
    }

    sessions.logout(SessionKind::Administrator)?;
    sessions.logout(SessionKind::Partner)?;
    Ok(())
}

fn render_dashboard(view: &DashboardView) {
    println!(
        "\nPartner roadmap -> step {} of 7, profile strength {}%{}",
        view.progress,
        view.strength_percent,
        if view.verified { " (verified)" } else { "" }
    );
    for step in &view.steps {
        let marker = match step.state {
            StepState::Completed => "x",
            StepState::Actionable => ">",
            StepState::Locked => " ",
        };
        println!("  [{marker}] {}. {}", step.ordinal, step.label);
    }
}

fn sample_food_application(email: &str, business: &str) -> ApplicationSubmission {
    ApplicationSubmission {
        name: "Nadia Brown".to_string(),
        email: email.to_string(),
        contact: "613-555-0161".to_string(),
        category: ListingCategory::CafesCoffeeShops,
        details: ListingDetails::Food(FoodListing {
            business_name: business.to_string(),
            location: "41 Harbour Front".to_string(),
            hours: "6:30-4 daily".to_string(),
            local_sourcing: "Beans roasted two blocks away".to_string(),
            veg_vegan: "Oat milk everything".to_string(),
            green_plate: GreenPlateCertification::Gold,
            notes: "Patio opens in May".to_string(),
        }),
    }
}

fn sample_shop_application(email: &str, store: &str) -> ApplicationSubmission {
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
