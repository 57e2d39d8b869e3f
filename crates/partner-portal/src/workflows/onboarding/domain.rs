use std::fmt;

use serde::{Deserialize, Serialize};

/// Number of roadmap steps; the final one is the license upload.
pub const STEP_COUNT: u8 = 7;
pub const LICENSE_STEP: u8 = 7;

/// Unique partner key. Emails are compared case-insensitively, so the key is
/// normalized at construction.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PartnerId(String);

impl PartnerId {
    pub fn from_email(email: &str) -> Self {
        Self(email.trim().to_ascii_lowercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PartnerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Fixed roadmap template. Step 1 is satisfied at profile creation; the final
/// step only completes through the verification transition.
#[derive(Debug, Clone, Copy)]
pub struct StepTemplate {
    pub ordinal: u8,
    pub label: &'static str,
    pub auto_completed: bool,
}

pub const ROADMAP: [StepTemplate; STEP_COUNT as usize] = [
    StepTemplate {
        ordinal: 1,
        label: "Create your partner account",
        auto_completed: true,
    },
    StepTemplate {
        ordinal: 2,
        label: "Complete your business profile",
        auto_completed: false,
    },
    StepTemplate {
        ordinal: 3,
        label: "Add business description & category",
        auto_completed: false,
    },
    StepTemplate {
        ordinal: 4,
        label: "Confirm contact details",
        auto_completed: false,
    },
    StepTemplate {
        ordinal: 5,
        label: "Review sustainability commitment",
        auto_completed: false,
    },
    StepTemplate {
        ordinal: 6,
        label: "Accept terms and conditions",
        auto_completed: false,
    },
    StepTemplate {
        ordinal: 7,
        label: "Upload your city license to go live",
        auto_completed: false,
    },
];

/// Partner onboarding state mirrored from the profile store.
///
/// `progress` is non-decreasing over the profile's lifetime and `verified`
/// holds exactly when the final step is complete.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartnerProfile {
    pub partner: PartnerId,
    pub progress: u8,
    pub verified: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub business_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
}

impl PartnerProfile {
    /// A freshly provisioned profile: step 1 is implicitly satisfied.
    pub fn new(partner: PartnerId) -> Self {
        Self {
            partner,
            progress: 1,
            verified: false,
            business_name: None,
            display_name: None,
        }
    }

    /// Steps already done, plus exactly the next pending one, are actionable.
    pub fn step_unlocked(&self, ordinal: u8) -> bool {
        ordinal <= self.progress + 1
    }

    pub fn license_step_unlocked(&self) -> bool {
        self.progress >= LICENSE_STEP - 1
    }

    pub fn strength_percent(&self) -> u8 {
        (f32::from(self.progress) / f32::from(STEP_COUNT) * 100.0).round() as u8
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepState {
    Completed,
    Actionable,
    Locked,
}

impl StepState {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Completed => "Completed",
            Self::Actionable => "Actionable",
            Self::Locked => "Locked",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct StepView {
    pub ordinal: u8,
    pub label: &'static str,
    pub state: StepState,
    pub state_label: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct DashboardView {
    pub partner: PartnerId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub business_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    pub progress: u8,
    pub verified: bool,
    pub strength_percent: u8,
    pub steps: Vec<StepView>,
}

impl DashboardView {
    pub fn from_profile(profile: &PartnerProfile) -> Self {
        let steps = ROADMAP
            .iter()
            .map(|template| {
                let state = step_state(profile, template);
                StepView {
                    ordinal: template.ordinal,
                    label: template.label,
                    state,
                    state_label: state.label(),
                }
            })
            .collect();

        Self {
            partner: profile.partner.clone(),
            business_name: profile.business_name.clone(),
            display_name: profile.display_name.clone(),
            progress: profile.progress,
            verified: profile.verified,
            strength_percent: profile.strength_percent(),
            steps,
        }
    }
}

fn step_state(profile: &PartnerProfile, template: &StepTemplate) -> StepState {
    if template.auto_completed || profile.progress >= template.ordinal {
        return StepState::Completed;
    }

    if template.ordinal == LICENSE_STEP {
        if profile.license_step_unlocked() {
            StepState::Actionable
        } else {
            StepState::Locked
        }
    } else if template.ordinal == profile.progress + 1 {
        StepState::Actionable
    } else {
        StepState::Locked
    }
}
