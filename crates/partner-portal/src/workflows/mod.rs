pub mod moderation;
pub mod onboarding;
