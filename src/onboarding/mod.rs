//! Onboarding: preference wizard and starter topic recommendation

pub mod recommend;
pub mod wizard;

pub use recommend::{recommend_topic, recommend_topic_for, DEFAULT_TOPIC};
pub use wizard::{
    confidence_label, OnboardingForm, OnboardingOutcome, OnboardingProfile, OnboardingWizard,
    WizardAdvance, WizardStep,
};
