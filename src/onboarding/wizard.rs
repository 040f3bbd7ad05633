//! Four-step onboarding wizard
//!
//! Collects study preferences one screen at a time. Each screen has a
//! validity predicate that gates `next`; finishing the last screen produces
//! the learner profile together with the recommended starter topic.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{FieldError, TutorError};
use crate::onboarding::recommend::recommend_topic;
use crate::types::{StudyFormat, Subject};

pub const TOTAL_STEPS: u8 = 4;

/// Upper bound for daily study hours
pub const MAX_DAILY_HOURS: f64 = 24.0;

/// One wizard screen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum WizardStep {
    StudyTime,
    Format,
    WeakSubject,
    Confidence,
}

impl WizardStep {
    /// 1-based screen number
    pub fn number(self) -> u8 {
        match self {
            WizardStep::StudyTime => 1,
            WizardStep::Format => 2,
            WizardStep::WeakSubject => 3,
            WizardStep::Confidence => 4,
        }
    }

    fn from_number(n: u8) -> Option<Self> {
        match n {
            1 => Some(WizardStep::StudyTime),
            2 => Some(WizardStep::Format),
            3 => Some(WizardStep::WeakSubject),
            4 => Some(WizardStep::Confidence),
            _ => None,
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            WizardStep::StudyTime => "How many hours can you study daily?",
            WizardStep::Format => "How do you learn best?",
            WizardStep::WeakSubject => "Which subject challenges you most?",
            WizardStep::Confidence => "How confident are you about the exam?",
        }
    }
}

/// Answers collected so far
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OnboardingForm {
    #[serde(default = "default_hours")]
    pub daily_study_time: f64,
    #[serde(default)]
    pub preferred_format: Option<StudyFormat>,
    #[serde(default)]
    pub weak_subject: Option<Subject>,
    #[serde(default = "default_confidence")]
    pub confidence: u8,
    #[serde(default)]
    pub exam_date: Option<NaiveDate>,
}

fn default_hours() -> f64 {
    2.0
}

fn default_confidence() -> u8 {
    3
}

impl Default for OnboardingForm {
    fn default() -> Self {
        Self {
            daily_study_time: default_hours(),
            preferred_format: None,
            weak_subject: None,
            confidence: default_confidence(),
            exam_date: None,
        }
    }
}

/// Validated answers written into the user record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OnboardingProfile {
    pub daily_study_time: f64,
    pub preferred_format: StudyFormat,
    pub weak_subject: Subject,
    pub confidence: u8,
    #[serde(default)]
    pub exam_date: Option<NaiveDate>,
}

/// Result of finishing the wizard
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OnboardingOutcome {
    pub profile: OnboardingProfile,
    pub recommended_topic: String,
}

/// What `next` did
#[derive(Debug, Clone, PartialEq)]
pub enum WizardAdvance {
    Moved(WizardStep),
    Finished(OnboardingOutcome),
}

pub fn validate_hours(hours: f64) -> Option<FieldError> {
    if hours.is_finite() && hours > 0.0 && hours <= MAX_DAILY_HOURS {
        None
    } else {
        Some(FieldError::new(
            "dailyStudyTime",
            "Daily study time must be more than 0 and at most 24 hours",
        ))
    }
}

pub fn validate_confidence(confidence: u8) -> Option<FieldError> {
    if (1..=5).contains(&confidence) {
        None
    } else {
        Some(FieldError::new("confidence", "Confidence must be between 1 and 5"))
    }
}

/// Label shown under the confidence slider
pub fn confidence_label(confidence: u8) -> &'static str {
    match confidence {
        0..=2 => "Need more preparation",
        3 => "Moderately confident",
        _ => "Very confident",
    }
}

/// Wizard session state
#[derive(Debug, Clone)]
pub struct OnboardingWizard {
    current: u8,
    form: OnboardingForm,
}

impl Default for OnboardingWizard {
    fn default() -> Self {
        Self::new()
    }
}

impl OnboardingWizard {
    pub fn new() -> Self {
        Self {
            current: 1,
            form: OnboardingForm::default(),
        }
    }

    /// Start from answers gathered elsewhere (CLI flags, an HTTP body)
    pub fn with_form(form: OnboardingForm) -> Self {
        Self { current: 1, form }
    }

    pub fn current_step(&self) -> WizardStep {
        WizardStep::from_number(self.current.clamp(1, TOTAL_STEPS)).unwrap_or(WizardStep::StudyTime)
    }

    pub fn form(&self) -> &OnboardingForm {
        &self.form
    }

    pub fn form_mut(&mut self) -> &mut OnboardingForm {
        &mut self.form
    }

    /// Wizard completion bar, 25 to 100
    pub fn progress_percent(&self) -> f64 {
        self.current_step().number() as f64 / TOTAL_STEPS as f64 * 100.0
    }

    /// Validation errors for the given screen
    fn step_errors(&self, step: WizardStep) -> Option<FieldError> {
        match step {
            WizardStep::StudyTime => validate_hours(self.form.daily_study_time),
            WizardStep::Format => self
                .form
                .preferred_format
                .is_none()
                .then(|| FieldError::new("preferredFormat", "Select your preferred format")),
            WizardStep::WeakSubject => self
                .form
                .weak_subject
                .is_none()
                .then(|| FieldError::new("weakSubject", "Select your challenging subject")),
            WizardStep::Confidence => validate_confidence(self.form.confidence),
        }
    }

    pub fn is_step_valid(&self) -> bool {
        self.step_errors(self.current_step()).is_none()
    }

    /// Go back one screen; stays put on the first
    pub fn back(&mut self) -> WizardStep {
        if self.current > 1 {
            self.current -= 1;
        }
        self.current_step()
    }

    /// Advance, or finish on the last screen
    pub fn next(&mut self) -> Result<WizardAdvance, TutorError> {
        let step = self.current_step();
        if let Some(error) = self.step_errors(step) {
            return Err(TutorError::Validation(vec![error]));
        }
        if step.number() < TOTAL_STEPS {
            self.current += 1;
            debug!("Onboarding moved to step {}", self.current);
            return Ok(WizardAdvance::Moved(self.current_step()));
        }
        self.finish().map(WizardAdvance::Finished)
    }

    fn finish(&self) -> Result<OnboardingOutcome, TutorError> {
        let mut errors = Vec::new();
        for step in [
            WizardStep::StudyTime,
            WizardStep::Format,
            WizardStep::WeakSubject,
            WizardStep::Confidence,
        ] {
            errors.extend(self.step_errors(step));
        }
        let (Some(preferred_format), Some(weak_subject)) =
            (self.form.preferred_format, self.form.weak_subject)
        else {
            return Err(TutorError::Validation(errors));
        };
        if !errors.is_empty() {
            return Err(TutorError::Validation(errors));
        }

        Ok(OnboardingOutcome {
            recommended_topic: recommend_topic(Some(weak_subject)).to_string(),
            profile: OnboardingProfile {
                daily_study_time: self.form.daily_study_time,
                preferred_format,
                weak_subject,
                confidence: self.form.confidence,
                exam_date: self.form.exam_date,
            },
        })
    }

    /// Drive every screen in order with the current answers
    pub fn run_to_completion(mut self) -> Result<OnboardingOutcome, TutorError> {
        loop {
            if let WizardAdvance::Finished(outcome) = self.next()? {
                return Ok(outcome);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filled_form() -> OnboardingForm {
        OnboardingForm {
            daily_study_time: 3.5,
            preferred_format: Some(StudyFormat::Kinesthetic),
            weak_subject: Some(Subject::Biology),
            confidence: 2,
            exam_date: NaiveDate::from_ymd_opt(2027, 5, 2),
        }
    }

    #[test]
    fn test_starts_on_first_step_with_defaults() {
        let wizard = OnboardingWizard::new();
        assert_eq!(wizard.current_step(), WizardStep::StudyTime);
        assert_eq!(wizard.form().daily_study_time, 2.0);
        assert_eq!(wizard.form().confidence, 3);
        assert_eq!(wizard.progress_percent(), 25.0);
    }

    #[test]
    fn test_next_is_gated_by_validity() {
        let mut wizard = OnboardingWizard::new();
        assert_eq!(wizard.next().unwrap(), WizardAdvance::Moved(WizardStep::Format));
        assert!(!wizard.is_step_valid());
        let err = wizard.next().unwrap_err();
        assert_eq!(err.field_errors()[0].field, "preferredFormat");
        assert_eq!(wizard.current_step(), WizardStep::Format);

        wizard.form_mut().preferred_format = Some(StudyFormat::Visual);
        assert_eq!(wizard.next().unwrap(), WizardAdvance::Moved(WizardStep::WeakSubject));
    }

    #[test]
    fn test_back_stops_at_first_step() {
        let mut wizard = OnboardingWizard::with_form(filled_form());
        wizard.next().unwrap();
        assert_eq!(wizard.back(), WizardStep::StudyTime);
        assert_eq!(wizard.back(), WizardStep::StudyTime);
    }

    #[test]
    fn test_finishing_recommends_topic() {
        let outcome = OnboardingWizard::with_form(filled_form()).run_to_completion().unwrap();
        assert_eq!(outcome.recommended_topic, "biology-genetics");
        assert_eq!(outcome.profile.weak_subject, Subject::Biology);
        assert_eq!(outcome.profile.confidence, 2);
    }

    #[test]
    fn test_zero_hours_rejected() {
        let mut form = filled_form();
        form.daily_study_time = 0.0;
        let err = OnboardingWizard::with_form(form).run_to_completion().unwrap_err();
        assert_eq!(err.field_errors()[0].field, "dailyStudyTime");
    }

    #[test]
    fn test_confidence_labels() {
        assert_eq!(confidence_label(1), "Need more preparation");
        assert_eq!(confidence_label(2), "Need more preparation");
        assert_eq!(confidence_label(3), "Moderately confident");
        assert_eq!(confidence_label(5), "Very confident");
    }
}
