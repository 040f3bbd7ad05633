//! Application state and its mutation actions
//!
//! Every action is a synchronous, self-contained mutation of [`AppState`].
//! Persistence is handled one level up by [`crate::store::TutorState`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{FieldError, TutorError};
use crate::learning::Step;
use crate::onboarding::OnboardingProfile;
use crate::types::User;
use crate::vr::VrSession;

/// Optional payload merged into a progress record when a step completes
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StepData {
    /// Percentage, 0 to 100
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accuracy: Option<f64>,
    /// Hours
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_spent: Option<f64>,
}

impl StepData {
    pub fn quiz(accuracy: f64, time_spent: f64) -> Self {
        Self {
            accuracy: Some(accuracy),
            time_spent: Some(time_spent),
        }
    }

    pub fn validate(&self) -> Result<(), TutorError> {
        let mut errors = Vec::new();
        if let Some(accuracy) = self.accuracy {
            if !(0.0..=100.0).contains(&accuracy) {
                errors.push(FieldError::new("accuracy", "Accuracy must be between 0 and 100"));
            }
        }
        if let Some(time_spent) = self.time_spent {
            if !time_spent.is_finite() || time_spent < 0.0 {
                errors.push(FieldError::new("timeSpent", "Time spent cannot be negative"));
            }
        }
        if errors.is_empty() {
            Ok(())
        } else {
            Err(TutorError::Validation(errors))
        }
    }
}

/// Per-topic learning state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Progress {
    pub topic_id: String,
    /// Deduplicated, in order of first completion
    pub completed_steps: Vec<Step>,
    pub current_step: Step,
    #[serde(default)]
    pub accuracy: f64,
    /// Hours
    #[serde(default)]
    pub time_spent: f64,
    pub last_accessed: DateTime<Utc>,
}

impl Progress {
    pub fn has_completed(&self, step: Step) -> bool {
        self.completed_steps.contains(&step)
    }

    /// True once all five steps have been completed at least once
    pub fn is_complete(&self) -> bool {
        Step::ORDER.iter().all(|s| self.has_completed(*s))
    }

    /// Share of completed steps, 0 to 100
    pub fn completion_percent(&self) -> f64 {
        self.completed_steps.len() as f64 / Step::ORDER.len() as f64 * 100.0
    }

    fn merge(&mut self, data: &StepData) {
        if let Some(accuracy) = data.accuracy {
            self.accuracy = accuracy;
        }
        if let Some(time_spent) = data.time_spent {
            self.time_spent = time_spent;
        }
    }
}

fn default_demo_mode() -> bool {
    true
}

/// Everything the tutor remembers between runs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppState {
    #[serde(default)]
    pub user: Option<User>,
    #[serde(default)]
    pub current_topic: Option<String>,
    #[serde(default)]
    pub progress: Vec<Progress>,
    #[serde(default, rename = "isVRMode")]
    pub is_vr_mode: bool,
    #[serde(default = "default_demo_mode")]
    pub demo_mode: bool,
    #[serde(default)]
    pub vr: VrSession,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            user: None,
            current_topic: None,
            progress: Vec::new(),
            is_vr_mode: false,
            demo_mode: default_demo_mode(),
            vr: VrSession::default(),
        }
    }
}

impl AppState {
    pub fn set_user(&mut self, user: User) {
        debug!("User set: {}", user.id);
        self.user = Some(user);
    }

    /// Drop the user reference and the current topic; progress is kept
    pub fn logout(&mut self) {
        if let Some(user) = self.user.take() {
            info!("User {} logged out", user.id);
        }
        self.current_topic = None;
    }

    /// Select the active topic and reset the VR session for it
    ///
    /// Returns the VR session generation, used to discard late flashcard loads.
    pub fn set_current_topic(&mut self, topic_id: &str) -> u64 {
        self.current_topic = Some(topic_id.to_string());
        self.vr.reset_for_topic(topic_id)
    }

    pub fn progress_for(&self, topic_id: &str) -> Option<&Progress> {
        self.progress.iter().find(|p| p.topic_id == topic_id)
    }

    /// Record completion of `step` for `topic_id`
    ///
    /// Upserts the single progress record for the topic: the step joins the
    /// completed set once, payload fields are merged, `current_step` moves to
    /// the successor unless `step` is terminal, and `last_accessed` is bumped.
    pub fn update_progress(
        &mut self,
        topic_id: &str,
        step: Step,
        data: &StepData,
    ) -> Result<Progress, TutorError> {
        let topic_id = topic_id.trim();
        if topic_id.is_empty() {
            return Err(TutorError::invalid("topicId", "Topic id must not be empty"));
        }
        data.validate()?;

        let now = Utc::now();
        match self.progress.iter_mut().find(|p| p.topic_id == topic_id) {
            Some(record) => {
                if !record.has_completed(step) {
                    record.completed_steps.push(step);
                }
                if let Some(next) = step.next() {
                    record.current_step = next;
                }
                record.merge(data);
                record.last_accessed = now;
                debug!("Progress updated: {} {} -> {}", topic_id, step, record.current_step);
                Ok(record.clone())
            }
            None => {
                let record = Progress {
                    topic_id: topic_id.to_string(),
                    completed_steps: vec![step],
                    current_step: step.next().unwrap_or(step),
                    accuracy: data.accuracy.unwrap_or(0.0),
                    time_spent: data.time_spent.unwrap_or(0.0),
                    last_accessed: now,
                };
                info!("Progress started for {} at {}", topic_id, step);
                self.progress.push(record.clone());
                Ok(record)
            }
        }
    }

    /// Flip VR mode and return the new value
    pub fn toggle_vr_mode(&mut self) -> bool {
        self.is_vr_mode = !self.is_vr_mode;
        self.is_vr_mode
    }

    pub fn set_demo_mode(&mut self, enabled: bool) {
        self.demo_mode = enabled;
    }

    /// Merge onboarding answers into the user and mark onboarding done
    ///
    /// Returns false when nobody is signed in.
    pub fn complete_onboarding(&mut self, profile: &OnboardingProfile) -> bool {
        let Some(user) = self.user.as_mut() else {
            return false;
        };
        user.daily_study_time = profile.daily_study_time;
        user.preferred_format = Some(profile.preferred_format);
        user.weak_subject = Some(profile.weak_subject);
        user.confidence = profile.confidence;
        user.exam_date = profile.exam_date;
        user.onboarding_completed = true;
        true
    }

    pub fn is_onboarded(&self) -> bool {
        self.user.as_ref().map(|u| u.onboarding_completed).unwrap_or(false)
    }
}
