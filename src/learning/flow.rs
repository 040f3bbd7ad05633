//! Learning flow session for the current topic
//!
//! The flow is what the learner sees on `/learn`: the active step, the step
//! indicator, and the progress bar. Entering it restores the active step from
//! the stored `current_step`; revisiting an earlier step changes only the
//! view, never the stored forward position.

use serde::Serialize;
use tracing::debug;

use crate::catalog::{self, Topic};
use crate::error::TutorError;
use crate::learning::Step;
use crate::routes::Route;
use crate::store::{AppState, Progress};

/// How a step is drawn on the indicator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StepStatus {
    Completed,
    Current,
    Pending,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StepIndicator {
    pub step: Step,
    pub label: &'static str,
    pub status: StepStatus,
}

#[derive(Debug, Clone)]
pub struct LearningFlow {
    topic: Topic,
    active_step: Step,
    progress: Option<Progress>,
}

impl LearningFlow {
    /// Open the flow for the current topic
    ///
    /// Without an onboarded user or a current topic the learner is sent to
    /// onboarding.
    pub fn enter(state: &AppState) -> Result<Self, TutorError> {
        if !state.is_onboarded() {
            return Err(TutorError::Redirect(Route::Onboarding));
        }
        let topic_id = state
            .current_topic
            .as_deref()
            .ok_or(TutorError::Redirect(Route::Onboarding))?;
        let topic = catalog::find(topic_id)
            .cloned()
            .ok_or_else(|| TutorError::UnknownTopic(topic_id.to_string()))?;

        let progress = state.progress_for(topic_id).cloned();
        let active_step = progress.as_ref().map(|p| p.current_step).unwrap_or(Step::Topic);
        debug!("Entering learning flow for {} at {}", topic.id, active_step);

        Ok(Self {
            topic,
            active_step,
            progress,
        })
    }

    /// Open the flow at a deep-linked step such as `/learn#quiz`
    pub fn enter_at(state: &AppState, fragment: Option<&str>) -> Result<Self, TutorError> {
        let mut flow = Self::enter(state)?;
        if let Some(fragment) = fragment.filter(|f| !f.is_empty()) {
            flow.revisit(fragment.parse()?);
        }
        Ok(flow)
    }

    pub fn topic(&self) -> &Topic {
        &self.topic
    }

    pub fn active_step(&self) -> Step {
        self.active_step
    }

    pub fn progress(&self) -> Option<&Progress> {
        self.progress.as_ref()
    }

    /// Show a different step without touching stored progress
    pub fn revisit(&mut self, step: Step) {
        self.active_step = step;
    }

    /// Fold a freshly stored record into the view and move past `step`
    pub fn record_completion(&mut self, step: Step, progress: Progress) {
        if let Some(next) = step.next() {
            self.active_step = next;
        }
        self.progress = Some(progress);
    }

    pub fn progress_percent(&self) -> f64 {
        self.active_step.progress_percent()
    }

    pub fn indicator(&self) -> Vec<StepIndicator> {
        Step::ORDER
            .iter()
            .map(|&step| {
                let completed = self
                    .progress
                    .as_ref()
                    .map(|p| p.has_completed(step))
                    .unwrap_or(false);
                let status = if completed {
                    StepStatus::Completed
                } else if step == self.active_step {
                    StepStatus::Current
                } else {
                    StepStatus::Pending
                };
                StepIndicator {
                    step,
                    label: step.label(),
                    status,
                }
            })
            .collect()
    }

    /// Prompt for the action that completes the active step
    pub fn call_to_action(&self) -> &'static str {
        match self.active_step {
            Step::Topic => "Start Learning",
            Step::Flashcards => "Complete Flashcards",
            Step::Video => "Complete Video",
            Step::Quiz => "Complete Quiz",
            Step::Analysis => "View Analysis",
        }
    }

    pub fn view(&self) -> FlowView {
        FlowView {
            topic: self.topic.clone(),
            active_step: self.active_step,
            progress_percent: self.progress_percent(),
            call_to_action: self.call_to_action(),
            steps: self.indicator(),
            progress: self.progress.clone(),
        }
    }
}

/// Serializable snapshot of the flow
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FlowView {
    pub topic: Topic,
    pub active_step: Step,
    pub progress_percent: f64,
    pub call_to_action: &'static str,
    pub steps: Vec<StepIndicator>,
    pub progress: Option<Progress>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::StepData;
    use crate::types::User;

    fn onboarded_state(topic: &str) -> AppState {
        let mut state = AppState::default();
        state.set_user(User {
            id: "demo-user-1".into(),
            email: "learner@example.com".into(),
            name: "learner".into(),
            daily_study_time: 2.0,
            preferred_format: None,
            weak_subject: None,
            confidence: 3,
            exam_date: None,
            vr_enabled: true,
            onboarding_completed: true,
        });
        state.set_current_topic(topic);
        state
    }

    #[test]
    fn test_fresh_topic_starts_at_topic_step() {
        let state = onboarded_state("physics-waves");
        let flow = LearningFlow::enter(&state).unwrap();
        assert_eq!(flow.active_step(), Step::Topic);
        assert_eq!(flow.progress_percent(), 20.0);
        assert_eq!(flow.call_to_action(), "Start Learning");
    }

    #[test]
    fn test_resumes_from_stored_current_step() {
        let mut state = onboarded_state("physics-waves");
        state.update_progress("physics-waves", Step::Flashcards, &StepData::default()).unwrap();
        let flow = LearningFlow::enter(&state).unwrap();
        assert_eq!(flow.active_step(), Step::Video);
    }

    #[test]
    fn test_missing_prerequisites_redirect_to_onboarding() {
        let mut state = onboarded_state("physics-waves");
        state.current_topic = None;
        assert_eq!(
            LearningFlow::enter(&state).unwrap_err(),
            TutorError::Redirect(Route::Onboarding)
        );

        let mut state = AppState::default();
        state.set_current_topic("physics-waves");
        assert_eq!(
            LearningFlow::enter(&state).unwrap_err(),
            TutorError::Redirect(Route::Onboarding)
        );
    }

    #[test]
    fn test_unknown_topic_is_reported() {
        let state = onboarded_state("astronomy-stars");
        assert_eq!(
            LearningFlow::enter(&state).unwrap_err(),
            TutorError::UnknownTopic("astronomy-stars".into())
        );
    }

    #[test]
    fn test_revisit_keeps_stored_position() {
        let mut state = onboarded_state("chemistry-organic");
        for step in [Step::Topic, Step::Flashcards, Step::Video] {
            state.update_progress("chemistry-organic", step, &StepData::default()).unwrap();
        }
        let mut flow = LearningFlow::enter(&state).unwrap();
        flow.revisit(Step::Flashcards);
        assert_eq!(flow.active_step(), Step::Flashcards);
        assert_eq!(state.progress_for("chemistry-organic").unwrap().current_step, Step::Quiz);
    }

    #[test]
    fn test_deep_link_fragment() {
        let state = onboarded_state("physics-waves");
        let flow = LearningFlow::enter_at(&state, Some("quiz")).unwrap();
        assert_eq!(flow.active_step(), Step::Quiz);
        assert!(LearningFlow::enter_at(&state, Some("lab")).is_err());
    }

    #[test]
    fn test_indicator_marks_completed_current_and_pending() {
        let mut state = onboarded_state("physics-waves");
        let record = state.update_progress("physics-waves", Step::Topic, &StepData::default()).unwrap();
        let mut flow = LearningFlow::enter(&state).unwrap();
        flow.record_completion(Step::Topic, record);

        let statuses: Vec<StepStatus> = flow.indicator().iter().map(|i| i.status).collect();
        assert_eq!(
            statuses,
            vec![
                StepStatus::Completed,
                StepStatus::Current,
                StepStatus::Pending,
                StepStatus::Pending,
                StepStatus::Pending,
            ]
        );
        assert_eq!(flow.indicator()[1].label, "Cards");
    }
}
