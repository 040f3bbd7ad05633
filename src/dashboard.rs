//! Dashboard summary over the store and the catalog

use serde::Serialize;

use crate::catalog;
use crate::error::TutorError;
use crate::routes::Route;
use crate::store::{AppState, Progress};
use crate::types::Subject;

/// Aggregate numbers over all progress records
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressStats {
    pub completed_topics: usize,
    pub topics_started: usize,
    /// Hours
    pub total_study_time: f64,
    pub average_accuracy: f64,
}

impl ProgressStats {
    pub fn from_progress(progress: &[Progress]) -> Self {
        let completed_topics = progress.iter().filter(|p| p.is_complete()).count();
        let total_study_time = progress.iter().map(|p| p.time_spent).sum();
        let accuracy_sum: f64 = progress.iter().map(|p| p.accuracy).sum();
        Self {
            completed_topics,
            topics_started: progress.len(),
            total_study_time,
            average_accuracy: accuracy_sum / progress.len().max(1) as f64,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubjectProgress {
    pub subject: Subject,
    pub completed: usize,
    pub total: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrentTopicProgress {
    pub id: String,
    pub name: String,
    pub percent: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSummary {
    pub user_name: String,
    #[serde(flatten)]
    pub stats: ProgressStats,
    pub subjects: Vec<SubjectProgress>,
    pub current_topic: Option<CurrentTopicProgress>,
    #[serde(rename = "isVRMode")]
    pub is_vr_mode: bool,
}

/// Completed vs. total topics per subject, in catalog order
pub fn subject_breakdown(state: &AppState) -> Vec<SubjectProgress> {
    let mut subjects: Vec<SubjectProgress> = Vec::new();
    for topic in catalog::topics() {
        let done = state
            .progress_for(&topic.id)
            .map(|p| p.is_complete())
            .unwrap_or(false) as usize;
        match subjects.iter_mut().find(|s| s.subject == topic.subject) {
            Some(entry) => {
                entry.completed += done;
                entry.total += 1;
            }
            None => subjects.push(SubjectProgress {
                subject: topic.subject,
                completed: done,
                total: 1,
            }),
        }
    }
    subjects
}

impl DashboardSummary {
    /// Build the summary; requires an onboarded user
    pub fn build(state: &AppState) -> Result<Self, TutorError> {
        let user = state
            .user
            .as_ref()
            .filter(|u| u.onboarding_completed)
            .ok_or(TutorError::Redirect(Route::Onboarding))?;

        let current_topic = state.current_topic.as_deref().map(|id| CurrentTopicProgress {
            id: id.to_string(),
            name: catalog::display_name(id).to_string(),
            percent: state.progress_for(id).map(|p| p.completion_percent()).unwrap_or(0.0),
        });

        Ok(Self {
            user_name: user.name.clone(),
            stats: ProgressStats::from_progress(&state.progress),
            subjects: subject_breakdown(state),
            current_topic,
            is_vr_mode: state.is_vr_mode,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::learning::Step;
    use crate::store::StepData;
    use crate::types::User;

    fn onboarded() -> AppState {
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
        state
    }

    #[test]
    fn test_empty_progress_averages_to_zero() {
        let stats = ProgressStats::from_progress(&[]);
        assert_eq!(stats.completed_topics, 0);
        assert_eq!(stats.average_accuracy, 0.0);
    }

    #[test]
    fn test_summary_counts_completed_topics() {
        let mut state = onboarded();
        state.set_current_topic("physics-waves");
        for step in Step::ORDER {
            state.update_progress("physics-waves", step, &StepData::default()).unwrap();
        }
        state
            .update_progress("physics-waves", Step::Quiz, &StepData::quiz(80.0, 4.0))
            .unwrap();
        state
            .update_progress("biology-genetics", Step::Quiz, &StepData::quiz(60.0, 1.5))
            .unwrap();

        let summary = DashboardSummary::build(&state).unwrap();
        assert_eq!(summary.stats.completed_topics, 1);
        assert_eq!(summary.stats.topics_started, 2);
        assert_eq!(summary.stats.total_study_time, 5.5);
        assert_eq!(summary.stats.average_accuracy, 70.0);
        assert_eq!(summary.current_topic.unwrap().percent, 100.0);

        let physics = summary.subjects.iter().find(|s| s.subject == Subject::Physics).unwrap();
        assert_eq!(physics.completed, 1);
        let chemistry = summary.subjects.iter().find(|s| s.subject == Subject::Chemistry).unwrap();
        assert_eq!(chemistry.total, 2);
    }

    #[test]
    fn test_requires_onboarding() {
        assert_eq!(
            DashboardSummary::build(&AppState::default()).unwrap_err(),
            TutorError::Redirect(Route::Onboarding)
        );
    }
}
