//! The five stages of a topic's learning journey

use serde::{Deserialize, Serialize};

use crate::error::TutorError;

/// One stage of the fixed sequence `topic → flashcards → video → quiz → analysis`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Step {
    Topic,
    Flashcards,
    Video,
    Quiz,
    Analysis,
}

impl Step {
    /// Fixed stage order
    pub const ORDER: [Step; 5] = [
        Step::Topic,
        Step::Flashcards,
        Step::Video,
        Step::Quiz,
        Step::Analysis,
    ];

    pub fn index(self) -> usize {
        match self {
            Step::Topic => 0,
            Step::Flashcards => 1,
            Step::Video => 2,
            Step::Quiz => 3,
            Step::Analysis => 4,
        }
    }

    /// Successor in the fixed order, `None` for the terminal stage
    pub fn next(self) -> Option<Step> {
        Step::ORDER.get(self.index() + 1).copied()
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Step::Topic => "topic",
            Step::Flashcards => "flashcards",
            Step::Video => "video",
            Step::Quiz => "quiz",
            Step::Analysis => "analysis",
        }
    }

    /// Short label for the step indicator
    pub fn label(self) -> &'static str {
        match self {
            Step::Topic => "Topic",
            Step::Flashcards => "Cards",
            Step::Video => "Video",
            Step::Quiz => "Quiz",
            Step::Analysis => "Analysis",
        }
    }

    /// Percentage shown on the progress bar when this step is active
    pub fn progress_percent(self) -> f64 {
        (self.index() + 1) as f64 / Step::ORDER.len() as f64 * 100.0
    }
}

impl std::str::FromStr for Step {
    type Err = TutorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "topic" => Ok(Step::Topic),
            "flashcards" => Ok(Step::Flashcards),
            "video" => Ok(Step::Video),
            "quiz" => Ok(Step::Quiz),
            "analysis" => Ok(Step::Analysis),
            other => Err(TutorError::UnknownStep(other.to_string())),
        }
    }
}

impl std::fmt::Display for Step {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_labels_follow_fixed_order() {
        assert_eq!(
            Step::ORDER.map(Step::label),
            ["Topic", "Cards", "Video", "Quiz", "Analysis"]
        );
    }

    #[test]
    fn test_next_follows_fixed_order() {
        assert_eq!(Step::Topic.next(), Some(Step::Flashcards));
        assert_eq!(Step::Flashcards.next(), Some(Step::Video));
        assert_eq!(Step::Video.next(), Some(Step::Quiz));
        assert_eq!(Step::Quiz.next(), Some(Step::Analysis));
        assert_eq!(Step::Analysis.next(), None);
    }

    #[test]
    fn test_parse_rejects_unknown_names() {
        assert_eq!("quiz".parse::<Step>().unwrap(), Step::Quiz);
        assert_eq!(
            "homework".parse::<Step>(),
            Err(TutorError::UnknownStep("homework".to_string()))
        );
        assert!("Quiz".parse::<Step>().is_err());
    }

    #[test]
    fn test_progress_percent() {
        assert_eq!(Step::Topic.progress_percent(), 20.0);
        assert_eq!(Step::Video.progress_percent(), 60.0);
        assert_eq!(Step::Analysis.progress_percent(), 100.0);
    }
}
