//! VR session state: current topic, video progress, unlock flags
//!
//! The session is part of [`crate::store::AppState`], so the VR scene and the
//! learning flow always agree on the current topic.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::catalog;
use crate::flashcards::Flashcard;

pub const DEFAULT_VR_TOPIC: &str = "organic-chemistry-basics";

/// Fronts listed on the flashcards panel
const PANEL_CARD_LIMIT: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Unlocks {
    pub quiz: bool,
    pub video: bool,
    pub flashcards: bool,
}

impl Default for Unlocks {
    fn default() -> Self {
        Self {
            quiz: false,
            video: true,
            flashcards: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VrSession {
    pub current_topic: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub topic_name: Option<String>,
    #[serde(default)]
    pub video_progress: f64,
    #[serde(default)]
    pub unlocked: Unlocks,
    #[serde(default)]
    pub topics_completed: Vec<String>,
    #[serde(default)]
    pub flashcards: Vec<Flashcard>,
    /// Bumped on every topic switch; not persisted
    #[serde(skip)]
    generation: u64,
}

impl Default for VrSession {
    fn default() -> Self {
        Self {
            current_topic: DEFAULT_VR_TOPIC.to_string(),
            topic_name: None,
            video_progress: 0.0,
            unlocked: Unlocks::default(),
            topics_completed: Vec::new(),
            flashcards: Vec::new(),
            generation: 0,
        }
    }
}

impl VrSession {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Switch topic: quiz locks again, video progress and cards reset
    pub fn reset_for_topic(&mut self, topic_id: &str) -> u64 {
        self.current_topic = topic_id.to_string();
        self.topic_name = None;
        self.unlocked.quiz = false;
        self.video_progress = 0.0;
        self.flashcards.clear();
        self.generation += 1;
        debug!("VR session reset for {} (generation {})", topic_id, self.generation);
        self.generation
    }

    /// Record video progress; returns true when this call unlocked the quiz
    ///
    /// The unlock is one-way for the lifetime of the topic.
    pub fn on_video_progress(&mut self, percent: f64, threshold: f64) -> bool {
        if percent.is_nan() {
            return false;
        }
        self.video_progress = percent;
        if percent >= threshold && !self.unlocked.quiz {
            self.unlocked.quiz = true;
            info!("Quiz unlocked for {} at {}%", self.current_topic, percent);
            return true;
        }
        false
    }

    /// Add the current topic to the completed set; false if it was already there
    pub fn mark_topic_complete(&mut self) -> bool {
        if self.is_current_complete() {
            return false;
        }
        self.topics_completed.push(self.current_topic.clone());
        info!("VR topic {} marked complete", self.current_topic);
        true
    }

    pub fn is_current_complete(&self) -> bool {
        self.topics_completed.contains(&self.current_topic)
    }

    pub fn unlock_all(&mut self) {
        self.unlocked = Unlocks {
            quiz: true,
            video: true,
            flashcards: true,
        };
    }

    /// Store loaded cards unless the topic changed since the load started
    pub fn apply_flashcards(&mut self, generation: u64, cards: Vec<Flashcard>) -> bool {
        if generation != self.generation {
            return false;
        }
        self.flashcards = cards;
        true
    }

    pub fn display_name(&self) -> String {
        self.topic_name
            .clone()
            .unwrap_or_else(|| catalog::display_name(&self.current_topic).to_string())
    }

    pub fn topic_panel(&self) -> String {
        if self.is_current_complete() {
            "Topic Complete!\nSelect next topic".to_string()
        } else {
            format!("Current Topic:\n{}", self.display_name())
        }
    }

    pub fn flashcards_panel(&self) -> String {
        if self.flashcards.is_empty() {
            return "Flashcards\n\nNo flashcards available for this topic.".to_string();
        }
        let mut text = String::from("Flashcards\n\n");
        for (i, card) in self.flashcards.iter().take(PANEL_CARD_LIMIT).enumerate() {
            text.push_str(&format!("{}. {}\n", i + 1, card.front));
        }
        text
    }

    pub fn quiz_panel(&self) -> String {
        if self.unlocked.quiz {
            "Take Quiz\n\nQuiz Unlocked!\nClick to start quiz".to_string()
        } else {
            "Take Quiz\n\nLocked\nWatch the video to unlock".to_string()
        }
    }
}
