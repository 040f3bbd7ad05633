//! Scene description consumed by the VR renderer
//!
//! The renderer only draws what is listed here. Gating and navigation live in
//! [`activate_hotspot`], not in the markup.

use serde::Serialize;
use std::str::FromStr;

use crate::catalog;
use crate::dashboard::ProgressStats;
use crate::error::TutorError;
use crate::learning::Step;
use crate::routes::{self, Navigation};
use crate::store::AppState;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Position {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

const fn at(x: f32, y: f32, z: f32) -> Position {
    Position { x, y, z }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HotspotId {
    Flashcards,
    Video,
    Quiz,
}

impl HotspotId {
    pub const ALL: [HotspotId; 3] = [HotspotId::Flashcards, HotspotId::Video, HotspotId::Quiz];

    pub fn as_str(self) -> &'static str {
        match self {
            HotspotId::Flashcards => "flashcards",
            HotspotId::Video => "video",
            HotspotId::Quiz => "quiz",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            HotspotId::Flashcards => "Flashcards",
            HotspotId::Video => "Video Lesson",
            HotspotId::Quiz => "Take Quiz",
        }
    }

    pub fn position(self) -> Position {
        match self {
            HotspotId::Flashcards => at(-2.0, 2.0, -3.0),
            HotspotId::Video => at(2.0, 2.0, -3.0),
            HotspotId::Quiz => at(0.0, 2.5, -4.0),
        }
    }

    /// Learning step the hotspot deep-links to
    pub fn step(self) -> Step {
        match self {
            HotspotId::Flashcards => Step::Flashcards,
            HotspotId::Video => Step::Video,
            HotspotId::Quiz => Step::Quiz,
        }
    }

    pub fn action(self) -> String {
        format!("{}#{}", routes::Route::Learn.path(), self.step())
    }

    pub fn is_enabled(self, state: &AppState) -> bool {
        let unlocked = &state.vr.unlocked;
        match self {
            HotspotId::Flashcards => unlocked.flashcards,
            HotspotId::Video => unlocked.video,
            HotspotId::Quiz => unlocked.quiz,
        }
    }
}

impl FromStr for HotspotId {
    type Err = TutorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        HotspotId::ALL
            .into_iter()
            .find(|h| h.as_str() == s.trim())
            .ok_or_else(|| TutorError::invalid("hotspot", "Unknown hotspot"))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Hotspot {
    pub id: HotspotId,
    pub label: &'static str,
    pub position: Position,
    pub action: String,
    pub enabled: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Panel {
    pub id: &'static str,
    pub text: String,
    pub position: Position,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SceneDescription {
    pub hotspots: Vec<Hotspot>,
    pub panels: Vec<Panel>,
}

impl SceneDescription {
    pub fn build(state: &AppState) -> Self {
        let hotspots = HotspotId::ALL
            .into_iter()
            .map(|id| Hotspot {
                id,
                label: id.label(),
                position: id.position(),
                action: id.action(),
                enabled: id.is_enabled(state),
            })
            .collect();

        let panels = vec![
            Panel {
                id: "topic",
                text: state.vr.topic_panel(),
                position: at(0.0, 1.5, -2.0),
            },
            Panel {
                id: "progress",
                text: progress_panel(state),
                position: at(-3.0, 1.0, -2.0),
            },
            Panel {
                id: "instructions",
                text: "Instructions:\nLook around\nClick spheres\nUse headphones\nEnter VR mode"
                    .to_string(),
                position: at(3.0, 1.0, -2.0),
            },
            Panel {
                id: "flashcards",
                text: state.vr.flashcards_panel(),
                position: at(-2.0, 1.2, -3.0),
            },
            Panel {
                id: "quiz",
                text: state.vr.quiz_panel(),
                position: at(0.0, 1.7, -4.0),
            },
        ];

        Self { hotspots, panels }
    }

    pub fn hotspot(&self, id: HotspotId) -> Option<&Hotspot> {
        self.hotspots.iter().find(|h| h.id == id)
    }

    pub fn panel(&self, id: &str) -> Option<&Panel> {
        self.panels.iter().find(|p| p.id == id)
    }
}

fn progress_panel(state: &AppState) -> String {
    let stats = ProgressStats::from_progress(&state.progress);
    format!(
        "Progress:\nTopics: {}/{}\nTime: {}h\nAccuracy: {:.0}%",
        stats.completed_topics,
        catalog::topics().len(),
        stats.total_study_time,
        stats.average_accuracy
    )
}

/// Navigation for a clicked hotspot; locked hotspots are refused
pub fn activate_hotspot(state: &AppState, id: HotspotId) -> Result<Navigation, TutorError> {
    if !id.is_enabled(state) {
        return Err(TutorError::Locked(id.as_str().to_string()));
    }
    Ok(routes::resolve(&id.action(), state))
}
