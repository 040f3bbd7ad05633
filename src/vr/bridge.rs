//! VR bridge: the scene's entry points into the shared state
//!
//! The bridge holds the same [`TutorState`] handle as the CLI and the HTTP
//! server. Flashcard loads run without the state lock; a load that finishes
//! after another topic switch is dropped.

use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::error::TutorError;
use crate::flashcards::FallbackChain;
use crate::routes::Navigation;
use crate::store::TutorState;
use crate::vr::messages::{video_url, InboundMessage, OutboundMessage, VideoRequest};
use crate::vr::scene::{self, HotspotId, SceneDescription};
use crate::vr::session::VrSession;

/// Result of a topic switch
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TopicLoad {
    pub topic_id: String,
    pub flashcards: usize,
    /// Source that answered, `None` when every source failed
    pub origin: Option<String>,
    /// False when a newer topic switch superseded this load
    pub applied: bool,
}

#[derive(Clone)]
pub struct VrBridge {
    state: TutorState,
    chain: FallbackChain,
    quiz_unlock_threshold: f64,
    video_url_base: String,
}

impl VrBridge {
    pub fn new(state: TutorState, chain: FallbackChain) -> Self {
        let defaults = Config::default();
        Self {
            state,
            chain,
            quiz_unlock_threshold: defaults.vr.quiz_unlock_threshold,
            video_url_base: defaults.vr.video_url_base,
        }
    }

    pub fn from_config(state: TutorState, chain: FallbackChain, config: &Config) -> Self {
        Self {
            state,
            chain,
            quiz_unlock_threshold: config.vr.quiz_unlock_threshold,
            video_url_base: config.vr.video_url_base.clone(),
        }
    }

    pub fn state(&self) -> &TutorState {
        &self.state
    }

    pub async fn session(&self) -> VrSession {
        self.state.read(|s| s.vr.clone()).await
    }

    /// Returns true when this update unlocked the quiz
    pub async fn on_video_progress(&self, percent: f64) -> bool {
        let threshold = self.quiz_unlock_threshold;
        self.state
            .mutate(|s| s.vr.on_video_progress(percent, threshold))
            .await
    }

    /// Handle an inbound cross-frame message; unknown shapes are ignored
    pub async fn handle_message(&self, message: &Value) -> bool {
        match InboundMessage::parse(message) {
            Some(InboundMessage::VideoProgress { progress }) => {
                self.on_video_progress(progress).await;
                true
            }
            None => {
                debug!("Ignoring message: {}", message);
                false
            }
        }
    }

    /// Switch topic and load its flashcards through the fallback chain
    ///
    /// Also selects the topic for the learning flow.
    pub async fn set_current_topic(&self, topic_id: &str, topic_name: Option<&str>) -> TopicLoad {
        let generation = self
            .state
            .mutate(|s| {
                let generation = s.set_current_topic(topic_id);
                s.vr.topic_name = topic_name.map(str::to_string);
                generation
            })
            .await;

        let loaded = self.chain.resolve(topic_id).await;
        let count = loaded.cards.len();

        let applied = self
            .state
            .mutate(|s| s.vr.apply_flashcards(generation, loaded.cards))
            .await;
        if applied {
            info!("VR topic set to {} with {} flashcards", topic_id, count);
        } else {
            warn!("Discarding flashcards for {}: topic changed during load", topic_id);
        }

        TopicLoad {
            topic_id: topic_id.to_string(),
            flashcards: count,
            origin: loaded.origin,
            applied,
        }
    }

    pub async fn mark_topic_complete(&self) -> bool {
        self.state.mutate(|s| s.vr.mark_topic_complete()).await
    }

    pub async fn unlock_all(&self) {
        self.state.mutate(|s| s.vr.unlock_all()).await;
        info!("All VR content unlocked");
    }

    /// Video request for the current topic
    ///
    /// `embedded` is true when the scene runs inside a parent frame.
    pub async fn open_video(&self, embedded: bool) -> VideoRequest {
        let topic = self.state.read(|s| s.vr.current_topic.clone()).await;
        let url = video_url(&self.video_url_base, &topic);
        if embedded {
            VideoRequest::Parent {
                message: OutboundMessage::VrOpenVideo { topic, url },
            }
        } else {
            VideoRequest::NewWindow { url }
        }
    }

    pub async fn scene(&self) -> SceneDescription {
        self.state.read(SceneDescription::build).await
    }

    pub async fn activate_hotspot(&self, id: HotspotId) -> Result<Navigation, TutorError> {
        self.state.read(|s| scene::activate_hotspot(s, id)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flashcards::SeedSource;
    use serde_json::json;
    use std::sync::Arc;

    fn bridge() -> VrBridge {
        let chain = FallbackChain::new().with_source(Arc::new(SeedSource::bundled()));
        VrBridge::new(TutorState::in_memory(), chain)
    }

    #[tokio::test]
    async fn test_progress_message_unlocks_quiz() {
        let bridge = bridge();
        assert!(bridge
            .handle_message(&json!({"type": "VIDEO_PROGRESS", "progress": 65}))
            .await);
        assert!(bridge.session().await.unlocked.quiz);
        assert!(!bridge.handle_message(&json!({"type": "OTHER"})).await);
    }

    #[tokio::test]
    async fn test_topic_switch_loads_seed_cards() {
        let bridge = bridge();
        let load = bridge.set_current_topic("physics-waves", Some("Waves")).await;
        assert!(load.applied);
        assert_eq!(load.origin.as_deref(), Some("seeds"));

        let snapshot = bridge.state().snapshot().await;
        assert_eq!(snapshot.current_topic.as_deref(), Some("physics-waves"));
        assert_eq!(snapshot.vr.flashcards.len(), load.flashcards);
        assert_eq!(snapshot.vr.display_name(), "Waves");
    }

    #[tokio::test]
    async fn test_open_video_targets() {
        let bridge = bridge();
        let embedded = bridge.open_video(true).await;
        assert_eq!(
            embedded,
            VideoRequest::Parent {
                message: OutboundMessage::VrOpenVideo {
                    topic: "organic-chemistry-basics".into(),
                    url: "/learn/video?topic=organic-chemistry-basics&vr=true".into(),
                }
            }
        );
        let standalone = bridge.open_video(false).await;
        assert_eq!(standalone.url(), "/learn/video?topic=organic-chemistry-basics&vr=true");
    }

    #[tokio::test]
    async fn test_unlock_all_enables_quiz_hotspot() {
        let bridge = bridge();
        assert!(bridge.activate_hotspot(HotspotId::Quiz).await.is_err());
        bridge.unlock_all().await;
        assert!(bridge.scene().await.hotspot(HotspotId::Quiz).unwrap().enabled);
    }
}
