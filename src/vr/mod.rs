//! VR preview support: session state, scene description, cross-frame bridge

pub mod session;
pub mod messages;
pub mod scene;
pub mod bridge;

pub use session::{Unlocks, VrSession, DEFAULT_VR_TOPIC};
pub use messages::{video_url, InboundMessage, OutboundMessage, VideoRequest};
pub use scene::{activate_hotspot, Hotspot, HotspotId, Panel, Position, SceneDescription};
pub use bridge::{TopicLoad, VrBridge};
