//! Cross-frame messages exchanged with the video player and the host page

use serde::{Deserialize, Serialize};
use serde_json::Value;
use url::form_urlencoded;

/// Messages the scene listens for
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type")]
pub enum InboundMessage {
    #[serde(rename = "VIDEO_PROGRESS")]
    VideoProgress { progress: f64 },
}

impl InboundMessage {
    /// Recognise a known message; anything else is ignored
    pub fn parse(value: &Value) -> Option<Self> {
        serde_json::from_value(value.clone()).ok()
    }
}

/// Messages the scene posts to its parent frame
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub enum OutboundMessage {
    #[serde(rename = "VR_OPEN_VIDEO")]
    VrOpenVideo { topic: String, url: String },
}

/// How the host should open the video lesson
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "target", rename_all = "camelCase")]
pub enum VideoRequest {
    /// Scene is embedded: post this to the parent frame
    Parent { message: OutboundMessage },
    /// Standalone: open the url in a new browsing context
    NewWindow { url: String },
}

impl VideoRequest {
    pub fn url(&self) -> &str {
        match self {
            VideoRequest::Parent {
                message: OutboundMessage::VrOpenVideo { url, .. },
            } => url,
            VideoRequest::NewWindow { url } => url,
        }
    }
}

/// `<base>?topic=<id>&vr=true`
pub fn video_url(base: &str, topic_id: &str) -> String {
    let query = form_urlencoded::Serializer::new(String::new())
        .append_pair("topic", topic_id)
        .append_pair("vr", "true")
        .finish();
    format!("{}?{}", base, query)
}
