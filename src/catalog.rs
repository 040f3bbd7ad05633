//! Static topic catalog bundled at build time

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use tracing::error;

use crate::types::Subject;

const TOPICS_JSON: &str = include_str!("../data/topics.json");

/// Immutable reference entity for one study topic
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Topic {
    pub id: String,
    pub name: String,
    pub subject: Subject,
    pub difficulty: String,
    pub description: String,
    /// Minutes
    pub estimated_time: u32,
}

static CATALOG: Lazy<Vec<Topic>> = Lazy::new(|| {
    serde_json::from_str(TOPICS_JSON).unwrap_or_else(|e| {
        error!("Bundled topic catalog is malformed: {}", e);
        Vec::new()
    })
});

/// All topics in catalog order
pub fn topics() -> &'static [Topic] {
    &CATALOG
}

/// Look up a topic by id
pub fn find(id: &str) -> Option<&'static Topic> {
    CATALOG.iter().find(|t| t.id == id)
}

/// Display name for a topic id, falling back to the id itself
pub fn display_name(id: &str) -> &str {
    find(id).map(|t| t.name.as_str()).unwrap_or(id)
}
