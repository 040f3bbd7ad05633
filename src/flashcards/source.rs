//! Flashcard data sources
//!
//! Two sources exist: the optional network endpoint
//! `GET <endpoint>?topic=<id>` and the seed file bundled with the binary (or
//! a replacement file named in config).

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use tracing::debug;
use url::Url;

const BUNDLED_SEEDS: &str = include_str!("../../data/seeds.json");

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Flashcard {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub topic_id: Option<String>,
    pub front: String,
    #[serde(default)]
    pub back: String,
    /// Any other fields the source sends along
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl Flashcard {
    pub fn new(topic_id: &str, front: &str, back: &str) -> Self {
        Self {
            id: None,
            topic_id: Some(topic_id.to_string()),
            front: front.to_string(),
            back: back.to_string(),
            extra: serde_json::Map::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeedTopic {
    pub id: String,
    #[serde(default)]
    pub name: String,
}

/// Shape of the seed resource: `{topics: [...], flashcards: [...]}`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SeedFile {
    #[serde(default)]
    pub topics: Vec<SeedTopic>,
    #[serde(default)]
    pub flashcards: Vec<Flashcard>,
}

impl SeedFile {
    pub fn parse(json: &str) -> Result<Self, SourceError> {
        serde_json::from_str(json).map_err(|e| SourceError::Decode(e.to_string()))
    }

    pub fn bundled() -> Result<Self, SourceError> {
        Self::parse(BUNDLED_SEEDS)
    }

    pub fn has_topic(&self, topic_id: &str) -> bool {
        self.topics.iter().any(|t| t.id == topic_id)
    }

    /// Cards for a topic, `None` when the topic is not listed at all
    pub fn cards_for(&self, topic_id: &str) -> Option<Vec<Flashcard>> {
        if !self.has_topic(topic_id) {
            return None;
        }
        Some(
            self.flashcards
                .iter()
                .filter(|f| f.topic_id.as_deref() == Some(topic_id))
                .cloned()
                .collect(),
        )
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SourceError {
    #[error("network error: {0}")]
    Network(String),
    #[error("endpoint returned HTTP {0}")]
    Status(u16),
    #[error("malformed response: {0}")]
    Decode(String),
    #[error("topic '{0}' not found")]
    NotFound(String),
    #[error("failed to read {0}")]
    Io(String),
}

/// One place flashcards can come from
#[async_trait]
pub trait FlashcardSource: Send + Sync {
    /// Short name for logs
    fn name(&self) -> &str;

    async fn fetch(&self, topic_id: &str) -> Result<Vec<Flashcard>, SourceError>;
}

/// `GET <endpoint>?topic=<id>` returning a JSON array
pub struct ApiSource {
    client: reqwest::Client,
    endpoint: Url,
    timeout: Duration,
}

impl ApiSource {
    pub fn new(client: reqwest::Client, endpoint: Url, timeout: Duration) -> Self {
        Self {
            client,
            endpoint,
            timeout,
        }
    }

    pub fn request_url(&self, topic_id: &str) -> Url {
        let mut url = self.endpoint.clone();
        url.query_pairs_mut().append_pair("topic", topic_id);
        url
    }
}

#[async_trait]
impl FlashcardSource for ApiSource {
    fn name(&self) -> &str {
        "api"
    }

    async fn fetch(&self, topic_id: &str) -> Result<Vec<Flashcard>, SourceError> {
        let url = self.request_url(topic_id);
        debug!("Fetching flashcards from {}", url);
        let response = self
            .client
            .get(url)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| SourceError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(SourceError::Status(status.as_u16()));
        }

        response
            .json::<Vec<Flashcard>>()
            .await
            .map_err(|e| SourceError::Decode(e.to_string()))
    }
}

#[derive(Debug, Clone)]
enum SeedOrigin {
    Bundled,
    File(PathBuf),
    Inline(SeedFile),
}

/// Seed resource filtered by topic id
pub struct SeedSource {
    origin: SeedOrigin,
}

impl SeedSource {
    pub fn bundled() -> Self {
        Self {
            origin: SeedOrigin::Bundled,
        }
    }

    /// Read the seed file from disk on every fetch
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        Self {
            origin: SeedOrigin::File(path.into()),
        }
    }

    pub fn from_seeds(seeds: SeedFile) -> Self {
        Self {
            origin: SeedOrigin::Inline(seeds),
        }
    }

    async fn seeds(&self) -> Result<SeedFile, SourceError> {
        match &self.origin {
            SeedOrigin::Bundled => SeedFile::bundled(),
            SeedOrigin::File(path) => {
                let contents = tokio::fs::read_to_string(path)
                    .await
                    .map_err(|e| SourceError::Io(format!("{}: {}", path.display(), e)))?;
                SeedFile::parse(&contents)
            }
            SeedOrigin::Inline(seeds) => Ok(seeds.clone()),
        }
    }
}

#[async_trait]
impl FlashcardSource for SeedSource {
    fn name(&self) -> &str {
        "seeds"
    }

    async fn fetch(&self, topic_id: &str) -> Result<Vec<Flashcard>, SourceError> {
        self.seeds()
            .await?
            .cards_for(topic_id)
            .ok_or_else(|| SourceError::NotFound(topic_id.to_string()))
    }
}
