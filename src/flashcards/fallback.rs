//! Ordered fallback resolution
//!
//! Sources are tried in order and the first success wins. When every source
//! fails the learner gets an empty list; failures are only logged.

use serde::Serialize;
use std::fmt::Display;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};
use url::Url;

use crate::config::Config;
use crate::flashcards::source::{ApiSource, Flashcard, FlashcardSource, SeedSource};

/// Try each labelled attempt in order and return the first success
///
/// Attempts are futures that do nothing until polled, so later sources are
/// never contacted once an earlier one succeeds.
pub async fn first_success<T, E, Fut>(
    attempts: impl IntoIterator<Item = (String, Fut)>,
) -> Option<(String, T)>
where
    Fut: Future<Output = Result<T, E>>,
    E: Display,
{
    for (label, attempt) in attempts {
        match attempt.await {
            Ok(value) => return Some((label, value)),
            Err(e) => warn!("Source {} failed ({}), trying next", label, e),
        }
    }
    None
}

/// Cards plus where they came from
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LoadedFlashcards {
    pub cards: Vec<Flashcard>,
    /// Name of the source that answered, `None` when all failed
    pub origin: Option<String>,
}

#[derive(Clone, Default)]
pub struct FallbackChain {
    sources: Vec<Arc<dyn FlashcardSource>>,
}

impl FallbackChain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_source(mut self, source: Arc<dyn FlashcardSource>) -> Self {
        self.sources.push(source);
        self
    }

    /// Network endpoint (if configured) first, then the seed file
    pub fn from_config(config: &Config, client: reqwest::Client) -> Self {
        let mut chain = Self::new();
        if let Some(endpoint) = config.flashcards.endpoint() {
            match Url::parse(endpoint) {
                Ok(url) => {
                    let timeout = Duration::from_secs(config.flashcards.timeout_secs);
                    chain = chain.with_source(Arc::new(ApiSource::new(client, url, timeout)));
                }
                Err(e) => warn!("Ignoring invalid flashcard endpoint '{}': {}", endpoint, e),
            }
        }
        let seeds = match &config.flashcards.seeds_path {
            Some(path) => SeedSource::from_path(path),
            None => SeedSource::bundled(),
        };
        chain.with_source(Arc::new(seeds))
    }

    pub fn source_names(&self) -> Vec<String> {
        self.sources.iter().map(|s| s.name().to_string()).collect()
    }

    pub async fn resolve(&self, topic_id: &str) -> LoadedFlashcards {
        // Collected up front: the returned future has to stay Send for the handlers
        let attempts: Vec<_> = self
            .sources
            .iter()
            .map(|s| (s.name().to_string(), s.fetch(topic_id)))
            .collect();

        match first_success(attempts).await {
            Some((origin, cards)) => {
                info!("Loaded {} flashcards for {} from {}", cards.len(), topic_id, origin);
                LoadedFlashcards {
                    cards,
                    origin: Some(origin),
                }
            }
            None => {
                warn!("No flashcard source answered for {}, using empty list", topic_id);
                LoadedFlashcards {
                    cards: Vec::new(),
                    origin: None,
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flashcards::source::{SeedFile, SourceError};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Scripted {
        name: &'static str,
        result: Result<Vec<Flashcard>, SourceError>,
        calls: AtomicUsize,
    }

    impl Scripted {
        fn new(name: &'static str, result: Result<Vec<Flashcard>, SourceError>) -> Arc<Self> {
            Arc::new(Self {
                name,
                result,
                calls: AtomicUsize::new(0),
            })
        }
    }

    #[async_trait]
    impl FlashcardSource for Scripted {
        fn name(&self) -> &str {
            self.name
        }

        async fn fetch(&self, _topic_id: &str) -> Result<Vec<Flashcard>, SourceError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.result.clone()
        }
    }

    #[tokio::test]
    async fn test_first_success_short_circuits() {
        let api = Scripted::new("api", Ok(vec![Flashcard::new("t", "Q", "A")]));
        let seeds = Scripted::new("seeds", Ok(vec![]));
        let chain = FallbackChain::new()
            .with_source(api.clone())
            .with_source(seeds.clone());

        let loaded = chain.resolve("t").await;
        assert_eq!(loaded.origin.as_deref(), Some("api"));
        assert_eq!(loaded.cards.len(), 1);
        assert_eq!(seeds.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_falls_through_to_seeds() {
        let api = Scripted::new("api", Err(SourceError::Status(503)));
        let chain = FallbackChain::new()
            .with_source(api.clone())
            .with_source(Arc::new(SeedSource::bundled()));

        let loaded = chain.resolve("physics-waves").await;
        assert_eq!(loaded.origin.as_deref(), Some("seeds"));
        assert!(!loaded.cards.is_empty());
        assert_eq!(api.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_all_sources_failing_yields_empty_list() {
        let chain = FallbackChain::new()
            .with_source(Scripted::new("api", Err(SourceError::Network("refused".into()))))
            .with_source(Arc::new(SeedSource::from_seeds(SeedFile::default())));

        let loaded = chain.resolve("math-calculus").await;
        assert!(loaded.cards.is_empty());
        assert!(loaded.origin.is_none());
    }

    #[tokio::test]
    async fn test_resolve_runs_on_spawned_task() {
        let seeds = Scripted::new("seeds", Ok(vec![Flashcard::new("physics-waves", "Q", "A")]));
        let chain = FallbackChain::new()
            .with_source(Scripted::new("api", Err(SourceError::Status(500))))
            .with_source(seeds);

        let loaded = tokio::spawn(async move { chain.resolve("physics-waves").await })
            .await
            .unwrap();
        assert_eq!(loaded.origin.as_deref(), Some("seeds"));
        assert_eq!(loaded.cards.len(), 1);
    }

    #[tokio::test]
    async fn test_empty_chain_yields_empty_list() {
        let loaded = FallbackChain::new().resolve("physics-waves").await;
        assert!(loaded.cards.is_empty());
    }

    #[test]
    fn test_from_config_orders_api_before_seeds() {
        let config = Config::default();
        let chain = FallbackChain::from_config(&config, reqwest::Client::new());
        assert_eq!(chain.source_names(), vec!["api", "seeds"]);

        let mut config = Config::default();
        config.flashcards.endpoint = String::new();
        let chain = FallbackChain::from_config(&config, reqwest::Client::new());
        assert_eq!(chain.source_names(), vec!["seeds"]);
    }
}
