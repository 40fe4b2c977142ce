use std::sync::Arc;

use tracing::{debug, warn};

use crate::config::SourceConfig;
use crate::errors::{DirectoryError, DirectoryResult};
use crate::models::Fixture;

use super::github::{GithubContentsSource, GithubRawSource};
use super::placeholder::PlaceholderSource;
use super::traits::FixtureSource;

/// Fixtures together with the source that produced them
#[derive(Debug, Clone, PartialEq)]
pub struct FetchOutcome {
    pub fixtures: Vec<Fixture>,
    pub source_name: String,
    pub is_placeholder: bool,
}

/// Ordered list of sources; the first one to answer wins
#[derive(Clone, Default)]
pub struct FallbackChain {
    sources: Vec<Arc<dyn FixtureSource>>,
}

impl FallbackChain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_source<S: FixtureSource + 'static>(mut self, source: S) -> Self {
        self.sources.push(Arc::new(source));
        self
    }

    /// Contents API, then raw file, then (if enabled) the built-in samples
    pub fn from_config(config: &SourceConfig) -> DirectoryResult<Self> {
        let mut chain = Self::new()
            .with_source(GithubContentsSource::new(config)?)
            .with_source(GithubRawSource::new(config)?);
        if config.placeholder_fallback {
            chain = chain.with_source(PlaceholderSource::new());
        }
        Ok(chain)
    }

    pub fn source_names(&self) -> Vec<String> {
        self.sources.iter().map(|s| s.name().to_string()).collect()
    }

    /// Try each source once, in order
    pub async fn fetch(&self) -> DirectoryResult<FetchOutcome> {
        let mut failures = Vec::new();
        for source in &self.sources {
            match source.fetch_fixtures().await {
                Ok(fixtures) => {
                    debug!(
                        "Source {} answered with {} fixtures",
                        source.name(),
                        fixtures.len()
                    );
                    return Ok(FetchOutcome {
                        fixtures,
                        source_name: source.name().to_string(),
                        is_placeholder: source.is_placeholder(),
                    });
                }
                Err(e) => {
                    warn!("Fixture source {} failed, trying next: {}", source.name(), e);
                    failures.push(e.to_string());
                }
            }
        }
        Err(DirectoryError::DirectoryUnavailable {
            message: if failures.is_empty() {
                "no fixture sources configured".to_string()
            } else {
                failures.join("; ")
            },
        })
    }
}

impl std::fmt::Debug for FallbackChain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FallbackChain")
            .field("sources", &self.source_names())
            .finish()
    }
}
