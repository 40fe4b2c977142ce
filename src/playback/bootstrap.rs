//! Engine script loading.
//!
//! Each component is loaded from an ordered list of candidate locations; the
//! first location that loads wins. The player itself is required. The two
//! decode adapters are optional and their absence only narrows which
//! containers can be played.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use strum::Display;
use tracing::{debug, info, warn};

use crate::config::EngineScriptsConfig;
use crate::errors::{PlaybackError, PlaybackResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "kebab-case")]
pub enum EngineComponent {
    Player,
    ManifestAdapter,
    SegmentAdapter,
}

/// Loads one script location
#[async_trait]
pub trait ScriptLoader: Send + Sync {
    async fn load(&self, component: EngineComponent, url: &str) -> Result<(), String>;
}

/// What the bootstrap managed to load
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EngineCapabilities {
    pub manifest_adapter: bool,
    pub segment_adapter: bool,
}

#[derive(Debug, Clone)]
pub struct EngineBootstrap {
    scripts: EngineScriptsConfig,
}

impl EngineBootstrap {
    pub fn new(scripts: EngineScriptsConfig) -> Self {
        Self { scripts }
    }

    fn candidates(&self, component: EngineComponent) -> &[String] {
        match component {
            EngineComponent::Player => &self.scripts.player,
            EngineComponent::ManifestAdapter => &self.scripts.manifest_adapter,
            EngineComponent::SegmentAdapter => &self.scripts.segment_adapter,
        }
    }

    /// Try each candidate for `component` in order
    pub async fn load_component(
        &self,
        loader: &dyn ScriptLoader,
        component: EngineComponent,
    ) -> PlaybackResult<String> {
        let mut failures = Vec::new();
        for url in self.candidates(component) {
            match loader.load(component, url).await {
                Ok(()) => {
                    debug!("Loaded {} from {}", component, url);
                    return Ok(url.clone());
                }
                Err(e) => {
                    warn!("Failed to load {} from {}: {}", component, url, e);
                    failures.push(format!("{url}: {e}"));
                }
            }
        }
        Err(PlaybackError::engine_load(
            component.to_string(),
            if failures.is_empty() {
                "no candidate locations configured".to_string()
            } else {
                failures.join("; ")
            },
        ))
    }

    pub async fn load(&self, loader: &dyn ScriptLoader) -> PlaybackResult<EngineCapabilities> {
        self.load_component(loader, EngineComponent::Player).await?;
        let manifest_adapter = self
            .load_component(loader, EngineComponent::ManifestAdapter)
            .await
            .is_ok();
        let segment_adapter = self
            .load_component(loader, EngineComponent::SegmentAdapter)
            .await
            .is_ok();

        let capabilities = EngineCapabilities {
            manifest_adapter,
            segment_adapter,
        };
        info!(
            "Media engine ready (manifest adapter: {}, segment adapter: {})",
            capabilities.manifest_adapter, capabilities.segment_adapter
        );
        Ok(capabilities)
    }
}

/// Checks that a script location answers with a success status
pub struct HttpScriptLoader {
    client: Client,
}

impl HttpScriptLoader {
    pub fn new(timeout: Duration, user_agent: &str) -> PlaybackResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(user_agent.to_string())
            .build()
            .map_err(|e| PlaybackError::engine_load("http-client", e.to_string()))?;
        Ok(Self { client })
    }
}

#[async_trait]
impl ScriptLoader for HttpScriptLoader {
    async fn load(&self, _component: EngineComponent, url: &str) -> Result<(), String> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| e.to_string())?;
        if response.status().is_success() {
            Ok(())
        } else {
            Err(format!("HTTP {}", response.status()))
        }
    }
}
