//! Playback Session Controller
//!
//! Owns at most one engine at a time. Every new selection, reload or
//! teardown releases the current decode adapter and then the engine before
//! anything new is constructed.
//!
//! Played time is tracked while the session is `Playing` and converted to
//! an estimated data usage figure.
//!
//! ```text
//! Uninitialized --initialize--> Ready --load--> Playing <--> Paused
//!        any state --teardown--> Destroyed (terminal)
//! ```

use std::sync::Arc;

use strum::Display;
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender, unbounded_channel};
use tracing::{debug, error, info, warn};

use crate::errors::{PlaybackError, PlaybackResult};
use crate::models::StreamDescriptor;
use crate::streaming::{
    AuthTokenGenerator, ClientProfile, ContainerFormat, ResolvedStream, StreamResolver,
    classify_container,
};
use crate::utils::url::UrlUtils;

use super::bootstrap::{EngineBootstrap, EngineCapabilities, ScriptLoader};
use super::engine::{
    DecodeAdapter, DecodePath, EngineEvent, EngineEventKind, EngineEvents, EngineRequest,
    MediaBackend, MediaEngine, PlayerOptions,
};
use super::usage::{DataUsage, DataUsageReport};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "lowercase")]
pub enum SessionState {
    Uninitialized,
    Ready,
    Playing,
    Paused,
    Destroyed,
}

type StreamObserver = Box<dyn Fn(&str) + Send + Sync>;

struct ActiveEngine {
    generation: u64,
    url: String,
    container: ContainerFormat,
    decode_path: DecodePath,
    engine: Box<dyn MediaEngine>,
    adapter: Option<Box<dyn DecodeAdapter>>,
}

impl ActiveEngine {
    /// Adapter first, then the engine handle
    fn release(mut self) {
        if let Some(mut adapter) = self.adapter.take() {
            adapter.destroy();
        }
        self.engine.destroy();
        debug!("Released engine generation {}", self.generation);
    }
}

pub struct PlaybackSessionController {
    backend: Arc<dyn MediaBackend>,
    options: PlayerOptions,
    tokens: AuthTokenGenerator,
    client: ClientProfile,
    state: SessionState,
    capabilities: Option<EngineCapabilities>,
    resolver: Option<StreamResolver>,
    active: Option<ActiveEngine>,
    generation: u64,
    events_tx: UnboundedSender<EngineEvent>,
    events_rx: UnboundedReceiver<EngineEvent>,
    last_error: Option<PlaybackError>,
    usage: DataUsage,
    on_stream_change: Option<StreamObserver>,
}

impl PlaybackSessionController {
    pub fn new(
        backend: Arc<dyn MediaBackend>,
        options: PlayerOptions,
        tokens: AuthTokenGenerator,
        client: ClientProfile,
    ) -> Self {
        let (events_tx, events_rx) = unbounded_channel();
        let usage = DataUsage::new(options.estimated_bitrate_mbps);
        Self {
            backend,
            options,
            tokens,
            client,
            state: SessionState::Uninitialized,
            capabilities: None,
            resolver: None,
            active: None,
            generation: 0,
            events_tx,
            events_rx,
            last_error: None,
            usage,
            on_stream_change: None,
        }
    }

    /// Called with the resolved URL after every successful load
    pub fn on_stream_change<F>(&mut self, observer: F)
    where
        F: Fn(&str) + Send + Sync + 'static,
    {
        self.on_stream_change = Some(Box::new(observer));
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn last_error(&self) -> Option<&PlaybackError> {
        self.last_error.as_ref()
    }

    pub fn capabilities(&self) -> Option<EngineCapabilities> {
        self.capabilities
    }

    pub fn resolver(&self) -> Option<&StreamResolver> {
        self.resolver.as_ref()
    }

    pub fn active_url(&self) -> Option<&str> {
        self.active.as_ref().map(|a| a.url.as_str())
    }

    pub fn active_decode_path(&self) -> Option<DecodePath> {
        self.active.as_ref().map(|a| a.decode_path)
    }

    /// Generation of the engine currently loaded
    pub fn active_generation(&self) -> Option<u64> {
        self.active.as_ref().map(|a| a.generation)
    }

    pub fn data_usage(&self) -> DataUsageReport {
        self.usage.report()
    }

    /// Load engine scripts and prepare the resolver.
    ///
    /// The auth token is generated here, once, and reused for every stream
    /// resolved by this session. On failure the session stays
    /// `Uninitialized` so the caller may offer a retry.
    pub async fn initialize(
        &mut self,
        bootstrap: &EngineBootstrap,
        loader: &dyn ScriptLoader,
    ) -> PlaybackResult<EngineCapabilities> {
        match self.state {
            SessionState::Destroyed => return Err(PlaybackError::SessionDestroyed),
            SessionState::Uninitialized => {}
            _ => {
                if let Some(capabilities) = self.capabilities {
                    return Ok(capabilities);
                }
            }
        }

        let capabilities = match bootstrap.load(loader).await {
            Ok(capabilities) => capabilities,
            Err(e) => {
                error!("Failed to load media engine: {}", e);
                self.last_error = Some(e.clone());
                return Err(e);
            }
        };

        let token = self.tokens.generate();
        self.resolver = Some(StreamResolver::new(token, self.client.is_apple_like()));
        self.capabilities = Some(capabilities);
        self.last_error = None;
        self.transition(SessionState::Ready);
        Ok(capabilities)
    }

    fn transition(&mut self, next: SessionState) {
        if next == SessionState::Playing {
            self.usage.start();
        } else {
            self.usage.stop();
        }
        if self.state != next {
            debug!("Playback session {} -> {}", self.state, next);
            self.state = next;
        }
    }

    fn ensure_usable(&self, operation: &str) -> PlaybackResult<()> {
        match self.state {
            SessionState::Destroyed => Err(PlaybackError::SessionDestroyed),
            SessionState::Uninitialized => Err(PlaybackError::NotReady {
                operation: operation.to_string(),
            }),
            _ => Ok(()),
        }
    }

    /// Resolve `descriptor` and play it, replacing any current engine
    pub fn select_stream(&mut self, descriptor: &StreamDescriptor) -> PlaybackResult<ResolvedStream> {
        self.ensure_usable("select_stream")?;
        let resolver = self.resolver.as_ref().ok_or_else(|| PlaybackError::NotReady {
            operation: "select_stream".to_string(),
        })?;
        let resolved = resolver.resolve(descriptor);
        info!("Selected stream '{}' ({})", resolved.name, resolved.route);
        self.load_url(&resolved.url)?;
        Ok(resolved)
    }

    /// Play an already resolved URL, replacing any current engine
    pub fn load_url(&mut self, url: &str) -> PlaybackResult<()> {
        self.ensure_usable("load_url")?;

        // Release first, unconditionally, so a failed load never leaves the
        // previous engine alive
        self.release_active();

        let result = self.construct(url);
        match result {
            Ok(active) => {
                info!(
                    "Playing {} via {}",
                    UrlUtils::obfuscate_credentials(&active.url),
                    active.decode_path
                );
                self.active = Some(active);
                self.usage.reset_buffered();
                self.last_error = None;
                self.transition(SessionState::Playing);
                if let Some(observer) = &self.on_stream_change {
                    observer(url);
                }
                Ok(())
            }
            Err(e) => {
                error!(
                    "Failed to load {}: {}",
                    UrlUtils::obfuscate_credentials(url),
                    e
                );
                self.last_error = Some(e.clone());
                self.transition(SessionState::Ready);
                Err(e)
            }
        }
    }

    fn decode_path_for(&self, container: ContainerFormat, url: &str) -> PlaybackResult<DecodePath> {
        let capabilities = self.capabilities.unwrap_or_default();
        let unsupported = || PlaybackError::UnsupportedFormat {
            format: container,
            url: UrlUtils::obfuscate_credentials(url),
        };
        match container {
            ContainerFormat::Manifest if capabilities.manifest_adapter => {
                Ok(DecodePath::ManifestAdapter)
            }
            ContainerFormat::Manifest if self.backend.native_manifest() => {
                Ok(DecodePath::NativeManifest)
            }
            ContainerFormat::Manifest => Err(unsupported()),
            ContainerFormat::RawSegment if capabilities.segment_adapter => {
                Ok(DecodePath::SegmentAdapter)
            }
            ContainerFormat::RawSegment => Err(unsupported()),
            ContainerFormat::Native => Ok(DecodePath::Direct),
        }
    }

    fn construct(&mut self, url: &str) -> PlaybackResult<ActiveEngine> {
        let container = classify_container(url);
        let decode_path = self.decode_path_for(container, url)?;

        self.generation += 1;
        let generation = self.generation;
        let request = EngineRequest {
            url: url.to_string(),
            container,
            decode_path,
            options: self.options,
        };
        let events = EngineEvents::new(generation, self.events_tx.clone());
        let mut engine = self.backend.create_engine(&request, events)?;

        let adapter = if decode_path.needs_adapter() {
            let attached = self.backend.create_adapter(decode_path).and_then(|mut adapter| {
                match adapter.attach(url) {
                    Ok(()) => Ok(adapter),
                    Err(e) => {
                        adapter.destroy();
                        Err(e)
                    }
                }
            });
            match attached {
                Ok(adapter) => Some(adapter),
                Err(e) => {
                    engine.destroy();
                    return Err(e);
                }
            }
        } else {
            None
        };

        Ok(ActiveEngine {
            generation,
            url: url.to_string(),
            container,
            decode_path,
            engine,
            adapter,
        })
    }

    fn release_active(&mut self) {
        if let Some(active) = self.active.take() {
            debug!(
                "Releasing {} engine for {}",
                active.container,
                UrlUtils::obfuscate_credentials(&active.url)
            );
            active.release();
        }
    }

    /// Rebuild the engine for the current URL
    pub fn reload(&mut self) -> PlaybackResult<()> {
        self.ensure_usable("reload")?;
        let url = self
            .active
            .as_ref()
            .map(|a| a.url.clone())
            .ok_or_else(|| PlaybackError::NotReady {
                operation: "reload".to_string(),
            })?;
        info!("Reloading stream");
        self.load_url(&url)
    }

    pub fn play(&mut self) -> PlaybackResult<()> {
        self.ensure_usable("play")?;
        let active = self.active.as_mut().ok_or_else(|| PlaybackError::NotReady {
            operation: "play".to_string(),
        })?;
        active.engine.play()?;
        self.transition(SessionState::Playing);
        Ok(())
    }

    pub fn pause(&mut self) -> PlaybackResult<()> {
        self.ensure_usable("pause")?;
        let active = self.active.as_mut().ok_or_else(|| PlaybackError::NotReady {
            operation: "pause".to_string(),
        })?;
        active.engine.pause()?;
        self.transition(SessionState::Paused);
        Ok(())
    }

    /// Release everything; the session cannot be used afterwards
    pub fn teardown(&mut self) {
        if self.state == SessionState::Destroyed {
            return;
        }
        self.release_active();
        self.resolver = None;
        self.transition(SessionState::Destroyed);
        let usage = self.usage.report();
        info!(
            "Playback session destroyed after {:?} played (~{:.1} MB)",
            usage.played, usage.played_mb
        );
    }

    /// Apply one engine event. Events from replaced engines are ignored.
    pub fn handle_event(&mut self, event: EngineEvent) {
        let current = self
            .active
            .as_ref()
            .is_some_and(|a| a.generation == event.generation);
        if !current || self.state == SessionState::Destroyed {
            debug!(
                "Ignoring {:?} from engine generation {}",
                event.kind, event.generation
            );
            return;
        }

        match event.kind {
            EngineEventKind::Ready => debug!("Engine generation {} ready", event.generation),
            EngineEventKind::Play => self.transition(SessionState::Playing),
            EngineEventKind::Pause => self.transition(SessionState::Paused),
            EngineEventKind::Error(message) => {
                warn!("Playback engine error: {}", message);
                self.last_error = Some(PlaybackError::engine(message));
            }
            EngineEventKind::Destroy => {
                warn!("Engine generation {} destroyed itself", event.generation);
                if let Some(active) = self.active.take()
                    && let Some(mut adapter) = active.adapter
                {
                    adapter.destroy();
                }
                self.transition(SessionState::Ready);
            }
            EngineEventKind::Buffered(buffered) => self.usage.record_buffered(buffered),
        }
    }

    /// Apply every queued engine event, returning how many were read
    pub fn drain_events(&mut self) -> usize {
        let mut count = 0;
        while let Ok(event) = self.events_rx.try_recv() {
            self.handle_event(event);
            count += 1;
        }
        count
    }

    /// Wait for the next engine event and apply it
    pub async fn next_event(&mut self) -> Option<EngineEvent> {
        let event = self.events_rx.recv().await?;
        self.handle_event(event.clone());
        Some(event)
    }
}

impl Drop for PlaybackSessionController {
    fn drop(&mut self) {
        self.teardown();
    }
}
