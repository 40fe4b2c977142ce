//! A headless backend that records engine activity through `tracing`.
//!
//! Used by the command line `watch` command, where there is no media element
//! to render into.

use tracing::info;

use crate::errors::PlaybackResult;
use crate::utils::url::UrlUtils;

use super::engine::{
    DecodeAdapter, DecodePath, EngineEventKind, EngineEvents, EngineRequest, MediaBackend,
    MediaEngine,
};

#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingBackend {
    native_manifest: bool,
}

impl LoggingBackend {
    pub fn new(native_manifest: bool) -> Self {
        Self { native_manifest }
    }
}

struct LoggingEngine {
    url: String,
    events: EngineEvents,
}

impl MediaEngine for LoggingEngine {
    fn url(&self) -> &str {
        &self.url
    }

    fn play(&mut self) -> PlaybackResult<()> {
        info!("[engine {}] play", self.events.generation());
        self.events.emit(EngineEventKind::Play);
        Ok(())
    }

    fn pause(&mut self) -> PlaybackResult<()> {
        info!("[engine {}] pause", self.events.generation());
        self.events.emit(EngineEventKind::Pause);
        Ok(())
    }

    fn destroy(&mut self) {
        info!("[engine {}] destroy", self.events.generation());
        self.events.emit(EngineEventKind::Destroy);
    }
}

struct LoggingAdapter {
    path: DecodePath,
}

impl DecodeAdapter for LoggingAdapter {
    fn path(&self) -> DecodePath {
        self.path
    }

    fn attach(&mut self, url: &str) -> PlaybackResult<()> {
        info!(
            "[{}] attached to {}",
            self.path,
            UrlUtils::obfuscate_credentials(url)
        );
        Ok(())
    }

    fn destroy(&mut self) {
        info!("[{}] destroy", self.path);
    }
}

impl MediaBackend for LoggingBackend {
    fn native_manifest(&self) -> bool {
        self.native_manifest
    }

    fn create_engine(
        &self,
        request: &EngineRequest,
        events: EngineEvents,
    ) -> PlaybackResult<Box<dyn MediaEngine>> {
        info!(
            "[engine {}] create for {} {} container via {} (autoplay={}, live={}, volume={}, muted={})",
            events.generation(),
            UrlUtils::extract_host(&request.url).unwrap_or_else(|| "unknown host".to_string()),
            request.container,
            request.decode_path,
            request.options.autoplay,
            request.options.looks_live,
            request.options.initial_volume,
            request.options.start_muted
        );
        events.emit(EngineEventKind::Ready);
        if request.options.autoplay {
            events.emit(EngineEventKind::Play);
        }
        Ok(Box::new(LoggingEngine {
            url: request.url.clone(),
            events,
        }))
    }

    fn create_adapter(&self, path: DecodePath) -> PlaybackResult<Box<dyn DecodeAdapter>> {
        Ok(Box::new(LoggingAdapter { path }))
    }
}
