//! Boundary to the media engine.
//!
//! The session controller drives playback through three narrow traits: a
//! [`MediaBackend`] that constructs engines and decode adapters, the
//! [`MediaEngine`] handle itself, and the [`DecodeAdapter`] bound to it.
//! Engines report back through [`EngineEvents`], tagged with the generation
//! of the load that created them so late events from a replaced engine can
//! be told apart.

use std::time::Duration;

use strum::Display;
use tokio::sync::mpsc::UnboundedSender;

use crate::config::PlayerConfig;
use crate::errors::PlaybackResult;
use crate::streaming::ContainerFormat;

/// Construction options passed to every new engine
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlayerOptions {
    pub autoplay: bool,
    pub looks_live: bool,
    pub initial_volume: f32,
    pub start_muted: bool,
    pub estimated_bitrate_mbps: f64,
}

impl Default for PlayerOptions {
    fn default() -> Self {
        Self::from_config(&PlayerConfig::default())
    }
}

impl PlayerOptions {
    pub fn from_config(config: &PlayerConfig) -> Self {
        Self {
            autoplay: config.autoplay,
            looks_live: config.looks_live,
            initial_volume: config.initial_volume,
            start_muted: config.start_muted,
            estimated_bitrate_mbps: config.estimated_bitrate_mbps,
        }
    }
}

/// How a URL gets decoded once its container is known
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
#[strum(serialize_all = "kebab-case")]
pub enum DecodePath {
    /// Manifest decoded by the loaded manifest adapter
    ManifestAdapter,
    /// Manifest handed to the platform's built-in manifest support
    NativeManifest,
    /// Raw segments decoded by the loaded segment adapter
    SegmentAdapter,
    /// Anything else, played by the engine directly
    Direct,
}

impl DecodePath {
    /// Whether this path needs a [`DecodeAdapter`]
    pub fn needs_adapter(&self) -> bool {
        matches!(self, DecodePath::ManifestAdapter | DecodePath::SegmentAdapter)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct EngineRequest {
    pub url: String,
    pub container: ContainerFormat,
    pub decode_path: DecodePath,
    pub options: PlayerOptions,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEventKind {
    Ready,
    Error(String),
    Play,
    Pause,
    Destroy,
    /// Length of media currently buffered ahead of the playhead
    Buffered(Duration),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineEvent {
    pub generation: u64,
    pub kind: EngineEventKind,
}

/// Event sink handed to one engine
#[derive(Debug, Clone)]
pub struct EngineEvents {
    generation: u64,
    tx: UnboundedSender<EngineEvent>,
}

impl EngineEvents {
    pub fn new(generation: u64, tx: UnboundedSender<EngineEvent>) -> Self {
        Self { generation, tx }
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Report an event; events sent after the session is gone are dropped
    pub fn emit(&self, kind: EngineEventKind) {
        let _ = self.tx.send(EngineEvent {
            generation: self.generation,
            kind,
        });
    }
}

/// A constructed player bound to one URL
pub trait MediaEngine: Send {
    fn url(&self) -> &str;
    fn play(&mut self) -> PlaybackResult<()>;
    fn pause(&mut self) -> PlaybackResult<()>;
    /// Release the engine synchronously
    fn destroy(&mut self);
}

/// Decoder feeding an engine's media element
pub trait DecodeAdapter: Send {
    fn path(&self) -> DecodePath;
    fn attach(&mut self, url: &str) -> PlaybackResult<()>;
    /// Release the adapter synchronously
    fn destroy(&mut self);
}

/// Factory for engines and adapters
pub trait MediaBackend: Send + Sync {
    /// Whether the platform can play manifests without an adapter
    fn native_manifest(&self) -> bool {
        false
    }

    fn create_engine(
        &self,
        request: &EngineRequest,
        events: EngineEvents,
    ) -> PlaybackResult<Box<dyn MediaEngine>>;

    fn create_adapter(&self, path: DecodePath) -> PlaybackResult<Box<dyn DecodeAdapter>>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc::unbounded_channel;

    #[test]
    fn default_options() {
        let options = PlayerOptions::default();
        assert!(!options.autoplay);
        assert!(options.looks_live);
        assert_eq!(options.initial_volume, 0.7);
        assert!(!options.start_muted);
        assert_eq!(options.estimated_bitrate_mbps, 2.0);
    }

    #[test]
    fn events_carry_generation() {
        let (tx, mut rx) = unbounded_channel();
        let events = EngineEvents::new(3, tx);
        events.emit(EngineEventKind::Ready);
        assert_eq!(
            rx.try_recv().unwrap(),
            EngineEvent {
                generation: 3,
                kind: EngineEventKind::Ready
            }
        );
        drop(rx);
        events.emit(EngineEventKind::Destroy);
    }

    #[test]
    fn decode_paths() {
        assert!(DecodePath::ManifestAdapter.needs_adapter());
        assert!(!DecodePath::NativeManifest.needs_adapter());
        assert_eq!(DecodePath::SegmentAdapter.to_string(), "segment-adapter");
    }
}
