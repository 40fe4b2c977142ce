//! Playback session control and the media engine boundary.

pub mod bootstrap;
pub mod engine;
pub mod logging;
pub mod session;
pub mod usage;

pub use bootstrap::{
    EngineBootstrap, EngineCapabilities, EngineComponent, HttpScriptLoader, ScriptLoader,
};
pub use engine::{
    DecodeAdapter, DecodePath, EngineEvent, EngineEventKind, EngineEvents, EngineRequest,
    MediaBackend, MediaEngine, PlayerOptions,
};
pub use logging::LoggingBackend;
pub use session::{PlaybackSessionController, SessionState};
pub use usage::{DataUsage, DataUsageReport};
