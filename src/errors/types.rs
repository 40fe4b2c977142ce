//! Error type definitions for fbstream
//!
//! This module defines the error types used throughout the crate. Directory
//! failures are always recoverable (the directory falls back to the last known
//! list or placeholder data), playback failures are surfaced as session state.

use thiserror::Error;

use crate::streaming::ContainerFormat;

/// Top-level application error type
#[derive(Error, Debug)]
pub enum AppError {
    /// Fixture directory errors
    #[error("Directory error: {0}")]
    Directory(#[from] DirectoryError),

    /// Playback session errors
    #[error("Playback error: {0}")]
    Playback(#[from] PlaybackError),

    /// Resource not found errors
    #[error("Not found: {resource} with id {id}")]
    NotFound { resource: String, id: String },

    /// Configuration errors
    #[error("Configuration error: {message}")]
    Configuration { message: String },
}

/// Fixture source and directory errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DirectoryError {
    /// Non-success HTTP status from a fixture source
    #[error("HTTP error: {status} from {source_name}")]
    Http { source_name: String, status: u16 },

    /// Connection, TLS or timeout failures
    #[error("Transport error: {source_name} - {message}")]
    Transport { source_name: String, message: String },

    /// Body could not be decoded into fixtures
    #[error("Decode error: {source_name} - {message}")]
    Decode { source_name: String, message: String },

    /// Source answered but carried no fixtures
    #[error("Empty payload from {source_name}")]
    EmptyPayload { source_name: String },

    /// Every configured source failed
    #[error("Directory unavailable: {message}")]
    DirectoryUnavailable { message: String },
}

/// Playback session errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PlaybackError {
    /// Engine scripts could not be loaded from any candidate location
    #[error("Failed to load media engine: {component} - {message}")]
    EngineLoadFailed { component: String, message: String },

    /// Neither decode adapter can handle the resolved URL
    #[error("Unsupported format: {format} for {url}")]
    UnsupportedFormat { format: ContainerFormat, url: String },

    /// Runtime failure reported by the engine after a session was established
    #[error("Playback engine error: {message}")]
    PlaybackEngineError { message: String },

    /// Operation attempted before the engine bootstrap completed
    #[error("Player not ready: {operation}")]
    NotReady { operation: String },

    /// Operation attempted after teardown
    #[error("Playback session destroyed")]
    SessionDestroyed,
}

/// Convenience methods for creating common error types
impl AppError {
    /// Create a configuration error
    pub fn configuration<S: Into<String>>(message: S) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Create a not found error
    pub fn not_found<R: Into<String>, I: Into<String>>(resource: R, id: I) -> Self {
        Self::NotFound {
            resource: resource.into(),
            id: id.into(),
        }
    }
}

impl DirectoryError {
    /// Create a transport error
    pub fn transport<S: Into<String>, M: Into<String>>(source_name: S, message: M) -> Self {
        Self::Transport {
            source_name: source_name.into(),
            message: message.into(),
        }
    }

    /// Create a decode error
    pub fn decode<S: Into<String>, M: Into<String>>(source_name: S, message: M) -> Self {
        Self::Decode {
            source_name: source_name.into(),
            message: message.into(),
        }
    }
}

impl PlaybackError {
    /// Create an engine load error
    pub fn engine_load<C: Into<String>, M: Into<String>>(component: C, message: M) -> Self {
        Self::EngineLoadFailed {
            component: component.into(),
            message: message.into(),
        }
    }

    /// Create a runtime engine error
    pub fn engine<S: Into<String>>(message: S) -> Self {
        Self::PlaybackEngineError {
            message: message.into(),
        }
    }

    /// Whether the viewer should be offered a retry affordance
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::EngineLoadFailed { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layer_errors_convert_into_app_error() {
        let err: AppError = DirectoryError::DirectoryUnavailable {
            message: "all sources failed".to_string(),
        }
        .into();
        assert_eq!(
            err.to_string(),
            "Directory error: Directory unavailable: all sources failed"
        );

        let err: AppError = PlaybackError::SessionDestroyed.into();
        assert!(matches!(err, AppError::Playback(PlaybackError::SessionDestroyed)));
    }

    #[test]
    fn only_engine_load_failures_are_retryable() {
        assert!(PlaybackError::engine_load("player", "404").is_retryable());
        assert!(!PlaybackError::engine("decode").is_retryable());
        assert!(
            !PlaybackError::UnsupportedFormat {
                format: ContainerFormat::RawSegment,
                url: "x.flv".to_string(),
            }
            .is_retryable()
        );
    }
}
