//! Centralized error handling for fbstream
//!
//! Errors are grouped by the layer that raises them:
//!
//! - **Directory Errors**: fixture transport, payload decoding, fallback exhaustion
//! - **Playback Errors**: engine bootstrap, container dispatch, runtime engine failures
//! - **Application Errors**: configuration and anything surfaced at the binary edge
//!
//! The status classifier and the stream resolver are total functions and have
//! no error type of their own.
//!
//! # Usage
//!
//! ```rust
//! use fbstream::errors::{AppError, AppResult};
//!
//! fn example_function() -> AppResult<String> {
//!     Ok("success".to_string())
//! }
//! ```

pub mod types;

pub use types::*;

/// Convenience type alias for Results using AppError
pub type AppResult<T> = Result<T, AppError>;

/// Convenience type alias for fixture directory and source Results
pub type DirectoryResult<T> = Result<T, DirectoryError>;

/// Convenience type alias for playback session Results
pub type PlaybackResult<T> = Result<T, PlaybackError>;
