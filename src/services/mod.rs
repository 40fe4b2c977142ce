//! Service layer: long-lived state shared between views.

pub mod directory;

pub use directory::{FixtureDirectory, LoadState};
