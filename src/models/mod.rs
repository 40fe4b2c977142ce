//! Domain models shared by the directory, schedule and streaming layers.

pub mod filters;
pub mod fixture;

pub use filters::{FixtureFilters, StatusFilter};
pub use fixture::{Fixture, MatchStatus, PLACEHOLDER_IMAGE, StreamDescriptor};
