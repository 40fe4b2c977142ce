//! Fixture source trait definitions
//!
//! A source produces the full fixture list in one call. Sources are tried in
//! order by [`super::FallbackChain`], so each one only has to report its own
//! failure precisely.

use async_trait::async_trait;

use crate::errors::DirectoryResult;
use crate::models::Fixture;

/// Core fixture source trait
#[async_trait]
pub trait FixtureSource: Send + Sync {
    /// Short name used in logs and errors
    fn name(&self) -> &str;

    /// Fetch the complete fixture list
    async fn fetch_fixtures(&self) -> DirectoryResult<Vec<Fixture>>;

    /// Whether this source serves built-in sample data rather than live data
    fn is_placeholder(&self) -> bool {
        false
    }
}
