//! Where fixture lists come from.

pub mod chain;
pub mod github;
pub mod obfuscation;
pub mod placeholder;
pub mod traits;

pub use chain::{FallbackChain, FetchOutcome};
pub use github::{GithubContentsSource, GithubRawSource};
pub use placeholder::PlaceholderSource;
pub use traits::FixtureSource;
