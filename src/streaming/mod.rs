//! Stream resolution: provider routing, authorization keys, container
//! classification and client capability detection.

pub mod auth_token;
pub mod classification;
pub mod client;
pub mod resolver;

pub use auth_token::{AuthToken, AuthTokenGenerator};
pub use classification::{ContainerFormat, classify_container};
pub use client::{ClientProfile, detect_apple_like};
pub use resolver::{ResolvedStream, StreamResolver, StreamRoute, Tier, resolve};
