//! Map a stream descriptor to a playable URL.
//!
//! Descriptors are parsed once into a [`StreamRoute`]; rendering a route is a
//! pure function of the route, the session's [`AuthToken`] and the client
//! flag. Resolution never fails: unrecognised names pass the raw value
//! through unchanged.

use std::fmt;

use tracing::trace;

use crate::models::StreamDescriptor;
use crate::utils::url::UrlUtils;

use super::auth_token::AuthToken;
use super::classification::{ContainerFormat, classify_container};

/// Provider-V host; always served as HLS
pub const PROVIDER_V_HOST: &str = "pull.niues.live";
/// Provider-C host; FLV or HLS depending on the client flag
pub const PROVIDER_C_HOST: &str = "pull.dangaoka.com";
/// Absolute-URL host whose manifests are rewritten to FLV when the client
/// flag is false. This is the opposite polarity to Provider-C.
pub const REWRITE_HOST: &str = "pull.niur.live";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tier {
    Hd,
    Sd,
}

impl Tier {
    fn suffix(&self) -> &'static str {
        match self {
            Tier::Hd => "lhd",
            Tier::Sd => "lsd",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Provider {
    V,
    C,
}

impl Provider {
    pub fn host(&self) -> &'static str {
        match self {
            Provider::V => PROVIDER_V_HOST,
            Provider::C => PROVIDER_C_HOST,
        }
    }

    fn container(&self, is_apple_like: bool) -> ContainerFormat {
        match self {
            Provider::V => ContainerFormat::Manifest,
            Provider::C if is_apple_like => ContainerFormat::RawSegment,
            Provider::C => ContainerFormat::Manifest,
        }
    }
}

/// Name markers checked in order; the first substring hit wins
const NAME_MARKERS: [(&str, Provider, Tier); 4] = [
    ("V HD", Provider::V, Tier::Hd),
    ("V SD", Provider::V, Tier::Sd),
    ("C HD", Provider::C, Tier::Hd),
    ("C SD", Provider::C, Tier::Sd),
];

/// A descriptor after parsing
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum StreamRoute {
    /// The value is already a URL
    DirectUrl(String),
    /// The value is a provider stream key
    Provider {
        provider: Provider,
        tier: Tier,
        key: String,
    },
    /// Unrecognised name; the value is used verbatim
    PassThrough(String),
}

impl StreamRoute {
    pub fn parse(descriptor: &StreamDescriptor) -> Self {
        if UrlUtils::looks_absolute(&descriptor.url) {
            return StreamRoute::DirectUrl(descriptor.url.clone());
        }
        NAME_MARKERS
            .iter()
            .find(|(marker, _, _)| descriptor.name.contains(marker))
            .map(|(_, provider, tier)| StreamRoute::Provider {
                provider: *provider,
                tier: *tier,
                key: descriptor.url.clone(),
            })
            .unwrap_or_else(|| StreamRoute::PassThrough(descriptor.url.clone()))
    }

    pub fn render(&self, token: &AuthToken, is_apple_like: bool) -> String {
        match self {
            StreamRoute::DirectUrl(url) => {
                if !is_apple_like && url.contains(REWRITE_HOST) {
                    url.replacen(".m3u8", ".flv", 1)
                } else {
                    url.clone()
                }
            }
            StreamRoute::Provider {
                provider,
                tier,
                key,
            } => {
                let extension = provider
                    .container(is_apple_like)
                    .extension()
                    .unwrap_or("m3u8");
                format!(
                    "https://{}/live/stream-{}_{}.{}?auth_key={}",
                    provider.host(),
                    key,
                    tier.suffix(),
                    extension,
                    token
                )
            }
            StreamRoute::PassThrough(value) => value.clone(),
        }
    }
}

impl fmt::Display for StreamRoute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StreamRoute::DirectUrl(_) => f.write_str("direct"),
            StreamRoute::Provider { provider, tier, .. } => {
                write!(f, "provider-{:?} {}", provider, tier.suffix())
            }
            StreamRoute::PassThrough(_) => f.write_str("pass-through"),
        }
    }
}

/// The outcome of resolving one descriptor
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedStream {
    pub name: String,
    pub route: StreamRoute,
    pub url: String,
    pub container: ContainerFormat,
}

/// Resolves descriptors with one token for the lifetime of a session
#[derive(Debug, Clone)]
pub struct StreamResolver {
    token: AuthToken,
    is_apple_like: bool,
}

impl StreamResolver {
    pub fn new(token: AuthToken, is_apple_like: bool) -> Self {
        Self {
            token,
            is_apple_like,
        }
    }

    pub fn token(&self) -> &AuthToken {
        &self.token
    }

    pub fn is_apple_like(&self) -> bool {
        self.is_apple_like
    }

    pub fn resolve(&self, descriptor: &StreamDescriptor) -> ResolvedStream {
        let route = StreamRoute::parse(descriptor);
        let url = route.render(&self.token, self.is_apple_like);
        trace!(
            "Resolved '{}' via {} to {}",
            descriptor.name,
            route,
            UrlUtils::obfuscate_credentials(&url)
        );
        ResolvedStream {
            name: descriptor.name.clone(),
            container: classify_container(&url),
            route,
            url,
        }
    }

    pub fn resolve_all(&self, descriptors: &[StreamDescriptor]) -> Vec<ResolvedStream> {
        descriptors.iter().map(|d| self.resolve(d)).collect()
    }
}

/// Resolve a single descriptor to a URL
pub fn resolve(descriptor: &StreamDescriptor, is_apple_like: bool, token: &AuthToken) -> String {
    StreamRoute::parse(descriptor).render(token, is_apple_like)
}
