/*!
 * Container Classification
 * ========================
 *
 * Decide which decode path a resolved stream URL needs:
 *
 * - Manifest   (`.m3u8`, adaptive manifest, handled by the manifest adapter)
 * - RawSegment (`.flv`, raw segmented container, handled by the segment adapter)
 * - Native     (anything else, handed to the engine's built-in decoder)
 *
 * Only the last path segment's extension is inspected; query strings and
 * fragments never influence the result, so `x.flv?auth_key=1.m3u8` is FLV.
 *
 * This module is pure classification. Which adapter actually serves the URL
 * depends on the engine capabilities and is decided by the playback session.
 */

use strum::{Display, EnumString};

use crate::utils::url::UrlUtils;

/// How the engine should decode a stream URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum ContainerFormat {
    /// `.m3u8` adaptive manifest
    #[strum(serialize = "m3u8")]
    Manifest,
    /// `.flv` raw segmented container
    #[strum(serialize = "flv")]
    RawSegment,
    /// Anything else; played by the engine directly
    Native,
}

impl ContainerFormat {
    /// File extension emitted by provider templates for this format
    pub fn extension(&self) -> Option<&'static str> {
        match self {
            ContainerFormat::Manifest => Some("m3u8"),
            ContainerFormat::RawSegment => Some("flv"),
            ContainerFormat::Native => None,
        }
    }
}

/// Classify a resolved URL by its path extension.
pub fn classify_container(url: &str) -> ContainerFormat {
    match UrlUtils::path_extension(url).as_deref() {
        Some("m3u8") => ContainerFormat::Manifest,
        Some("flv") => ContainerFormat::RawSegment,
        _ => ContainerFormat::Native,
    }
}
