/// Configuration default values
///
/// This module contains all the default values for configuration options,
/// making them easily changeable in one central location.
// Fixture source defaults
pub const DEFAULT_REPOSITORY: &str = "devxseven/mdata";
pub const DEFAULT_FILE_NAME: &str = "matches.json";
pub const DEFAULT_OBFUSCATION_KEY: &str = "devxseven";
pub const DEFAULT_API_BASE_URL: &str = "https://api.github.com";
pub const DEFAULT_RAW_BASE_URL: &str = "https://raw.githubusercontent.com";
pub const DEFAULT_USER_AGENT: &str = "FBStream-App";
pub const DEFAULT_REQUEST_TIMEOUT_SECONDS: u64 = 10;
pub const DEFAULT_PLACEHOLDER_FALLBACK: bool = true;

// Auth token defaults
pub const DEFAULT_REFERENCE_ZONE: &str = "Asia/Baku";
pub const DEFAULT_REINTERPRET_OFFSET_SECONDS: i32 = 3 * 3600;

// Player defaults
pub const DEFAULT_AUTOPLAY: bool = false;
pub const DEFAULT_LOOKS_LIVE: bool = true;
pub const DEFAULT_INITIAL_VOLUME: f32 = 0.7;
pub const DEFAULT_START_MUTED: bool = false;
pub const DEFAULT_ESTIMATED_BITRATE_MBPS: f64 = 2.0;

pub const DEFAULT_PLAYER_SCRIPTS: &[&str] = &[
    "https://cdn.jsdelivr.net/npm/artplayer/dist/artplayer.js",
    "https://unpkg.com/artplayer/dist/artplayer.js",
];
pub const DEFAULT_MANIFEST_ADAPTER_SCRIPTS: &[&str] = &[
    "https://cdnjs.cloudflare.com/ajax/libs/hls.js/1.4.10/hls.min.js",
    "https://cdn.jsdelivr.net/npm/hls.js@1.4.10/dist/hls.min.js",
];
pub const DEFAULT_SEGMENT_ADAPTER_SCRIPTS: &[&str] = &[
    "https://cdnjs.cloudflare.com/ajax/libs/flv.js/1.6.2/flv.min.js",
    "https://cdn.jsdelivr.net/npm/flv.js@1.6.2/dist/flv.min.js",
];

// Schedule defaults
pub const DEFAULT_COUNTDOWN_TICK_SECONDS: u64 = 1;
pub const DEFAULT_SUMMARY_TICK_SECONDS: u64 = 60;
