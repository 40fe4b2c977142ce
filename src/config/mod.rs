use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info};

use crate::errors::{AppError, AppResult};

pub mod defaults;
pub mod duration_serde;

use defaults::*;
use duration_serde::duration;

/// Environment prefix for overrides, e.g. `FBSTREAM_PLAYER__INITIAL_VOLUME=0.5`
pub const ENV_PREFIX: &str = "FBSTREAM_";

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub source: SourceConfig,
    #[serde(default)]
    pub token: TokenConfig,
    #[serde(default)]
    pub player: PlayerConfig,
    #[serde(default)]
    pub schedule: ScheduleConfig,
}

/// Remote fixture list location and transport settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    /// `owner/name` of the repository holding the fixture file
    #[serde(default = "default_repository")]
    pub repository: String,
    #[serde(default = "default_file_name")]
    pub file_name: String,
    /// XOR key applied to every key and value of the fixture file
    #[serde(default = "default_obfuscation_key")]
    pub obfuscation_key: String,
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,
    #[serde(default = "default_raw_base_url")]
    pub raw_base_url: String,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    #[serde(default = "default_request_timeout", with = "duration")]
    pub request_timeout: Duration,
    /// Serve built-in placeholder fixtures when every remote source fails
    #[serde(default = "default_placeholder_fallback")]
    pub placeholder_fallback: bool,
}

/// Auth token time window settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenConfig {
    /// IANA zone whose wall clock seeds the token timestamp
    #[serde(default = "default_reference_zone")]
    pub reference_zone: String,
    /// Offset (seconds east of UTC) the wall-clock reading is reinterpreted at
    #[serde(default = "default_reinterpret_offset_seconds")]
    pub reinterpret_offset_seconds: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerConfig {
    #[serde(default = "default_autoplay")]
    pub autoplay: bool,
    #[serde(default = "default_looks_live")]
    pub looks_live: bool,
    #[serde(default = "default_initial_volume")]
    pub initial_volume: f32,
    #[serde(default = "default_start_muted")]
    pub start_muted: bool,
    /// Bitrate assumed when estimating data usage
    #[serde(default = "default_estimated_bitrate_mbps")]
    pub estimated_bitrate_mbps: f64,
    #[serde(default)]
    pub scripts: EngineScriptsConfig,
}

/// Candidate script locations, tried in order until one loads
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineScriptsConfig {
    #[serde(default = "default_player_scripts")]
    pub player: Vec<String>,
    #[serde(default = "default_manifest_adapter_scripts")]
    pub manifest_adapter: Vec<String>,
    #[serde(default = "default_segment_adapter_scripts")]
    pub segment_adapter: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleConfig {
    /// Countdown refresh period on detail views
    #[serde(default = "default_countdown_tick", with = "duration")]
    pub countdown_tick: Duration,
    /// "Starts in" summary refresh period on list views
    #[serde(default = "default_summary_tick", with = "duration")]
    pub summary_tick: Duration,
}

// Source defaults
fn default_repository() -> String {
    DEFAULT_REPOSITORY.to_string()
}

fn default_file_name() -> String {
    DEFAULT_FILE_NAME.to_string()
}

fn default_obfuscation_key() -> String {
    DEFAULT_OBFUSCATION_KEY.to_string()
}

fn default_api_base_url() -> String {
    DEFAULT_API_BASE_URL.to_string()
}

fn default_raw_base_url() -> String {
    DEFAULT_RAW_BASE_URL.to_string()
}

fn default_user_agent() -> String {
    DEFAULT_USER_AGENT.to_string()
}

fn default_request_timeout() -> Duration {
    Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECONDS)
}

fn default_placeholder_fallback() -> bool {
    DEFAULT_PLACEHOLDER_FALLBACK
}

// Token defaults
fn default_reference_zone() -> String {
    DEFAULT_REFERENCE_ZONE.to_string()
}

fn default_reinterpret_offset_seconds() -> i32 {
    DEFAULT_REINTERPRET_OFFSET_SECONDS
}

// Player defaults
fn default_autoplay() -> bool {
    DEFAULT_AUTOPLAY
}

fn default_looks_live() -> bool {
    DEFAULT_LOOKS_LIVE
}

fn default_initial_volume() -> f32 {
    DEFAULT_INITIAL_VOLUME
}

fn default_start_muted() -> bool {
    DEFAULT_START_MUTED
}

fn default_estimated_bitrate_mbps() -> f64 {
    DEFAULT_ESTIMATED_BITRATE_MBPS
}

fn to_strings(urls: &[&str]) -> Vec<String> {
    urls.iter().map(|u| u.to_string()).collect()
}

fn default_player_scripts() -> Vec<String> {
    to_strings(DEFAULT_PLAYER_SCRIPTS)
}

fn default_manifest_adapter_scripts() -> Vec<String> {
    to_strings(DEFAULT_MANIFEST_ADAPTER_SCRIPTS)
}

fn default_segment_adapter_scripts() -> Vec<String> {
    to_strings(DEFAULT_SEGMENT_ADAPTER_SCRIPTS)
}

// Schedule defaults
fn default_countdown_tick() -> Duration {
    Duration::from_secs(DEFAULT_COUNTDOWN_TICK_SECONDS)
}

fn default_summary_tick() -> Duration {
    Duration::from_secs(DEFAULT_SUMMARY_TICK_SECONDS)
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            repository: default_repository(),
            file_name: default_file_name(),
            obfuscation_key: default_obfuscation_key(),
            api_base_url: default_api_base_url(),
            raw_base_url: default_raw_base_url(),
            user_agent: default_user_agent(),
            request_timeout: default_request_timeout(),
            placeholder_fallback: default_placeholder_fallback(),
        }
    }
}

impl Default for TokenConfig {
    fn default() -> Self {
        Self {
            reference_zone: default_reference_zone(),
            reinterpret_offset_seconds: default_reinterpret_offset_seconds(),
        }
    }
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            autoplay: default_autoplay(),
            looks_live: default_looks_live(),
            initial_volume: default_initial_volume(),
            start_muted: default_start_muted(),
            estimated_bitrate_mbps: default_estimated_bitrate_mbps(),
            scripts: EngineScriptsConfig::default(),
        }
    }
}

impl Default for EngineScriptsConfig {
    fn default() -> Self {
        Self {
            player: default_player_scripts(),
            manifest_adapter: default_manifest_adapter_scripts(),
            segment_adapter: default_segment_adapter_scripts(),
        }
    }
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            countdown_tick: default_countdown_tick(),
            summary_tick: default_summary_tick(),
        }
    }
}

impl SourceConfig {
    /// GitHub contents API endpoint for the fixture file
    pub fn contents_url(&self) -> String {
        format!(
            "{}/repos/{}/contents/{}",
            self.api_base_url.trim_end_matches('/'),
            self.repository,
            self.file_name
        )
    }

    /// Raw download endpoint for the fixture file on the `main` branch
    pub fn raw_url(&self) -> String {
        format!(
            "{}/{}/main/{}",
            self.raw_base_url.trim_end_matches('/'),
            self.repository,
            self.file_name
        )
    }
}

impl Config {
    /// Load configuration, creating a default file when none exists.
    ///
    /// Existing files are layered over the built-in defaults and then over
    /// `FBSTREAM_` prefixed environment variables (`__` separates sections).
    pub fn load_from_file(config_file: &str) -> AppResult<Self> {
        if !Path::new(config_file).exists() {
            let default_config = Self::default();
            let contents = toml::to_string_pretty(&default_config)
                .map_err(|e| AppError::configuration(format!("Failed to render defaults: {e}")))?;
            std::fs::write(config_file, contents).map_err(|e| {
                AppError::configuration(format!("Failed to write {config_file}: {e}"))
            })?;
            info!("Created default config file: {}", config_file);
        }

        let config = Self::figment(config_file).extract::<Self>().map_err(|e| {
            AppError::configuration(format!("Failed to load {config_file}: {e}"))
        })?;
        config.validate()?;
        debug!("Configuration resolved: {:?}", config);
        Ok(config)
    }

    /// Defaults, then the TOML file, then environment overrides
    pub fn figment(config_file: &str) -> Figment {
        Figment::from(Serialized::defaults(Self::default()))
            .merge(Toml::file(config_file))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
    }

    pub fn validate(&self) -> AppResult<()> {
        if !(0.0..=1.0).contains(&self.player.initial_volume) {
            return Err(AppError::configuration(format!(
                "player.initial_volume must be within 0.0..=1.0, got {}",
                self.player.initial_volume
            )));
        }
        if self.player.estimated_bitrate_mbps.is_nan() || self.player.estimated_bitrate_mbps <= 0.0 {
            return Err(AppError::configuration(format!(
                "player.estimated_bitrate_mbps must be positive, got {}",
                self.player.estimated_bitrate_mbps
            )));
        }
        if self.token.reference_zone.parse::<chrono_tz::Tz>().is_err() {
            return Err(AppError::configuration(format!(
                "token.reference_zone is not a known time zone: {}",
                self.token.reference_zone
            )));
        }
        if self.token.reinterpret_offset_seconds.abs() >= 24 * 3600 {
            return Err(AppError::configuration(
                "token.reinterpret_offset_seconds must be less than 24 hours",
            ));
        }
        let scripts = &self.player.scripts;
        for (name, urls) in [
            ("player", &scripts.player),
            ("manifest_adapter", &scripts.manifest_adapter),
            ("segment_adapter", &scripts.segment_adapter),
        ] {
            if urls.is_empty() {
                return Err(AppError::configuration(format!(
                    "player.scripts.{name} needs at least one location"
                )));
            }
        }
        if self.schedule.countdown_tick.is_zero() || self.schedule.summary_tick.is_zero() {
            return Err(AppError::configuration("schedule ticks must be non-zero"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_player_setup() {
        let config = Config::default();
        assert!(!config.player.autoplay);
        assert!(config.player.looks_live);
        assert_eq!(config.player.initial_volume, 0.7);
        assert!(!config.player.start_muted);
        assert_eq!(config.player.estimated_bitrate_mbps, 2.0);
        assert_eq!(config.token.reference_zone, "Asia/Baku");
        assert_eq!(config.token.reinterpret_offset_seconds, 10800);
        assert_eq!(config.schedule.countdown_tick, Duration::from_secs(1));
        assert_eq!(config.schedule.summary_tick, Duration::from_secs(60));
        config.validate().unwrap();
    }

    #[test]
    fn source_urls_are_built_from_repository() {
        let source = SourceConfig::default();
        assert_eq!(
            source.contents_url(),
            "https://api.github.com/repos/devxseven/mdata/contents/matches.json"
        );
        assert_eq!(
            source.raw_url(),
            "https://raw.githubusercontent.com/devxseven/mdata/main/matches.json"
        );
    }

    #[test]
    fn partial_toml_keeps_remaining_defaults() {
        let config: Config = toml::from_str(
            r#"
            [player]
            initial_volume = 0.3

            [schedule]
            summary_tick = "30s"
            "#,
        )
        .unwrap();
        assert_eq!(config.player.initial_volume, 0.3);
        assert!(config.player.looks_live);
        assert_eq!(config.schedule.summary_tick, Duration::from_secs(30));
        assert_eq!(config.source.file_name, "matches.json");
    }

    #[test]
    fn validate_rejects_out_of_range_volume() {
        let mut config = Config::default();
        config.player.initial_volume = 1.5;
        assert!(matches!(
            config.validate(),
            Err(AppError::Configuration { .. })
        ));
    }

    #[test]
    fn validate_rejects_non_positive_bitrate() {
        let mut config = Config::default();
        config.player.estimated_bitrate_mbps = 0.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_unknown_zone() {
        let mut config = Config::default();
        config.token.reference_zone = "Mars/Olympus".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn load_from_file_writes_defaults_when_missing() {
        let path = std::env::temp_dir().join(format!(
            "fbstream-config-{}.toml",
            std::process::id()
        ));
        let _ = std::fs::remove_file(&path);
        let path_str = path.to_string_lossy().to_string();

        let config = Config::load_from_file(&path_str).unwrap();
        assert!(path.exists());
        assert_eq!(config.source.repository, "devxseven/mdata");

        let reloaded = Config::load_from_file(&path_str).unwrap();
        assert_eq!(reloaded.player.initial_volume, config.player.initial_volume);
        let _ = std::fs::remove_file(&path);
    }
}
