//! Time-windowed authorization keys for provider stream URLs.
//!
//! A key has the shape `<timestamp>-0-0-<hash>`. The timestamp is the wall
//! clock of the reference zone read back as if it were at the reinterpret
//! offset, which makes it independent of the viewer's own zone. The hash is a
//! 32-bit rolling hash and is not meant to be cryptographic.

use std::fmt;

use chrono::{DateTime, FixedOffset, TimeZone, Utc};
use chrono_tz::Tz;
use rand::Rng;
use tracing::debug;

use crate::config::TokenConfig;
use crate::errors::{AppError, AppResult};

/// Lower bound of the random salt mixed into the hash
pub const RANDOM_MIN: u64 = 1_000_000_000;
/// Upper bound (inclusive) of the random salt
pub const RANDOM_MAX: u64 = 9_999_999_999;

/// An authorization key, reused for every stream resolved in one session
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AuthToken(String);

impl AuthToken {
    pub fn new<S: Into<String>>(raw: S) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Leading timestamp component
    pub fn timestamp(&self) -> Option<i64> {
        self.0.split('-').next()?.parse().ok()
    }
}

impl fmt::Display for AuthToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone)]
pub struct AuthTokenGenerator {
    zone: Tz,
    reinterpret_at: FixedOffset,
}

impl AuthTokenGenerator {
    pub fn new(zone: Tz, reinterpret_at: FixedOffset) -> Self {
        Self {
            zone,
            reinterpret_at,
        }
    }

    pub fn from_config(config: &TokenConfig) -> AppResult<Self> {
        let zone: Tz = config.reference_zone.parse().map_err(|_| {
            AppError::configuration(format!(
                "unknown reference zone: {}",
                config.reference_zone
            ))
        })?;
        let reinterpret_at = FixedOffset::east_opt(config.reinterpret_offset_seconds).ok_or_else(
            || {
                AppError::configuration(format!(
                    "reinterpret offset out of range: {}s",
                    config.reinterpret_offset_seconds
                ))
            },
        )?;
        Ok(Self::new(zone, reinterpret_at))
    }

    /// Generate a key from the current clock and a fresh random salt
    pub fn generate(&self) -> AuthToken {
        let random = rand::rng().random_range(RANDOM_MIN..=RANDOM_MAX);
        let token = self.generate_at(Utc::now(), random);
        debug!("Generated auth token with timestamp {:?}", token.timestamp());
        token
    }

    pub fn generate_at(&self, now: DateTime<Utc>, random: u64) -> AuthToken {
        let timestamp = self.timestamp_at(now);
        let hash = rolling_hash(&format!("{timestamp}{random}"));
        AuthToken(format!("{timestamp}-0-0-{hash}"))
    }

    /// Reference-zone wall clock reinterpreted at the fixed offset, in seconds
    pub fn timestamp_at(&self, now: DateTime<Utc>) -> i64 {
        let wall = now.with_timezone(&self.zone).naive_local();
        self.reinterpret_at
            .from_local_datetime(&wall)
            .single()
            .map(|dt| dt.timestamp())
            .unwrap_or_else(|| now.timestamp())
    }
}

/// `h = h * 31 + code` over UTF-16 code units with 32-bit wrap-around,
/// rendered as lowercase hex of the absolute value
pub fn rolling_hash(input: &str) -> String {
    let hash = input.encode_utf16().fold(0i32, |h, unit| {
        h.wrapping_shl(5).wrapping_sub(h).wrapping_add(i32::from(unit))
    });
    format!("{:x}", i64::from(hash).abs())
}
