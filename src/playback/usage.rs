//! Estimated data usage for a playback session.
//!
//! Nothing here measures real traffic. Played time and buffered time are
//! both converted to megabytes at an assumed bitrate.

use std::time::Duration;

use tokio::time::Instant;

const BITS_PER_BYTE: f64 = 8.0;

/// Point-in-time usage figures
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DataUsageReport {
    /// Total time spent playing across every stream of the session
    pub played: Duration,
    pub played_mb: f64,
    /// Largest buffered span reported by the current engine
    pub buffered_mb: f64,
}

#[derive(Debug, Clone)]
pub struct DataUsage {
    bitrate_mbps: f64,
    played: Duration,
    playing_since: Option<Instant>,
    buffered: Duration,
}

impl DataUsage {
    pub fn new(bitrate_mbps: f64) -> Self {
        Self {
            bitrate_mbps,
            played: Duration::ZERO,
            playing_since: None,
            buffered: Duration::ZERO,
        }
    }

    pub fn is_running(&self) -> bool {
        self.playing_since.is_some()
    }

    /// Start counting played time. No-op while already running.
    pub fn start(&mut self) {
        if self.playing_since.is_none() {
            self.playing_since = Some(Instant::now());
        }
    }

    pub fn stop(&mut self) {
        if let Some(since) = self.playing_since.take() {
            self.played += since.elapsed();
        }
    }

    /// Buffered spans only grow for one engine
    pub fn record_buffered(&mut self, buffered: Duration) {
        if buffered > self.buffered {
            self.buffered = buffered;
        }
    }

    /// Called when a new engine replaces the previous one
    pub fn reset_buffered(&mut self) {
        self.buffered = Duration::ZERO;
    }

    pub fn played(&self) -> Duration {
        self.played + self.playing_since.map(|since| since.elapsed()).unwrap_or_default()
    }

    fn megabytes(&self, span: Duration) -> f64 {
        span.as_secs_f64() * self.bitrate_mbps / BITS_PER_BYTE
    }

    pub fn report(&self) -> DataUsageReport {
        let played = self.played();
        DataUsageReport {
            played,
            played_mb: self.megabytes(played),
            buffered_mb: self.megabytes(self.buffered),
        }
    }
}
