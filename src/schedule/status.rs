//! Live/upcoming/finished classification from a kick-off timestamp.
//!
//! With `diff = kickoff_ms - now_ms` the three bands are:
//!
//! - `upcoming`: `diff > 10min`
//! - `live`: `-2h < diff <= 10min`
//! - `finished`: `diff <= -2h`
//!
//! Every view derives status through [`classify`] so list badges, detail
//! pages and the live tab can never disagree.

use crate::models::{Fixture, MatchStatus};

use super::countdown::{Countdown, minutes_until_summary};

/// A fixture counts as live from this long before kick-off
pub const LIVE_LEAD_MS: i64 = 10 * 60 * 1000;

/// A fixture stays live for this long after kick-off
pub const LIVE_TAIL_MS: i64 = 2 * 60 * 60 * 1000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Classification {
    pub status: MatchStatus,
    /// Signed distance to kick-off; negative once the match has started
    pub ms_until_start: i64,
}

/// Classify a fixture at `now_ms`.
///
/// Arithmetic saturates, so absurd timestamps still land in a band instead
/// of overflowing.
pub fn classify(match_time_secs: i64, now_ms: i64) -> Classification {
    let ms_until_start = match_time_secs.saturating_mul(1000).saturating_sub(now_ms);
    Classification {
        status: status_for_diff(ms_until_start),
        ms_until_start,
    }
}

pub fn status_for_diff(ms_until_start: i64) -> MatchStatus {
    if ms_until_start > LIVE_LEAD_MS {
        MatchStatus::Upcoming
    } else if ms_until_start > -LIVE_TAIL_MS {
        MatchStatus::Live
    } else {
        MatchStatus::Finished
    }
}

/// Milliseconds until the status next changes, or `None` once finished.
///
/// Lets a view schedule one timer per transition instead of polling.
pub fn next_transition_in(match_time_secs: i64, now_ms: i64) -> Option<i64> {
    let classification = classify(match_time_secs, now_ms);
    match classification.status {
        MatchStatus::Upcoming => Some(classification.ms_until_start - LIVE_LEAD_MS),
        MatchStatus::Live => Some(classification.ms_until_start + LIVE_TAIL_MS),
        MatchStatus::Finished => None,
    }
}

impl Classification {
    pub fn is_live(&self) -> bool {
        self.status == MatchStatus::Live
    }

    pub fn countdown(&self) -> Countdown {
        Countdown::from_millis(self.ms_until_start)
    }

    pub fn summary(&self) -> String {
        minutes_until_summary(self.ms_until_start)
    }

    /// The player opens while live or within the lead window before kick-off.
    ///
    /// Finished fixtures also pass; whether they have links is checked by
    /// [`StreamAvailability`].
    pub fn can_watch(&self) -> bool {
        self.is_live() || self.ms_until_start <= LIVE_LEAD_MS
    }
}

/// What a detail view should show instead of (or as) the player
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamAvailability {
    Watchable,
    /// Links exist but the lead window has not opened yet
    NotYet,
    /// The fixture carries no stream descriptors
    NoLinks,
}

impl StreamAvailability {
    pub fn for_fixture(fixture: &Fixture, now_ms: i64) -> Self {
        if !fixture.has_streams() {
            Self::NoLinks
        } else if !fixture.classify_at(now_ms).can_watch() {
            Self::NotYet
        } else {
            Self::Watchable
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            Self::Watchable => "Stream available",
            Self::NotYet => "The stream will be available 10 minutes before the match starts.",
            Self::NoLinks => "No stream link available for this match.",
        }
    }
}
