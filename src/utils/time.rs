//! Time utilities for fixture display and clock shifting

use chrono::{DateTime, Days, TimeZone, Utc};
use regex::Regex;

/// Current wall-clock time as epoch milliseconds
pub fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}

/// Parse a time offset string like "+1h30m", "-45m", "+5s", "0" into seconds
pub fn parse_time_offset(offset_str: &str) -> Result<i32, String> {
    let offset_str = offset_str.trim();

    if offset_str == "0" || offset_str.is_empty() {
        return Ok(0);
    }

    let re = Regex::new(r"^([+-]?)(?:(\d+)d)?(?:(\d+)h)?(?:(\d+)m)?(?:(\d+)s)?$")
        .map_err(|e| format!("Invalid regex: {e}"))?;

    let caps = re.captures(offset_str).ok_or_else(|| {
        format!(
            "Invalid time offset format: '{offset_str}'. Expected format like '+1h30m', '-45m', '+2d' or '0'"
        )
    })?;

    let sign = match caps.get(1).map(|m| m.as_str()) {
        Some("-") => -1,
        _ => 1,
    };

    let part = |index: usize| -> i32 {
        caps.get(index)
            .and_then(|m| m.as_str().parse().ok())
            .unwrap_or(0)
    };
    let (days, hours, minutes, seconds) = (part(2), part(3), part(4), part(5));

    if days > 7 {
        return Err(format!("Day offset too large: {days}d. Maximum allowed is 7d"));
    }
    if hours > 23 || minutes > 59 || seconds > 59 {
        return Err(format!(
            "Invalid time offset components in '{offset_str}': hours must be < 24, minutes and seconds < 60"
        ));
    }

    Ok(sign * (days * 86_400 + hours * 3600 + minutes * 60 + seconds))
}

/// Convert epoch seconds to a UTC datetime, falling back to the epoch for
/// out-of-range values
pub fn from_epoch_seconds(seconds: i64) -> DateTime<Utc> {
    DateTime::from_timestamp(seconds, 0).unwrap_or(DateTime::UNIX_EPOCH)
}

/// Kick-off rendered three ways for different views
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchTimeLabels {
    /// "Jan 5"
    pub date: String,
    /// "18:30"
    pub time: String,
    /// "Jan 5, 18:30"
    pub full: String,
}

pub fn format_match_time<Z: TimeZone>(match_time_secs: i64, zone: &Z) -> MatchTimeLabels
where
    Z::Offset: std::fmt::Display,
{
    let local = from_epoch_seconds(match_time_secs).with_timezone(zone);
    let date = local.format("%b %-d").to_string();
    let time = local.format("%H:%M").to_string();
    MatchTimeLabels {
        full: format!("{date}, {time}"),
        date,
        time,
    }
}

/// Sidebar groupings for upcoming fixtures
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
pub enum DayBucket {
    Today,
    Tomorrow,
    #[strum(serialize = "This Week")]
    ThisWeek,
}

impl DayBucket {
    pub const ALL: [DayBucket; 3] = [DayBucket::Today, DayBucket::Tomorrow, DayBucket::ThisWeek];

    /// Today and Tomorrow compare calendar dates in `zone`; ThisWeek is the
    /// rolling window `(now, now + 7 days]`, so it overlaps the other two.
    pub fn contains<Z: TimeZone>(&self, match_time_secs: i64, now_ms: i64, zone: &Z) -> bool {
        let kickoff = from_epoch_seconds(match_time_secs).with_timezone(zone);
        let now = DateTime::from_timestamp_millis(now_ms)
            .unwrap_or(DateTime::UNIX_EPOCH)
            .with_timezone(zone);
        let today = now.date_naive();
        match self {
            DayBucket::Today => kickoff.date_naive() == today,
            DayBucket::Tomorrow => today
                .checked_add_days(Days::new(1))
                .is_some_and(|tomorrow| kickoff.date_naive() == tomorrow),
            DayBucket::ThisWeek => {
                let kickoff_ms = match_time_secs.saturating_mul(1000);
                kickoff_ms > now_ms && kickoff_ms <= now_ms.saturating_add(7 * 86_400_000)
            }
        }
    }
}
