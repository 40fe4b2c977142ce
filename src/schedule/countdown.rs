use std::fmt;

const MS_PER_SECOND: i64 = 1000;
const MS_PER_MINUTE: i64 = 60 * MS_PER_SECOND;
const MS_PER_HOUR: i64 = 60 * MS_PER_MINUTE;

/// Detail-view countdown display
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Countdown {
    Remaining { hours: i64, minutes: i64, seconds: i64 },
    LiveNow,
}

impl Countdown {
    pub fn from_millis(ms_until_start: i64) -> Self {
        if ms_until_start <= 0 {
            return Countdown::LiveNow;
        }
        Countdown::Remaining {
            hours: ms_until_start / MS_PER_HOUR,
            minutes: (ms_until_start % MS_PER_HOUR) / MS_PER_MINUTE,
            seconds: (ms_until_start % MS_PER_MINUTE) / MS_PER_SECOND,
        }
    }

    pub fn is_live_now(&self) -> bool {
        matches!(self, Countdown::LiveNow)
    }
}

impl fmt::Display for Countdown {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Countdown::Remaining {
                hours,
                minutes,
                seconds,
            } => write!(f, "{hours:02}:{minutes:02}:{seconds:02}"),
            Countdown::LiveNow => f.write_str("LIVE NOW"),
        }
    }
}

/// `HH:MM:SS` with negative and zero inputs clamped to `00:00:00`
pub fn format_countdown(ms: i64) -> String {
    let ms = ms.max(0);
    format!(
        "{:02}:{:02}:{:02}",
        ms / MS_PER_HOUR,
        (ms % MS_PER_HOUR) / MS_PER_MINUTE,
        (ms % MS_PER_MINUTE) / MS_PER_SECOND
    )
}

/// Compact list-card summary: `"2h 5m"`, `"45m"`, or empty once started
pub fn minutes_until_summary(ms_until_start: i64) -> String {
    if ms_until_start <= 0 {
        return String::new();
    }
    let hours = ms_until_start / MS_PER_HOUR;
    let minutes = (ms_until_start % MS_PER_HOUR) / MS_PER_MINUTE;
    if hours > 0 {
        format!("{hours}h {minutes}m")
    } else {
        format!("{minutes}m")
    }
}

/// Countdown that latches into `LIVE NOW` and never goes back.
///
/// A clock stepping backwards after kick-off does not resurrect the timer.
#[derive(Debug, Clone)]
pub struct CountdownTimer {
    kickoff_ms: i64,
    live: bool,
}

impl CountdownTimer {
    pub fn new(match_time_secs: i64) -> Self {
        Self {
            kickoff_ms: match_time_secs.saturating_mul(1000),
            live: false,
        }
    }

    pub fn tick(&mut self, now_ms: i64) -> Countdown {
        if self.live {
            return Countdown::LiveNow;
        }
        let countdown = Countdown::from_millis(self.kickoff_ms.saturating_sub(now_ms));
        self.live = countdown.is_live_now();
        countdown
    }

    pub fn is_live(&self) -> bool {
        self.live
    }
}
