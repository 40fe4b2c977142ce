//! Match timing: status bands, countdowns and the timers that refresh them.

pub mod countdown;
pub mod status;
pub mod ticker;

pub use countdown::{Countdown, CountdownTimer, format_countdown, minutes_until_summary};
pub use status::{
    Classification, LIVE_LEAD_MS, LIVE_TAIL_MS, StreamAvailability, classify, next_transition_in,
    status_for_diff,
};
pub use ticker::ViewTimers;
