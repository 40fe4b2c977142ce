pub mod time;
pub mod url;

pub use time::{DayBucket, MatchTimeLabels, format_match_time, now_millis, parse_time_offset};
pub use url::UrlUtils;
