use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use strum::{AsRefStr, Display, EnumString};

use crate::schedule::{self, Classification};

/// Image shown when a side has no crest
pub const PLACEHOLDER_IMAGE: &str = "/placeholder.svg?height=80&width=80";

/// A scheduled match with its candidate streams
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Fixture {
    #[serde(deserialize_with = "lenient_string")]
    pub id: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub league: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub home_name: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub away_name: String,
    #[serde(default, deserialize_with = "optional_image")]
    pub home_img: Option<String>,
    #[serde(default, deserialize_with = "optional_image")]
    pub away_img: Option<String>,
    /// Kick-off as epoch seconds
    #[serde(default, deserialize_with = "lenient_epoch_seconds")]
    pub match_time: i64,
    #[serde(default, deserialize_with = "lenient_links")]
    pub links: Vec<StreamDescriptor>,
}

/// One candidate stream before resolution.
///
/// `name` is matched by substring to pick a provider template and quality
/// tier; `url` is either an absolute URL or a provider stream key.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct StreamDescriptor {
    #[serde(default, deserialize_with = "lenient_string")]
    pub name: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub url: String,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum MatchStatus {
    Live,
    Upcoming,
    Finished,
}

impl MatchStatus {
    /// Badge text used by list views
    pub fn label(&self) -> &'static str {
        match self {
            MatchStatus::Live => "LIVE",
            MatchStatus::Upcoming => "UPCOMING",
            MatchStatus::Finished => "FINISHED",
        }
    }
}

impl StreamDescriptor {
    pub fn new<N: Into<String>, U: Into<String>>(name: N, url: U) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
        }
    }
}

impl Fixture {
    pub fn home_image(&self) -> &str {
        self.home_img.as_deref().unwrap_or(PLACEHOLDER_IMAGE)
    }

    pub fn away_image(&self) -> &str {
        self.away_img.as_deref().unwrap_or(PLACEHOLDER_IMAGE)
    }

    /// "Home vs Away", with generic labels for missing names
    pub fn title(&self) -> String {
        let home = if self.home_name.is_empty() {
            "Home Team"
        } else {
            &self.home_name
        };
        let away = if self.away_name.is_empty() {
            "Away Team"
        } else {
            &self.away_name
        };
        format!("{home} vs {away}")
    }

    pub fn classify_at(&self, now_ms: i64) -> Classification {
        schedule::classify(self.match_time, now_ms)
    }

    pub fn status_at(&self, now_ms: i64) -> MatchStatus {
        self.classify_at(now_ms).status
    }

    pub fn has_streams(&self) -> bool {
        !self.links.is_empty()
    }

    /// Stream opened when the player first becomes ready: the first HD
    /// labelled link, otherwise the first link.
    pub fn default_stream(&self) -> Option<&StreamDescriptor> {
        self.links
            .iter()
            .find(|link| link.name.contains("HD"))
            .or_else(|| self.links.first())
    }

    /// Case-insensitive match against both side names and the league
    pub fn matches_search(&self, needle: &str) -> bool {
        let needle = needle.trim().to_lowercase();
        if needle.is_empty() {
            return true;
        }
        [&self.home_name, &self.away_name, &self.league]
            .iter()
            .any(|field| field.to_lowercase().contains(&needle))
    }
}

fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => s,
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        _ => String::new(),
    })
}

fn optional_image<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) if !s.trim().is_empty() => Some(s),
        _ => None,
    })
}

/// Integers, floats and numeric strings are accepted; anything else maps to
/// zero, which classifies as finished.
fn lenient_epoch_seconds<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(parse_epoch_seconds(&Value::deserialize(deserializer)?))
}

pub(crate) fn parse_epoch_seconds(value: &Value) -> i64 {
    match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.is_finite()).map(|f| f.floor() as i64))
            .unwrap_or(0),
        Value::String(s) => {
            let s = s.trim();
            s.parse::<i64>()
                .ok()
                .or_else(|| {
                    s.parse::<f64>()
                        .ok()
                        .filter(|f| f.is_finite())
                        .map(|f| f.floor() as i64)
                })
                .unwrap_or(0)
        }
        _ => 0,
    }
}

fn lenient_links<'de, D>(deserializer: D) -> Result<Vec<StreamDescriptor>, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::Array(items) => Ok(items
            .into_iter()
            .filter_map(|item| serde_json::from_value(item).ok())
            .collect()),
        _ => Ok(Vec::new()),
    }
}
