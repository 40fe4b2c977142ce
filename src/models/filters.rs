use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use super::{Fixture, MatchStatus};

/// Status selector for list views; `All` disables status filtering
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum StatusFilter {
    #[default]
    All,
    Live,
    Upcoming,
    Finished,
}

impl StatusFilter {
    pub fn accepts(&self, status: MatchStatus) -> bool {
        match self {
            StatusFilter::All => true,
            StatusFilter::Live => status == MatchStatus::Live,
            StatusFilter::Upcoming => status == MatchStatus::Upcoming,
            StatusFilter::Finished => status == MatchStatus::Finished,
        }
    }
}

/// League, status and free-text filters applied to a fixture list.
///
/// An empty league or the literal `all` means every league.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FixtureFilters {
    #[serde(default)]
    pub league: String,
    #[serde(default)]
    pub status: StatusFilter,
    #[serde(default)]
    pub search: String,
}

impl FixtureFilters {
    pub fn league_filter(&self) -> Option<&str> {
        let league = self.league.trim();
        if league.is_empty() || league.eq_ignore_ascii_case("all") {
            None
        } else {
            Some(league)
        }
    }

    pub fn matches(&self, fixture: &Fixture, now_ms: i64) -> bool {
        if let Some(league) = self.league_filter()
            && fixture.league != league
        {
            return false;
        }
        if !self.status.accepts(fixture.status_at(now_ms)) {
            return false;
        }
        fixture.matches_search(&self.search)
    }

    /// Number of filters currently narrowing the list (badge count)
    pub fn active_count(&self) -> usize {
        [
            self.league_filter().is_some(),
            self.status != StatusFilter::All,
            !self.search.trim().is_empty(),
        ]
        .into_iter()
        .filter(|active| *active)
        .count()
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const NOW_MS: i64 = 1_760_000_000_000;

    fn fixture(id: &str, league: &str, offset_secs: i64) -> Fixture {
        serde_json::from_value(json!({
            "id": id,
            "league": league,
            "home_name": "Liverpool",
            "away_name": "Arsenal",
            "match_time": NOW_MS / 1000 + offset_secs,
        }))
        .unwrap()
    }

    #[test]
    fn default_filters_accept_everything() {
        let filters = FixtureFilters::default();
        assert!(filters.matches(&fixture("1", "Premier League", 3600), NOW_MS));
        assert!(filters.matches(&fixture("2", "La Liga", -3 * 3600), NOW_MS));
        assert_eq!(filters.active_count(), 0);
    }

    #[test]
    fn league_all_is_treated_as_no_filter() {
        let filters = FixtureFilters {
            league: "all".to_string(),
            ..Default::default()
        };
        assert_eq!(filters.league_filter(), None);
        assert!(filters.matches(&fixture("1", "Serie A", 0), NOW_MS));
    }

    #[test]
    fn combines_league_status_and_search() {
        let filters = FixtureFilters {
            league: "Premier League".to_string(),
            status: StatusFilter::Live,
            search: "arsenal".to_string(),
        };
        assert_eq!(filters.active_count(), 3);
        assert!(filters.matches(&fixture("1", "Premier League", 0), NOW_MS));
        assert!(!filters.matches(&fixture("2", "Premier League", 3600), NOW_MS));
        assert!(!filters.matches(&fixture("3", "La Liga", 0), NOW_MS));
    }

    #[test]
    fn status_filter_parses_case_insensitively() {
        assert_eq!("Upcoming".parse::<StatusFilter>().unwrap(), StatusFilter::Upcoming);
        assert_eq!("all".parse::<StatusFilter>().unwrap(), StatusFilter::All);
        assert!("soon".parse::<StatusFilter>().is_err());
    }

    #[test]
    fn clear_resets_all_filters() {
        let mut filters = FixtureFilters {
            league: "La Liga".to_string(),
            status: StatusFilter::Finished,
            search: "x".to_string(),
        };
        filters.clear();
        assert_eq!(filters, FixtureFilters::default());
    }
}
