//! Fixture Directory Service
//!
//! Holds the current fixture list and refreshes it from a [`FallbackChain`].
//! Readers always get a snapshot, which may be empty or stale; only refresh
//! mutates the list. Fixture ids are unique within the list.

use std::collections::{BTreeSet, HashSet};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::TimeZone;
use tokio::sync::RwLock;
use tracing::{debug, error, info, warn};

use crate::models::{Fixture, FixtureFilters, MatchStatus};
use crate::sources::{FallbackChain, FetchOutcome};
use crate::utils::time::DayBucket;

/// Loading state exposed to views
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadState {
    /// No refresh has been started yet
    Idle,
    Loading,
    Ready {
        source_name: String,
        is_placeholder: bool,
        /// The last refresh failed and the previous list was kept
        stale: bool,
    },
    /// Every source failed and nothing usable was loaded
    Failed { message: String },
}

/// Which source produced the list currently held
#[derive(Debug, Clone, PartialEq, Eq)]
struct Origin {
    source_name: String,
    is_placeholder: bool,
}

#[derive(Debug)]
struct DirectoryState {
    fixtures: Arc<Vec<Fixture>>,
    origin: Option<Origin>,
    load_state: LoadState,
}

/// Shared, refreshable fixture list
#[derive(Debug, Clone)]
pub struct FixtureDirectory {
    chain: FallbackChain,
    state: Arc<RwLock<DirectoryState>>,
    refresh_counter: Arc<AtomicU64>,
}

impl FixtureDirectory {
    pub fn new(chain: FallbackChain) -> Self {
        Self {
            chain,
            state: Arc::new(RwLock::new(DirectoryState {
                fixtures: Arc::new(Vec::new()),
                origin: None,
                load_state: LoadState::Idle,
            })),
            refresh_counter: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Fetch a new list. Never fails; the outcome is reflected in
    /// [`Self::load_state`].
    ///
    /// Concurrent refreshes are applied in completion order, so the one that
    /// finishes last wins.
    pub async fn refresh(&self) -> LoadState {
        let refresh_id = self.refresh_counter.fetch_add(1, Ordering::SeqCst) + 1;
        self.state.write().await.load_state = LoadState::Loading;
        debug!("Directory refresh {} started", refresh_id);

        let result = self.chain.fetch().await;

        let mut state = self.state.write().await;
        let next = match result {
            Ok(outcome) => Self::apply_outcome(&mut state, outcome),
            Err(e) => match &state.origin {
                Some(origin) => {
                    warn!(
                        "Fixture refresh {} failed, keeping {} previous fixtures: {}",
                        refresh_id,
                        state.fixtures.len(),
                        e
                    );
                    Self::stale_state(origin)
                }
                None => {
                    error!("Fixture directory unavailable: {}", e);
                    LoadState::Failed {
                        message: e.to_string(),
                    }
                }
            },
        };
        state.load_state = next;
        debug!("Directory refresh {} applied", refresh_id);
        state.load_state.clone()
    }

    fn apply_outcome(state: &mut DirectoryState, outcome: FetchOutcome) -> LoadState {
        if outcome.is_placeholder
            && let Some(origin) = &state.origin
            && !origin.is_placeholder
        {
            warn!(
                "Remote sources failed, keeping {} previously fetched fixtures instead of placeholders",
                state.fixtures.len()
            );
            return Self::stale_state(origin);
        }

        let fixtures = Self::unique_by_id(outcome.fixtures);
        info!(
            "Directory loaded {} fixtures from {}",
            fixtures.len(),
            outcome.source_name
        );
        state.fixtures = Arc::new(fixtures);
        state.origin = Some(Origin {
            source_name: outcome.source_name.clone(),
            is_placeholder: outcome.is_placeholder,
        });
        LoadState::Ready {
            source_name: outcome.source_name,
            is_placeholder: outcome.is_placeholder,
            stale: false,
        }
    }

    /// Keep the first fixture for each id, in source order
    fn unique_by_id(fixtures: Vec<Fixture>) -> Vec<Fixture> {
        let mut seen = HashSet::new();
        fixtures
            .into_iter()
            .filter(|fixture| {
                let first = seen.insert(fixture.id.clone());
                if !first {
                    warn!(
                        "Dropping duplicate fixture id {} ({})",
                        fixture.id,
                        fixture.title()
                    );
                }
                first
            })
            .collect()
    }

    fn stale_state(origin: &Origin) -> LoadState {
        LoadState::Ready {
            source_name: origin.source_name.clone(),
            is_placeholder: origin.is_placeholder,
            stale: true,
        }
    }

    pub async fn load_state(&self) -> LoadState {
        self.state.read().await.load_state.clone()
    }

    /// Current list, in source order
    pub async fn snapshot(&self) -> Arc<Vec<Fixture>> {
        self.state.read().await.fixtures.clone()
    }

    pub async fn find(&self, id: &str) -> Option<Fixture> {
        self.snapshot().await.iter().find(|f| f.id == id).cloned()
    }

    /// Distinct non-empty league names, sorted
    pub async fn leagues(&self) -> Vec<String> {
        self.snapshot()
            .await
            .iter()
            .filter(|f| !f.league.trim().is_empty())
            .map(|f| f.league.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    pub async fn filter(&self, filters: &FixtureFilters, now_ms: i64) -> Vec<Fixture> {
        self.snapshot()
            .await
            .iter()
            .filter(|f| filters.matches(f, now_ms))
            .cloned()
            .collect()
    }

    /// Fixtures currently live
    pub async fn live_tab(&self, now_ms: i64) -> Vec<Fixture> {
        self.snapshot()
            .await
            .iter()
            .filter(|f| f.status_at(now_ms) == MatchStatus::Live)
            .cloned()
            .collect()
    }

    /// Fixtures in one of the sidebar day groupings
    pub async fn in_bucket<Z: TimeZone>(
        &self,
        bucket: DayBucket,
        now_ms: i64,
        zone: &Z,
    ) -> Vec<Fixture> {
        self.snapshot()
            .await
            .iter()
            .filter(|f| bucket.contains(f.match_time, now_ms, zone))
            .cloned()
            .collect()
    }
}
