//! Command implementations behind the `fbstream` binary.
//!
//! Rendering functions return lines instead of printing so they can be
//! checked in tests; `main.rs` owns stdout.

use std::ops::ControlFlow;
use std::sync::Arc;
use std::time::Duration;

use chrono::TimeZone;
use tokio::sync::mpsc;
use tokio::time::{Instant, sleep_until};
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::errors::{AppError, AppResult};
use crate::models::{Fixture, FixtureFilters, MatchStatus};
use crate::playback::{
    EngineBootstrap, EngineEvent, EngineEventKind, HttpScriptLoader, LoggingBackend,
    PlaybackSessionController, PlayerOptions,
};
use crate::schedule::{StreamAvailability, ViewTimers, next_transition_in};
use crate::services::FixtureDirectory;
use crate::streaming::{AuthTokenGenerator, ClientProfile, StreamResolver};
use crate::utils::time::{DayBucket, format_match_time, now_millis};

/// Wall clock with an optional shift, for previewing how views look later
#[derive(Debug, Clone, Copy, Default)]
pub struct Clock {
    shift_ms: i64,
}

impl Clock {
    pub fn shifted_by_seconds(seconds: i32) -> Self {
        Self {
            shift_ms: i64::from(seconds) * 1000,
        }
    }

    pub fn now_ms(&self) -> i64 {
        now_millis() + self.shift_ms
    }
}

/// One list row: badge, kick-off, teams, league and a short summary
pub fn fixture_line<Z: TimeZone>(fixture: &Fixture, now_ms: i64, zone: &Z) -> String
where
    Z::Offset: std::fmt::Display,
{
    let classification = fixture.classify_at(now_ms);
    let when = format_match_time(fixture.match_time, zone);
    let mut line = format!(
        "[{:<8}] {} | {:>8} | {} | {}",
        classification.status.label(),
        when.full,
        fixture.id,
        fixture.title(),
        if fixture.league.is_empty() {
            "-"
        } else {
            &fixture.league
        }
    );
    if classification.status == MatchStatus::Upcoming {
        line.push_str(&format!(" | in {}", classification.summary()));
    }
    line
}

pub async fn list_lines<Z: TimeZone>(
    directory: &FixtureDirectory,
    filters: &FixtureFilters,
    live_only: bool,
    now_ms: i64,
    zone: &Z,
) -> Vec<String>
where
    Z::Offset: std::fmt::Display,
{
    let fixtures = if live_only {
        directory.live_tab(now_ms).await
    } else {
        directory.filter(filters, now_ms).await
    };

    let mut lines: Vec<String> = fixtures
        .iter()
        .map(|f| fixture_line(f, now_ms, zone))
        .collect();
    if lines.is_empty() {
        lines.push("No matches found".to_string());
    }

    let active = filters.active_count();
    if active > 0 && !live_only {
        lines.push(format!("({active} filter(s) active)"));
    }

    let mut buckets = Vec::new();
    for bucket in DayBucket::ALL {
        let count = directory.in_bucket(bucket, now_ms, zone).await.len();
        buckets.push(format!("{bucket}: {count}"));
    }
    lines.push(buckets.join(", "));
    lines.push(format!("Leagues: {}", directory.leagues().await.join(", ")));
    lines
}

/// Reprint the list every `period` until Ctrl-C, keeping "starts in"
/// summaries current.
pub async fn follow_list<Z: TimeZone>(
    directory: &FixtureDirectory,
    filters: &FixtureFilters,
    live_only: bool,
    clock: Clock,
    zone: &Z,
    period: Duration,
) where
    Z::Offset: std::fmt::Display,
{
    let mut timers = ViewTimers::new();
    let (tx, mut rx) = mpsc::unbounded_channel();
    timers.every("list-summary", period, move || {
        if tx.send(()).is_ok() {
            ControlFlow::Continue(())
        } else {
            ControlFlow::Break(())
        }
    });

    loop {
        tokio::select! {
            tick = rx.recv() => {
                if tick.is_none() {
                    break;
                }
                for line in list_lines(directory, filters, live_only, clock.now_ms(), zone).await {
                    println!("{line}");
                }
                println!();
            }
            _ = tokio::signal::ctrl_c() => break,
        }
    }
    timers.cancel();
}

pub fn show_lines<Z: TimeZone>(fixture: &Fixture, now_ms: i64, zone: &Z) -> Vec<String>
where
    Z::Offset: std::fmt::Display,
{
    let classification = fixture.classify_at(now_ms);
    let when = format_match_time(fixture.match_time, zone);
    let mut lines = vec![
        fixture.title(),
        format!("League: {}", fixture.league),
        format!("Kick-off: {} at {}", when.date, when.time),
        format!("Status: {}", classification.status.label()),
        format!("Countdown: {}", classification.countdown()),
        format!("Crests: {} / {}", fixture.home_image(), fixture.away_image()),
    ];
    let availability = StreamAvailability::for_fixture(fixture, now_ms);
    lines.push(availability.message().to_string());
    if availability == StreamAvailability::Watchable {
        for link in &fixture.links {
            lines.push(format!("  - {}", link.name));
        }
        if let Some(default) = fixture.default_stream() {
            lines.push(format!("Default stream: {}", default.name));
        }
    }
    lines
}

pub fn resolve_lines(fixture: &Fixture, resolver: &StreamResolver) -> Vec<String> {
    if fixture.links.is_empty() {
        return vec![StreamAvailability::NoLinks.message().to_string()];
    }
    resolver
        .resolve_all(&fixture.links)
        .into_iter()
        .map(|resolved| {
            format!(
                "{} [{} / {}] {}",
                resolved.name, resolved.route, resolved.container, resolved.url
            )
        })
        .collect()
}

pub async fn find_fixture(directory: &FixtureDirectory, id: &str) -> AppResult<Fixture> {
    directory
        .find(id)
        .await
        .ok_or_else(|| AppError::not_found("fixture", id))
}

/// Count down until the stream opens or `deadline` passes. Returns whether
/// the fixture became watchable.
async fn wait_until_watchable(
    config: &Config,
    fixture: &Fixture,
    clock: Clock,
    deadline: Instant,
) -> bool {
    let mut timers = ViewTimers::new();

    if let Some(delay) = next_transition_in(fixture.match_time, clock.now_ms()) {
        let title = fixture.title();
        timers.after(
            "status-transition",
            Duration::from_millis(delay.max(0) as u64),
            move || info!("{} changes status now", title),
        );
    }

    // The stream opens at the start of the live band, before the countdown
    // reaches zero
    let mut countdown = timers.countdown(
        fixture.match_time,
        config.schedule.countdown_tick,
        move || clock.now_ms(),
    );

    loop {
        if StreamAvailability::for_fixture(fixture, clock.now_ms()) == StreamAvailability::Watchable
        {
            timers.cancel();
            return true;
        }
        tokio::select! {
            changed = countdown.changed() => {
                if changed.is_err() {
                    // Countdown latched LIVE NOW and stopped publishing
                    timers.cancel();
                    return StreamAvailability::for_fixture(fixture, clock.now_ms())
                        == StreamAvailability::Watchable;
                }
                println!("Starts in {}", *countdown.borrow_and_update());
            }
            _ = sleep_until(deadline) => {
                timers.cancel();
                return false;
            }
        }
    }
}

/// Count down if needed, then run a playback session on the logging backend
/// until `seconds` have elapsed or Ctrl-C is pressed.
pub async fn watch(
    config: &Config,
    fixture: &Fixture,
    client: ClientProfile,
    seconds: u64,
    clock: Clock,
) -> AppResult<()> {
    let deadline = Instant::now() + Duration::from_secs(seconds);

    match StreamAvailability::for_fixture(fixture, clock.now_ms()) {
        StreamAvailability::NoLinks => {
            println!("{}", StreamAvailability::NoLinks.message());
            return Ok(());
        }
        StreamAvailability::NotYet => {
            println!("{}", StreamAvailability::NotYet.message());
            if !wait_until_watchable(config, fixture, clock, deadline).await {
                return Ok(());
            }
        }
        StreamAvailability::Watchable => {}
    }

    let Some(descriptor) = fixture.default_stream().cloned() else {
        return Ok(());
    };

    // Apple clients decode manifests natively
    let backend = Arc::new(LoggingBackend::new(!client.is_apple_like()));
    let mut session = PlaybackSessionController::new(
        backend,
        PlayerOptions::from_config(&config.player),
        AuthTokenGenerator::from_config(&config.token)?,
        client,
    );
    session.on_stream_change(|url| info!("Now streaming {}", url));

    let loader = HttpScriptLoader::new(config.source.request_timeout, &config.source.user_agent)?;
    let bootstrap = EngineBootstrap::new(config.player.scripts.clone());
    match session.initialize(&bootstrap, &loader).await {
        Ok(capabilities) => debug!(
            "Engine capabilities: manifest adapter {}, segment adapter {}",
            capabilities.manifest_adapter, capabilities.segment_adapter
        ),
        Err(e) if e.is_retryable() => {
            println!("Failed to load video player. Please try again. ({e})");
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    }

    match session.select_stream(&descriptor) {
        Ok(resolved) => println!("Playing {} ({})", resolved.name, resolved.container),
        Err(e) => {
            warn!("Stream selection failed: {}", e);
            println!("Failed to initialize video player: {e}");
            session.teardown();
            return Ok(());
        }
    }

    loop {
        tokio::select! {
            event = session.next_event() => {
                let Some(event) = event else {
                    break;
                };
                if let Some(line) = player_error_line(&event, session.active_generation()) {
                    println!("{line}");
                }
            }
            _ = sleep_until(deadline) => break,
            _ = tokio::signal::ctrl_c() => {
                info!("Interrupted");
                break;
            }
        }
    }

    session.teardown();
    let usage = session.data_usage();
    println!(
        "Estimated data usage: {:.1} MB over {}s",
        usage.played_mb,
        usage.played.as_secs()
    );
    Ok(())
}

/// Error message for an event from the engine currently playing
pub fn player_error_line(event: &EngineEvent, active_generation: Option<u64>) -> Option<String> {
    match &event.kind {
        EngineEventKind::Error(message) if active_generation == Some(event.generation) => {
            Some(format!("Player error: {message}"))
        }
        _ => None,
    }
}
