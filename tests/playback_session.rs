use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use fbstream::config::{EngineScriptsConfig, TokenConfig};
use fbstream::errors::{PlaybackError, PlaybackResult};
use fbstream::models::StreamDescriptor;
use fbstream::playback::{
    DecodeAdapter, DecodePath, EngineBootstrap, EngineComponent, EngineEventKind, EngineEvents,
    EngineRequest, MediaBackend, MediaEngine, PlaybackSessionController, PlayerOptions,
    ScriptLoader, SessionState,
};
use fbstream::streaming::{AuthTokenGenerator, ClientProfile, ContainerFormat};

const DESKTOP_UA: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64)";
const IPHONE_UA: &str = "Mozilla/5.0 (iPhone; CPU iPhone OS 17_5 like Mac OS X)";

type Log = Arc<Mutex<Vec<String>>>;

#[derive(Default)]
struct RecordingBackend {
    log: Log,
    native_manifest: bool,
    events: Mutex<Vec<EngineEvents>>,
}

impl RecordingBackend {
    fn entries(&self) -> Vec<String> {
        self.log.lock().unwrap().clone()
    }

    fn events_for(&self, generation: u64) -> EngineEvents {
        self.events
            .lock()
            .unwrap()
            .iter()
            .find(|e| e.generation() == generation)
            .cloned()
            .unwrap()
    }
}

struct RecordingEngine {
    generation: u64,
    url: String,
    log: Log,
}

impl MediaEngine for RecordingEngine {
    fn url(&self) -> &str {
        &self.url
    }

    fn play(&mut self) -> PlaybackResult<()> {
        self.log.lock().unwrap().push(format!("play {}", self.generation));
        Ok(())
    }

    fn pause(&mut self) -> PlaybackResult<()> {
        self.log.lock().unwrap().push(format!("pause {}", self.generation));
        Ok(())
    }

    fn destroy(&mut self) {
        self.log
            .lock()
            .unwrap()
            .push(format!("destroy engine {}", self.generation));
    }
}

struct RecordingAdapter {
    path: DecodePath,
    log: Log,
}

impl DecodeAdapter for RecordingAdapter {
    fn path(&self) -> DecodePath {
        self.path
    }

    fn attach(&mut self, _url: &str) -> PlaybackResult<()> {
        self.log.lock().unwrap().push(format!("attach {}", self.path));
        Ok(())
    }

    fn destroy(&mut self) {
        self.log.lock().unwrap().push(format!("destroy {}", self.path));
    }
}

impl MediaBackend for RecordingBackend {
    fn native_manifest(&self) -> bool {
        self.native_manifest
    }

    fn create_engine(
        &self,
        request: &EngineRequest,
        events: EngineEvents,
    ) -> PlaybackResult<Box<dyn MediaEngine>> {
        let generation = events.generation();
        self.log.lock().unwrap().push(format!(
            "create engine {} {} {}",
            generation, request.container, request.decode_path
        ));
        self.events.lock().unwrap().push(events);
        Ok(Box::new(RecordingEngine {
            generation,
            url: request.url.clone(),
            log: self.log.clone(),
        }))
    }

    fn create_adapter(&self, path: DecodePath) -> PlaybackResult<Box<dyn DecodeAdapter>> {
        Ok(Box::new(RecordingAdapter {
            path,
            log: self.log.clone(),
        }))
    }
}

/// Loads everything except the listed components
struct FakeLoader {
    missing: Vec<EngineComponent>,
}

#[async_trait]
impl ScriptLoader for FakeLoader {
    async fn load(&self, component: EngineComponent, _url: &str) -> Result<(), String> {
        if self.missing.contains(&component) {
            Err("404".to_string())
        } else {
            Ok(())
        }
    }
}

fn bootstrap() -> EngineBootstrap {
    EngineBootstrap::new(EngineScriptsConfig {
        player: vec!["https://cdn.example/player.js".to_string()],
        manifest_adapter: vec!["https://cdn.example/manifest.js".to_string()],
        segment_adapter: vec!["https://cdn.example/segment.js".to_string()],
    })
}

fn controller(backend: Arc<RecordingBackend>, user_agent: &str) -> PlaybackSessionController {
    PlaybackSessionController::new(
        backend,
        PlayerOptions::default(),
        AuthTokenGenerator::from_config(&TokenConfig::default()).unwrap(),
        ClientProfile::from_user_agent(user_agent),
    )
}

async fn ready_controller(
    backend: Arc<RecordingBackend>,
    user_agent: &str,
    missing: Vec<EngineComponent>,
) -> PlaybackSessionController {
    let mut session = controller(backend, user_agent);
    session
        .initialize(&bootstrap(), &FakeLoader { missing })
        .await
        .unwrap();
    session
}

fn auth_key(url: &str) -> &str {
    url.split("auth_key=").nth(1).unwrap()
}

#[tokio::test]
async fn test_previous_engine_released_before_next_is_built() {
    let backend = Arc::new(RecordingBackend::default());
    let mut session = ready_controller(backend.clone(), DESKTOP_UA, vec![]).await;
    assert_eq!(session.state(), SessionState::Ready);

    let first = session
        .select_stream(&StreamDescriptor::new("C HD", "4411"))
        .unwrap();
    assert_eq!(first.container, ContainerFormat::RawSegment);
    assert_eq!(session.state(), SessionState::Playing);

    let second = session
        .select_stream(&StreamDescriptor::new("V SD", "4411"))
        .unwrap();
    assert_eq!(second.container, ContainerFormat::Manifest);

    assert_eq!(
        backend.entries(),
        vec![
            "create engine 1 flv segment-adapter",
            "attach segment-adapter",
            "destroy segment-adapter",
            "destroy engine 1",
            "create engine 2 m3u8 manifest-adapter",
            "attach manifest-adapter",
        ]
    );

    // One token per session
    assert_eq!(auth_key(&first.url), auth_key(&second.url));

    session.teardown();
    assert_eq!(session.state(), SessionState::Destroyed);
    assert_eq!(
        backend.entries()[6..],
        ["destroy manifest-adapter", "destroy engine 2"]
    );

    assert_eq!(
        session.select_stream(&StreamDescriptor::new("V SD", "4411")),
        Err(PlaybackError::SessionDestroyed)
    );
    session.teardown();
    assert_eq!(backend.entries().len(), 8);
}

#[tokio::test]
async fn test_apple_client_uses_native_manifests() {
    let backend = Arc::new(RecordingBackend {
        native_manifest: true,
        ..Default::default()
    });
    let mut session = ready_controller(
        backend.clone(),
        IPHONE_UA,
        vec![EngineComponent::ManifestAdapter, EngineComponent::SegmentAdapter],
    )
    .await;

    let resolved = session
        .select_stream(&StreamDescriptor::new("C SD", "77"))
        .unwrap();
    assert!(resolved.url.starts_with("https://pull.dangaoka.com/live/stream-77_lsd.m3u8"));
    assert_eq!(session.active_decode_path(), Some(DecodePath::NativeManifest));
    assert_eq!(backend.entries(), vec!["create engine 1 m3u8 native-manifest"]);
}

#[tokio::test]
async fn test_missing_adapter_rejects_format_and_clears_engine() {
    let backend = Arc::new(RecordingBackend::default());
    let mut session = ready_controller(
        backend.clone(),
        DESKTOP_UA,
        vec![EngineComponent::SegmentAdapter],
    )
    .await;

    session
        .select_stream(&StreamDescriptor::new("V HD", "1"))
        .unwrap();
    let err = session
        .select_stream(&StreamDescriptor::new("C HD", "1"))
        .unwrap_err();

    assert!(matches!(
        err,
        PlaybackError::UnsupportedFormat {
            format: ContainerFormat::RawSegment,
            ..
        }
    ));
    assert_eq!(session.state(), SessionState::Ready);
    assert_eq!(session.last_error(), Some(&err));
    assert_eq!(session.active_url(), None);
    assert_eq!(
        backend.entries().last().map(String::as_str),
        Some("destroy engine 1")
    );
}

#[tokio::test]
async fn test_player_script_failure_leaves_session_uninitialized() {
    let backend = Arc::new(RecordingBackend::default());
    let mut session = controller(backend, DESKTOP_UA);

    let err = session
        .initialize(
            &bootstrap(),
            &FakeLoader {
                missing: vec![EngineComponent::Player],
            },
        )
        .await
        .unwrap_err();

    assert!(matches!(err, PlaybackError::EngineLoadFailed { .. }));
    assert_eq!(session.state(), SessionState::Uninitialized);
    assert!(matches!(
        session.select_stream(&StreamDescriptor::new("V HD", "1")),
        Err(PlaybackError::NotReady { .. })
    ));

    // A retry with working scripts succeeds
    session
        .initialize(&bootstrap(), &FakeLoader { missing: vec![] })
        .await
        .unwrap();
    assert_eq!(session.state(), SessionState::Ready);
}

#[tokio::test]
async fn test_events_from_replaced_engine_are_ignored() {
    let backend = Arc::new(RecordingBackend::default());
    let mut session = ready_controller(backend.clone(), DESKTOP_UA, vec![]).await;

    session
        .select_stream(&StreamDescriptor::new("V HD", "1"))
        .unwrap();
    let stale = backend.events_for(1);
    session
        .select_stream(&StreamDescriptor::new("V SD", "1"))
        .unwrap();
    let current = backend.events_for(2);

    stale.emit(EngineEventKind::Error("late failure".to_string()));
    stale.emit(EngineEventKind::Pause);
    assert_eq!(session.drain_events(), 2);
    assert_eq!(session.state(), SessionState::Playing);
    assert!(session.last_error().is_none());

    current.emit(EngineEventKind::Error("network".to_string()));
    session.next_event().await.unwrap();
    assert_eq!(session.state(), SessionState::Playing);
    assert_eq!(
        session.last_error(),
        Some(&PlaybackError::PlaybackEngineError {
            message: "network".to_string()
        })
    );

    current.emit(EngineEventKind::Destroy);
    session.drain_events();
    assert_eq!(session.state(), SessionState::Ready);
    assert_eq!(session.active_url(), None);
}

#[tokio::test]
async fn test_pause_play_and_reload() {
    let backend = Arc::new(RecordingBackend::default());
    let mut session = ready_controller(backend.clone(), DESKTOP_UA, vec![]).await;

    assert!(matches!(session.reload(), Err(PlaybackError::NotReady { .. })));

    session
        .select_stream(&StreamDescriptor::new("Backup", "https://cdn.example/live/match.mp4"))
        .unwrap();
    assert_eq!(session.active_decode_path(), Some(DecodePath::Direct));

    session.pause().unwrap();
    assert_eq!(session.state(), SessionState::Paused);
    session.play().unwrap();
    assert_eq!(session.state(), SessionState::Playing);

    session.reload().unwrap();
    assert_eq!(
        session.active_url(),
        Some("https://cdn.example/live/match.mp4")
    );
    assert_eq!(
        backend.entries(),
        vec![
            "create engine 1 native direct",
            "pause 1",
            "play 1",
            "destroy engine 1",
            "create engine 2 native direct",
        ]
    );
}

#[tokio::test]
async fn test_dropping_controller_releases_adapter_then_engine() {
    let backend = Arc::new(RecordingBackend::default());
    let mut session = ready_controller(backend.clone(), DESKTOP_UA, vec![]).await;
    session
        .select_stream(&StreamDescriptor::new("V HD", "3"))
        .unwrap();
    assert_eq!(session.state(), SessionState::Playing);

    drop(session);

    assert_eq!(
        backend.entries(),
        vec![
            "create engine 1 m3u8 manifest-adapter",
            "attach manifest-adapter",
            "destroy manifest-adapter",
            "destroy engine 1",
        ]
    );
}

#[tokio::test(start_paused = true)]
async fn test_data_usage_counts_playing_time_only() {
    let backend = Arc::new(RecordingBackend::default());
    let mut session = ready_controller(backend.clone(), DESKTOP_UA, vec![]).await;

    tokio::time::sleep(Duration::from_secs(10)).await;
    assert_eq!(session.data_usage().played, Duration::ZERO);

    session
        .select_stream(&StreamDescriptor::new("V HD", "3"))
        .unwrap();
    tokio::time::sleep(Duration::from_secs(8)).await;
    session.pause().unwrap();
    tokio::time::sleep(Duration::from_secs(60)).await;
    session.play().unwrap();
    tokio::time::sleep(Duration::from_secs(4)).await;

    // Switching streams keeps the running total
    session
        .select_stream(&StreamDescriptor::new("V SD", "3"))
        .unwrap();
    tokio::time::sleep(Duration::from_secs(4)).await;

    backend
        .events_for(2)
        .emit(EngineEventKind::Buffered(Duration::from_secs(20)));
    session.drain_events();

    let usage = session.data_usage();
    assert_eq!(usage.played, Duration::from_secs(16));
    assert_eq!(usage.played_mb, 4.0);
    assert_eq!(usage.buffered_mb, 5.0);

    session.teardown();
    tokio::time::sleep(Duration::from_secs(30)).await;
    assert_eq!(session.data_usage().played, Duration::from_secs(16));
}
