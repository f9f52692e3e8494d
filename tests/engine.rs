//! End-to-end engine tests with mock host bindings.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use image::{Rgb, RgbImage};

use framegrab::{
    AffinityContext, CaptureError, ExtractionStrategy, FrameRetriever, ImageFormat, MediaSource,
    PlayerHandle, ScreenshotEngine, SharedMediaStore, ScreenshotRequest,
};

// --- Mock host bindings ---------------------------------------------------

struct MockPlayer {
    position: Option<Duration>,
    duration: Option<Duration>,
    dimensions: Option<(u32, u32)>,
    ready: bool,
    source: Option<MediaSource>,
}

impl MockPlayer {
    fn playing() -> Self {
        Self {
            position: Some(Duration::from_millis(12_500)),
            duration: Some(Duration::from_secs(90)),
            dimensions: Some((1280, 720)),
            ready: true,
            source: Some(MediaSource::Uri("clip.mp4".into())),
        }
    }

    fn buffering() -> Self {
        Self {
            position: None,
            duration: None,
            dimensions: None,
            ready: false,
            source: Some(MediaSource::Uri("clip.mp4".into())),
        }
    }
}

impl PlayerHandle for MockPlayer {
    fn position(&self) -> Option<Duration> {
        self.position
    }
    fn duration(&self) -> Option<Duration> {
        self.duration
    }
    fn dimensions(&self) -> Option<(u32, u32)> {
        self.dimensions
    }
    fn is_ready(&self) -> bool {
        self.ready
    }
    fn media_source(&self) -> Option<MediaSource> {
        self.source.clone()
    }
}

/// Retriever that always yields a solid-color frame at the given size.
struct SolidFrameRetriever {
    width: u32,
    height: u32,
}

impl FrameRetriever for SolidFrameRetriever {
    fn open(&mut self, _source: &MediaSource) -> Result<(), CaptureError> {
        Ok(())
    }

    fn retrieve(
        &mut self,
        _strategy: ExtractionStrategy,
        _target: Duration,
        _tolerance: Duration,
    ) -> Option<RgbImage> {
        Some(RgbImage::from_pixel(self.width, self.height, Rgb([40, 90, 160])))
    }

    fn reset(&mut self) {}
}

/// Retriever for which every strategy fails.
struct FailingRetriever;

impl FrameRetriever for FailingRetriever {
    fn open(&mut self, _source: &MediaSource) -> Result<(), CaptureError> {
        Ok(())
    }

    fn retrieve(
        &mut self,
        _strategy: ExtractionStrategy,
        _target: Duration,
        _tolerance: Duration,
    ) -> Option<RgbImage> {
        None
    }

    fn reset(&mut self) {}
}

struct MockStore {
    authorized: bool,
    write_delay: Option<Duration>,
    saved: Mutex<Vec<(usize, ImageFormat)>>,
}

impl MockStore {
    fn granted() -> Self {
        Self {
            authorized: true,
            write_delay: None,
            saved: Mutex::new(Vec::new()),
        }
    }

    fn slow(delay: Duration) -> Self {
        Self {
            write_delay: Some(delay),
            ..Self::granted()
        }
    }
}

impl SharedMediaStore for MockStore {
    fn is_authorized(&self) -> bool {
        self.authorized
    }

    fn save(&self, bytes: &[u8], format: ImageFormat) -> Result<String, CaptureError> {
        if let Some(delay) = self.write_delay {
            std::thread::sleep(delay);
        }
        self.saved.lock().unwrap().push((bytes.len(), format));
        Ok("store://shot/42".to_string())
    }
}

/// Affinity context that runs reads on a dedicated thread and counts
/// dispatches, modelling a host UI thread.
struct CountingAffinity {
    dispatches: AtomicUsize,
}

impl AffinityContext for CountingAffinity {
    fn dispatch(&self, task: Box<dyn FnOnce() + Send>) {
        self.dispatches.fetch_add(1, Ordering::SeqCst);
        std::thread::spawn(task);
    }
}

fn engine_with_solid_frames() -> ScreenshotEngine {
    ScreenshotEngine::builder(|| {
        Box::new(SolidFrameRetriever {
            width: 1280,
            height: 720,
        })
    })
    .build()
}

// --- Capture --------------------------------------------------------------

#[tokio::test]
async fn capture_returns_base64_jpeg_with_metadata() {
    let engine = engine_with_solid_frames();
    engine.on_player_created("main", Arc::new(MockPlayer::playing()));

    let request = ScreenshotRequest::new().with_max_dimensions(640, 480);
    let shot = engine
        .capture_screenshot("main", &request)
        .await
        .expect("capture failed");

    assert_eq!((shot.width, shot.height), (640, 360), "post-resize dimensions expected");
    assert_eq!(shot.format, ImageFormat::Jpeg);
    assert!(!shot.placeholder);
    assert_eq!(shot.timestamp, Some(12.5));
    assert!(shot.destination.is_none());
    assert!(shot.byte_size.is_none());

    let bytes = shot.decoded_bytes().expect("base64 payload expected");
    assert_eq!(&bytes[..2], &[0xFF, 0xD8], "payload should be JPEG");
}

#[tokio::test]
async fn capture_without_constraint_keeps_native_dimensions() {
    let engine = engine_with_solid_frames();
    engine.on_player_created("main", Arc::new(MockPlayer::playing()));

    let shot = engine
        .capture_screenshot("main", &ScreenshotRequest::default())
        .await
        .expect("capture failed");
    assert_eq!((shot.width, shot.height), (1280, 720));
}

#[tokio::test]
async fn include_timestamp_false_omits_the_clock() {
    let engine = engine_with_solid_frames();
    engine.on_player_created("main", Arc::new(MockPlayer::playing()));

    let request = ScreenshotRequest::new().with_include_timestamp(false);
    let shot = engine
        .capture_screenshot("main", &request)
        .await
        .expect("capture failed");
    assert_eq!(shot.timestamp, None);
}

#[tokio::test]
async fn png_capture_is_lossless_of_the_extracted_frame() {
    let engine = ScreenshotEngine::builder(|| {
        Box::new(SolidFrameRetriever {
            width: 32,
            height: 16,
        })
    })
    .build();
    engine.on_player_created("main", Arc::new(MockPlayer::playing()));

    let request = ScreenshotRequest::new().with_format(ImageFormat::Png);
    let shot = engine
        .capture_screenshot("main", &request)
        .await
        .expect("capture failed");

    let decoded = image::load_from_memory(&shot.decoded_bytes().unwrap())
        .expect("png decode failed")
        .to_rgb8();
    let expected = RgbImage::from_pixel(32, 16, Rgb([40, 90, 160]));
    assert_eq!(decoded.as_raw(), expected.as_raw());
}

#[tokio::test]
async fn unknown_player_is_a_distinct_error() {
    let engine = engine_with_solid_frames();

    let error = engine
        .capture_screenshot("nonexistent", &ScreenshotRequest::default())
        .await
        .expect_err("capture against unknown id must fail");
    match error {
        CaptureError::PlayerNotFound { id } => assert_eq!(id, "nonexistent"),
        other => panic!("expected PlayerNotFound, got {other:?}"),
    }
}

#[tokio::test]
async fn removed_player_is_not_found() {
    let engine = engine_with_solid_frames();
    engine.on_player_created("main", Arc::new(MockPlayer::playing()));
    engine.on_player_removed("main");

    let error = engine
        .capture_screenshot("main", &ScreenshotRequest::default())
        .await
        .expect_err("capture against removed id must fail");
    assert!(matches!(error, CaptureError::PlayerNotFound { .. }));
}

// --- Placeholder degradation ---------------------------------------------

#[tokio::test]
async fn total_extraction_failure_yields_placeholder_success() {
    let engine = ScreenshotEngine::builder(|| Box::new(FailingRetriever)).build();
    engine.on_player_created("main", Arc::new(MockPlayer::playing()));

    let shot = engine
        .capture_screenshot("main", &ScreenshotRequest::default())
        .await
        .expect("placeholder degradation must not error");

    assert!(shot.placeholder, "result should be flagged as synthetic");
    assert_eq!(
        (shot.width, shot.height),
        (1280, 720),
        "placeholder should match last-known video dimensions"
    );
}

#[tokio::test]
async fn placeholder_for_buffering_player_uses_default_dimensions() {
    let engine = ScreenshotEngine::builder(|| Box::new(FailingRetriever)).build();
    engine.on_player_created("main", Arc::new(MockPlayer::buffering()));

    let shot = engine
        .capture_screenshot("main", &ScreenshotRequest::default())
        .await
        .expect("placeholder degradation must not error");

    assert!(shot.placeholder);
    assert_eq!((shot.width, shot.height), (1920, 1080));
}

#[tokio::test]
async fn placeholder_respects_resize_constraints() {
    let engine = ScreenshotEngine::builder(|| Box::new(FailingRetriever)).build();
    engine.on_player_created("main", Arc::new(MockPlayer::playing()));

    let request = ScreenshotRequest::new().with_max_dimensions(320, 0);
    let shot = engine
        .capture_screenshot("main", &request)
        .await
        .expect("placeholder degradation must not error");
    assert_eq!((shot.width, shot.height), (320, 180));
}

// --- Path persistence -----------------------------------------------------

#[tokio::test]
async fn save_to_path_creates_missing_directories_and_reports_size() {
    let engine = engine_with_solid_frames();
    engine.on_player_created("main", Arc::new(MockPlayer::playing()));

    let directory = tempfile::tempdir().expect("tempdir");
    let target = directory.path().join("new/nested/dir/shot.jpg");

    let shot = engine
        .save_to_path("main", &target, &ScreenshotRequest::default())
        .await
        .expect("path save failed");

    let written = std::fs::metadata(&target).expect("file should exist").len();
    assert_eq!(shot.byte_size, Some(written), "reported size must match file length");
    assert!(shot.base64.is_none(), "persisted outputs carry no in-memory payload");
    match shot.destination {
        Some(framegrab::Destination::Path(path)) => assert_eq!(path, target),
        other => panic!("expected path destination, got {other:?}"),
    }
}

#[tokio::test]
async fn save_to_unwritable_path_is_a_filesystem_error() {
    let engine = engine_with_solid_frames();
    engine.on_player_created("main", Arc::new(MockPlayer::playing()));

    // Writing below /proc fails on any Linux host this test runs on.
    let error = engine
        .save_to_path("main", "/proc/framegrab/shot.jpg", &ScreenshotRequest::default())
        .await
        .expect_err("write into /proc must fail");
    assert!(matches!(error, CaptureError::Filesystem { .. }), "got {error:?}");
}

// --- Shared store persistence ---------------------------------------------

#[tokio::test]
async fn shared_store_write_requires_authorization() {
    // Default store denies everything.
    let engine = engine_with_solid_frames();
    engine.on_player_created("main", Arc::new(MockPlayer::playing()));

    let error = engine
        .save_to_shared_store("main", &ScreenshotRequest::default())
        .await
        .expect_err("unauthorized write must fail");
    assert!(matches!(error, CaptureError::PermissionDenied));
}

#[tokio::test]
async fn shared_store_write_returns_locator_and_size() {
    let store = Arc::new(MockStore::granted());
    let engine = ScreenshotEngine::builder(|| {
        Box::new(SolidFrameRetriever {
            width: 64,
            height: 64,
        })
    })
    .with_shared_store(Arc::clone(&store) as Arc<dyn SharedMediaStore>)
    .build();
    engine.on_player_created("main", Arc::new(MockPlayer::playing()));

    let shot = engine
        .save_to_shared_store("main", &ScreenshotRequest::default())
        .await
        .expect("store save failed");

    match &shot.destination {
        Some(framegrab::Destination::SharedStore(locator)) => {
            assert_eq!(locator, "store://shot/42")
        }
        other => panic!("expected shared-store destination, got {other:?}"),
    }

    let saved = store.saved.lock().unwrap();
    assert_eq!(saved.len(), 1);
    assert_eq!(shot.byte_size, Some(saved[0].0 as u64), "size must match stored bytes");
    assert_eq!(saved[0].1, ImageFormat::Jpeg);
}

#[tokio::test]
async fn slow_shared_store_write_times_out() {
    let store = Arc::new(MockStore::slow(Duration::from_millis(500)));
    let engine = ScreenshotEngine::builder(|| {
        Box::new(SolidFrameRetriever {
            width: 16,
            height: 16,
        })
    })
    .with_shared_store(store as Arc<dyn SharedMediaStore>)
    .with_store_timeout(Duration::from_millis(50))
    .build();
    engine.on_player_created("main", Arc::new(MockPlayer::playing()));

    let error = engine
        .save_to_shared_store("main", &ScreenshotRequest::default())
        .await
        .expect_err("write past its budget must fail");
    match error {
        CaptureError::Timeout { budget } => assert_eq!(budget, Duration::from_millis(50)),
        other => panic!("expected Timeout, got {other:?}"),
    }
}

// --- Introspection operations ----------------------------------------------

#[tokio::test]
async fn is_capture_supported_tracks_readiness_and_registration() {
    let engine = engine_with_solid_frames();

    assert!(!engine.is_capture_supported("main").await, "unknown id");

    engine.on_player_created("main", Arc::new(MockPlayer::buffering()));
    assert!(
        !engine.is_capture_supported("main").await,
        "buffering player is not ready"
    );

    engine.on_player_created("main", Arc::new(MockPlayer::playing()));
    assert!(engine.is_capture_supported("main").await);
}

#[tokio::test]
async fn video_dimensions_surface_metadata_or_a_typed_error() {
    let engine = engine_with_solid_frames();
    engine.on_player_created("ready", Arc::new(MockPlayer::playing()));
    engine.on_player_created("buffering", Arc::new(MockPlayer::buffering()));

    let dimensions = engine.video_dimensions("ready").await.expect("dimensions");
    assert_eq!((dimensions.width, dimensions.height), (1280, 720));

    let unresolved = engine.video_dimensions("buffering").await.expect_err("no metadata yet");
    assert!(matches!(unresolved, CaptureError::DimensionsUnavailable));

    let missing = engine.video_dimensions("absent").await.expect_err("unknown id");
    assert!(matches!(missing, CaptureError::PlayerNotFound { .. }));
}

#[tokio::test]
async fn list_available_players_reflects_lifecycle() {
    let engine = engine_with_solid_frames();
    engine.on_player_created("a", Arc::new(MockPlayer::playing()));
    engine.on_player_created("b", Arc::new(MockPlayer::playing()));
    engine.on_player_removed("a");

    assert_eq!(engine.list_available_players(), vec!["b".to_string()]);
    assert_eq!(engine.player_count(), 1);
}

// --- Affinity marshaling ---------------------------------------------------

#[tokio::test]
async fn player_state_reads_go_through_the_affinity_context() {
    let affinity = Arc::new(CountingAffinity {
        dispatches: AtomicUsize::new(0),
    });
    let engine = ScreenshotEngine::builder(|| {
        Box::new(SolidFrameRetriever {
            width: 32,
            height: 32,
        })
    })
    .with_affinity(Arc::clone(&affinity) as Arc<dyn AffinityContext>)
    .build();
    engine.on_player_created("main", Arc::new(MockPlayer::playing()));

    let shot = engine
        .capture_screenshot("main", &ScreenshotRequest::default())
        .await
        .expect("capture failed");
    assert!(!shot.placeholder);
    assert_eq!(
        affinity.dispatches.load(Ordering::SeqCst),
        1,
        "exactly one marshaled state read per capture"
    );
}

// --- Concurrency -----------------------------------------------------------

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_captures_share_the_retriever_pool() {
    let engine = Arc::new(
        ScreenshotEngine::builder(|| {
            Box::new(SolidFrameRetriever {
                width: 64,
                height: 64,
            })
        })
        .with_pool_capacity(2)
        .build(),
    );
    for index in 0..4 {
        engine.on_player_created(format!("p{index}"), Arc::new(MockPlayer::playing()));
    }

    let captures: Vec<_> = (0..16)
        .map(|index| {
            let engine = Arc::clone(&engine);
            tokio::spawn(async move {
                let id = format!("p{}", index % 4);
                engine
                    .capture_screenshot(&id, &ScreenshotRequest::default())
                    .await
            })
        })
        .collect();

    for capture in captures {
        let shot = capture.await.expect("task panicked").expect("capture failed");
        assert_eq!((shot.width, shot.height), (64, 64));
    }
}
