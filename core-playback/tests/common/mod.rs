//! Recording fakes for the host bridges used by the integration suites.

#![allow(dead_code)]

use async_trait::async_trait;
use bridge_traits::error::Result as BridgeResult;
use bridge_traits::{
    ActionDetails, BridgeError, ContentSearch, DownloadResolver, HostPlaybackState, MediaAction,
    MediaActionHandler, MediaElement, MediaElementEvent, MediaElementListener, MediaSessionHost,
    NativeMediaEvent, NativeMediaListener, NativeMediaService, NativePlayRequest,
    NowPlayingMetadata, Track, TrackMetadataStore,
};
use core_playback::{
    BackendSelector, MemoryQueueStore, NativeRetryPolicy, PlaybackConfig, PlaybackSession,
};
use core_runtime::events::{EventKind, PlayerEvent};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Notify;

// ============================================================================
// Media Element
// ============================================================================

/// Media element that records every call and echoes play/pause as events.
#[derive(Default)]
pub struct RecordingElement {
    pub calls: Mutex<Vec<String>>,
    source: Mutex<Option<String>>,
    time: Mutex<f64>,
    duration: Mutex<Option<f64>>,
    pub volume: Mutex<Option<f32>>,
    fail_play: Mutex<bool>,
    listener: Mutex<Option<MediaElementListener>>,
}

impl RecordingElement {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn set_duration(&self, duration: Option<f64>) {
        *self.duration.lock() = duration;
    }

    pub fn fail_play(&self, fail: bool) {
        *self.fail_play.lock() = fail;
    }

    pub fn source(&self) -> Option<String> {
        self.source.lock().clone()
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().clone()
    }

    pub fn seeks(&self) -> Vec<f64> {
        self.calls()
            .iter()
            .filter_map(|call| call.strip_prefix("seek:"))
            .filter_map(|secs| secs.parse().ok())
            .collect()
    }

    pub fn count(&self, call: &str) -> usize {
        self.calls().iter().filter(|c| c.as_str() == call).count()
    }

    /// Raise an element event as the host would.
    pub fn fire(&self, event: MediaElementEvent) {
        let listener = self.listener.lock().clone();
        if let Some(listener) = listener {
            listener(event);
        }
    }

    fn record(&self, call: impl Into<String>) {
        self.calls.lock().push(call.into());
    }
}

#[async_trait]
impl MediaElement for RecordingElement {
    fn set_source(&self, url: &str) -> BridgeResult<()> {
        self.record(format!("source:{url}"));
        *self.source.lock() = Some(url.to_string());
        *self.time.lock() = 0.0;
        Ok(())
    }

    fn has_source(&self) -> bool {
        self.source.lock().is_some()
    }

    async fn play(&self) -> BridgeResult<()> {
        self.record("play");
        if *self.fail_play.lock() {
            return Err(BridgeError::OperationFailed("NotAllowedError".into()));
        }
        self.fire(MediaElementEvent::Play);
        Ok(())
    }

    fn pause(&self) -> BridgeResult<()> {
        self.record("pause");
        self.fire(MediaElementEvent::Pause);
        Ok(())
    }

    fn set_current_time(&self, seconds: f64) -> BridgeResult<()> {
        self.record(format!("seek:{seconds}"));
        *self.time.lock() = seconds;
        Ok(())
    }

    fn current_time(&self) -> f64 {
        *self.time.lock()
    }

    fn duration(&self) -> Option<f64> {
        *self.duration.lock()
    }

    fn set_volume(&self, volume: f32) -> BridgeResult<()> {
        *self.volume.lock() = Some(volume);
        Ok(())
    }

    fn set_listener(&self, listener: MediaElementListener) -> BridgeResult<()> {
        *self.listener.lock() = Some(listener);
        Ok(())
    }
}

// ============================================================================
// Native Media Service
// ============================================================================

pub struct RecordingNative {
    available: bool,
    fail_play: Mutex<bool>,
    pub requests: Mutex<Vec<NativePlayRequest>>,
    pub calls: Mutex<Vec<String>>,
    listener: Mutex<Option<NativeMediaListener>>,
    play_gate: Mutex<Option<Arc<Notify>>>,
}

impl RecordingNative {
    pub fn new(available: bool) -> Arc<Self> {
        Arc::new(Self {
            available,
            fail_play: Mutex::new(false),
            requests: Mutex::new(Vec::new()),
            calls: Mutex::new(Vec::new()),
            listener: Mutex::new(None),
            play_gate: Mutex::new(None),
        })
    }

    pub fn fail_play(&self, fail: bool) {
        *self.fail_play.lock() = fail;
    }

    /// Hold the next `play` call until the returned gate is notified.
    pub fn gate_next_play(&self) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        *self.play_gate.lock() = Some(gate.clone());
        gate
    }

    pub fn play_attempts(&self) -> usize {
        self.requests.lock().len()
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().clone()
    }

    pub fn fire(&self, event: NativeMediaEvent) {
        let listener = self.listener.lock().clone();
        if let Some(listener) = listener {
            listener(event);
        }
    }
}

#[async_trait]
impl NativeMediaService for RecordingNative {
    fn is_available(&self) -> bool {
        self.available
    }

    async fn play(&self, request: NativePlayRequest) -> BridgeResult<()> {
        self.requests.lock().push(request);
        let gate = self.play_gate.lock().take();
        if let Some(gate) = gate {
            gate.notified().await;
        }
        if *self.fail_play.lock() {
            return Err(BridgeError::OperationFailed("foreground service refused".into()));
        }
        Ok(())
    }

    async fn pause(&self) -> BridgeResult<()> {
        self.calls.lock().push("pause".into());
        Ok(())
    }

    async fn resume(&self) -> BridgeResult<()> {
        self.calls.lock().push("resume".into());
        Ok(())
    }

    async fn seek(&self, position_ms: u64) -> BridgeResult<()> {
        self.calls.lock().push(format!("seek:{position_ms}"));
        Ok(())
    }

    fn set_listener(&self, listener: NativeMediaListener) -> BridgeResult<()> {
        *self.listener.lock() = Some(listener);
        Ok(())
    }
}

// ============================================================================
// Library Collaborators
// ============================================================================

/// Resolver with per-id local copies and optional gates that hold a lookup
/// until released.
#[derive(Default)]
pub struct GatedResolver {
    local: Mutex<HashMap<String, String>>,
    gates: Mutex<HashMap<String, Arc<Notify>>>,
    failing: Mutex<bool>,
}

impl GatedResolver {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn with_local(&self, track_id: &str, url: &str) {
        self.local.lock().insert(track_id.into(), url.into());
    }

    pub fn gate(&self, track_id: &str) {
        self.gates.lock().insert(track_id.into(), Arc::new(Notify::new()));
    }

    pub fn release(&self, track_id: &str) {
        if let Some(gate) = self.gates.lock().get(track_id) {
            gate.notify_one();
        }
    }

    pub fn set_failing(&self, failing: bool) {
        *self.failing.lock() = failing;
    }
}

#[async_trait]
impl DownloadResolver for GatedResolver {
    async fn playback_url(&self, track_id: &str) -> BridgeResult<Option<String>> {
        let gate = self.gates.lock().get(track_id).cloned();
        if let Some(gate) = gate {
            gate.notified().await;
        }
        if *self.failing.lock() {
            return Err(BridgeError::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                "downloads index missing",
            )));
        }
        Ok(self.local.lock().get(track_id).cloned())
    }
}

/// Search that answers every query with fixed results once its gate opens.
pub struct GatedSearch {
    results: Vec<Track>,
    gate: Arc<Notify>,
    pub queries: Mutex<Vec<String>>,
}

impl GatedSearch {
    pub fn new(results: Vec<Track>) -> Arc<Self> {
        Arc::new(Self {
            results,
            gate: Arc::new(Notify::new()),
            queries: Mutex::new(Vec::new()),
        })
    }

    pub fn release(&self) {
        self.gate.notify_one();
    }
}

#[async_trait]
impl ContentSearch for GatedSearch {
    async fn search_songs(&self, query: &str) -> BridgeResult<Vec<Track>> {
        self.queries.lock().push(query.to_string());
        self.gate.notified().await;
        Ok(self.results.clone())
    }
}

#[derive(Default)]
pub struct StaticMetadata {
    tracks: HashMap<String, Track>,
}

impl StaticMetadata {
    pub fn new(tracks: Vec<Track>) -> Arc<Self> {
        Arc::new(Self {
            tracks: tracks.into_iter().map(|t| (t.id.clone(), t)).collect(),
        })
    }
}

impl TrackMetadataStore for StaticMetadata {
    fn track_metadata(&self, track_id: &str) -> Option<Track> {
        self.tracks.get(track_id).cloned()
    }
}

// ============================================================================
// Media Session Host
// ============================================================================

#[derive(Default)]
pub struct RecordingHost {
    pub metadata: Mutex<Vec<NowPlayingMetadata>>,
    pub states: Mutex<Vec<HostPlaybackState>>,
    handlers: Mutex<HashMap<MediaAction, MediaActionHandler>>,
    unsupported: Vec<MediaAction>,
}

impl RecordingHost {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn without(unsupported: Vec<MediaAction>) -> Arc<Self> {
        Arc::new(Self {
            unsupported,
            ..Default::default()
        })
    }

    pub fn last_metadata(&self) -> Option<NowPlayingMetadata> {
        self.metadata.lock().last().cloned()
    }

    /// Invoke the handler registered for `details.action`, as the OS would.
    pub async fn trigger(&self, details: ActionDetails) -> bool {
        let handler = self.handlers.lock().get(&details.action).cloned();
        match handler {
            Some(handler) => {
                handler(details).await;
                true
            }
            None => false,
        }
    }
}

impl MediaSessionHost for RecordingHost {
    fn set_metadata(&self, metadata: NowPlayingMetadata) -> BridgeResult<()> {
        self.metadata.lock().push(metadata);
        Ok(())
    }

    fn set_playback_state(&self, state: HostPlaybackState) -> BridgeResult<()> {
        self.states.lock().push(state);
        Ok(())
    }

    fn set_action_handler(&self, action: MediaAction, handler: MediaActionHandler) -> BridgeResult<()> {
        if self.unsupported.contains(&action) {
            return Err(BridgeError::NotAvailable(format!("{action:?}")));
        }
        self.handlers.lock().insert(action, handler);
        Ok(())
    }
}

// ============================================================================
// Harness
// ============================================================================

pub fn track(id: &str, title: &str) -> Track {
    Track::new(id, title, format!("https://cdn.example/{id}.mp3"))
}

pub fn track_ids(tracks: &[Track]) -> Vec<String> {
    tracks.iter().map(|t| t.id.clone()).collect()
}

/// Everything a test needs to drive and observe one session.
pub struct Harness {
    pub session: PlaybackSession,
    pub element: Arc<RecordingElement>,
    pub native: Option<Arc<RecordingNative>>,
    pub queue: Arc<MemoryQueueStore>,
    pub events: Arc<Mutex<Vec<PlayerEvent>>>,
}

pub struct HarnessBuilder {
    native: Option<Arc<RecordingNative>>,
    element: Arc<RecordingElement>,
    config: PlaybackConfig,
    policy: NativeRetryPolicy,
    search: Option<Arc<dyn ContentSearch>>,
    resolver: Option<Arc<dyn DownloadResolver>>,
    metadata: Option<Arc<dyn TrackMetadataStore>>,
}

impl HarnessBuilder {
    pub fn new() -> Self {
        Self {
            native: None,
            element: RecordingElement::new(),
            config: PlaybackConfig {
                error_skip_delay: None,
                ..PlaybackConfig::default()
            },
            policy: NativeRetryPolicy::EveryCall,
            search: None,
            resolver: None,
            metadata: None,
        }
    }

    pub fn native(mut self, native: Arc<RecordingNative>) -> Self {
        self.native = Some(native);
        self
    }

    pub fn config(mut self, config: PlaybackConfig) -> Self {
        self.config = config;
        self
    }

    pub fn policy(mut self, policy: NativeRetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn search(mut self, search: Arc<dyn ContentSearch>) -> Self {
        self.search = Some(search);
        self
    }

    pub fn resolver(mut self, resolver: Arc<dyn DownloadResolver>) -> Self {
        self.resolver = Some(resolver);
        self
    }

    pub fn metadata(mut self, metadata: Arc<dyn TrackMetadataStore>) -> Self {
        self.metadata = Some(metadata);
        self
    }

    pub fn build(self) -> Harness {
        let queue = Arc::new(MemoryQueueStore::new());
        let selector = BackendSelector::detect(
            self.native
                .clone()
                .map(|native| native as Arc<dyn NativeMediaService>),
            self.element.clone(),
            self.policy,
        );

        let mut builder = PlaybackSession::builder(selector, queue.clone()).config(self.config);
        if let Some(search) = self.search {
            builder = builder.content_search(search);
        }
        if let Some(resolver) = self.resolver {
            builder = builder.download_resolver(resolver);
        }
        if let Some(metadata) = self.metadata {
            builder = builder.metadata_store(metadata);
        }
        let session = builder.build().expect("valid session config");

        let events = Arc::new(Mutex::new(Vec::new()));
        for kind in [
            EventKind::StateChange,
            EventKind::TimeUpdate,
            EventKind::TrackChange,
            EventKind::Loaded,
            EventKind::Error,
        ] {
            let sink = events.clone();
            session
                .event_bus()
                .subscribe(kind, move |event| sink.lock().push(event.clone()));
        }

        Harness {
            session,
            element: self.element,
            native: self.native,
            queue,
            events,
        }
    }
}

impl Harness {
    pub fn track_changes(&self) -> Vec<String> {
        self.events
            .lock()
            .iter()
            .filter_map(|event| match event {
                PlayerEvent::TrackChange { track } => Some(track.id.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn errors(&self) -> Vec<String> {
        self.events
            .lock()
            .iter()
            .filter_map(|event| match event {
                PlayerEvent::Error { detail } => Some(detail.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn current_id(&self) -> Option<String> {
        self.session.current_track().map(|track| track.id)
    }
}
