//! # Playback Session
//!
//! Owns the current-track state and orchestrates playback across the
//! selected backends.
//!
//! ## Overview
//!
//! - Resolves each track to a local copy when one was downloaded
//! - Dispatches to the preferred backend and retries once on the fallback
//!   when the native service refuses
//! - Derives `is_playing` and position solely from backend events
//! - Advances the queue at natural end of track and auto-continues with a
//!   mood-based search when a song queue runs out
//! - Republishes lifecycle changes on the [`EventBus`]
//!
//! ## Staleness
//!
//! Every `play_track` call takes a generation token. A call whose token is
//! no longer current when its resolution or dispatch completes is discarded
//! with [`PlaybackError::Superseded`]. Backend signals carry the dispatch
//! epoch they were emitted under and are dropped once a newer track has
//! been routed.
//!
//! ## Usage
//!
//! ```ignore
//! let session = PlaybackSession::builder(selector, queue)
//!     .content_search(search)
//!     .build()?;
//!
//! tokio::spawn({
//!     let session = session.clone();
//!     async move { session.run().await }
//! });
//!
//! session.play_all(tracks, Some("t2")).await?;
//! ```

use crate::backend::{
    BackendEvent, BackendKind, BackendSelector, BackendSignal, DispatchEpoch, LifecycleSink,
    PlaybackRequest,
};
use crate::cache::TrackCache;
use crate::config::PlaybackConfig;
use crate::error::{PlaybackError, Result};
use crate::mood::MoodClassifier;
use bridge_traits::{
    upgrade_insecure_url, ContentSearch, DownloadResolver, QueueSnapshot, QueueStore, Track,
    TrackMetadataStore,
};
use core_runtime::events::{EventBus, PlayerEvent};
use core_runtime::logging::strip_path;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Weak};
use std::time::Duration;
use tokio::sync::mpsc::{self, UnboundedReceiver};
use tracing::{debug, info, trace, warn};

/// Lifecycle phase of the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlaybackPhase {
    /// Nothing loaded.
    Idle,
    /// A play request is resolving its source or waiting for a backend.
    Resolving,
    Playing,
    Paused,
    /// The current track played to its end and nothing followed yet.
    Ended,
}

/// Point-in-time view of the session.
#[derive(Debug, Clone, PartialEq)]
pub struct PlaybackState {
    pub current_track: Option<Track>,
    pub is_playing: bool,
    pub phase: PlaybackPhase,
    /// Last position reported by the routed backend, in seconds.
    pub position: f64,
    /// Track duration when known, otherwise the backend-reported one.
    pub duration: Option<f64>,
    pub volume: f32,
    /// Backend chosen at detection time.
    pub active_backend: BackendKind,
    /// Backend the current track was dispatched to.
    pub route: Option<BackendKind>,
}

#[derive(Debug)]
struct SessionState {
    current: Option<Track>,
    route: Option<BackendKind>,
    phase: PlaybackPhase,
    is_playing: bool,
    position: f64,
    backend_duration: Option<f64>,
    volume: f32,
    generation: u64,
    /// Epoch the current track was dispatched under.
    track_epoch: u64,
    /// Dispatch in flight: its epoch and the backend it was offered to.
    pending: Option<(u64, BackendKind)>,
}

impl SessionState {
    fn known_duration(&self) -> Option<f64> {
        self.current
            .as_ref()
            .and_then(Track::known_duration)
            .or(self.backend_duration)
    }

    fn accepts(&self, signal: &BackendSignal) -> bool {
        let routed = self.route == Some(signal.origin) && self.track_epoch == signal.epoch;
        routed || self.pending == Some((signal.epoch, signal.origin))
    }

    fn settled_phase(&self) -> PlaybackPhase {
        match (&self.current, self.is_playing) {
            (None, _) => PlaybackPhase::Idle,
            (Some(_), true) => PlaybackPhase::Playing,
            (Some(_), false) => PlaybackPhase::Paused,
        }
    }
}

struct SessionInner {
    config: PlaybackConfig,
    bus: EventBus,
    cache: TrackCache,
    selector: BackendSelector,
    classifier: MoodClassifier,
    queue: Arc<dyn QueueStore>,
    resolver: Option<Arc<dyn DownloadResolver>>,
    search: Option<Arc<dyn ContentSearch>>,
    metadata: Option<Arc<dyn TrackMetadataStore>>,
    epoch: DispatchEpoch,
    state: Mutex<SessionState>,
    signals: Mutex<Option<UnboundedReceiver<BackendSignal>>>,
}

/// Handle to the playback engine. Clones share the same session.
#[derive(Clone)]
pub struct PlaybackSession {
    inner: Arc<SessionInner>,
}

/// Non-owning handle for callbacks that outlive their registration site.
#[derive(Clone)]
pub struct WeakPlaybackSession {
    inner: Weak<SessionInner>,
}

impl WeakPlaybackSession {
    pub fn upgrade(&self) -> Option<PlaybackSession> {
        self.inner.upgrade().map(|inner| PlaybackSession { inner })
    }
}

/// Builder for [`PlaybackSession`].
pub struct PlaybackSessionBuilder {
    selector: BackendSelector,
    queue: Arc<dyn QueueStore>,
    config: PlaybackConfig,
    bus: Option<EventBus>,
    cache: Option<TrackCache>,
    classifier: Option<MoodClassifier>,
    resolver: Option<Arc<dyn DownloadResolver>>,
    search: Option<Arc<dyn ContentSearch>>,
    metadata: Option<Arc<dyn TrackMetadataStore>>,
}

impl PlaybackSessionBuilder {
    pub fn config(mut self, config: PlaybackConfig) -> Self {
        self.config = config;
        self
    }

    /// Publish on an existing bus instead of a fresh one.
    pub fn event_bus(mut self, bus: EventBus) -> Self {
        self.bus = Some(bus);
        self
    }

    pub fn track_cache(mut self, cache: TrackCache) -> Self {
        self.cache = Some(cache);
        self
    }

    pub fn classifier(mut self, classifier: MoodClassifier) -> Self {
        self.classifier = Some(classifier);
        self
    }

    pub fn download_resolver(mut self, resolver: Arc<dyn DownloadResolver>) -> Self {
        self.resolver = Some(resolver);
        self
    }

    pub fn content_search(mut self, search: Arc<dyn ContentSearch>) -> Self {
        self.search = Some(search);
        self
    }

    pub fn metadata_store(mut self, store: Arc<dyn TrackMetadataStore>) -> Self {
        self.metadata = Some(store);
        self
    }

    /// Validate the configuration and subscribe to every backend.
    pub fn build(self) -> Result<PlaybackSession> {
        self.config.validate().map_err(PlaybackError::InvalidConfig)?;

        let (tx, rx) = mpsc::unbounded_channel();
        let epoch = DispatchEpoch::default();
        for backend in self.selector.backends() {
            let kind = backend.kind();
            let sink = LifecycleSink::new(kind, epoch.clone(), tx.clone());
            if let Err(err) = backend.subscribe_lifecycle(sink) {
                warn!(backend = %kind, error = %err, "Failed to subscribe to backend lifecycle");
            }
            if let Err(err) = backend.set_volume(self.config.initial_volume) {
                debug!(backend = %kind, error = %err, "Backend rejected initial volume");
            }
        }

        let classifier = self.classifier.unwrap_or_else(|| {
            MoodClassifier::default().with_generic_query(self.config.fallback_query.clone())
        });

        let state = SessionState {
            current: None,
            route: None,
            phase: PlaybackPhase::Idle,
            is_playing: false,
            position: 0.0,
            backend_duration: None,
            volume: self.config.initial_volume,
            generation: 0,
            track_epoch: 0,
            pending: None,
        };

        debug!(
            native = self.selector.native_available(),
            auto_continue = self.config.auto_continue,
            "Playback session ready"
        );

        Ok(PlaybackSession {
            inner: Arc::new(SessionInner {
                config: self.config,
                bus: self.bus.unwrap_or_default(),
                cache: self.cache.unwrap_or_default(),
                selector: self.selector,
                classifier,
                queue: self.queue,
                resolver: self.resolver,
                search: self.search,
                metadata: self.metadata,
                epoch,
                state: Mutex::new(state),
                signals: Mutex::new(Some(rx)),
            }),
        })
    }
}

impl PlaybackSession {
    pub fn builder(selector: BackendSelector, queue: Arc<dyn QueueStore>) -> PlaybackSessionBuilder {
        PlaybackSessionBuilder {
            selector,
            queue,
            config: PlaybackConfig::default(),
            bus: None,
            cache: None,
            classifier: None,
            resolver: None,
            search: None,
            metadata: None,
        }
    }

    pub fn event_bus(&self) -> &EventBus {
        &self.inner.bus
    }

    pub fn downgrade(&self) -> WeakPlaybackSession {
        WeakPlaybackSession {
            inner: Arc::downgrade(&self.inner),
        }
    }

    pub fn config(&self) -> &PlaybackConfig {
        &self.inner.config
    }

    pub fn state(&self) -> PlaybackState {
        let state = self.inner.state.lock();
        PlaybackState {
            current_track: state.current.clone(),
            is_playing: state.is_playing,
            phase: state.phase,
            position: state.position,
            duration: state.known_duration(),
            volume: state.volume,
            active_backend: self.inner.selector.active_kind(),
            route: state.route,
        }
    }

    pub fn current_track(&self) -> Option<Track> {
        self.inner.state.lock().current.clone()
    }

    pub fn is_playing(&self) -> bool {
        self.inner.state.lock().is_playing
    }

    // ========================================================================
    // Track Cache
    // ========================================================================

    pub fn cache_track(&self, track: Track) {
        self.inner.cache.insert(track);
    }

    pub fn cache_tracks<I>(&self, tracks: I)
    where
        I: IntoIterator<Item = Track>,
    {
        self.inner.cache.extend(tracks);
    }

    /// Cached track for `track_id`, falling back to the library metadata store.
    pub fn cached_track(&self, track_id: &str) -> Option<Track> {
        self.inner.cache.get(track_id).or_else(|| {
            self.inner
                .metadata
                .as_ref()
                .and_then(|store| store.track_metadata(track_id))
        })
    }

    // ========================================================================
    // Track Dispatch
    // ========================================================================

    /// Resolve and start `track`, returning the backend it was routed to.
    pub async fn play_track(&self, track: Track) -> Result<BackendKind> {
        if !track.has_media() {
            debug!(track_id = %track.id, "Ignoring track without a media reference");
            return Err(PlaybackError::MissingMediaReference(track.id));
        }

        let token = {
            let mut state = self.inner.state.lock();
            state.generation += 1;
            state.phase = PlaybackPhase::Resolving;
            state.generation
        };

        let source = self.resolve_source(&track).await;
        if !self.is_current(token) {
            debug!(track_id = %track.id, "Play request superseded during resolution");
            return Err(PlaybackError::Superseded);
        }

        let request = self.build_request(&track, source);
        let route = match self.dispatch(token, &request).await {
            Ok(route) => route,
            Err(err) => {
                self.abandon_dispatch(token, &err);
                return Err(err);
            }
        };

        let previous_route = {
            let mut state = self.inner.state.lock();
            if state.generation != token {
                debug!(track_id = %track.id, "Play request superseded during dispatch");
                return Err(PlaybackError::Superseded);
            }
            state.pending = None;
            state.track_epoch = token;
            self.inner.epoch.settle(token);
            state.current = Some(track.clone());
            state.position = 0.0;
            state.backend_duration = None;
            state.route.replace(route)
        };

        if let Some(previous) = previous_route.filter(|previous| *previous != route) {
            if let Err(err) = self.inner.selector.backend(previous).pause().await {
                debug!(backend = %previous, error = %err, "Failed to silence previous backend");
            }
        }

        self.inner.cache.insert(track.clone());
        if let Err(err) = self.inner.queue.add_recently_played(&track) {
            warn!(track_id = %track.id, error = %err, "Failed to record recently played track");
        }

        info!(track_id = %track.id, title = %track.title, backend = %route, "Track changed");
        self.inner.bus.emit(PlayerEvent::TrackChange { track });
        Ok(route)
    }

    /// Look the id up (cache, then library metadata) and play it.
    pub async fn play_track_by_id(&self, track_id: &str) -> Result<BackendKind> {
        match self.cached_track(track_id) {
            Some(track) => self.play_track(track).await,
            None => {
                debug!(track_id, "play_track_by_id() for unknown track");
                Err(PlaybackError::TrackNotFound(track_id.to_string()))
            }
        }
    }

    /// Replace the queue with `tracks` and start at `start_id`, or at the
    /// first track when `start_id` is absent or not in the list.
    pub async fn play_all(&self, tracks: Vec<Track>, start_id: Option<&str>) -> Result<BackendKind> {
        let start_index = start_id
            .and_then(|id| tracks.iter().position(|track| track.id == id))
            .unwrap_or(0);
        let Some(start) = tracks.get(start_index).cloned() else {
            debug!("play_all() with an empty track list");
            return Err(PlaybackError::NoTrackLoaded);
        };

        let ids = tracks.iter().map(|track| track.id.clone()).collect();
        self.inner.cache.extend(tracks);
        self.inner.queue.set_queue(ids, start_index);
        self.play_track(start).await
    }

    async fn resolve_source(&self, track: &Track) -> String {
        if let Some(resolver) = &self.inner.resolver {
            match resolver.playback_url(&track.id).await {
                Ok(Some(local)) if !local.trim().is_empty() => {
                    debug!(track_id = %track.id, file = strip_path(&local), "Playing downloaded copy");
                    return local;
                }
                Ok(_) => {}
                Err(err) => {
                    warn!(track_id = %track.id, error = %err, "Download lookup failed; streaming instead");
                }
            }
        }
        track.url.clone()
    }

    fn build_request(&self, track: &Track, url: String) -> PlaybackRequest {
        let defaults = &self.inner.config.display_defaults;
        let title = if track.title.trim().is_empty() {
            defaults.title.clone()
        } else {
            track.title.clone()
        };
        let artist = track
            .artist
            .clone()
            .filter(|artist| !artist.trim().is_empty())
            .unwrap_or_else(|| defaults.artist.clone());
        let cover = track.cover.clone().unwrap_or_default();
        let cover = if self.inner.config.upgrade_insecure_artwork {
            upgrade_insecure_url(&cover)
        } else {
            cover
        };

        PlaybackRequest {
            url,
            title,
            artist,
            cover,
        }
    }

    async fn dispatch(&self, token: u64, request: &PlaybackRequest) -> Result<BackendKind> {
        let primary = self.inner.selector.preferred();
        let kind = primary.kind();
        self.mark_pending(token, kind);

        match primary.play(request).await {
            Ok(()) => Ok(kind),
            Err(err) if kind == BackendKind::Native => {
                warn!(error = %err, "Native playback failed; retrying on fallback backend");
                self.inner.selector.record_native_failure();
                if !self.is_current(token) {
                    return Err(PlaybackError::Superseded);
                }

                self.mark_pending(token, BackendKind::Fallback);
                self.inner
                    .selector
                    .fallback()
                    .play(request)
                    .await
                    .map(|()| BackendKind::Fallback)
                    .map_err(|fallback_err| {
                        PlaybackError::BackendDispatch(format!("native: {err}; fallback: {fallback_err}"))
                    })
            }
            Err(err) => Err(PlaybackError::BackendDispatch(err.to_string())),
        }
    }

    /// Record the dispatch about to happen. Signals emitted from here on
    /// carry `token` and stay marked in flight until the dispatch settles.
    fn mark_pending(&self, token: u64, kind: BackendKind) {
        let mut state = self.inner.state.lock();
        if state.generation == token {
            state.pending = Some((token, kind));
            self.inner.epoch.begin(token);
        }
    }

    fn abandon_dispatch(&self, token: u64, err: &PlaybackError) {
        let detail = {
            let mut state = self.inner.state.lock();
            if state.generation != token {
                return;
            }
            state.pending = None;
            state.phase = state.settled_phase();
            self.inner.epoch.settle(state.track_epoch);
            err.to_string()
        };
        if !err.is_superseded() {
            warn!(error = %detail, "Play request failed on every backend");
            self.inner.bus.emit(PlayerEvent::Error { detail });
        }
    }

    fn is_current(&self, token: u64) -> bool {
        self.inner.state.lock().generation == token
    }

    fn current_route(&self) -> Option<BackendKind> {
        self.inner.state.lock().route
    }

    // ========================================================================
    // Transport
    // ========================================================================

    pub async fn play(&self) {
        let Some(route) = self.current_route() else {
            debug!("play() with nothing loaded");
            return;
        };
        if let Err(err) = self.inner.selector.backend(route).resume().await {
            warn!(backend = %route, error = %err, "Failed to resume playback");
        }
    }

    pub async fn pause(&self) {
        let Some(route) = self.current_route() else {
            debug!("pause() with nothing loaded");
            return;
        };
        if let Err(err) = self.inner.selector.backend(route).pause().await {
            warn!(backend = %route, error = %err, "Failed to pause playback");
        }
    }

    pub async fn toggle_play(&self) {
        if self.is_playing() {
            self.pause().await;
        } else {
            self.play().await;
        }
    }

    /// Seek to `time` seconds. Negative, non-finite and out-of-range
    /// targets are ignored.
    pub async fn seek(&self, time: f64) {
        if !time.is_finite() || time < 0.0 {
            debug!(time, "Ignoring invalid seek target");
            return;
        }

        let (route, limit) = {
            let state = self.inner.state.lock();
            (state.route, state.known_duration())
        };
        let Some(route) = route else {
            debug!("seek() with nothing loaded");
            return;
        };
        if limit.is_some_and(|limit| time > limit) {
            debug!(time, ?limit, "Ignoring seek past the end of the track");
            return;
        }

        if let Err(err) = self
            .inner
            .selector
            .backend(route)
            .seek(Duration::from_secs_f64(time))
            .await
        {
            warn!(backend = %route, error = %err, "Seek failed");
        }
    }

    /// Seek to `pct` (clamped to `0.0..=1.0`) of the known duration.
    pub async fn seek_percent(&self, pct: f64) {
        if !pct.is_finite() {
            debug!(pct, "Ignoring non-finite seek percentage");
            return;
        }

        let (route, duration) = {
            let state = self.inner.state.lock();
            (state.route, state.known_duration())
        };
        let duration = duration.or_else(|| {
            route.and_then(|route| self.inner.selector.backend(route).duration())
        });
        let Some(duration) = duration else {
            debug!("seek_percent() without a known duration");
            return;
        };

        self.seek(duration * pct.clamp(0.0, 1.0)).await;
    }

    /// Play the next queued track. An exhausted queue pauses and rewinds.
    pub async fn next(&self) {
        match self.inner.queue.next_in_queue() {
            Some(track_id) => self.play_queued(&track_id).await,
            None => {
                debug!("Queue exhausted; rewinding");
                self.rewind_and_pause().await;
            }
        }
    }

    /// Restart the current track past the restart threshold, otherwise play
    /// the previous queued track.
    pub async fn prev(&self) {
        let (loaded, position) = {
            let state = self.inner.state.lock();
            (state.current.is_some(), state.position)
        };

        if loaded && position > self.inner.config.restart_threshold_secs {
            self.seek(0.0).await;
            return;
        }

        match self.inner.queue.prev_in_queue() {
            Some(track_id) => self.play_queued(&track_id).await,
            None => debug!("Already at the start of the queue"),
        }
    }

    /// Pause and rewind to the start.
    pub async fn stop(&self) {
        self.rewind_and_pause().await;
    }

    pub async fn set_volume(&self, volume: f32) {
        if !volume.is_finite() {
            debug!(volume, "Ignoring non-finite volume");
            return;
        }
        let volume = volume.clamp(0.0, 1.0);
        self.inner.state.lock().volume = volume;

        for backend in self.inner.selector.backends() {
            if let Err(err) = backend.set_volume(volume) {
                debug!(backend = %backend.kind(), error = %err, "Backend rejected volume");
            }
        }
        if let Err(err) = self.inner.queue.set_volume(volume) {
            warn!(error = %err, "Failed to persist volume");
        }
    }

    async fn play_queued(&self, track_id: &str) {
        let Some(track) = self.cached_track(track_id) else {
            debug!(track_id, "Queued track is not cached; ignoring");
            return;
        };
        if let Err(err) = self.play_track(track).await {
            debug!(track_id, error = %err, "Queued track did not start");
        }
    }

    async fn rewind_and_pause(&self) {
        self.pause().await;
        self.seek(0.0).await;
    }

    // ========================================================================
    // Backend Events
    // ========================================================================

    /// Consume backend signals until every backend sink is dropped.
    pub async fn run(&self) {
        let Some(mut signals) = self.inner.signals.lock().take() else {
            warn!("Playback event loop is already running");
            return;
        };

        while let Some(signal) = signals.recv().await {
            self.handle_backend_signal(signal).await;
        }
        debug!("Backend event channel closed; playback event loop finished");
    }

    /// Handle every signal already queued, without waiting for more.
    ///
    /// Returns the number of signals handled. Does nothing while
    /// [`run`](Self::run) owns the channel.
    pub async fn process_pending_events(&self) -> usize {
        let mut handled = 0;
        loop {
            let signal = match self.inner.signals.lock().as_mut() {
                Some(signals) => signals.try_recv().ok(),
                None => None,
            };
            let Some(signal) = signal else {
                break;
            };
            self.handle_backend_signal(signal).await;
            handled += 1;
        }
        handled
    }

    pub async fn handle_backend_signal(&self, signal: BackendSignal) {
        match signal.event {
            BackendEvent::RemoteNext => return self.next().await,
            BackendEvent::RemotePrev => return self.prev().await,
            _ => {}
        }

        {
            let state = self.inner.state.lock();
            if !state.accepts(&signal) {
                trace!(origin = %signal.origin, epoch = signal.epoch, event = ?signal.event, "Dropping stale backend signal");
                return;
            }
            // An end or failure seen mid-dispatch belongs to the outgoing track
            let ends_track = matches!(signal.event, BackendEvent::Ended | BackendEvent::Error { .. });
            if ends_track && (signal.in_flight || state.pending.is_some()) {
                debug!(origin = %signal.origin, event = ?signal.event, "Ignoring end of outgoing track during dispatch");
                return;
            }
        }

        let token = signal.epoch;
        match signal.event {
            BackendEvent::Playing => self.confirm_play_state(true),
            BackendEvent::Paused => self.confirm_play_state(false),
            BackendEvent::TimeUpdate { position, duration } => self.apply_time_update(position, duration),
            BackendEvent::Loaded { duration } => {
                let duration = {
                    let mut state = self.inner.state.lock();
                    if duration.is_some() {
                        state.backend_duration = duration;
                    }
                    state.known_duration().unwrap_or(0.0)
                };
                self.inner.bus.emit(PlayerEvent::Loaded { duration });
            }
            BackendEvent::Ended => self.handle_natural_end(token).await,
            BackendEvent::Error { detail } => self.handle_backend_error(detail, token),
            BackendEvent::RemoteNext | BackendEvent::RemotePrev => {}
        }
    }

    fn confirm_play_state(&self, is_playing: bool) {
        {
            let mut state = self.inner.state.lock();
            state.is_playing = is_playing;
            state.phase = match (is_playing, state.phase) {
                (true, _) => PlaybackPhase::Playing,
                (false, PlaybackPhase::Ended) => PlaybackPhase::Ended,
                (false, _) if state.current.is_some() => PlaybackPhase::Paused,
                (false, phase) => phase,
            };
        }
        self.inner.bus.emit(PlayerEvent::StateChange { is_playing });
    }

    fn apply_time_update(&self, position: f64, duration: Option<f64>) {
        if !position.is_finite() || position < 0.0 {
            trace!(position, "Ignoring invalid position report");
            return;
        }
        let duration = {
            let mut state = self.inner.state.lock();
            state.position = position;
            if duration.is_some() {
                state.backend_duration = duration;
            }
            state.known_duration().unwrap_or(0.0)
        };
        self.inner.bus.emit(PlayerEvent::TimeUpdate {
            current_time: position,
            duration,
        });
    }

    fn handle_backend_error(&self, detail: String, token: u64) {
        warn!(detail = %detail, "Backend reported a playback error");
        {
            let mut state = self.inner.state.lock();
            state.phase = if state.current.is_some() {
                PlaybackPhase::Paused
            } else {
                PlaybackPhase::Idle
            };
        }
        self.inner.bus.emit(PlayerEvent::Error { detail });

        let Some(delay) = self.inner.config.error_skip_delay else {
            return;
        };
        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            debug!("No async runtime; skipping error recovery");
            return;
        };
        let session = self.clone();
        runtime.spawn(async move {
            tokio::time::sleep(delay).await;
            if session.is_current(token) {
                debug!("Skipping to next track after playback error");
                session.next().await;
            } else {
                debug!("Error skip abandoned; a newer track started");
            }
        });
    }

    async fn handle_natural_end(&self, token: u64) {
        let finished = {
            let mut state = self.inner.state.lock();
            state.phase = PlaybackPhase::Ended;
            state.current.clone()
        };

        if let Some(track_id) = self.inner.queue.next_in_queue() {
            if let Some(track) = self.cached_track(&track_id) {
                if let Err(err) = self.play_track(track).await {
                    debug!(track_id = %track_id, error = %err, "Next queued track did not start");
                }
                return;
            }
            debug!(track_id = %track_id, "Next queued track is not cached");
        }

        let Some(finished) = finished else {
            self.rewind_and_pause().await;
            return;
        };

        if finished.is_podcast_episode() {
            info!(track_id = %finished.id, "Podcast episode ended; not auto-continuing");
            self.rewind_and_pause().await;
            return;
        }

        if !self.inner.config.auto_continue {
            self.rewind_and_pause().await;
            return;
        }

        match self.auto_continue(&finished, token).await {
            Ok(()) => {}
            Err(PlaybackError::Superseded) => {
                debug!("Auto-continuation superseded by a newer play request");
            }
            Err(err) => {
                if self.is_current(token) {
                    warn!(error = %err, "Auto-continuation failed; stopping");
                    self.rewind_and_pause().await;
                }
            }
        }
    }

    async fn auto_continue(&self, finished: &Track, token: u64) -> Result<()> {
        let Some(search) = self.inner.search.clone() else {
            debug!("No content search configured; stopping at end of queue");
            return Err(PlaybackError::SearchFetch("content search unavailable".to_string()));
        };

        let query = self.inner.classifier.classify(finished);
        info!(query = %query, "Auto-continuing with mood query");
        let results = search
            .search_songs(&query)
            .await
            .map_err(|err| PlaybackError::SearchFetch(err.to_string()))?;
        if !self.is_current(token) {
            return Err(PlaybackError::Superseded);
        }

        let follow_on = select_follow_on(results, &self.inner.queue.snapshot());
        let Some(first) = follow_on.first().cloned() else {
            return Err(PlaybackError::SearchFetch(format!("no results for '{query}'")));
        };

        let ids = follow_on.iter().map(|track| track.id.clone()).collect();
        self.inner.cache.extend(follow_on);
        self.inner.queue.set_queue(ids, 0);
        self.play_track(first).await.map(|_| ())
    }
}

/// Results not already in the exhausted queue, or all results when every
/// one of them was.
fn select_follow_on(results: Vec<Track>, exhausted: &QueueSnapshot) -> Vec<Track> {
    let fresh: Vec<Track> = results
        .iter()
        .filter(|track| !exhausted.contains(&track.id))
        .cloned()
        .collect();
    if fresh.is_empty() {
        results
    } else {
        fresh
    }
}
