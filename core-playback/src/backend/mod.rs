//! # Playback Backends
//!
//! A backend is one way of turning a media URL into sound:
//!
//! - [`NativeBackend`]: the platform media service (notification controls,
//!   background playback)
//! - [`FallbackBackend`]: the in-process media element
//!
//! Both normalize their host surface into [`BackendEvent`]s and push them
//! through a [`LifecycleSink`] into the session's event loop. The session
//! decides which backend a request goes to through [`BackendSelector`].

mod fallback;
mod native;
mod selector;

pub use fallback::FallbackBackend;
pub use native::NativeBackend;
pub use selector::{BackendSelector, NativeRetryPolicy};

use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc::UnboundedSender;

/// Identifies a backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackendKind {
    Native,
    Fallback,
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BackendKind::Native => f.write_str("native"),
            BackendKind::Fallback => f.write_str("fallback"),
        }
    }
}

/// Everything a backend needs to start a track.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaybackRequest {
    /// Local copy when one exists, otherwise the remote reference.
    pub url: String,
    pub title: String,
    pub artist: String,
    /// Artwork reference, already upgraded to https when configured.
    pub cover: String,
}

/// Normalized backend lifecycle event.
#[derive(Debug, Clone, PartialEq)]
pub enum BackendEvent {
    Playing,
    Paused,
    Ended,
    /// Progress in seconds. `duration` is `None` while unknown.
    TimeUpdate {
        position: f64,
        duration: Option<f64>,
    },
    Loaded {
        duration: Option<f64>,
    },
    Error {
        detail: String,
    },
    /// Remote "next" from a system control surface.
    RemoteNext,
    /// Remote "previous" from a system control surface.
    RemotePrev,
}

/// A [`BackendEvent`] tagged with where and when it came from.
#[derive(Debug, Clone, PartialEq)]
pub struct BackendSignal {
    pub origin: BackendKind,
    /// Dispatch epoch current when the event was emitted. Signals from an
    /// earlier dispatch are stale.
    pub epoch: u64,
    /// Emitted while the dispatch for `epoch` had not settled yet.
    pub in_flight: bool,
    pub event: BackendEvent,
}

/// Shared dispatch stamp read by every sink.
///
/// Packs the epoch with an in-flight bit so both are read in one load. The
/// session begins a new epoch right before each dispatch and settles it
/// once the track is routed or the dispatch is abandoned.
#[derive(Debug, Clone, Default)]
pub struct DispatchEpoch(Arc<AtomicU64>);

impl DispatchEpoch {
    pub fn current(&self) -> u64 {
        self.stamp().0
    }

    /// Whether a dispatch is still waiting on its backend.
    pub fn in_flight(&self) -> bool {
        self.stamp().1
    }

    pub fn begin(&self, epoch: u64) {
        self.0.store((epoch << 1) | 1, Ordering::SeqCst);
    }

    pub fn settle(&self, epoch: u64) {
        self.0.store(epoch << 1, Ordering::SeqCst);
    }

    fn stamp(&self) -> (u64, bool) {
        let raw = self.0.load(Ordering::SeqCst);
        (raw >> 1, raw & 1 == 1)
    }
}

/// Sending half of the session's backend event channel, bound to one origin.
#[derive(Debug, Clone)]
pub struct LifecycleSink {
    origin: BackendKind,
    epoch: DispatchEpoch,
    tx: UnboundedSender<BackendSignal>,
}

impl LifecycleSink {
    pub fn new(origin: BackendKind, epoch: DispatchEpoch, tx: UnboundedSender<BackendSignal>) -> Self {
        Self { origin, epoch, tx }
    }

    pub fn origin(&self) -> BackendKind {
        self.origin
    }

    /// Queue `event` for the session. Returns `false` once the session is gone.
    pub fn emit(&self, event: BackendEvent) -> bool {
        let (epoch, in_flight) = self.epoch.stamp();
        self.tx
            .send(BackendSignal {
                origin: self.origin,
                epoch,
                in_flight,
                event,
            })
            .is_ok()
    }
}

/// One playback surface the session can dispatch to.
///
/// `play` replaces whatever the backend was playing. Transport calls
/// resolve once the host accepted them; confirmation arrives as
/// [`BackendEvent`]s on the sink registered through
/// [`subscribe_lifecycle`](PlaybackBackend::subscribe_lifecycle).
#[async_trait]
pub trait PlaybackBackend: Send + Sync {
    fn kind(&self) -> BackendKind;

    async fn play(&self, request: &PlaybackRequest) -> Result<()>;

    async fn pause(&self) -> Result<()>;

    /// Resume the currently loaded item.
    async fn resume(&self) -> Result<()>;

    async fn seek(&self, position: Duration) -> Result<()>;

    /// Volume in `0.0..=1.0`.
    fn set_volume(&self, volume: f32) -> Result<()>;

    /// Register the sink that receives this backend's lifecycle events.
    fn subscribe_lifecycle(&self, sink: LifecycleSink) -> Result<()>;

    /// Duration reported by the backend for the loaded item, if any.
    fn duration(&self) -> Option<f64> {
        None
    }
}
