//! Playback surface traits.
//!
//! The core drives two kinds of host playback surfaces:
//!
//! - [`NativeMediaService`]: a platform media service (e.g. an Android
//!   foreground service wrapping ExoPlayer). It receives a URL plus display
//!   metadata and reports transport and progress events back.
//! - [`MediaElement`]: an in-process media element used when the native
//!   service is unreachable or a native call fails.
//!
//! Both surfaces push their events through a listener closure registered once
//! by the core. Listeners may be invoked from any thread.

use crate::error::Result;
use async_trait::async_trait;
use std::sync::Arc;

/// Request sent to the native media service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NativePlayRequest {
    pub url: String,
    pub title: String,
    pub artist: String,
    pub cover: String,
}

/// Events raised by the native media service.
#[derive(Debug, Clone, PartialEq)]
pub enum NativeMediaEvent {
    /// "Next" pressed on the system notification.
    MediaNext,
    /// "Previous" pressed on the system notification.
    MediaPrev,
    /// The current item played to its end.
    MediaEnded,
    /// Periodic progress report, in seconds.
    TimeUpdate { position: f64, duration: f64 },
}

pub type NativeMediaListener = Arc<dyn Fn(NativeMediaEvent) + Send + Sync>;

/// Platform-native media service.
#[async_trait]
pub trait NativeMediaService: Send + Sync {
    /// Whether the service is reachable from this process.
    fn is_available(&self) -> bool;

    /// Load and start the given item, replacing whatever was playing.
    async fn play(&self, request: NativePlayRequest) -> Result<()>;

    async fn pause(&self) -> Result<()>;

    async fn resume(&self) -> Result<()>;

    /// Seek to an absolute position in milliseconds.
    async fn seek(&self, position_ms: u64) -> Result<()>;

    /// Register the single event listener. Replaces any previous listener.
    fn set_listener(&self, listener: NativeMediaListener) -> Result<()>;
}

/// Events raised by the fallback media element.
#[derive(Debug, Clone, PartialEq)]
pub enum MediaElementEvent {
    Ended,
    /// Progress report in seconds. `duration` is `None` while unknown.
    TimeUpdate {
        current_time: f64,
        duration: Option<f64>,
    },
    LoadedMetadata {
        duration: Option<f64>,
    },
    Error {
        detail: String,
    },
    Play,
    Pause,
}

pub type MediaElementListener = Arc<dyn Fn(MediaElementEvent) + Send + Sync>;

/// In-process media element.
///
/// Mirrors the shape of an HTML audio element: a source, transport calls,
/// a seekable `current_time` and a reported `duration`.
#[async_trait]
pub trait MediaElement: Send + Sync {
    fn set_source(&self, url: &str) -> Result<()>;

    fn has_source(&self) -> bool;

    /// Start playback of the current source. Resolves once the element has
    /// accepted the request; the `Play` event confirms actual playback.
    async fn play(&self) -> Result<()>;

    fn pause(&self) -> Result<()>;

    fn set_current_time(&self, seconds: f64) -> Result<()>;

    fn current_time(&self) -> f64;

    fn duration(&self) -> Option<f64>;

    /// Volume in `0.0..=1.0`.
    fn set_volume(&self, volume: f32) -> Result<()>;

    /// Register the single event listener. Replaces any previous listener.
    fn set_listener(&self, listener: MediaElementListener) -> Result<()>;
}
