//! # Playback Engine
//!
//! Current-track state, backend mediation and queue continuation.
//!
//! ## Overview
//!
//! This crate handles:
//! - Choosing between the native media service and the in-process media
//!   element ([`BackendSelector`])
//! - The playback state machine ([`PlaybackSession`])
//! - Mood-based auto-continuation queries ([`MoodClassifier`])
//! - Now-playing surface integration ([`MediaSessionAdapter`])
//! - An id-indexed [`TrackCache`] and an in-memory [`MemoryQueueStore`]

pub mod backend;
pub mod cache;
pub mod config;
pub mod error;
pub mod media_session;
pub mod mood;
pub mod queue;
pub mod session;

pub use backend::{
    BackendEvent, BackendKind, BackendSelector, BackendSignal, DispatchEpoch, FallbackBackend,
    LifecycleSink, NativeBackend, NativeRetryPolicy, PlaybackBackend, PlaybackRequest,
};
pub use cache::TrackCache;
pub use config::{DisplayDefaults, PlaybackConfig};
pub use error::{PlaybackError, Result};
pub use media_session::MediaSessionAdapter;
pub use mood::{MoodClassifier, MoodRule};
pub use queue::MemoryQueueStore;
pub use session::{
    PlaybackPhase, PlaybackSession, PlaybackSessionBuilder, PlaybackState, WeakPlaybackSession,
};
