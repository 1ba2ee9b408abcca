//! # Playback Error Types
//!
//! Errors surfaced by the playback session and its backends.

use bridge_traits::BridgeError;
use thiserror::Error;

/// Errors that can occur during playback operations.
#[derive(Error, Debug)]
pub enum PlaybackError {
    // ========================================================================
    // Track Errors
    // ========================================================================
    /// The track has no usable media reference. Nothing was changed.
    #[error("Track has no media reference: {0}")]
    MissingMediaReference(String),

    /// The id is unknown to both the track cache and the metadata store.
    #[error("Track not found: {0}")]
    TrackNotFound(String),

    // ========================================================================
    // Backend Errors
    // ========================================================================
    /// Every eligible backend refused the play request.
    #[error("No backend accepted the play request: {0}")]
    BackendDispatch(String),

    /// A single backend call failed.
    #[error("Backend call failed: {0}")]
    Backend(String),

    /// Seek target is negative, not finite, or past the known duration.
    #[error("Invalid seek target: {0}")]
    InvalidSeek(f64),

    /// Attempted operation when no track is loaded.
    #[error("No track loaded")]
    NoTrackLoaded,

    // ========================================================================
    // Continuation Errors
    // ========================================================================
    /// The content search behind auto-continuation failed.
    #[error("Content search failed: {0}")]
    SearchFetch(String),

    /// A newer play request replaced this one before it completed.
    #[error("Superseded by a newer play request")]
    Superseded,

    // ========================================================================
    // Generic Errors
    // ========================================================================
    #[error("Invalid playback configuration: {0}")]
    InvalidConfig(String),

    #[error("Bridge error: {0}")]
    Bridge(#[from] BridgeError),
}

impl PlaybackError {
    /// Returns `true` if retrying the same request may succeed.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            PlaybackError::BackendDispatch(_)
                | PlaybackError::Backend(_)
                | PlaybackError::SearchFetch(_)
                | PlaybackError::Bridge(BridgeError::OperationFailed(_))
        )
    }

    /// Returns `true` if the request lost a race against a newer one.
    pub fn is_superseded(&self) -> bool {
        matches!(self, PlaybackError::Superseded)
    }
}

/// Result type for playback operations.
pub type Result<T> = std::result::Result<T, PlaybackError>;
