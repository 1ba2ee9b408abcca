//! Now-playing surface exposed by the host OS or browser.

use crate::error::Result;
use futures::future::BoxFuture;
use std::sync::Arc;

/// One artwork entry of the now-playing metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artwork {
    pub src: String,
    pub sizes: String,
    pub mime_type: String,
}

/// Metadata displayed on the now-playing surface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NowPlayingMetadata {
    pub title: String,
    pub artist: String,
    pub album: String,
    pub artwork: Vec<Artwork>,
}

/// Playback state as the host surface understands it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostPlaybackState {
    None,
    Playing,
    Paused,
}

/// Transport controls offered by the host surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MediaAction {
    Play,
    Pause,
    PreviousTrack,
    NextTrack,
    SeekTo,
    Stop,
}

impl MediaAction {
    pub const ALL: [MediaAction; 6] = [
        MediaAction::Play,
        MediaAction::Pause,
        MediaAction::PreviousTrack,
        MediaAction::NextTrack,
        MediaAction::SeekTo,
        MediaAction::Stop,
    ];
}

/// Details delivered with a transport action.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ActionDetails {
    pub action: MediaAction,
    /// Target position in seconds, set for [`MediaAction::SeekTo`].
    pub seek_time: Option<f64>,
}

impl ActionDetails {
    pub fn new(action: MediaAction) -> Self {
        Self {
            action,
            seek_time: None,
        }
    }

    pub fn seek_to(seconds: f64) -> Self {
        Self {
            action: MediaAction::SeekTo,
            seek_time: Some(seconds),
        }
    }
}

/// Handler invoked by the host when a transport control is used. The host
/// is responsible for driving the returned future to completion.
pub type MediaActionHandler = Arc<dyn Fn(ActionDetails) -> BoxFuture<'static, ()> + Send + Sync>;

/// OS/browser now-playing integration.
///
/// Hosts without such a surface simply don't provide an implementation.
/// Implementations return [`BridgeError::NotAvailable`](crate::BridgeError::NotAvailable)
/// for features the platform lacks.
pub trait MediaSessionHost: Send + Sync {
    fn set_metadata(&self, metadata: NowPlayingMetadata) -> Result<()>;

    fn set_playback_state(&self, _state: HostPlaybackState) -> Result<()> {
        Ok(())
    }

    fn set_action_handler(&self, action: MediaAction, handler: MediaActionHandler) -> Result<()>;
}
