//! Library collaborators consumed by the playback core.
//!
//! - [`QueueStore`] - play order, cursor, recently played and persisted volume
//! - [`DownloadResolver`] - local copies of downloaded tracks
//! - [`ContentSearch`] - remote catalogue search
//! - [`TrackMetadataStore`] - persisted library metadata, used as a lookup fallback

use crate::error::Result;
use crate::track::Track;
use async_trait::async_trait;

/// Point-in-time view of the play queue.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueueSnapshot {
    /// Track ids in play order.
    pub queue: Vec<String>,
    /// Index of the current entry; `None` when no queue is loaded.
    pub cursor: Option<usize>,
    pub shuffle: bool,
}

impl QueueSnapshot {
    pub fn contains(&self, track_id: &str) -> bool {
        self.queue.iter().any(|id| id == track_id)
    }
}

/// Queue and listening-history store.
///
/// The store owns queue ordering; the core moves the cursor only through
/// [`next_in_queue`](QueueStore::next_in_queue) and
/// [`prev_in_queue`](QueueStore::prev_in_queue), and replaces the queue only
/// through [`set_queue`](QueueStore::set_queue).
pub trait QueueStore: Send + Sync {
    fn snapshot(&self) -> QueueSnapshot;

    /// Replace the queue and place the cursor at `start_index`.
    fn set_queue(&self, track_ids: Vec<String>, start_index: usize);

    /// Advance the cursor, returning the new current id.
    fn next_in_queue(&self) -> Option<String>;

    /// Move the cursor back, returning the new current id.
    fn prev_in_queue(&self) -> Option<String>;

    fn add_recently_played(&self, track: &Track) -> Result<()>;

    /// Persist the user's volume preference.
    fn set_volume(&self, volume: f32) -> Result<()>;
}

/// Resolves locally downloaded copies of tracks.
#[async_trait]
pub trait DownloadResolver: Send + Sync {
    /// Local playback URL for `track_id`, or `None` if it was never downloaded.
    async fn playback_url(&self, track_id: &str) -> Result<Option<String>>;
}

/// Remote catalogue search.
#[async_trait]
pub trait ContentSearch: Send + Sync {
    /// Songs matching `query`, best match first. May be empty.
    async fn search_songs(&self, query: &str) -> Result<Vec<Track>>;
}

/// Persisted library metadata (liked songs, playlists, history).
pub trait TrackMetadataStore: Send + Sync {
    fn track_metadata(&self, track_id: &str) -> Option<Track>;
}
