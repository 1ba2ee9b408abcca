//! # Track Cache
//!
//! Id-indexed store of full track records. Queue navigation only knows
//! ids, so every track that may be navigated to has to pass through here
//! first.

use bridge_traits::Track;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

/// Shared track cache. Clones refer to the same store.
///
/// Entries are never evicted; a queue may reference any of them.
#[derive(Debug, Clone, Default)]
pub struct TrackCache {
    entries: Arc<RwLock<HashMap<String, Track>>>,
}

impl TrackCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace one track; the last write for an id wins.
    pub fn insert(&self, track: Track) {
        self.entries.write().insert(track.id.clone(), track);
    }

    pub fn extend<I>(&self, tracks: I)
    where
        I: IntoIterator<Item = Track>,
    {
        let mut entries = self.entries.write();
        for track in tracks {
            entries.insert(track.id.clone(), track);
        }
    }

    pub fn get(&self, track_id: &str) -> Option<Track> {
        self.entries.read().get(track_id).cloned()
    }

    pub fn contains(&self, track_id: &str) -> bool {
        self.entries.read().contains_key(track_id)
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}
