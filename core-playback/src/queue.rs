//! In-memory [`QueueStore`] for hosts without a persistent library and for
//! tests.

use bridge_traits::error::Result;
use bridge_traits::{QueueSnapshot, QueueStore, Track};
use parking_lot::Mutex;
use std::collections::VecDeque;

const RECENTLY_PLAYED_LIMIT: usize = 50;

#[derive(Debug)]
struct QueueState {
    ids: Vec<String>,
    cursor: Option<usize>,
    shuffle: bool,
    recently_played: VecDeque<Track>,
    volume: f32,
}

/// Queue store keeping everything in process memory.
///
/// The cursor is either `None` (no queue) or a valid index into the queue.
#[derive(Debug)]
pub struct MemoryQueueStore {
    state: Mutex<QueueState>,
}

impl Default for MemoryQueueStore {
    fn default() -> Self {
        Self {
            state: Mutex::new(QueueState {
                ids: Vec::new(),
                cursor: None,
                shuffle: false,
                recently_played: VecDeque::new(),
                volume: 1.0,
            }),
        }
    }
}

impl MemoryQueueStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stored for the host's display only; traversal order is unaffected.
    pub fn set_shuffle(&self, shuffle: bool) {
        self.state.lock().shuffle = shuffle;
    }

    /// Most recent first, one entry per track id.
    pub fn recently_played(&self) -> Vec<Track> {
        self.state.lock().recently_played.iter().cloned().collect()
    }

    pub fn volume(&self) -> f32 {
        self.state.lock().volume
    }
}

impl QueueStore for MemoryQueueStore {
    fn snapshot(&self) -> QueueSnapshot {
        let state = self.state.lock();
        QueueSnapshot {
            queue: state.ids.clone(),
            cursor: state.cursor,
            shuffle: state.shuffle,
        }
    }

    fn set_queue(&self, track_ids: Vec<String>, start_index: usize) {
        let mut state = self.state.lock();
        state.cursor = match track_ids.len() {
            0 => None,
            len => Some(start_index.min(len - 1)),
        };
        state.ids = track_ids;
    }

    fn next_in_queue(&self) -> Option<String> {
        let mut state = self.state.lock();
        let next = match state.cursor {
            Some(index) => index + 1,
            None => 0,
        };
        let id = state.ids.get(next)?.clone();
        state.cursor = Some(next);
        Some(id)
    }

    fn prev_in_queue(&self) -> Option<String> {
        let mut state = self.state.lock();
        let prev = state.cursor?.checked_sub(1)?;
        let id = state.ids.get(prev)?.clone();
        state.cursor = Some(prev);
        Some(id)
    }

    fn add_recently_played(&self, track: &Track) -> Result<()> {
        let mut state = self.state.lock();
        state.recently_played.retain(|t| t.id != track.id);
        state.recently_played.push_front(track.clone());
        state.recently_played.truncate(RECENTLY_PLAYED_LIMIT);
        Ok(())
    }

    fn set_volume(&self, volume: f32) -> Result<()> {
        self.state.lock().volume = volume.clamp(0.0, 1.0);
        Ok(())
    }
}
