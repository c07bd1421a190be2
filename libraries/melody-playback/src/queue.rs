//! Ordered track queue with a play cursor
//!
//! Tracks are never removed by playing past them; the cursor walks the
//! queue so finished tracks stay visible in listings and can be jumped back
//! to. Duplicates are distinct entries.

use crate::shuffle::shuffle_tracks;
use melody_core::Track;

/// Queue of tracks plus the index of the current one
///
/// ```text
///   0) Track A
/// > 1) Track B   <- cursor
///   2) Track C
/// ```
///
/// The cursor is `len()` once the queue has been played through.
#[derive(Debug, Clone, Default)]
pub struct TrackQueue {
    tracks: Vec<Track>,
    cursor: usize,
}

impl TrackQueue {
    /// Create new empty queue
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a track, returning its index
    pub fn push(&mut self, track: Track) -> usize {
        self.tracks.push(track);
        self.tracks.len() - 1
    }

    /// Track under the cursor
    pub fn current(&self) -> Option<&Track> {
        self.tracks.get(self.cursor)
    }

    /// Current cursor index
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Whether the cursor sits on the final track
    pub fn is_last(&self) -> bool {
        !self.tracks.is_empty() && self.cursor == self.tracks.len() - 1
    }

    /// Move the cursor to `index`
    ///
    /// Returns `false` and leaves the cursor alone when `index` is out of range.
    pub fn seek(&mut self, index: usize) -> bool {
        if index < self.tracks.len() {
            self.cursor = index;
            true
        } else {
            false
        }
    }

    /// Step the cursor forward one track
    ///
    /// Past the last track the cursor wraps to 0 when `wrap` is set, otherwise
    /// it parks at `len()` and `None` is returned.
    pub fn advance(&mut self, wrap: bool) -> Option<&Track> {
        if self.tracks.is_empty() {
            return None;
        }

        self.cursor += 1;
        if self.cursor >= self.tracks.len() {
            if !wrap {
                self.cursor = self.tracks.len();
                return None;
            }
            self.cursor = 0;
        }
        self.tracks.get(self.cursor)
    }

    /// Park the cursor past the end (queue played through)
    pub fn mark_exhausted(&mut self) {
        self.cursor = self.tracks.len();
    }

    /// Randomly permute every entry and move the cursor to the new first track
    pub fn shuffle(&mut self) {
        shuffle_tracks(&mut self.tracks);
        self.cursor = 0;
    }

    /// Remove every track and reset the cursor
    pub fn clear(&mut self) {
        self.tracks.clear();
        self.cursor = 0;
    }

    /// All tracks in play order
    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    /// Track at index
    pub fn get(&self, index: usize) -> Option<&Track> {
        self.tracks.get(index)
    }

    /// Total number of tracks in queue
    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    /// Check if queue is empty
    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }
}
