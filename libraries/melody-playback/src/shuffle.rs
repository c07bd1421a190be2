//! Queue randomization
//!
//! Uniform Fisher-Yates permutation over the whole queue, including the
//! entry currently playing.

use melody_core::Track;
use rand::seq::SliceRandom;
use rand::{thread_rng, Rng};

/// Shuffle tracks in place with the thread-local RNG
pub fn shuffle_tracks(tracks: &mut [Track]) {
    let mut rng = thread_rng();
    shuffle_tracks_with(tracks, &mut rng);
}

/// Shuffle tracks in place with a caller-supplied RNG
///
/// Every permutation is equally likely. Seeded RNGs give reproducible orders.
pub fn shuffle_tracks_with<R: Rng + ?Sized>(tracks: &mut [Track], rng: &mut R) {
    tracks.shuffle(rng);
}
