//! Simulated voice backend
//!
//! Each `play` spawns a render thread that "plays" the track by sleeping for
//! its length scaled by `time_scale`. Pause, resume and stop reach the thread
//! over a crossbeam control channel. The completion handler fires exactly
//! once, from the render thread.

use crossbeam_channel::{bounded, Receiver, RecvTimeoutError, Sender};
use melody_core::GuildId;
use melody_playback::{
    BackendError, BackendFactory, CompletionHandler, CompletionReason, PlaybackBackend,
};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// Length used for sources the backend has no duration for
pub const FALLBACK_LENGTH: Duration = Duration::from_secs(180);

/// Render thread control commands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Control {
    Pause,
    Resume,
    Stop,
}

struct ActivePlay {
    id: u64,
    control_tx: Sender<Control>,
}

#[derive(Default)]
struct Shared {
    active: Mutex<Option<ActivePlay>>,
    paused: AtomicBool,
}

impl Shared {
    fn active(&self) -> std::sync::MutexGuard<'_, Option<ActivePlay>> {
        self.active.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn send(&self, control: Control) {
        if let Some(play) = self.active().as_ref() {
            play.control_tx.try_send(control).ok();
        }
    }
}

/// Thread-per-track backend for one guild
pub struct SimulatedBackend {
    guild: GuildId,
    time_scale: f64,
    lengths: Arc<HashMap<String, Duration>>,
    next_id: AtomicU64,
    shared: Arc<Shared>,
}

impl SimulatedBackend {
    /// Create a backend
    ///
    /// # Arguments
    /// * `guild` - Guild the backend renders for (used for thread names and logs)
    /// * `time_scale` - Wall-clock seconds per track second
    /// * `lengths` - Track length per stream source
    pub fn new(guild: GuildId, time_scale: f64, lengths: Arc<HashMap<String, Duration>>) -> Self {
        Self {
            guild,
            time_scale,
            lengths,
            next_id: AtomicU64::new(0),
            shared: Arc::default(),
        }
    }

    fn wall_length(&self, source: &str) -> Duration {
        let length = self.lengths.get(source).copied().unwrap_or(FALLBACK_LENGTH);
        length.mul_f64(self.time_scale)
    }
}

impl PlaybackBackend for SimulatedBackend {
    fn play(&self, source: &str, on_complete: CompletionHandler) -> Result<(), BackendError> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let length = self.wall_length(source);
        let (control_tx, control_rx) = bounded(8);

        // A previous track still rendering is cut off
        if let Some(previous) = self
            .shared
            .active()
            .replace(ActivePlay { id, control_tx })
        {
            previous.control_tx.try_send(Control::Stop).ok();
        }
        self.shared.paused.store(false, Ordering::Release);

        let shared = Arc::clone(&self.shared);
        let spawned = thread::Builder::new()
            .name(format!("melody-render-{}", self.guild))
            .spawn(move || {
                let reason = render(length, &control_rx);
                {
                    let mut active = shared.active();
                    if active.as_ref().is_some_and(|play| play.id == id) {
                        *active = None;
                        shared.paused.store(false, Ordering::Release);
                    }
                }
                on_complete(reason);
            });

        if let Err(e) = spawned {
            self.shared.active().take();
            warn!(guild = %self.guild, "Failed to spawn render thread: {}", e);
            return Err(BackendError::Start {
                source_ref: source.to_string(),
                reason: e.to_string(),
            });
        }

        debug!(guild = %self.guild, source, ?length, "Rendering started");
        Ok(())
    }

    fn pause(&self) {
        self.shared.paused.store(true, Ordering::Release);
        self.shared.send(Control::Pause);
    }

    fn resume(&self) {
        self.shared.paused.store(false, Ordering::Release);
        self.shared.send(Control::Resume);
    }

    fn stop(&self) {
        if let Some(play) = self.shared.active().take() {
            play.control_tx.try_send(Control::Stop).ok();
        }
        self.shared.paused.store(false, Ordering::Release);
    }

    fn is_playing(&self) -> bool {
        self.shared.active().is_some() && !self.is_paused()
    }

    fn is_paused(&self) -> bool {
        self.shared.paused.load(Ordering::Acquire)
    }
}

/// Render one track, returning how it ended
fn render(length: Duration, control_rx: &Receiver<Control>) -> CompletionReason {
    let mut remaining = length;

    loop {
        let started = Instant::now();
        match control_rx.recv_timeout(remaining) {
            Err(RecvTimeoutError::Timeout) => return CompletionReason::NaturalEnd,
            Ok(Control::Stop) | Err(RecvTimeoutError::Disconnected) => {
                return CompletionReason::Stopped
            }
            Ok(Control::Resume) => {
                remaining = remaining.saturating_sub(started.elapsed());
            }
            Ok(Control::Pause) => {
                remaining = remaining.saturating_sub(started.elapsed());
                loop {
                    match control_rx.recv() {
                        Ok(Control::Resume) => break,
                        Ok(Control::Pause) => {}
                        Ok(Control::Stop) | Err(_) => return CompletionReason::Stopped,
                    }
                }
            }
        }
    }
}

/// Hands out a [`SimulatedBackend`] per guild
#[derive(Debug, Clone)]
pub struct SimulatedBackendFactory {
    time_scale: f64,
    lengths: Arc<HashMap<String, Duration>>,
}

impl SimulatedBackendFactory {
    pub fn new(time_scale: f64, lengths: HashMap<String, Duration>) -> Self {
        Self {
            time_scale,
            lengths: Arc::new(lengths),
        }
    }
}

impl BackendFactory for SimulatedBackendFactory {
    fn create(&self, guild: GuildId) -> Result<Arc<dyn PlaybackBackend>, BackendError> {
        Ok(Arc::new(SimulatedBackend::new(
            guild,
            self.time_scale,
            Arc::clone(&self.lengths),
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn render_ends_naturally() {
        let (_tx, rx) = bounded(1);
        assert_eq!(
            render(Duration::from_millis(5), &rx),
            CompletionReason::NaturalEnd
        );
    }

    #[test]
    fn render_stops_on_command() {
        let (tx, rx) = bounded(1);
        tx.send(Control::Stop).unwrap();
        assert_eq!(render(Duration::from_secs(60), &rx), CompletionReason::Stopped);
    }

    #[test]
    fn render_stops_when_controller_drops() {
        let (tx, rx) = bounded::<Control>(1);
        drop(tx);
        assert_eq!(render(Duration::from_secs(60), &rx), CompletionReason::Stopped);
    }

    #[test]
    fn unknown_source_uses_fallback_length() {
        let backend = SimulatedBackend::new(GuildId::new(1), 0.5, Arc::default());
        assert_eq!(backend.wall_length("nowhere"), FALLBACK_LENGTH.mul_f64(0.5));
    }
}
