//! Playback session - per-guild queue state machine
//!
//! A session owns the queue, cursor, loop flags and playback state for one
//! guild and is the only thing that drives that guild's backend. Every
//! operation, including the completion callback arriving from the backend's
//! thread, runs under one mutex, so operations on a session are totally
//! ordered.
//!
//! # Completion fencing
//!
//! Each backend `play` call is stamped with the session's `generation`.
//! Anything that forcibly ends a track (stop, skip, jump, clear, shuffle)
//! bumps the generation *before* telling the backend to stop. A completion
//! carrying an older generation is stale and is dropped without touching
//! cursor or state, so a late "track finished" can never advance the queue
//! twice.

use crate::{
    backend::{CompletionHandler, PlaybackBackend},
    error::{Result, SessionError},
    events::{EventSender, SessionEvent},
    format,
    queue::TrackQueue,
    types::{CompletionReason, PlayOutcome, PlaybackState, SessionConfig, SessionSnapshot},
};
use melody_core::{GuildId, Resolver, Track};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use tracing::{debug, info, warn};

/// Mutable state guarded by the session lock
#[derive(Debug)]
struct SessionState {
    queue: TrackQueue,
    loop_track: bool,
    loop_queue: bool,
    playback: PlaybackState,
    generation: u64,
}

/// Playback controller for one guild
///
/// Always handled through an `Arc`; completion callbacks keep only a `Weak`
/// reference, so a callback arriving after the session was torn down is
/// ignored.
pub struct PlaybackSession {
    guild: GuildId,
    resolver: Arc<dyn Resolver>,
    backend: Arc<dyn PlaybackBackend>,
    events: Option<EventSender>,
    max_title_length: usize,
    state: Mutex<SessionState>,
    this: Weak<PlaybackSession>,
}

impl PlaybackSession {
    /// Create an empty, idle session
    pub fn new(
        guild: GuildId,
        resolver: Arc<dyn Resolver>,
        backend: Arc<dyn PlaybackBackend>,
        config: &SessionConfig,
        events: Option<EventSender>,
    ) -> Arc<Self> {
        let state = SessionState {
            queue: TrackQueue::new(),
            loop_track: config.loop_track,
            loop_queue: config.loop_queue,
            playback: PlaybackState::Idle,
            generation: 0,
        };

        Arc::new_cyclic(|this| Self {
            guild,
            resolver,
            backend,
            events,
            max_title_length: config.max_title_length,
            state: Mutex::new(state),
            this: this.clone(),
        })
    }

    /// Guild this session belongs to
    pub fn guild(&self) -> GuildId {
        self.guild
    }

    // ===== Queue Mutation =====

    /// Resolve `query` and append the result without starting playback
    pub fn enqueue(&self, query: &str, requester: &str) -> Result<Track> {
        let mut state = self.lock();
        self.enqueue_locked(&mut state, query, requester)
    }

    /// Play `query`, or queue it behind whatever is already playing
    ///
    /// - Paused: resumes; the query is not resolved
    /// - Playing: appends and reports [`PlayOutcome::Queued`]
    /// - Idle: appends, moves the cursor onto the new track and starts it
    ///
    /// The whole decision runs under the session lock.
    pub fn play_or_enqueue(&self, query: &str, requester: &str) -> Result<PlayOutcome> {
        let mut state = self.lock();

        match state.playback {
            PlaybackState::Paused => {
                self.resume_locked(&mut state)?;
                Ok(PlayOutcome::Resumed)
            }
            PlaybackState::Playing => {
                let track = self.enqueue_locked(&mut state, query, requester)?;
                Ok(PlayOutcome::Queued(track))
            }
            PlaybackState::Idle => {
                let track = self.resolver.resolve(query, requester)?;
                let index = state.queue.push(track);
                state.queue.seek(index);
                let track = self.start_current(&mut state)?;
                Ok(PlayOutcome::NowPlaying(track))
            }
        }
    }

    /// Skip to the next track
    ///
    /// On the last track this ends playback, or wraps to the first track when
    /// loop-queue is on. The outcome is decided here; the completion from the
    /// stopped track is stale.
    ///
    /// # Returns
    /// * `Ok(Some(track))` - `track` is now playing
    /// * `Ok(None)` - Queue ran out; session is idle
    pub fn skip(&self) -> Result<Option<Track>> {
        let mut state = self.lock();

        if state.queue.is_empty() {
            return Err(SessionError::EmptyQueue);
        }
        if !state.playback.is_active() {
            return Err(SessionError::NotInSession {
                state: state.playback,
            });
        }

        if !state.queue.is_last() {
            let position = state.queue.cursor() + 2;
            return self.jump_locked(&mut state, position).map(Some);
        }

        self.interrupt(&mut state);
        if state.loop_queue {
            state.queue.seek(0);
            self.start_current(&mut state).map(Some)
        } else {
            state.queue.mark_exhausted();
            state.playback = PlaybackState::Idle;
            self.emit(SessionEvent::QueueFinished { guild: self.guild });
            Ok(None)
        }
    }

    /// Start the track at 1-based `position`
    ///
    /// Fails with [`SessionError::OutOfRange`] and changes nothing when
    /// `position` is outside `[1, len]`.
    pub fn jump(&self, position: usize) -> Result<Track> {
        let mut state = self.lock();
        self.jump_locked(&mut state, position)
    }

    /// Stop playback and empty the queue
    pub fn clear_queue(&self) {
        let mut state = self.lock();
        self.interrupt(&mut state);
        state.queue.clear();
        state.playback = PlaybackState::Idle;
        debug!(guild = %self.guild, "Queue cleared");
    }

    /// Randomly reorder the whole queue and restart from its new first track
    pub fn shuffle(&self) -> Result<Track> {
        let mut state = self.lock();

        if state.queue.is_empty() {
            return Err(SessionError::EmptyQueue);
        }

        self.interrupt(&mut state);
        state.queue.shuffle();
        self.start_current(&mut state)
    }

    /// Stop playback, keeping queue and cursor
    pub fn stop(&self) {
        let mut state = self.lock();
        self.interrupt(&mut state);
        state.playback = PlaybackState::Idle;
    }

    // ===== Pause / Resume =====

    /// Pause the current track
    pub fn pause(&self) -> Result<()> {
        let mut state = self.lock();

        if state.playback != PlaybackState::Playing {
            return Err(SessionError::NotInSession {
                state: state.playback,
            });
        }

        self.backend.pause();
        state.playback = PlaybackState::Paused;
        Ok(())
    }

    /// Resume a paused track
    pub fn resume(&self) -> Result<()> {
        let mut state = self.lock();
        self.resume_locked(&mut state)
    }

    // ===== Loop Flags =====

    /// Flip loop-track; applies from the next completion
    pub fn toggle_loop_track(&self) -> bool {
        let mut state = self.lock();
        state.loop_track = !state.loop_track;
        state.loop_track
    }

    /// Flip loop-queue; applies from the next completion
    pub fn toggle_loop_queue(&self) -> bool {
        let mut state = self.lock();
        state.loop_queue = !state.loop_queue;
        state.loop_queue
    }

    // ===== Inspection =====

    /// Human-readable queue listing with the loop flags footer
    pub fn format_queue(&self) -> String {
        let state = self.lock();
        format::format_queue(
            state.queue.tracks(),
            state.loop_queue,
            state.loop_track,
            self.max_title_length,
        )
    }

    /// Track being played or paused
    pub fn now_playing(&self) -> Option<Track> {
        let state = self.lock();
        if state.playback.is_active() {
            state.queue.current().cloned()
        } else {
            None
        }
    }

    /// Current playback state
    pub fn state(&self) -> PlaybackState {
        self.lock().playback
    }

    /// Number of queued tracks
    pub fn len(&self) -> usize {
        self.lock().queue.len()
    }

    /// Check if queue is empty
    pub fn is_empty(&self) -> bool {
        self.lock().queue.is_empty()
    }

    /// Copy of the full session state
    pub fn snapshot(&self) -> SessionSnapshot {
        let state = self.lock();
        SessionSnapshot {
            tracks: state.queue.tracks().to_vec(),
            cursor: state.queue.cursor(),
            state: state.playback,
            loop_track: state.loop_track,
            loop_queue: state.loop_queue,
            generation: state.generation,
        }
    }

    // ===== Completion =====

    /// Handle the backend reporting that the play stamped `generation` ended
    ///
    /// Stale generations are ignored. A natural end replays the track under
    /// loop-track, otherwise advances (wrapping under loop-queue) or goes idle
    /// when the queue is exhausted. Tracks are kept either way.
    pub fn handle_completion(&self, generation: u64, reason: CompletionReason) {
        let mut state = self.lock();

        if generation != state.generation {
            debug!(
                guild = %self.guild,
                stale = generation,
                current = state.generation,
                "Ignoring stale completion"
            );
            return;
        }

        if reason == CompletionReason::Stopped {
            state.playback = PlaybackState::Idle;
            return;
        }

        if !state.loop_track {
            let wrap = state.loop_queue;
            if state.queue.advance(wrap).is_none() {
                state.playback = PlaybackState::Idle;
                info!(guild = %self.guild, "Queue finished");
                self.emit(SessionEvent::QueueFinished { guild: self.guild });
                return;
            }
        }

        if let Err(e) = self.start_current(&mut state) {
            warn!(guild = %self.guild, "Failed to start next track: {}", e);
        }
    }

    /// Stop the backend and empty everything (session teardown)
    pub(crate) fn shutdown(&self) {
        let mut state = self.lock();
        self.interrupt(&mut state);
        state.queue.clear();
        state.playback = PlaybackState::Idle;
    }

    // ===== Internals (lock held) =====

    fn lock(&self) -> MutexGuard<'_, SessionState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn enqueue_locked(
        &self,
        state: &mut SessionState,
        query: &str,
        requester: &str,
    ) -> Result<Track> {
        let track = self.resolver.resolve(query, requester)?;
        let index = state.queue.push(track.clone());
        debug!(guild = %self.guild, index, title = %track.title, "Track queued");
        Ok(track)
    }

    fn resume_locked(&self, state: &mut SessionState) -> Result<()> {
        if state.playback != PlaybackState::Paused {
            return Err(SessionError::NotInSession {
                state: state.playback,
            });
        }

        self.backend.resume();
        state.playback = PlaybackState::Playing;
        Ok(())
    }

    fn jump_locked(&self, state: &mut SessionState, position: usize) -> Result<Track> {
        let len = state.queue.len();
        if position < 1 || position > len {
            return Err(SessionError::OutOfRange { position, len });
        }

        self.interrupt(state);
        state.queue.seek(position - 1);
        self.start_current(state)
    }

    /// Invalidate the outstanding play, then stop the backend
    fn interrupt(&self, state: &mut SessionState) {
        state.generation += 1;
        if state.playback.is_active() {
            self.backend.stop();
        }
    }

    /// Start the track under the cursor
    ///
    /// The only place backend `play` is called.
    fn start_current(&self, state: &mut SessionState) -> Result<Track> {
        let Some(track) = state.queue.current().cloned() else {
            state.playback = PlaybackState::Idle;
            return Err(SessionError::EmptyQueue);
        };

        state.generation += 1;
        let generation = state.generation;
        let session = self.this.clone();
        let on_complete: CompletionHandler = Box::new(move |reason| match session.upgrade() {
            Some(session) => session.handle_completion(generation, reason),
            None => debug!(generation, "Completion for a session that no longer exists"),
        });

        if let Err(e) = self.backend.play(&track.source, on_complete) {
            state.playback = PlaybackState::Idle;
            warn!(guild = %self.guild, title = %track.title, "Backend refused track: {}", e);
            self.emit(SessionEvent::PlaybackFailed {
                guild: self.guild,
                message: e.to_string(),
            });
            return Err(e.into());
        }

        state.playback = PlaybackState::Playing;
        let position = state.queue.cursor();
        debug!(guild = %self.guild, position, generation, title = %track.title, "Now playing");
        self.emit(SessionEvent::NowPlaying {
            guild: self.guild,
            track: track.clone(),
            position,
        });
        Ok(track)
    }

    fn emit(&self, event: SessionEvent) {
        if let Some(events) = &self.events {
            if events.send(event).is_err() {
                debug!(guild = %self.guild, "Event receiver dropped");
            }
        }
    }
}

impl std::fmt::Debug for PlaybackSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlaybackSession")
            .field("guild", &self.guild)
            .field("state", &*self.lock())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::testing::RecordingBackend;
    use crate::events::event_channel;
    use melody_core::ResolveError;

    /// Resolves any query to a track titled after it; "missing" finds nothing
    struct EchoResolver;

    impl Resolver for EchoResolver {
        fn resolve(&self, query: &str, requester: &str) -> melody_core::Result<Track> {
            if query == "missing" {
                return Err(ResolveError::not_found(query));
            }
            Ok(Track::new(
                format!("stream://{query}"),
                query,
                format!("https://example.com/{query}"),
                120,
            )
            .with_requester(requester))
        }
    }

    fn session() -> (Arc<PlaybackSession>, Arc<RecordingBackend>) {
        let backend = Arc::new(RecordingBackend::default());
        let session = PlaybackSession::new(
            GuildId::new(1),
            Arc::new(EchoResolver),
            backend.clone(),
            &SessionConfig::default(),
            None,
        );
        (session, backend)
    }

    #[test]
    fn enqueue_does_not_start_playback() {
        let (session, backend) = session();
        let track = session.enqueue("A", "alice").unwrap();

        assert_eq!(track.requester, "alice");
        assert_eq!(session.len(), 1);
        assert_eq!(session.state(), PlaybackState::Idle);
        assert!(backend.plays().is_empty());
    }

    #[test]
    fn enqueue_not_found_leaves_state() {
        let (session, _) = session();
        let err = session.enqueue("missing", "alice").unwrap_err();
        assert_eq!(
            err,
            SessionError::NotFound {
                query: "missing".to_string()
            }
        );
        assert!(session.is_empty());
    }

    #[test]
    fn play_from_idle_starts_new_track() {
        let (session, backend) = session();
        session.enqueue("A", "alice").unwrap();

        let outcome = session.play_or_enqueue("B", "bob").unwrap();
        assert!(matches!(outcome, PlayOutcome::NowPlaying(ref t) if t.title == "B"));
        assert_eq!(session.snapshot().cursor, 1);
        assert_eq!(backend.plays(), vec!["stream://B"]);
    }

    #[test]
    fn play_while_playing_queues() {
        let (session, backend) = session();
        session.play_or_enqueue("A", "alice").unwrap();

        let outcome = session.play_or_enqueue("B", "bob").unwrap();
        assert!(matches!(outcome, PlayOutcome::Queued(ref t) if t.title == "B"));
        assert_eq!(backend.plays().len(), 1);
        assert_eq!(session.now_playing().unwrap().title, "A");
    }

    #[test]
    fn play_while_paused_resumes_without_resolving() {
        let (session, _) = session();
        session.play_or_enqueue("A", "alice").unwrap();
        session.pause().unwrap();

        let outcome = session.play_or_enqueue("missing", "bob").unwrap();
        assert_eq!(outcome, PlayOutcome::Resumed);
        assert_eq!(session.state(), PlaybackState::Playing);
        assert_eq!(session.len(), 1);
    }

    #[test]
    fn natural_end_advances_then_goes_idle() {
        let (session, backend) = session();
        session.play_or_enqueue("A", "alice").unwrap();
        session.enqueue("B", "alice").unwrap();

        backend.complete_oldest(CompletionReason::NaturalEnd);
        assert_eq!(session.now_playing().unwrap().title, "B");

        backend.complete_oldest(CompletionReason::NaturalEnd);
        let snapshot = session.snapshot();
        assert_eq!(snapshot.state, PlaybackState::Idle);
        assert_eq!(snapshot.tracks.len(), 2);
        assert_eq!(backend.plays(), vec!["stream://A", "stream://B"]);
    }

    #[test]
    fn stale_completion_is_ignored() {
        let (session, backend) = session();
        session.play_or_enqueue("A", "alice").unwrap();
        session.enqueue("B", "alice").unwrap();

        session.jump(2).unwrap();
        let before = session.snapshot();

        // Completion for the superseded play(A)
        backend.complete_oldest(CompletionReason::Stopped);
        assert_eq!(session.snapshot(), before);
        assert_eq!(session.now_playing().unwrap().title, "B");
    }

    #[test]
    fn stopped_completion_for_current_play_goes_idle() {
        let (session, backend) = session();
        session.play_or_enqueue("A", "alice").unwrap();

        backend.complete_latest(CompletionReason::Stopped);
        assert_eq!(session.state(), PlaybackState::Idle);
        assert_eq!(session.len(), 1);
    }

    #[test]
    fn loop_track_replays_same_cursor() {
        let (session, backend) = session();
        session.play_or_enqueue("A", "alice").unwrap();
        session.enqueue("B", "alice").unwrap();
        assert!(session.toggle_loop_track());

        for _ in 0..3 {
            backend.complete_latest(CompletionReason::NaturalEnd);
            assert_eq!(session.snapshot().cursor, 0);
        }
        assert_eq!(backend.plays(), vec!["stream://A"; 4]);
    }

    #[test]
    fn skip_last_without_loop_goes_idle() {
        let (session, backend) = session();
        session.play_or_enqueue("A", "alice").unwrap();

        assert_eq!(session.skip().unwrap(), None);
        assert_eq!(session.state(), PlaybackState::Idle);
        assert_eq!(backend.stops(), 1);

        // Completion from the stop is stale
        backend.complete_latest(CompletionReason::Stopped);
        assert_eq!(session.state(), PlaybackState::Idle);
    }

    #[test]
    fn skip_when_idle_is_rejected() {
        let (session, _) = session();
        assert_eq!(session.skip().unwrap_err(), SessionError::EmptyQueue);

        session.enqueue("A", "alice").unwrap();
        assert_eq!(
            session.skip().unwrap_err(),
            SessionError::NotInSession {
                state: PlaybackState::Idle
            }
        );
    }

    #[test]
    fn pause_and_resume_require_matching_state() {
        let (session, backend) = session();
        assert!(session.pause().is_err());
        assert!(session.resume().is_err());

        session.play_or_enqueue("A", "alice").unwrap();
        session.pause().unwrap();
        assert!(backend.is_paused());
        assert!(session.pause().is_err());

        session.resume().unwrap();
        assert!(!backend.is_paused());
        assert_eq!(session.state(), PlaybackState::Playing);
    }

    #[test]
    fn backend_failure_leaves_session_idle() {
        let (session, backend) = session();
        let (tx, mut rx) = event_channel();
        let session = PlaybackSession::new(
            session.guild(),
            Arc::new(EchoResolver),
            backend.clone(),
            &SessionConfig::default(),
            Some(tx),
        );
        *backend.fail_next.lock().unwrap() = true;

        let err = session.play_or_enqueue("A", "alice").unwrap_err();
        assert!(matches!(err, SessionError::Backend(_)));
        assert_eq!(session.state(), PlaybackState::Idle);
        assert_eq!(backend.pending(), 0);
        assert!(matches!(
            rx.try_recv().unwrap(),
            SessionEvent::PlaybackFailed { .. }
        ));
    }

    #[test]
    fn completion_after_drop_is_silent() {
        let (session, backend) = session();
        session.play_or_enqueue("A", "alice").unwrap();
        drop(session);

        backend.complete_latest(CompletionReason::NaturalEnd);
        assert_eq!(backend.plays().len(), 1);
    }
}
