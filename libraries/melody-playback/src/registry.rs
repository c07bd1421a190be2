//! Session registry
//!
//! Maps each guild to its playback session. Sessions are created when the
//! bot joins a guild's voice channel and torn down when it leaves; nothing
//! is shared between guilds.

use crate::{
    backend::BackendFactory,
    error::{Result, SessionError},
    events::EventSender,
    session::PlaybackSession,
    types::{PlayOutcome, SessionConfig},
};
use melody_core::{GuildId, Resolver};
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};
use tracing::info;

/// Guild-to-session map plus what is needed to build new sessions
pub struct SessionRegistry {
    sessions: RwLock<HashMap<GuildId, Arc<PlaybackSession>>>,
    resolver: Arc<dyn Resolver>,
    backends: Arc<dyn BackendFactory>,
    config: SessionConfig,
    events: Option<EventSender>,
}

impl SessionRegistry {
    /// Create an empty registry
    pub fn new(
        resolver: Arc<dyn Resolver>,
        backends: Arc<dyn BackendFactory>,
        config: SessionConfig,
    ) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            resolver,
            backends,
            config,
            events: None,
        }
    }

    /// Deliver session events to `events`
    #[must_use]
    pub fn with_events(mut self, events: EventSender) -> Self {
        self.events = Some(events);
        self
    }

    /// Look up the session for `guild`
    pub fn get(&self, guild: GuildId) -> Option<Arc<PlaybackSession>> {
        self.sessions
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&guild)
            .cloned()
    }

    /// Look up the session for `guild`, failing with `NoActiveSession`
    pub fn session(&self, guild: GuildId) -> Result<Arc<PlaybackSession>> {
        self.get(guild).ok_or(SessionError::NoActiveSession(guild))
    }

    /// Create and register an empty, idle session
    ///
    /// Fails with `AlreadyActive` if `guild` already has one.
    pub fn create_for(&self, guild: GuildId) -> Result<Arc<PlaybackSession>> {
        let mut sessions = self.sessions.write().unwrap_or_else(PoisonError::into_inner);

        if sessions.contains_key(&guild) {
            return Err(SessionError::AlreadyActive(guild));
        }

        let session = self.build(guild)?;
        sessions.insert(guild, Arc::clone(&session));
        info!(%guild, "Session created");
        Ok(session)
    }

    /// Remove and tear down the session for `guild`
    ///
    /// Idempotent; returns whether a session was removed. Completions still
    /// in flight for the removed session are ignored.
    pub fn destroy(&self, guild: GuildId) -> bool {
        let removed = self
            .sessions
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&guild);

        match removed {
            Some(session) => {
                session.shutdown();
                info!(%guild, "Session destroyed");
                true
            }
            None => false,
        }
    }

    /// Join `guild` (create its session)
    pub fn join(&self, guild: GuildId) -> Result<Arc<PlaybackSession>> {
        self.create_for(guild)
    }

    /// Leave `guild`, failing with `NoActiveSession` if not joined
    pub fn leave(&self, guild: GuildId) -> Result<()> {
        if self.destroy(guild) {
            Ok(())
        } else {
            Err(SessionError::NoActiveSession(guild))
        }
    }

    /// Play or enqueue in `guild`, joining first if needed
    pub fn play(&self, guild: GuildId, query: &str, requester: &str) -> Result<PlayOutcome> {
        let session = match self.get(guild) {
            Some(session) => session,
            None => self.get_or_create(guild)?,
        };
        session.play_or_enqueue(query, requester)
    }

    /// Number of active sessions
    pub fn len(&self) -> usize {
        self.sessions
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Check if no session is active
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Guilds with an active session, sorted
    pub fn guilds(&self) -> Vec<GuildId> {
        let mut guilds: Vec<GuildId> = self
            .sessions
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .copied()
            .collect();
        guilds.sort();
        guilds
    }

    /// Tear down every session
    pub fn shutdown(&self) {
        let drained: Vec<_> = self
            .sessions
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .drain()
            .collect();

        for (guild, session) in drained {
            session.shutdown();
            info!(%guild, "Session destroyed");
        }
    }

    fn get_or_create(&self, guild: GuildId) -> Result<Arc<PlaybackSession>> {
        let mut sessions = self.sessions.write().unwrap_or_else(PoisonError::into_inner);

        if let Some(session) = sessions.get(&guild) {
            return Ok(Arc::clone(session));
        }

        let session = self.build(guild)?;
        sessions.insert(guild, Arc::clone(&session));
        info!(%guild, "Session created on play");
        Ok(session)
    }

    fn build(&self, guild: GuildId) -> Result<Arc<PlaybackSession>> {
        let backend = self.backends.create(guild)?;
        Ok(PlaybackSession::new(
            guild,
            Arc::clone(&self.resolver),
            backend,
            &self.config,
            self.events.clone(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{testing::RecordingBackend, PlaybackBackend};
    use crate::error::BackendError;
    use crate::types::PlaybackState;
    use melody_core::Track;

    struct EchoResolver;

    impl Resolver for EchoResolver {
        fn resolve(&self, query: &str, requester: &str) -> melody_core::Result<Track> {
            Ok(Track::new(query, query, query, 60).with_requester(requester))
        }
    }

    fn registry() -> SessionRegistry {
        let factory = |_guild: GuildId| -> std::result::Result<Arc<dyn PlaybackBackend>, BackendError> {
            Ok(Arc::new(RecordingBackend::default()))
        };
        SessionRegistry::new(
            Arc::new(EchoResolver),
            Arc::new(factory),
            SessionConfig::default(),
        )
    }

    #[test]
    fn create_then_lookup() {
        let registry = registry();
        let guild = GuildId::new(1);
        assert!(registry.get(guild).is_none());

        let session = registry.create_for(guild).unwrap();
        assert_eq!(session.state(), PlaybackState::Idle);
        assert!(session.is_empty());
        assert!(Arc::ptr_eq(&session, &registry.get(guild).unwrap()));
    }

    #[test]
    fn second_create_is_already_active() {
        let registry = registry();
        let guild = GuildId::new(1);
        registry.create_for(guild).unwrap();
        assert_eq!(
            registry.create_for(guild).unwrap_err(),
            SessionError::AlreadyActive(guild)
        );
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn destroy_is_idempotent() {
        let registry = registry();
        let guild = GuildId::new(1);
        registry.create_for(guild).unwrap();

        assert!(registry.destroy(guild));
        assert!(!registry.destroy(guild));
        assert!(registry.is_empty());
    }

    #[test]
    fn leave_without_session_fails() {
        let registry = registry();
        assert_eq!(
            registry.leave(GuildId::new(5)).unwrap_err(),
            SessionError::NoActiveSession(GuildId::new(5))
        );
    }

    #[test]
    fn play_joins_implicitly() {
        let registry = registry();
        let guild = GuildId::new(3);

        let outcome = registry.play(guild, "song", "alice").unwrap();
        assert!(matches!(outcome, PlayOutcome::NowPlaying(_)));
        assert_eq!(registry.guilds(), vec![guild]);
    }

    #[test]
    fn factory_failure_registers_nothing() {
        let factory = |_guild: GuildId| -> std::result::Result<Arc<dyn PlaybackBackend>, BackendError> {
            Err(BackendError::Disconnected)
        };
        let registry = SessionRegistry::new(
            Arc::new(EchoResolver),
            Arc::new(factory),
            SessionConfig::default(),
        );

        assert!(matches!(
            registry.join(GuildId::new(1)),
            Err(SessionError::Backend(BackendError::Disconnected))
        ));
        assert!(registry.is_empty());
    }
}
