//! Shared collaborators for playback integration tests

#![allow(dead_code)]

use melody_core::{GuildId, ResolveError, Resolver, Track};
use melody_playback::{
    BackendError, CompletionHandler, CompletionReason, PlaybackBackend, PlaybackSession,
    SessionConfig, SessionRegistry,
};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// Resolver over a fixed title -> duration table
pub struct TableResolver {
    durations: HashMap<String, u64>,
}

impl TableResolver {
    pub fn new(entries: &[(&str, u64)]) -> Self {
        Self {
            durations: entries
                .iter()
                .map(|(title, secs)| ((*title).to_string(), *secs))
                .collect(),
        }
    }

    /// A, B, C, D with minute-ish durations
    pub fn standard() -> Self {
        Self::new(&[("A", 180), ("B", 120), ("C", 95), ("D", 240)])
    }
}

impl Resolver for TableResolver {
    fn resolve(&self, query: &str, requester: &str) -> melody_core::Result<Track> {
        let secs = self
            .durations
            .get(query)
            .ok_or_else(|| ResolveError::not_found(query))?;
        Ok(Track::new(
            format!("stream://{query}"),
            query,
            format!("https://example.com/watch?v={query}"),
            *secs,
        )
        .with_requester(requester))
    }
}

/// Backend that records every call and parks completion handlers
///
/// Tests fire completions explicitly, in any order, to model late callbacks.
#[derive(Default)]
pub struct MockBackend {
    plays: Mutex<Vec<String>>,
    pending: Mutex<Vec<(String, CompletionHandler)>>,
    stops: Mutex<usize>,
    paused: Mutex<bool>,
}

impl MockBackend {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Sources passed to `play`, in call order
    pub fn plays(&self) -> Vec<String> {
        self.plays.lock().unwrap().clone()
    }

    pub fn stop_count(&self) -> usize {
        *self.stops.lock().unwrap()
    }

    pub fn pending_count(&self) -> usize {
        self.pending.lock().unwrap().len()
    }

    /// Fire the completion of the most recent `play`
    pub fn finish_latest(&self, reason: CompletionReason) {
        let (_, handler) = self.pending.lock().unwrap().pop().expect("no pending play");
        handler(reason);
    }

    /// Fire the completion of the oldest outstanding `play`
    pub fn finish_oldest(&self, reason: CompletionReason) {
        let (_, handler) = self.pending.lock().unwrap().remove(0);
        handler(reason);
    }

    /// Fire every outstanding completion, oldest first
    pub fn finish_all(&self, reason: CompletionReason) {
        let drained: Vec<_> = self.pending.lock().unwrap().drain(..).collect();
        for (_, handler) in drained {
            handler(reason);
        }
    }
}

impl PlaybackBackend for MockBackend {
    fn play(&self, source: &str, on_complete: CompletionHandler) -> Result<(), BackendError> {
        self.plays.lock().unwrap().push(source.to_string());
        self.pending
            .lock()
            .unwrap()
            .push((source.to_string(), on_complete));
        *self.paused.lock().unwrap() = false;
        Ok(())
    }

    fn pause(&self) {
        *self.paused.lock().unwrap() = true;
    }

    fn resume(&self) {
        *self.paused.lock().unwrap() = false;
    }

    fn stop(&self) {
        *self.stops.lock().unwrap() += 1;
    }

    fn is_playing(&self) -> bool {
        !*self.paused.lock().unwrap() && !self.pending.lock().unwrap().is_empty()
    }

    fn is_paused(&self) -> bool {
        *self.paused.lock().unwrap()
    }
}

/// Session over the standard table with a fresh mock backend
pub fn session_with(config: &SessionConfig) -> (Arc<PlaybackSession>, Arc<MockBackend>) {
    let backend = MockBackend::new();
    let session = PlaybackSession::new(
        GuildId::new(1),
        Arc::new(TableResolver::standard()),
        backend.clone(),
        config,
        None,
    );
    (session, backend)
}

pub fn session() -> (Arc<PlaybackSession>, Arc<MockBackend>) {
    session_with(&SessionConfig::default())
}

/// Registry whose factory hands out mock backends, remembered per guild
pub fn registry() -> (SessionRegistry, Arc<Mutex<HashMap<GuildId, Arc<MockBackend>>>>) {
    let backends: Arc<Mutex<HashMap<GuildId, Arc<MockBackend>>>> = Arc::default();
    let created = Arc::clone(&backends);
    let factory = move |guild: GuildId| -> Result<Arc<dyn PlaybackBackend>, BackendError> {
        let backend = MockBackend::new();
        created.lock().unwrap().insert(guild, Arc::clone(&backend));
        Ok(backend)
    };

    let registry = SessionRegistry::new(
        Arc::new(TableResolver::standard()),
        Arc::new(factory),
        SessionConfig::default(),
    );
    (registry, backends)
}

pub fn titles(tracks: &[Track]) -> Vec<String> {
    tracks.iter().map(|t| t.title.clone()).collect()
}
