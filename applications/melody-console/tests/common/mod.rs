//! Shared setup for console integration tests

#![allow(dead_code)]

use melody_console::{CatalogEntry, CatalogResolver, Console, SimulatedBackendFactory};
use melody_core::GuildId;
use melody_playback::{event_channel, EventReceiver, SessionConfig, SessionRegistry};
use std::sync::Arc;

pub const GUILD: GuildId = GuildId::new(42);

pub fn entry(title: &str, duration: u64) -> CatalogEntry {
    CatalogEntry {
        title: title.to_string(),
        url: format!("https://example.com/{}", title.to_lowercase().replace(' ', "-")),
        source: None,
        duration,
    }
}

pub fn catalog() -> CatalogResolver {
    CatalogResolver::new(
        vec![
            entry("Take On Me", 225),
            entry("Africa", 295),
            entry("September", 215),
        ],
        0.6,
    )
}

/// Console over the test catalog with a simulated backend
///
/// `time_scale` controls how fast tracks end; use a large value to keep
/// tracks playing for the length of a test.
pub fn console(time_scale: f64) -> (Console, Arc<SessionRegistry>, EventReceiver) {
    let catalog = catalog();
    let backends = SimulatedBackendFactory::new(time_scale, catalog.lengths());
    let (events_tx, events_rx) = event_channel();
    let registry = Arc::new(
        SessionRegistry::new(Arc::new(catalog), Arc::new(backends), SessionConfig::default())
            .with_events(events_tx),
    );
    let console = Console::new(Arc::clone(&registry), GUILD, "tester", "?");
    (console, registry, events_rx)
}
