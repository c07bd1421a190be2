//! Catalog-backed track resolution
//!
//! Stands in for the remote search gateway: a TOML file of known tracks,
//! searched by title. A case-insensitive substring hit wins; otherwise the
//! closest title by normalized Levenshtein similarity is taken if it clears
//! the configured threshold.

use crate::error::{ConsoleError, Result};
use melody_core::{ResolveError, Resolver, Track};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;
use strsim::normalized_levenshtein;
use tracing::debug;

/// One `[[tracks]]` entry
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct CatalogEntry {
    pub title: String,

    /// Canonical (watch page) URL
    pub url: String,

    /// Stream locator handed to the backend; defaults to `url`
    #[serde(default)]
    pub source: Option<String>,

    /// Length in whole seconds
    #[serde(default)]
    pub duration: u64,
}

impl CatalogEntry {
    pub fn source(&self) -> &str {
        self.source.as_deref().unwrap_or(&self.url)
    }

    fn to_track(&self, requester: &str) -> Track {
        Track::new(self.source(), &self.title, &self.url, self.duration).with_requester(requester)
    }
}

#[derive(Debug, Default, Deserialize)]
struct CatalogFile {
    #[serde(default)]
    tracks: Vec<CatalogEntry>,
}

/// [`Resolver`] over a fixed list of tracks
#[derive(Debug, Clone)]
pub struct CatalogResolver {
    entries: Vec<CatalogEntry>,
    threshold: f64,
}

impl CatalogResolver {
    pub fn new(entries: Vec<CatalogEntry>, threshold: f64) -> Self {
        Self { entries, threshold }
    }

    /// Parse a catalog from TOML text
    pub fn from_toml_str(text: &str, threshold: f64) -> Result<Self> {
        let file: CatalogFile =
            toml::from_str(text).map_err(|e| ConsoleError::Catalog(e.to_string()))?;
        Ok(Self::new(file.tracks, threshold))
    }

    /// Read and parse a catalog file
    pub fn load(path: &Path, threshold: f64) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            ConsoleError::Catalog(format!("Failed to read {}: {}", path.display(), e))
        })?;
        let catalog = Self::from_toml_str(&text, threshold)?;
        debug!(path = %path.display(), tracks = catalog.entries.len(), "Catalog loaded");
        Ok(catalog)
    }

    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }

    /// Stream locator to track length, for the simulated backend
    pub fn lengths(&self) -> HashMap<String, Duration> {
        self.entries
            .iter()
            .map(|e| (e.source().to_string(), Duration::from_secs(e.duration)))
            .collect()
    }

    /// Best entry for `query`, if any
    pub fn find(&self, query: &str) -> Option<&CatalogEntry> {
        let needle = normalize(query);
        if needle.is_empty() {
            return None;
        }

        if let Some(entry) = self
            .entries
            .iter()
            .find(|e| normalize(&e.title).contains(&needle))
        {
            return Some(entry);
        }

        let mut best: Option<(&CatalogEntry, f64)> = None;
        for entry in &self.entries {
            let similarity = normalized_levenshtein(&needle, &normalize(&entry.title));
            if similarity < self.threshold {
                continue;
            }
            match best {
                Some((_, best_similarity)) if similarity <= best_similarity => {}
                _ => best = Some((entry, similarity)),
            }
        }

        best.map(|(entry, similarity)| {
            debug!(query, title = %entry.title, similarity, "Fuzzy catalog match");
            entry
        })
    }
}

impl Resolver for CatalogResolver {
    fn resolve(&self, query: &str, requester: &str) -> melody_core::Result<Track> {
        self.find(query)
            .map(|entry| entry.to_track(requester))
            .ok_or_else(|| ResolveError::not_found(query))
    }
}

fn normalize(s: &str) -> String {
    s.trim().to_lowercase()
}
