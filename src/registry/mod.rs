//! URL registry for tracking fetch targets and their results
//!
//! The registry is an insertion-ordered map from normalized URL to
//! [`UrlEntry`]. Insertion order is the canonical display and report order
//! and is never changed by fetch activity; entries leave the registry only
//! through [`UrlRegistry::remove_all`].
//!
//! The registry is the only state shared between the control surface and
//! the batch workers. All access goes through one internal mutex that is
//! held for single-entry updates or a snapshot copy, never across I/O.

mod normalize;
mod state;

pub use normalize::normalize_input;
pub use state::{FetchState, Outcome, UrlEntry};

use crate::RegistryError;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

#[derive(Debug, Default)]
struct RegistryInner {
    /// Entries in insertion order
    entries: Vec<UrlEntry>,

    /// URL -> position in `entries`
    index: HashMap<String, usize>,
}

/// Ordered, deduplicated collection of target URLs
#[derive(Debug, Default)]
pub struct UrlRegistry {
    inner: Mutex<RegistryInner>,
}

impl UrlRegistry {
    /// Creates an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, RegistryInner> {
        // Every mutation is a single assignment, so a poisoned guard still
        // holds consistent data
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Adds a URL after normalizing it
    ///
    /// # Returns
    ///
    /// * `Ok(String)` - The normalized URL that was appended
    /// * `Err(RegistryError::InvalidInput)` - Input was empty
    /// * `Err(RegistryError::AlreadyExists)` - The normalized URL is already
    ///   registered; the registry is left untouched
    pub fn add_url(&self, raw: &str) -> Result<String, RegistryError> {
        let url = normalize_input(raw)?;
        let mut inner = self.lock();

        if inner.index.contains_key(&url) {
            tracing::debug!("URL already registered: {}", url);
            return Err(RegistryError::AlreadyExists(url));
        }

        let position = inner.entries.len();
        inner.index.insert(url.clone(), position);
        inner.entries.push(UrlEntry::new(url.clone()));
        tracing::debug!("Registered URL #{}: {}", position + 1, url);

        Ok(url)
    }

    /// Removes every entry
    pub fn remove_all(&self) {
        let mut inner = self.lock();
        inner.entries.clear();
        inner.index.clear();
    }

    /// Resets every entry to `Unfetched` and drops payloads, keeping URLs
    pub fn reset_payloads(&self) {
        let mut inner = self.lock();
        for entry in inner.entries.iter_mut() {
            entry.reset();
        }
    }

    /// Returns a copy of all entries in insertion order
    pub fn snapshot(&self) -> Vec<UrlEntry> {
        self.lock().entries.clone()
    }

    /// Records a worker outcome for `url`
    ///
    /// Returns `false` (and logs) when the URL is not registered, which
    /// happens when the registry was cleared while a batch was running.
    pub fn set_outcome(&self, url: &str, outcome: Outcome) -> bool {
        let mut inner = self.lock();
        let Some(&position) = inner.index.get(url) else {
            tracing::warn!("Dropping outcome for unregistered URL: {}", url);
            return false;
        };

        tracing::trace!("Recording {} outcome for {}", outcome.state(), url);
        inner.entries[position].apply(outcome);
        true
    }

    /// Returns the entry for `url`, if registered
    pub fn get(&self, url: &str) -> Option<UrlEntry> {
        let inner = self.lock();
        inner
            .index
            .get(url)
            .map(|&position| inner.entries[position].clone())
    }

    pub fn contains(&self, url: &str) -> bool {
        self.lock().index.contains_key(url)
    }

    /// All registered URLs in insertion order
    pub fn urls(&self) -> Vec<String> {
        self.lock()
            .entries
            .iter()
            .map(|entry| entry.url.clone())
            .collect()
    }

    /// Maps display positions to URLs, ignoring positions out of range
    ///
    /// The result keeps the order of `positions`.
    pub fn select(&self, positions: &[usize]) -> Vec<String> {
        let inner = self.lock();
        positions
            .iter()
            .filter_map(|&position| inner.entries.get(position))
            .map(|entry| entry.url.clone())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().entries.is_empty()
    }

    /// Returns true when at least one entry carries a payload
    pub fn has_payloads(&self) -> bool {
        self.lock().entries.iter().any(|entry| entry.payload.is_some())
    }
}
