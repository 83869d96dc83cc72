//! Shared, swappable handle to the current entry store
//!
//! Readers take an `Arc` snapshot and query it without holding any lock.
//! A reload builds a brand-new store first and then swaps the pointer under
//! a short write lock, so in-flight queries finish on the store they started
//! with and a failed reload leaves the current store in place.

use crate::error::{IndexError, QueryError};
use crate::group::{ResultGroup, group};
use crate::index::loader::load_all;
use crate::index::store::EntryStore;
use crate::query::{Match, QueryEngine, ScoringWeights, SearchOptions};
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};
use std::time::Instant;
use tracing::info;

pub struct SharedIndex {
    current: RwLock<Arc<EntryStore>>,
    generation: AtomicU64,
    weights: ScoringWeights,
}

impl SharedIndex {
    pub fn new(store: EntryStore) -> Self {
        Self::with_scoring_weights(store, ScoringWeights::default())
    }

    pub fn with_scoring_weights(store: EntryStore, weights: ScoringWeights) -> Self {
        Self {
            current: RwLock::new(Arc::new(store)),
            generation: AtomicU64::new(0),
            weights,
        }
    }

    /// The store visible to new queries
    pub fn snapshot(&self) -> Arc<EntryStore> {
        // A poisoned lock still holds a complete store: swaps are a single assignment
        match self.current.read() {
            Ok(guard) => Arc::clone(&guard),
            Err(poisoned) => Arc::clone(&poisoned.into_inner()),
        }
    }

    /// Number of swaps performed so far
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::Acquire)
    }

    /// Atomically replace the current store, returning the previous one
    pub fn replace(&self, store: EntryStore) -> Arc<EntryStore> {
        self.swap(Arc::new(store))
    }

    fn swap(&self, next: Arc<EntryStore>) -> Arc<EntryStore> {
        let previous = {
            let mut guard = match self.current.write() {
                Ok(guard) => guard,
                Err(poisoned) => poisoned.into_inner(),
            };
            std::mem::replace(&mut *guard, next)
        };
        self.generation.fetch_add(1, Ordering::AcqRel);
        previous
    }

    /// Load `paths` into a new store and swap it in.
    ///
    /// Nothing is swapped when any shard fails to load or validate.
    pub fn reload(&self, paths: &[PathBuf]) -> Result<Arc<EntryStore>, IndexError> {
        let start = Instant::now();
        let store = EntryStore::from_shards(load_all(paths)?)?;
        let entries = store.len();
        let next = Arc::new(store);
        self.swap(Arc::clone(&next));

        info!(
            shards = paths.len(),
            entries,
            generation = self.generation(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "reloaded index"
        );
        Ok(next)
    }

    /// Search the current snapshot
    pub fn search(&self, text: &str, options: &SearchOptions) -> Result<Vec<Match>, QueryError> {
        let store = self.snapshot();
        QueryEngine::with_scoring_weights(&store, self.weights.clone()).search(text, options)
    }

    /// Search the current snapshot and group the matches for display
    pub fn search_grouped(
        &self,
        text: &str,
        options: &SearchOptions,
    ) -> Result<Vec<ResultGroup>, QueryError> {
        Ok(group(&self.search(text, options)?))
    }
}
