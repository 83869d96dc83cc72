//! Entry store
//!
//! Holds every loaded shard plus two arrays of entry references: one sorted
//! by case-folded search name, one by case-folded raw key. Prefix lookups are
//! two binary searches over either array. The store is immutable once built and is shared between query
//! threads through an `Arc`.

use crate::error::IndexError;
use crate::index::types::{IndexShard, RawEntry};
use crate::utils::fold_case;
use rayon::prelude::*;
use rustc_hash::{FxHashMap, FxHashSet};
use std::cmp::Ordering;
use std::ops::Range;
use std::sync::Arc;
use std::time::Instant;
use tracing::info;

/// An entry as seen through the store: the record plus where it came from
#[derive(Debug, Clone, Copy)]
pub struct StoredEntry<'a> {
    pub shard: &'a IndexShard,
    /// Declaration order of the shard within the store
    pub shard_order: usize,
    /// Position of the entry within its shard
    pub position: usize,
    pub entry: &'a Arc<RawEntry>,
}

#[derive(Debug, Clone, Copy)]
struct SortedRef {
    shard: u32,
    position: u32,
}

/// Read-only collection of loaded shards
#[derive(Debug, Default)]
pub struct EntryStore {
    shards: Vec<IndexShard>,
    sorted: Vec<SortedRef>,
    /// Same entries ordered by folded raw key
    sorted_keys: Vec<SortedRef>,
}

impl EntryStore {
    pub fn builder() -> EntryStoreBuilder {
        EntryStoreBuilder::default()
    }

    /// Build a store from shards in declaration order
    pub fn from_shards<I>(shards: I) -> Result<Self, IndexError>
    where
        I: IntoIterator<Item = IndexShard>,
    {
        let mut builder = Self::builder();
        for shard in shards {
            builder.add_shard(shard)?;
        }
        Ok(builder.build())
    }

    /// Shards in declaration order
    #[inline]
    pub fn shards(&self) -> &[IndexShard] {
        &self.shards
    }

    pub fn shard(&self, shard_id: &str) -> Option<&IndexShard> {
        self.shards.iter().find(|s| &**s.shard_id() == shard_id)
    }

    /// Distinct domains, in the order they were first declared
    pub fn domains(&self) -> Vec<&str> {
        let mut seen = FxHashSet::default();
        self.shards
            .iter()
            .map(|s| s.domain())
            .filter(|d| seen.insert(*d))
            .collect()
    }

    /// Total number of entries across all shards
    #[inline]
    pub fn len(&self) -> usize {
        self.sorted.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.sorted.is_empty()
    }

    /// Exact lookup of a key within one shard
    pub fn get(&self, shard_id: &str, key: &str) -> Option<&Arc<RawEntry>> {
        self.shard(shard_id)?.entries().iter().find(|e| e.key == key)
    }

    /// Every entry, in shard declaration order then source order
    pub fn all_entries(&self) -> impl Iterator<Item = StoredEntry<'_>> + '_ {
        self.shards.iter().enumerate().flat_map(|(shard_order, shard)| {
            shard
                .entries()
                .iter()
                .enumerate()
                .map(move |(position, entry)| StoredEntry {
                    shard,
                    shard_order,
                    position,
                    entry,
                })
        })
    }

    /// Entries whose search name starts with `prefix`, ignoring case.
    ///
    /// `prefix` is compared against the decoded key (`abs(float)`, not
    /// `abs_28float_29`). Results are ordered by folded search name, then
    /// key, then shard declaration order. An empty prefix yields every entry.
    pub fn by_key_prefix(&self, prefix: &str) -> impl Iterator<Item = StoredEntry<'_>> + '_ {
        let range = self.prefix_range(&fold_case(prefix));
        self.sorted_range(range)
    }

    /// Every entry in sorted order
    pub fn sorted_entries(&self) -> impl Iterator<Item = StoredEntry<'_>> + '_ {
        self.sorted_range(0..self.sorted.len())
    }

    /// Range of the sorted array whose folded names start with an already
    /// folded prefix
    pub(crate) fn prefix_range(&self, folded_prefix: &str) -> Range<usize> {
        let lo = self
            .sorted
            .partition_point(|r| self.resolve(*r).folded_name() < folded_prefix);
        let len = self.sorted[lo..]
            .partition_point(|r| self.resolve(*r).folded_name().starts_with(folded_prefix));
        lo..lo + len
    }

    /// Range of the raw-key array whose folded keys start with an already
    /// folded prefix
    pub(crate) fn key_prefix_range(&self, folded_prefix: &str) -> Range<usize> {
        let lo = self
            .sorted_keys
            .partition_point(|r| self.resolve(*r).folded_key() < folded_prefix);
        let len = self.sorted_keys[lo..]
            .partition_point(|r| self.resolve(*r).folded_key().starts_with(folded_prefix));
        lo..lo + len
    }

    pub(crate) fn sorted_key_range(
        &self,
        range: Range<usize>,
    ) -> impl Iterator<Item = StoredEntry<'_>> + '_ {
        self.sorted_keys[range].iter().map(move |r| self.stored(*r))
    }

    pub(crate) fn sorted_range(
        &self,
        range: Range<usize>,
    ) -> impl Iterator<Item = StoredEntry<'_>> + '_ {
        self.sorted[range].iter().map(move |r| self.stored(*r))
    }

    #[inline]
    fn resolve(&self, r: SortedRef) -> &RawEntry {
        &self.shards[r.shard as usize].entries()[r.position as usize]
    }

    #[inline]
    fn stored(&self, r: SortedRef) -> StoredEntry<'_> {
        let shard = &self.shards[r.shard as usize];
        StoredEntry {
            shard,
            shard_order: r.shard as usize,
            position: r.position as usize,
            entry: &shard.entries()[r.position as usize],
        }
    }

    fn compare_refs(&self, a: SortedRef, b: SortedRef) -> Ordering {
        let ea = self.resolve(a);
        let eb = self.resolve(b);
        ea.folded_name()
            .cmp(eb.folded_name())
            .then_with(|| ea.key.cmp(&eb.key))
            .then_with(|| a.shard.cmp(&b.shard))
            .then_with(|| a.position.cmp(&b.position))
    }

    fn compare_keys(&self, a: SortedRef, b: SortedRef) -> Ordering {
        let ea = self.resolve(a);
        let eb = self.resolve(b);
        ea.folded_key()
            .cmp(eb.folded_key())
            .then_with(|| ea.key.cmp(&eb.key))
            .then_with(|| a.shard.cmp(&b.shard))
            .then_with(|| a.position.cmp(&b.position))
    }
}

/// Incrementally validates shards before they are frozen into an [`EntryStore`]
#[derive(Debug, Default)]
pub struct EntryStoreBuilder {
    shards: Vec<IndexShard>,
    /// Keys seen so far per domain, used to reject cross-shard collisions
    domain_keys: FxHashMap<String, FxHashSet<String>>,
}

impl EntryStoreBuilder {
    /// Add a shard after the ones already added.
    ///
    /// Shards sharing a domain must not share keys; shards of different
    /// domains may overlap freely. On error the builder is left unchanged.
    pub fn add_shard(&mut self, shard: IndexShard) -> Result<&mut Self, IndexError> {
        if self.shards.iter().any(|s| s.shard_id() == shard.shard_id()) {
            return Err(IndexError::DuplicateShard(shard.shard_id().to_string()));
        }

        if let Some(keys) = self.domain_keys.get(shard.domain()) {
            if let Some(dup) = shard.entries().iter().find(|e| keys.contains(&e.key)) {
                return Err(IndexError::DuplicateKey {
                    shard: shard.shard_id().to_string(),
                    key: dup.key.clone(),
                });
            }
        }

        self.domain_keys
            .entry(shard.domain().to_string())
            .or_default()
            .extend(shard.entries().iter().map(|e| e.key.clone()));
        self.shards.push(shard);
        Ok(self)
    }

    pub fn build(self) -> EntryStore {
        let start = Instant::now();
        let mut store = EntryStore {
            shards: self.shards,
            sorted: Vec::new(),
            sorted_keys: Vec::new(),
        };

        let mut sorted: Vec<SortedRef> = store
            .shards
            .iter()
            .enumerate()
            .flat_map(|(shard, s)| {
                (0..s.len()).map(move |position| SortedRef {
                    shard: shard as u32,
                    position: position as u32,
                })
            })
            .collect();
        let mut sorted_keys = sorted.clone();
        sorted.par_sort_unstable_by(|a, b| store.compare_refs(*a, *b));
        sorted_keys.par_sort_unstable_by(|a, b| store.compare_keys(*a, *b));
        store.sorted = sorted;
        store.sorted_keys = sorted_keys;

        info!(
            shards = store.shards.len(),
            entries = store.sorted.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "built entry store"
        );
        store
    }
}
