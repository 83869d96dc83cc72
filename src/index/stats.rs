use crate::index::store::EntryStore;
use crate::index::types::TargetKind;
use serde::Serialize;
use std::collections::BTreeMap;
use std::io::{self, Write};

/// Per-shard counts
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ShardStats {
    pub shard_id: String,
    pub domain: String,
    pub entries: usize,
    pub targets: usize,
}

/// Summary of a loaded store
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IndexStats {
    pub shards: Vec<ShardStats>,
    pub entries: usize,
    pub targets: usize,
    /// Entry count per domain
    pub domains: BTreeMap<String, usize>,
    /// Target count per inferred kind
    pub kinds: BTreeMap<TargetKind, usize>,
    /// Entries with more than one target
    pub multi_target_entries: usize,
}

impl IndexStats {
    pub fn collect(store: &EntryStore) -> Self {
        let shards: Vec<ShardStats> = store
            .shards()
            .iter()
            .map(|s| ShardStats {
                shard_id: s.shard_id().to_string(),
                domain: s.domain().to_string(),
                entries: s.len(),
                targets: s.target_count(),
            })
            .collect();

        let mut domains = BTreeMap::new();
        for s in &shards {
            *domains.entry(s.domain.clone()).or_insert(0) += s.entries;
        }

        let mut kinds = BTreeMap::new();
        let mut multi_target_entries = 0;
        for stored in store.all_entries() {
            if stored.entry.targets.len() > 1 {
                multi_target_entries += 1;
            }
            for target in &stored.entry.targets {
                *kinds.entry(target.kind()).or_insert(0) += 1;
            }
        }

        Self {
            entries: shards.iter().map(|s| s.entries).sum(),
            targets: shards.iter().map(|s| s.targets).sum(),
            shards,
            domains,
            kinds,
            multi_target_entries,
        }
    }

    /// Display index statistics
    pub fn print<W: Write>(&self, out: &mut W) -> io::Result<()> {
        writeln!(out, "Index Statistics")?;
        writeln!(out, "================")?;
        writeln!(out)?;
        writeln!(out, "Shards:           {}", self.shards.len())?;
        writeln!(out, "Entries:          {}", self.entries)?;
        writeln!(out, "Targets:          {}", self.targets)?;
        writeln!(out, "Multi-target:     {}", self.multi_target_entries)?;

        writeln!(out)?;
        writeln!(out, "Shards:")?;
        for s in &self.shards {
            writeln!(
                out,
                "  {:20} {:12} {:>8} entries {:>8} targets",
                s.shard_id, s.domain, s.entries, s.targets
            )?;
        }

        writeln!(out)?;
        writeln!(out, "Entries by domain:")?;
        for (domain, count) in &self.domains {
            writeln!(out, "  {:15} {}", domain, count)?;
        }

        writeln!(out)?;
        writeln!(out, "Targets by kind:")?;
        for (kind, count) in &self.kinds {
            writeln!(out, "  {:15} {}", kind.as_str(), count)?;
        }

        Ok(())
    }
}
