use crate::error::IndexError;
use crate::utils::{fold_case, unescape_key};
use regex::Regex;
use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::{Arc, OnceLock};

/// Identifier of a loaded shard (the file stem of its source, e.g. `all_1`)
pub type ShardId = Arc<str>;

/// Scope label the generator uses for entries outside any namespace
pub const GLOBAL_SCOPE_LABEL: &str = "(Global Namespace)";

/// Kind of a target, inferred from the shape of its scope label
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetKind {
    /// No enclosing scope
    Global,
    /// A bare namespace such as `std`
    Namespace,
    /// A function or member function, e.g. `std::vector::at()`
    Callable,
    /// Any other qualified path, e.g. `std::atomic_ushort`
    Qualified,
}

impl TargetKind {
    pub fn from_scope(scope: &str) -> Self {
        let scope = scope.trim();
        if scope.is_empty() || scope == GLOBAL_SCOPE_LABEL {
            TargetKind::Global
        } else if scope.ends_with(')') {
            TargetKind::Callable
        } else if scope.contains("::") {
            TargetKind::Qualified
        } else {
            TargetKind::Namespace
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TargetKind::Global => "global",
            TargetKind::Namespace => "namespace",
            TargetKind::Callable => "callable",
            TargetKind::Qualified => "qualified",
        }
    }
}

impl fmt::Display for TargetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One destination of an entry
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Target {
    /// Opaque destination locator
    pub url: String,
    /// Owning scope used for disambiguation, may be empty
    pub scope: String,
    /// The generator's link flag (`1` for links resolved through a tag file)
    pub external: bool,
}

impl Target {
    pub fn new(url: impl Into<String>, scope: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            scope: scope.into(),
            external: true,
        }
    }

    #[inline]
    pub fn kind(&self) -> TargetKind {
        TargetKind::from_scope(&self.scope)
    }
}

/// One generated record: a lookup key, its display label and its targets
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawEntry {
    pub key: String,
    pub label: String,
    pub targets: Vec<Target>,
    /// Key with generator escapes decoded, used for matching
    search_name: String,
    /// Case-folded `search_name`, used for ordering and case-insensitive matching
    folded_name: String,
    /// Case-folded raw `key`, for queries typed with generator escapes
    folded_key: String,
}

impl RawEntry {
    pub fn new(key: impl Into<String>, label: impl Into<String>, targets: Vec<Target>) -> Self {
        let key = key.into();
        let search_name = unescape_key(&key);
        let folded_name = fold_case(&search_name);
        let folded_key = fold_case(&key);
        Self {
            key,
            label: label.into(),
            targets,
            search_name,
            folded_name,
            folded_key,
        }
    }

    /// The decoded key text matched against queries
    #[inline]
    pub fn search_name(&self) -> &str {
        &self.search_name
    }

    #[inline]
    pub fn folded_name(&self) -> &str {
        &self.folded_name
    }

    #[inline]
    pub fn folded_key(&self) -> &str {
        &self.folded_key
    }
}

/// A named, immutable partition of the search index
#[derive(Debug, Clone)]
pub struct IndexShard {
    shard_id: ShardId,
    domain: Arc<str>,
    entries: Vec<Arc<RawEntry>>,
}

impl IndexShard {
    /// Build a shard, validating entry invariants.
    ///
    /// Fails with `MalformedIndex` for an empty key, an empty label or an
    /// entry without targets, and with `DuplicateKey` when two entries share
    /// a key.
    pub fn new(shard_id: &str, entries: Vec<RawEntry>) -> Result<Self, IndexError> {
        let mut seen: FxHashSet<&str> =
            FxHashSet::with_capacity_and_hasher(entries.len(), Default::default());

        for (record, entry) in entries.iter().enumerate() {
            if entry.key.is_empty() {
                return Err(IndexError::malformed(shard_id, record, "empty key"));
            }
            if entry.label.is_empty() {
                return Err(IndexError::malformed(shard_id, record, "empty label"));
            }
            if entry.targets.is_empty() {
                return Err(IndexError::malformed(
                    shard_id,
                    record,
                    format!("entry `{}` has no targets", entry.key),
                ));
            }
            if !seen.insert(entry.key.as_str()) {
                return Err(IndexError::DuplicateKey {
                    shard: shard_id.to_string(),
                    key: entry.key.clone(),
                });
            }
        }

        Ok(Self {
            shard_id: Arc::from(shard_id),
            domain: Arc::from(domain_of(shard_id)),
            entries: entries.into_iter().map(Arc::new).collect(),
        })
    }

    #[inline]
    pub fn shard_id(&self) -> &ShardId {
        &self.shard_id
    }

    /// Logical domain of the shard, e.g. `all` for `all_1`
    #[inline]
    pub fn domain(&self) -> &str {
        &self.domain
    }

    /// Shared handle to the domain name, cloned into matches
    #[inline]
    pub fn domain_id(&self) -> &Arc<str> {
        &self.domain
    }

    #[inline]
    pub fn entries(&self) -> &[Arc<RawEntry>] {
        &self.entries
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Total number of targets across all entries
    pub fn target_count(&self) -> usize {
        self.entries.iter().map(|e| e.targets.len()).sum()
    }
}

/// Derive the domain of a shard id by stripping a trailing `_<hex>` partition
/// suffix: `all_1` and `all_a` belong to `all`, `classes_0` to `classes`.
pub fn domain_of(shard_id: &str) -> &str {
    static PARTITION: OnceLock<Regex> = OnceLock::new();
    let re = PARTITION.get_or_init(|| {
        Regex::new(r"^(?P<domain>.+?)_[0-9a-fA-F]+$").expect("partition pattern is valid")
    });

    re.captures(shard_id)
        .and_then(|c| c.name("domain"))
        .map(|m| m.as_str())
        .unwrap_or(shard_id)
}
