use crate::error::QueryError;
use crate::index::store::{EntryStore, StoredEntry};
use crate::index::types::{RawEntry, ShardId};
use crate::query::options::{MatchMode, SearchOptions};
use crate::query::scorer::{MatchKind, Scorer, ScoringWeights};
use crate::query::topk::TopKHeap;
use crate::utils::{fold_case, unescape_key};
use std::cmp::Ordering;
use std::sync::Arc;

/// An entry matched by a query, with its relevance score
#[derive(Debug, Clone, PartialEq)]
pub struct Match {
    pub shard_id: ShardId,
    /// Domain of the originating shard, e.g. `all` or `classes`
    pub domain: Arc<str>,
    /// Declaration order of the originating shard
    pub shard_order: usize,
    /// Position of the entry within its shard
    pub position: usize,
    pub entry: Arc<RawEntry>,
    pub kind: MatchKind,
    pub score: f32,
}

/// A scored candidate still borrowing from the store
struct Ranked<'s> {
    score: f32,
    kind: MatchKind,
    stored: StoredEntry<'s>,
}

impl Ranked<'_> {
    fn into_match(self) -> Match {
        Match {
            shard_id: self.stored.shard.shard_id().clone(),
            domain: Arc::clone(self.stored.shard.domain_id()),
            shard_order: self.stored.shard_order,
            position: self.stored.position,
            entry: Arc::clone(self.stored.entry),
            kind: self.kind,
            score: self.score,
        }
    }
}

impl PartialEq for Ranked<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Ranked<'_> {}

impl PartialOrd for Ranked<'_> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Ranked<'_> {
    /// Better candidates sort first: higher score, then name, key, shard
    /// declaration order and source position.
    fn cmp(&self, other: &Self) -> Ordering {
        let a = self.stored.entry;
        let b = other.stored.entry;
        other
            .score
            .total_cmp(&self.score)
            .then_with(|| a.folded_name().cmp(b.folded_name()))
            .then_with(|| a.key.cmp(&b.key))
            .then_with(|| self.stored.shard_order.cmp(&other.stored.shard_order))
            .then_with(|| self.stored.position.cmp(&other.stored.position))
    }
}

/// Normalized query text
struct Needle {
    /// Query with generator escapes decoded, compared against search names
    text: String,
    char_len: usize,
    /// Query as typed, compared against raw keys
    raw: String,
    raw_char_len: usize,
    case_sensitive: bool,
}

impl Needle {
    fn new(query: &str, case_sensitive: bool) -> Self {
        let decoded = unescape_key(query);
        let (text, raw) = if case_sensitive {
            (decoded, query.to_string())
        } else {
            (fold_case(&decoded), fold_case(query))
        };
        Self {
            char_len: text.chars().count(),
            raw_char_len: raw.chars().count(),
            text,
            raw,
            case_sensitive,
        }
    }

    /// The name of `entry` compared against this needle
    #[inline]
    fn name_of<'e>(&self, entry: &'e RawEntry) -> &'e str {
        if self.case_sensitive {
            entry.search_name()
        } else {
            entry.folded_name()
        }
    }

    #[inline]
    fn key_of<'e>(&self, entry: &'e RawEntry) -> &'e str {
        if self.case_sensitive {
            &entry.key
        } else {
            entry.folded_key()
        }
    }
}

/// Executes searches against one immutable [`EntryStore`]
pub struct QueryEngine<'a> {
    store: &'a EntryStore,
    scorer: Scorer,
}

impl<'a> QueryEngine<'a> {
    pub fn new(store: &'a EntryStore) -> Self {
        Self {
            store,
            scorer: Scorer::with_defaults(),
        }
    }

    /// Create an engine with custom scoring weights
    pub fn with_scoring_weights(store: &'a EntryStore, weights: ScoringWeights) -> Self {
        Self {
            store,
            scorer: Scorer::new(weights),
        }
    }

    pub fn store(&self) -> &'a EntryStore {
        self.store
    }

    /// Search the store and return matches, best first.
    ///
    /// Fails with `InvalidQuery` when `text` is empty or whitespace. A
    /// `max_results` of zero returns no matches.
    pub fn search(&self, text: &str, options: &SearchOptions) -> Result<Vec<Match>, QueryError> {
        if text.trim().is_empty() {
            return Err(QueryError::InvalidQuery("query text is empty".to_string()));
        }
        if options.max_results == Some(0) {
            return Ok(Vec::new());
        }

        let needle = Needle::new(text, options.case_sensitive);
        let results = match options.match_mode {
            MatchMode::Prefix => {
                // Folded ranges are supersets of the case-sensitive ones
                let folded_text = fold_case(&needle.text);
                let by_name = self
                    .store
                    .sorted_range(self.store.prefix_range(&folded_text));
                // Entries whose name also matches are already in `by_name`
                let by_key = self
                    .store
                    .sorted_key_range(self.store.key_prefix_range(&fold_case(&needle.raw)))
                    .filter(move |s| !s.entry.folded_name().starts_with(folded_text.as_str()));
                self.rank(by_name.chain(by_key), &needle, options)
            }
            MatchMode::Substring => self.rank(self.store.sorted_entries(), &needle, options),
        };

        Ok(results)
    }

    fn rank<'s, I>(&self, candidates: I, needle: &Needle, options: &SearchOptions) -> Vec<Match>
    where
        I: Iterator<Item = StoredEntry<'s>>,
    {
        let scored = candidates
            .filter(|stored| {
                options
                    .domain
                    .as_deref()
                    .map(|d| stored.shard.domain() == d)
                    .unwrap_or(true)
            })
            .filter_map(|stored| self.classify(stored, needle, options.match_mode));

        match options.max_results {
            Some(k) => {
                let mut heap = TopKHeap::new(k);
                for ranked in scored {
                    heap.try_insert(ranked);
                }
                heap.into_sorted_vec()
                    .into_iter()
                    .map(Ranked::into_match)
                    .collect()
            }
            None => {
                let mut all: Vec<Ranked<'s>> = scored.collect();
                all.sort_unstable();
                all.into_iter().map(Ranked::into_match).collect()
            }
        }
    }

    fn classify<'s>(
        &self,
        stored: StoredEntry<'s>,
        needle: &Needle,
        mode: MatchMode,
    ) -> Option<Ranked<'s>> {
        let name = needle.name_of(stored.entry);
        let key = needle.key_of(stored.entry);
        let (kind, name_len, query_len) = if name == needle.text {
            (MatchKind::Exact, name.chars().count(), needle.char_len)
        } else if name.starts_with(&needle.text) {
            (MatchKind::Prefix, name.chars().count(), needle.char_len)
        } else if key.starts_with(&needle.raw) {
            // A partially typed escape such as `abs_2`
            (MatchKind::Prefix, key.chars().count(), needle.raw_char_len)
        } else if mode == MatchMode::Substring && name.contains(&needle.text) {
            (MatchKind::Substring, name.chars().count(), needle.char_len)
        } else {
            return None;
        };

        let score = self.scorer.score(kind, name_len, query_len);
        Some(Ranked {
            score,
            kind,
            stored,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::types::{IndexShard, Target};

    fn shard(id: &str, keys: &[&str]) -> IndexShard {
        let entries = keys
            .iter()
            .map(|k| {
                RawEntry::new(
                    *k,
                    unescape_key(k),
                    vec![Target::new(format!("https://docs.example/{}.html", k), "std")],
                )
            })
            .collect();
        IndexShard::new(id, entries).unwrap()
    }

    fn keys(matches: &[Match]) -> Vec<&str> {
        matches.iter().map(|m| m.entry.key.as_str()).collect()
    }

    fn store() -> EntryStore {
        EntryStore::from_shards([shard(
            "all_1",
            &[
                "abs",
                "abs_28float_29",
                "abs_28int_29",
                "fabs",
                "labs",
                "absolute",
                "Abort",
                "accumulate",
            ],
        )])
        .unwrap()
    }

    #[test]
    fn test_empty_query_is_invalid() {
        let store = store();
        let engine = QueryEngine::new(&store);
        for text in ["", "   ", "\t"] {
            assert_eq!(
                engine.search(text, &SearchOptions::default()),
                Err(QueryError::InvalidQuery("query text is empty".to_string()))
            );
        }
    }

    #[test]
    fn test_zero_max_results_is_empty() {
        let store = store();
        let engine = QueryEngine::new(&store);
        let matches = engine
            .search("abs", &SearchOptions::default().with_max_results(0))
            .unwrap();
        assert!(matches.is_empty());
    }

    #[test]
    fn test_prefix_ranking() {
        let store = store();
        let engine = QueryEngine::new(&store);
        let matches = engine.search("abs", &SearchOptions::prefix()).unwrap();

        // exact first, then shorter names, then key order
        assert_eq!(
            keys(&matches),
            vec!["abs", "abs_28int_29", "absolute", "abs_28float_29"]
        );
        assert_eq!(matches[0].kind, MatchKind::Exact);
        assert!(matches[1..].iter().all(|m| m.kind == MatchKind::Prefix));
        assert!(matches.windows(2).all(|w| w[0].score >= w[1].score));
    }

    #[test]
    fn test_substring_ranks_below_prefix() {
        let store = store();
        let engine = QueryEngine::new(&store);
        let matches = engine.search("abs", &SearchOptions::substring()).unwrap();

        assert_eq!(
            keys(&matches),
            vec!["abs", "abs_28int_29", "absolute", "abs_28float_29", "fabs", "labs"]
        );
        assert_eq!(matches[4].kind, MatchKind::Substring);
        assert!(matches[3].score > matches[4].score);
    }

    #[test]
    fn test_case_sensitivity() {
        let store = store();
        let engine = QueryEngine::new(&store);

        let insensitive = engine.search("abo", &SearchOptions::prefix()).unwrap();
        assert_eq!(keys(&insensitive), vec!["Abort"]);

        let sensitive = engine
            .search("abo", &SearchOptions::prefix().with_case_sensitive(true))
            .unwrap();
        assert!(sensitive.is_empty());

        let sensitive = engine
            .search("Abo", &SearchOptions::prefix().with_case_sensitive(true))
            .unwrap();
        assert_eq!(keys(&sensitive), vec!["Abort"]);
    }

    #[test]
    fn test_escaped_query_matches_decoded_name() {
        let store = store();
        let engine = QueryEngine::new(&store);

        let matches = engine
            .search("abs_28float_29", &SearchOptions::prefix())
            .unwrap();
        assert_eq!(keys(&matches), vec!["abs_28float_29"]);
        assert_eq!(matches[0].kind, MatchKind::Exact);

        let matches = engine.search("abs(f", &SearchOptions::prefix()).unwrap();
        assert_eq!(keys(&matches), vec!["abs_28float_29"]);
    }

    #[test]
    fn test_partial_escape_matches_raw_key() {
        let store = EntryStore::from_shards([shard(
            "all_1",
            &["abs", "abs_28float_29", "atomic_5fint", "atomic"],
        )])
        .unwrap();
        let engine = QueryEngine::new(&store);

        for text in ["abs_", "abs_2", "abs_28"] {
            let matches = engine.search(text, &SearchOptions::prefix()).unwrap();
            assert_eq!(keys(&matches), vec!["abs_28float_29"], "query {}", text);
            assert_eq!(matches[0].kind, MatchKind::Prefix);
        }

        for text in ["atomic_5", "ATOMIC_5F"] {
            let matches = engine.search(text, &SearchOptions::prefix()).unwrap();
            assert_eq!(keys(&matches), vec!["atomic_5fint"], "query {}", text);
        }

        let sensitive = SearchOptions::prefix().with_case_sensitive(true);
        assert!(engine.search("ATOMIC_5", &sensitive).unwrap().is_empty());
        assert_eq!(
            keys(&engine.search("atomic_5", &sensitive).unwrap()),
            vec!["atomic_5fint"]
        );

        // an entry matching both ways is reported once
        let matches = engine.search("atomic", &SearchOptions::prefix()).unwrap();
        assert_eq!(keys(&matches), vec!["atomic", "atomic_5fint"]);
    }

    #[test]
    fn test_match_carries_domain() {
        let store = EntryStore::from_shards([
            shard("all_0", &["any"]),
            shard("classes_0", &["any"]),
        ])
        .unwrap();
        let engine = QueryEngine::new(&store);

        let matches = engine.search("any", &SearchOptions::prefix()).unwrap();
        let domains: Vec<&str> = matches.iter().map(|m| &*m.domain).collect();
        assert_eq!(domains, vec!["all", "classes"]);
    }

    #[test]
    fn test_max_results_keeps_best() {
        let store = store();
        let engine = QueryEngine::new(&store);

        let all = engine.search("a", &SearchOptions::prefix()).unwrap();
        let top = engine
            .search("a", &SearchOptions::prefix().with_max_results(3))
            .unwrap();
        assert_eq!(top.len(), 3);
        assert_eq!(top, all[..3].to_vec());
    }

    #[test]
    fn test_ties_break_by_shard_order() {
        let store = EntryStore::from_shards([
            shard("all_0", &["any"]),
            shard("classes_0", &["any"]),
        ])
        .unwrap();
        let engine = QueryEngine::new(&store);

        let matches = engine.search("any", &SearchOptions::prefix()).unwrap();
        let shards: Vec<&str> = matches.iter().map(|m| &*m.shard_id).collect();
        assert_eq!(shards, vec!["all_0", "classes_0"]);

        let classes = engine
            .search("any", &SearchOptions::prefix().with_domain("classes"))
            .unwrap();
        assert_eq!(classes.len(), 1);
        assert_eq!(&*classes[0].shard_id, "classes_0");
    }

    #[test]
    fn test_search_is_deterministic() {
        let store = store();
        let engine = QueryEngine::new(&store);
        let options = SearchOptions::substring().with_max_results(4);

        let first = engine.search("a", &options).unwrap();
        let second = engine.search("a", &options).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_custom_weights() {
        let store = store();
        let weights = ScoringWeights {
            exact_match_score: 100.0,
            ..Default::default()
        };
        let engine = QueryEngine::with_scoring_weights(&store, weights);
        let matches = engine.search("fabs", &SearchOptions::prefix()).unwrap();
        assert_eq!(matches[0].score, 100.0);
    }
}
