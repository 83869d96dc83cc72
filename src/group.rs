//! Result grouping
//!
//! Collapses ranked matches into one group per key, merging the targets the
//! same key has in different shards. Generated tables routinely map one
//! symbol name to many scoped overloads, so a group is what a lookup UI shows
//! as one row.

use crate::index::types::TargetKind;
use crate::query::Match;
use rustc_hash::{FxHashMap, FxHashSet};
use serde::Serialize;

/// One destination inside a group
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GroupTarget {
    pub url: String,
    pub scope: String,
    pub kind: TargetKind,
    pub external: bool,
    /// Shard the target was first seen in
    pub shard_id: String,
}

/// All targets sharing one key, ready for display
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResultGroup {
    pub key: String,
    pub label: String,
    /// Best score among the grouped matches
    pub score: f32,
    /// Ordered by scope, then url
    pub targets: Vec<GroupTarget>,
}

/// Group matches by exact key.
///
/// Groups keep the order of their best match in `matches`; the label comes
/// from that best match. Targets are deduplicated on `(scope, url)`.
pub fn group(matches: &[Match]) -> Vec<ResultGroup> {
    let mut groups: Vec<ResultGroup> = Vec::new();
    let mut index_by_key: FxHashMap<&str, usize> = FxHashMap::default();
    let mut seen: Vec<FxHashSet<(&str, &str)>> = Vec::new();

    for m in matches {
        let key = m.entry.key.as_str();
        let idx = match index_by_key.get(key) {
            Some(&idx) => idx,
            None => {
                index_by_key.insert(key, groups.len());
                groups.push(ResultGroup {
                    key: key.to_string(),
                    label: m.entry.label.clone(),
                    score: m.score,
                    targets: Vec::new(),
                });
                seen.push(FxHashSet::default());
                groups.len() - 1
            }
        };

        let group = &mut groups[idx];
        if m.score > group.score {
            group.score = m.score;
            group.label = m.entry.label.clone();
        }

        for target in &m.entry.targets {
            if seen[idx].insert((target.scope.as_str(), target.url.as_str())) {
                group.targets.push(GroupTarget {
                    url: target.url.clone(),
                    scope: target.scope.clone(),
                    kind: target.kind(),
                    external: target.external,
                    shard_id: m.shard_id.to_string(),
                });
            }
        }
    }

    for group in &mut groups {
        group
            .targets
            .sort_unstable_by(|a, b| a.scope.cmp(&b.scope).then_with(|| a.url.cmp(&b.url)));
    }

    groups
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::types::{RawEntry, Target};
    use crate::query::MatchKind;
    use pretty_assertions::assert_eq;
    use std::sync::Arc;

    fn matched(shard: &str, order: usize, entry: RawEntry, score: f32) -> Match {
        Match {
            shard_id: Arc::from(shard),
            domain: Arc::from(crate::index::types::domain_of(shard)),
            shard_order: order,
            position: 0,
            entry: Arc::new(entry),
            kind: MatchKind::Prefix,
            score,
        }
    }

    #[test]
    fn test_group_merges_targets_across_shards() {
        let all = RawEntry::new(
            "any",
            "any",
            vec![
                Target::new("utility/any.html", "std::any"),
                Target::new("experimental/any.html", "std::experimental::any"),
            ],
        );
        let classes = RawEntry::new(
            "any",
            "any",
            vec![
                Target::new("utility/any.html", "std::any"),
                Target::new("utility/any/any.html", "std::any::any()"),
            ],
        );

        let groups = group(&[
            matched("all_0", 0, all, 3.0),
            matched("classes_0", 1, classes, 3.0),
        ]);

        assert_eq!(groups.len(), 1);
        let scopes: Vec<_> = groups[0].targets.iter().map(|t| t.scope.as_str()).collect();
        assert_eq!(
            scopes,
            vec!["std::any", "std::any::any()", "std::experimental::any"]
        );
        // the duplicate target keeps the shard it was first seen in
        assert_eq!(groups[0].targets[0].shard_id, "all_0");
        assert_eq!(groups[0].targets[1].shard_id, "classes_0");
        assert_eq!(groups[0].targets[1].kind, TargetKind::Callable);
    }

    #[test]
    fn test_group_preserves_rank_order() {
        let groups = group(&[
            matched("all_1", 0, RawEntry::new("abs", "abs", vec![Target::new("abs.html", "std")]), 3.0),
            matched(
                "all_1",
                0,
                RawEntry::new("abs_28float_29", "abs(float)", vec![Target::new("fabs.html", "std")]),
                1.1,
            ),
        ]);

        let labels: Vec<_> = groups.iter().map(|g| g.label.as_str()).collect();
        assert_eq!(labels, vec!["abs", "abs(float)"]);
        assert_eq!(groups[1].score, 1.1);
    }

    #[test]
    fn test_targets_sorted_by_scope_then_url() {
        let entry = RawEntry::new(
            "at",
            "at",
            vec![
                Target::new("vector/at.html", "std::vector::at()"),
                Target::new("string/b.html", "std::string::at()"),
                Target::new("string/a.html", "std::string::at()"),
            ],
        );
        let groups = group(&[matched("all_1", 0, entry, 3.0)]);

        let urls: Vec<_> = groups[0].targets.iter().map(|t| t.url.as_str()).collect();
        assert_eq!(urls, vec!["string/a.html", "string/b.html", "vector/at.html"]);
    }

    #[test]
    fn test_group_is_case_preserving() {
        let groups = group(&[
            matched("all_1", 0, RawEntry::new("Abort", "Abort", vec![Target::new("A.html", "")]), 3.0),
            matched("all_2", 1, RawEntry::new("abort", "abort", vec![Target::new("a.html", "std")]), 1.5),
        ]);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].targets[0].kind, TargetKind::Global);
    }

    #[test]
    fn test_empty_input() {
        assert!(group(&[]).is_empty());
    }
}
