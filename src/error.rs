//! Error types returned by the loader, the entry store and the query engine.

use std::path::PathBuf;
use thiserror::Error;

/// Errors produced while loading shards or assembling an [`EntryStore`].
///
/// [`EntryStore`]: crate::index::EntryStore
#[derive(Debug, Error)]
pub enum IndexError {
    /// The source violates the `(key, [label, (url, flag, scope)...])` shape.
    #[error("malformed index `{shard}` at record {record}: {reason}")]
    MalformedIndex {
        shard: String,
        record: usize,
        reason: String,
    },

    /// Two records share a key, either inside one shard or across shards of
    /// the same domain.
    #[error("duplicate key `{key}` in shard `{shard}`")]
    DuplicateKey { shard: String, key: String },

    /// A shard id was added to the same store twice.
    #[error("shard `{0}` is already loaded")]
    DuplicateShard(String),

    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl IndexError {
    pub(crate) fn malformed(shard: &str, record: usize, reason: impl Into<String>) -> Self {
        IndexError::MalformedIndex {
            shard: shard.to_string(),
            record,
            reason: reason.into(),
        }
    }
}

/// Errors produced by [`QueryEngine::search`].
///
/// [`QueryEngine::search`]: crate::query::QueryEngine::search
#[derive(Debug, Error, PartialEq, Eq)]
pub enum QueryError {
    #[error("invalid query: {0}")]
    InvalidQuery(String),
}
