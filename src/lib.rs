//! # symdex - symbol lookup over generated documentation indexes
//!
//! symdex loads the search tables a documentation generator emits for a
//! reference site (one table per shard, mapping a symbol key to a display
//! label and one or more scoped links) and answers "as you type" lookups
//! against them.
//!
//! ## Architecture
//!
//! - [`index`] - Shard loading, the immutable entry store, statistics
//! - [`query`] - Prefix/substring matching, scoring and top-k selection
//! - [`group`] - Grouping matches per key with merged, ordered targets
//! - [`shared`] - Atomically swappable store for reload without locking readers
//! - [`output`] - Terminal and JSON rendering
//! - [`utils`] - Key unescaping, case folding, user configuration
//!
//! ## Quick Start
//!
//! ```
//! use symdex::index::{load, EntryStore, ShardSource};
//! use symdex::query::{QueryEngine, SearchOptions};
//!
//! let source = ShardSource::new(
//!     "all_1",
//!     "var searchData=[['abs_28float_29',['abs(float)',['fabs.html',1,'std']]]];",
//! );
//! let store = EntryStore::from_shards([load(&source)?])?;
//!
//! let engine = QueryEngine::new(&store);
//! let matches = engine.search("abs", &SearchOptions::default())?;
//! let groups = symdex::group::group(&matches);
//!
//! assert_eq!(groups[0].label, "abs(float)");
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod error;
pub mod group;
pub mod index;
pub mod output;
pub mod query;
pub mod shared;
pub mod utils;

pub use error::{IndexError, QueryError};
pub use shared::SharedIndex;
