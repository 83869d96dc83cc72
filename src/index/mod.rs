pub mod loader;
pub mod stats;
pub mod store;
pub mod types;

pub use crate::error::IndexError;
pub use loader::{ShardSource, load, load_all, load_file};
pub use store::{EntryStore, EntryStoreBuilder, StoredEntry};
pub use types::*;
