#![no_main]

use libfuzzer_sys::fuzz_target;
use std::sync::OnceLock;
use symdex::index::{EntryStore, ShardSource, load};
use symdex::query::{QueryEngine, SearchOptions};

const SHARD: &str = "var searchData=[
  ['abs_28float_29',['abs(float)',['fabs.html',1,'std']]],
  ['atomic_5fint',['atomic_int',['atomic.html',1,'std::atomic_int']]],
  ['operator_3c_3c',['operator<<',['ostream.html',1,'std::basic_ostream::operator<<()']]]
];";

fn store() -> &'static EntryStore {
    static STORE: OnceLock<EntryStore> = OnceLock::new();
    STORE.get_or_init(|| {
        let shard = load(&ShardSource::new("all_0", SHARD)).expect("fixture shard loads");
        EntryStore::from_shards([shard]).expect("fixture store builds")
    })
}

fuzz_target!(|data: &str| {
    // Query text, including malformed escapes and multi-byte characters,
    // must never panic in either match mode
    let engine = QueryEngine::new(store());
    let _ = engine.search(data, &SearchOptions::prefix());
    let _ = engine.search(data, &SearchOptions::substring().with_case_sensitive(true));
});
