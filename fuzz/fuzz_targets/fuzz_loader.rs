#![no_main]

use libfuzzer_sys::fuzz_target;
use symdex::index::{ShardSource, load};

fuzz_target!(|data: &str| {
    // Arbitrary shard text must load or fail with an error, never panic
    let _ = load(&ShardSource::new("all_0", data));
});
