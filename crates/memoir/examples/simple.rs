// Copyright (c) The Memoir Project Authors.
// Licensed under the MIT License.

//! Demonstrates memoizing a slow synchronous lookup.
//!
//! The first call per argument pays the full latency of the wrapped
//! function; repeated calls are served from the cache until the entry is
//! invalidated or expires.

use std::{
    thread,
    time::{Duration, Instant},
};

use memoir::{Memoizer, MemoizerSettings};

fn main() {
    let memoizer = Memoizer::with_settings(MemoizerSettings::new(1_000, Duration::from_secs(60)));

    // Stands in for a catalog query or an RPC to a slow backend.
    let lookup = memoizer.memoize_with_arg(|user: &String| {
        thread::sleep(Duration::from_millis(250));
        vec![format!("{user}@example.com"), format!("{user}-avatar.png")]
    });

    for round in 1..=2 {
        for user in ["ada", "brian"] {
            let start = Instant::now();
            let results = lookup.invoke(&user.to_owned());
            println!("round {round}, user {user:>4}: {results:?} in {:?}", start.elapsed());
        }
    }

    println!("\ninvalidating \"ada\"...");
    lookup.invalidate(&"ada".to_owned());

    let start = Instant::now();
    let _ = lookup.invoke(&"ada".to_owned());
    println!("after invalidation: recomputed in {:?}", start.elapsed());
}
