// Copyright (c) The Memoir Project Authors.
// Licensed under the MIT License.

//! Demonstrates miss coalescing on the future-based strategy.
//!
//! Eight tasks race for the same cold key; the first becomes the leader and
//! runs the upstream future once, and every other task is queued behind it
//! and receives the same result.

use std::{
    sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    },
    time::Duration,
};

use memoir::Memoizer;

#[tokio::main]
async fn main() {
    let memoizer = Memoizer::new();
    let upstream_calls = Arc::new(AtomicUsize::new(0));

    let fetch = {
        let upstream_calls = Arc::clone(&upstream_calls);
        Arc::new(memoizer.memoize_task(move || {
            let upstream_calls = Arc::clone(&upstream_calls);
            async move {
                let call = upstream_calls.fetch_add(1, Ordering::SeqCst) + 1;
                println!("  upstream call #{call} running...");
                tokio::time::sleep(Duration::from_millis(300)).await;
                Ok::<_, std::io::Error>(vec!["en-US", "fr-FR", "ja-JP"].into_iter().map(String::from).collect::<Vec<_>>())
            }
        }))
    };

    println!("starting 8 concurrent requests for the same key...\n");

    let mut handles = Vec::new();
    for task in 1..=8 {
        let fetch = Arc::clone(&fetch);
        handles.push(tokio::spawn(async move {
            let start = tokio::time::Instant::now();
            let results = fetch.invoke().await.expect("upstream failed");
            println!("  task {task}: {} results in {:?}", results.len(), start.elapsed());
        }));
    }
    for handle in handles {
        handle.await.expect("task panicked");
    }

    println!("\nupstream ran {} time(s)", upstream_calls.load(Ordering::SeqCst));
}
