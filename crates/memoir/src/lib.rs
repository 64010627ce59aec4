// Copyright (c) The Memoir Project Authors.
// Licensed under the MIT License.

//! In-process memoization with eviction and concurrent-miss coalescing.
//!
//! This crate wraps an existing computation so that repeat invocations with
//! the same argument return a cached result instead of running the
//! computation again. Cached results age out after a configurable maximum
//! age, and a configurable item budget is enforced by evicting entries in
//! least-recently-used, least-used, or oldest-first order.
//!
//! Three invocation strategies are supported:
//!
//! - **Synchronous** ([`Memoizer::memoize`]): the wrapped function runs on
//!   the calling thread. Concurrent misses for the same key each invoke the
//!   function independently; the last writer wins.
//! - **Callback-asynchronous** ([`Memoizer::memoize_async`]): the wrapped
//!   action receives a [`Completion`] handle and delivers its result through
//!   it. Concurrent misses for the same key are coalesced: the underlying
//!   action runs at most once, and every caller's callback receives the
//!   shared result in first-come, first-served order.
//! - **Future-asynchronous** ([`Memoizer::memoize_task`]): the wrapped
//!   function returns a future. Misses coalesce exactly as in the callback
//!   strategy, and a failure of the single in-flight future is delivered to
//!   every coalesced waiter.
//!
//! # Synchronous memoization
//!
//! ```
//! use memoir::Memoizer;
//!
//! let memoizer: Memoizer<u64> = Memoizer::new();
//! let doubled = memoizer.memoize_with_arg(|n: &u64| vec![n * 2]);
//!
//! assert_eq!(doubled.invoke(&21).to_vec(), vec![42]);
//! // Second call is served from the cache.
//! assert_eq!(doubled.invoke(&21).to_vec(), vec![42]);
//! doubled.invalidate(&21);
//! ```
//!
//! # Future-based memoization
//!
//! ```
//! use memoir::Memoizer;
//! # futures::executor::block_on(async {
//!
//! let memoizer: Memoizer<String> = Memoizer::new();
//! let fetch = memoizer.memoize_task(|| async {
//!     Ok::<_, std::io::Error>(vec!["payload".to_string()])
//! });
//!
//! let items = fetch.invoke().await?;
//! assert_eq!(items.to_vec(), vec!["payload".to_string()]);
//! # Ok::<(), memoir::Error>(())
//! # });
//! ```

mod entry;
mod error;
mod eviction;
mod key;
mod memoized;
mod memoizer;
mod settings;

pub use entry::CacheEntry;
pub use error::{Error, Result};
pub use eviction::EvictionOrder;
pub use memoized::{
    MemoizedAsyncFn, MemoizedAsyncFnWithArg, MemoizedFn, MemoizedFnWithArg, MemoizedTaskFn, MemoizedTaskFnWithArg,
};
pub use memoizer::{Completion, Memoizer};
pub use settings::{DEFAULT_MAX_AGE, DEFAULT_MAX_ITEMS, MemoizerSettings};
