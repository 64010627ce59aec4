// Copyright (c) The Memoir Project Authors.
// Licensed under the MIT License.

//! Integration tests for the synchronous memoization path.

use std::{
    sync::{
        Arc,
        atomic::{
            AtomicUsize,
            Ordering::{AcqRel, Acquire},
        },
    },
    thread,
    time::Duration,
};

use memoir::{DEFAULT_MAX_AGE, DEFAULT_MAX_ITEMS, Memoizer, MemoizerSettings};

fn counting(counter: &Arc<AtomicUsize>, results: Vec<u32>) -> impl Fn() -> Vec<u32> + 'static {
    let counter = Arc::clone(counter);
    move || {
        counter.fetch_add(1, AcqRel);
        results.clone()
    }
}

#[test]
fn cached_result_skips_reinvocation() {
    let counter = Arc::new(AtomicUsize::new(0));
    let memoizer = Memoizer::new();
    let primes = memoizer.memoize(counting(&counter, vec![2, 3, 5, 7]));

    let first = primes.invoke();
    let second = primes.invoke();

    assert_eq!(first.to_vec(), vec![2, 3, 5, 7]);
    assert_eq!(second.to_vec(), vec![2, 3, 5, 7]);
    assert_eq!(counter.load(Acquire), 1);
}

#[test]
fn clones_share_one_cache() {
    let counter = Arc::new(AtomicUsize::new(0));
    let memoizer = Memoizer::new();
    let primes = memoizer.memoize(counting(&counter, vec![2, 3]));

    let _ = primes.invoke();
    memoizer.clone().invalidate_all();
    let _ = primes.invoke();

    assert_eq!(counter.load(Acquire), 2);
}

#[test]
fn distinct_args_get_distinct_slots() {
    let counter = Arc::new(AtomicUsize::new(0));
    let memoizer = Memoizer::new();
    let squares = {
        let counter = Arc::clone(&counter);
        memoizer.memoize_with_arg(move |n: &u32| {
            counter.fetch_add(1, AcqRel);
            vec![n * n]
        })
    };

    assert_eq!(squares.invoke(&2).to_vec(), vec![4]);
    assert_eq!(squares.invoke(&3).to_vec(), vec![9]);
    assert_eq!(squares.invoke(&2).to_vec(), vec![4]);
    assert_eq!(counter.load(Acquire), 2);
}

#[test]
fn sibling_closures_do_not_collide() {
    let memoizer = Memoizer::new();
    let evens = memoizer.memoize(|| vec![2u32, 4]);
    let odds = memoizer.memoize(|| vec![1u32, 3]);

    assert_eq!(evens.invoke().to_vec(), vec![2, 4]);
    assert_eq!(odds.invoke().to_vec(), vec![1, 3]);
    // Both are cached now; re-invoking must not cross slots either.
    assert_eq!(evens.invoke().to_vec(), vec![2, 4]);
    assert_eq!(odds.invoke().to_vec(), vec![1, 3]);
}

#[test]
fn empty_result_is_returned_but_not_cached() {
    let counter = Arc::new(AtomicUsize::new(0));
    let memoizer = Memoizer::<u32>::new();
    let nothing = memoizer.memoize(counting(&counter, Vec::new()));

    assert!(nothing.invoke().is_empty());
    assert!(nothing.invoke().is_empty());
    assert_eq!(counter.load(Acquire), 2);
}

#[test]
fn invalidate_forces_recompute() {
    let counter = Arc::new(AtomicUsize::new(0));
    let memoizer = Memoizer::new();
    let primes = memoizer.memoize(counting(&counter, vec![2, 3]));

    let _ = primes.invoke();
    primes.invalidate();
    let _ = primes.invoke();

    assert_eq!(counter.load(Acquire), 2);
}

#[test]
fn invalidate_without_entry_is_a_no_op() {
    let memoizer = Memoizer::<u32>::new();
    let primes = memoizer.memoize(|| vec![2]);

    primes.invalidate();
    primes.invalidate();

    assert_eq!(primes.invoke().to_vec(), vec![2]);
}

#[test]
fn invalidate_with_arg_only_drops_that_slot() {
    let counter = Arc::new(AtomicUsize::new(0));
    let memoizer = Memoizer::new();
    let squares = {
        let counter = Arc::clone(&counter);
        memoizer.memoize_with_arg(move |n: &u32| {
            counter.fetch_add(1, AcqRel);
            vec![n * n]
        })
    };

    let _ = squares.invoke(&2);
    let _ = squares.invoke(&3);
    squares.invalidate(&2);
    let _ = squares.invoke(&2);
    let _ = squares.invoke(&3);

    assert_eq!(counter.load(Acquire), 3);
}

#[test]
fn entries_expire_after_max_age() {
    let counter = Arc::new(AtomicUsize::new(0));
    let memoizer = Memoizer::with_settings(MemoizerSettings::new(100, Duration::from_millis(50)));
    let primes = memoizer.memoize(counting(&counter, vec![2, 3]));

    let _ = primes.invoke();
    thread::sleep(Duration::from_millis(80));
    let _ = primes.invoke();

    assert_eq!(counter.load(Acquire), 2);
}

#[test]
fn zero_max_age_disables_expiry() {
    let counter = Arc::new(AtomicUsize::new(0));
    let memoizer = Memoizer::with_settings(MemoizerSettings::unbounded());
    let primes = memoizer.memoize(counting(&counter, vec![2]));

    let _ = primes.invoke();
    thread::sleep(Duration::from_millis(30));
    let _ = primes.invoke();

    assert_eq!(counter.load(Acquire), 1);
}

#[test]
fn settings_default_to_the_documented_limits() {
    let memoizer = Memoizer::<u32>::new();

    assert_eq!(memoizer.settings().max_items, DEFAULT_MAX_ITEMS);
    assert_eq!(memoizer.settings().max_age, DEFAULT_MAX_AGE);
}

#[test]
fn settings_swap_applies_to_later_invocations() {
    let counter = Arc::new(AtomicUsize::new(0));
    let memoizer = Memoizer::new();
    let primes = memoizer.memoize(counting(&counter, vec![2]));

    let _ = primes.invoke();
    memoizer.set_settings(MemoizerSettings::new(100, Duration::from_millis(10)));
    thread::sleep(Duration::from_millis(30));
    let _ = primes.invoke();

    assert_eq!(counter.load(Acquire), 2);
    assert_eq!(memoizer.settings().max_items, 100);
}
