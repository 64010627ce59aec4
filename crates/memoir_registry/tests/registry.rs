// Copyright (c) The Memoir Project Authors.
// Licensed under the MIT License.

//! Integration tests for the per-type engine registry.

use std::{
    sync::atomic::{
        AtomicUsize,
        Ordering::{AcqRel, Acquire},
    },
    time::Duration,
};

use memoir::{EvictionOrder, MemoizerSettings};
use memoir_registry::{MemoizerRegistry, SettingsFactory};

#[test]
fn same_result_type_shares_one_engine() {
    static CALLS: AtomicUsize = AtomicUsize::new(0);
    fn primes() -> Vec<u32> {
        CALLS.fetch_add(1, AcqRel);
        vec![2, 3, 5]
    }

    let registry = MemoizerRegistry::new();
    let first = registry.memoize(primes);
    let second = registry.memoize(primes);

    assert_eq!(first.invoke().to_vec(), vec![2, 3, 5]);
    // Same function, same result type: the second handle hits the entry
    // cached through the first.
    assert_eq!(second.invoke().to_vec(), vec![2, 3, 5]);
    assert_eq!(CALLS.load(Acquire), 1);
}

#[test]
fn distinct_result_types_get_distinct_engines() {
    static NUMBER_CALLS: AtomicUsize = AtomicUsize::new(0);
    static WORD_CALLS: AtomicUsize = AtomicUsize::new(0);

    let registry = MemoizerRegistry::new();
    let numbers = registry.memoize_with_arg(|n: &u32| {
        NUMBER_CALLS.fetch_add(1, AcqRel);
        vec![*n]
    });
    let words = registry.memoize_with_arg(|n: &u32| {
        WORD_CALLS.fetch_add(1, AcqRel);
        vec![n.to_string()]
    });

    let _ = numbers.invoke(&1);
    let _ = words.invoke(&1);
    registry.invalidate_all::<u32>();
    let _ = numbers.invoke(&1);
    let _ = words.invoke(&1);

    // Only the u32 engine was flushed.
    assert_eq!(NUMBER_CALLS.load(Acquire), 2);
    assert_eq!(WORD_CALLS.load(Acquire), 1);
}

#[test]
fn global_registry_is_one_instance() {
    static CALLS: AtomicUsize = AtomicUsize::new(0);
    fn answer() -> Vec<i64> {
        CALLS.fetch_add(1, AcqRel);
        vec![42]
    }

    assert!(std::ptr::eq(MemoizerRegistry::global(), MemoizerRegistry::global()));

    let _ = MemoizerRegistry::global().memoize(answer).invoke();
    let _ = MemoizerRegistry::global().memoize(answer).invoke();
    assert_eq!(CALLS.load(Acquire), 1);
}

#[test]
fn custom_factory_settings_reach_the_engines() {
    let settings = MemoizerSettings::new(3, Duration::from_secs(30));
    let factory = SettingsFactory::new(settings).with_eviction_order(EvictionOrder::Fifo);
    let registry = MemoizerRegistry::with_factory(factory);

    let memoizer = registry.memoizer::<u32>();
    assert_eq!(memoizer.settings(), settings);
    assert_eq!(memoizer.eviction_order(), EvictionOrder::Fifo);
    assert_eq!(registry.factory().settings(), settings);
}

#[test]
fn memoizer_returns_clones_of_one_instance() {
    static CALLS: AtomicUsize = AtomicUsize::new(0);

    let registry = MemoizerRegistry::new();
    let primes = registry.memoizer::<u32>().memoize(|| {
        CALLS.fetch_add(1, AcqRel);
        vec![2]
    });

    let _ = primes.invoke();
    // A later lookup for the same type reaches the same shared cache.
    registry.memoizer::<u32>().invalidate_all();
    let _ = primes.invoke();
    assert_eq!(CALLS.load(Acquire), 2);
}
