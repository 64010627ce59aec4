// Copyright (c) The Memoir Project Authors.
// Licensed under the MIT License.

//! The memoization engine.
//!
//! One [`Memoizer`] instance owns a cache map keyed by derived string keys,
//! plus one pending-call registry per asynchronous strategy. Everything is
//! protected by a single engine-wide lock; wrapped computations themselves
//! always run outside the lock.

use std::{
    collections::{HashMap, VecDeque},
    fmt,
    sync::Arc,
    time::Instant,
};

use ahash::RandomState;
use futures_channel::oneshot;
use parking_lot::Mutex;

use crate::{
    entry::CacheEntry,
    error::Error,
    eviction::EvictionOrder,
    key,
    memoized::{
        MemoizedAsyncFn, MemoizedAsyncFnWithArg, MemoizedFn, MemoizedFnWithArg, MemoizedTaskFn, MemoizedTaskFnWithArg,
    },
    settings::MemoizerSettings,
};

pub(crate) type CacheMap<T> = HashMap<String, CacheEntry<T>, RandomState>;

/// A queued callback-strategy caller awaiting an in-flight result.
pub(crate) type Waiter<T> = Box<dyn FnOnce(Arc<[T]>) + Send>;

type TaskOutcome<T> = Result<Arc<[T]>, Error>;
type TaskWaiter<T> = oneshot::Sender<TaskOutcome<T>>;

/// Everything behind the engine lock: the cache map and both pending-call
/// registries. A pending queue exists for a key exactly while an upstream
/// computation for that key is outstanding.
struct State<T> {
    cache: CacheMap<T>,
    settings: MemoizerSettings,
    eviction_order: EvictionOrder,
    callback_waiters: HashMap<String, VecDeque<Waiter<T>>, RandomState>,
    task_waiters: HashMap<String, VecDeque<TaskWaiter<T>>, RandomState>,
}

impl<T> State<T> {
    fn new(settings: MemoizerSettings) -> Self {
        Self {
            cache: CacheMap::default(),
            settings,
            eviction_order: EvictionOrder::default(),
            callback_waiters: HashMap::default(),
            task_waiters: HashMap::default(),
        }
    }

    /// Removes every entry older than the configured maximum age.
    fn sweep_expired(&mut self) {
        let max_age = self.settings.max_age;
        if max_age.is_zero() || self.cache.is_empty() {
            return;
        }
        let before = self.cache.len();
        let now = Instant::now();
        self.cache.retain(|_, entry| now.duration_since(entry.created()) <= max_age);
        let expired = before - self.cache.len();
        if expired > 0 {
            tracing::debug!(expired, "removed entries past their maximum age");
        }
    }

    /// Makes room for `incoming` items and inserts the new entry, replacing
    /// any previous entry for the key wholesale.
    fn admit(&mut self, key: &str, items: &Arc<[T]>) {
        self.make_room(items.len());
        self.cache.insert(key.to_owned(), CacheEntry::new(Arc::clone(items)));
    }

    /// Evicts entries, front of the active ordering first, until the item
    /// budget can absorb `incoming` additional items.
    fn make_room(&mut self, incoming: usize) {
        let max_items = self.settings.max_items;
        if max_items == 0 || self.cache.is_empty() {
            return;
        }

        let cached: usize = self.cache.values().map(CacheEntry::len).sum();
        let surplus = (cached + incoming).saturating_sub(max_items);
        if surplus == 0 {
            return;
        }

        let mut freed = 0usize;
        let mut evicted = 0usize;
        for victim in self.eviction_order.rank(&self.cache) {
            if let Some(entry) = self.cache.remove(&victim) {
                freed += entry.len();
                evicted += 1;
            }
            if freed >= surplus {
                break;
            }
        }
        tracing::debug!(evicted, freed, surplus, "evicted entries to make room");
    }
}

/// Role a caller ends up with after the locked lookup on the callback path.
enum CallbackRole<T> {
    /// The key was cached; the caller's callback is invoked immediately.
    Hit(Waiter<T>, Arc<[T]>),
    /// Another caller already has a computation in flight for this key.
    Joined,
    /// First caller for this key; the wrapped action must be invoked.
    Leading,
}

/// Role a caller ends up with after the locked lookup on the future path.
enum TaskRole<T> {
    Hit(Arc<[T]>),
    Joined(oneshot::Receiver<TaskOutcome<T>>),
    Leading(oneshot::Receiver<TaskOutcome<T>>, Flight<T>),
}

/// The memoization engine for result element type `T`.
///
/// A `Memoizer` is a cheap handle around shared state; clones refer to the
/// same cache. Wrap computations with [`memoize`](Self::memoize) and
/// friends, then call the returned handle's `invoke`.
///
/// # Examples
///
/// ```
/// use memoir::{Memoizer, MemoizerSettings};
/// use std::time::Duration;
///
/// let memoizer: Memoizer<u32> =
///     Memoizer::with_settings(MemoizerSettings::new(100, Duration::from_secs(60)));
/// let primes = memoizer.memoize(|| vec![2, 3, 5, 7]);
///
/// assert_eq!(primes.invoke().to_vec(), vec![2, 3, 5, 7]);
/// ```
pub struct Memoizer<T> {
    state: Arc<Mutex<State<T>>>,
}

impl<T> Clone for Memoizer<T> {
    fn clone(&self) -> Self {
        Self {
            state: Arc::clone(&self.state),
        }
    }
}

impl<T> Default for Memoizer<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for Memoizer<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Memoizer").finish_non_exhaustive()
    }
}

impl<T> Memoizer<T> {
    /// Creates an engine with [`MemoizerSettings::default`].
    #[must_use]
    pub fn new() -> Self {
        Self::with_settings(MemoizerSettings::default())
    }

    /// Creates an engine with the given settings.
    #[must_use]
    pub fn with_settings(settings: MemoizerSettings) -> Self {
        Self {
            state: Arc::new(Mutex::new(State::new(settings))),
        }
    }

    /// Returns the current settings.
    #[must_use]
    pub fn settings(&self) -> MemoizerSettings {
        self.state.lock().settings
    }

    /// Replaces the settings as a whole.
    ///
    /// Takes effect on the next invocation; already-cached entries are
    /// re-evaluated against the new limits at that point.
    pub fn set_settings(&self, settings: MemoizerSettings) {
        self.state.lock().settings = settings;
    }

    /// Returns the active eviction ordering.
    #[must_use]
    pub fn eviction_order(&self) -> EvictionOrder {
        self.state.lock().eviction_order
    }

    /// Replaces the active eviction ordering.
    pub fn set_eviction_order(&self, order: EvictionOrder) {
        self.state.lock().eviction_order = order;
    }

    /// Removes every cached entry.
    ///
    /// In-flight computations are unaffected; their results will still be
    /// cached and delivered to their waiters.
    pub fn invalidate_all(&self) {
        self.state.lock().cache.clear();
    }

    /// Wraps a synchronous, argument-less function.
    ///
    /// Concurrent misses for the same key are *not* coalesced on this path:
    /// each caller blocks its own thread on the wrapped function and the
    /// last writer wins the cache slot.
    pub fn memoize<F>(&self, func: F) -> MemoizedFn<T, F>
    where
        F: Fn() -> Vec<T> + 'static,
    {
        MemoizedFn::new(self.clone(), key::identity_of::<F>(), func)
    }

    /// Wraps a synchronous function of one argument.
    ///
    /// Each distinct argument (by its `Display` rendering) gets its own
    /// cache slot.
    pub fn memoize_with_arg<A, F>(&self, func: F) -> MemoizedFnWithArg<A, T, F>
    where
        A: fmt::Display,
        F: Fn(&A) -> Vec<T> + 'static,
    {
        MemoizedFnWithArg::new(self.clone(), key::identity_of::<F>(), func)
    }

    /// Wraps a callback-style asynchronous action.
    ///
    /// The action receives a [`Completion`] and must call
    /// [`Completion::complete`] exactly once with its result. Concurrent
    /// misses for one key coalesce onto a single invocation of the action.
    pub fn memoize_async<F>(&self, func: F) -> MemoizedAsyncFn<T, F>
    where
        F: Fn(Completion<T>) + 'static,
    {
        MemoizedAsyncFn::new(self.clone(), key::identity_of::<F>(), func)
    }

    /// Wraps a callback-style asynchronous action of one argument.
    pub fn memoize_async_with_arg<A, F>(&self, func: F) -> MemoizedAsyncFnWithArg<A, T, F>
    where
        A: fmt::Display,
        F: Fn(&A, Completion<T>) + 'static,
    {
        MemoizedAsyncFnWithArg::new(self.clone(), key::identity_of::<F>(), func)
    }

    /// Wraps a future-returning function.
    ///
    /// Concurrent misses for one key coalesce onto a single invocation; the
    /// single future's success, emptiness, or failure is fanned out to every
    /// waiter identically. Errors are wrapped in [`Error`] and never cached.
    pub fn memoize_task<F, Fut, E>(&self, func: F) -> MemoizedTaskFn<T, F>
    where
        F: Fn() -> Fut + 'static,
        Fut: Future<Output = std::result::Result<Vec<T>, E>>,
        E: std::error::Error + Send + Sync + 'static,
    {
        MemoizedTaskFn::new(self.clone(), key::identity_of::<F>(), func)
    }

    /// Wraps a future-returning function of one argument.
    pub fn memoize_task_with_arg<A, F, Fut, E>(&self, func: F) -> MemoizedTaskFnWithArg<A, T, F>
    where
        A: fmt::Display,
        F: Fn(&A) -> Fut + 'static,
        Fut: Future<Output = std::result::Result<Vec<T>, E>>,
        E: std::error::Error + Send + Sync + 'static,
    {
        MemoizedTaskFnWithArg::new(self.clone(), key::identity_of::<F>(), func)
    }
}

/// Strategy implementations. All locking happens here; the handle types in
/// `memoized` only derive keys and forward.
impl<T> Memoizer<T> {
    pub(crate) fn invoke_sync(&self, key: &str, func: impl FnOnce() -> Vec<T>) -> Arc<[T]> {
        let cached = {
            let mut state = self.state.lock();
            state.sweep_expired();
            state.cache.get_mut(key).map(CacheEntry::items)
        };
        if let Some(items) = cached {
            tracing::trace!(key, "cache hit");
            return items;
        }

        tracing::trace!(key, "cache miss, invoking wrapped function");
        let items: Arc<[T]> = func().into();
        if items.is_empty() {
            // Empty results are handed back but never cached.
            return items;
        }

        self.state.lock().admit(key, &items);
        items
    }

    pub(crate) fn invoke_callback(&self, key: &str, func: impl FnOnce(Completion<T>), callback: Waiter<T>) {
        let role = {
            let mut state = self.state.lock();
            state.sweep_expired();
            if let Some(entry) = state.cache.get_mut(key) {
                CallbackRole::Hit(callback, entry.items())
            } else {
                let queue = state.callback_waiters.entry(key.to_owned()).or_default();
                queue.push_back(callback);
                if queue.len() == 1 {
                    CallbackRole::Leading
                } else {
                    tracing::trace!(key, waiters = queue.len(), "joined in-flight computation");
                    CallbackRole::Joined
                }
            }
        };

        match role {
            CallbackRole::Hit(callback, items) => {
                tracing::trace!(key, "cache hit");
                callback(items);
            }
            CallbackRole::Joined => {}
            CallbackRole::Leading => {
                tracing::trace!(key, "cache miss, invoking wrapped action");
                func(Completion::new(Arc::clone(&self.state), key.to_owned()));
            }
        }
    }

    pub(crate) async fn invoke_task<Fut, E>(&self, key: &str, func: impl FnOnce() -> Fut) -> TaskOutcome<T>
    where
        Fut: Future<Output = std::result::Result<Vec<T>, E>>,
        E: std::error::Error + Send + Sync + 'static,
    {
        let role = {
            let mut state = self.state.lock();
            state.sweep_expired();
            if let Some(entry) = state.cache.get_mut(key) {
                TaskRole::Hit(entry.items())
            } else {
                let (sender, receiver) = oneshot::channel();
                let queue = state.task_waiters.entry(key.to_owned()).or_default();
                queue.push_back(sender);
                if queue.len() == 1 {
                    TaskRole::Leading(receiver, Flight::new(Arc::clone(&self.state), key.to_owned()))
                } else {
                    tracing::trace!(key, waiters = queue.len(), "joined in-flight computation");
                    TaskRole::Joined(receiver)
                }
            }
        };

        match role {
            TaskRole::Hit(items) => {
                tracing::trace!(key, "cache hit");
                Ok(items)
            }
            TaskRole::Joined(receiver) => await_outcome(receiver).await,
            TaskRole::Leading(receiver, flight) => {
                tracing::trace!(key, "cache miss, invoking wrapped future");
                let outcome = func().await.map(Arc::from).map_err(Error::from_source);
                flight.settle(outcome);
                await_outcome(receiver).await
            }
        }
    }

    pub(crate) fn invalidate(&self, key: &str) {
        self.state.lock().cache.remove(key);
    }
}

async fn await_outcome<T>(receiver: oneshot::Receiver<TaskOutcome<T>>) -> TaskOutcome<T> {
    match receiver.await {
        Ok(outcome) => outcome,
        Err(oneshot::Canceled) => Err(Error::abandoned()),
    }
}

/// Completion handle for a callback-style wrapped action.
///
/// The wrapped action receives one `Completion` per cache miss and calls
/// [`complete`](Self::complete) with its result when it finishes. Completing
/// caches the result (unless empty) and releases every caller queued for the
/// key, in first-come, first-served order.
///
/// Dropping a `Completion` without completing it releases the queued callers
/// with an empty sequence, so an upstream that bails out cannot strand its
/// waiters.
pub struct Completion<T> {
    state: Option<Arc<Mutex<State<T>>>>,
    key: String,
}

impl<T> Completion<T> {
    fn new(state: Arc<Mutex<State<T>>>, key: String) -> Self {
        Self { state: Some(state), key }
    }

    /// Delivers the action's result to the engine and to every waiter.
    ///
    /// An empty `results` is fanned out as-is and not cached, so the next
    /// invocation will call the wrapped action again.
    pub fn complete(mut self, results: Vec<T>) {
        let state = self.state.take().expect("completion is consumed exactly once");
        Self::deliver(&state, &self.key, results.into());
    }

    fn deliver(state: &Mutex<State<T>>, key: &str, items: Arc<[T]>) {
        let waiters = {
            let mut state = state.lock();
            if !items.is_empty() {
                state.admit(key, &items);
            }
            state.callback_waiters.remove(key).unwrap_or_default()
        };
        tracing::trace!(key, waiters = waiters.len(), "fanning out callback result");
        for waiter in waiters {
            waiter(Arc::clone(&items));
        }
    }
}

impl<T> Drop for Completion<T> {
    fn drop(&mut self) {
        if let Some(state) = self.state.take() {
            Self::deliver(&state, &self.key, Vec::new().into());
        }
    }
}

impl<T> fmt::Debug for Completion<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Completion").field("key", &self.key).finish_non_exhaustive()
    }
}

/// Guard for the single in-flight upstream future of a key.
///
/// Settling caches a successful non-empty result and fans the outcome out to
/// every queued waiter. If the leading caller's future is dropped before it
/// settles, the guard fails the waiters instead of leaving them queued
/// forever.
struct Flight<T> {
    state: Option<Arc<Mutex<State<T>>>>,
    key: String,
}

impl<T> Flight<T> {
    fn new(state: Arc<Mutex<State<T>>>, key: String) -> Self {
        Self { state: Some(state), key }
    }

    fn settle(mut self, outcome: TaskOutcome<T>) {
        let state = self.state.take().expect("flight settles exactly once");
        Self::deliver(&state, &self.key, &outcome);
    }

    fn deliver(state: &Mutex<State<T>>, key: &str, outcome: &TaskOutcome<T>) {
        let waiters = {
            let mut state = state.lock();
            if let Ok(items) = outcome {
                if !items.is_empty() {
                    state.admit(key, items);
                }
            }
            state.task_waiters.remove(key).unwrap_or_default()
        };
        tracing::trace!(key, waiters = waiters.len(), "fanning out future outcome");
        for waiter in waiters {
            // A waiter that lost interest has dropped its receiver; that is
            // its business, not ours.
            let _ = waiter.send(outcome.clone());
        }
    }
}

impl<T> Drop for Flight<T> {
    fn drop(&mut self) {
        if let Some(state) = self.state.take() {
            Self::deliver(&state, &self.key, &Err(Error::abandoned()));
        }
    }
}
