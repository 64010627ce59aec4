// Copyright (c) The Memoir Project Authors.
// Licensed under the MIT License.

//! Handles returned by the memoize operations.
//!
//! Each handle pairs the wrapped computation with its derived cache key and
//! an explicit invalidator. The handles only derive keys and forward; the
//! lookup, coalescing, and eviction logic lives in the engine.

use std::{fmt, marker::PhantomData, sync::Arc};

use crate::{
    error::Result,
    key,
    memoizer::{Completion, Memoizer, Waiter},
};

/// A memoized synchronous function without arguments.
///
/// Created by [`Memoizer::memoize`].
pub struct MemoizedFn<T, F> {
    memoizer: Memoizer<T>,
    key: String,
    func: F,
}

impl<T, F> MemoizedFn<T, F>
where
    F: Fn() -> Vec<T>,
{
    pub(crate) fn new(memoizer: Memoizer<T>, key: String, func: F) -> Self {
        Self { memoizer, key, func }
    }

    /// Returns the cached result, invoking the wrapped function on a miss.
    ///
    /// Blocks the calling thread for the duration of the wrapped function.
    /// An empty result is returned as-is and not cached.
    pub fn invoke(&self) -> Arc<[T]> {
        self.memoizer.invoke_sync(&self.key, &self.func)
    }

    /// Drops the cached result, forcing the next call to recompute.
    ///
    /// Invalidating when nothing is cached is a no-op.
    pub fn invalidate(&self) {
        self.memoizer.invalidate(&self.key);
    }
}

/// A memoized synchronous function of one argument.
///
/// Created by [`Memoizer::memoize_with_arg`]. Each distinct argument gets
/// its own cache slot.
pub struct MemoizedFnWithArg<A, T, F> {
    memoizer: Memoizer<T>,
    identity: String,
    func: F,
    _arg: PhantomData<fn(&A)>,
}

impl<A, T, F> MemoizedFnWithArg<A, T, F>
where
    A: fmt::Display,
    F: Fn(&A) -> Vec<T>,
{
    pub(crate) fn new(memoizer: Memoizer<T>, identity: String, func: F) -> Self {
        Self {
            memoizer,
            identity,
            func,
            _arg: PhantomData,
        }
    }

    /// Returns the cached result for `arg`, invoking the wrapped function on
    /// a miss.
    pub fn invoke(&self, arg: &A) -> Arc<[T]> {
        let key = key::keyed(&self.identity, arg);
        self.memoizer.invoke_sync(&key, || (self.func)(arg))
    }

    /// Drops the cached result for `arg`.
    pub fn invalidate(&self, arg: &A) {
        self.memoizer.invalidate(&key::keyed(&self.identity, arg));
    }
}

/// A memoized callback-style asynchronous action without arguments.
///
/// Created by [`Memoizer::memoize_async`].
pub struct MemoizedAsyncFn<T, F> {
    memoizer: Memoizer<T>,
    key: String,
    func: F,
}

impl<T, F> MemoizedAsyncFn<T, F>
where
    F: Fn(Completion<T>),
{
    pub(crate) fn new(memoizer: Memoizer<T>, key: String, func: F) -> Self {
        Self { memoizer, key, func }
    }

    /// Delivers the result to `callback`, either immediately from the cache
    /// or once the (single) in-flight wrapped action completes.
    ///
    /// Returns as soon as the caller is either served or queued; callbacks
    /// queued behind an in-flight action are released in first-come,
    /// first-served order when it completes.
    pub fn invoke(&self, callback: impl FnOnce(Arc<[T]>) + Send + 'static) {
        self.memoizer.invoke_callback(&self.key, &self.func, Box::new(callback) as Waiter<T>);
    }

    /// Drops the cached result, forcing the next call to recompute.
    pub fn invalidate(&self) {
        self.memoizer.invalidate(&self.key);
    }
}

/// A memoized callback-style asynchronous action of one argument.
///
/// Created by [`Memoizer::memoize_async_with_arg`].
pub struct MemoizedAsyncFnWithArg<A, T, F> {
    memoizer: Memoizer<T>,
    identity: String,
    func: F,
    _arg: PhantomData<fn(&A)>,
}

impl<A, T, F> MemoizedAsyncFnWithArg<A, T, F>
where
    A: fmt::Display,
    F: Fn(&A, Completion<T>),
{
    pub(crate) fn new(memoizer: Memoizer<T>, identity: String, func: F) -> Self {
        Self {
            memoizer,
            identity,
            func,
            _arg: PhantomData,
        }
    }

    /// Delivers the result for `arg` to `callback`, coalescing concurrent
    /// misses for the same argument onto a single wrapped-action invocation.
    pub fn invoke(&self, arg: &A, callback: impl FnOnce(Arc<[T]>) + Send + 'static) {
        let key = key::keyed(&self.identity, arg);
        self.memoizer
            .invoke_callback(&key, |completion| (self.func)(arg, completion), Box::new(callback) as Waiter<T>);
    }

    /// Drops the cached result for `arg`.
    pub fn invalidate(&self, arg: &A) {
        self.memoizer.invalidate(&key::keyed(&self.identity, arg));
    }
}

/// A memoized future-returning function without arguments.
///
/// Created by [`Memoizer::memoize_task`].
pub struct MemoizedTaskFn<T, F> {
    memoizer: Memoizer<T>,
    key: String,
    func: F,
}

impl<T, F, Fut, E> MemoizedTaskFn<T, F>
where
    F: Fn() -> Fut,
    Fut: Future<Output = std::result::Result<Vec<T>, E>>,
    E: std::error::Error + Send + Sync + 'static,
{
    pub(crate) fn new(memoizer: Memoizer<T>, key: String, func: F) -> Self {
        Self { memoizer, key, func }
    }

    /// Resolves to the cached result, or to the outcome of the (single)
    /// in-flight wrapped future.
    ///
    /// On a cache hit the returned future is already resolved. On a miss the
    /// caller is queued; every caller coalesced onto one upstream future
    /// receives the same result, and an upstream failure fails all of them.
    ///
    /// # Errors
    ///
    /// Returns the wrapped computation's error (via [`Error::from_source`](crate::Error::from_source)),
    /// shared with every coalesced waiter. Failures are never cached.
    pub async fn invoke(&self) -> Result<Arc<[T]>> {
        self.memoizer.invoke_task(&self.key, &self.func).await
    }

    /// Drops the cached result, forcing the next call to recompute.
    pub fn invalidate(&self) {
        self.memoizer.invalidate(&self.key);
    }
}

/// A memoized future-returning function of one argument.
///
/// Created by [`Memoizer::memoize_task_with_arg`].
pub struct MemoizedTaskFnWithArg<A, T, F> {
    memoizer: Memoizer<T>,
    identity: String,
    func: F,
    _arg: PhantomData<fn(&A)>,
}

impl<A, T, F, Fut, E> MemoizedTaskFnWithArg<A, T, F>
where
    A: fmt::Display,
    F: Fn(&A) -> Fut,
    Fut: Future<Output = std::result::Result<Vec<T>, E>>,
    E: std::error::Error + Send + Sync + 'static,
{
    pub(crate) fn new(memoizer: Memoizer<T>, identity: String, func: F) -> Self {
        Self {
            memoizer,
            identity,
            func,
            _arg: PhantomData,
        }
    }

    /// Resolves to the cached result for `arg`, coalescing concurrent misses
    /// for the same argument onto a single wrapped future.
    ///
    /// # Errors
    ///
    /// Returns the wrapped computation's error, shared with every coalesced
    /// waiter. Failures are never cached.
    pub async fn invoke(&self, arg: &A) -> Result<Arc<[T]>> {
        let key = key::keyed(&self.identity, arg);
        self.memoizer.invoke_task(&key, || (self.func)(arg)).await
    }

    /// Drops the cached result for `arg`.
    pub fn invalidate(&self, arg: &A) {
        self.memoizer.invalidate(&key::keyed(&self.identity, arg));
    }
}

macro_rules! impl_handle_debug {
    ($name:ident < $($gen:ident),+ >, $key_field:ident) => {
        impl<$($gen),+> fmt::Debug for $name<$($gen),+> {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.debug_struct(stringify!($name))
                    .field(stringify!($key_field), &self.$key_field)
                    .finish_non_exhaustive()
            }
        }
    };
}

impl_handle_debug!(MemoizedFn<T, F>, key);
impl_handle_debug!(MemoizedFnWithArg<A, T, F>, identity);
impl_handle_debug!(MemoizedAsyncFn<T, F>, key);
impl_handle_debug!(MemoizedAsyncFnWithArg<A, T, F>, identity);
impl_handle_debug!(MemoizedTaskFn<T, F>, key);
impl_handle_debug!(MemoizedTaskFnWithArg<A, T, F>, identity);
