// Copyright (c) The Memoir Project Authors.
// Licensed under the MIT License.

//! The type-indexed engine registry.

use std::{
    any::{Any, TypeId},
    fmt::{self, Display},
    sync::LazyLock,
};

use dashmap::DashMap;
use memoir::{
    Completion, MemoizedAsyncFn, MemoizedAsyncFnWithArg, MemoizedFn, MemoizedFnWithArg, MemoizedTaskFn,
    MemoizedTaskFnWithArg, Memoizer,
};

use crate::factory::{MemoizerFactory, SettingsFactory};

/// Lazily constructs and caches one [`Memoizer`] per result element type.
///
/// The registry is a type-indexed lookup table: the first request for a
/// result type builds an engine through the registry's factory, and every
/// later request for the same type receives a handle to that same engine.
/// The memoize operations mirror [`Memoizer`]'s surface and forward to the
/// per-type instance.
///
/// # Examples
///
/// ```
/// use memoir_registry::MemoizerRegistry;
///
/// let registry = MemoizerRegistry::new();
///
/// // Both wrappers share the registry's single `u32` engine.
/// let squares = registry.memoize_with_arg(|n: &u32| vec![n * n]);
/// let cubes = registry.memoize_with_arg(|n: &u32| vec![n * n * n]);
///
/// assert_eq!(squares.invoke(&3).to_vec(), vec![9]);
/// assert_eq!(cubes.invoke(&3).to_vec(), vec![27]);
/// ```
pub struct MemoizerRegistry<S = SettingsFactory> {
    factory: S,
    memoizers: DashMap<TypeId, Box<dyn Any + Send + Sync>>,
}

impl MemoizerRegistry<SettingsFactory> {
    /// Creates a registry building engines with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::with_factory(SettingsFactory::default())
    }

    /// The process-wide default registry.
    ///
    /// Lazily initialized on first access, shared by everything in the
    /// process, and never torn down. Prefer passing a registry (or an
    /// engine) explicitly; this exists as an opt-in convenience.
    #[must_use]
    pub fn global() -> &'static Self {
        static GLOBAL: LazyLock<MemoizerRegistry> = LazyLock::new(MemoizerRegistry::new);
        &GLOBAL
    }
}

impl Default for MemoizerRegistry<SettingsFactory> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: MemoizerFactory> MemoizerRegistry<S> {
    /// Creates a registry building engines through `factory`.
    #[must_use]
    pub fn with_factory(factory: S) -> Self {
        Self {
            factory,
            memoizers: DashMap::new(),
        }
    }

    /// Returns a reference to the registry's construction strategy.
    #[must_use]
    pub fn factory(&self) -> &S {
        &self.factory
    }

    /// Returns the engine for result element type `T`, constructing it on
    /// first use.
    #[must_use]
    pub fn memoizer<T: Send + Sync + 'static>(&self) -> Memoizer<T> {
        let slot = self
            .memoizers
            .entry(TypeId::of::<T>())
            .or_insert_with(|| Box::new(self.factory.create::<T>()));
        slot.downcast_ref::<Memoizer<T>>()
            .expect("registry slots are keyed by their result type")
            .clone()
    }

    /// Wraps a synchronous function on the `T` engine.
    ///
    /// See [`Memoizer::memoize`].
    pub fn memoize<T, F>(&self, func: F) -> MemoizedFn<T, F>
    where
        T: Send + Sync + 'static,
        F: Fn() -> Vec<T> + 'static,
    {
        self.memoizer::<T>().memoize(func)
    }

    /// Wraps a synchronous function of one argument on the `T` engine.
    ///
    /// See [`Memoizer::memoize_with_arg`].
    pub fn memoize_with_arg<A, T, F>(&self, func: F) -> MemoizedFnWithArg<A, T, F>
    where
        A: Display,
        T: Send + Sync + 'static,
        F: Fn(&A) -> Vec<T> + 'static,
    {
        self.memoizer::<T>().memoize_with_arg(func)
    }

    /// Wraps a callback-style asynchronous action on the `T` engine.
    ///
    /// See [`Memoizer::memoize_async`].
    pub fn memoize_async<T, F>(&self, func: F) -> MemoizedAsyncFn<T, F>
    where
        T: Send + Sync + 'static,
        F: Fn(Completion<T>) + 'static,
    {
        self.memoizer::<T>().memoize_async(func)
    }

    /// Wraps a callback-style asynchronous action of one argument on the
    /// `T` engine.
    ///
    /// See [`Memoizer::memoize_async_with_arg`].
    pub fn memoize_async_with_arg<A, T, F>(&self, func: F) -> MemoizedAsyncFnWithArg<A, T, F>
    where
        A: Display,
        T: Send + Sync + 'static,
        F: Fn(&A, Completion<T>) + 'static,
    {
        self.memoizer::<T>().memoize_async_with_arg(func)
    }

    /// Wraps a future-returning function on the `T` engine.
    ///
    /// See [`Memoizer::memoize_task`].
    pub fn memoize_task<T, F, Fut, E>(&self, func: F) -> MemoizedTaskFn<T, F>
    where
        T: Send + Sync + 'static,
        F: Fn() -> Fut + 'static,
        Fut: Future<Output = Result<Vec<T>, E>>,
        E: std::error::Error + Send + Sync + 'static,
    {
        self.memoizer::<T>().memoize_task(func)
    }

    /// Wraps a future-returning function of one argument on the `T` engine.
    ///
    /// See [`Memoizer::memoize_task_with_arg`].
    pub fn memoize_task_with_arg<A, T, F, Fut, E>(&self, func: F) -> MemoizedTaskFnWithArg<A, T, F>
    where
        A: Display,
        T: Send + Sync + 'static,
        F: Fn(&A) -> Fut + 'static,
        Fut: Future<Output = Result<Vec<T>, E>>,
        E: std::error::Error + Send + Sync + 'static,
    {
        self.memoizer::<T>().memoize_task_with_arg(func)
    }

    /// Removes every cached entry from the `T` engine.
    pub fn invalidate_all<T: Send + Sync + 'static>(&self) {
        self.memoizer::<T>().invalidate_all();
    }
}

impl<S> fmt::Debug for MemoizerRegistry<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemoizerRegistry")
            .field("engines", &self.memoizers.len())
            .finish_non_exhaustive()
    }
}
