//! Integer-keyed registry of deferred async work.

use std::collections::BTreeMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use tracing::trace;

use crate::shared::Shared;

pub type MethodFuture<T> = Pin<Box<dyn Future<Output = T> + Send>>;

pub trait MethodFn<T>: Fn() -> MethodFuture<T> + Send + Sync + 'static {}

impl<T, F> MethodFn<T> for F where F: Fn() -> MethodFuture<T> + Send + Sync + 'static {}

/// A zero-argument async unit of deferred work.
pub type Method<T> = Arc<dyn MethodFn<T>>;

/// Called with the number of methods left after each removal.
pub type RemoveObserver = Arc<dyn Fn(usize) + Send + Sync>;

/// Wraps an async closure as a [`Method`].
pub fn method<T, F, Fut>(f: F) -> Method<T>
where
    T: 'static,
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = T> + Send + 'static,
{
    Arc::new(move || Box::pin(f()) as MethodFuture<T>)
}

struct Inner<T> {
    methods: BTreeMap<i64, Method<T>>,
    on_remove: Option<RemoveObserver>,
}

/// Deferred work keyed by integer, drained smallest key first.
pub struct MethodList<T> {
    inner: Shared<Inner<T>>,
}

impl<T> Clone for MethodList<T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<T> Default for MethodList<T> {
    fn default() -> Self {
        Self {
            inner: Shared::new(Inner {
                methods: BTreeMap::new(),
                on_remove: None,
            }),
        }
    }
}

impl<T: 'static> MethodList<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_remove_observer<F>(on_remove: F) -> Self
    where
        F: Fn(usize) + Send + Sync + 'static,
    {
        Self {
            inner: Shared::new(Inner {
                methods: BTreeMap::new(),
                on_remove: Some(Arc::new(on_remove)),
            }),
        }
    }

    pub async fn set_remove_observer<F>(&self, on_remove: F)
    where
        F: Fn(usize) + Send + Sync + 'static,
    {
        self.inner.lock().await.on_remove = Some(Arc::new(on_remove));
    }

    /// Stores `method` under `key`, replacing whatever was there.
    pub async fn add(&self, key: i64, method: Method<T>) {
        self.inner.lock().await.methods.insert(key, method);
    }

    pub async fn get(&self, key: i64) -> Option<Method<T>> {
        self.inner.lock().await.methods.get(&key).cloned()
    }

    /// Removes `key` and reports the remaining count to the remove observer.
    pub async fn remove(&self, key: i64) -> Option<Method<T>> {
        let mut inner = self.inner.lock().await;
        let removed = inner.methods.remove(&key);
        let count = inner.methods.len();
        trace!(key, count, "removed method");
        if let Some(on_remove) = &inner.on_remove {
            on_remove(count);
        }
        removed
    }

    pub async fn len(&self) -> usize {
        self.inner.lock().await.methods.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.inner.lock().await.methods.is_empty()
    }

    /// The smallest key currently present.
    pub async fn next_key(&self) -> Option<i64> {
        self.inner.lock().await.methods.keys().next().copied()
    }

    /// Removes the method with the smallest key and returns it with its key.
    pub async fn pop_next(&self) -> Option<(i64, Method<T>)> {
        let mut inner = self.inner.lock().await;
        let (key, method) = inner.methods.pop_first()?;
        let count = inner.methods.len();
        if let Some(on_remove) = &inner.on_remove {
            on_remove(count);
        }
        Some((key, method))
    }
}
