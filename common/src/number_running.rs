use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{debug, error};

use crate::refusal::{Refusal, RefusalResult};

pub type CountObserver = Arc<dyn Fn(u64) + Send + Sync>;

/// A counter of in-flight work that reports every change to an observer.
///
/// The observer runs synchronously, under the counter's lock, once per
/// mutation and once on registration. It must not call back into the
/// counter.
#[derive(Clone, Default)]
pub struct NumberRunning {
    inner: Arc<Mutex<Inner>>,
}

#[derive(Default)]
struct Inner {
    count: u64,
    observer: Option<CountObserver>,
}

impl Inner {
    fn set(&mut self, count: u64) -> u64 {
        self.count = count;
        if let Some(observer) = &self.observer {
            observer(count);
        }
        count
    }
}

impl NumberRunning {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `observer`, replacing any previous one, and immediately
    /// reports the current count to it.
    pub fn set_observer<F>(&self, observer: F)
    where
        F: Fn(u64) + Send + Sync + 'static,
    {
        let mut inner = self.inner.lock();
        let observer: CountObserver = Arc::new(observer);
        observer(inner.count);
        inner.observer = Some(observer);
    }

    pub fn current(&self) -> u64 {
        self.inner.lock().count
    }

    pub fn increment(&self) -> u64 {
        let mut inner = self.inner.lock();
        let next = inner.count + 1;
        inner.set(next)
    }

    /// Decrements the count. At zero the count stays at zero and the
    /// underflow is logged and returned.
    pub fn decrement(&self) -> RefusalResult<u64> {
        let mut inner = self.inner.lock();
        if inner.count == 0 {
            error!("cannot decrement past zero");
            return Err(Refusal::CounterUnderflow);
        }
        let next = inner.count - 1;
        Ok(inner.set(next))
    }

    /// Increments only if the count is below `max`, atomically with the check.
    pub fn try_start(&self, max: u64) -> RefusalResult<u64> {
        let mut inner = self.inner.lock();
        if inner.count >= max {
            debug!(count = inner.count, max, "not starting, at limit");
            return Err(Refusal::LimitReached { max });
        }
        let next = inner.count + 1;
        Ok(inner.set(next))
    }
}

impl std::fmt::Debug for NumberRunning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.inner.lock();
        f.debug_struct("NumberRunning")
            .field("count", &inner.count)
            .field("observer", &inner.observer.is_some())
            .finish()
    }
}
