//! Independent concurrency limits for file loads and file saves.

use std::future::Future;
use std::sync::Arc;

use tokio::sync::{Semaphore, SemaphorePermit};

/// Which side of the gate an operation goes through.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IoDirection {
    Load,
    Save,
}

/// Two counting gates, one bounding concurrent loads and one bounding
/// concurrent saves.
///
/// The permit is held for the whole duration of the wrapped work and released
/// when it finishes, whether the work succeeded, returned an error, or
/// panicked.
#[derive(Debug, Clone)]
pub struct IoGate {
    loads: Arc<Semaphore>,
    saves: Arc<Semaphore>,
    max_loads: usize,
    max_saves: usize,
}

impl IoGate {
    pub fn new(max_loads: usize, max_saves: usize) -> Self {
        assert!(max_loads > 0, "IoGate max_loads must be positive");
        assert!(max_saves > 0, "IoGate max_saves must be positive");
        Self {
            loads: Arc::new(Semaphore::new(max_loads)),
            saves: Arc::new(Semaphore::new(max_saves)),
            max_loads,
            max_saves,
        }
    }

    pub fn max(&self, direction: IoDirection) -> usize {
        match direction {
            IoDirection::Load => self.max_loads,
            IoDirection::Save => self.max_saves,
        }
    }

    /// Permits currently free for `direction`.
    pub fn available(&self, direction: IoDirection) -> usize {
        self.semaphore(direction).available_permits()
    }

    /// Runs `work` while holding one load permit.
    pub async fn load<F, T>(&self, work: F) -> T
    where
        F: Future<Output = T>,
    {
        self.run(IoDirection::Load, work).await
    }

    /// Runs `work` while holding one save permit.
    pub async fn save<F, T>(&self, work: F) -> T
    where
        F: Future<Output = T>,
    {
        self.run(IoDirection::Save, work).await
    }

    pub async fn run<F, T>(&self, direction: IoDirection, work: F) -> T
    where
        F: Future<Output = T>,
    {
        let _permit = self.acquire(direction).await;
        work.await
    }

    async fn acquire(&self, direction: IoDirection) -> SemaphorePermit<'_> {
        // the semaphores are owned by the gate and never closed
        match self.semaphore(direction).acquire().await {
            Ok(permit) => permit,
            Err(_) => unreachable!("IoGate semaphore closed"),
        }
    }

    fn semaphore(&self, direction: IoDirection) -> &Semaphore {
        match direction {
            IoDirection::Load => &self.loads,
            IoDirection::Save => &self.saves,
        }
    }
}
