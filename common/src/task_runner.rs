//! Runs futures on new tasks while a concurrency budget allows it, and on
//! the caller's task otherwise.

use std::future::Future;

use tokio::task::{JoinError, JoinHandle};
use tracing::{info, trace};

use crate::number_running::NumberRunning;

/// Default task budget: three quarters of the available cores, at least two.
pub fn default_max_concurrent_tasks() -> u64 {
    let cores = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(2);
    (cores - cores / 4).max(2) as u64
}

#[derive(Debug, Clone)]
pub struct TaskRunner {
    running: NumberRunning,
    max_concurrent: u64,
}

/// Result of [`TaskRunner::run`].
#[derive(Debug)]
pub enum TaskHandle<T> {
    /// The work runs on its own task.
    Spawned(JoinHandle<T>),
    /// The work already ran on the caller's task.
    Ready(T),
}

impl<T> TaskHandle<T> {
    pub async fn join(self) -> Result<T, JoinError> {
        match self {
            TaskHandle::Spawned(handle) => handle.await,
            TaskHandle::Ready(value) => Ok(value),
        }
    }

    pub fn is_spawned(&self) -> bool {
        matches!(self, TaskHandle::Spawned(_))
    }
}

/// Decrements the counter when the spawned work ends, however it ends.
struct RunningGuard(NumberRunning);

impl Drop for RunningGuard {
    fn drop(&mut self) {
        let _ = self.0.decrement();
    }
}

impl TaskRunner {
    pub fn new(max_concurrent: u64) -> Self {
        assert!(max_concurrent > 0, "TaskRunner max_concurrent must be positive");
        info!(max_concurrent, "using maximum of {max_concurrent} concurrent tasks");
        Self {
            running: NumberRunning::new(),
            max_concurrent,
        }
    }

    pub fn max_concurrent(&self) -> u64 {
        self.max_concurrent
    }

    /// The counter of spawned tasks still running.
    pub fn running(&self) -> &NumberRunning {
        &self.running
    }

    pub async fn run<F, T>(&self, work: F) -> TaskHandle<T>
    where
        F: Future<Output = T> + Send + 'static,
        T: Send + 'static,
    {
        if self.running.try_start(self.max_concurrent).is_ok() {
            trace!("running in new task");
            let guard = RunningGuard(self.running.clone());
            TaskHandle::Spawned(tokio::spawn(async move {
                let _guard = guard;
                work.await
            }))
        } else {
            trace!("running in existing task");
            TaskHandle::Ready(work.await)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tokio::sync::oneshot;

    #[tokio::test]
    async fn spawns_until_budget_is_used() {
        let runner = TaskRunner::new(1);
        let (release_tx, release_rx) = oneshot::channel::<()>();

        let first = runner
            .run(async move {
                let _ = release_rx.await;
                1
            })
            .await;
        assert!(first.is_spawned());
        assert_eq!(runner.running().current(), 1);

        let second = runner.run(async { 2 }).await;
        assert!(!second.is_spawned(), "budget of one is taken");
        assert_eq!(second.join().await.unwrap(), 2);

        release_tx.send(()).unwrap();
        assert_eq!(first.join().await.unwrap(), 1);
        assert_eq!(runner.running().current(), 0);
    }

    #[tokio::test]
    async fn counter_released_when_task_panics() {
        let runner = TaskRunner::new(2);
        let handle = runner
            .run(async {
                tokio::time::sleep(Duration::from_millis(5)).await;
                if runner_should_fail() {
                    panic!("boom");
                }
            })
            .await;

        assert!(handle.join().await.is_err());
        assert_eq!(runner.running().current(), 0);
    }

    fn runner_should_fail() -> bool {
        true
    }

    #[test]
    fn default_budget_is_at_least_two() {
        assert!(default_max_concurrent_tasks() >= 2);
    }
}
