use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use tokio::sync::Notify;

/// Counts outstanding work; `wait` resolves once the count returns to zero.
#[derive(Debug, Clone, Default)]
pub struct WaitGroup {
    pending: Arc<AtomicUsize>,
    notify: Arc<Notify>,
}

impl WaitGroup {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn enter(&self) {
        self.pending.fetch_add(1, Ordering::SeqCst);
    }

    pub fn leave(&self) {
        // the count is left untouched when already zero
        let previous = self
            .pending
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |count| {
                count.checked_sub(1)
            });
        let Ok(previous) = previous else {
            panic!("WaitGroup left more times than entered");
        };
        if previous == 1 {
            self.notify.notify_waiters();
        }
    }

    pub fn pending(&self) -> usize {
        self.pending.load(Ordering::SeqCst)
    }

    pub async fn wait(&self) {
        loop {
            let notified = self.notify.notified();
            tokio::pin!(notified);
            // register before checking so a leave between the check and the
            // await is not missed
            notified.as_mut().enable();
            if self.pending.load(Ordering::SeqCst) == 0 {
                return;
            }
            notified.await;
        }
    }
}
