//! Tracks named operations that must not run twice at the same time.

use hashbrown::HashSet;
use parking_lot::Mutex;
use std::sync::Arc;
use tracing::error;

use crate::refusal::{Refusal, RefusalResult};
use crate::wait_group::WaitGroup;

/// A set of currently entered names, paired with a [`WaitGroup`] so callers
/// can wait for every entered operation to leave.
#[derive(Debug, Clone, Default)]
pub struct DispatchHandler {
    running: Arc<Mutex<HashSet<String>>>,
    group: WaitGroup,
}

impl DispatchHandler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enters `name`. Entering a name that is already entered is refused,
    /// logged, and leaves the existing entry alone.
    pub fn enter(&self, name: &str) -> RefusalResult<()> {
        let mut running = self.running.lock();
        if running.contains(name) {
            error!(name, "more than one entry not allowed");
            return Err(Refusal::DuplicateEntry {
                name: name.to_string(),
            });
        }
        running.insert(name.to_string());
        self.group.enter();
        Ok(())
    }

    /// Leaves `name`.
    ///
    /// # Panics
    ///
    /// Panics if `name` is not currently entered.
    pub fn leave(&self, name: &str) {
        let mut running = self.running.lock();
        if !running.remove(name) {
            panic!("'{name}' was not entered, cannot leave");
        }
        self.group.leave();
    }

    /// Enters `name` and returns a guard that leaves it when dropped.
    pub fn enter_scoped(&self, name: &str) -> RefusalResult<DispatchGuard> {
        self.enter(name)?;
        Ok(DispatchGuard {
            handler: self.clone(),
            name: name.to_string(),
        })
    }

    pub fn is_entered(&self, name: &str) -> bool {
        self.running.lock().contains(name)
    }

    pub fn entered_count(&self) -> usize {
        self.running.lock().len()
    }

    /// Resolves once nothing is entered.
    pub async fn wait(&self) {
        self.group.wait().await
    }
}

/// Leaves its name on drop, including during unwinding.
#[derive(Debug)]
pub struct DispatchGuard {
    handler: DispatchHandler,
    name: String,
}

impl DispatchGuard {
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl Drop for DispatchGuard {
    fn drop(&mut self) {
        self.handler.leave(&self.name);
    }
}
