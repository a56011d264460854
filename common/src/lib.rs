//! Plumbing shared by the outliers workspace: async shared state, logging
//! setup, and the coordination primitives that bound and serialize parallel
//! frame processing.

pub mod dispatch_handler;
pub mod io_gate;
pub mod log_setup;
pub mod method_list;
pub mod number_running;
pub mod refusal;
pub mod shared;
pub mod shared_vec;
pub mod task_runner;
pub mod wait_group;

pub use dispatch_handler::{DispatchGuard, DispatchHandler};
pub use io_gate::{IoDirection, IoGate};
pub use log_setup::{LogConfig, LogSetupError, setup_logging};
pub use method_list::{Method, MethodList, method};
pub use number_running::NumberRunning;
pub use refusal::{Refusal, RefusalResult};
pub use shared::Shared;
pub use shared_vec::SharedVec;
pub use task_runner::{TaskHandle, TaskRunner, default_max_concurrent_tasks};
pub use wait_group::WaitGroup;
