//! Task runtime: the execution context for topology-internal work.
//!
//! Tasks are registered as future factories before start.  `on_start`
//! moves the registry onto a dedicated core-pinned thread, where a
//! `edge-executor` local executor drives every task to completion:
//!
//! ```text
//!  ┌──────────────────────────────────────────────────┐
//!  │  Runtime thread (pinned, own priority/stack)     │
//!  │  ┌────────────────────────────────────────────┐  │
//!  │  │  edge_executor::LocalExecutor              │  │
//!  │  │  ┌────────┐  ┌────────┐       ┌────────┐   │  │
//!  │  │  │ task 0 │  │ task 1 │  ...  │ task N │   │  │
//!  │  │  └────────┘  └────────┘       └────────┘   │  │
//!  │  └────────────────────────────────────────────┘  │
//!  └──────────────────────────────────────────────────┘
//! ```
//!
//! The foreground context never joins this thread in steady state; state
//! is published through an atomic so diagnostics can read it from anywhere.

use core::future::Future;
use core::pin::Pin;
use core::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;

use log::{info, warn};

use crate::app::ports::{TaskRuntime, TaskState};
use crate::config::BlinkerConfig;
use crate::drivers::task_pin::{self, PinnedSpec};

/// Executor queue depth and registry capacity.
pub const MAX_TASKS: usize = 8;

type TaskFuture = Pin<Box<dyn Future<Output = ()>>>;
type TaskFactory = Box<dyn FnOnce() -> TaskFuture + Send>;

struct TaskEntry {
    name: &'static str,
    factory: TaskFactory,
}

/// Errors from [`PinnedTaskRuntime::register`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegisterError {
    /// The runtime has already started; the registry is closed.
    AlreadyStarted,
    /// All [`MAX_TASKS`] slots are taken.
    Full,
}

impl core::fmt::Display for RegisterError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::AlreadyStarted => write!(f, "runtime already started"),
            Self::Full => write!(f, "task registry full ({MAX_TASKS} slots)"),
        }
    }
}

impl core::error::Error for RegisterError {}

pub struct PinnedTaskRuntime {
    spec: PinnedSpec,
    pending: Vec<TaskEntry>,
    registered: usize,
    state: Arc<AtomicU8>,
    handle: Option<JoinHandle<()>>,
}

impl PinnedTaskRuntime {
    pub fn new(spec: PinnedSpec) -> Self {
        Self {
            spec,
            pending: Vec::new(),
            registered: 0,
            state: Arc::new(AtomicU8::new(TaskState::NotStarted as u8)),
            handle: None,
        }
    }

    /// Runtime placed according to the compiled-in configuration.
    pub fn from_config(config: &BlinkerConfig) -> Self {
        Self::new(PinnedSpec {
            core: config.runtime_core,
            priority: config.runtime_priority,
            stack_kb: config.runtime_stack_kb,
            name: "fw-tasks\0",
        })
    }

    /// Add a task to the registry.  The factory runs on the runtime thread,
    /// so the future itself need not be `Send`.
    pub fn register<F, Fut>(&mut self, name: &'static str, factory: F) -> Result<(), RegisterError>
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + 'static,
    {
        if self.state() != TaskState::NotStarted {
            return Err(RegisterError::AlreadyStarted);
        }
        if self.pending.len() >= MAX_TASKS {
            return Err(RegisterError::Full);
        }
        self.pending.push(TaskEntry {
            name,
            factory: Box::new(move || Box::pin(factory()) as TaskFuture),
        });
        self.registered += 1;
        Ok(())
    }

    /// Wait for the runtime thread to finish.  Returns `false` if it was
    /// never started or panicked.
    pub fn join(&mut self) -> bool {
        match self.handle.take() {
            Some(h) => h.join().is_ok(),
            None => false,
        }
    }
}

impl TaskRuntime for PinnedTaskRuntime {
    fn on_start(&mut self) {
        if self.state() != TaskState::NotStarted {
            warn!("runtime: start requested twice, ignoring");
            return;
        }

        let tasks = core::mem::take(&mut self.pending);
        let state = Arc::clone(&self.state);
        self.state.store(TaskState::Running as u8, Ordering::Release);

        match task_pin::spawn_on_core(self.spec, move || {
            run_tasks(tasks);
            state.store(TaskState::Stopped as u8, Ordering::Release);
        }) {
            Ok(h) => self.handle = Some(h),
            Err(e) => {
                warn!("runtime: thread spawn failed: {}", e);
                self.state.store(TaskState::Stopped as u8, Ordering::Release);
            }
        }
    }

    fn state(&self) -> TaskState {
        TaskState::from_u8(self.state.load(Ordering::Acquire))
    }

    fn priority(&self) -> u8 {
        self.spec.priority
    }

    fn has_registry(&self) -> bool {
        self.registered > 0
    }

    fn num_tasks(&self) -> usize {
        self.registered
    }
}

/// Body of the runtime thread: spawn every task, run until all finish.
fn run_tasks(tasks: Vec<TaskEntry>) {
    let executor: edge_executor::LocalExecutor<'_, MAX_TASKS> = edge_executor::LocalExecutor::new();

    let handles: Vec<_> = tasks
        .into_iter()
        .map(|t| {
            info!("runtime: starting task '{}'", t.name);
            executor.spawn((t.factory)())
        })
        .collect();

    info!("runtime: {} tasks running", handles.len());

    futures_lite::future::block_on(executor.run(async move {
        for h in handles {
            h.await;
        }
    }));

    info!("runtime: all tasks finished");
}
