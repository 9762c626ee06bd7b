//! Operation queue backed by a rayon worker pool
//!
//! Operations are enqueued while the caller walks artifact sets and all of
//! them have completed when [`OperationExecutor::run_all`] returns. No order
//! is guaranteed between operations.

use std::cell::RefCell;
use std::fmt::{self, Debug, Formatter};

/// Unit of queued work
pub type Operation = Box<dyn FnOnce() + Send + 'static>;

/// Sink for operations; drained by the owning executor
pub trait OperationQueue {
    /// Enqueue an operation
    fn add(&self, operation: Operation);
}

/// Errors raised while setting up the executor
#[derive(Debug, thiserror::Error)]
pub enum ExecutorError {
    /// Dedicated worker pool could not be created
    #[error("could not build worker pool: {0}")]
    PoolBuild(#[from] rayon::ThreadPoolBuildError),
}

enum ExecutorMode {
    Sequential,
    SharedPool,
    Dedicated(rayon::ThreadPool),
}

/// Submit-and-wait executor for finalization work
pub struct OperationExecutor {
    mode: ExecutorMode,
}

impl OperationExecutor {
    /// Executor running operations on the caller's thread after submission ends
    #[inline]
    #[must_use]
    pub fn sequential() -> Self {
        Self {
            mode: ExecutorMode::Sequential,
        }
    }

    /// Executor using the global rayon pool
    #[inline]
    #[must_use]
    pub fn shared_pool() -> Self {
        Self {
            mode: ExecutorMode::SharedPool,
        }
    }

    /// Executor sized by worker count
    ///
    /// `0` uses the global rayon pool, `1` runs sequentially and any other
    /// value builds a dedicated pool.
    ///
    /// # Errors
    /// Returns error if the dedicated pool cannot be created
    pub fn with_threads(worker_threads: usize) -> Result<Self, ExecutorError> {
        let mode = match worker_threads {
            0 => ExecutorMode::SharedPool,
            1 => ExecutorMode::Sequential,
            n => ExecutorMode::Dedicated(
                rayon::ThreadPoolBuilder::new()
                    .num_threads(n)
                    .thread_name(|i| format!("arx-worker-{i}"))
                    .build()?,
            ),
        };
        Ok(Self { mode })
    }

    /// Whether operations run on worker threads
    #[inline]
    #[must_use]
    pub fn is_parallel(&self) -> bool {
        !matches!(self.mode, ExecutorMode::Sequential)
    }

    /// Run `submit` on the caller's thread, then wait for every operation it queued
    pub fn run_all<F, R>(&self, submit: F) -> R
    where
        F: FnOnce(&dyn OperationQueue) -> R,
    {
        match &self.mode {
            ExecutorMode::Sequential => {
                let queue = SequentialQueue::default();
                let result = submit(&queue);
                queue.drain();
                result
            }
            ExecutorMode::SharedPool => {
                rayon::in_place_scope(|scope| submit(&ScopedQueue { scope }))
            }
            ExecutorMode::Dedicated(pool) => {
                pool.in_place_scope(|scope| submit(&ScopedQueue { scope }))
            }
        }
    }
}

impl Default for OperationExecutor {
    fn default() -> Self {
        Self::shared_pool()
    }
}

impl Debug for OperationExecutor {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let mode = match &self.mode {
            ExecutorMode::Sequential => "sequential".to_string(),
            ExecutorMode::SharedPool => "shared-pool".to_string(),
            ExecutorMode::Dedicated(pool) => format!("dedicated({})", pool.current_num_threads()),
        };
        f.debug_struct("OperationExecutor").field("mode", &mode).finish()
    }
}

#[derive(Default)]
struct SequentialQueue {
    pending: RefCell<Vec<Operation>>,
}

impl SequentialQueue {
    fn drain(&self) {
        let operations = self.pending.take();
        for operation in operations {
            operation();
        }
    }
}

impl OperationQueue for SequentialQueue {
    fn add(&self, operation: Operation) {
        self.pending.borrow_mut().push(operation);
    }
}

struct ScopedQueue<'a, 'scope> {
    scope: &'a rayon::Scope<'scope>,
}

impl OperationQueue for ScopedQueue<'_, '_> {
    fn add(&self, operation: Operation) {
        self.scope.spawn(move |_| operation());
    }
}
