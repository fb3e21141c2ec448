//! Cooperative task scheduling for detached work.
//!
//! Delete broadcasts issue every non-primary leg as an independent task that
//! nobody awaits. The [`Scheduler`] trait is the seam those tasks go through:
//! the router never spawns directly, so a scheduler can add cancellation,
//! accounting, or a different executor without touching routing code.

use crate::core::error::{SplitError, SplitResult};
use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::runtime::Handle;

/// A detached unit of work. Its output is discarded.
pub type DetachedTask = Pin<Box<dyn Future<Output = ()> + Send + 'static>>;

/// Spawns fire-and-forget tasks.
///
/// Implementations must run every task to completion even if the caller that
/// scheduled it has already returned; no completion is reported back.
pub trait Scheduler: Send + Sync {
    /// Hand a task to the scheduler.
    fn spawn_detached(&self, task: DetachedTask);
}

/// Scheduler backed by a tokio runtime.
#[derive(Debug)]
pub struct TokioScheduler {
    /// Runtime the tasks are spawned onto.
    handle: Handle,

    /// Tasks spawned so far.
    spawned: AtomicU64,
}

impl TokioScheduler {
    /// Create a scheduler on an explicit runtime handle.
    pub fn new(handle: Handle) -> Self {
        Self {
            handle,
            spawned: AtomicU64::new(0),
        }
    }

    /// Create a scheduler on the runtime the caller is running in.
    pub fn current() -> SplitResult<Self> {
        let handle = Handle::try_current().map_err(|_| SplitError::NoRuntime)?;
        Ok(Self::new(handle))
    }

    /// Number of tasks spawned through this scheduler.
    pub fn spawned(&self) -> u64 {
        self.spawned.load(Ordering::Relaxed)
    }
}

impl Scheduler for TokioScheduler {
    fn spawn_detached(&self, task: DetachedTask) {
        self.spawned.fetch_add(1, Ordering::Relaxed);
        // Dropping the JoinHandle detaches the task.
        drop(self.handle.spawn(task));
    }
}
