//! Task pool for the traversal
//!
//! This module handles:
//! - Spawning page tasks onto the runtime as they are discovered
//! - Joining completed tasks in completion order (fan-in)
//! - Refusing new work once the crawl is cancelled
//!
//! The concurrency ceiling itself lives in the fetcher's semaphore; tasks
//! spend their whole suspended life waiting there or on the network.

use std::future::Future;
use tokio::task::{JoinError, JoinSet};
use tokio_util::sync::CancellationToken;

/// Spawns tasks and hands back their results as they complete
pub struct Scheduler<T> {
    tasks: JoinSet<T>,
    cancel: CancellationToken,
    submitted: usize,
    completed: usize,
}

impl<T: Send + 'static> Scheduler<T> {
    /// Creates an empty scheduler tied to a cancellation token
    pub fn new(cancel: CancellationToken) -> Self {
        Self {
            tasks: JoinSet::new(),
            cancel,
            submitted: 0,
            completed: 0,
        }
    }

    /// Spawns a task unless the crawl has been cancelled
    ///
    /// # Returns
    ///
    /// * `true` - The task was spawned
    /// * `false` - Cancelled; the task was dropped without running
    pub fn submit<F>(&mut self, task: F) -> bool
    where
        F: Future<Output = T> + Send + 'static,
    {
        if self.cancel.is_cancelled() {
            return false;
        }

        self.tasks.spawn(task);
        self.submitted += 1;
        true
    }

    /// Waits for the next task to finish
    ///
    /// Returns `None` once nothing is outstanding.
    pub async fn join_next(&mut self) -> Option<Result<T, JoinError>> {
        let joined = self.tasks.join_next().await;
        if joined.is_some() {
            self.completed += 1;
        }
        joined
    }

    /// Stops accepting new tasks; running tasks drain normally
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Number of tasks spawned and not yet joined
    pub fn outstanding(&self) -> usize {
        self.tasks.len()
    }

    /// Total tasks spawned so far
    pub fn submitted(&self) -> usize {
        self.submitted
    }

    /// Total tasks joined so far
    pub fn completed(&self) -> usize {
        self.completed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_new_scheduler_is_idle() {
        let mut scheduler: Scheduler<u32> = Scheduler::new(CancellationToken::new());
        assert_eq!(scheduler.outstanding(), 0);
        assert!(scheduler.join_next().await.is_none());
    }

    #[tokio::test]
    async fn test_joins_in_completion_order() {
        let mut scheduler = Scheduler::new(CancellationToken::new());
        scheduler.submit(async {
            tokio::time::sleep(Duration::from_millis(50)).await;
            "slow"
        });
        scheduler.submit(async { "fast" });

        let first = scheduler.join_next().await.unwrap().unwrap();
        let second = scheduler.join_next().await.unwrap().unwrap();
        assert_eq!(first, "fast");
        assert_eq!(second, "slow");
        assert!(scheduler.join_next().await.is_none());
        assert_eq!(scheduler.submitted(), 2);
        assert_eq!(scheduler.completed(), 2);
    }

    #[tokio::test]
    async fn test_fan_out_from_results() {
        // each result below 3 spawns two children, like a listing page does
        let mut scheduler = Scheduler::new(CancellationToken::new());
        scheduler.submit(async { 0u32 });

        let mut seen = Vec::new();
        while let Some(joined) = scheduler.join_next().await {
            let depth = joined.unwrap();
            seen.push(depth);
            if depth < 3 {
                for _ in 0..2 {
                    scheduler.submit(async move { depth + 1 });
                }
            }
        }

        assert_eq!(seen.len(), 1 + 2 + 4 + 8);
    }

    #[tokio::test]
    async fn test_cancel_refuses_new_tasks() {
        let mut scheduler = Scheduler::new(CancellationToken::new());
        assert!(scheduler.submit(async { 1 }));

        scheduler.cancel();
        assert!(scheduler.is_cancelled());
        assert!(!scheduler.submit(async { 2 }));

        // the task spawned before cancelling still drains
        assert_eq!(scheduler.join_next().await.unwrap().unwrap(), 1);
        assert!(scheduler.join_next().await.is_none());
    }
}
