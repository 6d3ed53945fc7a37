// SPDX-FileCopyrightText: 2026 Migralog Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-thread request serializer.
//!
//! The external assistant's per-thread context is not safe for concurrent
//! mutation, so at most one model request may be in flight per thread
//! handle. This arena keeps one FIFO queue per handle: `run` suspends until
//! all previously enqueued tasks for the same thread have completed, then
//! runs its own task and returns the result to the caller. Tasks for
//! different threads proceed fully concurrently.
//!
//! A failing task does not poison its queue, and retry policy belongs to
//! the caller. Queue lifecycle is tied to the thread handle: `forget` drops
//! the queue when the handle is invalidated at conversation reset.

use std::future::Future;
use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::Mutex;
use tracing::debug;

use migralog_core::ThreadHandle;

/// Arena of per-thread FIFO queues.
///
/// The tokio mutex queues waiters in FIFO order, so tasks run in submission
/// order; an empty queue imposes no delay beyond normal dispatch.
#[derive(Default)]
pub struct ThreadSerializer {
    queues: DashMap<ThreadHandle, Arc<Mutex<()>>>,
}

impl ThreadSerializer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs `task` once every earlier task for the same thread has finished,
    /// and returns its output (or propagates its failure) to the caller.
    pub async fn run<F, T>(&self, thread: &ThreadHandle, task: F) -> T
    where
        F: Future<Output = T>,
    {
        let queue = self
            .queues
            .entry(thread.clone())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .value()
            .clone();

        let _slot = queue.lock().await;
        task.await
    }

    /// Drops the queue for an invalidated thread handle.
    ///
    /// Tasks already holding or awaiting the old queue still complete in
    /// order; new handles get a fresh queue.
    pub fn forget(&self, thread: &ThreadHandle) {
        if self.queues.remove(thread).is_some() {
            debug!(thread = %thread, "thread queue dropped");
        }
    }

    /// Number of live queues, for diagnostics.
    pub fn len(&self) -> usize {
        self.queues.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queues.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    fn log() -> Arc<Mutex<Vec<&'static str>>> {
        Arc::new(Mutex::new(Vec::new()))
    }

    #[tokio::test]
    async fn empty_queue_runs_immediately() {
        let serializer = ThreadSerializer::new();
        let thread = ThreadHandle("th-1".into());
        let out = serializer.run(&thread, async { 41 + 1 }).await;
        assert_eq!(out, 42);
    }

    #[tokio::test]
    async fn same_thread_tasks_run_in_submission_order() {
        let serializer = Arc::new(ThreadSerializer::new());
        let thread = ThreadHandle("th-1".into());
        let events = log();

        // The second task's precondition is the first task's postcondition:
        // it must observe "a-end" already logged.
        let first = {
            let serializer = Arc::clone(&serializer);
            let thread = thread.clone();
            let events = Arc::clone(&events);
            tokio::spawn(async move {
                serializer
                    .run(&thread, async {
                        events.lock().await.push("a-start");
                        tokio::time::sleep(Duration::from_millis(50)).await;
                        events.lock().await.push("a-end");
                    })
                    .await;
            })
        };

        // Give the first task time to enter the queue.
        tokio::time::sleep(Duration::from_millis(10)).await;

        let second = {
            let serializer = Arc::clone(&serializer);
            let thread = thread.clone();
            let events = Arc::clone(&events);
            tokio::spawn(async move {
                serializer
                    .run(&thread, async {
                        events.lock().await.push("b-start");
                    })
                    .await;
            })
        };

        first.await.unwrap();
        second.await.unwrap();

        let events = events.lock().await;
        assert_eq!(*events, vec!["a-start", "a-end", "b-start"]);
    }

    #[tokio::test]
    async fn different_threads_do_not_block_each_other() {
        let serializer = Arc::new(ThreadSerializer::new());
        let events = log();

        let slow = {
            let serializer = Arc::clone(&serializer);
            let events = Arc::clone(&events);
            tokio::spawn(async move {
                serializer
                    .run(&ThreadHandle("th-slow".into()), async {
                        tokio::time::sleep(Duration::from_millis(100)).await;
                        events.lock().await.push("slow-end");
                    })
                    .await;
            })
        };

        tokio::time::sleep(Duration::from_millis(10)).await;

        let fast = {
            let serializer = Arc::clone(&serializer);
            let events = Arc::clone(&events);
            tokio::spawn(async move {
                serializer
                    .run(&ThreadHandle("th-fast".into()), async {
                        events.lock().await.push("fast-end");
                    })
                    .await;
            })
        };

        fast.await.unwrap();
        slow.await.unwrap();

        let events = events.lock().await;
        assert_eq!(*events, vec!["fast-end", "slow-end"]);
    }

    #[tokio::test]
    async fn failing_task_does_not_poison_the_queue() {
        let serializer = ThreadSerializer::new();
        let thread = ThreadHandle("th-1".into());

        let failed: Result<(), &str> = serializer.run(&thread, async { Err("boom") }).await;
        assert!(failed.is_err());

        let ok: Result<i32, &str> = serializer.run(&thread, async { Ok(7) }).await;
        assert_eq!(ok.unwrap(), 7);
    }

    #[tokio::test]
    async fn forget_drops_the_queue() {
        let serializer = ThreadSerializer::new();
        let thread = ThreadHandle("th-1".into());

        serializer.run(&thread, async {}).await;
        assert_eq!(serializer.len(), 1);

        serializer.forget(&thread);
        assert!(serializer.is_empty());
    }
}
