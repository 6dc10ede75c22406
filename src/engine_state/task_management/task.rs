//! # Task System Core Traits
//!
//! This module defines the unit of background work and the message a worker sends
//! back for it.
//!
//! ## Task Lifecycle
//! 1. A `Task` is created on the main thread and published with a priority via
//!    `TaskManager::publish_task()`
//! 2. While still queued it can be cancelled by key
//! 3. The worker takes ownership and calls `process()`
//! 4. The output (or the panic message) travels back as a `TaskOutcome`
//! 5. The main thread drains outcomes with `process_completed_tasks()`
//!
//! ## Thread Safety
//! - A `Task` owns everything it needs; nothing is shared mutably with the main thread
//! - `Task` and its output must be `Send` to cross the worker boundary

use std::fmt;

/// A unit of work that can be executed on the background worker.
///
/// # Implementation Guidelines
/// - Should own all of its inputs (use `Arc` for large read-only data)
/// - Should be relatively coarse-grained to amortize scheduling overhead
/// - May panic; the worker catches it and reports a `TaskOutcome::Failed`
pub trait Task: Send + 'static {
    /// Identifies queued work so it can be cancelled or matched to a failure.
    type Key: Copy + Eq + fmt::Display + Send + 'static;

    /// Value sent back to the main thread.
    type Output: Send + 'static;

    fn key(&self) -> Self::Key;

    /// Performs the work. Runs on the worker thread.
    fn process(self) -> Self::Output;
}

/// What the worker reports for each task it dequeued.
pub enum TaskOutcome<T: Task> {
    Completed(T::Output),
    /// `process()` panicked. The worker logged it and moved on to the next task.
    Failed { key: T::Key, message: String },
}

impl<T: Task> fmt::Debug for TaskOutcome<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TaskOutcome::Completed(_) => f.write_str("Completed(..)"),
            TaskOutcome::Failed { key, message } => f
                .debug_struct("Failed")
                .field("key", &format_args!("{key}"))
                .field("message", message)
                .finish(),
        }
    }
}
