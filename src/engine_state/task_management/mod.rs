//! # Task Management System
//!
//! A single long-lived background worker fed by a priority queue.
//!
//! ## Architecture Overview
//!
//! - `TaskManager`: owns the worker thread, the shared queue and the result channel
//! - `Task`: a unit of work, see [`task`]
//! - `TaskOutcome`: what comes back from the worker
//!
//! The queue is a `BinaryHeap` behind a `Mutex` + `Condvar`. The main thread pushes
//! into it at any time, including while the worker is busy, so new work joins the live
//! queue instead of waiting for a burst to finish. The worker sleeps on the condvar
//! when the heap is empty.
//!
//! ## Ordering
//! - Lower priority values are processed first
//! - Equal priorities are processed in publish order
//! - A queued task is never reordered after publishing; it can only be cancelled
//!
//! ## Failure isolation
//! A panic inside `Task::process` is caught at the worker loop, logged and reported as
//! `TaskOutcome::Failed`. The worker keeps draining the queue.
//!
//! ## Example Usage
//! ```ignore
//! let mut task_manager = TaskManager::new();
//! task_manager.publish_task(1.5, MyTask::new(...));
//!
//! // In the main loop:
//! for outcome in task_manager.process_completed_tasks() {
//!     // ...
//! }
//! ```

pub mod task;

use std::{
    any::Any,
    cmp::Ordering,
    collections::BinaryHeap,
    panic::{self, AssertUnwindSafe},
    sync::{
        mpsc::{channel, Receiver, RecvTimeoutError, Sender},
        Arc, Condvar, Mutex, MutexGuard, PoisonError,
    },
    thread::{self, JoinHandle},
    time::Duration,
};

use task::{Task, TaskOutcome};

struct QueuedTask<T> {
    priority: f32,
    seq: u64,
    task: T,
}

impl<T> PartialEq for QueuedTask<T> {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl<T> Eq for QueuedTask<T> {}

impl<T> PartialOrd for QueuedTask<T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<T> Ord for QueuedTask<T> {
    // BinaryHeap is a max-heap: the smallest priority, then the oldest seq, must
    // compare greatest.
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .priority
            .total_cmp(&self.priority)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

struct QueueState<T> {
    heap: BinaryHeap<QueuedTask<T>>,
    next_seq: u64,
    closed: bool,
}

type SharedQueue<T> = Arc<(Mutex<QueueState<T>>, Condvar)>;

fn lock_queue<T>(queue: &Mutex<QueueState<T>>) -> MutexGuard<'_, QueueState<T>> {
    // A panic never happens while the lock is held, but recover rather than cascade.
    queue.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Owns the background worker and coordinates task execution.
pub struct TaskManager<T: Task> {
    queue: SharedQueue<T>,
    result_receiver: Receiver<TaskOutcome<T>>,
    /// Published tasks whose outcome has not been drained yet (queued + in flight).
    outstanding: usize,
    worker: Option<JoinHandle<()>>,
}

impl<T: Task> TaskManager<T> {
    /// Creates the queue and starts the worker thread.
    pub fn new() -> Self {
        let queue: SharedQueue<T> = Arc::new((
            Mutex::new(QueueState {
                heap: BinaryHeap::new(),
                next_seq: 0,
                closed: false,
            }),
            Condvar::new(),
        ));
        let (result_tx, result_rx) = channel::<TaskOutcome<T>>();

        let worker_queue = Arc::clone(&queue);
        let worker = thread::spawn(move || worker_loop(worker_queue, result_tx));
        log::info!("Started background worker");

        TaskManager {
            queue,
            result_receiver: result_rx,
            outstanding: 0,
            worker: Some(worker),
        }
    }

    /// Publishes a task. Lower `priority` values run first.
    pub fn publish_task(&mut self, priority: f32, task: T) {
        let (lock, condvar) = &*self.queue;
        let mut state = lock_queue(lock);
        let seq = state.next_seq;
        state.next_seq += 1;
        state.heap.push(QueuedTask {
            priority,
            seq,
            task,
        });
        self.outstanding += 1;
        condvar.notify_one();
    }

    /// Removes every still-queued task with `key`. Tasks already picked up by the
    /// worker are not affected.
    ///
    /// # Returns
    /// `true` if anything was removed.
    pub fn cancel(&mut self, key: T::Key) -> bool {
        let (lock, _) = &*self.queue;
        let mut state = lock_queue(lock);
        let before = state.heap.len();
        state.heap.retain(|queued| queued.task.key() != key);
        let removed = before - state.heap.len();
        self.outstanding -= removed;
        removed > 0
    }

    /// Drains every outcome the worker has produced so far without blocking.
    pub fn process_completed_tasks(&mut self) -> Vec<TaskOutcome<T>> {
        let mut outcomes = Vec::new();
        while let Ok(outcome) = self.result_receiver.try_recv() {
            outcomes.push(outcome);
        }
        self.outstanding -= outcomes.len();
        outcomes
    }

    /// Like [`Self::process_completed_tasks`], but waits up to `timeout` for the first
    /// outcome when none is ready.
    pub fn wait_for_completed(&mut self, timeout: Duration) -> Vec<TaskOutcome<T>> {
        if self.outstanding == 0 {
            return Vec::new();
        }
        let mut outcomes = match self.result_receiver.recv_timeout(timeout) {
            Ok(outcome) => vec![outcome],
            Err(RecvTimeoutError::Timeout) => return Vec::new(),
            Err(RecvTimeoutError::Disconnected) => {
                log::error!("Background worker is gone, {} tasks lost", self.outstanding);
                return Vec::new();
            }
        };
        while let Ok(outcome) = self.result_receiver.try_recv() {
            outcomes.push(outcome);
        }
        self.outstanding -= outcomes.len();
        outcomes
    }

    /// Tasks still waiting in the queue.
    pub fn queued_len(&self) -> usize {
        let (lock, _) = &*self.queue;
        lock_queue(lock).heap.len()
    }

    /// Tasks dequeued by the worker whose outcome has not been drained yet.
    pub fn in_flight(&self) -> usize {
        self.outstanding.saturating_sub(self.queued_len())
    }

    /// `true` when every published task has been drained or cancelled.
    pub fn is_idle(&self) -> bool {
        self.outstanding == 0
    }

    /// Closes the queue, discarding queued tasks, and joins the worker.
    pub fn shutdown(&mut self) {
        let Some(worker) = self.worker.take() else {
            return;
        };
        {
            let (lock, condvar) = &*self.queue;
            let mut state = lock_queue(lock);
            state.closed = true;
            state.heap.clear();
            condvar.notify_all();
        }
        if worker.join().is_err() {
            log::error!("Background worker terminated abnormally");
        }
        log::info!("Stopped background worker");
    }
}

impl<T: Task> Default for TaskManager<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Task> Drop for TaskManager<T> {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn worker_loop<T: Task>(queue: SharedQueue<T>, results: Sender<TaskOutcome<T>>) {
    let (lock, condvar) = &*queue;
    loop {
        let task = {
            let mut state = lock_queue(lock);
            loop {
                if state.closed {
                    return;
                }
                if let Some(queued) = state.heap.pop() {
                    break queued.task;
                }
                state = condvar
                    .wait(state)
                    .unwrap_or_else(PoisonError::into_inner);
            }
        };

        let key = task.key();
        let outcome = match panic::catch_unwind(AssertUnwindSafe(move || task.process())) {
            Ok(output) => TaskOutcome::Completed(output),
            Err(payload) => {
                let message = panic_message(payload.as_ref());
                log::error!("Task {} panicked: {}", key, message);
                TaskOutcome::Failed { key, message }
            }
        };

        if results.send(outcome).is_err() {
            return;
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        String::from("unknown panic payload")
    }
}
