// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

//! Simulated time: a controller that owns a virtual clock and a serial queue.

use std::cmp::Reverse;
use std::collections::BinaryHeap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;

use super::{Job, TaskQueue};
use crate::core::clocks::{Clock, SimulatedClock};

struct SimTask {
    due_us: i64,
    seq: u64,
    job: Job,
}

impl PartialEq for SimTask {
    fn eq(&self, other: &Self) -> bool {
        self.due_us == other.due_us && self.seq == other.seq
    }
}

impl Eq for SimTask {}

impl PartialOrd for SimTask {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for SimTask {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        (self.due_us, self.seq).cmp(&(other.due_us, other.seq))
    }
}

struct ControllerInner {
    clock: Arc<SimulatedClock>,
    tasks: Mutex<BinaryHeap<Reverse<SimTask>>>,
    seq: AtomicU64,
}

impl ControllerInner {
    fn submit(&self, due_us: i64, job: Job) {
        let task = SimTask {
            due_us,
            seq: self.seq.fetch_add(1, Ordering::Relaxed),
            job,
        };
        self.tasks.lock().push(Reverse(task));
    }
}

/// Deterministic scheduler for tests.
///
/// Owns a [`SimulatedClock`] and a serial queue bound to it. [`advance`]
/// moves virtual time forward, running every queued job whose due time is
/// reached, in due order with ties broken by submission order. Jobs may post
/// further jobs; those run within the same `advance` call when they come due.
///
/// [`advance`]: TimeController::advance
pub struct TimeController {
    inner: Arc<ControllerInner>,
}

impl TimeController {
    /// Create a controller whose clock starts at `start_ms` milliseconds.
    pub fn at_millis(start_ms: i64) -> Self {
        Self {
            inner: Arc::new(ControllerInner {
                clock: Arc::new(SimulatedClock::at_millis(start_ms)),
                tasks: Mutex::new(BinaryHeap::new()),
                seq: AtomicU64::new(0),
            }),
        }
    }

    /// The controller's clock.
    pub fn clock(&self) -> Arc<SimulatedClock> {
        Arc::clone(&self.inner.clock)
    }

    /// A serial queue driven by this controller.
    pub fn queue(&self) -> Arc<SimulatedQueue> {
        Arc::new(SimulatedQueue {
            inner: Arc::clone(&self.inner),
        })
    }

    /// Advance virtual time by `delta`, running all work that comes due.
    ///
    /// `advance(Duration::ZERO)` drains everything already due, which is how
    /// tests flush queues without moving the clock.
    pub fn advance(&self, delta: Duration) {
        let target_us = self.inner.clock.now_us() + delta.as_micros() as i64;
        loop {
            let next = {
                let mut tasks = self.inner.tasks.lock();
                match tasks.peek() {
                    Some(Reverse(task)) if task.due_us <= target_us => tasks.pop(),
                    _ => None,
                }
            };
            let Some(Reverse(task)) = next else { break };
            self.inner.clock.set_us(task.due_us);
            (task.job)();
        }
        self.inner.clock.set_us(target_us);
    }
}

/// Serial queue whose jobs run inside [`TimeController::advance`].
pub struct SimulatedQueue {
    inner: Arc<ControllerInner>,
}

impl TaskQueue for SimulatedQueue {
    fn post(&self, job: Job) {
        self.inner.submit(self.inner.clock.now_us(), job);
    }

    fn post_delayed(&self, delay: Duration, job: Job) {
        let due_us = self.inner.clock.now_us() + delay.as_micros() as i64;
        self.inner.submit(due_us, job);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::clocks::Clock;

    fn record(log: &Arc<Mutex<Vec<&'static str>>>, tag: &'static str) -> Job {
        let log = Arc::clone(log);
        Box::new(move || log.lock().push(tag))
    }

    #[test]
    fn test_posted_jobs_run_in_fifo_order() {
        let controller = TimeController::at_millis(0);
        let queue = controller.queue();
        let log = Arc::new(Mutex::new(Vec::new()));
        queue.post(record(&log, "a"));
        queue.post(record(&log, "b"));
        queue.post(record(&log, "c"));
        assert!(log.lock().is_empty());

        controller.advance(Duration::ZERO);
        assert_eq!(*log.lock(), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_delayed_jobs_wait_for_their_due_time() {
        let controller = TimeController::at_millis(0);
        let queue = controller.queue();
        let log = Arc::new(Mutex::new(Vec::new()));
        queue.post_delayed(Duration::from_millis(100), record(&log, "late"));
        queue.post_delayed(Duration::from_millis(10), record(&log, "early"));

        controller.advance(Duration::from_millis(50));
        assert_eq!(*log.lock(), vec!["early"]);

        controller.advance(Duration::from_millis(50));
        assert_eq!(*log.lock(), vec!["early", "late"]);
    }

    #[test]
    fn test_clock_reads_due_time_inside_job() {
        let controller = TimeController::at_millis(0);
        let queue = controller.queue();
        let clock = controller.clock();
        let observed = Arc::new(Mutex::new(0i64));
        let observed_in_job = Arc::clone(&observed);
        let job_clock = Arc::clone(&clock);
        queue.post_delayed(
            Duration::from_millis(250),
            Box::new(move || {
                *observed_in_job.lock() = job_clock.now_ms();
            }),
        );
        controller.advance(Duration::from_secs(1));
        assert_eq!(*observed.lock(), 250);
        assert_eq!(clock.now_ms(), 1_000);
    }

    #[test]
    fn test_jobs_posted_by_jobs_run_in_same_advance() {
        let controller = TimeController::at_millis(0);
        let queue = controller.queue();
        let log = Arc::new(Mutex::new(Vec::new()));
        let chained = record(&log, "chained");
        let repost_queue = controller.queue();
        queue.post(Box::new(move || {
            repost_queue.post(chained);
        }));
        controller.advance(Duration::ZERO);
        assert_eq!(*log.lock(), vec!["chained"]);
    }
}
