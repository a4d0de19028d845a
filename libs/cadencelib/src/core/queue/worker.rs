// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

//! Dedicated-thread serial queue.

use std::cmp::Reverse;
use std::collections::BinaryHeap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use parking_lot::Mutex;

use super::{Job, TaskQueue};
use crate::core::error::Result;

struct TimedJob {
    due: Instant,
    seq: u64,
    job: Job,
}

impl PartialEq for TimedJob {
    fn eq(&self, other: &Self) -> bool {
        self.due == other.due && self.seq == other.seq
    }
}

impl Eq for TimedJob {}

impl PartialOrd for TimedJob {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for TimedJob {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        (self.due, self.seq).cmp(&(other.due, other.seq))
    }
}

/// Serial queue backed by one worker thread.
///
/// Jobs are timestamped at submission; the worker drains them in due order,
/// ties broken by submission order. Delayed jobs wait in a local heap so the
/// channel stays a plain FIFO. Dropping the queue signals shutdown and joins
/// the thread; jobs still waiting in the heap are abandoned.
pub struct WorkerQueue {
    tx: crossbeam_channel::Sender<TimedJob>,
    shutdown_tx: crossbeam_channel::Sender<()>,
    seq: AtomicU64,
    join: Mutex<Option<JoinHandle<()>>>,
    name: String,
}

impl WorkerQueue {
    /// Spawn the worker thread.
    pub fn spawn(name: &str) -> Result<Self> {
        let (tx, rx) = crossbeam_channel::unbounded::<TimedJob>();
        let (shutdown_tx, shutdown_rx) = crossbeam_channel::bounded::<()>(1);
        let thread_name = name.to_string();
        let join = std::thread::Builder::new()
            .name(thread_name.clone())
            .spawn(move || run_queue_loop(&thread_name, rx, shutdown_rx))?;

        Ok(Self {
            tx,
            shutdown_tx,
            seq: AtomicU64::new(0),
            join: Mutex::new(Some(join)),
            name: name.to_string(),
        })
    }

    fn submit(&self, due: Instant, job: Job) {
        let timed = TimedJob {
            due,
            seq: self.seq.fetch_add(1, Ordering::Relaxed),
            job,
        };
        if self.tx.send(timed).is_err() {
            tracing::warn!("[{}] Job posted after queue shutdown, dropping", self.name);
        }
    }
}

impl TaskQueue for WorkerQueue {
    fn post(&self, job: Job) {
        self.submit(Instant::now(), job);
    }

    fn post_delayed(&self, delay: Duration, job: Job) {
        self.submit(Instant::now() + delay, job);
    }
}

impl Drop for WorkerQueue {
    fn drop(&mut self) {
        let _ = self.shutdown_tx.send(());
        if let Some(join) = self.join.lock().take() {
            if join.join().is_err() {
                tracing::warn!("[{}] Queue thread panicked", self.name);
            }
        }
        tracing::debug!("[{}] Queue stopped", self.name);
    }
}

fn run_queue_loop(
    name: &str,
    rx: crossbeam_channel::Receiver<TimedJob>,
    shutdown_rx: crossbeam_channel::Receiver<()>,
) {
    tracing::debug!("[{}] Queue thread started", name);
    let mut pending: BinaryHeap<Reverse<TimedJob>> = BinaryHeap::new();

    loop {
        // Run everything that is due.
        loop {
            let due = matches!(pending.peek(), Some(Reverse(t)) if t.due <= Instant::now());
            if !due {
                break;
            }
            if let Some(Reverse(timed)) = pending.pop() {
                (timed.job)();
            }
        }

        let wait = pending
            .peek()
            .map(|Reverse(t)| t.due.saturating_duration_since(Instant::now()));

        match wait {
            Some(wait) => {
                crossbeam_channel::select! {
                    recv(shutdown_rx) -> _ => break,
                    recv(rx) -> msg => match msg {
                        Ok(timed) => pending.push(Reverse(timed)),
                        Err(_) => break,
                    },
                    default(wait) => {}
                }
            }
            None => {
                crossbeam_channel::select! {
                    recv(shutdown_rx) -> _ => break,
                    recv(rx) -> msg => match msg {
                        Ok(timed) => pending.push(Reverse(timed)),
                        Err(_) => break,
                    },
                }
            }
        }
    }

    tracing::debug!("[{}] Queue thread exiting, {} jobs abandoned", name, pending.len());
}
