// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

//! One-shot, cancelable, rearming delayed task.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crate::core::queue::TaskQueue;

/// Single-slot delayed task with generation fencing.
///
/// At most one scheduled action is live at a time: [`schedule`] supersedes
/// any earlier one, [`cancel`] kills the live one. Each schedule bumps a
/// generation counter; the posted closure re-checks the counter before
/// running, so a task that was already dequeued when it was superseded
/// returns without side effects. Because checks and state mutation share one
/// serial queue, a canceled action either already started or never will.
///
/// [`schedule`]: RepeatScheduler::schedule
/// [`cancel`]: RepeatScheduler::cancel
pub(crate) struct RepeatScheduler {
    queue: Arc<dyn TaskQueue>,
    generation: Arc<AtomicU64>,
}

impl RepeatScheduler {
    pub fn new(queue: Arc<dyn TaskQueue>) -> Self {
        Self {
            queue,
            generation: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Schedule `action` to run after `delay`, superseding any live action.
    pub fn schedule<F>(&self, delay: Duration, action: F)
    where
        F: FnOnce() + Send + 'static,
    {
        let token = self.generation.fetch_add(1, Ordering::AcqRel) + 1;
        let generation = Arc::clone(&self.generation);
        self.queue.post_delayed(
            delay,
            Box::new(move || {
                if generation.load(Ordering::Acquire) != token {
                    tracing::trace!("repeat task superseded, skipping");
                    return;
                }
                action();
            }),
        );
    }

    /// Guarantee the live action, if any, either already started or never
    /// starts.
    pub fn cancel(&self) {
        self.generation.fetch_add(1, Ordering::AcqRel);
    }
}
