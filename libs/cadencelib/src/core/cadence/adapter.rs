// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

//! Frame cadence adapter.
//!
//! Sits between a frame producer and a frame consumer and regulates the
//! cadence with which frames reach the consumer. In passthrough mode every
//! frame is forwarded on the adapter's serial queue. In zero-hertz mode
//! (screenshare sources) the most recent frame is re-emitted at the source's
//! declared maximum rate whenever the producer goes idle, with timestamps
//! rewritten to follow wall-clock progression.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;

use super::rate_window::RateWindow;
use super::repeat_scheduler::RepeatScheduler;
use super::timestamps::repeated_frame;
use crate::core::clocks::Clock;
use crate::core::config::FeatureFlags;
use crate::core::frames::VideoFrame;
use crate::core::metrics::MetricsSink;
use crate::core::queue::TaskQueue;

/// Keys for the constraint telemetry recorded when zero-hertz mode sees its
/// first frame.
pub mod metric_keys {
    pub const EXISTS: &str = "Screenshare.FrameRateConstraints.Exists";
    pub const MIN_EXISTS: &str = "Screenshare.FrameRateConstraints.Min.Exists";
    pub const MIN_VALUE: &str = "Screenshare.FrameRateConstraints.Min.Value";
    pub const MAX_EXISTS: &str = "Screenshare.FrameRateConstraints.Max.Exists";
    pub const MAX_VALUE: &str = "Screenshare.FrameRateConstraints.Max.Value";
    pub const MIN_UNSET_MAX: &str = "Screenshare.FrameRateConstraints.MinUnset.Max";
    pub const MIN_LT_MAX_MIN: &str = "Screenshare.FrameRateConstraints.MinLessThanMax.Min";
    pub const MIN_LT_MAX_MAX: &str = "Screenshare.FrameRateConstraints.MinLessThanMax.Max";
    pub const SIXTY_MIN_PLUS_MAX_MINUS_ONE: &str =
        "Screenshare.FrameRateConstraints.60MinPlusMaxMinusOne";
}

/// Frame-rate bounds advertised by the producer.
///
/// The adapter uses `max_fps` to derive the zero-hertz repeat period and
/// records both bounds in telemetry. `min > max` is accepted as-is; the
/// telemetry keeps track of how often sources declare that.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SourceConstraints {
    pub min_fps: Option<f64>,
    pub max_fps: Option<f64>,
}

/// Operating mode of the adapter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CadenceMode {
    /// Forward every inbound frame, nothing else.
    Passthrough,
    /// Forward inbound frames and re-emit the latest one when idle.
    ZeroHertz,
}

/// Downstream consumer of the adapter.
pub trait CadenceCallback: Send {
    /// A frame delivery. `post_time_us` is the queue-side delivery time,
    /// `frames_scheduled` the number of producer frames posted but not yet
    /// delivered, including this one (repeats report the counter without
    /// incrementing it).
    fn on_frame(&mut self, post_time_us: i64, frames_scheduled: usize, frame: VideoFrame);

    /// The producer discarded a frame before handing it over.
    fn on_discarded_frame(&mut self);
}

struct State {
    callback: Option<Arc<Mutex<dyn CadenceCallback>>>,
    mode: CadenceMode,
    constraints: Option<SourceConstraints>,
    latest_frame: Option<VideoFrame>,
    original_arrival_time_us: i64,
    input_rate: RateWindow,
    telemetry_pending: bool,
}

impl State {
    /// Zero-hertz repeat period, when a usable `max_fps` is known.
    fn repeat_period_us(&self) -> Option<i64> {
        let max_fps = self.constraints.as_ref()?.max_fps?;
        if max_fps <= 0.0 {
            return None;
        }
        let period_us = (1_000_000.0 / max_fps).round() as i64;
        (period_us > 0).then_some(period_us)
    }
}

struct Inner {
    clock: Arc<dyn Clock>,
    queue: Arc<dyn TaskQueue>,
    flags: Arc<dyn FeatureFlags>,
    metrics: Arc<dyn MetricsSink>,
    repeat: RepeatScheduler,
    frames_scheduled: AtomicUsize,
    state: Mutex<State>,
}

/// Single-input single-output cadence regulator.
///
/// Construction binds the adapter to a clock and a serial work queue. All
/// state lives behind that queue: [`on_frame`] may be called from any thread
/// and only posts a job; every other operation must be called from the queue
/// context, the same discipline the rest of the pipeline follows.
///
/// [`on_frame`]: FrameCadenceAdapter::on_frame
pub struct FrameCadenceAdapter {
    inner: Arc<Inner>,
}

impl FrameCadenceAdapter {
    pub fn new(
        clock: Arc<dyn Clock>,
        queue: Arc<dyn TaskQueue>,
        flags: Arc<dyn FeatureFlags>,
        metrics: Arc<dyn MetricsSink>,
    ) -> Self {
        tracing::debug!("cadence adapter created on {}", clock.description());
        Self {
            inner: Arc::new(Inner {
                clock,
                queue: Arc::clone(&queue),
                flags,
                metrics,
                repeat: RepeatScheduler::new(queue),
                frames_scheduled: AtomicUsize::new(0),
                state: Mutex::new(State {
                    callback: None,
                    mode: CadenceMode::Passthrough,
                    constraints: None,
                    latest_frame: None,
                    original_arrival_time_us: 0,
                    input_rate: RateWindow::per_second(),
                    telemetry_pending: false,
                }),
            }),
        }
    }

    /// Bind the downstream consumer. Called once, before the first frame.
    pub fn initialize(&self, callback: Arc<Mutex<dyn CadenceCallback>>) {
        self.inner.state.lock().callback = Some(callback);
    }

    /// Hand a produced frame to the adapter. Callable from any thread.
    pub fn on_frame(&self, frame: VideoFrame) {
        self.inner.frames_scheduled.fetch_add(1, Ordering::AcqRel);
        let weak = Arc::downgrade(&self.inner);
        self.inner.queue.post(Box::new(move || {
            if let Some(inner) = weak.upgrade() {
                Inner::process_frame(&inner, frame);
            }
        }));
    }

    /// Tell the consumer the producer dropped a frame.
    pub fn on_discarded_frame(&self) {
        let callback = self.inner.state.lock().callback.clone();
        if let Some(callback) = callback {
            callback.lock().on_discarded_frame();
        }
    }

    /// Replace the producer's declared frame-rate bounds.
    pub fn on_constraints_changed(&self, constraints: SourceConstraints) {
        let inner = &self.inner;
        let mut state = inner.state.lock();
        let old_max = state.constraints.as_ref().and_then(|c| c.max_fps);
        tracing::debug!(?constraints, "source constraints changed");
        state.constraints = Some(constraints);

        if state.mode == CadenceMode::ZeroHertz && old_max != constraints.max_fps {
            inner.repeat.cancel();
            if state.latest_frame.is_some() {
                if let Some(period_us) = state.repeat_period_us() {
                    Inner::schedule_repeat(inner, state.original_arrival_time_us, period_us);
                }
            }
        }
    }

    /// Switch between passthrough and zero-hertz cadence.
    ///
    /// Enabling is a no-op while the zero-hertz feature flag is off.
    pub fn set_zero_hertz_mode_enabled(&self, enabled: bool) {
        let inner = &self.inner;
        let mut state = inner.state.lock();
        if enabled {
            if !inner.flags.zero_hertz_enabled() {
                tracing::debug!("zero-hertz cadence requested but the feature flag is off");
                return;
            }
            if state.mode != CadenceMode::ZeroHertz {
                state.mode = CadenceMode::ZeroHertz;
                state.telemetry_pending = true;
                tracing::debug!("zero-hertz cadence enabled");
                if state.latest_frame.is_some() {
                    if let Some(period_us) = state.repeat_period_us() {
                        Inner::schedule_repeat(inner, state.original_arrival_time_us, period_us);
                    }
                }
            }
        } else if state.mode != CadenceMode::Passthrough {
            state.mode = CadenceMode::Passthrough;
            inner.repeat.cancel();
            tracing::debug!("zero-hertz cadence disabled, passthrough");
        }
    }

    /// Consumer tick hook.
    ///
    /// Input-rate samples are taken as frames arrive and zero-hertz reads
    /// derive from the configured maximum at read time, so there is nothing
    /// to refresh; the hook exists so consumers can drive future estimators
    /// without a contract change.
    pub fn update_frame_rate(&self) {}

    /// The rate the consumer should assume the input runs at.
    ///
    /// Zero-hertz mode pins this to the declared `max_fps` regardless of the
    /// observed producer cadence; otherwise it is the sliding-window
    /// estimate, 0 while the window is empty.
    pub fn input_frame_rate_fps(&self) -> u32 {
        let state = self.inner.state.lock();
        if state.mode == CadenceMode::ZeroHertz {
            if let Some(max_fps) = state.constraints.as_ref().and_then(|c| c.max_fps) {
                return max_fps.ceil() as u32;
            }
        }
        state.input_rate.rate(self.inner.clock.now_ms()).unwrap_or(0)
    }

    /// Producer frames posted but not yet delivered.
    pub fn frames_scheduled_for_processing(&self) -> usize {
        self.inner.frames_scheduled.load(Ordering::Acquire)
    }

    /// Current operating mode.
    pub fn mode(&self) -> CadenceMode {
        self.inner.state.lock().mode
    }
}

impl Drop for FrameCadenceAdapter {
    fn drop(&mut self) {
        self.inner.repeat.cancel();
        self.inner.state.lock().latest_frame = None;
        tracing::trace!("cadence adapter torn down");
    }
}

impl Inner {
    /// Queue-side half of `on_frame`.
    fn process_frame(inner: &Arc<Inner>, frame: VideoFrame) {
        let now_us = inner.clock.now_us();
        let callback = {
            let mut state = inner.state.lock();
            state.input_rate.update(inner.clock.now_ms());

            if state.mode == CadenceMode::ZeroHertz
                && state.telemetry_pending
                && state.callback.is_some()
            {
                state.telemetry_pending = false;
                report_constraints(inner.metrics.as_ref(), state.constraints.as_ref());
            }

            state.original_arrival_time_us = now_us;
            state.latest_frame = Some(frame.clone());

            inner.repeat.cancel();
            if state.mode == CadenceMode::ZeroHertz {
                if let Some(period_us) = state.repeat_period_us() {
                    Inner::schedule_repeat(inner, now_us, period_us);
                }
            }
            state.callback.clone()
        };

        if let Some(callback) = callback {
            let scheduled = inner.frames_scheduled.load(Ordering::Acquire);
            callback.lock().on_frame(now_us, scheduled, frame);
        }
        inner.frames_scheduled.fetch_sub(1, Ordering::AcqRel);
    }

    /// Arm the repeat task for the next period boundary after now.
    ///
    /// Boundaries are counted from the latest frame's arrival, so a repeat
    /// that fires late does not shift the schedule.
    fn schedule_repeat(inner: &Arc<Inner>, arrival_us: i64, period_us: i64) {
        let now_us = inner.clock.now_us();
        let elapsed_us = now_us - arrival_us;
        let due_us = arrival_us + (elapsed_us / period_us + 1) * period_us;
        let delay = Duration::from_micros((due_us - now_us).max(0) as u64);
        tracing::trace!(due_us, "repeat scheduled");

        let weak = Arc::downgrade(inner);
        inner.repeat.schedule(delay, move || {
            if let Some(inner) = weak.upgrade() {
                Inner::process_repeat(&inner);
            }
        });
    }

    /// Repeat task body. Generation fencing already happened in the
    /// scheduler wrapper; everything here re-validates against live state.
    fn process_repeat(inner: &Arc<Inner>) {
        let now_us = inner.clock.now_us();
        let (callback, delivery) = {
            let state = inner.state.lock();
            if state.mode != CadenceMode::ZeroHertz {
                return;
            }
            let Some(original) = state.latest_frame.as_ref() else {
                return;
            };
            let Some(period_us) = state.repeat_period_us() else {
                return;
            };

            let elapsed_us = now_us - state.original_arrival_time_us;
            let repeat_index = (elapsed_us / period_us).max(1);
            let delivery = repeated_frame(original, repeat_index, period_us);

            Inner::schedule_repeat(inner, state.original_arrival_time_us, period_us);
            (state.callback.clone(), delivery)
        };

        if let Some(callback) = callback {
            let scheduled = inner.frames_scheduled.load(Ordering::Acquire);
            callback.lock().on_frame(now_us, scheduled, delivery);
        }
    }
}

/// Record the constraint telemetry for the first zero-hertz frame.
fn report_constraints(metrics: &dyn MetricsSink, constraints: Option<&SourceConstraints>) {
    let Some(constraints) = constraints else {
        metrics.record_enum(metric_keys::EXISTS, false);
        return;
    };

    metrics.record_enum(metric_keys::EXISTS, true);
    metrics.record_enum(metric_keys::MIN_EXISTS, constraints.min_fps.is_some());
    if let Some(min_fps) = constraints.min_fps {
        metrics.record_sample(metric_keys::MIN_VALUE, min_fps);
    }
    metrics.record_enum(metric_keys::MAX_EXISTS, constraints.max_fps.is_some());
    if let Some(max_fps) = constraints.max_fps {
        metrics.record_sample(metric_keys::MAX_VALUE, max_fps);
    }

    match (constraints.min_fps, constraints.max_fps) {
        (None, Some(max_fps)) => {
            metrics.record_sample(metric_keys::MIN_UNSET_MAX, max_fps);
        }
        (Some(min_fps), Some(max_fps)) => {
            if min_fps < max_fps {
                metrics.record_sample(metric_keys::MIN_LT_MAX_MIN, min_fps);
                metrics.record_sample(metric_keys::MIN_LT_MAX_MAX, max_fps);
            }
            metrics.record_sample(
                metric_keys::SIXTY_MIN_PLUS_MAX_MINUS_ONE,
                60.0 * min_fps + max_fps - 1.0,
            );
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::metrics::RecordingMetricsSink;

    #[test]
    fn test_report_without_constraints_records_only_absence() {
        let sink = RecordingMetricsSink::new();
        report_constraints(&sink, None);
        assert_eq!(sink.enums_for(metric_keys::EXISTS), vec![false]);
        assert!(sink.enums_for(metric_keys::MIN_EXISTS).is_empty());
        assert!(sink.enums_for(metric_keys::MAX_EXISTS).is_empty());
    }

    #[test]
    fn test_report_min_greater_than_max_skips_ordered_keys() {
        let sink = RecordingMetricsSink::new();
        report_constraints(
            &sink,
            Some(&SourceConstraints {
                min_fps: Some(5.0),
                max_fps: Some(4.0),
            }),
        );
        assert!(sink.samples_for(metric_keys::MIN_LT_MAX_MIN).is_empty());
        assert!(sink.samples_for(metric_keys::MIN_LT_MAX_MAX).is_empty());
        assert_eq!(
            sink.samples_for(metric_keys::SIXTY_MIN_PLUS_MAX_MINUS_ONE),
            vec![60.0 * 5.0 + 4.0 - 1.0]
        );
    }

    #[test]
    fn test_repeat_period_requires_positive_max() {
        let mut state = State {
            callback: None,
            mode: CadenceMode::ZeroHertz,
            constraints: None,
            latest_frame: None,
            original_arrival_time_us: 0,
            input_rate: RateWindow::per_second(),
            telemetry_pending: false,
        };
        assert_eq!(state.repeat_period_us(), None);

        state.constraints = Some(SourceConstraints {
            min_fps: Some(0.0),
            max_fps: Some(0.0),
        });
        assert_eq!(state.repeat_period_us(), None);

        state.constraints = Some(SourceConstraints {
            min_fps: Some(0.0),
            max_fps: Some(5.0),
        });
        assert_eq!(state.repeat_period_us(), Some(200_000));
    }
}
