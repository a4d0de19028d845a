// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

//! Sliding-window frame-rate estimator.

use std::collections::VecDeque;

/// Averaging window used for the adapter's input-rate estimate.
pub const FRAME_RATE_AVERAGING_WINDOW_MS: i64 = 1_000;

struct Bucket {
    timestamp_ms: i64,
    count: u64,
}

/// Sliding-window rate estimator with millisecond resolution.
///
/// Events are bucketed per millisecond. The estimate divides the event count
/// inside the window by the *active* window: the span since the first event,
/// saturated at the configured window size. Until the window has either
/// filled once or seen more than one event, no estimate is reported.
pub struct RateWindow {
    window_ms: i64,
    scale: i64,
    buckets: VecDeque<Bucket>,
    accumulated: u64,
    first_timestamp_ms: Option<i64>,
}

impl RateWindow {
    /// `window_ms` is the averaging window, `scale` the unit (1000 for
    /// events per second).
    pub fn new(window_ms: i64, scale: i64) -> Self {
        Self {
            window_ms,
            scale,
            buckets: VecDeque::new(),
            accumulated: 0,
            first_timestamp_ms: None,
        }
    }

    /// Estimator with the adapter's standard parameters.
    pub fn per_second() -> Self {
        Self::new(FRAME_RATE_AVERAGING_WINDOW_MS, 1_000)
    }

    /// Record one event at `now_ms`.
    ///
    /// A reading earlier than the latest recorded event is clamped forward;
    /// the estimator degrades rather than corrupting its history when the
    /// clock misbehaves.
    pub fn update(&mut self, now_ms: i64) {
        let mut now_ms = now_ms;
        if let Some(back) = self.buckets.back() {
            if now_ms < back.timestamp_ms {
                now_ms = back.timestamp_ms;
            }
        }
        self.first_timestamp_ms.get_or_insert(now_ms);
        match self.buckets.back_mut() {
            Some(back) if back.timestamp_ms == now_ms => back.count += 1,
            _ => self.buckets.push_back(Bucket {
                timestamp_ms: now_ms,
                count: 1,
            }),
        }
        self.accumulated += 1;
        self.prune(now_ms);
    }

    /// Events in `(now_ms - window, now_ms]` scaled to per-unit, rounded to
    /// nearest. `None` while the estimator has nothing meaningful to report.
    pub fn rate(&self, now_ms: i64) -> Option<u32> {
        let first = self.first_timestamp_ms?;
        let active_window_ms = (now_ms - first + 1).min(self.window_ms);

        let mut count: u64 = 0;
        for bucket in self.buckets.iter().rev() {
            if bucket.timestamp_ms <= now_ms - self.window_ms {
                break;
            }
            if bucket.timestamp_ms <= now_ms {
                count += bucket.count;
            }
        }

        if count == 0
            || active_window_ms <= 1
            || (count == 1 && active_window_ms < self.window_ms)
        {
            return None;
        }

        let rate = count as f64 * self.scale as f64 / active_window_ms as f64;
        Some((rate + 0.5) as u32)
    }

    fn prune(&mut self, now_ms: i64) {
        while let Some(front) = self.buckets.front() {
            if front.timestamp_ms > now_ms - self.window_ms {
                break;
            }
            self.accumulated -= front.count;
            self.buckets.pop_front();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_window_reports_nothing() {
        let window = RateWindow::per_second();
        assert_eq!(window.rate(0), None);
        assert_eq!(window.rate(10_000), None);
    }

    #[test]
    fn test_single_event_reports_nothing_before_window_fills() {
        let mut window = RateWindow::per_second();
        window.update(0);
        assert_eq!(window.rate(10), None);
        // One event spread over a full window is 1 per second.
        assert_eq!(window.rate(999), Some(1));
    }

    #[test]
    fn test_steady_cadence_matches_expected_rate() {
        let mut window = RateWindow::per_second();
        // 100 fps: one event every 10 ms.
        let mut now = 0;
        for _ in 0..200 {
            window.update(now);
            now += 10;
        }
        let now = now - 10;
        assert_eq!(window.rate(now), Some(100));
    }

    #[test]
    fn test_rate_ramps_while_window_fills() {
        let mut window = RateWindow::per_second();
        for i in 0..5 {
            window.update(i * 10);
        }
        // 5 events over 41 ms of active window.
        assert_eq!(window.rate(40), Some((5.0 * 1000.0 / 41.0 + 0.5) as u32));
    }

    #[test]
    fn test_old_events_fall_out_of_the_window() {
        let mut window = RateWindow::per_second();
        window.update(0);
        window.update(10);
        window.update(2_000);
        window.update(2_500);
        // Only the two recent events are inside (1500, 2500].
        assert_eq!(window.rate(2_500), Some(2));
    }

    #[test]
    fn test_idle_stream_decays_to_nothing() {
        let mut window = RateWindow::per_second();
        for i in 0..10 {
            window.update(i * 100);
        }
        assert!(window.rate(900).is_some());
        assert_eq!(window.rate(5_000), None);
    }

    #[test]
    fn test_non_monotone_update_is_clamped() {
        let mut window = RateWindow::per_second();
        window.update(500);
        window.update(400);
        // Both events land at 500 ms: 2 events over 500 ms of active window.
        assert_eq!(window.rate(999), Some(4));
    }
}
