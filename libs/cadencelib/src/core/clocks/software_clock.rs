//! Software clock using CPU timestamps
//!
//! Production clock when no injected time source is available.

use super::Clock;
use std::time::{Instant, SystemTime, UNIX_EPOCH};

/// Software clock using CPU timestamps
///
/// Uses `Instant::now()` for monotonic progression, anchored to the system
/// time captured at construction so readings are wall-clock microseconds.
///
/// ## Characteristics
///
/// - **Accuracy**: Millisecond-level (OS scheduler dependent)
/// - **Drift**: Can drift vs. hardware clocks
/// - **Use cases**: Production pipelines, development
pub struct SoftwareClock {
    start_time: Instant,
    start_timestamp_us: i64,
    description: String,
}

impl SoftwareClock {
    /// Create a new software clock anchored to the current wall-clock time.
    pub fn new() -> Self {
        Self::with_description("Software Clock".to_string())
    }

    /// Create a new software clock with custom description
    pub fn with_description(description: String) -> Self {
        let start_time = Instant::now();
        let start_timestamp_us = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_micros() as i64;

        Self {
            start_time,
            start_timestamp_us,
            description,
        }
    }
}

impl Default for SoftwareClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SoftwareClock {
    fn now_us(&self) -> i64 {
        let elapsed = self.start_time.elapsed().as_micros() as i64;
        self.start_timestamp_us + elapsed
    }

    fn description(&self) -> &str {
        &self.description
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;
    use std::time::Duration;

    #[test]
    fn test_software_clock_now() {
        let clock = SoftwareClock::new();
        let t1 = clock.now_us();

        thread::sleep(Duration::from_millis(10));

        let t2 = clock.now_us();
        assert!(t2 > t1, "Time should increase");
        assert!(t2 - t1 >= 10_000, "Should be at least 10ms");
    }

    #[test]
    fn test_software_clock_monotonic() {
        let clock = SoftwareClock::new();
        let mut last_time = clock.now_us();

        for _ in 0..100 {
            let current_time = clock.now_us();
            assert!(current_time >= last_time, "Time must be monotonic");
            last_time = current_time;
        }
    }

    #[test]
    fn test_ntp_reading_is_offset_from_wall_clock() {
        let clock = SoftwareClock::new();
        assert_eq!(
            clock.now_ntp_ms() - clock.now_ms(),
            super::super::NTP_UNIX_EPOCH_OFFSET_MS
        );
    }

    #[test]
    fn test_clock_descriptions() {
        let clock = SoftwareClock::new();
        assert_eq!(clock.description(), "Software Clock");

        let custom = SoftwareClock::with_description("Custom Clock".to_string());
        assert_eq!(custom.description(), "Custom Clock");
    }
}
