
use std::time::Duration;

/// Offset between the NTP epoch (Jan 1 1900) and the Unix epoch (Jan 1 1970).
pub const NTP_UNIX_EPOCH_OFFSET_MS: i64 = 2_208_988_800_000;

pub trait Clock: Send + Sync {
    fn now_us(&self) -> i64;

    fn now_ms(&self) -> i64 {
        self.now_us() / 1_000
    }

    fn now_ntp_ms(&self) -> i64 {
        self.now_ms() + NTP_UNIX_EPOCH_OFFSET_MS
    }

    fn now(&self) -> Duration {
        Duration::from_micros(self.now_us() as u64)
    }

    fn description(&self) -> &str;
}
