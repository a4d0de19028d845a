//! cadencelib core: frame cadence regulation primitives
//!
//! This module defines the cadence adapter and the capability ports it
//! consumes (clock, serial work queue, feature flags, metrics sink). The
//! ports are traits so a deterministic time controller can stand in for the
//! real thing under test.

pub mod cadence;
pub mod clocks;
pub mod config;
pub mod error;
pub mod frames;
pub mod metrics;
pub mod prelude;
pub mod queue;

// Re-export core types
pub use cadence::{
    metric_keys, CadenceCallback, CadenceMode, FrameCadenceAdapter, RateWindow,
    SourceConstraints, FRAME_RATE_AVERAGING_WINDOW_MS,
};
pub use clocks::{Clock, SimulatedClock, SoftwareClock, NTP_UNIX_EPOCH_OFFSET_MS};
pub use config::{CadenceConfig, FeatureFlags};
pub use error::{CadenceError, Result};
pub use frames::{PixelBuffer, PixelFormat, VideoFrame, VideoRotation};
pub use metrics::{MetricsSink, NullMetricsSink, RecordingMetricsSink, TracingMetricsSink};
pub use queue::{Job, SimulatedQueue, TaskQueue, TimeController, WorkerQueue};
