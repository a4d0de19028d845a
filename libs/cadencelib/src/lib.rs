//! # cadencelib - Frame Cadence Adaptation for Real-Time Video Pipelines
//!
//! A single-input, single-output stage that sits between a frame producer
//! (camera, screen capture, synthetic source) and a frame consumer (encoder,
//! sink) and regulates the cadence with which frames are delivered,
//! independent of the cadence at which they arrive.
//!
//! ## Modes
//!
//! - **Passthrough**: every inbound frame is forwarded on the adapter's
//!   serial work queue, annotated with the number of frames still awaiting
//!   delivery. A sliding-window input-rate estimate is maintained.
//! - **Zero-hertz** (screenshare sources): inbound frames are forwarded, and
//!   when the producer goes idle the most recent frame is re-emitted at the
//!   source's declared maximum rate so downstream encoders keep making
//!   progress. Timestamps on repeats advance with wall-clock time; the
//!   reported input rate is pinned to the declared maximum.
//!
//! ## Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use cadencelib::prelude::*;
//!
//! let clock = Arc::new(SoftwareClock::new());
//! let queue = Arc::new(WorkerQueue::spawn("cadence")?);
//! let adapter = FrameCadenceAdapter::new(
//!     clock,
//!     queue,
//!     Arc::new(CadenceConfig::default()),
//!     Arc::new(NullMetricsSink),
//! );
//! adapter.initialize(encoder_callback);
//! adapter.set_zero_hertz_mode_enabled(true);
//! adapter.on_frame(frame);
//! ```

pub mod core;

// Re-export core types at crate root
pub use crate::core::{
    metric_keys, CadenceCallback, CadenceConfig, CadenceError, CadenceMode, Clock,
    FeatureFlags, FrameCadenceAdapter, Job, MetricsSink, NullMetricsSink, PixelBuffer,
    PixelFormat, RateWindow, RecordingMetricsSink, Result, SimulatedClock, SimulatedQueue,
    SoftwareClock, SourceConstraints, TaskQueue, TimeController, TracingMetricsSink,
    VideoFrame, VideoRotation, WorkerQueue, FRAME_RATE_AVERAGING_WINDOW_MS,
    NTP_UNIX_EPOCH_OFFSET_MS,
};

pub use crate::core::prelude;
