// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

//! Convenience re-exports for adapter consumers.

pub use crate::core::cadence::{
    CadenceCallback, CadenceMode, FrameCadenceAdapter, SourceConstraints,
};
pub use crate::core::clocks::{Clock, SoftwareClock};
pub use crate::core::config::{CadenceConfig, FeatureFlags};
pub use crate::core::error::{CadenceError, Result};
pub use crate::core::frames::{PixelBuffer, PixelFormat, VideoFrame, VideoRotation};
pub use crate::core::metrics::{MetricsSink, NullMetricsSink};
pub use crate::core::queue::{TaskQueue, WorkerQueue};
