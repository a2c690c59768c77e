//! Prelude module for common re-exports.
//!
//! ```rust
//! use robobase_common::prelude::*;
//! ```

// ─── Configuration ──────────────────────────────────────────────────
pub use crate::config::{ConfigError, ConfigLoader, LogLevel, SharedConfig};
pub use crate::monitor::config::MonitorConfig;

// ─── System Constants ───────────────────────────────────────────────
pub use crate::consts::{MOTOR_COUNT, TICK_PERIOD_US};

// ─── Safety Registers ───────────────────────────────────────────────
pub use crate::monitor::flags::{ErrorFlags, FaultFlags, FaultLines};

// ─── Telemetry ──────────────────────────────────────────────────────
pub use crate::monitor::telemetry::{
    AnalogFrame, FrameError, MotionFrame, StatusFrame, StreamFrame, StreamId,
};
