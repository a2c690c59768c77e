//! Robot base common library
//!
//! Shared types for the robot base firmware crates: the Error/Fault
//! register bit layouts, the digital fault-line layout, the host telemetry
//! frames and the monitor configuration.
//!
//! # Module Structure
//!
//! - [`config`] - TOML configuration loading traits and types
//! - [`consts`] - Compile-time thresholds and defaults
//! - [`monitor`] - Safety flags, monitor configuration and telemetry frames
//! - [`prelude`] - Common re-exports for convenience
//!
//! # Usage
//!
//! ```rust
//! use robobase_common::prelude::*;
//!
//! let errors = ErrorFlags::EXTERNAL_STOP | ErrorFlags::hall_sensor(2);
//! assert!(!errors.is_empty());
//! ```

pub mod config;
pub mod consts;
pub mod monitor;
pub mod prelude;
