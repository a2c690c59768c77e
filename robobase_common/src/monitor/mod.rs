//! Centralized monitor shared types.
//!
//! Everything the fault monitor shares with the host link and with tooling
//! lives here: register bit layouts, configuration, and telemetry frames.

pub mod config;
pub mod flags;
pub mod telemetry;
