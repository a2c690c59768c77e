//! # Robot Base Monitor
//!
//! Centralized fault/error monitor and periodic tick orchestrator for the
//! robot base controller.
//!
//! Every interrupt source (primary pulse, backup timer, digital fault lines,
//! motor drivers, analog samples) funnels into one [`CentralizedMonitor`].
//! It owns the Error and Fault registers plus the analog watchdog, halts
//! actuation whenever either register is non-zero, and runs the control
//! update exactly once per tick from whichever timing source is alive.
//!
//! ## Two-tier problem taxonomy
//!
//! - **Error**: recoverable. Released on host request once the live cause is
//!   gone.
//! - **Fault**: terminal until reset.
//!
//! ## No allocation after startup
//!
//! Registers, the event queue, heartbeats and statistics are fixed-size and
//! guarded by `critical_section`. Hardware is reached only through the
//! traits in [`hal`].
//!
//! ## Features
//!
//! - `sim` (default): the simulated board in `sim` and the `std`
//!   critical-section backend for host builds. Firmware disables default
//!   features and provides its own backend.

pub mod config;
pub mod cycle;
pub mod dispatch;
pub mod hal;
pub mod heartbeat;
pub mod monitor;
pub mod safety;
#[cfg(feature = "sim")]
pub mod sim;

pub use monitor::{CentralizedMonitor, HealthSnapshot};
