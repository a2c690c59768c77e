//! Safety module root.
//!
//! Guarded safety registers, the analog watchdog countdown, and the
//! error-clear evaluator.

pub mod clear;
pub mod registers;
pub mod watchdog;
