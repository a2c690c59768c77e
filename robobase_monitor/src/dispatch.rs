//! Interrupt dispatch.
//!
//! Each hardware interrupt becomes an [`event::InterruptEvent`]. Events are
//! either handled in place by the ISR or posted to the [`queue::EventQueue`]
//! and drained by one scheduler entry point. Handler effects are looked up
//! in [`table`] rather than spelled out per handler.

pub mod event;
pub mod handlers;
pub mod queue;
pub mod table;
