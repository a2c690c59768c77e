//! ADC2 keep-alive countdown.
//!
//! The analog driver reloads the counter on every completed sample; each tick
//! steps it down. The step that would take it below zero reports
//! [`WatchdogStatus::Expired`] exactly once, after which the counter parks at
//! `-1` and reports [`WatchdogStatus::Exhausted`] until the next reload.

/// Outcome of one countdown step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatchdogStatus {
    /// Still counting; `remaining` ticks left.
    Alive { remaining: i32 },
    /// This tick ran out. Raise the timeout fault.
    Expired,
    /// Already expired on an earlier tick.
    Exhausted,
}

/// Step `counter` by one tick.
#[inline]
pub fn step(counter: &mut i32) -> WatchdogStatus {
    match *counter {
        c if c > 0 => {
            *counter = c - 1;
            WatchdogStatus::Alive { remaining: c - 1 }
        }
        0 => {
            *counter = -1;
            WatchdogStatus::Expired
        }
        _ => WatchdogStatus::Exhausted,
    }
}
