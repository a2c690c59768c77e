//! Error/Fault registers and the ADC2 watchdog counter.
//!
//! All three live in one [`RegisterState`] behind a
//! `critical_section::Mutex`, so every read-modify-write excludes every
//! interrupt source. Mutations are either monotonic OR or a single-writer
//! countdown, which makes any interleaving of guarded sections commute.
//!
//! The raw state never leaves the guard by reference; callers get copies.

use core::cell::Cell;

use critical_section::Mutex;
use robobase_common::monitor::flags::{ErrorFlags, FaultFlags};

use super::watchdog::{self, WatchdogStatus};

/// Copy of the guarded state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegisterState {
    pub errors: ErrorFlags,
    pub faults: FaultFlags,
    /// Ticks left before the analog timeout; negative once expired.
    pub adc2_countdown: i32,
}

impl RegisterState {
    /// `true` if either register is non-zero.
    #[inline]
    pub const fn any_problem(&self) -> bool {
        !self.errors.is_empty() || !self.faults.is_empty()
    }
}

/// Register value before and after a guarded update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition<T> {
    pub previous: T,
    pub current: T,
}

impl<T: PartialEq> Transition<T> {
    #[inline]
    pub fn changed(&self) -> bool {
        self.previous != self.current
    }
}

/// Process-wide safety state.
pub struct SafetyRegisters {
    state: Mutex<Cell<RegisterState>>,
}

impl SafetyRegisters {
    /// Zeroed registers with the watchdog loaded to `adc2_threshold`.
    pub const fn new(adc2_threshold: i32) -> Self {
        Self {
            state: Mutex::new(Cell::new(RegisterState {
                errors: ErrorFlags::empty(),
                faults: FaultFlags::empty(),
                adc2_countdown: adc2_threshold,
            })),
        }
    }

    /// Run `f` on the state inside one critical section and write it back.
    #[inline]
    fn update<R>(&self, f: impl FnOnce(&mut RegisterState) -> R) -> R {
        critical_section::with(|cs| {
            let cell = self.state.borrow(cs);
            let mut state = cell.get();
            let r = f(&mut state);
            cell.set(state);
            r
        })
    }

    /// Guarded copy of the whole state.
    pub fn snapshot(&self) -> RegisterState {
        critical_section::with(|cs| self.state.borrow(cs).get())
    }

    #[inline]
    pub fn errors(&self) -> ErrorFlags {
        self.snapshot().errors
    }

    #[inline]
    pub fn faults(&self) -> FaultFlags {
        self.snapshot().faults
    }

    /// OR `mask` into the error register. `publish` runs inside the guard
    /// with the new value so the host mirror never lags a later update.
    pub fn set_errors(
        &self,
        mask: ErrorFlags,
        publish: impl FnOnce(ErrorFlags),
    ) -> Transition<ErrorFlags> {
        self.update(|s| {
            let previous = s.errors;
            s.errors |= mask;
            publish(s.errors);
            Transition {
                previous,
                current: s.errors,
            }
        })
    }

    /// OR `mask` into the fault register, publishing inside the guard.
    pub fn set_faults(
        &self,
        mask: FaultFlags,
        publish: impl FnOnce(FaultFlags),
    ) -> Transition<FaultFlags> {
        self.update(|s| {
            let previous = s.faults;
            s.faults |= mask;
            publish(s.faults);
            Transition {
                previous,
                current: s.faults,
            }
        })
    }

    /// Replace the error register with `evaluate(current)`.
    ///
    /// Only error bits can be released; the fault register is out of reach
    /// of this method by construction. `evaluate` must return a subset of its
    /// input.
    pub fn release_errors(
        &self,
        evaluate: impl FnOnce(ErrorFlags) -> ErrorFlags,
        publish: impl FnOnce(ErrorFlags),
    ) -> Transition<ErrorFlags> {
        self.update(|s| {
            let previous = s.errors;
            s.errors = previous & evaluate(previous);
            publish(s.errors);
            Transition {
                previous,
                current: s.errors,
            }
        })
    }

    /// Reload the watchdog countdown.
    pub fn reload_watchdog(&self, ticks: i32) {
        self.update(|s| s.adc2_countdown = ticks);
    }

    /// One tick of the watchdog countdown.
    pub fn step_watchdog(&self) -> WatchdogStatus {
        self.update(|s| watchdog::step(&mut s.adc2_countdown))
    }
}
