//! Blinking liveness indicators.

use core::cell::Cell;

use critical_section::Mutex;

/// Counts calls and toggles one motor LED: on at `period / 2`, off at
/// `period`.
pub struct Heartbeat {
    motor: usize,
    period: u32,
    count: Mutex<Cell<u32>>,
}

impl Heartbeat {
    /// `motor` is 1-based.
    pub const fn new(motor: usize, period: u32) -> Self {
        Self {
            motor,
            period,
            count: Mutex::new(Cell::new(0)),
        }
    }

    #[inline]
    pub const fn motor(&self) -> usize {
        self.motor
    }

    /// Advance one step. Returns the new LED state on a toggle.
    pub fn beat(&self) -> Option<bool> {
        critical_section::with(|cs| {
            let cell = self.count.borrow(cs);
            let count = cell.get() + 1;
            if count >= self.period {
                cell.set(0);
                Some(false)
            } else {
                cell.set(count);
                (count == self.period / 2).then_some(true)
            }
        })
    }
}
