//! Periodic tick orchestration.
//!
//! [`CentralizedMonitor::do_periodic_common_work`] runs once per tick from
//! whichever timing source fired. Order within a tick:
//!
//! 1. heartbeat LED
//! 2. analog watchdog step
//! 3. control update (healthy) or parameter flush + conditional clear (halted)
//! 4. elapsed-cycle capture and status/motion telemetry
//!
//! Tick statistics are O(1) and allocation-free.

use robobase_common::consts::PERFORMANCE_COUNTER_CEILING;
use robobase_common::monitor::flags::FaultFlags;
use robobase_common::monitor::telemetry::StatusFrame;
use tracing::{debug, info};

use crate::hal::{ActuatorController, Board, Indicators, PerformanceCounter, SharedState, TelemetrySink};
use crate::monitor::CentralizedMonitor;
use crate::safety::watchdog::WatchdogStatus;

// ─── Statistics ────────────────────────────────────────────────────

/// Tick timing statistics, in performance-counter cycles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickStats {
    /// Total ticks executed.
    pub tick_count: u64,
    /// Ticks that ran with a problem active.
    pub halted_ticks: u64,
    pub last_cycles: u64,
    pub min_cycles: u64,
    pub max_cycles: u64,
    /// Running sum for average computation.
    pub sum_cycles: u128,
    /// Ticks whose duration did not fit the 16-bit telemetry field.
    pub saturated: u64,
}

impl TickStats {
    pub const fn new() -> Self {
        Self {
            tick_count: 0,
            halted_ticks: 0,
            last_cycles: 0,
            min_cycles: u64::MAX,
            max_cycles: 0,
            sum_cycles: 0,
            saturated: 0,
        }
    }

    /// Record one tick.
    #[inline]
    pub fn record(&mut self, cycles: u64, halted: bool) {
        self.tick_count += 1;
        if halted {
            self.halted_ticks += 1;
        }
        self.last_cycles = cycles;
        self.min_cycles = self.min_cycles.min(cycles);
        self.max_cycles = self.max_cycles.max(cycles);
        self.sum_cycles += u128::from(cycles);
        if cycles > u64::from(PERFORMANCE_COUNTER_CEILING) {
            self.saturated += 1;
        }
    }

    /// Average tick cost (0 if no ticks).
    #[inline]
    pub fn avg_cycles(&self) -> u64 {
        if self.tick_count == 0 {
            0
        } else {
            (self.sum_cycles / u128::from(self.tick_count)) as u64
        }
    }
}

impl Default for TickStats {
    fn default() -> Self {
        Self::new()
    }
}

/// Clamp an elapsed-cycle count to the 16-bit telemetry field.
#[inline]
pub fn saturate_counter(cycles: u64) -> u16 {
    u16::try_from(cycles).unwrap_or(PERFORMANCE_COUNTER_CEILING)
}

// ─── Tick ──────────────────────────────────────────────────────────

/// What the control section of a tick did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickMode {
    /// Both controllers were updated.
    Normal { parameters_changed: bool },
    /// A problem was active: parameters flushed, controllers left stopped.
    Halted { clear_requested: bool },
}

/// Result of one tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickReport {
    pub watchdog: WatchdogStatus,
    pub mode: TickMode,
    /// Value placed in the motion frame.
    pub performance_counter: u16,
}

impl<B: Board> CentralizedMonitor<B> {
    /// One tick of common work. Called from both timing sources.
    pub fn do_periodic_common_work(&self) -> TickReport {
        let board = &self.board;
        board.perf().begin_section();

        if let Some(on) = self.tick_heartbeat.beat() {
            board.leds().set_motor_enabled(self.tick_heartbeat.motor(), on);
        }

        let watchdog = self.registers.step_watchdog();
        if watchdog == WatchdogStatus::Expired {
            self.set_fault_flags(FaultFlags::ADC2_TIMEOUT);
        }

        let mode = if self.is_any_problem_occurred() {
            board.shared().clear_parameters();
            let clear_requested = board.shared().is_clear_error_flags_requested();
            if clear_requested {
                info!("host requested error clear");
                self.clear_error_flags();
            }
            TickMode::Halted { clear_requested }
        } else {
            let parameters_changed = board.shared().update_parameters();
            board.wheel().update(parameters_changed);
            board.dribble().update(parameters_changed);
            if parameters_changed {
                debug!("new control parameters");
            }
            TickMode::Normal { parameters_changed }
        };

        let cycles = board.perf().end_section();
        let performance_counter = saturate_counter(cycles);
        self.record_tick(cycles, matches!(mode, TickMode::Halted { .. }));

        let state = self.registers.snapshot();
        board
            .telemetry()
            .transmit_status(&StatusFrame::new(state.errors, state.faults));
        board.telemetry().transmit_motion(performance_counter);

        TickReport {
            watchdog,
            mode,
            performance_counter,
        }
    }
}
