//! Centralized fault/error monitor.

use core::cell::Cell;

use critical_section::Mutex;
use robobase_common::config::ConfigError;
use robobase_common::monitor::config::MonitorConfig;
use robobase_common::monitor::flags::{ErrorFlags, FaultFlags, FaultLines};
use tracing::{info, warn};

use crate::cycle::TickStats;
use crate::dispatch::queue::EventQueue;
use crate::hal::{
    ActuatorController, AnalogFrontEnd, Board, DriverId, FaultLineBank, Indicators, MotorDriver,
    PerformanceCounter, PowerSwitches, SharedState, TimingSources,
};
use crate::heartbeat::Heartbeat;
use crate::safety::clear::{self, ClearOutcome, LiveSample};
use crate::safety::registers::SafetyRegisters;

/// Indicator toggled by the periodic tick.
const TICK_HEARTBEAT_MOTOR: usize = 5;
/// Indicator toggled by each analog sample.
const SAMPLE_HEARTBEAT_MOTOR: usize = 1;

/// Health summary for status queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HealthSnapshot {
    pub errors: ErrorFlags,
    pub faults: FaultFlags,
    pub adc2_countdown: i32,
    /// Running on the backup timer.
    pub degraded: bool,
    pub ticks: u64,
}

/// Owns the safety state and mediates every change to it.
///
/// Interrupt handlers, the periodic tick, and the analog driver all share one
/// instance by `&self`. The error register can be released through
/// [`clear_error_flags`](Self::clear_error_flags) once each cause has gone
/// away. The fault register has no clear path at all: once a fault bit is set
/// it stays set until the controller is reset.
pub struct CentralizedMonitor<B: Board> {
    pub(crate) board: B,
    pub(crate) config: MonitorConfig,
    pub(crate) registers: SafetyRegisters,
    pub(crate) queue: EventQueue,
    pub(crate) degraded: Mutex<Cell<bool>>,
    pub(crate) stats: Mutex<Cell<TickStats>>,
    pub(crate) tick_heartbeat: Heartbeat,
    pub(crate) sample_heartbeat: Heartbeat,
}

impl<B: Board> CentralizedMonitor<B> {
    /// Build a monitor for `board`. Rejects an inconsistent `config`.
    pub fn new(board: B, config: MonitorConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            board,
            config,
            registers: SafetyRegisters::new(config.adc2_timeout_ticks),
            queue: EventQueue::new(),
            degraded: Mutex::new(Cell::new(false)),
            stats: Mutex::new(Cell::new(TickStats::new())),
            tick_heartbeat: Heartbeat::new(TICK_HEARTBEAT_MOTOR, config.tick_heartbeat_period),
            sample_heartbeat: Heartbeat::new(
                SAMPLE_HEARTBEAT_MOTOR,
                config.sample_heartbeat_period,
            ),
        })
    }

    pub fn board(&self) -> &B {
        &self.board
    }

    pub fn config(&self) -> &MonitorConfig {
        &self.config
    }

    // ─── Startup ───────────────────────────────────────────────────

    /// Bring peripherals to a known state. Run with interrupts suppressed.
    pub fn initialize(&self) {
        let board = &self.board;
        board.perf().reset_and_start();
        board.switches().set_all_on();
        // Let the driver supplies settle before touching their latches.
        board.timing().delay_us(self.config.sensor_settle_delay_us);
        self.reset_motor_interrupt_flags();
    }

    /// Enable the interrupt sources.
    pub fn start(&self) {
        let board = &self.board;
        board.timing().set_pulse_irq_enabled(true);
        board.fault_lines().set_irq_mask(FaultLines::all());
        board.timing().start_backup_timer();
    }

    /// [`initialize`](Self::initialize) then [`start`](Self::start) in one
    /// critical section.
    pub fn boot(&self) {
        critical_section::with(|_| {
            self.initialize();
            self.start();
        });
        info!(
            adc2_timeout_ticks = self.config.adc2_timeout_ticks,
            "monitor started"
        );
    }

    /// Drain each driver's latched interrupt flags, then release its fault.
    /// A fault still present re-latches.
    fn reset_motor_interrupt_flags(&self) {
        for id in [DriverId::Dribble, DriverId::Vector] {
            let driver = self.board.driver(id);
            let _ = driver.take_interrupt_flags();
            driver.reset_fault();
        }
    }

    // ─── Register mutation ─────────────────────────────────────────

    /// OR `mask` into the error register and halt actuation if anything is
    /// set.
    pub fn set_error_flags(&self, mask: ErrorFlags) {
        let shared = self.board.shared();
        let t = self
            .registers
            .set_errors(mask, |value| shared.write_error_flags(value));
        if t.changed() {
            warn!(error = ?t.current, "error register changed");
        }
        if !t.current.is_empty() {
            self.stop_actuators();
        }
    }

    /// OR `mask` into the fault register and halt actuation if anything is
    /// set.
    pub fn set_fault_flags(&self, mask: FaultFlags) {
        let shared = self.board.shared();
        let t = self
            .registers
            .set_faults(mask, |value| shared.write_fault_flags(value));
        if t.changed() {
            warn!(fault = ?t.current, "fault register changed");
        }
        if !t.current.is_empty() {
            self.stop_actuators();
        }
    }

    fn stop_actuators(&self) {
        self.board.wheel().stop_control();
        self.board.dribble().stop_control();
    }

    /// Release every error bit whose cause is gone.
    ///
    /// Re-enables all fault-line interrupts first so a line that is still
    /// asserted latches again. When the external stop is deasserted both
    /// motor drivers are drained and re-armed. Fault bits are untouched.
    pub fn clear_error_flags(&self) -> ClearOutcome {
        let outcome = critical_section::with(|_| {
            self.board.fault_lines().set_irq_mask(FaultLines::all());
            let sample = self.live_sample();
            let outcome = clear::evaluate(self.registers.errors(), &sample, &self.config);
            if outcome.rearm_drivers {
                self.reset_motor_interrupt_flags();
            }
            let shared = self.board.shared();
            self.registers
                .release_errors(|_| outcome.remaining, |value| shared.write_error_flags(value));
            outcome
        });
        if !outcome.released.is_empty() {
            info!(
                released = ?outcome.released,
                remaining = ?outcome.remaining,
                "error flags cleared"
            );
        }
        outcome
    }

    /// Current state of every clearable error cause.
    fn live_sample(&self) -> LiveSample {
        let hall_faults = DriverId::ALL.iter().fold(ErrorFlags::empty(), |acc, &id| {
            let channels = self.board.driver(id).status().hall_fault_channels & id.channel_mask();
            acc | ErrorFlags::hall_sensor_channels(id.first_motor(), channels)
        });
        LiveSample {
            lines: self.board.fault_lines().level(),
            dc_bus_voltage_mv: self.board.adc().dc_bus_voltage_mv(),
            hall_faults,
        }
    }

    /// Analog sample arrived: reload the watchdog and check the bus voltage.
    pub fn adc2_keep_alive(&self, dc_bus_voltage_mv: i32) {
        self.registers.reload_watchdog(self.config.adc2_timeout_ticks);

        if let Some(on) = self.sample_heartbeat.beat() {
            self.board
                .leds()
                .set_motor_enabled(self.sample_heartbeat.motor(), on);
        }

        if dc_bus_voltage_mv < self.config.dc_bus_under_voltage_mv {
            self.set_error_flags(ErrorFlags::DC_BUS_UNDER_VOLTAGE);
        }
        if self.config.dc_bus_over_voltage_mv < dc_bus_voltage_mv {
            self.set_error_flags(ErrorFlags::DC_BUS_OVER_VOLTAGE);
        }
    }

    /// Force both motor drivers into their fault state.
    pub fn inject_driver_fault(&self) {
        warn!("injecting motor driver fault");
        for id in DriverId::ALL {
            self.board.driver(id).set_fault();
        }
    }

    // ─── Queries ───────────────────────────────────────────────────

    pub fn error_flags(&self) -> ErrorFlags {
        self.registers.errors()
    }

    pub fn fault_flags(&self) -> FaultFlags {
        self.registers.faults()
    }

    /// `true` if either register is non-zero.
    pub fn is_any_problem_occurred(&self) -> bool {
        self.registers.snapshot().any_problem()
    }

    /// `true` once the backup timer has taken over the tick.
    pub fn is_degraded(&self) -> bool {
        critical_section::with(|cs| self.degraded.borrow(cs).get())
    }

    pub fn stats(&self) -> TickStats {
        critical_section::with(|cs| self.stats.borrow(cs).get())
    }

    pub(crate) fn record_tick(&self, cycles: u64, halted: bool) {
        critical_section::with(|cs| {
            let cell = self.stats.borrow(cs);
            let mut stats = cell.get();
            stats.record(cycles, halted);
            cell.set(stats);
        });
    }

    pub fn snapshot(&self) -> HealthSnapshot {
        let state = self.registers.snapshot();
        HealthSnapshot {
            errors: state.errors,
            faults: state.faults,
            adc2_countdown: state.adc2_countdown,
            degraded: self.is_degraded(),
            ticks: self.stats().tick_count,
        }
    }
}
