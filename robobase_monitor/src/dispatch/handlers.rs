//! Interrupt handlers and the event-queue entry points.

use heapless::Vec;
use robobase_common::consts::MOTOR_COUNT;
use robobase_common::monitor::flags::{ErrorFlags, FaultFlags, FaultLines};
use robobase_common::monitor::telemetry::AnalogFrame;
use tracing::{debug, error, trace};

use super::event::{AnalogSample, InterruptEvent};
use super::queue::DispatchError;
use super::table::{self, LineEffect};
use crate::cycle::TickReport;
use crate::hal::{
    Board, DriverId, FaultLineBank, MotorDriver, PowerSwitches, TelemetrySink, TimingSources,
};
use crate::monitor::CentralizedMonitor;

impl<B: Board> CentralizedMonitor<B> {
    /// Primary pulse edge. Keeps the backup timer from firing and runs the
    /// tick. Returns `None` once the monitor has fallen back to the backup
    /// timer; a late edge must not produce a second tick per period.
    pub fn on_primary_pulse(&self) -> Option<TickReport> {
        let timing = self.board.timing();
        timing.clear_pulse_edge();
        if self.is_degraded() {
            trace!("primary pulse ignored in degraded mode");
            return None;
        }
        timing.rearm_backup_timer();
        Some(self.do_periodic_common_work())
    }

    /// Backup timer expiry. The primary pulse is considered lost for good:
    /// its interrupt is disabled and every later tick comes from here.
    pub fn on_backup_timer(&self) -> TickReport {
        let timing = self.board.timing();
        timing.clear_backup_timer_pending();

        let first = !critical_section::with(|cs| self.degraded.borrow(cs).replace(true));
        if first {
            error!("primary pulse lost, ticking from backup timer");
            timing.set_pulse_irq_enabled(false);
        }
        self.set_fault_flags(FaultFlags::IMU_TIMEOUT);

        self.do_periodic_common_work()
    }

    /// Digital fault lines. Each asserted line is masked until the next
    /// clear so a held line does not storm. Returns the lines handled.
    pub fn on_fault_lines(&self) -> FaultLines {
        let lines = self.board.fault_lines();
        let mask = lines.irq_mask();
        let pending = lines.level() & mask;
        lines.set_irq_mask(mask.difference(pending));

        let mut errors = ErrorFlags::empty();
        let mut faults = FaultFlags::empty();
        let mut cut: Vec<usize, MOTOR_COUNT> = Vec::new();
        for rule in table::asserted_lines(pending) {
            match rule.effect {
                LineEffect::Error(bits) => errors |= bits,
                LineEffect::LoadSwitchFault { fault, motor } => {
                    faults |= fault;
                    // One row per motor.
                    let _ = cut.push(motor);
                }
            }
        }
        if !errors.is_empty() {
            self.set_error_flags(errors);
        }
        if !faults.is_empty() {
            self.set_fault_flags(faults);
        }
        // Power is cut only once the fault is registered and published.
        for motor in cut {
            self.board.switches().set_motor_enabled(motor, false);
        }
        pending
    }

    /// Motor-driver interrupt on interface `id`.
    pub fn on_motor_driver(&self, id: DriverId) {
        let irq = self.board.driver(id).take_interrupt_flags();
        debug!(driver = ?id, flags = ?irq.flags, channels = irq.hall_fault_channels, "driver interrupt");

        let hall = table::driver_hall_errors(id, &irq);
        if !hall.is_empty() {
            self.set_error_flags(hall);
        }

        let stop_asserted = self
            .board
            .fault_lines()
            .level()
            .contains(FaultLines::EXTERNAL_STOP);
        let faults = table::driver_faults(id, &irq, stop_asserted);
        if !faults.is_empty() {
            self.set_fault_flags(faults);
        }
    }

    /// Completed analog conversion: keep-alive plus an analog frame.
    pub fn on_analog_sample(&self, sample: AnalogSample) {
        self.adc2_keep_alive(sample.dc_bus_voltage_mv);
        let frame = AnalogFrame::from_readings(sample.dc_bus_voltage_mv, sample.dribble_current_ma);
        self.board.telemetry().transmit_analog(&frame);
    }

    /// Run the handler for `event`. Returns the tick report for timing
    /// sources that produced a tick.
    pub fn handle(&self, event: InterruptEvent) -> Option<TickReport> {
        match event {
            InterruptEvent::PrimaryPulse => self.on_primary_pulse(),
            InterruptEvent::BackupTimer => Some(self.on_backup_timer()),
            InterruptEvent::FaultLines => {
                self.on_fault_lines();
                None
            }
            InterruptEvent::MotorDriver(id) => {
                self.on_motor_driver(id);
                None
            }
            InterruptEvent::AnalogSample(sample) => {
                self.on_analog_sample(sample);
                None
            }
        }
    }

    /// Queue `event` for [`run_pending`](Self::run_pending).
    pub fn post(&self, event: InterruptEvent) -> Result<(), DispatchError> {
        self.queue.post(event)
    }

    /// Drain the queue in arrival order. Returns the number of ticks run.
    pub fn run_pending(&self) -> usize {
        let mut ticks = 0;
        while let Some(event) = self.queue.pop() {
            if self.handle(event).is_some() {
                ticks += 1;
            }
        }
        ticks
    }

    pub fn pending_events(&self) -> usize {
        self.queue.len()
    }
}
