//! Host-side simulated board.
//!
//! Every peripheral keeps its state in `Cell`s and counts the calls it
//! receives, so tests and the simulation binary can drive inputs and assert
//! on what the monitor did. Not `Sync`; one thread drives one board.

use core::cell::Cell;
use core::sync::atomic::{AtomicU64, Ordering};

use heapless::Vec;
use robobase_common::consts::{EVENT_QUEUE_CAPACITY, MOTOR_COUNT};
use robobase_common::monitor::flags::{ErrorFlags, FaultFlags, FaultLines};
use robobase_common::monitor::telemetry::{AnalogFrame, MotionFrame, StatusFrame, StreamFrame};

use crate::dispatch::event::InterruptEvent;
use crate::hal::{
    ActuatorController, AnalogFrontEnd, Board, DriverId, DriverInterrupt, DriverIrq,
    DriverStatus, FaultLineBank, Indicators, MotorDriver, PerformanceCounter, PowerSwitches,
    SharedState, TelemetrySink, TimingSources,
};

#[inline]
fn bump(c: &Cell<u32>) {
    c.set(c.get().wrapping_add(1));
}

/// Process-wide call order. Stamps from one thread are strictly increasing,
/// so a test can tell which of two peripheral calls happened first.
static CALL_ORDER: AtomicU64 = AtomicU64::new(1);

fn stamp(c: &Cell<u64>) {
    c.set(CALL_ORDER.fetch_add(1, Ordering::Relaxed));
}

// ─── Shared state ──────────────────────────────────────────────────

/// Host channel. Parameter pushes and clear requests are one-shot.
#[derive(Debug, Default)]
pub struct SimShared {
    pub error_flags: Cell<ErrorFlags>,
    pub fault_flags: Cell<FaultFlags>,
    pub error_writes: Cell<u32>,
    pub fault_writes: Cell<u32>,
    /// Call order of the last fault register write; 0 if never written.
    pub fault_written_at: Cell<u64>,
    pub parameter_clears: Cell<u32>,
    pending_parameters: Cell<bool>,
    clear_requested: Cell<bool>,
}

impl SimShared {
    /// Host writes a new parameter set.
    pub fn push_parameters(&self) {
        self.pending_parameters.set(true);
    }

    /// Host asks for an error clear.
    pub fn request_clear(&self) {
        self.clear_requested.set(true);
    }

    pub fn has_pending_parameters(&self) -> bool {
        self.pending_parameters.get()
    }
}

impl SharedState for SimShared {
    fn write_error_flags(&self, flags: ErrorFlags) {
        self.error_flags.set(flags);
        bump(&self.error_writes);
    }

    fn write_fault_flags(&self, flags: FaultFlags) {
        self.fault_flags.set(flags);
        bump(&self.fault_writes);
        stamp(&self.fault_written_at);
    }

    fn update_parameters(&self) -> bool {
        self.pending_parameters.replace(false)
    }

    fn clear_parameters(&self) {
        self.pending_parameters.set(false);
        bump(&self.parameter_clears);
    }

    fn is_clear_error_flags_requested(&self) -> bool {
        self.clear_requested.replace(false)
    }
}

// ─── Actuators ─────────────────────────────────────────────────────

#[derive(Debug, Default)]
pub struct SimActuator {
    pub updates: Cell<u32>,
    /// Updates called with `parameters_changed == true`.
    pub changed_updates: Cell<u32>,
    pub stops: Cell<u32>,
    pub last_update: Cell<Option<bool>>,
}

impl ActuatorController for SimActuator {
    fn update(&self, parameters_changed: bool) {
        bump(&self.updates);
        if parameters_changed {
            bump(&self.changed_updates);
        }
        self.last_update.set(Some(parameters_changed));
    }

    fn stop_control(&self) {
        bump(&self.stops);
    }
}

// ─── Power and indicators ──────────────────────────────────────────

#[derive(Debug, Default)]
pub struct SimSwitches {
    enabled: Cell<[bool; MOTOR_COUNT]>,
    pub all_on_calls: Cell<u32>,
    /// Call order of the last power cut; 0 if none.
    pub disabled_at: Cell<u64>,
}

impl SimSwitches {
    /// `motor` is 1-based.
    pub fn is_enabled(&self, motor: usize) -> bool {
        self.enabled.get()[motor - 1]
    }
}

impl PowerSwitches for SimSwitches {
    fn set_all_on(&self) {
        self.enabled.set([true; MOTOR_COUNT]);
        bump(&self.all_on_calls);
    }

    fn set_motor_enabled(&self, motor: usize, enabled: bool) {
        let mut state = self.enabled.get();
        if let Some(slot) = state.get_mut(motor.wrapping_sub(1)) {
            *slot = enabled;
        }
        self.enabled.set(state);
        if !enabled {
            stamp(&self.disabled_at);
        }
    }
}

#[derive(Debug, Default)]
pub struct SimLeds {
    lit: Cell<[bool; MOTOR_COUNT]>,
    pub toggles: Cell<u32>,
}

impl SimLeds {
    /// `motor` is 1-based.
    pub fn is_lit(&self, motor: usize) -> bool {
        self.lit.get()[motor - 1]
    }
}

impl Indicators for SimLeds {
    fn set_motor_enabled(&self, motor: usize, enabled: bool) {
        let mut state = self.lit.get();
        if let Some(slot) = state.get_mut(motor.wrapping_sub(1)) {
            *slot = enabled;
        }
        self.lit.set(state);
        bump(&self.toggles);
    }
}

// ─── Analog front end ──────────────────────────────────────────────

#[derive(Debug)]
pub struct SimAdc {
    pub dc_bus_voltage_mv: Cell<i32>,
}

impl Default for SimAdc {
    fn default() -> Self {
        Self {
            dc_bus_voltage_mv: Cell::new(48_000),
        }
    }
}

impl AnalogFrontEnd for SimAdc {
    fn dc_bus_voltage_mv(&self) -> i32 {
        self.dc_bus_voltage_mv.get()
    }
}

// ─── Motor drivers ─────────────────────────────────────────────────

/// Driver with a latched interrupt register and a live hall status.
///
/// `reset_fault` releases a forced fault; a hall fault still visible in the
/// live status latches again immediately.
#[derive(Debug, Default)]
pub struct SimDriver {
    latched: Cell<DriverInterrupt>,
    status: Cell<DriverStatus>,
    forced: Cell<bool>,
    pub takes: Cell<u32>,
    pub resets: Cell<u32>,
}

impl SimDriver {
    /// Hardware latches `flags`.
    pub fn raise(&self, flags: DriverIrq, hall_fault_channels: u8) {
        let mut irq = self.latched.get();
        irq.flags |= flags;
        irq.hall_fault_channels |= hall_fault_channels;
        self.latched.set(irq);
    }

    /// Set the live hall status; faulted channels also latch.
    pub fn set_hall_faults(&self, channels: u8) {
        self.status.set(DriverStatus {
            hall_fault_channels: channels,
        });
        if channels != 0 {
            self.raise(DriverIrq::HALL_SENSOR_FAULT, channels);
        }
    }

    /// Interrupt line level.
    pub fn irq_pending(&self) -> bool {
        !self.latched.get().flags.is_empty()
    }

    pub fn is_forced(&self) -> bool {
        self.forced.get()
    }
}

impl MotorDriver for SimDriver {
    fn status(&self) -> DriverStatus {
        self.status.get()
    }

    fn take_interrupt_flags(&self) -> DriverInterrupt {
        bump(&self.takes);
        self.latched.take()
    }

    fn reset_fault(&self) {
        bump(&self.resets);
        self.forced.set(false);
        let channels = self.status.get().hall_fault_channels;
        if channels != 0 {
            self.raise(DriverIrq::HALL_SENSOR_FAULT, channels);
        }
    }

    fn set_fault(&self) {
        self.forced.set(true);
        self.raise(DriverIrq::OVER_CURRENT_FAULT, 0);
    }
}

// ─── Fault lines ───────────────────────────────────────────────────

#[derive(Debug, Default)]
pub struct SimFaultLines {
    level: Cell<FaultLines>,
    mask: Cell<FaultLines>,
}

impl SimFaultLines {
    pub fn assert_line(&self, line: FaultLines) {
        self.level.set(self.level.get() | line);
    }

    pub fn deassert_line(&self, line: FaultLines) {
        self.level.set(self.level.get().difference(line));
    }

    /// Lines that would raise the interrupt right now.
    pub fn pending(&self) -> FaultLines {
        self.level.get() & self.mask.get()
    }
}

impl FaultLineBank for SimFaultLines {
    fn level(&self) -> FaultLines {
        self.level.get()
    }

    fn irq_mask(&self) -> FaultLines {
        self.mask.get()
    }

    fn set_irq_mask(&self, mask: FaultLines) {
        self.mask.set(mask);
    }
}

// ─── Timing ────────────────────────────────────────────────────────

#[derive(Debug, Default)]
pub struct SimTiming {
    pub pulse_irq_enabled: Cell<bool>,
    pub backup_running: Cell<bool>,
    pub edges_cleared: Cell<u32>,
    pub backup_rearms: Cell<u32>,
    pub backup_pending_clears: Cell<u32>,
    pub delayed_us: Cell<u64>,
}

impl TimingSources for SimTiming {
    fn clear_pulse_edge(&self) {
        bump(&self.edges_cleared);
    }

    fn set_pulse_irq_enabled(&self, enabled: bool) {
        self.pulse_irq_enabled.set(enabled);
    }

    fn start_backup_timer(&self) {
        self.backup_running.set(true);
    }

    fn rearm_backup_timer(&self) {
        bump(&self.backup_rearms);
    }

    fn clear_backup_timer_pending(&self) {
        bump(&self.backup_pending_clears);
    }

    fn delay_us(&self, us: u32) {
        self.delayed_us.set(self.delayed_us.get() + u64::from(us));
    }
}

// ─── Performance counter ───────────────────────────────────────────

/// Reports a fixed cost per section.
#[derive(Debug)]
pub struct SimPerf {
    pub cycles_per_section: Cell<u64>,
    pub running: Cell<bool>,
    pub sections: Cell<u32>,
}

impl Default for SimPerf {
    fn default() -> Self {
        Self {
            cycles_per_section: Cell::new(1_200),
            running: Cell::new(false),
            sections: Cell::new(0),
        }
    }
}

impl PerformanceCounter for SimPerf {
    fn reset_and_start(&self) {
        self.running.set(true);
        self.sections.set(0);
    }

    fn begin_section(&self) {
        bump(&self.sections);
    }

    fn end_section(&self) -> u64 {
        if self.running.get() {
            self.cycles_per_section.get()
        } else {
            0
        }
    }
}

// ─── Telemetry ─────────────────────────────────────────────────────

/// Encodes every frame as it would go on the wire and keeps the last frame
/// of each stream.
#[derive(Debug, Default)]
pub struct SimTelemetry {
    pub status_frames: Cell<u32>,
    pub analog_frames: Cell<u32>,
    pub motion_frames: Cell<u32>,
    pub bytes_sent: Cell<u64>,
    pub last_status: Cell<Option<StatusFrame>>,
    pub last_status_wire: Cell<[u8; StatusFrame::WIRE_SIZE]>,
    pub last_analog: Cell<Option<AnalogFrame>>,
    pub last_performance_counter: Cell<Option<u16>>,
}

impl SimTelemetry {
    fn send<F: StreamFrame>(&self, frame: &F, wire: &mut [u8]) {
        if let Ok(n) = frame.encode(wire) {
            self.bytes_sent.set(self.bytes_sent.get() + n as u64);
        }
    }
}

impl TelemetrySink for SimTelemetry {
    fn transmit_status(&self, frame: &StatusFrame) {
        let mut wire = [0u8; StatusFrame::WIRE_SIZE];
        self.send(frame, &mut wire);
        self.last_status_wire.set(wire);
        self.last_status.set(Some(*frame));
        bump(&self.status_frames);
    }

    fn transmit_analog(&self, frame: &AnalogFrame) {
        let mut wire = [0u8; AnalogFrame::WIRE_SIZE];
        self.send(frame, &mut wire);
        self.last_analog.set(Some(*frame));
        bump(&self.analog_frames);
    }

    fn transmit_motion(&self, performance_counter: u16) {
        let frame = MotionFrame {
            performance_counter,
            ..MotionFrame::default()
        };
        let mut wire = [0u8; MotionFrame::WIRE_SIZE];
        self.send(&frame, &mut wire);
        self.last_performance_counter.set(Some(performance_counter));
        bump(&self.motion_frames);
    }
}

// ─── Board ─────────────────────────────────────────────────────────

#[derive(Debug, Default)]
pub struct SimBoard {
    pub shared: SimShared,
    pub wheel: SimActuator,
    pub dribble: SimActuator,
    pub switches: SimSwitches,
    pub leds: SimLeds,
    pub adc: SimAdc,
    pub vector_driver: SimDriver,
    pub dribble_driver: SimDriver,
    pub lines: SimFaultLines,
    pub timing: SimTiming,
    pub perf: SimPerf,
    pub telemetry: SimTelemetry,
}

impl SimBoard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total `stop_control` calls across both actuators.
    pub fn stop_calls(&self) -> u32 {
        self.wheel.stops.get() + self.dribble.stops.get()
    }

    /// Interrupts the hardware would raise for one period.
    ///
    /// Fault sources come first, then the tick source: the primary pulse if
    /// it is alive and its interrupt enabled, else the backup timer if it is
    /// running.
    pub fn raise_interrupts(&self, primary_alive: bool) -> Vec<InterruptEvent, EVENT_QUEUE_CAPACITY> {
        let mut events = Vec::new();
        let mut push = |event| {
            // Capacity exceeds the number of sources.
            let _ = events.push(event);
        };
        if !self.lines.pending().is_empty() {
            push(InterruptEvent::FaultLines);
        }
        for id in DriverId::ALL {
            if self.sim_driver(id).irq_pending() {
                push(InterruptEvent::MotorDriver(id));
            }
        }
        if primary_alive && self.timing.pulse_irq_enabled.get() {
            push(InterruptEvent::PrimaryPulse);
        } else if self.timing.backup_running.get() {
            push(InterruptEvent::BackupTimer);
        }
        events
    }

    pub fn sim_driver(&self, id: DriverId) -> &SimDriver {
        match id {
            DriverId::Vector => &self.vector_driver,
            DriverId::Dribble => &self.dribble_driver,
        }
    }
}

impl Board for SimBoard {
    type Shared = SimShared;
    type Wheel = SimActuator;
    type Dribble = SimActuator;
    type Switches = SimSwitches;
    type Leds = SimLeds;
    type Adc = SimAdc;
    type Driver = SimDriver;
    type Lines = SimFaultLines;
    type Timing = SimTiming;
    type Perf = SimPerf;
    type Telemetry = SimTelemetry;

    fn shared(&self) -> &SimShared {
        &self.shared
    }
    fn wheel(&self) -> &SimActuator {
        &self.wheel
    }
    fn dribble(&self) -> &SimActuator {
        &self.dribble
    }
    fn switches(&self) -> &SimSwitches {
        &self.switches
    }
    fn leds(&self) -> &SimLeds {
        &self.leds
    }
    fn adc(&self) -> &SimAdc {
        &self.adc
    }
    fn driver(&self, id: DriverId) -> &SimDriver {
        self.sim_driver(id)
    }
    fn fault_lines(&self) -> &SimFaultLines {
        &self.lines
    }
    fn timing(&self) -> &SimTiming {
        &self.timing
    }
    fn perf(&self) -> &SimPerf {
        &self.perf
    }
    fn telemetry(&self) -> &SimTelemetry {
        &self.telemetry
    }
}
