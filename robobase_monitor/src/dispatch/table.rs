//! Interrupt source → register bit tables.
//!
//! Handlers translate hardware bits into register updates by walking these
//! tables, so adding a line or a driver is a data change.

use robobase_common::monitor::flags::{ErrorFlags, FaultFlags, FaultLines};

use crate::hal::{DriverId, DriverInterrupt, DriverIrq};

/// What an asserted fault line does.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineEffect {
    /// Set a recoverable error bit.
    Error(ErrorFlags),
    /// Set a fault bit and cut power to the 1-based `motor`.
    LoadSwitchFault { fault: FaultFlags, motor: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineRule {
    pub line: FaultLines,
    pub effect: LineEffect,
}

const fn switch_rule(motor: usize) -> LineRule {
    LineRule {
        line: FaultLines::switch_fault(motor),
        effect: LineEffect::LoadSwitchFault {
            fault: FaultFlags::load_switch(motor),
            motor,
        },
    }
}

/// One row per digital fault line.
pub static FAULT_LINE_TABLE: [LineRule; 7] = [
    LineRule {
        line: FaultLines::MODULE_SLEEP,
        effect: LineEffect::Error(ErrorFlags::MODULE_SLEEP),
    },
    LineRule {
        line: FaultLines::EXTERNAL_STOP,
        effect: LineEffect::Error(ErrorFlags::EXTERNAL_STOP),
    },
    switch_rule(1),
    switch_rule(2),
    switch_rule(3),
    switch_rule(4),
    switch_rule(5),
];

/// Rows of [`FAULT_LINE_TABLE`] whose line is in `pending`.
pub fn asserted_lines(pending: FaultLines) -> impl Iterator<Item = &'static LineRule> {
    FAULT_LINE_TABLE
        .iter()
        .filter(move |rule| pending.contains(rule.line))
}

/// Register bits a motor-driver interrupt maps to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DriverRule {
    pub over_temperature: FaultFlags,
    pub over_current: FaultFlags,
}

/// Driver faults are reported per interface, on the interface's first motor.
pub const fn driver_rule(id: DriverId) -> DriverRule {
    let motor = id.first_motor();
    DriverRule {
        over_temperature: FaultFlags::over_temperature(motor),
        over_current: FaultFlags::over_current(motor),
    }
}

/// Hall error bits latched by `irq` on driver `id`.
///
/// A hall interrupt that names no channel of this interface flags every
/// channel of it; the interrupt alone must halt actuation.
pub fn driver_hall_errors(id: DriverId, irq: &DriverInterrupt) -> ErrorFlags {
    if !irq.flags.contains(DriverIrq::HALL_SENSOR_FAULT) {
        return ErrorFlags::empty();
    }
    let channels = match irq.hall_fault_channels & id.channel_mask() {
        0 => id.channel_mask(),
        named => named,
    };
    ErrorFlags::hall_sensor_channels(id.first_motor(), channels)
}

/// Fault bits latched by `irq` on driver `id`.
///
/// Ignored while the external stop is asserted: losing the auxiliary rail
/// drives the driver's fault outputs spuriously.
pub fn driver_faults(id: DriverId, irq: &DriverInterrupt, stop_asserted: bool) -> FaultFlags {
    if stop_asserted {
        return FaultFlags::empty();
    }
    let rule = driver_rule(id);
    let mut faults = FaultFlags::empty();
    if irq.flags.contains(DriverIrq::OVER_TEMPERATURE_FAULT) {
        faults |= rule.over_temperature;
    }
    if irq.flags.contains(DriverIrq::OVER_CURRENT_FAULT) {
        faults |= rule.over_current;
    }
    faults
}
