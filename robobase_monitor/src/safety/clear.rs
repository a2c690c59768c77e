//! Error-clear evaluation.
//!
//! A clear request never trusts history: each error bit is released only if
//! its cause is absent in a [`LiveSample`] taken at the moment of the
//! request. The rules are a table, so each one can be checked without
//! hardware.

use robobase_common::monitor::config::MonitorConfig;
use robobase_common::monitor::flags::{ErrorFlags, FaultLines};

/// Peripheral state sampled when a clear is requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LiveSample {
    /// Current fault-line levels.
    pub lines: FaultLines,
    /// Fresh DC bus reading [mV].
    pub dc_bus_voltage_mv: i32,
    /// Hall-sensor bits whose motor currently reports a hall fault.
    pub hall_faults: ErrorFlags,
}

/// Condition under which a rule's bits may be released.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReleaseCondition {
    /// The named input line is deasserted.
    LineDeasserted(FaultLines),
    /// Reading is at or above the under-voltage limit.
    VoltageNotUnder,
    /// Reading is at or below the over-voltage limit.
    VoltageNotOver,
    /// Per motor: that motor's hall channel is healthy.
    HallHealthy,
    /// Self-healing, released unconditionally.
    Always,
}

/// One row of the clear table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClearRule {
    pub bits: ErrorFlags,
    pub condition: ReleaseCondition,
}

impl ClearRule {
    /// Bits of this rule that `sample` allows releasing.
    pub fn releasable(&self, sample: &LiveSample, config: &MonitorConfig) -> ErrorFlags {
        let ok = match self.condition {
            ReleaseCondition::LineDeasserted(line) => !sample.lines.intersects(line),
            ReleaseCondition::VoltageNotUnder => {
                config.dc_bus_under_voltage_mv <= sample.dc_bus_voltage_mv
            }
            ReleaseCondition::VoltageNotOver => {
                sample.dc_bus_voltage_mv <= config.dc_bus_over_voltage_mv
            }
            ReleaseCondition::HallHealthy => return self.bits.difference(sample.hall_faults),
            ReleaseCondition::Always => true,
        };
        if ok { self.bits } else { ErrorFlags::empty() }
    }
}

/// Every releasable error bit and its condition.
pub const CLEAR_RULES: [ClearRule; 6] = [
    ClearRule {
        bits: ErrorFlags::MODULE_SLEEP,
        condition: ReleaseCondition::LineDeasserted(FaultLines::MODULE_SLEEP),
    },
    ClearRule {
        bits: ErrorFlags::EXTERNAL_STOP,
        condition: ReleaseCondition::LineDeasserted(FaultLines::EXTERNAL_STOP),
    },
    ClearRule {
        bits: ErrorFlags::DC_BUS_UNDER_VOLTAGE,
        condition: ReleaseCondition::VoltageNotUnder,
    },
    ClearRule {
        bits: ErrorFlags::DC_BUS_OVER_VOLTAGE,
        condition: ReleaseCondition::VoltageNotOver,
    },
    ClearRule {
        bits: ErrorFlags::HALL_SENSOR_MASK,
        condition: ReleaseCondition::HallHealthy,
    },
    ClearRule {
        bits: ErrorFlags::OVER_CURRENT_MASK,
        condition: ReleaseCondition::Always,
    },
];

/// Result of evaluating a clear request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClearOutcome {
    /// Bits that were set and are now released.
    pub released: ErrorFlags,
    /// Bits that stay set.
    pub remaining: ErrorFlags,
    /// The external stop line is deasserted, so the motor-driver latches
    /// must be drained and re-armed.
    pub rearm_drivers: bool,
}

/// All bits `sample` allows releasing.
pub fn releasable(sample: &LiveSample, config: &MonitorConfig) -> ErrorFlags {
    CLEAR_RULES
        .iter()
        .fold(ErrorFlags::empty(), |acc, rule| acc | rule.releasable(sample, config))
}

/// Evaluate a clear request against the current error register.
pub fn evaluate(current: ErrorFlags, sample: &LiveSample, config: &MonitorConfig) -> ClearOutcome {
    let allowed = releasable(sample, config);
    ClearOutcome {
        released: current & allowed,
        remaining: current.difference(allowed),
        rearm_drivers: !sample.lines.contains(FaultLines::EXTERNAL_STOP),
    }
}
