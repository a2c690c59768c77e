//! Interrupt sources as an explicit event type.

use crate::hal::DriverId;

/// A completed analog front-end conversion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnalogSample {
    /// DC bus voltage [mV].
    pub dc_bus_voltage_mv: i32,
    /// Dribble motor current [mA].
    pub dribble_current_ma: i32,
}

/// One hardware interrupt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InterruptEvent {
    /// Edge of the fixed-rate primary pulse.
    PrimaryPulse,
    /// Backup timer expired: no primary pulse within its period.
    BackupTimer,
    /// One or more digital fault lines asserted.
    FaultLines,
    /// A motor-driver interface latched an interrupt.
    MotorDriver(DriverId),
    /// The analog front end finished a sample.
    AnalogSample(AnalogSample),
}

impl InterruptEvent {
    /// `true` for the two sources that drive the periodic tick.
    #[inline]
    pub const fn is_tick_source(&self) -> bool {
        matches!(self, Self::PrimaryPulse | Self::BackupTimer)
    }
}
