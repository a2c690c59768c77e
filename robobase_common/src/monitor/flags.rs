//! Error, Fault and fault-line bitflag types.
//!
//! `ErrorFlags` are recoverable: the clear evaluator releases a bit once its
//! cause is re-verified absent. `FaultFlags` are terminal until reset.
//! Any non-empty register halts actuation.
//!
//! Per-motor groups occupy 8-bit lanes, motor N at lane bit `N - 1`.

use bitflags::bitflags;

use crate::consts::MOTOR_COUNT;

/// Bit for 1-based `motor` inside the lane starting at `lane_base`.
/// Returns 0 for motors outside `1..=MOTOR_COUNT`.
#[inline]
const fn motor_lane_bit(lane_base: u32, motor: usize) -> u32 {
    if motor == 0 || motor > MOTOR_COUNT {
        0
    } else {
        1 << (lane_base + motor as u32 - 1)
    }
}

const MOTOR_LANE_MASK: u32 = (1 << MOTOR_COUNT) - 1;

bitflags! {
    /// Recoverable error register.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ErrorFlags: u32 {
        /// DC bus below the under-voltage limit.
        const DC_BUS_UNDER_VOLTAGE = 1 << 0;
        /// DC bus above the over-voltage limit.
        const DC_BUS_OVER_VOLTAGE  = 1 << 1;
        /// Power module reports sleep.
        const MODULE_SLEEP         = 1 << 2;
        /// External stop line asserted.
        const EXTERNAL_STOP        = 1 << 3;

        const MOTOR1_HALL_SENSOR   = 1 << 8;
        const MOTOR2_HALL_SENSOR   = 1 << 9;
        const MOTOR3_HALL_SENSOR   = 1 << 10;
        const MOTOR4_HALL_SENSOR   = 1 << 11;
        const MOTOR5_HALL_SENSOR   = 1 << 12;

        /// Mild over-current, self-healing.
        const MOTOR1_OVER_CURRENT  = 1 << 16;
        const MOTOR2_OVER_CURRENT  = 1 << 17;
        const MOTOR3_OVER_CURRENT  = 1 << 18;
        const MOTOR4_OVER_CURRENT  = 1 << 19;
        const MOTOR5_OVER_CURRENT  = 1 << 20;
    }
}

impl ErrorFlags {
    const HALL_LANE: u32 = 8;
    const OVER_CURRENT_LANE: u32 = 16;

    /// All per-motor hall-sensor bits.
    pub const HALL_SENSOR_MASK: Self = Self::from_bits_retain(MOTOR_LANE_MASK << Self::HALL_LANE);

    /// All mild over-current bits.
    pub const OVER_CURRENT_MASK: Self =
        Self::from_bits_retain(MOTOR_LANE_MASK << Self::OVER_CURRENT_LANE);

    /// Hall-sensor bit for 1-based `motor`.
    #[inline]
    pub const fn hall_sensor(motor: usize) -> Self {
        Self::from_bits_retain(motor_lane_bit(Self::HALL_LANE, motor))
    }

    /// Hall-sensor bits for a channel bitfield, channel 0 mapping to
    /// `first_motor`.
    #[inline]
    pub const fn hall_sensor_channels(first_motor: usize, channels: u8) -> Self {
        if first_motor == 0 || first_motor > MOTOR_COUNT {
            return Self::empty();
        }
        let bits = ((channels as u32) << (Self::HALL_LANE + first_motor as u32 - 1))
            & Self::HALL_SENSOR_MASK.bits();
        Self::from_bits_retain(bits)
    }

    /// Mild over-current bit for 1-based `motor`.
    #[inline]
    pub const fn over_current(motor: usize) -> Self {
        Self::from_bits_retain(motor_lane_bit(Self::OVER_CURRENT_LANE, motor))
    }
}

impl Default for ErrorFlags {
    fn default() -> Self {
        Self::empty()
    }
}

bitflags! {
    /// Severe fault register. No clear path exists; recovery is a reset.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct FaultFlags: u32 {
        /// Analog front end stopped delivering samples.
        const ADC2_TIMEOUT             = 1 << 0;
        /// Primary (inertial-sensor) pulse lost, backup timer took over.
        const IMU_TIMEOUT              = 1 << 1;

        const MOTOR1_LOAD_SWITCH       = 1 << 8;
        const MOTOR2_LOAD_SWITCH       = 1 << 9;
        const MOTOR3_LOAD_SWITCH       = 1 << 10;
        const MOTOR4_LOAD_SWITCH       = 1 << 11;
        const MOTOR5_LOAD_SWITCH       = 1 << 12;

        const MOTOR1_OVER_TEMPERATURE  = 1 << 16;
        const MOTOR2_OVER_TEMPERATURE  = 1 << 17;
        const MOTOR3_OVER_TEMPERATURE  = 1 << 18;
        const MOTOR4_OVER_TEMPERATURE  = 1 << 19;
        const MOTOR5_OVER_TEMPERATURE  = 1 << 20;

        const MOTOR1_OVER_CURRENT      = 1 << 24;
        const MOTOR2_OVER_CURRENT      = 1 << 25;
        const MOTOR3_OVER_CURRENT      = 1 << 26;
        const MOTOR4_OVER_CURRENT      = 1 << 27;
        const MOTOR5_OVER_CURRENT      = 1 << 28;
    }
}

impl FaultFlags {
    #[inline]
    pub const fn load_switch(motor: usize) -> Self {
        Self::from_bits_retain(motor_lane_bit(8, motor))
    }

    #[inline]
    pub const fn over_temperature(motor: usize) -> Self {
        Self::from_bits_retain(motor_lane_bit(16, motor))
    }

    #[inline]
    pub const fn over_current(motor: usize) -> Self {
        Self::from_bits_retain(motor_lane_bit(24, motor))
    }
}

impl Default for FaultFlags {
    fn default() -> Self {
        Self::empty()
    }
}

bitflags! {
    /// Digital fault input lines (level register and interrupt mask share
    /// this layout). A set bit means the line is asserted.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct FaultLines: u32 {
        const MOTOR1_SWITCH_FAULT = 1 << 0;
        const MOTOR2_SWITCH_FAULT = 1 << 1;
        const MOTOR3_SWITCH_FAULT = 1 << 2;
        const MOTOR4_SWITCH_FAULT = 1 << 3;
        const MOTOR5_SWITCH_FAULT = 1 << 4;
        const MODULE_SLEEP        = 1 << 5;
        const EXTERNAL_STOP       = 1 << 6;
    }
}

impl FaultLines {
    /// Load-switch fault line for 1-based `motor`.
    #[inline]
    pub const fn switch_fault(motor: usize) -> Self {
        Self::from_bits_retain(motor_lane_bit(0, motor))
    }
}

impl Default for FaultLines {
    fn default() -> Self {
        Self::empty()
    }
}
