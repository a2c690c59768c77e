//! Compile-time constants for the robot base firmware.
//!
//! Single source of truth for thresholds and limits. Runtime configuration
//! falls back to these values when a field is absent.

/// Number of motors on the base (four wheels plus the dribbler).
pub const MOTOR_COUNT: usize = 5;

/// Number of motors served by the vector controller (wheels 1..=4).
pub const WHEEL_MOTOR_COUNT: usize = 4;

/// Nominal primary pulse period in microseconds (1 kHz).
pub const TICK_PERIOD_US: u32 = 1000;

/// DC bus under-voltage threshold [mV].
pub const DC_BUS_UNDER_VOLTAGE_MV: i32 = 40_000;

/// DC bus over-voltage threshold [mV].
pub const DC_BUS_OVER_VOLTAGE_MV: i32 = 54_000;

/// Ticks without an analog sample before the ADC2 timeout fault.
pub const ADC2_TIMEOUT_TICKS: i32 = 10;

/// Sensor rail settle delay after power-up [µs].
pub const SENSOR_SETTLE_DELAY_US: u32 = 1000;

/// Tick heartbeat indicator period [ticks].
pub const TICK_HEARTBEAT_PERIOD: u32 = 100;

/// Analog sample heartbeat indicator period [samples].
pub const SAMPLE_HEARTBEAT_PERIOD: u32 = 10;

/// Reporting ceiling of the per-tick performance counter.
pub const PERFORMANCE_COUNTER_CEILING: u16 = u16::MAX;

/// Capacity of the pending interrupt event queue.
pub const EVENT_QUEUE_CAPACITY: usize = 16;
