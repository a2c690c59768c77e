//! Collaborator contracts consumed by the monitor.
//!
//! Register-level drivers, the host shared-memory channel, the control
//! loops and the telemetry transmitter live outside this crate. The monitor
//! talks to them only through these traits, bundled per target by [`Board`].
//!
//! All methods take `&self`: the implementations sit on memory-mapped
//! registers that are shared by every interrupt context.

use bitflags::bitflags;
use robobase_common::consts::WHEEL_MOTOR_COUNT;
use robobase_common::monitor::flags::{ErrorFlags, FaultFlags, FaultLines};
use robobase_common::monitor::telemetry::{AnalogFrame, StatusFrame};

/// Host-visible shared-state channel.
pub trait SharedState {
    /// Mirror the error register.
    fn write_error_flags(&self, flags: ErrorFlags);
    /// Mirror the fault register.
    fn write_fault_flags(&self, flags: FaultFlags);
    /// Pull new control parameters. Returns `true` if anything changed.
    fn update_parameters(&self) -> bool;
    /// Discard any pending control parameters.
    fn clear_parameters(&self);
    /// Host asked for an error clear.
    fn is_clear_error_flags_requested(&self) -> bool;
}

/// Wheel or dribble control loop.
pub trait ActuatorController {
    /// Run one control step. `parameters_changed` is `false` on a pass-through
    /// tick so the loop still runs on the fixed cadence.
    fn update(&self, parameters_changed: bool);
    /// Stop actuation immediately. Must be idempotent.
    fn stop_control(&self);
}

/// Motor power switch bank.
pub trait PowerSwitches {
    fn set_all_on(&self);
    /// `motor` is 1-based.
    fn set_motor_enabled(&self, motor: usize, enabled: bool);
}

/// Per-motor indicator LEDs.
pub trait Indicators {
    /// `motor` is 1-based.
    fn set_motor_enabled(&self, motor: usize, enabled: bool);
}

/// Analog front end (ADC2).
pub trait AnalogFrontEnd {
    /// Latest DC bus reading [mV].
    fn dc_bus_voltage_mv(&self) -> i32;
}

/// Identifies one of the two motor-driver interfaces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DriverId {
    /// Vector controller driving wheels 1..=4.
    Vector,
    /// Single-channel controller driving the dribbler (motor 5).
    Dribble,
}

impl DriverId {
    pub const ALL: [Self; 2] = [Self::Vector, Self::Dribble];

    /// 1-based motor served by hall channel 0.
    #[inline]
    pub const fn first_motor(self) -> usize {
        match self {
            Self::Vector => 1,
            Self::Dribble => WHEEL_MOTOR_COUNT + 1,
        }
    }

    /// Number of hall channels on this interface.
    #[inline]
    pub const fn channel_count(self) -> usize {
        match self {
            Self::Vector => WHEEL_MOTOR_COUNT,
            Self::Dribble => 1,
        }
    }

    /// Mask of valid hall channel bits.
    #[inline]
    pub const fn channel_mask(self) -> u8 {
        ((1u16 << self.channel_count()) - 1) as u8
    }
}

bitflags! {
    /// Latched motor-driver interrupt causes.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct DriverIrq: u16 {
        const HALL_SENSOR_FAULT      = 1 << 0;
        const OVER_TEMPERATURE_FAULT = 1 << 1;
        const OVER_CURRENT_FAULT     = 1 << 2;
    }
}

/// Interrupt flags read (and cleared) from a motor driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DriverInterrupt {
    pub flags: DriverIrq,
    /// Hall channels that latched a fault, channel 0 at bit 0.
    pub hall_fault_channels: u8,
}

/// Live motor-driver status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DriverStatus {
    /// Hall channels currently faulted, channel 0 at bit 0.
    pub hall_fault_channels: u8,
}

/// Motor-driver interface.
pub trait MotorDriver {
    fn status(&self) -> DriverStatus;
    /// Read-and-clear the latched interrupt flags.
    fn take_interrupt_flags(&self) -> DriverInterrupt;
    /// Release the driver fault latch. A fault still present re-latches.
    fn reset_fault(&self);
    /// Force the driver into its fault state.
    fn set_fault(&self);
}

/// Digital fault input bank with a level register and an interrupt mask.
pub trait FaultLineBank {
    fn level(&self) -> FaultLines;
    fn irq_mask(&self) -> FaultLines;
    fn set_irq_mask(&self, mask: FaultLines);
}

/// Primary pulse input and backup timer.
pub trait TimingSources {
    fn clear_pulse_edge(&self);
    fn set_pulse_irq_enabled(&self, enabled: bool);
    /// Start the backup timer in continuous mode.
    fn start_backup_timer(&self);
    /// Reload the backup timer count. Keeps it silent while pulses arrive.
    fn rearm_backup_timer(&self);
    fn clear_backup_timer_pending(&self);
    /// Busy-wait, only used during initialization.
    fn delay_us(&self, us: u32);
}

/// Cycle counter used to time each tick.
pub trait PerformanceCounter {
    fn reset_and_start(&self);
    fn begin_section(&self);
    /// Elapsed cycles since `begin_section`.
    fn end_section(&self) -> u64;
}

/// Telemetry stream transmitter.
pub trait TelemetrySink {
    fn transmit_status(&self, frame: &StatusFrame);
    fn transmit_analog(&self, frame: &AnalogFrame);
    /// Motion frame; the transmitter fills the sensor fields itself.
    fn transmit_motion(&self, performance_counter: u16);
}

/// Everything the monitor needs from one hardware target.
pub trait Board {
    type Shared: SharedState;
    type Wheel: ActuatorController;
    type Dribble: ActuatorController;
    type Switches: PowerSwitches;
    type Leds: Indicators;
    type Adc: AnalogFrontEnd;
    type Driver: MotorDriver;
    type Lines: FaultLineBank;
    type Timing: TimingSources;
    type Perf: PerformanceCounter;
    type Telemetry: TelemetrySink;

    fn shared(&self) -> &Self::Shared;
    fn wheel(&self) -> &Self::Wheel;
    fn dribble(&self) -> &Self::Dribble;
    fn switches(&self) -> &Self::Switches;
    fn leds(&self) -> &Self::Leds;
    fn adc(&self) -> &Self::Adc;
    fn driver(&self, id: DriverId) -> &Self::Driver;
    fn fault_lines(&self) -> &Self::Lines;
    fn timing(&self) -> &Self::Timing;
    fn perf(&self) -> &Self::Perf;
    fn telemetry(&self) -> &Self::Telemetry;
}
