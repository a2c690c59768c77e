//! Monitor configuration.
//!
//! Every field defaults to its compile-time constant in [`crate::consts`], so
//! an empty `[monitor]` table reproduces the built-in firmware behaviour.

use serde::{Deserialize, Serialize};

use crate::config::ConfigError;
use crate::consts::{
    ADC2_TIMEOUT_TICKS, DC_BUS_OVER_VOLTAGE_MV, DC_BUS_UNDER_VOLTAGE_MV, SAMPLE_HEARTBEAT_PERIOD,
    SENSOR_SETTLE_DELAY_US, TICK_HEARTBEAT_PERIOD,
};

/// Thresholds and periods used by the centralized monitor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MonitorConfig {
    /// DC bus under-voltage limit [mV]. Readings below set the error.
    #[serde(default = "default_under_voltage")]
    pub dc_bus_under_voltage_mv: i32,

    /// DC bus over-voltage limit [mV]. Readings above set the error.
    #[serde(default = "default_over_voltage")]
    pub dc_bus_over_voltage_mv: i32,

    /// Watchdog reload value [ticks].
    #[serde(default = "default_adc2_timeout")]
    pub adc2_timeout_ticks: i32,

    /// Delay after powering the sensor rail [µs].
    #[serde(default = "default_settle_delay")]
    pub sensor_settle_delay_us: u32,

    /// Tick heartbeat indicator period [ticks].
    #[serde(default = "default_tick_heartbeat")]
    pub tick_heartbeat_period: u32,

    /// Analog sample heartbeat indicator period [samples].
    #[serde(default = "default_sample_heartbeat")]
    pub sample_heartbeat_period: u32,
}

fn default_under_voltage() -> i32 {
    DC_BUS_UNDER_VOLTAGE_MV
}
fn default_over_voltage() -> i32 {
    DC_BUS_OVER_VOLTAGE_MV
}
fn default_adc2_timeout() -> i32 {
    ADC2_TIMEOUT_TICKS
}
fn default_settle_delay() -> u32 {
    SENSOR_SETTLE_DELAY_US
}
fn default_tick_heartbeat() -> u32 {
    TICK_HEARTBEAT_PERIOD
}
fn default_sample_heartbeat() -> u32 {
    SAMPLE_HEARTBEAT_PERIOD
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl MonitorConfig {
    /// Built-in firmware values.
    pub const DEFAULT: Self = Self {
        dc_bus_under_voltage_mv: DC_BUS_UNDER_VOLTAGE_MV,
        dc_bus_over_voltage_mv: DC_BUS_OVER_VOLTAGE_MV,
        adc2_timeout_ticks: ADC2_TIMEOUT_TICKS,
        sensor_settle_delay_us: SENSOR_SETTLE_DELAY_US,
        tick_heartbeat_period: TICK_HEARTBEAT_PERIOD,
        sample_heartbeat_period: SAMPLE_HEARTBEAT_PERIOD,
    };

    /// `true` if `voltage_mv` lies inside `[under, over]`.
    #[inline]
    pub const fn voltage_in_bounds(&self, voltage_mv: i32) -> bool {
        self.dc_bus_under_voltage_mv <= voltage_mv && voltage_mv <= self.dc_bus_over_voltage_mv
    }

    /// Semantic checks on the loaded values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.dc_bus_under_voltage_mv < 0 {
            return Err(ConfigError::Invalid(format!(
                "dc_bus_under_voltage_mv must be >= 0, got {}",
                self.dc_bus_under_voltage_mv
            )));
        }
        if self.dc_bus_under_voltage_mv >= self.dc_bus_over_voltage_mv {
            return Err(ConfigError::Invalid(format!(
                "dc_bus_under_voltage_mv ({}) must be below dc_bus_over_voltage_mv ({})",
                self.dc_bus_under_voltage_mv, self.dc_bus_over_voltage_mv
            )));
        }
        if self.adc2_timeout_ticks < 0 {
            return Err(ConfigError::Invalid(format!(
                "adc2_timeout_ticks must be >= 0, got {}",
                self.adc2_timeout_ticks
            )));
        }
        if self.tick_heartbeat_period < 2 || self.sample_heartbeat_period < 2 {
            return Err(ConfigError::Invalid(
                "heartbeat periods must be at least 2".into(),
            ));
        }
        Ok(())
    }
}
