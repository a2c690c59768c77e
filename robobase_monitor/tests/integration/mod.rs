//! Shared helpers for the integration suites.

use robobase_common::monitor::config::MonitorConfig;
use robobase_monitor::CentralizedMonitor;
use robobase_monitor::dispatch::event::{AnalogSample, InterruptEvent};
use robobase_monitor::sim::SimBoard;

mod orchestrator;
mod registers;
mod stop_recovery;
mod timing_failover;
mod watchdog;

pub const NOMINAL_BUS_MV: i32 = 48_000;

/// Monitor on a fresh simulated board, booted.
pub fn booted(config: MonitorConfig) -> CentralizedMonitor<SimBoard> {
    let monitor = CentralizedMonitor::new(SimBoard::new(), config).unwrap();
    monitor.boot();
    monitor
}

pub fn booted_default() -> CentralizedMonitor<SimBoard> {
    booted(MonitorConfig::DEFAULT)
}

/// One simulated period: raise whatever the hardware would, optionally an
/// analog sample, then drain. Returns the number of ticks run.
pub fn period(monitor: &CentralizedMonitor<SimBoard>, primary_alive: bool, analog: bool) -> usize {
    let board = monitor.board();
    for event in board.raise_interrupts(primary_alive) {
        monitor.post(event).unwrap();
    }
    if analog {
        monitor
            .post(InterruptEvent::AnalogSample(AnalogSample {
                dc_bus_voltage_mv: board.adc.dc_bus_voltage_mv.get(),
                dribble_current_ma: 0,
            }))
            .unwrap();
    }
    monitor.run_pending()
}
