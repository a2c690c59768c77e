//! Analog keep-alive watchdog driven through real ticks.

use robobase_common::monitor::config::MonitorConfig;
use robobase_common::monitor::flags::FaultFlags;
use robobase_monitor::safety::watchdog::WatchdogStatus;

use super::{NOMINAL_BUS_MV, booted, period};

fn config(timeout: i32) -> MonitorConfig {
    MonitorConfig {
        adc2_timeout_ticks: timeout,
        ..MonitorConfig::DEFAULT
    }
}

#[test]
fn threshold_five_faults_on_tick_five() {
    let monitor = booted(config(5));
    for tick in 0..5 {
        let report = monitor.do_periodic_common_work();
        assert!(
            matches!(report.watchdog, WatchdogStatus::Alive { .. }),
            "tick {tick}: {:?}",
            report.watchdog
        );
        assert!(!monitor.fault_flags().contains(FaultFlags::ADC2_TIMEOUT));
    }
    let report = monitor.do_periodic_common_work();
    assert_eq!(report.watchdog, WatchdogStatus::Expired);
    assert!(monitor.fault_flags().contains(FaultFlags::ADC2_TIMEOUT));
}

#[test]
fn timeout_fault_written_once() {
    let monitor = booted(config(2));
    for _ in 0..20 {
        monitor.do_periodic_common_work();
    }
    assert_eq!(monitor.fault_flags(), FaultFlags::ADC2_TIMEOUT);
    assert_eq!(monitor.board().shared.fault_writes.get(), 1);
    assert!(monitor.snapshot().adc2_countdown < 0);
}

#[test]
fn keep_alive_resets_countdown() {
    let monitor = booted(config(5));
    for _ in 0..4 {
        monitor.do_periodic_common_work();
    }
    assert_eq!(monitor.snapshot().adc2_countdown, 1);
    monitor.adc2_keep_alive(NOMINAL_BUS_MV);
    assert_eq!(monitor.snapshot().adc2_countdown, 5);

    for _ in 0..5 {
        monitor.do_periodic_common_work();
    }
    assert!(monitor.fault_flags().is_empty());
}

#[test]
fn steady_samples_never_time_out() {
    let monitor = booted(config(3));
    for _ in 0..200 {
        assert_eq!(period(&monitor, true, true), 1);
    }
    assert!(!monitor.is_any_problem_occurred());
    assert_eq!(monitor.board().telemetry.analog_frames.get(), 200);
}

#[test]
fn lost_samples_time_out_and_halt() {
    let monitor = booted(config(3));
    monitor.board().shared.push_parameters();
    for _ in 0..10 {
        period(&monitor, true, true);
    }
    for _ in 0..4 {
        period(&monitor, true, false);
    }
    assert_eq!(monitor.fault_flags(), FaultFlags::ADC2_TIMEOUT);
    assert!(monitor.board().stop_calls() >= 2);

    // Samples resuming do not release a fault.
    for _ in 0..5 {
        period(&monitor, true, true);
    }
    monitor.board().shared.request_clear();
    period(&monitor, true, true);
    assert_eq!(monitor.fault_flags(), FaultFlags::ADC2_TIMEOUT);
}

#[test]
fn zero_threshold_faults_on_first_tick() {
    let monitor = booted(config(0));
    assert_eq!(monitor.do_periodic_common_work().watchdog, WatchdogStatus::Expired);
    assert!(monitor.fault_flags().contains(FaultFlags::ADC2_TIMEOUT));
}
