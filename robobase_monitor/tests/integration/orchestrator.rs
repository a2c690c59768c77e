//! Periodic common work: control update vs. halted path, heartbeats and
//! telemetry.

use robobase_common::monitor::config::MonitorConfig;
use robobase_common::monitor::flags::{ErrorFlags, FaultFlags};
use robobase_monitor::cycle::TickMode;

use super::{booted, booted_default};

#[test]
fn healthy_tick_updates_both_controllers() {
    let monitor = booted_default();
    let board = monitor.board();

    board.shared.push_parameters();
    let report = monitor.do_periodic_common_work();
    assert_eq!(
        report.mode,
        TickMode::Normal {
            parameters_changed: true
        }
    );
    assert_eq!(board.wheel.last_update.get(), Some(true));
    assert_eq!(board.dribble.last_update.get(), Some(true));

    // No new parameters: the loops still run.
    monitor.do_periodic_common_work();
    assert_eq!(board.wheel.last_update.get(), Some(false));
    assert_eq!(board.wheel.updates.get(), 2);
    assert_eq!(board.dribble.changed_updates.get(), 1);
}

#[test]
fn problem_tick_skips_update_and_flushes_parameters() {
    let monitor = booted_default();
    let board = monitor.board();
    monitor.set_error_flags(ErrorFlags::MODULE_SLEEP);

    board.shared.push_parameters();
    let report = monitor.do_periodic_common_work();
    assert_eq!(
        report.mode,
        TickMode::Halted {
            clear_requested: false
        }
    );
    assert_eq!(board.wheel.updates.get(), 0);
    assert_eq!(board.dribble.updates.get(), 0);
    assert!(!board.shared.has_pending_parameters());
    assert_eq!(board.shared.parameter_clears.get(), 1);
    // No clear without a request.
    assert_eq!(monitor.error_flags(), ErrorFlags::MODULE_SLEEP);
}

#[test]
fn clear_request_ignored_when_healthy() {
    let monitor = booted_default();
    let board = monitor.board();
    board.shared.request_clear();
    let report = monitor.do_periodic_common_work();
    assert!(matches!(report.mode, TickMode::Normal { .. }));
}

#[test]
fn each_tick_transmits_status_and_motion() {
    let monitor = booted_default();
    let board = monitor.board();
    monitor.set_fault_flags(FaultFlags::MOTOR3_LOAD_SWITCH);
    for _ in 0..3 {
        monitor.do_periodic_common_work();
    }
    assert_eq!(board.telemetry.status_frames.get(), 3);
    assert_eq!(board.telemetry.motion_frames.get(), 3);
    let status = board.telemetry.last_status.get().unwrap();
    assert_eq!(status.fault_flags, FaultFlags::MOTOR3_LOAD_SWITCH.bits());
    assert_eq!(status.error_flags, 0);
}

#[test]
fn performance_counter_saturates() {
    let monitor = booted_default();
    let board = monitor.board();

    board.perf.cycles_per_section.set(1_234);
    assert_eq!(monitor.do_periodic_common_work().performance_counter, 1_234);

    board.perf.cycles_per_section.set(1 << 20);
    assert_eq!(monitor.do_periodic_common_work().performance_counter, u16::MAX);
    assert_eq!(board.telemetry.last_performance_counter.get(), Some(u16::MAX));
    assert_eq!(monitor.stats().saturated, 1);
    assert_eq!(monitor.stats().max_cycles, 1 << 20);
}

#[test]
fn boot_initializes_peripherals() {
    let monitor = booted_default();
    let board = monitor.board();
    assert!(board.perf.running.get());
    assert_eq!(board.switches.all_on_calls.get(), 1);
    assert!((1..=5).all(|m| board.switches.is_enabled(m)));
    assert_eq!(
        board.timing.delayed_us.get(),
        u64::from(MonitorConfig::DEFAULT.sensor_settle_delay_us)
    );
    assert_eq!(board.vector_driver.takes.get(), 1);
    assert_eq!(board.dribble_driver.resets.get(), 1);
}

#[test]
fn heartbeats_blink() {
    let config = MonitorConfig {
        tick_heartbeat_period: 4,
        sample_heartbeat_period: 2,
        ..MonitorConfig::DEFAULT
    };
    let monitor = booted(config);
    let leds = &monitor.board().leds;

    monitor.do_periodic_common_work();
    assert!(!leds.is_lit(5));
    monitor.do_periodic_common_work();
    assert!(leds.is_lit(5));
    monitor.do_periodic_common_work();
    monitor.do_periodic_common_work();
    assert!(!leds.is_lit(5));

    monitor.adc2_keep_alive(48_000);
    assert!(leds.is_lit(1));
    monitor.adc2_keep_alive(48_000);
    assert!(!leds.is_lit(1));
}

#[test]
fn snapshot_reports_state() {
    let monitor = booted_default();
    monitor.set_error_flags(ErrorFlags::MOTOR1_OVER_CURRENT);
    monitor.do_periodic_common_work();
    let snap = monitor.snapshot();
    assert_eq!(snap.errors, ErrorFlags::MOTOR1_OVER_CURRENT);
    assert!(snap.faults.is_empty());
    assert_eq!(snap.adc2_countdown, MonitorConfig::DEFAULT.adc2_timeout_ticks - 1);
    assert!(!snap.degraded);
    assert_eq!(snap.ticks, 1);
}

#[test]
fn invalid_config_rejected() {
    use robobase_monitor::CentralizedMonitor;
    use robobase_monitor::sim::SimBoard;

    let config = MonitorConfig {
        dc_bus_under_voltage_mv: 60_000,
        ..MonitorConfig::DEFAULT
    };
    assert!(CentralizedMonitor::new(SimBoard::new(), config).is_err());
}
