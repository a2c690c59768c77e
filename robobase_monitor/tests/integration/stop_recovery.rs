//! External stop assertion, recovery, and motor-driver re-arm.

use robobase_common::monitor::flags::{ErrorFlags, FaultFlags, FaultLines};
use robobase_monitor::cycle::TickMode;
use robobase_monitor::hal::{DriverId, DriverIrq};

use super::{booted_default, period};

#[test]
fn stop_then_release_then_clear_recovers() {
    let monitor = booted_default();
    let board = monitor.board();

    board.lines.assert_line(FaultLines::EXTERNAL_STOP);
    period(&monitor, true, true);
    assert_eq!(monitor.error_flags(), ErrorFlags::EXTERNAL_STOP);
    assert!(!board.lines.pending().contains(FaultLines::EXTERNAL_STOP));

    // Clear while still asserted keeps the bit and leaves the drivers alone.
    let resets = board.vector_driver.resets.get();
    let outcome = monitor.clear_error_flags();
    assert_eq!(outcome.remaining, ErrorFlags::EXTERNAL_STOP);
    assert!(!outcome.rearm_drivers);
    assert_eq!(board.vector_driver.resets.get(), resets);

    board.lines.deassert_line(FaultLines::EXTERNAL_STOP);
    let outcome = monitor.clear_error_flags();
    assert_eq!(outcome.released, ErrorFlags::EXTERNAL_STOP);
    assert!(outcome.rearm_drivers);
    assert!(monitor.error_flags().is_empty());
    for id in DriverId::ALL {
        let driver = board.sim_driver(id);
        assert_eq!(driver.resets.get(), resets + 1, "{id:?}");
        assert!(!driver.irq_pending());
    }

    board.shared.push_parameters();
    period(&monitor, true, true);
    assert_eq!(board.wheel.last_update.get(), Some(true));
}

#[test]
fn host_clear_request_runs_on_tick() {
    let monitor = booted_default();
    let board = monitor.board();

    board.lines.assert_line(FaultLines::EXTERNAL_STOP);
    period(&monitor, true, true);
    board.lines.deassert_line(FaultLines::EXTERNAL_STOP);

    board.shared.request_clear();
    let report = monitor.on_primary_pulse().unwrap();
    assert_eq!(
        report.mode,
        TickMode::Halted {
            clear_requested: true
        }
    );
    assert!(monitor.error_flags().is_empty());
    assert_eq!(
        board.telemetry.last_status.get().map(|f| f.error_flags),
        Some(0)
    );
}

#[test]
fn driver_faults_ignored_while_stopped() {
    let monitor = booted_default();
    let board = monitor.board();

    board.lines.assert_line(FaultLines::EXTERNAL_STOP);
    board
        .dribble_driver
        .raise(DriverIrq::OVER_TEMPERATURE_FAULT | DriverIrq::OVER_CURRENT_FAULT, 0);
    period(&monitor, true, true);
    assert!(monitor.fault_flags().is_empty());
    assert_eq!(monitor.error_flags(), ErrorFlags::EXTERNAL_STOP);

    board.lines.deassert_line(FaultLines::EXTERNAL_STOP);
    board.dribble_driver.raise(DriverIrq::OVER_TEMPERATURE_FAULT, 0);
    period(&monitor, true, true);
    assert_eq!(monitor.fault_flags(), FaultFlags::MOTOR5_OVER_TEMPERATURE);
}

#[test]
fn hall_error_reported_even_while_stopped() {
    let monitor = booted_default();
    let board = monitor.board();
    board.lines.assert_line(FaultLines::EXTERNAL_STOP);
    board.dribble_driver.raise(DriverIrq::HALL_SENSOR_FAULT, 0b1);
    monitor.on_motor_driver(DriverId::Dribble);
    assert!(monitor.error_flags().contains(ErrorFlags::MOTOR5_HALL_SENSOR));
}

#[test]
fn hall_interrupt_without_channels_halts() {
    let monitor = booted_default();
    let board = monitor.board();
    board.dribble_driver.raise(DriverIrq::HALL_SENSOR_FAULT, 0);
    monitor.on_motor_driver(DriverId::Dribble);
    assert_eq!(monitor.error_flags(), ErrorFlags::MOTOR5_HALL_SENSOR);
    assert!(board.stop_calls() > 0);

    board.shared.push_parameters();
    let report = monitor.do_periodic_common_work();
    assert_eq!(
        report.mode,
        TickMode::Halted {
            clear_requested: false
        }
    );
    assert_eq!(board.wheel.last_update.get(), None);
}

#[test]
fn injected_fault_latches_after_rearm() {
    let monitor = booted_default();
    let board = monitor.board();
    monitor.inject_driver_fault();
    assert!(board.vector_driver.is_forced());
    assert!(board.dribble_driver.is_forced());

    period(&monitor, true, true);
    assert_eq!(
        monitor.fault_flags(),
        FaultFlags::MOTOR1_OVER_CURRENT | FaultFlags::MOTOR5_OVER_CURRENT
    );

    // Faults have no clear path.
    board.shared.request_clear();
    period(&monitor, true, true);
    assert_eq!(
        monitor.fault_flags(),
        FaultFlags::MOTOR1_OVER_CURRENT | FaultFlags::MOTOR5_OVER_CURRENT
    );
    assert!(!board.vector_driver.is_forced());
}
