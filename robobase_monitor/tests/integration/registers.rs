//! Register mutation through the monitor: commutativity, actuation halt,
//! and the error/fault split on clear.

use robobase_common::monitor::flags::{ErrorFlags, FaultFlags, FaultLines};

use super::{NOMINAL_BUS_MV, booted_default};

const MASKS: [ErrorFlags; 4] = [
    ErrorFlags::MODULE_SLEEP,
    ErrorFlags::MOTOR2_HALL_SENSOR,
    ErrorFlags::DC_BUS_OVER_VOLTAGE,
    ErrorFlags::MOTOR4_OVER_CURRENT,
];

#[test]
fn set_order_does_not_matter() {
    let expected = MASKS.iter().fold(ErrorFlags::empty(), |a, &m| a | m);
    let orders: [[usize; 4]; 4] = [[0, 1, 2, 3], [3, 2, 1, 0], [1, 3, 0, 2], [2, 0, 3, 1]];
    for order in orders {
        let monitor = booted_default();
        for i in order {
            monitor.set_error_flags(MASKS[i]);
        }
        assert_eq!(monitor.error_flags(), expected, "order {order:?}");
        assert_eq!(monitor.board().shared.error_flags.get(), expected);
    }
}

#[test]
fn every_nonzero_set_stops_both_controllers() {
    let monitor = booted_default();
    let board = monitor.board();

    monitor.set_error_flags(ErrorFlags::MODULE_SLEEP);
    assert_eq!(board.wheel.stops.get(), 1);
    assert_eq!(board.dribble.stops.get(), 1);

    // Same bit again: register unchanged but still non-zero.
    monitor.set_error_flags(ErrorFlags::MODULE_SLEEP);
    assert_eq!(board.wheel.stops.get(), 2);
    assert_eq!(board.dribble.stops.get(), 2);

    monitor.set_fault_flags(FaultFlags::IMU_TIMEOUT);
    assert_eq!(board.stop_calls(), 6);
}

#[test]
fn empty_set_on_clean_register_does_not_stop() {
    let monitor = booted_default();
    monitor.set_error_flags(ErrorFlags::empty());
    monitor.set_fault_flags(FaultFlags::empty());
    assert_eq!(monitor.board().stop_calls(), 0);
    assert!(!monitor.is_any_problem_occurred());
}

#[test]
fn clear_never_touches_faults() {
    let monitor = booted_default();
    monitor.set_fault_flags(FaultFlags::all());
    monitor.set_error_flags(ErrorFlags::all());
    let writes = monitor.board().shared.fault_writes.get();

    let outcome = monitor.clear_error_flags();
    assert_eq!(outcome.released, ErrorFlags::all());
    assert_eq!(monitor.fault_flags(), FaultFlags::all());
    assert_eq!(monitor.board().shared.fault_writes.get(), writes);
    assert!(monitor.is_any_problem_occurred());
}

#[test]
fn in_range_voltage_clears_exactly_the_voltage_bit() {
    let monitor = booted_default();
    let board = monitor.board();
    board.lines.assert_line(FaultLines::MODULE_SLEEP);

    monitor.adc2_keep_alive(30_000);
    monitor.set_error_flags(ErrorFlags::MODULE_SLEEP);
    assert_eq!(
        monitor.error_flags(),
        ErrorFlags::DC_BUS_UNDER_VOLTAGE | ErrorFlags::MODULE_SLEEP
    );

    board.adc.dc_bus_voltage_mv.set(NOMINAL_BUS_MV);
    let outcome = monitor.clear_error_flags();
    assert_eq!(outcome.released, ErrorFlags::DC_BUS_UNDER_VOLTAGE);
    assert_eq!(monitor.error_flags(), ErrorFlags::MODULE_SLEEP);
}

#[test]
fn out_of_range_voltage_keeps_bit() {
    let monitor = booted_default();
    monitor.adc2_keep_alive(60_000);
    assert_eq!(monitor.error_flags(), ErrorFlags::DC_BUS_OVER_VOLTAGE);

    monitor.board().adc.dc_bus_voltage_mv.set(60_000);
    monitor.clear_error_flags();
    assert_eq!(monitor.error_flags(), ErrorFlags::DC_BUS_OVER_VOLTAGE);

    monitor.board().adc.dc_bus_voltage_mv.set(54_000);
    monitor.clear_error_flags();
    assert!(monitor.error_flags().is_empty());
}

#[test]
fn hall_error_released_per_motor() {
    use robobase_monitor::hal::DriverId;

    let monitor = booted_default();
    let board = monitor.board();
    board.vector_driver.set_hall_faults(0b0011);
    monitor.on_motor_driver(DriverId::Vector);
    assert_eq!(
        monitor.error_flags(),
        ErrorFlags::MOTOR1_HALL_SENSOR | ErrorFlags::MOTOR2_HALL_SENSOR
    );

    board.vector_driver.set_hall_faults(0b0010);
    monitor.clear_error_flags();
    assert_eq!(monitor.error_flags(), ErrorFlags::MOTOR2_HALL_SENSOR);
}
