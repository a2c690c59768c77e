//! Primary pulse loss and the backup timer takeover.

use robobase_common::monitor::flags::FaultFlags;
use robobase_monitor::dispatch::event::InterruptEvent;

use super::{booted_default, period};

#[test]
fn boot_enables_timing_sources() {
    let monitor = booted_default();
    let timing = &monitor.board().timing;
    assert!(timing.pulse_irq_enabled.get());
    assert!(timing.backup_running.get());
    assert!(!monitor.is_degraded());
}

#[test]
fn primary_pulse_rearms_backup() {
    let monitor = booted_default();
    for _ in 0..10 {
        assert_eq!(period(&monitor, true, true), 1);
    }
    let timing = &monitor.board().timing;
    assert_eq!(timing.backup_rearms.get(), 10);
    assert_eq!(timing.edges_cleared.get(), 10);
    assert_eq!(timing.backup_pending_clears.get(), 0);
}

#[test]
fn pulse_loss_latches_backup_timer() {
    let monitor = booted_default();
    for _ in 0..5 {
        period(&monitor, true, true);
    }

    assert_eq!(period(&monitor, false, true), 1);
    assert!(monitor.is_degraded());
    assert!(monitor.fault_flags().contains(FaultFlags::IMU_TIMEOUT));
    assert!(!monitor.board().timing.pulse_irq_enabled.get());

    // The pulse coming back changes nothing: its interrupt stays disabled.
    for _ in 0..10 {
        assert_eq!(period(&monitor, true, true), 1);
    }
    let timing = &monitor.board().timing;
    assert_eq!(timing.backup_pending_clears.get(), 11);
    assert_eq!(timing.backup_rearms.get(), 5);
    assert_eq!(monitor.stats().tick_count, 16);
}

#[test]
fn late_primary_edge_does_not_double_tick() {
    let monitor = booted_default();
    monitor.on_backup_timer();
    let ticks = monitor.stats().tick_count;

    assert!(monitor.on_primary_pulse().is_none());
    assert_eq!(monitor.stats().tick_count, ticks);
}

#[test]
fn one_tick_per_period_through_queue() {
    let monitor = booted_default();
    monitor.post(InterruptEvent::PrimaryPulse).unwrap();
    monitor.post(InterruptEvent::FaultLines).unwrap();
    assert_eq!(monitor.pending_events(), 2);
    assert_eq!(monitor.run_pending(), 1);
    assert_eq!(monitor.pending_events(), 0);
}

#[test]
fn degraded_ticks_halt_control() {
    let monitor = booted_default();
    let board = monitor.board();
    board.shared.push_parameters();
    period(&monitor, false, true);

    let updates = board.wheel.updates.get();
    for _ in 0..5 {
        board.shared.push_parameters();
        period(&monitor, false, true);
    }
    assert_eq!(board.wheel.updates.get(), updates);
    assert!(monitor.snapshot().degraded);
}
