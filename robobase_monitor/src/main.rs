//! # Robot Base Monitor Simulation
//!
//! Runs the centralized monitor against the simulated board for a fixed
//! number of ticks. Scenarios inject the failures the monitor guards
//! against: primary pulse loss, analog sample loss, an external stop pulse,
//! and a host clear request.

use std::path::PathBuf;
use std::process;

use clap::Parser;
use robobase_common::config::LogLevel;
use robobase_common::monitor::flags::FaultLines;
use robobase_common::consts::TICK_PERIOD_US;
use robobase_monitor::config::{LoadedConfig, load_config};
use robobase_monitor::dispatch::event::{AnalogSample, InterruptEvent};
use robobase_monitor::sim::SimBoard;
use robobase_monitor::CentralizedMonitor;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

/// Robot base monitor simulation
#[derive(Parser, Debug)]
#[command(name = "robobase_monitor")]
#[command(version)]
#[command(about = "Simulate the robot base fault monitor and tick orchestrator")]
struct Args {
    /// Path to configuration TOML.
    #[arg(long, default_value = "config/monitor.toml")]
    config: PathBuf,

    /// Number of tick periods to simulate.
    #[arg(long, default_value_t = 1000)]
    ticks: u32,

    /// Stop the primary pulse from this period on.
    #[arg(long, value_name = "PERIOD")]
    lose_primary_at: Option<u32>,

    /// Stop analog samples from this period on.
    #[arg(long, value_name = "PERIOD")]
    lose_analog_at: Option<u32>,

    /// Assert the external stop line over [START, END).
    #[arg(long, num_args = 2, value_names = ["START", "END"])]
    stop_pulse: Option<Vec<u32>>,

    /// Host requests an error clear at this period.
    #[arg(long, value_name = "PERIOD")]
    clear_at: Option<u32>,

    /// Simulated DC bus voltage [mV].
    #[arg(long, default_value_t = 48_000)]
    dc_bus_mv: i32,

    /// Enable verbose logging (DEBUG level).
    #[arg(short, long)]
    verbose: bool,

    /// Output logs in JSON format.
    #[arg(long)]
    json: bool,
}

fn main() {
    let args = Args::parse();
    let loaded = load_config(&args.config);
    setup_tracing(&args, loaded.as_ref().ok().map(|l| l.shared.log_level));

    info!("Robot base monitor v{} starting...", env!("CARGO_PKG_VERSION"));

    if let Err(e) = loaded.map_err(Into::into).and_then(|l| run(&args, l)) {
        error!("FATAL: {e}");
        process::exit(1);
    }

    info!("Simulation complete");
}

fn run(args: &Args, loaded: LoadedConfig) -> Result<(), Box<dyn std::error::Error>> {
    info!(
        "Config OK: service={}, bus=[{}, {}] mV, adc2_timeout={} ticks",
        loaded.shared.service_name,
        loaded.monitor.dc_bus_under_voltage_mv,
        loaded.monitor.dc_bus_over_voltage_mv,
        loaded.monitor.adc2_timeout_ticks,
    );
    if !loaded.monitor.voltage_in_bounds(args.dc_bus_mv) {
        warn!("Simulated bus voltage {} mV is out of bounds", args.dc_bus_mv);
    }

    let board = SimBoard::new();
    board.adc.dc_bus_voltage_mv.set(args.dc_bus_mv);
    board.shared.push_parameters();

    let monitor = CentralizedMonitor::new(board, loaded.monitor)?;
    monitor.boot();

    let stop_window = match args.stop_pulse.as_deref() {
        Some(&[start, end]) => Some(start..end),
        _ => None,
    };

    for period in 0..args.ticks {
        let board = monitor.board();

        if let Some(window) = &stop_window {
            if period == window.start {
                info!(period, "external stop asserted");
                board.lines.assert_line(FaultLines::EXTERNAL_STOP);
            } else if period == window.end {
                info!(period, "external stop released");
                board.lines.deassert_line(FaultLines::EXTERNAL_STOP);
            }
        }
        if args.clear_at == Some(period) {
            board.shared.request_clear();
        }

        let primary_alive = args.lose_primary_at.is_none_or(|at| period < at);
        for event in board.raise_interrupts(primary_alive) {
            monitor.post(event)?;
        }
        if args.lose_analog_at.is_none_or(|at| period < at) {
            monitor.post(InterruptEvent::AnalogSample(AnalogSample {
                dc_bus_voltage_mv: board.adc.dc_bus_voltage_mv.get(),
                dribble_current_ma: 0,
            }))?;
        }
        monitor.run_pending();
    }

    let health = monitor.snapshot();
    let stats = monitor.stats();
    info!(
        "Health: error={:08X} fault={:08X} adc2_countdown={} degraded={}",
        health.errors.bits(),
        health.faults.bits(),
        health.adc2_countdown,
        health.degraded,
    );
    info!(
        "Ticks: total={} ({} ms simulated) halted={} avg={} max={} cycles",
        stats.tick_count,
        u64::from(args.ticks) * u64::from(TICK_PERIOD_US) / 1000,
        stats.halted_ticks,
        stats.avg_cycles(),
        stats.max_cycles,
    );
    if monitor.is_any_problem_occurred() {
        warn!("Problems active at end of run: {:?} / {:?}", health.errors, health.faults);
    }

    Ok(())
}

/// `RUST_LOG` wins, then `--verbose`, then `shared.log_level` from the
/// config file.
fn setup_tracing(args: &Args, configured: Option<LogLevel>) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(args.verbose, configured)));

    if args.json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .compact()
            .init();
    }
}

fn default_directive(verbose: bool, configured: Option<LogLevel>) -> &'static str {
    if verbose {
        LogLevel::Debug.as_directive()
    } else {
        configured.unwrap_or_default().as_directive()
    }
}
