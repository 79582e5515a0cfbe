//! imu-monitor: live view of a nine-axis IMU.
//!
//! Samples the accelerometer, compass and gyroscope, smooths and normalizes
//! every axis, and redraws the terminal until Ctrl+C or SIGTERM.
//!
//! Run: `imu-monitor --period-ms 30`

#![cfg_attr(test, allow(clippy::unwrap_used))]

use imu_monitor::config::SourceKind;
use imu_monitor::{
    debug, install_signal_handlers, BoxedSource, Config, DisplaySink, HeadlessDisplay,
    SamplingLoop, ShutdownFlag, SimulatedSource, TerminalDisplay,
};

use anyhow::{bail, Context, Result};
use clap::Parser;
use std::path::PathBuf;

/// imu-monitor: adaptive smoothing and normalization for IMU channels
#[derive(Parser, Debug)]
#[command(name = "imu-monitor")]
#[command(version)]
#[command(about = "Live smoothed and normalized IMU readings", long_about = None)]
struct Cli {
    /// Sampling period in milliseconds
    #[arg(short, long)]
    period_ms: Option<u64>,

    /// Smoothing coefficient per microsecond of period
    #[arg(long)]
    coefficient: Option<f64>,

    /// Config file path
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Seed for simulated sensors
    #[arg(long)]
    seed: Option<u64>,

    /// Enable debug logging (stderr with --headless, otherwise needs --log-file)
    #[arg(long)]
    debug: bool,

    /// Log to a file instead of stderr
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Run without drawing anything
    #[arg(long)]
    headless: bool,

    /// Stop after this many iterations
    #[arg(short = 'n', long, value_parser = clap::value_parser!(u64).range(1..))]
    iterations: Option<u64>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    debug::enable_from_env();
    if cli.debug {
        debug::enable();
    }
    if let Some(path) = &cli.log_file {
        debug::enable_to_file(path)
            .with_context(|| format!("cannot open log file {}", path.display()))?;
    }
    check_log_target(debug::is_enabled(), &cli)?;

    let config = load_config(&cli)?;
    let sources = open_sources(&config);

    let shutdown = ShutdownFlag::new();
    install_signal_handlers(&shutdown)?;

    let sink: Box<dyn DisplaySink> = if cli.headless {
        Box::new(HeadlessDisplay::new())
    } else {
        Box::new(TerminalDisplay::new(config.display.clone())?)
    };

    let mut sampler = SamplingLoop::new(sources, sink, shutdown, &config)?;
    if let Some(limit) = cli.iterations {
        sampler = sampler.with_iteration_limit(limit);
    }

    let summary = sampler.run()?;

    if cli.headless {
        println!("{} iterations", summary.iterations);
        for (id, state) in summary.channels.iter() {
            println!(
                "{:<10} raw {:>6}  smoothed {:>9.2}  range [{:.2}, {:.2}]  normalized {:+.3}",
                id.name(),
                state.raw,
                state.smoothed,
                state.min,
                state.max,
                state.normalized
            );
        }
    }

    Ok(())
}

/// stderr shares the terminal with the display, so terminal runs must log
/// to a file.
fn check_log_target(logging: bool, cli: &Cli) -> Result<()> {
    if logging && !cli.headless && cli.log_file.is_none() {
        bail!("debug logging would draw over the display: add --log-file <PATH> or --headless");
    }
    Ok(())
}

/// File (explicit or default location), then CLI overrides.
fn load_config(cli: &Cli) -> Result<Config> {
    let mut config = match (&cli.config, Config::default_path()) {
        (Some(path), _) => Config::load(path)
            .with_context(|| format!("cannot load config {}", path.display()))?,
        (None, Some(path)) => Config::load_or_default(&path)?,
        (None, None) => Config::default(),
    };

    if let Some(ms) = cli.period_ms {
        config.sampling.period_us = ms.saturating_mul(1000);
    }
    if let Some(coefficient) = cli.coefficient {
        config.sampling.smoothing_coefficient = coefficient;
    }
    if let Some(seed) = cli.seed {
        config.source.seed = seed;
    }

    config.validate()?;
    Ok(config)
}

fn open_sources(config: &Config) -> Vec<BoxedSource> {
    match config.source.kind {
        SourceKind::Simulated => config
            .source
            .groups
            .iter()
            .map(|&group| {
                Box::new(SimulatedSource::new(group, config.source.seed, config.source.noise))
                    as BoxedSource
            })
            .collect(),
    }
}
