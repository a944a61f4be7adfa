//! VwapLab CLI — run interval VWAP backtests and write the report tables.
//!
//! Commands:
//! - `run` — backtest a minute-panel CSV against a positions CSV
//! - `demo` — backtest seeded synthetic data end to end

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use vwaplab_core::synthetic::SyntheticConfig;
use vwaplab_runner::{
    run_from_sources, save_artifacts, BacktestConfig, CsvMinuteSource, CsvPositionSource,
    RunReport, SyntheticMinuteSource, SyntheticPositions,
};

#[derive(Parser)]
#[command(
    name = "vwaplab",
    about = "VwapLab CLI — interval VWAP backtests with daily and monthly PnL"
)]
struct Cli {
    /// Log filter (e.g. info, debug, vwaplab_core=trace). RUST_LOG wins if set.
    #[arg(long, default_value = "info", global = true)]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Backtest a minute panel against a target position file.
    Run {
        /// Path to a TOML config file. Defaults apply when omitted.
        #[arg(long)]
        config: Option<PathBuf>,

        /// Minute panel CSV: day,minute,instrument,vwap,volume.
        #[arg(long)]
        minutes: PathBuf,

        /// Target positions CSV: day,interval,instrument,weight.
        #[arg(long)]
        positions: PathBuf,

        /// Output directory for the artifact bundle.
        #[arg(long, default_value = "results")]
        output_dir: PathBuf,
    },
    /// Backtest seeded synthetic data.
    Demo {
        /// Path to a TOML config file. Defaults apply when omitted.
        #[arg(long)]
        config: Option<PathBuf>,

        /// RNG seed for prices and positions.
        #[arg(long, default_value_t = 42)]
        seed: u64,

        /// Trading days to generate.
        #[arg(long, default_value_t = 20)]
        days: usize,

        /// Number of instruments.
        #[arg(long, default_value_t = 5)]
        instruments: usize,

        /// Output directory for the artifact bundle.
        #[arg(long, default_value = "results")]
        output_dir: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(&cli.log_level)?;

    match cli.command {
        Commands::Run {
            config,
            minutes,
            positions,
            output_dir,
        } => run_cmd(config.as_deref(), &minutes, &positions, &output_dir),
        Commands::Demo {
            config,
            seed,
            days,
            instruments,
            output_dir,
        } => demo_cmd(config.as_deref(), seed, days, instruments, &output_dir),
    }
}

fn init_tracing(level: &str) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| anyhow::anyhow!("failed to install tracing subscriber: {e}"))
}

fn load_config(path: Option<&Path>) -> Result<BacktestConfig> {
    match path {
        Some(path) => BacktestConfig::from_file(path)
            .with_context(|| format!("failed to load config {}", path.display())),
        None => Ok(BacktestConfig::default()),
    }
}

fn run_cmd(
    config_path: Option<&Path>,
    minutes: &Path,
    positions: &Path,
    output_dir: &Path,
) -> Result<()> {
    let config = load_config(config_path)?;
    info!(minutes = %minutes.display(), positions = %positions.display(), "starting run");

    let report = run_from_sources(
        &config,
        &CsvMinuteSource::new(minutes),
        &CsvPositionSource::new(positions),
    )?;
    finish(&report, output_dir)
}

fn demo_cmd(
    config_path: Option<&Path>,
    seed: u64,
    days: usize,
    instruments: usize,
    output_dir: &Path,
) -> Result<()> {
    let config = load_config(config_path)?;
    let synthetic = SyntheticConfig {
        seed,
        days,
        instruments,
        ..SyntheticConfig::default()
    };
    info!(seed, days, instruments, "starting synthetic demo");

    let report = run_from_sources(
        &config,
        &SyntheticMinuteSource::new(synthetic),
        &SyntheticPositions {
            seed: seed.wrapping_add(1),
        },
    )?;
    finish(&report, output_dir)
}

fn finish(report: &RunReport, output_dir: &Path) -> Result<()> {
    print_summary(report);
    let paths = save_artifacts(report, output_dir)?;
    println!("Artifacts saved to: {}", paths.dir.display());
    Ok(())
}

fn print_summary(report: &RunReport) {
    let stats = &report.stats;
    println!();
    println!("=== Backtest Result ===");
    println!("Run:            {}", report.fingerprint.short_id());
    println!("Instruments:    {}", stats.instruments);
    if let (Some(first), Some(last)) = (report.first_interval, report.last_interval) {
        println!("Period:         {first} to {last}");
    }
    println!(
        "Intervals:      {} ({} skipped, {} cells filled)",
        stats.intervals, stats.steps_skipped, stats.filled_cells
    );
    println!();
    println!("--- Performance ---");
    println!("Initial Capital:{:.2}", stats.initial_capital);
    println!("Final Capital:  {:.2}", stats.final_capital);
    println!("Total Return:   {:.2}%", stats.total_return * 100.0);
    println!("Total Cost:     {:.2}", stats.total_cost);
    println!("Days:           {}", report.daily.len());

    if !report.monthly.is_empty() {
        println!();
        println!("--- Monthly ---");
        println!(
            "{:<10} {:>10} {:>8} {:>10} {:>8}",
            "month", "return%", "sharpe", "turnover", "maxdd%"
        );
        for m in &report.monthly {
            println!(
                "{:<10} {:>10.3} {:>8.3} {:>10.3} {:>8.3}",
                m.month.format("%Y-%m").to_string(),
                m.ret,
                m.sharpe,
                m.turnover,
                m.max_drawdown
            );
        }
    }

    if report.has_synthetic {
        println!();
        println!("WARNING: Results based on SYNTHETIC data");
    }
    println!();
}
