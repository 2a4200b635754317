use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use tokio::task;
use tracing::info;
use tracing_subscriber::EnvFilter;

use backtest::{current_setup, run_grid, run_grid_with_threads, BacktestResult, TradeSetup};
use common::{ChartData, Config};
use strategy::GridFileConfig;

#[derive(Parser, Debug)]
#[command(author, version, about = "Indicators, strategy backtests and scalp signals over candle charts.")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Score the latest candle and suggest entry/exit levels.
    Analyze {
        /// Chart JSON file (`{"oclhv": [...]}`).
        chart: PathBuf,
    },

    /// Grid-search the entry rules and report the best parameter sets.
    Backtest {
        /// Chart JSON file (`{"oclhv": [...]}`).
        chart: PathBuf,

        /// Parameter grid TOML. Overrides GRID_CONFIG_PATH.
        #[arg(long)]
        grid: Option<String>,

        /// Number of ranked results to print. Overrides SIGNAL_TOP_RESULTS.
        #[arg(long)]
        top: Option<usize>,

        /// Worker threads for the grid. Overrides GRID_THREADS.
        #[arg(long)]
        threads: Option<usize>,
    },

    /// Plain indicator readout for the latest candle.
    Summary {
        /// Chart JSON file (`{"oclhv": [...]}`).
        chart: PathBuf,
    },
}

#[derive(Debug, Serialize)]
struct BacktestReport<'a> {
    candles: usize,
    combinations: usize,
    top: &'a [BacktestResult],
    setup: Option<TradeSetup>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // ── Logging ──────────────────────────────────────────────────────────────
    // stderr only: stdout carries the JSON result
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    // ── Config ────────────────────────────────────────────────────────────────
    let cfg = Config::from_env().context("failed to load configuration")?;
    let cli = Cli::parse();

    match cli.command {
        Commands::Analyze { chart } => {
            let chart = load_chart(&chart).await?;
            let analysis = signal::analyze(&chart.closes(), &chart.volumes(), &chart.times())
                .context("signal analysis failed")?;
            info!(kind = %analysis.signal.kind, confidence_pct = analysis.signal.confidence_pct, "Analysis complete");
            print_json(&analysis)?;
        }
        Commands::Backtest {
            chart,
            grid,
            top,
            threads,
        } => {
            let chart = load_chart(&chart).await?;
            let grid_path = grid.unwrap_or_else(|| cfg.grid_config_path.clone());
            let top = top.unwrap_or(cfg.top_results);
            let threads = threads.or(cfg.grid_threads);
            handle_backtest(&cfg, &chart, &grid_path, top, threads).await?;
        }
        Commands::Summary { chart } => {
            let chart = load_chart(&chart).await?;
            let summary = signal::summarize(&chart.closes(), &chart.volumes())
                .context("technical summary failed")?;
            print_json(&summary)?;
        }
    }

    Ok(())
}

async fn load_chart(path: &Path) -> Result<ChartData> {
    let text = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("failed to read chart file {}", path.display()))?;
    let chart = ChartData::from_json(&text)
        .with_context(|| format!("failed to parse chart file {}", path.display()))?;
    info!(path = %path.display(), candles = chart.len(), "Chart loaded");
    Ok(chart)
}

/// Run the whole grid on the blocking pool, bounded by the configured timeout.
async fn handle_backtest(
    cfg: &Config,
    chart: &ChartData,
    grid_path: &str,
    top: usize,
    threads: Option<usize>,
) -> Result<()> {
    let param_sets = GridFileConfig::load(grid_path)
        .and_then(|grid| grid.param_sets())
        .with_context(|| format!("invalid parameter grid {grid_path}"))?;
    let combinations = param_sets.len();

    let prices = chart.closes();
    let batch = {
        let prices = prices.clone();
        let times = chart.times();
        task::spawn_blocking(move || match threads {
            Some(n) => run_grid_with_threads(&prices, &times, &param_sets, n),
            None => run_grid(&prices, &times, &param_sets),
        })
    };

    let limit = Duration::from_secs(cfg.grid_timeout_secs);
    let results = tokio::time::timeout(limit, batch)
        .await
        .map_err(|_| anyhow!("grid search timed out after {}s", cfg.grid_timeout_secs))?
        .context("grid search task failed")?
        .context("grid search failed")?;

    let setup = results
        .first()
        .map(|best| current_setup(best, &prices))
        .transpose()
        .context("failed to derive current setup")?;

    let report = BacktestReport {
        candles: prices.len(),
        combinations,
        top: &results[..top.min(results.len())],
        setup,
    };
    print_json(&report)
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
