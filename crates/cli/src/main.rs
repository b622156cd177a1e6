use anyhow::Result;
use clap::{Parser, Subcommand};
use std::sync::Arc;
use tokio::sync::watch;
use tracing_subscriber::EnvFilter;

mod provider;

use provider::RsiThresholdProvider;
use tradesim_core::{ConfigLoader, DashboardSink, StatsFormatter};
use tradesim_engine::{BacktestRunner, CsvCandleSupplier, JsonLinesSink, PaperTrader};

#[derive(Parser)]
#[command(name = "tradesim")]
#[command(about = "Candle replay and paper trading simulator", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a backtest over a CSV candle file
    Backtest {
        /// Historical candle CSV (timestamp,open,high,low,close,volume)
        #[arg(short, long)]
        data: String,
        /// Config file path
        #[arg(short, long, default_value = "config/Config.toml")]
        config: String,
        /// Write the full result as JSON
        #[arg(short, long)]
        output: Option<String>,
        /// Append dashboard updates as JSON lines
        #[arg(long)]
        dashboard: Option<String>,
    },
    /// Paper trade against the tail of a (growing) CSV candle file
    Paper {
        /// Candle CSV polled on every timer tick
        #[arg(short, long)]
        data: String,
        /// Config file path
        #[arg(short, long, default_value = "config/Config.toml")]
        config: String,
        /// Append dashboard updates as JSON lines
        #[arg(long)]
        dashboard: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Backtest {
            data,
            config,
            output,
            dashboard,
        } => run_backtest(&data, &config, output.as_deref(), dashboard).await,
        Commands::Paper {
            data,
            config,
            dashboard,
        } => run_paper(&data, &config, dashboard).await,
    }
}

async fn run_backtest(
    data: &str,
    config_path: &str,
    output: Option<&str>,
    dashboard: Option<String>,
) -> Result<()> {
    let config = ConfigLoader::load_from(config_path)?;
    let candles = CsvCandleSupplier::from_csv(data)?.into_candles();
    let initial_capital = config.simulation.initial_capital;

    let mut runner = BacktestRunner::new(config, Arc::new(RsiThresholdProvider::default()));
    if let Some(path) = dashboard {
        runner = runner.with_sink(Arc::new(JsonLinesSink::new(path)));
    }

    let result = runner.run(candles).await?;
    println!("{}", StatsFormatter::format(&result.stats, initial_capital));

    if result.fault_count > 0 {
        tracing::warn!(faults = result.fault_count, "run absorbed per-candle faults");
    }
    if let Some(path) = output {
        result.save_to_json(path)?;
        println!("Result written to {path}");
    }

    Ok(())
}

async fn run_paper(data: &str, config_path: &str, dashboard: Option<String>) -> Result<()> {
    let config = ConfigLoader::load_from(config_path)?;
    let supplier = Arc::new(CsvCandleSupplier::from_csv(data)?);
    let sink = dashboard.map(|path| Arc::new(JsonLinesSink::new(path)) as Arc<dyn DashboardSink>);

    let mut trader = PaperTrader::new(
        config,
        supplier,
        Arc::new(RsiThresholdProvider::default()),
        sink,
    )?;

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("shutdown requested");
            shutdown_tx.send(true).ok();
        }
    });

    trader.run(shutdown_rx).await?;

    let stats = trader.tracker().stats().clone();
    println!(
        "{}",
        StatsFormatter::format(&stats, trader.tracker().initial_capital())
    );
    Ok(())
}
