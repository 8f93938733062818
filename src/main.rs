//! Pair Trader - Main Entry Point
//!
//! Runs the strategy cycle once at startup, then once per day at the
//! configured UTC time.

use anyhow::Result;
use clap::{Parser, Subcommand};
use pair_trader::config::Config;
use pair_trader::exchange::BitgetClient;
use pair_trader::market::BinanceMarketData;
use pair_trader::notify;
use pair_trader::scheduler::DailySchedule;
use pair_trader::strategy::StrategyRunner;
use tracing::{info, Level};
use tracing_subscriber::EnvFilter;

/// Pair Trader CLI
#[derive(Parser)]
#[command(name = "pair-trader")]
#[command(version, about = "Daily-rebalanced pair trading on Bitget USDT-M futures")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a single cycle immediately and exit (no scheduler)
    RunOnce,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging()?;

    let config = Config::load()?;
    config.validate()?;
    info!(
        pair = %format!(
            "{}/{}",
            config.strategy.leg_a.market_symbol, config.strategy.leg_b.market_symbol
        ),
        exposure = %config.strategy.exposure_fraction,
        leverage = config.strategy.leverage,
        ema_span = config.strategy.ema_span,
        "Pair Trader v{} starting",
        env!("CARGO_PKG_VERSION")
    );

    let market = BinanceMarketData::new()?;
    let exchange = BitgetClient::new(
        &config.bitget,
        config.strategy.leg_a.contract_symbol.clone(),
        config.strategy.margin_coin.clone(),
    )?;
    let notifier = notify::from_config(&config.notify)?;
    let runner = StrategyRunner::new(market, exchange, notifier, config.strategy.clone());

    if let Some(Commands::RunOnce) = cli.command {
        runner.run_cycle().await;
        return Ok(());
    }

    let schedule = DailySchedule::from_config(&config.schedule);

    // Immediate run at startup, then the daily loop. Cycles never overlap:
    // the next trigger is computed only after the previous cycle returns.
    runner.run_cycle().await;
    loop {
        schedule.wait_for_next().await;
        runner.run_cycle().await;
    }
}

fn init_logging() -> Result<()> {
    use tracing_subscriber::fmt::writer::MakeWriterExt;

    std::fs::create_dir_all("logs")?;

    let file_appender = tracing_appender::rolling::daily("logs", "pair-trader.log");
    let (file_writer, guard) = tracing_appender::non_blocking(file_appender);

    // Leak the guard to keep the writer alive for the program duration
    Box::leak(Box::new(guard));

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env()
                .add_directive("pair_trader=debug".parse()?)
                .add_directive(Level::INFO.into()),
        )
        .with_writer(std::io::stdout.and(file_writer))
        .with_target(true)
        .with_file(true)
        .with_line_number(true)
        .with_ansi(true)
        .init();

    Ok(())
}
