// Standard library imports
use std::path::{Path, PathBuf};
use std::sync::Arc;

// External crate imports
use anyhow::{anyhow, Result};
use clap::{Parser, ValueEnum};
use dotenv::dotenv;
use log::{error, info};
use rust_decimal::Decimal;

// Internal crate imports
use bybit_spot_bot::config_loader::AppConfig;
use bybit_spot_bot::domain::enums::OrderSide;
use bybit_spot_bot::domain::errors::TradeError;
use bybit_spot_bot::domain::model::order::OrderRequest;
use bybit_spot_bot::domain::model::report::TradeReport;
use bybit_spot_bot::infrastructure::exchange::bybit::{BybitClient, BybitKeys};
use bybit_spot_bot::strategies::spot_market_entry::SpotTrader;

#[derive(Debug, Parser)]
#[command(name = "bybit-spot")]
#[command(about = "Place a Bybit spot market order sized as a percentage of the quote balance, with optional TP/SL")]
struct Cli {
    /// Base coin to trade, e.g. BTC
    #[arg(short, long)]
    coin: String,

    #[arg(short, long, value_enum)]
    side: SideArg,

    /// Percentage of the quote balance to use, in (0, 100]
    #[arg(short, long)]
    percent: Decimal,

    /// Take-profit distance from the fill price, in percent
    #[arg(long)]
    tp: Option<Decimal>,

    /// Stop-loss distance from the fill price, in percent
    #[arg(long)]
    sl: Option<Decimal>,

    /// Config file; defaults to ../config.toml, then ./config.toml
    #[arg(long)]
    config: Option<PathBuf>,

    #[arg(short, long)]
    verbose: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum SideArg {
    Buy,
    Sell,
}

impl From<SideArg> for OrderSide {
    fn from(side: SideArg) -> Self {
        match side {
            SideArg::Buy => OrderSide::Buy,
            SideArg::Sell => OrderSide::Sell,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    dotenv().ok();
    env_logger::Builder::new()
        .filter_level(if cli.verbose {
            log::LevelFilter::Debug
        } else {
            log::LevelFilter::Info
        })
        .init();
    info!("Logger initialized");

    let config = match &cli.config {
        Some(path) => AppConfig::from_file(path)?,
        None => AppConfig::load_first(&[Path::new("../config.toml"), Path::new("./config.toml")])?,
    };
    info!(
        "Configuration loaded: {:?} network, quote currency {}",
        config.exchange.network, config.trading.quote_currency
    );

    let keys = BybitKeys::from_env(&config.exchange.network)?;
    let client = BybitClient::new(&config.exchange, keys)?;
    let trader = SpotTrader::new(Arc::new(client), config.trading.quote_currency.clone());

    let mut request = OrderRequest::new(cli.coin, cli.side.into(), cli.percent);
    request.tp_percentage = cli.tp;
    request.sl_percentage = cli.sl;

    run_trade(&trader, &request).await
}

/// Execute one trade and print what happened
async fn run_trade(trader: &SpotTrader, request: &OrderRequest) -> Result<()> {
    match trader.execute(request).await {
        Ok(report) => {
            print_report(&report);
            Ok(())
        }
        Err(TradeError::PartialProtectionFailure(failure)) => {
            print_report(&failure.report);
            for leg in &failure.failures {
                println!("{:<12} FAILED: {}", leg.leg.to_string(), leg.cause);
            }
            error!("Position is open without full protection");
            Err(anyhow!("{}", failure))
        }
        Err(e) => {
            error!("Trade failed: {}", e);
            Err(e.into())
        }
    }
}

fn print_report(report: &TradeReport) {
    println!("{:<12} {} {} {}", "entry", report.side, report.quantity, report.symbol);
    println!("{:<12} {}", "order id", report.entry.order_id);
    println!("{:<12} {}", "fill price", report.entry.fill_price);
    if let Some(tp) = &report.take_profit {
        println!("{:<12} {}", "take-profit", tp.order_id);
    }
    if let Some(sl) = &report.stop_loss {
        println!("{:<12} {}", "stop-loss", sl.order_id);
    }
}
