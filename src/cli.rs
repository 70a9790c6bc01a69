use clap::{Parser, Subcommand, builder::PossibleValuesParser};
use std::path::{Path, PathBuf};

use crate::{
    api,
    estimator::estimate_fill_time,
    orders::{OrderSpec, OrderType, Side},
    simulate::{SimConfig, run_simulation},
    snapshot::MarketSnapshot,
    state::AppState,
    utils,
};

/// Simple CLI around the fill-time estimator
#[derive(Parser)]
#[command(name = "Fill Estimator CLI")]
#[command(version = "0.1", about = "Estimate limit-order fill times from market snapshots")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Estimate fill time for one order against a snapshot file
    Estimate {
        /// Path to a JSON market snapshot
        snapshot: PathBuf,

        ///BUY or SELL
        #[arg(value_parser = PossibleValuesParser::new(["buy", "sell"]))]
        side: String,

        ///LIMIT, MARKET or ADVANCED
        #[arg(value_parser = PossibleValuesParser::new(["limit", "market", "advanced"]))]
        order_type: String,

        /// Limit price (ignored for market orders)
        price: f64,

        /// Quantity in base units (must be > 0)
        size: f64,
    },

    /// Derive and print market conditions from a snapshot file
    Conditions {
        /// Path to a JSON market snapshot
        snapshot: PathBuf,
    },

    /// Run the estimate HTTP API
    Serve {
        #[arg(long, default_value = "127.0.0.1:3000")]
        addr: String,
    },

    /// Drive a running server with randomized estimate requests
    Simulate {
        #[arg(long, default_value = "http://127.0.0.1:3000")]
        api_base: String,

        /// Total duration in seconds; omit to run until ctrl-c
        #[arg(long)]
        run_secs: Option<u64>,

        /// Poisson arrival rate for requests
        #[arg(long, default_value_t = 2.0)]
        rate_hz: f64,

        /// Stddev of the Gaussian mid-price drift per request
        #[arg(long, default_value_t = 0.5)]
        noise_sigma: f64,

        /// Average order size
        #[arg(long, default_value_t = 5.0)]
        mean_size: f64,
    },
}

fn handle_estimate(
    path: &Path,
    side_str: &str,
    order_type_str: &str,
    price: f64,
    size: f64,
) -> anyhow::Result<()> {
    let snapshot = MarketSnapshot::load(path)?;

    let side = match side_str {
        "buy" => Side::Buy,
        "sell" => Side::Sell,
        _ => unreachable!(),
    };
    let order_type = match order_type_str {
        "limit" => OrderType::Limit,
        "market" => OrderType::Market,
        "advanced" => OrderType::Advanced,
        _ => unreachable!(),
    };
    let order = OrderSpec {
        side,
        order_type,
        price,
        size,
    };

    let market = snapshot.conditions();
    let estimate = estimate_fill_time(&order, &snapshot.book, &market);

    println!("Pair: {}", snapshot.pair);
    println!(
        "Conditions: spread {:.4}%, depth {:.4}, volatility {:.4}, 24h volume {:.2}",
        market.spread, market.liquidity_depth, market.volatility, market.volume_24h
    );
    println!("Estimate: {:?}", estimate);
    println!("{}", estimate.explanation());
    Ok(())
}

fn handle_conditions(path: &Path) -> anyhow::Result<()> {
    let snapshot = MarketSnapshot::load(path)?;
    let market = snapshot.conditions();

    println!("------ Market Conditions: {} ------", snapshot.pair);
    println!("Spread:          {:.4}%", market.spread);
    println!("Liquidity depth: {:.4}", market.liquidity_depth);
    println!("Volatility:      {:.4}", market.volatility);
    println!("24h volume:      {:.2}", market.volume_24h);
    println!("-----------------------------------");
    Ok(())
}

async fn serve(addr: &str) -> anyhow::Result<()> {
    let state = AppState::new();
    let app = api::router(state);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    let token = utils::shutdown_token();
    tracing::info!(%addr, "estimate API listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(async move { token.cancelled().await })
        .await?;
    Ok(())
}

pub async fn run_cli() -> anyhow::Result<()> {
    utils::init_logging();
    let cli = Cli::parse();
    match cli.command {
        Commands::Estimate {
            snapshot,
            side,
            order_type,
            price,
            size,
        } => handle_estimate(&snapshot, &side, &order_type, price, size),
        Commands::Conditions { snapshot } => handle_conditions(&snapshot),
        Commands::Serve { addr } => serve(&addr).await,
        Commands::Simulate {
            api_base,
            run_secs,
            rate_hz,
            noise_sigma,
            mean_size,
        } => {
            let cfg = SimConfig {
                api_base,
                run_secs,
                rate_hz,
                noise_sigma,
                mean_size,
            };
            run_simulation(cfg, utils::shutdown_token()).await
        }
    }
}
