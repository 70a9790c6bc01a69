//! Load harness for exercising the estimate API under realistic, noisy market
//! conditions.
//!
//! Continuously posts randomized estimate requests against a running server to:
//! 1. Watch how the quoted windows shift as the synthetic market drifts.
//! 2. Stress-test the API under stochastic arrival rates and order sizes.
//!
//! ## Components
//!
//! - `SimConfig` holds the simulation parameters:
//!   - `api_base`: base URL of the REST API (e.g. `http://127.0.0.1:3000`).
//!   - `run_secs`: optional total duration in seconds; `None` runs until cancelled.
//!   - `rate_hz`: Poisson arrival rate (λ) for requests (exponential inter-arrival).
//!   - `noise_sigma`: standard deviation of the Gaussian drift applied to the
//!     simulator's local mid-price on each request.
//!   - `mean_size`: average order size; each tick samples an Exp(1) variate and
//!     multiplies it by `mean_size`.
//! - `run_simulation(cfg, cancel_token)`: the main loop. On each arrival it
//!   synthesizes a fresh book and 24h trade tape around the drifted mid, posts
//!   a limit order's estimate request, and tallies the quoted windows.
//!
//! Exponential arrivals model Poisson request flow; unit-exponential sizing
//! yields heavy-tailed order sizes; Gaussian drift mimics mid-price movement.
//!
//! # Usage
//! Supply a `CancellationToken` (e.g. tied to Ctrl-C) for clean shutdown.

use rand::Rng;
use rand_distr::{Distribution, Exp, Exp1, Normal};
use reqwest::Client;
use serde_json::json;
use std::collections::BTreeMap;
use std::time::{Duration, Instant, SystemTime};
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;

use crate::{book::OrderBookEntry, orders::Side, trade::Trade};

/// Book levels generated either side of the drifted mid.
const BOOK_LEVELS: usize = 10;
/// Synthetic prints on the 24h tape per request.
const TAPE_TRADES: usize = 40;

#[derive(Clone)]
pub struct SimConfig {
    pub api_base: String,
    pub run_secs: Option<u64>,
    pub rate_hz: f64,
    pub noise_sigma: f64,
    pub mean_size: f64,
}

fn synth_book(mid: f64, mean_size: f64) -> Vec<OrderBookEntry> {
    let mut rng = rand::rng();
    let mut book = Vec::with_capacity(BOOK_LEVELS * 2);
    for level in 1..=BOOK_LEVELS {
        let offset = mid * 0.001 * level as f64;
        let bid_amount: f64 = <Exp1 as Distribution<f64>>::sample(&Exp1, &mut rng) * mean_size;
        let ask_amount: f64 = <Exp1 as Distribution<f64>>::sample(&Exp1, &mut rng) * mean_size;
        book.push(OrderBookEntry {
            price: mid - offset,
            amount: bid_amount,
            side: Side::Buy,
        });
        book.push(OrderBookEntry {
            price: mid + offset,
            amount: ask_amount,
            side: Side::Sell,
        });
    }
    book
}

fn synth_tape(mid: f64, mean_size: f64) -> Vec<Trade> {
    let mut rng = rand::rng();
    (0..TAPE_TRADES)
        .map(|_| {
            // ages up to 30h so some prints fall outside the 24h window
            let age = Duration::from_secs(rng.random_range(0..30 * 60 * 60));
            Trade {
                price: mid * (1.0 + rng.random_range(-0.01..0.01)),
                amount: <Exp1 as Distribution<f64>>::sample(&Exp1, &mut rng) * mean_size,
                timestamp: SystemTime::now() - age,
            }
        })
        .collect()
}

/// Drive a noisy stream of estimate requests against the API.
///
/// # Parameters
/// - `cfg`: simulation parameters (API endpoint, duration, arrival rate, noise, average size).
/// - `cancel_token`: a `CancellationToken` whose cancellation immediately terminates the loop.
///
/// # Side Effects
/// Continuously issues HTTP requests against `cfg.api_base`, logging each
/// quoted window to stdout. When the loop exits, prints a tally of windows seen.
///
/// # Errors
/// Returns an error if any HTTP request fails. Invalid distribution
/// parameters (zero rate, negative σ) panic at startup.
pub async fn run_simulation(cfg: SimConfig, cancel_token: CancellationToken) -> anyhow::Result<()> {
    let client = Client::new();
    //1) Exponential inter-arrival times with rate = rate_hz
    let ia_dist = Exp::new(cfg.rate_hz).expect("rate_hz must be > 0");

    //2) Gaussian drift on the mid-price
    let drift = Normal::new(0.0, cfg.noise_sigma).expect("noise sigma >= 0");

    let mut windows: BTreeMap<String, usize> = BTreeMap::new();
    let mut sent = 0u64;
    let mut mid = 100.0f64;
    let start = Instant::now();

    loop {
        //check overall time-limit
        if let Some(max_secs) = cfg.run_secs {
            if start.elapsed().as_secs() >= max_secs {
                break;
            }
        }
        //draw the next wait
        let wait_secs = ia_dist.sample(&mut rand::rng());
        let sleep_fut = sleep(Duration::from_secs_f64(wait_secs));
        tokio::select! {
            //user hits ctrl-c
            _ = cancel_token.cancelled() => {
                tracing::info!("received shutdown, exiting noisy sim…");
                break;
            }
            _ = sleep_fut => {
                // drift the mid, then size and place a request around it
                mid = (mid + drift.sample(&mut rand::rng())).max(1.0);
                let raw: f64 = <Exp1 as Distribution<f64>>::sample(&Exp1, &mut rand::rng());
                let size = (raw * cfg.mean_size).max(0.01);
                let (side, price) = if rand::rng().random_bool(0.5) {
                    ("Buy", mid * 1.002)
                } else {
                    ("Sell", mid * 0.998)
                };
                let resp = client.post(format!("{}/estimate", cfg.api_base))
                    .json(&json!({
                        "pair": "BTC-USD",
                        "order": { "side": side, "order_type": "Limit", "price": price, "size": size },
                        "book": synth_book(mid, cfg.mean_size),
                        "trades": synth_tape(mid, cfg.mean_size),
                        "current_price": mid,
                    }))
                    .send()
                    .await?
                    .error_for_status()?
                    .json::<serde_json::Value>()
                    .await?;
                sent += 1;
                let window = resp["estimate"]["estimated_time"].as_str().unwrap_or("?").to_string();
                let confidence = resp["estimate"]["confidence"].as_str().unwrap_or("?");
                *windows.entry(window.clone()).or_insert(0) += 1;

                println!(
                    "[{:.1}s] side={} size={:.2} mid={:.2} -> {} ({})",
                    start.elapsed().as_secs_f64(),
                    side, size, mid, window, confidence
                );
            }
        }
    }
    println!("--- done --- {} requests", sent);
    for (window, count) in &windows {
        println!("{:>6}x {}", count, window);
    }
    Ok(())
}
