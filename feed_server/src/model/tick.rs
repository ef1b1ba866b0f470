//! Periodic tick generation and event broadcasting.
//!
//! The `TickGenerator` runs a background thread that advances every tracked
//! symbol once per period and hands the refreshed batch to the server event
//! loop as a `TickEvent`. New prices follow a bounded random walk around the
//! previous price; volume is resampled on every tick.
//!
//! Event model:
//! - `TickEvent::Batch(Vec<Quote>)` — one tick's refreshed quotes, in listing
//!   order.
//! - `TickEvent::Shutdown` — the generator stopped; consumers terminate
//!   gracefully.
//!
//! Design notes:
//! - The whole batch is computed first and then applied to the shared table
//!   under one lock acquisition, so readers see either the pre-tick or the
//!   post-tick table.
//! - The timer is a plain crossbeam ticker; drift is acceptable and missed
//!   periods are not backfilled.
//! - A symbol missing from the table is skipped, never an error.

use std::sync::Arc;
use std::thread;
use std::time::Duration;

use chrono::Utc;
use crossbeam_channel::{Sender, select, tick, unbounded};
use feed_common::symbols::IndexSymbol;
use feed_common::{Quote, Result};
use log::{error, info};
use rand::Rng;
use rand::rngs::ThreadRng;

use super::market_state::MarketState;

/// Largest per-tick price move, as a fraction of the previous price.
const MAX_FLUCTUATION: f64 = 0.01;
/// Floor that keeps synthetic prices positive.
const MIN_PRICE: f64 = 0.01;
/// Lower bound of the resampled per-tick volume.
const VOLUME_MIN: u32 = 500_000;
/// Upper bound (exclusive) of the resampled per-tick volume.
const VOLUME_MAX: u32 = 1_000_000;

/// Message sent by the generator to the server event loop.
#[derive(Debug, Clone)]
pub enum TickEvent {
    /// One tick's worth of refreshed quotes, in listing order.
    Batch(Vec<Quote>),
    /// The generator has stopped; consumers should tear down.
    Shutdown,
}

/// Background market data generator.
pub struct TickGenerator;

impl TickGenerator {
    /// Start the generator thread and return the channel that stops it.
    ///
    /// Every `interval`, the generator refreshes all tracked symbols in
    /// `state` and emits one `TickEvent::Batch` on `events`. Sending on the
    /// returned channel stops the thread; a final `TickEvent::Shutdown` is
    /// emitted on the way out.
    pub fn start(
        state: Arc<MarketState>,
        events: Sender<TickEvent>,
        interval: Duration,
    ) -> Sender<()> {
        let (stop_tx, stop_rx) = unbounded::<()>();
        thread::spawn(move || {
            let timer = tick(interval);
            info!("Tick generator started, period {} ms", interval.as_millis());
            loop {
                select! {
                    recv(stop_rx) -> _ => break,
                    recv(timer) -> _ => match Self::advance(&state) {
                        Ok(batch) => {
                            if events.send(TickEvent::Batch(batch)).is_err() {
                                break;
                            }
                        }
                        Err(e) => error!("Tick failed: {}", e),
                    },
                }
            }
            let _ = events.send(TickEvent::Shutdown);
            info!("Tick generator stopped");
        });
        stop_tx
    }

    /// Advance every tracked symbol once, apply the batch to `state`, and
    /// return the refreshed quotes in listing order.
    fn advance(state: &MarketState) -> Result<Vec<Quote>> {
        let mut rng = rand::rng();
        let mut batch = Vec::with_capacity(IndexSymbol::all().len());
        for symbol in IndexSymbol::all() {
            let Ok(prev) = state.quote(&symbol.to_string()) else {
                continue;
            };
            batch.push(next_quote(&prev, &mut rng));
        }
        state.apply(&batch)?;
        Ok(batch)
    }
}

/// Sample one fluctuation factor and volume, then derive the successor quote.
fn next_quote(prev: &Quote, rng: &mut ThreadRng) -> Quote {
    let fluctuation = rng.random_range(-MAX_FLUCTUATION..MAX_FLUCTUATION);
    let volume = rng.random_range(VOLUME_MIN..VOLUME_MAX);
    reprice(prev, fluctuation, volume)
}

/// Derive the successor quote for `prev` given one fluctuation factor.
///
/// Both change fields are derived against `prev.price` at the instant the new
/// price is generated, so `percent_change` always equals
/// `absolute_change / prev.price * 100`. The new price is clamped to a
/// minimum positive value to avoid nonsensical zero/negative prices.
fn reprice(prev: &Quote, fluctuation: f64, volume: u32) -> Quote {
    let price = (prev.price * (1.0 + fluctuation)).max(MIN_PRICE);
    let absolute_change = price - prev.price;
    let percent_change = absolute_change / prev.price * 100.0;
    Quote {
        symbol: prev.symbol.clone(),
        display_name: prev.display_name.clone(),
        price,
        absolute_change,
        percent_change,
        volume,
        updated_at: Utc::now().timestamp_millis() as u64,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossbeam_channel::RecvTimeoutError;

    const EPS: f64 = 1e-9;

    #[test]
    fn reprice_derives_changes_from_the_previous_price() {
        let prev = Quote::opening(IndexSymbol::SPX, 0);
        let base = Quote {
            price: 100.0,
            ..prev
        };
        let next = reprice(&base, 0.005, 600_000);

        assert!((next.price - 100.50).abs() < EPS);
        assert!((next.absolute_change - 0.50).abs() < EPS);
        assert!((next.percent_change - 0.50).abs() < EPS);
        assert_eq!(next.volume, 600_000);
        assert_eq!(next.symbol, base.symbol);
        assert_eq!(next.display_name, base.display_name);
    }

    #[test]
    fn sampled_ticks_stay_within_one_percent() {
        let mut rng = rand::rng();
        let mut prev = Quote::opening(IndexSymbol::DJI, 0);
        for _ in 0..1_000 {
            let next = next_quote(&prev, &mut rng);
            assert!(next.price >= prev.price * 0.99 - EPS);
            assert!(next.price <= prev.price * 1.01 + EPS);
            let expected_percent = next.absolute_change / prev.price * 100.0;
            assert!((next.percent_change - expected_percent).abs() < EPS);
            assert!((VOLUME_MIN..VOLUME_MAX).contains(&next.volume));
            prev = next;
        }
    }

    #[test]
    fn generator_emits_full_batches_and_stops_on_signal() {
        let state = Arc::new(MarketState::new(0));
        let (events_tx, events_rx) = unbounded();
        let stop_tx = TickGenerator::start(Arc::clone(&state), events_tx, Duration::from_millis(5));

        let batch = loop {
            match events_rx.recv_timeout(Duration::from_secs(2)).unwrap() {
                TickEvent::Batch(batch) => break batch,
                TickEvent::Shutdown => panic!("generator stopped before its first tick"),
            }
        };
        let listing: Vec<String> = IndexSymbol::all().iter().map(|s| s.to_string()).collect();
        let symbols: Vec<String> = batch.iter().map(|q| q.symbol.clone()).collect();
        assert_eq!(symbols, listing);

        // The batch is visible in the shared table once the event arrives.
        for quote in &batch {
            let seen = state.quote(&quote.symbol).unwrap();
            assert!(seen.updated_at >= quote.updated_at);
        }

        stop_tx.send(()).unwrap();
        loop {
            match events_rx.recv_timeout(Duration::from_secs(2)) {
                Ok(TickEvent::Batch(_)) => continue,
                Ok(TickEvent::Shutdown) => break,
                Err(RecvTimeoutError::Timeout) => panic!("no shutdown event after stop"),
                Err(e) => panic!("generator channel failed: {}", e),
            }
        }
    }
}
