//! Shared quote table with a defined lifecycle.
//!
//! `MarketState` is constructed once at startup, seeded from the static index
//! listing, and passed by reference (`Arc`) to both the tick generator and
//! the broadcaster. All access goes through a single mutex so a reader never
//! observes a half-updated quote: `apply` swaps whole entries under one lock
//! acquisition, and `snapshot` copies the whole table under one lock
//! acquisition.

use std::collections::{BTreeMap, HashMap};
use std::sync::Mutex;

use feed_common::quote::Quote;
use feed_common::symbols::IndexSymbol;
use feed_common::{FeedError, Result};
use log::debug;

/// In-memory quote table for the tracked index set.
pub struct MarketState {
    quotes: Mutex<HashMap<IndexSymbol, Quote>>,
}

impl MarketState {
    /// Seed the table with one opening quote per tracked symbol.
    pub fn new(opened_at: u64) -> MarketState {
        let quotes = IndexSymbol::all()
            .iter()
            .map(|symbol| (*symbol, Quote::opening(*symbol, opened_at)))
            .collect();
        MarketState {
            quotes: Mutex::new(quotes),
        }
    }

    /// Consistent copy of the whole table, keyed by symbol string.
    pub fn snapshot(&self) -> Result<BTreeMap<String, Quote>> {
        let quotes = self.quotes.lock()?;
        Ok(quotes
            .values()
            .map(|quote| (quote.symbol.clone(), quote.clone()))
            .collect())
    }

    /// Latest quote for `symbol`.
    ///
    /// A symbol outside the tracked set yields `SymbolNotFound`, never any
    /// other error.
    pub fn quote(&self, symbol: &str) -> Result<Quote> {
        let key: IndexSymbol = symbol
            .parse()
            .map_err(|_| FeedError::SymbolNotFound(symbol.to_string()))?;
        let quotes = self.quotes.lock()?;
        quotes
            .get(&key)
            .cloned()
            .ok_or_else(|| FeedError::SymbolNotFound(symbol.to_string()))
    }

    /// Replace the entry of every updated symbol under one lock acquisition.
    ///
    /// Updates for symbols outside the tracked set are skipped, not an error.
    pub fn apply(&self, updates: &[Quote]) -> Result<()> {
        let mut quotes = self.quotes.lock()?;
        for update in updates {
            let Ok(key) = update.symbol.parse::<IndexSymbol>() else {
                debug!("Skipping update for unknown symbol {}", update.symbol);
                continue;
            };
            quotes.insert(key, update.clone());
        }
        Ok(())
    }
}
