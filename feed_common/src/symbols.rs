//! Tracked market indices shared between client and server.
//!
//! The feed covers a fixed set of index symbols. Each symbol carries static
//! listing data (display name, opening price, opening volume) that seeds the
//! server's quote table at startup. The set never changes at runtime.

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};

/// Set of tracked market-index symbols.
#[allow(missing_docs)]
#[derive(
    Debug,
    Clone,
    Copy,
    Serialize,
    Deserialize,
    ValueEnum,
    Display,
    EnumString,
    Hash,
    Eq,
    PartialEq,
)]
#[clap(rename_all = "lower")]
#[strum(ascii_case_insensitive)]
pub enum IndexSymbol {
    SPX,
    DJI,
    IXIC,
    RUT,
    VIX,
}

/// All tracked symbols in listing order. Tick and fan-out order follows this slice.
const ALL_SYMBOLS: [IndexSymbol; 5] = [
    IndexSymbol::SPX,
    IndexSymbol::DJI,
    IndexSymbol::IXIC,
    IndexSymbol::RUT,
    IndexSymbol::VIX,
];

impl IndexSymbol {
    /// The full tracked set, in listing order.
    pub fn all() -> &'static [IndexSymbol] {
        &ALL_SYMBOLS
    }

    /// Human-readable index name shown to viewers.
    pub fn display_name(&self) -> &'static str {
        match self {
            IndexSymbol::SPX => "S&P 500",
            IndexSymbol::DJI => "Dow Jones Industrial Average",
            IndexSymbol::IXIC => "NASDAQ Composite",
            IndexSymbol::RUT => "Russell 2000",
            IndexSymbol::VIX => "CBOE Volatility Index",
        }
    }

    /// Price the symbol opens at before the first tick.
    pub fn opening_price(&self) -> f64 {
        match self {
            IndexSymbol::SPX => 4783.45,
            IndexSymbol::DJI => 37440.34,
            IndexSymbol::IXIC => 15043.97,
            IndexSymbol::RUT => 1970.22,
            IndexSymbol::VIX => 13.45,
        }
    }

    /// Volume the symbol opens with before the first tick.
    pub fn opening_volume(&self) -> u32 {
        match self {
            IndexSymbol::SPX => 842_350,
            IndexSymbol::DJI => 911_270,
            IndexSymbol::IXIC => 768_420,
            IndexSymbol::RUT => 655_830,
            IndexSymbol::VIX => 529_610,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn listing_covers_every_symbol_once() {
        let all = IndexSymbol::all();
        assert_eq!(all.len(), 5);
        let unique: std::collections::HashSet<String> =
            all.iter().map(|s| s.to_string()).collect();
        assert_eq!(unique.len(), all.len());
    }

    #[test]
    fn symbols_parse_from_their_string_form() {
        for symbol in IndexSymbol::all() {
            let parsed: IndexSymbol = symbol.to_string().parse().unwrap();
            assert_eq!(parsed, *symbol);
        }
        assert!("ZZZZ".parse::<IndexSymbol>().is_err());
    }

    #[test]
    fn listing_data_is_sane() {
        for symbol in IndexSymbol::all() {
            assert!(!symbol.display_name().is_empty());
            assert!(symbol.opening_price() > 0.0);
            let volume = symbol.opening_volume();
            assert!((500_000..1_000_000).contains(&volume));
        }
    }
}
