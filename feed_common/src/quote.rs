//! Market quote payload shared by the server and client.
//!
//! A `Quote` is the per-symbol snapshot pushed to viewers. It carries the last
//! price together with the signed change against the previous tick, a synthetic
//! volume, and a millisecond UTC timestamp. Field names serialize in camelCase
//! to match the wire format viewers expect.

use serde::{Deserialize, Serialize};

use crate::symbols::IndexSymbol;

/// Latest price/volume/change snapshot for one tracked symbol.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Quote {
    /// Symbol identifier (string form of `IndexSymbol`).
    pub symbol: String,
    /// Human-readable index name.
    pub display_name: String,
    /// Last price. Always positive.
    pub price: f64,
    /// Signed difference between this price and the previous tick's price.
    pub absolute_change: f64,
    /// `absolute_change` relative to the previous price, in percent.
    pub percent_change: f64,
    /// Synthetic trade volume associated with this tick.
    pub volume: u32,
    /// UTC timestamp in milliseconds since Unix epoch.
    pub updated_at: u64,
}

impl Quote {
    /// Opening quote for `symbol`, built from the static listing data.
    ///
    /// Both change fields start at zero: there is no previous tick to compare
    /// against before the generator has run.
    pub fn opening(symbol: IndexSymbol, updated_at: u64) -> Quote {
        Quote {
            symbol: symbol.to_string(),
            display_name: symbol.display_name().to_string(),
            price: symbol.opening_price(),
            absolute_change: 0.0,
            percent_change: 0.0,
            volume: symbol.opening_volume(),
            updated_at,
        }
    }
}
