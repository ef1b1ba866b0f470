//! JSON frames sent from the server to connected viewers.
//!
//! The feed channel carries exactly two message kinds, tagged by a `type`
//! field:
//! - `initialData` — one full snapshot of every tracked symbol, sent once
//!   right after a viewer connects and before any incremental update.
//! - `marketUpdate` — a single-symbol quote refresh, sent once per changed
//!   symbol after each tick, in tick order.
//!
//! Viewers send nothing back on this channel; the protocol is one-way.
//! Frames are newline-delimited JSON so a viewer can read the stream with a
//! plain buffered line reader.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::FeedError;
use crate::quote::Quote;

/// Server -> viewer message on the feed channel.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum FeedMessage {
    /// Full snapshot covering all tracked symbols, keyed by symbol.
    #[serde(rename = "initialData")]
    InitialData {
        /// Current quote table, one entry per tracked symbol.
        data: BTreeMap<String, Quote>,
    },
    /// Refreshed quote for one symbol after a tick.
    #[serde(rename = "marketUpdate")]
    MarketUpdate {
        /// Symbol the update applies to.
        symbol: String,
        /// The refreshed quote.
        data: Quote,
    },
}

impl FeedMessage {
    /// Encode the message as one newline-terminated JSON frame.
    pub fn to_frame(&self) -> Result<String, FeedError> {
        let mut frame = serde_json::to_string(self)?;
        frame.push('\n');
        Ok(frame)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::symbols::IndexSymbol;

    #[test]
    fn snapshot_frame_is_tagged_initial_data() {
        let mut data = BTreeMap::new();
        data.insert("SPX".to_string(), Quote::opening(IndexSymbol::SPX, 0));
        let frame = FeedMessage::InitialData { data }.to_frame().unwrap();

        assert!(frame.ends_with('\n'));
        let value: serde_json::Value = serde_json::from_str(frame.trim_end()).unwrap();
        assert_eq!(value["type"], "initialData");
        assert!(value["data"]["SPX"]["price"].is_number());
    }

    #[test]
    fn update_frame_is_tagged_market_update() {
        let quote = Quote::opening(IndexSymbol::VIX, 42);
        let frame = FeedMessage::MarketUpdate {
            symbol: quote.symbol.clone(),
            data: quote,
        }
        .to_frame()
        .unwrap();

        let value: serde_json::Value = serde_json::from_str(frame.trim_end()).unwrap();
        assert_eq!(value["type"], "marketUpdate");
        assert_eq!(value["symbol"], "VIX");
        assert_eq!(value["data"]["displayName"], "CBOE Volatility Index");
    }

    #[test]
    fn update_frame_decodes_back_into_message() {
        let raw = r#"{"type":"marketUpdate","symbol":"DJI","data":{"symbol":"DJI","displayName":"Dow Jones Industrial Average","price":37500.1,"absoluteChange":59.76,"percentChange":0.16,"volume":612345,"updatedAt":1700000000000}}"#;
        match serde_json::from_str::<FeedMessage>(raw).unwrap() {
            FeedMessage::MarketUpdate { symbol, data } => {
                assert_eq!(symbol, "DJI");
                assert_eq!(data.volume, 612_345);
            }
            other => panic!("unexpected message: {:?}", other),
        }
    }
}
