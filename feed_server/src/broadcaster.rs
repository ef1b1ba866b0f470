//! Subscription broadcaster for the live quote feed.
//!
//! The `Broadcaster` keeps the registry of connected viewers and makes each
//! viewer's picture of the quote table consistent through one snapshot
//! followed by incremental updates:
//!
//! - `subscribe` — registers a viewer and queues its `initialData` snapshot
//!   before any update frame can reach it.
//! - `publish` — fans one tick's `marketUpdate` frames out to every
//!   registered viewer, in tick order; a viewer whose channel rejects a send
//!   is dropped without affecting anyone else.
//! - `unsubscribe` — removes a viewer; safe to call repeatedly.
//!
//! Design notes:
//! - The registry is keyed by the viewer's peer address; a reconnect shows up
//!   as a brand-new peer and gets a fresh snapshot.
//! - Frames are serialized once per tick and cloned per viewer, not
//!   re-encoded for every recipient.
//! - There is no acknowledgement, retry, or buffering for departed viewers.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;

use crossbeam_channel::Sender;
use feed_common::{FeedMessage, Quote, Result};
use log::{info, warn};

use crate::model::market_state::MarketState;

/// Viewer registry plus the shared quote table it snapshots from.
pub struct Broadcaster {
    state: Arc<MarketState>,
    viewers: HashMap<SocketAddr, Sender<String>>,
}

impl Broadcaster {
    /// Create an empty registry over `state`.
    pub fn new(state: Arc<MarketState>) -> Broadcaster {
        Broadcaster {
            state,
            viewers: HashMap::new(),
        }
    }

    /// Register `peer` and synchronously queue its snapshot frame.
    ///
    /// The snapshot covers every tracked symbol as of registration time and
    /// is queued before the viewer can observe any `marketUpdate`, so a
    /// viewer never sees an incremental message first.
    pub fn subscribe(&mut self, peer: SocketAddr, frames: Sender<String>) -> Result<()> {
        let snapshot = self.state.snapshot()?;
        let frame = FeedMessage::InitialData { data: snapshot }.to_frame()?;
        if frames.send(frame).is_err() {
            warn!("Viewer {} disconnected before its snapshot was sent", peer);
            return Ok(());
        }
        self.viewers.insert(peer, frames);
        info!("Viewer {} subscribed ({} connected)", peer, self.viewers.len());
        Ok(())
    }

    /// Remove `peer` from the registry. Safe for peers that are already gone.
    pub fn unsubscribe(&mut self, peer: &SocketAddr) {
        if self.viewers.remove(peer).is_some() {
            info!(
                "Viewer {} unsubscribed ({} connected)",
                peer,
                self.viewers.len()
            );
        }
    }

    /// Fan one tick's refreshed quotes out to every registered viewer.
    ///
    /// Updates are serialized once, in tick order, and every registered
    /// viewer receives the same frame sequence. A viewer whose channel
    /// rejects a send is dropped from the registry; the failure never reaches
    /// the tick generator and delivery to the remaining viewers continues.
    pub fn publish(&mut self, updates: &[Quote]) -> Result<()> {
        if self.viewers.is_empty() || updates.is_empty() {
            return Ok(());
        }
        let mut frames = Vec::with_capacity(updates.len());
        for update in updates {
            let message = FeedMessage::MarketUpdate {
                symbol: update.symbol.clone(),
                data: update.clone(),
            };
            frames.push(message.to_frame()?);
        }
        self.viewers.retain(|peer, sender| {
            for frame in &frames {
                if sender.send(frame.clone()).is_err() {
                    info!("Viewer {} dropped: stream closed", peer);
                    return false;
                }
            }
            true
        });
        Ok(())
    }

    /// Number of currently registered viewers.
    pub fn viewer_count(&self) -> usize {
        self.viewers.len()
    }

    /// Drop every registered viewer and clear the registry.
    ///
    /// Closing the frame channels ends each viewer's writer task, which in
    /// turn closes the underlying connections.
    pub fn shutdown(&mut self) {
        if !self.viewers.is_empty() {
            info!("Closing {} viewer connection(s)", self.viewers.len());
        }
        self.viewers.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossbeam_channel::{Receiver, unbounded};
    use feed_common::IndexSymbol;

    fn peer(port: u16) -> SocketAddr {
        format!("127.0.0.1:{}", port).parse().unwrap()
    }

    fn decode(frame: &str) -> FeedMessage {
        serde_json::from_str(frame.trim_end()).unwrap()
    }

    fn drain(rx: &Receiver<String>) -> Vec<FeedMessage> {
        rx.try_iter().map(|frame| decode(&frame)).collect()
    }

    /// Batch of updates derived from the current table, every price bumped by
    /// `shift`.
    fn shifted_batch(state: &MarketState, shift: f64) -> Vec<Quote> {
        IndexSymbol::all()
            .iter()
            .map(|symbol| {
                let prev = state.quote(&symbol.to_string()).unwrap();
                Quote {
                    price: prev.price + shift,
                    absolute_change: shift,
                    percent_change: shift / prev.price * 100.0,
                    ..prev
                }
            })
            .collect()
    }

    #[test]
    fn snapshot_arrives_before_any_update_and_covers_all_symbols() {
        let state = Arc::new(MarketState::new(0));
        let mut broadcaster = Broadcaster::new(Arc::clone(&state));
        let (tx, rx) = unbounded();
        broadcaster.subscribe(peer(40_001), tx).unwrap();

        let batch = shifted_batch(&state, 1.0);
        state.apply(&batch).unwrap();
        broadcaster.publish(&batch).unwrap();

        let messages = drain(&rx);
        assert_eq!(messages.len(), 1 + IndexSymbol::all().len());
        match &messages[0] {
            FeedMessage::InitialData { data } => {
                assert_eq!(data.len(), IndexSymbol::all().len());
            }
            other => panic!("first frame must be the snapshot, got {:?}", other),
        }
        for message in &messages[1..] {
            assert!(matches!(message, FeedMessage::MarketUpdate { .. }));
        }
    }

    #[test]
    fn all_viewers_observe_the_same_update_sequence() {
        let state = Arc::new(MarketState::new(0));
        let mut broadcaster = Broadcaster::new(Arc::clone(&state));
        let (tx_a, rx_a) = unbounded();
        let (tx_b, rx_b) = unbounded();
        broadcaster.subscribe(peer(40_001), tx_a).unwrap();
        broadcaster.subscribe(peer(40_002), tx_b).unwrap();

        for shift in [1.0, -0.5, 2.25] {
            let batch = shifted_batch(&state, shift);
            state.apply(&batch).unwrap();
            broadcaster.publish(&batch).unwrap();
        }

        let updates = |messages: Vec<FeedMessage>| -> Vec<(String, String)> {
            messages
                .into_iter()
                .filter_map(|message| match message {
                    FeedMessage::MarketUpdate { symbol, data } => {
                        Some((symbol, format!("{:.6}", data.price)))
                    }
                    FeedMessage::InitialData { .. } => None,
                })
                .collect()
        };
        let seen_a = updates(drain(&rx_a));
        let seen_b = updates(drain(&rx_b));
        assert_eq!(seen_a.len(), 3 * IndexSymbol::all().len());
        assert_eq!(seen_a, seen_b);
    }

    #[test]
    fn late_viewer_snapshot_reflects_the_latest_tick() {
        let state = Arc::new(MarketState::new(0));
        let mut broadcaster = Broadcaster::new(Arc::clone(&state));

        let (tx_early, rx_early) = unbounded();
        broadcaster.subscribe(peer(40_001), tx_early).unwrap();

        let batch = shifted_batch(&state, 10.0);
        state.apply(&batch).unwrap();
        broadcaster.publish(&batch).unwrap();

        let (tx_late, rx_late) = unbounded();
        broadcaster.subscribe(peer(40_002), tx_late).unwrap();

        let opening = IndexSymbol::SPX.opening_price();
        match &drain(&rx_early)[0] {
            FeedMessage::InitialData { data } => {
                assert_eq!(data["SPX"].price, opening);
            }
            other => panic!("expected snapshot, got {:?}", other),
        }
        match &drain(&rx_late)[0] {
            FeedMessage::InitialData { data } => {
                assert_eq!(data["SPX"].price, opening + 10.0);
            }
            other => panic!("expected snapshot, got {:?}", other),
        }
    }

    #[test]
    fn dropped_viewer_does_not_disturb_the_rest() {
        let state = Arc::new(MarketState::new(0));
        let mut broadcaster = Broadcaster::new(Arc::clone(&state));
        let (tx_alive, rx_alive) = unbounded();
        let (tx_gone, rx_gone) = unbounded();
        broadcaster.subscribe(peer(40_001), tx_alive).unwrap();
        broadcaster.subscribe(peer(40_002), tx_gone).unwrap();
        assert_eq!(broadcaster.viewer_count(), 2);

        drop(rx_gone);
        let batch = shifted_batch(&state, 1.0);
        broadcaster.publish(&batch).unwrap();

        assert_eq!(broadcaster.viewer_count(), 1);
        let survivor = drain(&rx_alive);
        assert_eq!(survivor.len(), 1 + IndexSymbol::all().len());
    }

    #[test]
    fn unsubscribe_is_idempotent() {
        let state = Arc::new(MarketState::new(0));
        let mut broadcaster = Broadcaster::new(state);
        let (tx, _rx) = unbounded();
        let viewer = peer(40_001);
        broadcaster.subscribe(viewer, tx).unwrap();
        assert_eq!(broadcaster.viewer_count(), 1);

        broadcaster.unsubscribe(&viewer);
        broadcaster.unsubscribe(&viewer);
        assert_eq!(broadcaster.viewer_count(), 0);
    }
}
