//! Live index-feed TCP streaming server.
//!
//! This binary owns the market quote table and streams it to any number of
//! TCP viewers. Internally, it wires together three main building blocks:
//!
//! - `MarketState` — the shared quote table, seeded once at startup from the
//!   static index listing and owned for the life of the process.
//! - `TickGenerator` — advances every tracked symbol on a fixed period with a
//!   bounded random walk and hands each refreshed batch to the event loop as
//!   a `TickEvent`.
//! - `Broadcaster` — the viewer registry; sends each new viewer one
//!   `initialData` snapshot and fans every tick's `marketUpdate` frames out
//!   to all registered viewers.
//!
//! Concurrency and shutdown:
//! - A single crossbeam `select!` loop serializes viewer connects and
//!   disconnects, tick batches, and Ctrl+C. Because subscription handling and
//!   fan-out share that loop, a viewer connecting mid-tick sees either the
//!   pre-tick or the post-tick table, never a torn quote, and always receives
//!   its snapshot before any update.
//! - Each viewer gets a dedicated writer thread fed through an unbounded
//!   frame channel, so a slow socket never blocks the event loop; a failed
//!   write ends the writer, and the viewer is dropped on the next publish.
//! - On Ctrl+C the tick timer is stopped, every viewer channel is closed, and
//!   the registry is cleared.
//!
//! Network protocol (high-level):
//! - Bind address: `0.0.0.0:8080` (see `feed_common::net::FEED_PORT`).
//! - Viewers connect over TCP and receive newline-delimited JSON frames: one
//!   `initialData` snapshot, then `marketUpdate` frames in tick order.
//! - Viewers send nothing; inbound bytes are drained and discarded.
#![warn(missing_docs)]
use crate::broadcaster::Broadcaster;
use crate::listener::{FeedListener, ViewerEvent};
use crate::model::market_state::MarketState;
use crate::model::tick::{TickEvent, TickGenerator};
use chrono::Utc;
use crossbeam_channel::{Receiver, Sender, select, unbounded};
use feed_common::net::{FEED_PORT, addr};
use feed_common::{FeedError, IndexSymbol, Result};
use log::{error, info};
use std::io::Write;
use std::net::{Shutdown, TcpStream};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

mod broadcaster;
mod listener;
pub mod model;

/// Wall-clock period between market ticks.
const TICK_INTERVAL: Duration = Duration::from_secs(5);

/// Writer task for a single viewer.
///
/// Drains `frames` into the socket until the channel closes (teardown or
/// deregistration) or a write fails (viewer gone). The registry entry is
/// cleaned up by the broadcaster on the next publish or by the reader
/// thread's disconnect event.
fn handle_viewer_stream(mut stream: TcpStream, frames: Receiver<String>) -> Result<(), FeedError> {
    for frame in frames {
        stream.write_all(frame.as_bytes())?;
    }
    let _ = stream.shutdown(Shutdown::Both);
    Ok(())
}

/// Serialized server event loop.
///
/// Multiplexes viewer lifecycle events, tick batches, and the shutdown signal
/// onto one thread; the broadcaster is only ever touched from here, which is
/// what keeps snapshots and fan-out mutually ordered without locks.
fn run_event_loop(
    mut broadcaster: Broadcaster,
    viewer_events: Receiver<ViewerEvent>,
    tick_events: Receiver<TickEvent>,
    shutdown_rx: Receiver<()>,
    generator_stop: Sender<()>,
) -> Result<(), FeedError> {
    loop {
        select! {
            recv(viewer_events) -> event => match event {
                Ok(ViewerEvent::Connected { peer, stream }) => {
                    let (frames_tx, frames_rx) = unbounded::<String>();
                    thread::spawn(move || {
                        if let Err(e) = handle_viewer_stream(stream, frames_rx) {
                            error!("Viewer {} stream error: {}", peer, e);
                        }
                    });
                    if let Err(e) = broadcaster.subscribe(peer, frames_tx) {
                        error!("Failed to subscribe viewer {}: {}", peer, e);
                    }
                }
                Ok(ViewerEvent::Disconnected { peer }) => broadcaster.unsubscribe(&peer),
                Err(e) => {
                    error!("Listener channel closed: {}", e);
                    break;
                }
            },
            recv(tick_events) -> event => match event {
                Ok(TickEvent::Batch(updates)) => {
                    if let Err(e) = broadcaster.publish(&updates) {
                        error!("Publish failed: {}", e);
                    }
                }
                Ok(TickEvent::Shutdown) | Err(_) => break,
            },
            recv(shutdown_rx) -> _ => {
                info!("Shutdown requested, stopping tick generator");
                let _ = generator_stop.send(());
                break;
            }
        }
    }
    broadcaster.shutdown();
    Ok(())
}

fn main() -> Result<(), FeedError> {
    init_logger();

    let state = Arc::new(MarketState::new(Utc::now().timestamp_millis() as u64));
    info!(
        "Market state seeded with {} tracked symbols",
        IndexSymbol::all().len()
    );

    let (viewer_tx, viewer_rx) = unbounded::<ViewerEvent>();
    let listener = FeedListener::new(&addr("0.0.0.0", FEED_PORT))?;
    thread::spawn(move || {
        if let Err(e) = listener.accept_loop(viewer_tx) {
            error!("Accept loop failed: {}", e);
        }
    });

    let (tick_tx, tick_rx) = unbounded::<TickEvent>();
    let generator_stop = TickGenerator::start(Arc::clone(&state), tick_tx, TICK_INTERVAL);

    let (shutdown_tx, shutdown_rx) = unbounded::<()>();
    ctrlc::set_handler(move || {
        let _ = shutdown_tx.send(());
    })
    .expect("Error setting Ctrl+C handler");

    let broadcaster = Broadcaster::new(Arc::clone(&state));
    run_event_loop(broadcaster, viewer_rx, tick_rx, shutdown_rx, generator_stop)
}

fn init_logger() {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();
}
