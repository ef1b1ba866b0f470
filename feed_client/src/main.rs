//! Feed Client — a TCP viewer that subscribes to the live index feed and logs
//! received quotes to stdout. It connects to the server's feed endpoint,
//! prints the initial snapshot, then follows incremental updates until Ctrl+C
//! or until the server closes the stream.
//!
//! Usage example (CLI):
//! ```bash
//! feed_client --server-ip 192.168.0.10 --port 8080
//! ```
//!
//! The stream is newline-delimited JSON: one `initialData` frame on connect,
//! then `marketUpdate` frames in tick order. The client never writes to the
//! connection.
#![warn(missing_docs)]
mod args;

use crate::args::Args;
use chrono::DateTime;
use clap::Parser;
use feed_common::net::addr;
use feed_common::{FeedError, FeedMessage, Quote, Result};
use log::{debug, error, info};
use std::io::{BufRead, BufReader, ErrorKind};
use std::net::TcpStream;
use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};
use std::time::Duration;

fn main() -> Result<(), FeedError> {
    init_logger();
    let args = Args::parse();

    let shutdown = Arc::new(AtomicBool::new(false));
    {
        let shutdown = shutdown.clone();
        ctrlc::set_handler(move || {
            info!("Ctrl+C received. Shutting down client...");
            shutdown.store(true, Ordering::SeqCst);
        })
        .expect("Error setting Ctrl+C handler");
    }

    let server_address = addr(args.server_ip.trim(), args.port);
    info!("Connecting to feed server at {}", server_address);
    let stream = TcpStream::connect(&server_address)
        .map_err(|e| FeedError::Format(format!("Failed to connect to server: {}", e)))?;
    // Short read timeout so Ctrl+C is honored between frames.
    stream.set_read_timeout(Some(Duration::from_secs(1)))?;

    info!("Client is running. Press Ctrl+C to exit.");
    run_feed_loop(stream, shutdown)
}

/// Blocking loop that reads newline-delimited JSON frames from `stream` and
/// logs decoded feed messages until shutdown or EOF.
fn run_feed_loop(stream: TcpStream, shutdown: Arc<AtomicBool>) -> Result<(), FeedError> {
    let mut reader = BufReader::new(stream);
    let mut line = String::new();

    while !shutdown.load(Ordering::Relaxed) {
        match reader.read_line(&mut line) {
            Ok(0) => {
                info!("Server closed the feed.");
                break;
            }
            Ok(_) => {
                match serde_json::from_str::<FeedMessage>(line.trim_end()) {
                    Ok(FeedMessage::InitialData { data }) => {
                        info!("Snapshot: {} tracked symbols", data.len());
                        for quote in data.values() {
                            log_quote("SNAPSHOT", quote);
                        }
                    }
                    Ok(FeedMessage::MarketUpdate { data, .. }) => log_quote("UPDATE", &data),
                    Err(_) => debug!("Ignoring unrecognized frame: {}", line.trim_end()),
                }
                line.clear();
            }
            Err(e) => {
                // A timeout mid-frame keeps the partial line for the next read.
                if e.kind() == ErrorKind::WouldBlock || e.kind() == ErrorKind::TimedOut {
                    continue;
                }
                error!("Receive data error: {}", e);
                return Err(FeedError::Io(e));
            }
        }
    }
    info!("Feed loop stopping...");
    Ok(())
}

/// Log one quote line with a human-readable timestamp.
fn log_quote(kind: &str, quote: &Quote) {
    let time = DateTime::from_timestamp_millis(quote.updated_at as i64)
        .map(|t| t.format("%H:%M:%S%.3f").to_string())
        .unwrap_or_else(|| quote.updated_at.to_string());
    info!(
        "{}: {} ({}) Price={:.2} Change={:+.2} ({:+.2}%) Volume={} Time={}",
        kind,
        quote.symbol,
        quote.display_name,
        quote.price,
        quote.absolute_change,
        quote.percent_change,
        quote.volume,
        time
    );
}

fn init_logger() {
    env_logger::Builder::new()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();
}
