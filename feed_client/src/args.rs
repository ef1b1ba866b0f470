//! Command-line arguments for the Feed Client.
//!
//! This module defines the CLI interface using `clap`. See `main` for
//! end-to-end usage.
use clap::Parser;
use feed_common::net::FEED_PORT;

/// Parsed command-line arguments.
#[derive(Debug, Parser)]
#[command(version, about, long_about = None)]
pub struct Args {
    /// Server IP address (IPv4 or IPv6) where the feed service is running.
    #[clap(long, default_value = "127.0.0.1")]
    pub server_ip: String,

    /// TCP port the feed service listens on.
    #[clap(long, default_value_t = FEED_PORT)]
    pub port: u16,
}
