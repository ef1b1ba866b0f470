//!
//! Common types and utilities shared by the feed server and client.
//!
//! This crate aggregates:
//! - `error` — unified error type `FeedError` used across the workspace.
//! - `result` — handy `Result<T, FeedError>` alias.
//! - `symbols` — the fixed set of tracked market indices and their listing data.
//! - `quote` — the `Quote` payload exchanged between server and client.
//! - `protocol` — JSON frames sent from the server to connected viewers.
//! - `net` — networking constants and small helpers.
#![warn(missing_docs)]
pub mod error;
pub mod result;
pub mod symbols;
pub mod quote;
pub mod protocol;
pub mod net;

pub use error::FeedError;
pub use result::Result;
pub use protocol::FeedMessage;
pub use quote::Quote;
pub use symbols::IndexSymbol;
