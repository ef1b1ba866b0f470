//! Advisory symbol scoring.
//!
//! Scoring is a seam, not part of the distribution path: the feed behaves the
//! same whatever produces the advice. `SymbolScorer` is the interface a real
//! model would implement; `RandomScorer` is the stand-in shipped with the
//! server, picking one of three advisory signals with templated reasoning.

use feed_common::Quote;
use rand::Rng;
use serde::Serialize;
use strum_macros::Display;

/// Advisory direction for one symbol.
#[allow(missing_docs)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display)]
#[strum(serialize_all = "UPPERCASE")]
pub enum Signal {
    Buy,
    Hold,
    Sell,
}

/// Outcome of scoring one quote.
#[derive(Debug, Clone, Serialize)]
pub struct SymbolScore {
    /// Advisory direction.
    pub signal: Signal,
    /// Confidence in the signal, in `[0, 1]`.
    pub confidence: f64,
    /// Human-readable justification shown next to the signal.
    pub reasoning: String,
}

/// Scoring strategy for tracked symbols.
pub trait SymbolScorer {
    /// Produce an advisory score for the given quote.
    fn score_symbol(&self, quote: &Quote) -> SymbolScore;
}

/// Baseline scorer with no model behind it: a uniform pick among the three
/// signals, with reasoning templated from the quote.
pub struct RandomScorer;

impl SymbolScorer for RandomScorer {
    fn score_symbol(&self, quote: &Quote) -> SymbolScore {
        let mut rng = rand::rng();
        let signal = match rng.random_range(0..3u8) {
            0 => Signal::Buy,
            1 => Signal::Sell,
            _ => Signal::Hold,
        };
        let confidence = rng.random_range(0.55..0.95);
        let reasoning = match signal {
            Signal::Buy => format!(
                "{} is showing upward momentum at {:.2}; volume supports accumulation.",
                quote.display_name, quote.price
            ),
            Signal::Sell => format!(
                "{} looks extended at {:.2}; recent volume suggests distribution.",
                quote.display_name, quote.price
            ),
            Signal::Hold => format!(
                "{} is trading sideways around {:.2}; no clear edge either way.",
                quote.display_name, quote.price
            ),
        };
        SymbolScore {
            signal,
            confidence,
            reasoning,
        }
    }
}
