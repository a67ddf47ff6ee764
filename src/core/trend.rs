//! Trend classification against the previous close

use crate::core::document::{QuoteDocument, Window};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trend {
    Up,
    Down,
    Neutral,
    None,
}

impl Trend {
    pub fn as_str(&self) -> &'static str {
        match self {
            Trend::Up => "up",
            Trend::Down => "down",
            Trend::Neutral => "neutral",
            Trend::None => "none",
        }
    }
}

/// Classify the current price against the previous close. Either side
/// missing (e.g. the first refresh cycle) yields `Trend::None`.
pub fn classify(current: Option<f64>, previous: Option<f64>) -> Trend {
    match (current, previous) {
        (Some(current), Some(previous)) => {
            if current > previous {
                Trend::Up
            } else if current < previous {
                Trend::Down
            } else {
                Trend::Neutral
            }
        }
        _ => Trend::None,
    }
}

/// Derive the previous close for the next trend comparison.
///
/// Precedence: recompute from the document's own change amount
/// (`last - change`) whenever both are present; otherwise reuse the value
/// retained from the previous cycle; otherwise approximate with the one-week
/// closing price.
pub fn derive_previous_close(doc: &QuoteDocument, retained: Option<f64>) -> Option<f64> {
    match (doc.last(), doc.change()) {
        (Some(last), Some(change)) => Some(last - change),
        _ => retained.or_else(|| doc.closing_price(Window::OneWeek)),
    }
}

/// Icon for the published record: the cash icon unless the configuration
/// opts into trend icons and a trend is known.
pub fn icon(trend: Trend, show_trend_icon: bool) -> &'static str {
    if !show_trend_icon {
        return "mdi:cash";
    }
    match trend {
        Trend::Up => "mdi:trending-up",
        Trend::Down => "mdi:trending-down",
        Trend::Neutral => "mdi:trending-neutral",
        Trend::None => "mdi:cash",
    }
}
