//! Metric derivation engine
//!
//! Turns one quote document (plus an optional conversion document) and an
//! instrument configuration into the full metrics record for a refresh
//! cycle. Derivation is pure computation; missing data degrades individual
//! attributes, never the whole record.

use crate::core::config::InstrumentConfig;
use crate::core::convert;
use crate::core::dividends;
use crate::core::document::{QuoteDocument, Window};
use crate::core::metrics::{
    AttrValue, ConditionSource, MetricsRecord, condition_source, round_to,
};
use anyhow::{Context, Result};
use chrono::NaiveDate;
use tracing::debug;

/// Derive the metrics record for one refresh cycle.
///
/// Currency conversion runs after the base attributes are in place; the
/// profit/loss block is computed last, from the post-conversion price, so a
/// purchase price stated in the target currency is never double-converted.
pub fn derive(
    doc: &QuoteDocument,
    config: &InstrumentConfig,
    conversion: Option<&QuoteDocument>,
    today: NaiveDate,
) -> Result<MetricsRecord> {
    let last = doc
        .last()
        .context("Quote document has no current price")?;

    let unit = config
        .currency
        .clone()
        .or_else(|| doc.currency().map(str::to_string))
        .unwrap_or_default();
    let mut record = MetricsRecord::new(last, unit);

    for condition in &config.monitored {
        let Some(source) = condition_source(condition) else {
            // Config validation rejects unknown names before derivation
            continue;
        };
        match source {
            ConditionSource::Quote { key } => {
                record.insert(condition.as_str(), AttrValue::from_opt_json(doc.section_value("quote", key)));
            }
            ConditionSource::Listing { key } => {
                record.insert(
                    condition.as_str(),
                    AttrValue::from_opt_json(doc.section_value("listing", key)),
                );
            }
            ConditionSource::KeyRatio { key } => {
                record.insert(
                    condition.as_str(),
                    AttrValue::from_opt_json(doc.section_value("keyRatios", key)),
                );
            }
            ConditionSource::Company { key } => {
                record.insert(
                    condition.as_str(),
                    AttrValue::from_opt_json(doc.section_value("company", key)),
                );
            }
            ConditionSource::HistoricalPrice(window) => {
                record.insert(condition.as_str(), AttrValue::from_opt_number(doc.closing_price(window)));
            }
            ConditionSource::Id => {
                record.insert(
                    condition.as_str(),
                    AttrValue::from_opt_number(doc.orderbook_id().map(|id| id as f64)),
                );
            }
            ConditionSource::Dividends => {
                dividends::apply(doc, today, &mut record);
            }
            ConditionSource::Raw { key } => {
                record.insert(condition.as_str(), AttrValue::from_opt_json(doc.top_level(key)));
            }
        }

        if condition == "change" {
            insert_window_changes(&mut record, doc, last, config.shares);
        }
        if condition == "changePercent" {
            insert_window_change_percents(&mut record, doc, last);
        }
    }

    if let Some(shares) = config.shares {
        record.insert("shares", AttrValue::Number(shares));
        record.insert("totalValue", AttrValue::Number(round_to(shares * last, 5)));
        record.insert(
            "totalChange",
            doc.change()
                .map(|c| AttrValue::Number(round_to(shares * c, 5)))
                .unwrap_or(AttrValue::Null),
        );
    }

    if let Some(conversion) = conversion {
        convert::convert(&mut record, conversion, config.invert_conversion)?;
        // An explicit currency override outranks the unit read off the
        // conversion pair's name
        if let Some(currency) = &config.currency {
            record.unit = currency.clone();
        }
    }

    if let Some(purchase_price) = config.purchase_price {
        insert_profit_loss(&mut record, config, purchase_price);
    }

    debug!(
        instrument = config.id,
        attributes = record.attributes.len(),
        "Derived metrics record"
    );
    Ok(record)
}

/// Per-window price changes, and total changes when a share count is known.
/// A window without a reference price reports "unknown" instead of failing
/// the record.
fn insert_window_changes(
    record: &mut MetricsRecord,
    doc: &QuoteDocument,
    last: f64,
    shares: Option<f64>,
) {
    for window in Window::ALL {
        let change = doc
            .closing_price(window)
            .map(|reference| AttrValue::Number(round_to(last - reference, 5)))
            .unwrap_or(AttrValue::Unknown);
        record.insert(format!("change{}", window.suffix()), change);

        if let Some(shares) = shares {
            let total = doc
                .closing_price(window)
                .map(|reference| AttrValue::Number(round_to(shares * (last - reference), 5)))
                .unwrap_or(AttrValue::Unknown);
            record.insert(format!("totalChange{}", window.suffix()), total);
        }
    }
}

/// Per-window percentage changes. A zero reference price is treated the same
/// as a missing one: "unknown", never a division by zero.
fn insert_window_change_percents(record: &mut MetricsRecord, doc: &QuoteDocument, last: f64) {
    for window in Window::ALL {
        let percent = match doc.closing_price(window) {
            Some(reference) if reference != 0.0 => {
                AttrValue::Number(round_to(100.0 * (last - reference) / reference, 3))
            }
            _ => AttrValue::Unknown,
        };
        record.insert(format!("changePercent{}", window.suffix()), percent);
    }
}

/// Position profit/loss from the final (post-conversion) price.
fn insert_profit_loss(record: &mut MetricsRecord, config: &InstrumentConfig, purchase_price: f64) {
    let price = record.value;
    if let Some(date) = &config.purchase_date {
        record.insert("purchaseDate", AttrValue::Text(date.clone()));
    }
    record.insert("purchasePrice", AttrValue::Number(purchase_price));
    record.insert(
        "profitLoss",
        AttrValue::Number(round_to(price - purchase_price, 5)),
    );
    record.insert(
        "profitLossPercentage",
        AttrValue::Number(round_to(100.0 * (price - purchase_price) / purchase_price, 3)),
    );
    if let Some(shares) = config.shares {
        record.insert(
            "totalProfitLoss",
            AttrValue::Number(round_to(shares * (price - purchase_price), 5)),
        );
    }
}
