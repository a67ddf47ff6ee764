//! Metrics record, attribute values and the monitored-condition schema

use crate::core::document::Window;
use serde::{Serialize, Serializer};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

/// Value of a single published attribute.
///
/// `Unknown` marks a change calculation whose historical reference point is
/// missing; it renders and serializes as the literal string "unknown".
/// `Null` marks an absent document value and is distinct from `Unknown`.
#[derive(Debug, Clone, PartialEq)]
pub enum AttrValue {
    Number(f64),
    Text(String),
    Bool(bool),
    Null,
    Unknown,
}

impl AttrValue {
    /// Map a raw document value. Composite values are kept as their JSON
    /// rendering rather than being flattened.
    pub fn from_json(value: &Value) -> AttrValue {
        match value {
            Value::Number(n) => n
                .as_f64()
                .map(AttrValue::Number)
                .unwrap_or(AttrValue::Null),
            Value::String(s) => AttrValue::Text(s.clone()),
            Value::Bool(b) => AttrValue::Bool(*b),
            Value::Null => AttrValue::Null,
            other => AttrValue::Text(other.to_string()),
        }
    }

    pub fn from_opt_json(value: Option<&Value>) -> AttrValue {
        value.map_or(AttrValue::Null, AttrValue::from_json)
    }

    pub fn from_opt_number(value: Option<f64>) -> AttrValue {
        value.map_or(AttrValue::Null, AttrValue::Number)
    }

    pub fn from_opt_text(value: Option<&str>) -> AttrValue {
        value.map_or(AttrValue::Null, |s| AttrValue::Text(s.to_string()))
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            AttrValue::Number(n) => Some(*n),
            _ => None,
        }
    }
}

impl fmt::Display for AttrValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttrValue::Number(n) => write!(f, "{n}"),
            AttrValue::Text(s) => write!(f, "{s}"),
            AttrValue::Bool(b) => write!(f, "{b}"),
            AttrValue::Null => write!(f, "null"),
            AttrValue::Unknown => write!(f, "unknown"),
        }
    }
}

impl Serialize for AttrValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            AttrValue::Number(n) => serializer.serialize_f64(*n),
            AttrValue::Text(s) => serializer.serialize_str(s),
            AttrValue::Bool(b) => serializer.serialize_bool(*b),
            AttrValue::Null => serializer.serialize_none(),
            AttrValue::Unknown => serializer.serialize_str("unknown"),
        }
    }
}

/// The denormalized per-instrument record produced by one refresh cycle.
#[derive(Debug, Clone, Serialize)]
pub struct MetricsRecord {
    pub value: f64,
    pub unit: String,
    pub attributes: BTreeMap<String, AttrValue>,
}

impl MetricsRecord {
    pub fn new(value: f64, unit: String) -> Self {
        MetricsRecord {
            value,
            unit,
            attributes: BTreeMap::new(),
        }
    }

    pub fn insert(&mut self, key: impl Into<String>, value: AttrValue) {
        self.attributes.insert(key.into(), value);
    }

    pub fn get(&self, key: &str) -> Option<&AttrValue> {
        self.attributes.get(key)
    }
}

/// Where a monitored condition reads its value from, with the document key
/// where the condition name and the provider key differ.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConditionSource {
    Quote { key: &'static str },
    Listing { key: &'static str },
    KeyRatio { key: &'static str },
    Company { key: &'static str },
    HistoricalPrice(Window),
    Id,
    Dividends,
    Raw { key: &'static str },
}

/// Routing table for the closed monitored-condition vocabulary. A name that
/// returns `None` is not a valid condition and is rejected at config time.
pub fn condition_source(name: &str) -> Option<ConditionSource> {
    use ConditionSource::*;
    Some(match name {
        "change" => Quote { key: "change" },
        "changePercent" => Quote { key: "changePercent" },
        "lastPrice" => Quote { key: "last" },
        "lastPriceUpdated" => Quote { key: "updated" },
        "highestPrice" => Quote { key: "highest" },
        "lowestPrice" => Quote { key: "lowest" },
        "totalValueTraded" => Quote { key: "totalValueTraded" },
        "totalVolumeTraded" => Quote { key: "totalVolumeTraded" },
        "currency" => Listing { key: "currency" },
        "marketPlace" => Listing { key: "marketPlaceName" },
        "flagCode" => Listing { key: "countryCode" },
        "tickerSymbol" => Listing { key: "tickerSymbol" },
        "marketList" => Listing { key: "marketListName" },
        "directYield" => KeyRatio { key: "directYield" },
        "priceEarningsRatio" => KeyRatio { key: "priceEarningsRatio" },
        "volatility" => KeyRatio { key: "volatility" },
        "description" => Company { key: "description" },
        "marketCapital" => Company { key: "marketCapital" },
        "sector" => Company { key: "sector" },
        "totalNumberOfShares" => Company { key: "totalNumberOfShares" },
        "priceOneWeekAgo" => HistoricalPrice(Window::OneWeek),
        "priceOneMonthAgo" => HistoricalPrice(Window::OneMonth),
        "priceThreeMonthsAgo" => HistoricalPrice(Window::ThreeMonths),
        "priceOneYearAgo" => HistoricalPrice(Window::OneYear),
        "priceThreeYearsAgo" => HistoricalPrice(Window::ThreeYears),
        "priceFiveYearsAgo" => HistoricalPrice(Window::FiveYears),
        "priceTenYearsAgo" => HistoricalPrice(Window::TenYears),
        "priceAtStartOfYear" => HistoricalPrice(Window::StartOfYear),
        "id" => Id,
        "dividends" => Dividends,
        "name" => Raw { key: "name" },
        "isin" => Raw { key: "isin" },
        "country" => Raw { key: "country" },
        "tradable" => Raw { key: "tradable" },
        "morningStarFactSheetUrl" => Raw { key: "morningStarFactSheetUrl" },
        "numberOfOwners" => Raw { key: "numberOfOwners" },
        "loanFactor" => Raw { key: "loanFactor" },
        "hasInvestmentFees" => Raw { key: "hasInvestmentFees" },
        "marketMakerExpected" => Raw { key: "marketMakerExpected" },
        "marketTrades" => Raw { key: "marketTrades" },
        "orderDepthReceivedTime" => Raw { key: "orderDepthReceivedTime" },
        "quoteUpdated" => Raw { key: "quoteUpdated" },
        "pushPermitted" => Raw { key: "pushPermitted" },
        "shortSellable" => Raw { key: "shortSellable" },
        "superLoan" => Raw { key: "superLoan" },
        _ => return None,
    })
}

/// Monitored conditions applied when a configuration names none.
pub const DEFAULT_MONITORED: [&str; 3] = ["change", "changePercent", "name"];

/// Round to a fixed number of decimal places; all published monetary values
/// carry 5 decimals, percentages 3.
pub fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}
