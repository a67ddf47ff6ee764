//! Quote document model for the Avanza market-guide API
//!
//! The provider returns a loosely structured JSON document where any section
//! or key may be absent. The parts the engine computes with are parsed into
//! typed fields; everything else stays available through the retained raw
//! value for attribute lookups by name.

use anyhow::{Context, Result};
use serde::Deserialize;
use serde_json::{Value, json};

/// Named lookback points used as change-calculation references.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd)]
pub enum Window {
    OneWeek,
    OneMonth,
    ThreeMonths,
    OneYear,
    ThreeYears,
    FiveYears,
    TenYears,
    StartOfYear,
}

impl Window {
    pub const ALL: [Window; 8] = [
        Window::OneWeek,
        Window::OneMonth,
        Window::ThreeMonths,
        Window::OneYear,
        Window::ThreeYears,
        Window::FiveYears,
        Window::TenYears,
        Window::StartOfYear,
    ];

    /// Key of this window inside `historicalClosingPrices`.
    pub fn key(&self) -> &'static str {
        match self {
            Window::OneWeek => "oneWeek",
            Window::OneMonth => "oneMonth",
            Window::ThreeMonths => "threeMonths",
            Window::OneYear => "oneYear",
            Window::ThreeYears => "threeYears",
            Window::FiveYears => "fiveYears",
            Window::TenYears => "tenYears",
            Window::StartOfYear => "startOfYear",
        }
    }

    /// Suffix used when naming change attributes, e.g. `changeOneWeek`.
    /// The start-of-year window is reported as "CurrentYear".
    pub fn suffix(&self) -> &'static str {
        match self {
            Window::OneWeek => "OneWeek",
            Window::OneMonth => "OneMonth",
            Window::ThreeMonths => "ThreeMonths",
            Window::OneYear => "OneYear",
            Window::ThreeYears => "ThreeYears",
            Window::FiveYears => "FiveYears",
            Window::TenYears => "TenYears",
            Window::StartOfYear => "CurrentYear",
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct QuoteSection {
    pub last: Option<f64>,
    pub change: Option<f64>,
    #[serde(rename = "changePercent")]
    pub change_percent: Option<f64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct HistoricalClosingPrices {
    #[serde(rename = "oneWeek")]
    pub one_week: Option<f64>,
    #[serde(rename = "oneMonth")]
    pub one_month: Option<f64>,
    #[serde(rename = "threeMonths")]
    pub three_months: Option<f64>,
    #[serde(rename = "oneYear")]
    pub one_year: Option<f64>,
    #[serde(rename = "threeYears")]
    pub three_years: Option<f64>,
    #[serde(rename = "fiveYears")]
    pub five_years: Option<f64>,
    #[serde(rename = "tenYears")]
    pub ten_years: Option<f64>,
    #[serde(rename = "startOfYear")]
    pub start_of_year: Option<f64>,
}

impl HistoricalClosingPrices {
    pub fn window(&self, window: Window) -> Option<f64> {
        match window {
            Window::OneWeek => self.one_week,
            Window::OneMonth => self.one_month,
            Window::ThreeMonths => self.three_months,
            Window::OneYear => self.one_year,
            Window::ThreeYears => self.three_years,
            Window::FiveYears => self.five_years,
            Window::TenYears => self.ten_years,
            Window::StartOfYear => self.start_of_year,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ListingSection {
    pub currency: Option<String>,
}

/// One dividend entry as reported by the provider. Also the shape of the
/// single `keyIndicators.dividend` block.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct DividendEvent {
    pub amount: Option<f64>,
    #[serde(rename = "exDate")]
    pub ex_date: Option<String>,
    #[serde(rename = "exDateStatus")]
    pub ex_date_status: Option<String>,
    #[serde(rename = "paymentDate")]
    pub payment_date: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
struct DividendsSection {
    events: Vec<DividendEvent>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
struct KeyIndicators {
    dividend: Option<DividendEvent>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
struct TypedDocument {
    quote: QuoteSection,
    #[serde(rename = "historicalClosingPrices")]
    historical_closing_prices: HistoricalClosingPrices,
    listing: ListingSection,
    dividends: Option<DividendsSection>,
    #[serde(rename = "keyIndicators")]
    key_indicators: KeyIndicators,
    #[serde(rename = "orderbookId")]
    orderbook_id: Option<i64>,
    #[serde(rename = "instrumentType")]
    instrument_type: Option<String>,
    name: Option<String>,
}

#[derive(Debug, Clone)]
pub struct QuoteDocument {
    typed: TypedDocument,
    raw: Value,
}

impl QuoteDocument {
    pub fn from_value(raw: Value) -> Result<Self> {
        let typed: TypedDocument = serde_json::from_value(raw.clone())
            .context("Unexpected quote document shape")?;
        Ok(QuoteDocument { typed, raw })
    }

    /// Synthesize a document for a manually priced instrument: the purchase
    /// price stands in for the current price and every historical window,
    /// giving a flat zero-change series.
    pub fn manual(purchase_price: f64) -> Self {
        let prices: serde_json::Map<String, Value> = Window::ALL
            .iter()
            .map(|w| (w.key().to_string(), json!(purchase_price)))
            .collect();
        let raw = json!({
            "quote": {
                "last": purchase_price,
                "change": 0.0,
                "changePercent": 0.0,
            },
            "historicalClosingPrices": prices,
        });
        let typed = TypedDocument {
            quote: QuoteSection {
                last: Some(purchase_price),
                change: Some(0.0),
                change_percent: Some(0.0),
            },
            historical_closing_prices: HistoricalClosingPrices {
                one_week: Some(purchase_price),
                one_month: Some(purchase_price),
                three_months: Some(purchase_price),
                one_year: Some(purchase_price),
                three_years: Some(purchase_price),
                five_years: Some(purchase_price),
                ten_years: Some(purchase_price),
                start_of_year: Some(purchase_price),
            },
            ..TypedDocument::default()
        };
        QuoteDocument { typed, raw }
    }

    pub fn last(&self) -> Option<f64> {
        self.typed.quote.last
    }

    pub fn change(&self) -> Option<f64> {
        self.typed.quote.change
    }

    pub fn change_percent(&self) -> Option<f64> {
        self.typed.quote.change_percent
    }

    pub fn closing_price(&self, window: Window) -> Option<f64> {
        self.typed.historical_closing_prices.window(window)
    }

    pub fn currency(&self) -> Option<&str> {
        self.typed.listing.currency.as_deref()
    }

    pub fn name(&self) -> Option<&str> {
        self.typed.name.as_deref()
    }

    pub fn orderbook_id(&self) -> Option<i64> {
        self.typed.orderbook_id
    }

    pub fn is_etf(&self) -> bool {
        self.typed.instrument_type.as_deref() == Some("EXCHANGE_TRADED_FUND")
    }

    /// The dividend event list, or `None` when the document carries no
    /// dividends section at all (an empty list is distinct from an absent
    /// section when choosing the attribute scheme).
    pub fn dividend_events(&self) -> Option<&[DividendEvent]> {
        self.typed.dividends.as_ref().map(|d| d.events.as_slice())
    }

    pub fn key_indicator_dividend(&self) -> Option<&DividendEvent> {
        self.typed.key_indicators.dividend.as_ref()
    }

    /// Raw lookup of a top-level key.
    pub fn top_level(&self, key: &str) -> Option<&Value> {
        self.raw.get(key)
    }

    /// Raw lookup of a key inside a named section.
    pub fn section_value(&self, section: &str, key: &str) -> Option<&Value> {
        self.raw.get(section).and_then(|s| s.get(key))
    }
}
