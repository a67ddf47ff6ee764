//! Currency conversion of a metrics record through a currency-pair instrument

use crate::core::document::QuoteDocument;
use crate::core::metrics::{AttrValue, MetricsRecord, round_to};
use anyhow::{Context, Result, bail};
use tracing::debug;

/// Attributes denominated in the listing currency. Change-percent attributes
/// are dimensionless and never rescaled; profit/loss attributes are
/// recomputed from the converted price by the engine instead.
const CURRENCY_BEARING: [&str; 33] = [
    "change",
    "highestPrice",
    "lastPrice",
    "lowestPrice",
    "totalValueTraded",
    "marketCapital",
    "priceOneWeekAgo",
    "priceOneMonthAgo",
    "priceThreeMonthsAgo",
    "priceOneYearAgo",
    "priceThreeYearsAgo",
    "priceFiveYearsAgo",
    "priceTenYearsAgo",
    "priceAtStartOfYear",
    "changeOneWeek",
    "changeOneMonth",
    "changeThreeMonths",
    "changeOneYear",
    "changeThreeYears",
    "changeFiveYears",
    "changeTenYears",
    "changeCurrentYear",
    "totalChangeOneWeek",
    "totalChangeOneMonth",
    "totalChangeThreeMonths",
    "totalChangeOneYear",
    "totalChangeThreeYears",
    "totalChangeFiveYears",
    "totalChangeTenYears",
    "totalChangeCurrentYear",
    "totalValue",
    "totalChange",
    "dividend_amountPerShare",
];

fn is_currency_bearing(name: &str) -> bool {
    CURRENCY_BEARING.contains(&name) || name.ends_with("_amountPerShare")
}

/// Rescale the record value and every currency-bearing attribute using the
/// conversion instrument's current price as the exchange rate. "unknown" and
/// null attributes are left untouched.
pub fn convert(record: &mut MetricsRecord, conversion: &QuoteDocument, invert: bool) -> Result<()> {
    let mut rate = conversion
        .last()
        .context("Conversion instrument has no current price")?;
    if invert {
        if rate == 0.0 {
            bail!("Conversion rate is zero, cannot invert");
        }
        rate = 1.0 / rate;
    }
    debug!(rate, invert, "Applying currency conversion");

    // Conversion pairs are named "XXX/YYY"; the inverted direction reports
    // in the first currency, the direct one in the second.
    if let Some((first, second)) = conversion.name().and_then(|n| n.split_once('/')) {
        record.unit = if invert { first } else { second }.trim().to_string();
    }

    record.value = round_to(record.value * rate, 5);
    for (name, value) in record.attributes.iter_mut() {
        if !is_currency_bearing(name) {
            continue;
        }
        if let AttrValue::Number(n) = value {
            *value = AttrValue::Number(round_to(*n * rate, 5));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn pair(name: &str, last: f64) -> QuoteDocument {
        QuoteDocument::from_value(json!({
            "name": name,
            "quote": { "last": last },
        }))
        .unwrap()
    }

    fn record() -> MetricsRecord {
        let mut record = MetricsRecord::new(60.0, "USD".to_string());
        record.insert("changeOneWeek", AttrValue::Number(5.0));
        record.insert("changePercentOneWeek", AttrValue::Number(9.091));
        record.insert("changeOneYear", AttrValue::Unknown);
        record.insert("sector", AttrValue::Text("Telecom".to_string()));
        record.insert("dividend0_amountPerShare", AttrValue::Number(2.0));
        record
    }

    #[test]
    fn test_rescales_allow_list_only() {
        let mut record = record();
        convert(&mut record, &pair("USD/SEK", 10.0), false).unwrap();

        assert_eq!(record.value, 600.0);
        assert_eq!(record.unit, "SEK");
        assert_eq!(record.get("changeOneWeek"), Some(&AttrValue::Number(50.0)));
        // Percentages are dimensionless
        assert_eq!(
            record.get("changePercentOneWeek"),
            Some(&AttrValue::Number(9.091))
        );
        // Unknown and text values are untouched
        assert_eq!(record.get("changeOneYear"), Some(&AttrValue::Unknown));
        assert_eq!(
            record.get("sector"),
            Some(&AttrValue::Text("Telecom".to_string()))
        );
        // Dividend amounts follow the ordinal naming
        assert_eq!(
            record.get("dividend0_amountPerShare"),
            Some(&AttrValue::Number(20.0))
        );
    }

    #[test]
    fn test_inverted_rate_and_unit() {
        let mut record = record();
        convert(&mut record, &pair("USD/SEK", 10.0), true).unwrap();

        assert_eq!(record.value, 6.0);
        assert_eq!(record.unit, "USD");
    }

    #[test]
    fn test_zero_rate_inversion_fails() {
        let mut record = record();
        let result = convert(&mut record, &pair("USD/SEK", 0.0), true);
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("zero"));
    }

    #[test]
    fn test_missing_conversion_price_fails() {
        let conversion = QuoteDocument::from_value(json!({ "name": "USD/SEK" })).unwrap();
        let mut record = record();
        assert!(convert(&mut record, &conversion, false).is_err());
    }

    #[test]
    fn test_unit_kept_when_name_has_no_slash() {
        let mut record = record();
        convert(&mut record, &pair("NOK", 10.0), false).unwrap();
        assert_eq!(record.unit, "USD");
    }

    #[test]
    fn test_round_trip_restores_price() {
        let mut record = MetricsRecord::new(123.45678, "USD".to_string());
        convert(&mut record, &pair("USD/SEK", 9.7), false).unwrap();
        convert(&mut record, &pair("USD/SEK", 9.7), true).unwrap();
        assert!((record.value - 123.45678).abs() < 1e-5);
        assert_eq!(record.unit, "USD");
    }
}
