//! Dividend normalization into the ordinal attribute scheme

use crate::core::document::{DividendEvent, QuoteDocument};
use crate::core::metrics::{AttrValue, MetricsRecord};
use chrono::NaiveDate;

const FIELDS: [&str; 4] = ["amountPerShare", "exDate", "exDateStatus", "paymentDate"];

/// Filter, sort and window dividend events into ordered `dividend{i}_{field}`
/// attributes. Only events with all four fields present, a non-zero amount
/// and a payment date on or after `today` survive; ordinals are assigned in
/// ascending payment-date order starting at 0.
///
/// When nothing survives, `dividend0_*` is still emitted as "unknown" so the
/// attribute key-set stays stable across refresh cycles.
pub fn normalize(events: &[DividendEvent], today: NaiveDate) -> Vec<(String, AttrValue)> {
    let mut admitted: Vec<&DividendEvent> = events
        .iter()
        .filter(|e| {
            e.ex_date.is_some() && e.ex_date_status.is_some() && e.payment_date.is_some()
        })
        .filter(|e| e.amount.is_some_and(|a| a != 0.0))
        .collect();
    // ISO dates sort correctly as strings
    admitted.sort_by(|a, b| a.payment_date.cmp(&b.payment_date));

    let mut attributes = Vec::new();
    let mut index = 0;
    for event in admitted {
        let payable = event
            .payment_date
            .as_deref()
            .and_then(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d").ok())
            .is_some_and(|d| d >= today);
        if !payable {
            continue;
        }
        attributes.push((
            format!("dividend{index}_amountPerShare"),
            AttrValue::from_opt_number(event.amount),
        ));
        attributes.push((
            format!("dividend{index}_exDate"),
            AttrValue::from_opt_text(event.ex_date.as_deref()),
        ));
        attributes.push((
            format!("dividend{index}_exDateStatus"),
            AttrValue::from_opt_text(event.ex_date_status.as_deref()),
        ));
        attributes.push((
            format!("dividend{index}_paymentDate"),
            AttrValue::from_opt_text(event.payment_date.as_deref()),
        ));
        index += 1;
    }

    if attributes.is_empty() {
        for field in FIELDS {
            attributes.push((format!("dividend0_{field}"), AttrValue::Unknown));
        }
    }

    attributes
}

/// Apply the dividend attribute scheme the document shape calls for: the
/// ordinal scheme when the document carries a dividend list, otherwise the
/// legacy un-indexed `dividend_{field}` scheme from the key-indicator block.
/// Never both.
pub fn apply(doc: &QuoteDocument, today: NaiveDate, record: &mut MetricsRecord) {
    if let Some(events) = doc.dividend_events() {
        for (key, value) in normalize(events, today) {
            record.insert(key, value);
        }
    } else if let Some(dividend) = doc.key_indicator_dividend() {
        record.insert(
            "dividend_amountPerShare",
            AttrValue::from_opt_number(dividend.amount),
        );
        record.insert(
            "dividend_exDate",
            AttrValue::from_opt_text(dividend.ex_date.as_deref()),
        );
        record.insert(
            "dividend_exDateStatus",
            AttrValue::from_opt_text(dividend.ex_date_status.as_deref()),
        );
        record.insert(
            "dividend_paymentDate",
            AttrValue::from_opt_text(dividend.payment_date.as_deref()),
        );
    } else {
        for (key, value) in normalize(&[], today) {
            record.insert(key, value);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn event(amount: f64, ex_date: &str, payment_date: &str) -> DividendEvent {
        DividendEvent {
            amount: Some(amount),
            ex_date: Some(ex_date.to_string()),
            ex_date_status: Some("CONFIRMED".to_string()),
            payment_date: Some(payment_date.to_string()),
        }
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 15).unwrap()
    }

    #[test]
    fn test_past_dividends_are_excluded() {
        let events = vec![
            event(2.0, "2019-12-20", "2020-01-01"),
            event(3.0, "2098-12-20", "2099-01-01"),
            event(4.0, "2099-05-20", "2099-06-01"),
        ];

        let attrs = normalize(&events, today());
        let keys: Vec<&str> = attrs.iter().map(|(k, _)| k.as_str()).collect();

        assert_eq!(attrs.len(), 8);
        assert!(keys.contains(&"dividend0_paymentDate"));
        assert!(keys.contains(&"dividend1_paymentDate"));
        assert_eq!(
            attrs.iter().find(|(k, _)| k == "dividend0_paymentDate"),
            Some(&(
                "dividend0_paymentDate".to_string(),
                AttrValue::Text("2099-01-01".to_string())
            ))
        );
        assert_eq!(
            attrs.iter().find(|(k, _)| k == "dividend1_amountPerShare"),
            Some(&("dividend1_amountPerShare".to_string(), AttrValue::Number(4.0)))
        );
    }

    #[test]
    fn test_sorted_by_payment_date() {
        let events = vec![
            event(4.0, "2099-05-20", "2099-06-01"),
            event(3.0, "2098-12-20", "2099-01-01"),
        ];

        let attrs = normalize(&events, today());
        assert_eq!(
            attrs.iter().find(|(k, _)| k == "dividend0_amountPerShare"),
            Some(&("dividend0_amountPerShare".to_string(), AttrValue::Number(3.0)))
        );
    }

    #[test]
    fn test_zero_amount_is_excluded() {
        let events = vec![event(0.0, "2098-12-20", "2099-01-01")];
        let attrs = normalize(&events, today());
        assert_eq!(
            attrs,
            FIELDS
                .iter()
                .map(|f| (format!("dividend0_{f}"), AttrValue::Unknown))
                .collect::<Vec<_>>()
        );
    }

    #[test]
    fn test_incomplete_event_is_excluded() {
        let mut incomplete = event(2.5, "2098-12-20", "2099-01-01");
        incomplete.ex_date_status = None;
        let attrs = normalize(&[incomplete], today());
        assert!(attrs.iter().all(|(_, v)| *v == AttrValue::Unknown));
    }

    #[test]
    fn test_empty_list_yields_stable_unknown_keys() {
        let attrs = normalize(&[], today());
        let keys: Vec<&str> = attrs.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(
            keys,
            vec![
                "dividend0_amountPerShare",
                "dividend0_exDate",
                "dividend0_exDateStatus",
                "dividend0_paymentDate"
            ]
        );
    }

    #[test]
    fn test_normalize_is_idempotent() {
        let events = vec![
            event(4.0, "2099-05-20", "2099-06-01"),
            event(3.0, "2098-12-20", "2099-01-01"),
            event(0.0, "2098-01-01", "2098-02-01"),
        ];
        let first = normalize(&events, today());
        let second = normalize(&events, today());
        assert_eq!(first, second);
    }

    #[test]
    fn test_legacy_scheme_from_key_indicators() {
        let doc = QuoteDocument::from_value(json!({
            "keyIndicators": {
                "dividend": {
                    "amount": 6.0,
                    "exDate": "2099-03-20",
                    "exDateStatus": "CONFIRMED",
                    "paymentDate": "2099-03-27",
                }
            }
        }))
        .unwrap();

        let mut record = MetricsRecord::new(1.0, "SEK".to_string());
        apply(&doc, today(), &mut record);

        assert_eq!(
            record.get("dividend_amountPerShare"),
            Some(&AttrValue::Number(6.0))
        );
        assert_eq!(
            record.get("dividend_paymentDate"),
            Some(&AttrValue::Text("2099-03-27".to_string()))
        );
        // Only one scheme per document shape
        assert!(record.get("dividend0_amountPerShare").is_none());
    }

    #[test]
    fn test_list_scheme_wins_over_legacy() {
        let doc = QuoteDocument::from_value(json!({
            "dividends": {
                "events": [{
                    "amount": 2.0,
                    "exDate": "2098-12-20",
                    "exDateStatus": "CONFIRMED",
                    "paymentDate": "2099-01-01",
                }]
            },
            "keyIndicators": { "dividend": { "amount": 6.0 } }
        }))
        .unwrap();

        let mut record = MetricsRecord::new(1.0, "SEK".to_string());
        apply(&doc, today(), &mut record);

        assert_eq!(
            record.get("dividend0_amountPerShare"),
            Some(&AttrValue::Number(2.0))
        );
        assert!(record.get("dividend_amountPerShare").is_none());
    }
}
