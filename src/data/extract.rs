use crate::data::{Quote, TimeSeries};
use serde_json::Value;
use tracing::warn;

pub const STATUS_OK: u16 = 200;

// Expected shape:
//
// {
//   "chart": {
//     "result": [{
//       "meta": { "regularMarketPrice": 288.99, "previousClose": 291.2, ... },
//       "timestamp": [ ... ],
//       "indicators": { "quote": [{ "close": [ ... ] }] }
//     }],
//     "error": null
//   }
// }

/// Turns a chart response into a series. Never fails: anything unexpected
/// leaves the series invalid or the affected array empty.
pub fn extract_series(symbol: &str, status: u16, body: &[u8]) -> TimeSeries {
    let mut series = TimeSeries::empty(symbol);

    let Some(root) = parse_body(symbol, status, body) else {
        return series;
    };
    let Some(result) = first_result(&root) else {
        return series;
    };

    if let Some(timestamps) = result.get("timestamp").and_then(|v| v.as_array()) {
        series.timestamps = timestamps
            .iter()
            .map(|node| node.as_i64().unwrap_or(0))
            .collect();
    }

    if let Some(close) = close_prices(result) {
        series.prices = close.iter().map(|node| node.as_f64().unwrap_or(0.0)).collect();
        // A present close array marks the series valid, even when empty.
        series.valid = true;
    }

    series
}

/// Turns a summary response into a quote. Valid only when both the market
/// price and the previous close are strictly positive.
pub fn extract_quote(symbol: &str, status: u16, body: &[u8]) -> Quote {
    let mut quote = Quote::empty(symbol);

    let Some(root) = parse_body(symbol, status, body) else {
        return quote;
    };
    let Some(meta) = first_result(&root).and_then(|r| r.get("meta")) else {
        return quote;
    };

    let price = meta
        .get("regularMarketPrice")
        .and_then(|v| v.as_f64())
        .unwrap_or(0.0);
    let prev_close = meta
        .get("previousClose")
        .and_then(|v| v.as_f64())
        .unwrap_or(0.0);

    if price > 0.0 && prev_close > 0.0 {
        quote.price = price;
        quote.change_pct = ((price - prev_close) / prev_close) * 100.0;
        quote.valid = true;
    }

    quote
}

fn parse_body(symbol: &str, status: u16, body: &[u8]) -> Option<Value> {
    if status != STATUS_OK {
        warn!(symbol, status, "fetch failed");
        return None;
    }

    match serde_json::from_slice::<Value>(body) {
        Ok(root) => Some(root),
        Err(e) => {
            warn!(symbol, error = %e, "failed to parse response");
            None
        }
    }
}

fn first_result(root: &Value) -> Option<&Value> {
    let result = root.get("chart")?.get("result")?.as_array()?.first()?;
    result.is_object().then_some(result)
}

fn close_prices(result: &Value) -> Option<&Vec<Value>> {
    result
        .get("indicators")?
        .get("quote")?
        .as_array()?
        .first()?
        .get("close")?
        .as_array()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn body(value: Value) -> Vec<u8> {
        serde_json::to_vec(&value).unwrap()
    }

    #[test]
    fn test_well_formed_chart() {
        let payload = body(json!({
            "chart": {
                "result": [{
                    "timestamp": [1000, 1010, 1020],
                    "indicators": { "quote": [{ "close": [10.0, 11.0, 12.0] }] }
                }],
                "error": null
            }
        }));

        let series = extract_series("IBM", STATUS_OK, &payload);

        assert!(series.valid);
        assert_eq!(series.symbol, "IBM");
        assert_eq!(series.data_count(), 3);
        assert_eq!(series.timestamps, vec![1000, 1010, 1020]);
        assert_eq!(series.prices, vec![10.0, 11.0, 12.0]);
    }

    #[test]
    fn test_malformed_inputs_are_invalid() {
        let cases: Vec<Vec<u8>> = vec![
            Vec::new(),
            b"not json".to_vec(),
            body(json!({})),
            body(json!({ "chart": { "result": null } })),
            body(json!({ "chart": { "result": [] } })),
            body(json!({ "chart": { "result": [null] } })),
            body(json!({ "chart": "oops" })),
            body(json!([1, 2, 3])),
        ];

        for payload in cases {
            let series = extract_series("IBM", STATUS_OK, &payload);
            assert!(!series.valid);
            assert!(series.timestamps.is_empty());
            assert!(series.prices.is_empty());
        }
    }

    #[test]
    fn test_non_ok_status_is_invalid() {
        let payload = body(json!({
            "chart": { "result": [{
                "timestamp": [1000],
                "indicators": { "quote": [{ "close": [10.0] }] }
            }]}
        }));

        let series = extract_series("IBM", 500, &payload);
        assert!(!series.valid);
        assert!(series.timestamps.is_empty());
    }

    #[test]
    fn test_bad_elements_keep_alignment() {
        let payload = body(json!({
            "chart": { "result": [{
                "timestamp": [1000, "x", 1020.5, null, 1040],
                "indicators": { "quote": [{ "close": [10.0, null, 12, "y", 14.5] }] }
            }]}
        }));

        let series = extract_series("IBM", STATUS_OK, &payload);

        assert!(series.valid);
        assert_eq!(series.timestamps, vec![1000, 0, 0, 0, 1040]);
        assert_eq!(series.prices, vec![10.0, 0.0, 12.0, 0.0, 14.5]);
    }

    #[test]
    fn test_missing_close_keeps_timestamps() {
        let payload = body(json!({
            "chart": { "result": [{
                "timestamp": [1000, 1010],
                "indicators": { "quote": [{}] }
            }]}
        }));

        let series = extract_series("IBM", STATUS_OK, &payload);

        assert!(!series.valid);
        assert_eq!(series.data_count(), 2);
        assert!(series.prices.is_empty());
    }

    #[test]
    fn test_empty_close_array_is_valid() {
        let payload = body(json!({
            "chart": { "result": [{
                "timestamp": [1000, 1010],
                "indicators": { "quote": [{ "close": [] }] }
            }]}
        }));

        let series = extract_series("IBM", STATUS_OK, &payload);

        assert!(series.valid);
        assert_eq!(series.data_count(), 2);
        assert!(series.prices.is_empty());
        assert_eq!(series.last_price(), 0.0);
    }

    #[test]
    fn test_close_without_timestamps() {
        let payload = body(json!({
            "chart": { "result": [{
                "indicators": { "quote": [{ "close": [1.0, 2.0] }] }
            }]}
        }));

        let series = extract_series("IBM", STATUS_OK, &payload);

        assert!(series.valid);
        assert_eq!(series.data_count(), 0);
        assert!(!series.qualifies());
    }

    #[test]
    fn test_quote_change_percent() {
        let payload = body(json!({
            "chart": { "result": [{
                "meta": { "regularMarketPrice": 110.0, "previousClose": 100.0 }
            }]}
        }));

        let quote = extract_quote("EURUSD=X", STATUS_OK, &payload);

        assert!(quote.valid);
        assert_eq!(quote.price, 110.0);
        assert!((quote.change_pct - 10.0).abs() < 1e-9);
        assert_eq!(quote.display_symbol(), "EURUSD");
    }

    #[test]
    fn test_quote_requires_positive_values() {
        let zero_close = body(json!({
            "chart": { "result": [{
                "meta": { "regularMarketPrice": 110.0, "previousClose": 0 }
            }]}
        }));
        let missing_price = body(json!({
            "chart": { "result": [{ "meta": { "previousClose": 100.0 } }] }
        }));
        let no_meta = body(json!({ "chart": { "result": [{}] } }));

        for payload in [zero_close, missing_price, no_meta] {
            let quote = extract_quote("IBM", STATUS_OK, &payload);
            assert!(!quote.valid);
            assert_eq!(quote.price, 0.0);
        }

        assert!(!extract_quote("IBM", 404, b"{}").valid);
    }
}
