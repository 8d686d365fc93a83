use std::str::FromStr;

use chrono::{DateTime, NaiveDateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tcsim_core::{OrderBookSnapshot, PriceLevel};

use crate::error::{GatewayError, Result};

/// One L2 order book tick as published by the feed
///
/// ```json
/// {"timestamp": "2025-05-04T10:39:13Z", "exchange": "OKX", "symbol": "BTC-USDT-SWAP",
///  "asks": [["95445.5", "9.06"]], "bids": [["95445.4", "1104.23"]]}
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedMessage {
    pub timestamp: String,
    pub exchange: String,
    pub symbol: String,
    pub asks: Vec<[String; 2]>,
    pub bids: Vec<[String; 2]>,
}

impl FeedMessage {
    pub fn parse(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// True if the message belongs to the given instrument (case-insensitive)
    pub fn is_for(&self, exchange: &str, symbol: &str) -> bool {
        self.exchange.eq_ignore_ascii_case(exchange) && self.symbol.eq_ignore_ascii_case(symbol)
    }

    /// Parse levels and timestamp into a validated snapshot.
    ///
    /// Sides may arrive in any order; they are sorted before validation.
    /// A book that is still crossed after sorting is rejected.
    pub fn into_snapshot(self) -> Result<OrderBookSnapshot> {
        let timestamp = parse_timestamp(&self.timestamp)?;
        let bids = parse_levels(&self.bids)?;
        let asks = parse_levels(&self.asks)?;

        Ok(OrderBookSnapshot::from_unsorted(
            timestamp,
            self.exchange,
            self.symbol,
            bids,
            asks,
        )?)
    }
}

fn parse_levels(raw: &[[String; 2]]) -> Result<Vec<PriceLevel>> {
    raw.iter()
        .map(|[price, size]| {
            Ok(PriceLevel::new(
                parse_decimal("price", price)?,
                parse_decimal("size", size)?,
            ))
        })
        .collect()
}

fn parse_decimal(field: &'static str, value: &str) -> Result<Decimal> {
    let trimmed = value.trim();
    Decimal::from_str(trimmed)
        .or_else(|_| Decimal::from_scientific(trimmed))
        .map_err(|_| GatewayError::InvalidNumber {
            field,
            value: value.to_string(),
        })
}

/// RFC 3339, or ISO-8601 without an offset (taken as UTC)
fn parse_timestamp(value: &str) -> Result<DateTime<Utc>> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(value) {
        return Ok(ts.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f")
        .map(|naive| naive.and_utc())
        .map_err(|_| GatewayError::InvalidTimestamp(value.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use tcsim_core::BookError;

    const TICK: &str = r#"{
        "timestamp": "2025-05-04T10:39:13Z",
        "exchange": "OKX",
        "symbol": "BTC-USDT-SWAP",
        "asks": [["95445.5", "9.06"], ["95448.0", "2.05"]],
        "bids": [["95445.4", "1104.23"], ["95445.3", "0.02"]]
    }"#;

    #[test]
    fn test_parse_and_normalize() {
        let message = FeedMessage::parse(TICK).unwrap();
        assert!(message.is_for("okx", "btc-usdt-swap"));

        let snapshot = message.into_snapshot().unwrap();
        assert_eq!(snapshot.best_bid().unwrap().price, dec!(95445.4));
        assert_eq!(snapshot.best_ask().unwrap().price, dec!(95445.5));
        assert_eq!(snapshot.bids()[0].size, dec!(1104.23));
        assert_eq!(snapshot.timestamp().to_rfc3339(), "2025-05-04T10:39:13+00:00");
    }

    #[test]
    fn test_unsorted_sides_are_sorted() {
        let text = r#"{"timestamp":"2024-01-01T00:00:00.000Z","exchange":"OKX","symbol":"BTC-USDT-SWAP",
            "asks":[["102","1"],["101","1"]],"bids":[["99","1"],["100","1"]]}"#;
        let snapshot = FeedMessage::parse(text).unwrap().into_snapshot().unwrap();

        assert_eq!(snapshot.best_bid().unwrap().price, dec!(100));
        assert_eq!(snapshot.best_ask().unwrap().price, dec!(101));
    }

    #[test]
    fn test_crossed_after_sorting_rejected() {
        let text = r#"{"timestamp":"2024-01-01T00:00:00Z","exchange":"OKX","symbol":"BTC-USDT-SWAP",
            "asks":[["100","1"]],"bids":[["101","1"]]}"#;
        let err = FeedMessage::parse(text).unwrap().into_snapshot().unwrap_err();

        assert!(matches!(err, GatewayError::InvalidBook(BookError::Crossed { .. })));
        assert!(err.is_malformed());
    }

    #[test]
    fn test_bad_numbers_and_timestamps_rejected() {
        let bad_price = r#"{"timestamp":"2024-01-01T00:00:00Z","exchange":"OKX","symbol":"X",
            "asks":[["abc","1"]],"bids":[]}"#;
        let err = FeedMessage::parse(bad_price).unwrap().into_snapshot().unwrap_err();
        assert!(matches!(err, GatewayError::InvalidNumber { field: "price", .. }));

        let bad_time = r#"{"timestamp":"yesterday","exchange":"OKX","symbol":"X","asks":[],"bids":[]}"#;
        let err = FeedMessage::parse(bad_time).unwrap().into_snapshot().unwrap_err();
        assert!(matches!(err, GatewayError::InvalidTimestamp(_)));
    }

    #[test]
    fn test_structural_errors() {
        assert!(FeedMessage::parse("not json").is_err());
        // Missing sides
        assert!(FeedMessage::parse(r#"{"timestamp":"2024-01-01T00:00:00Z","exchange":"OKX","symbol":"X"}"#).is_err());
        // Level with three entries
        assert!(
            FeedMessage::parse(
                r#"{"timestamp":"2024-01-01T00:00:00Z","exchange":"OKX","symbol":"X","asks":[["1","2","3"]],"bids":[]}"#
            )
            .is_err()
        );
    }

    #[test]
    fn test_timestamp_without_offset_is_utc() {
        let text = r#"{"timestamp":"2025-05-04T10:39:13","exchange":"OKX","symbol":"X",
            "asks":[["101","1"]],"bids":[]}"#;
        let snapshot = FeedMessage::parse(text).unwrap().into_snapshot().unwrap();
        assert_eq!(snapshot.timestamp().to_rfc3339(), "2025-05-04T10:39:13+00:00");

        let millis = parse_timestamp("2025-05-04T10:39:13.250").unwrap();
        assert_eq!(millis.timestamp_subsec_millis(), 250);
    }

    #[test]
    fn test_scientific_notation_size() {
        let text = r#"{"timestamp":"2024-01-01T00:00:00Z","exchange":"OKX","symbol":"X",
            "asks":[["101","1e-3"]],"bids":[]}"#;
        let snapshot = FeedMessage::parse(text).unwrap().into_snapshot().unwrap();
        assert_eq!(snapshot.best_ask().unwrap().size, dec!(0.001));
    }
}
