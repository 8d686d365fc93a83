use rust_decimal::Decimal;
use serde::Serialize;
use std::cmp::Ordering;

use super::price_level::PriceLevel;
use crate::error::BookError;
use crate::values::{Price, Symbol, Timestamp};

/// Immutable view of one order book tick.
///
/// Construction validates the book; there are no mutators, so a new tick
/// always produces a new snapshot. Invariants held by every instance:
/// - bids strictly descending by price, asks strictly ascending
/// - all prices positive, all sizes non-negative
/// - `best_bid < best_ask` when both sides are non-empty
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrderBookSnapshot {
    timestamp: Timestamp,
    exchange_id: String,
    symbol: Symbol,
    bids: Vec<PriceLevel>,
    asks: Vec<PriceLevel>,
}

impl OrderBookSnapshot {
    /// Build a snapshot from levels that are already ordered.
    pub fn new(
        timestamp: Timestamp,
        exchange_id: impl Into<String>,
        symbol: impl Into<Symbol>,
        bids: Vec<PriceLevel>,
        asks: Vec<PriceLevel>,
    ) -> Result<Self, BookError> {
        validate_levels("bid", &bids)?;
        validate_levels("ask", &asks)?;

        for (index, pair) in bids.windows(2).enumerate() {
            match pair[0].price.cmp(&pair[1].price) {
                Ordering::Greater => {}
                Ordering::Equal => {
                    return Err(BookError::DuplicateLevel {
                        side: "bid",
                        price: pair[1].price.to_string(),
                    });
                }
                Ordering::Less => return Err(BookError::BidsNotDescending { index: index + 1 }),
            }
        }

        for (index, pair) in asks.windows(2).enumerate() {
            match pair[0].price.cmp(&pair[1].price) {
                Ordering::Less => {}
                Ordering::Equal => {
                    return Err(BookError::DuplicateLevel {
                        side: "ask",
                        price: pair[1].price.to_string(),
                    });
                }
                Ordering::Greater => return Err(BookError::AsksNotAscending { index: index + 1 }),
            }
        }

        if let (Some(bid), Some(ask)) = (bids.first(), asks.first())
            && bid.price >= ask.price
        {
            return Err(BookError::Crossed {
                best_bid: bid.price.to_string(),
                best_ask: ask.price.to_string(),
            });
        }

        Ok(OrderBookSnapshot {
            timestamp,
            exchange_id: exchange_id.into(),
            symbol: symbol.into(),
            bids,
            asks,
        })
    }

    /// Build a snapshot from levels in arbitrary order.
    ///
    /// Sides are sorted (bids descending, asks ascending) and then validated
    /// exactly like [`OrderBookSnapshot::new`].
    pub fn from_unsorted(
        timestamp: Timestamp,
        exchange_id: impl Into<String>,
        symbol: impl Into<Symbol>,
        mut bids: Vec<PriceLevel>,
        mut asks: Vec<PriceLevel>,
    ) -> Result<Self, BookError> {
        bids.sort_by(|a, b| b.price.cmp(&a.price));
        asks.sort_by(|a, b| a.price.cmp(&b.price));
        Self::new(timestamp, exchange_id, symbol, bids, asks)
    }

    pub fn timestamp(&self) -> Timestamp {
        self.timestamp
    }

    pub fn exchange_id(&self) -> &str {
        &self.exchange_id
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn bids(&self) -> &[PriceLevel] {
        &self.bids
    }

    pub fn asks(&self) -> &[PriceLevel] {
        &self.asks
    }

    pub fn best_bid(&self) -> Option<&PriceLevel> {
        self.bids.first()
    }

    pub fn best_ask(&self) -> Option<&PriceLevel> {
        self.asks.first()
    }

    /// Mid price, only defined for a two-sided book
    pub fn mid_price(&self) -> Option<Price> {
        let bid = self.best_bid()?;
        let ask = self.best_ask()?;
        Some((bid.price + ask.price) / Decimal::TWO)
    }

    /// Best ask minus best bid
    pub fn spread(&self) -> Option<Price> {
        Some(self.best_ask()?.price - self.best_bid()?.price)
    }

    pub fn is_two_sided(&self) -> bool {
        !self.bids.is_empty() && !self.asks.is_empty()
    }
}

fn validate_levels(side: &'static str, levels: &[PriceLevel]) -> Result<(), BookError> {
    for level in levels {
        if level.price <= Decimal::ZERO {
            return Err(BookError::NonPositivePrice {
                side,
                price: level.price.to_string(),
            });
        }
        if level.size < Decimal::ZERO {
            return Err(BookError::NegativeSize {
                side,
                price: level.price.to_string(),
                size: level.size.to_string(),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use rust_decimal_macros::dec;

    fn lvl(price: Decimal, size: Decimal) -> PriceLevel {
        PriceLevel::new(price, size)
    }

    fn book(bids: Vec<PriceLevel>, asks: Vec<PriceLevel>) -> Result<OrderBookSnapshot, BookError> {
        OrderBookSnapshot::new(Utc::now(), "OKX", "BTC-USDT-SWAP", bids, asks)
    }

    #[test]
    fn test_valid_book() {
        let snapshot = book(
            vec![lvl(dec!(100), dec!(1)), lvl(dec!(99), dec!(2))],
            vec![lvl(dec!(101), dec!(1)), lvl(dec!(102), dec!(3))],
        )
        .unwrap();

        assert_eq!(snapshot.best_bid().unwrap().price, dec!(100));
        assert_eq!(snapshot.best_ask().unwrap().price, dec!(101));
        assert_eq!(snapshot.mid_price(), Some(dec!(100.5)));
        assert_eq!(snapshot.spread(), Some(dec!(1)));
        assert_eq!(snapshot.exchange_id(), "OKX");
        assert_eq!(snapshot.symbol(), "BTC-USDT-SWAP");
    }

    #[test]
    fn test_crossed_book_rejected() {
        let err = book(vec![lvl(dec!(101), dec!(1))], vec![lvl(dec!(100), dec!(1))]).unwrap_err();
        assert!(matches!(err, BookError::Crossed { .. }));

        // Locked book (bid == ask) is crossed as well
        let err = book(vec![lvl(dec!(100), dec!(1))], vec![lvl(dec!(100), dec!(1))]).unwrap_err();
        assert!(matches!(err, BookError::Crossed { .. }));
    }

    #[test]
    fn test_unordered_sides_rejected() {
        let err = book(
            vec![lvl(dec!(99), dec!(1)), lvl(dec!(100), dec!(1))],
            vec![lvl(dec!(101), dec!(1))],
        )
        .unwrap_err();
        assert_eq!(err, BookError::BidsNotDescending { index: 1 });

        let err = book(
            vec![lvl(dec!(99), dec!(1))],
            vec![lvl(dec!(102), dec!(1)), lvl(dec!(101), dec!(1))],
        )
        .unwrap_err();
        assert_eq!(err, BookError::AsksNotAscending { index: 1 });
    }

    #[test]
    fn test_from_unsorted_sorts_both_sides() {
        let snapshot = OrderBookSnapshot::from_unsorted(
            Utc::now(),
            "OKX",
            "BTC-USDT-SWAP",
            vec![lvl(dec!(98), dec!(1)), lvl(dec!(100), dec!(1)), lvl(dec!(99), dec!(1))],
            vec![lvl(dec!(103), dec!(1)), lvl(dec!(101), dec!(1))],
        )
        .unwrap();

        let bid_prices: Vec<_> = snapshot.bids().iter().map(|l| l.price).collect();
        let ask_prices: Vec<_> = snapshot.asks().iter().map(|l| l.price).collect();
        assert_eq!(bid_prices, vec![dec!(100), dec!(99), dec!(98)]);
        assert_eq!(ask_prices, vec![dec!(101), dec!(103)]);
    }

    #[test]
    fn test_from_unsorted_still_rejects_crossed() {
        let err = OrderBookSnapshot::from_unsorted(
            Utc::now(),
            "OKX",
            "BTC-USDT-SWAP",
            vec![lvl(dec!(100), dec!(1)), lvl(dec!(105), dec!(1))],
            vec![lvl(dec!(104), dec!(1))],
        )
        .unwrap_err();
        assert!(matches!(err, BookError::Crossed { .. }));
    }

    #[test]
    fn test_duplicate_levels_rejected() {
        let err = OrderBookSnapshot::from_unsorted(
            Utc::now(),
            "OKX",
            "BTC-USDT-SWAP",
            vec![lvl(dec!(100), dec!(1)), lvl(dec!(100), dec!(2))],
            vec![],
        )
        .unwrap_err();
        assert!(matches!(err, BookError::DuplicateLevel { side: "bid", .. }));
    }

    #[test]
    fn test_negative_size_and_price_rejected() {
        let err = book(vec![lvl(dec!(100), dec!(-1))], vec![]).unwrap_err();
        assert!(matches!(err, BookError::NegativeSize { .. }));

        let err = book(vec![], vec![lvl(dec!(0), dec!(1))]).unwrap_err();
        assert!(matches!(err, BookError::NonPositivePrice { .. }));
    }

    #[test]
    fn test_one_sided_book_has_no_mid() {
        let snapshot = book(vec![lvl(dec!(100), dec!(1))], vec![]).unwrap();
        assert!(!snapshot.is_two_sided());
        assert_eq!(snapshot.mid_price(), None);
        assert_eq!(snapshot.spread(), None);
    }

    #[test]
    fn test_zero_size_level_allowed() {
        let snapshot = book(vec![lvl(dec!(100), dec!(0))], vec![lvl(dec!(101), dec!(0))]).unwrap();
        assert!(snapshot.best_bid().unwrap().is_empty());
    }
}
