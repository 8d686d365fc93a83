//! Wire message types for feed ingestion
//!
//! Levels travel as `[price, size]` string pairs so no precision is lost
//! before they are parsed into decimals.

pub mod feed;

pub use feed::FeedMessage;
