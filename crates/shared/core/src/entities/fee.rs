use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ParameterError;

/// Fee tier based on trading volume or VIP level.
///
/// Rates are fractions of traded notional (0.001 = 0.10%).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum FeeTier {
    /// Default tier for new users (0.10%)
    #[default]
    #[serde(rename = "default")]
    Standard,
    /// 0.08%
    #[serde(rename = "tier1")]
    Tier1,
    /// 0.06%
    #[serde(rename = "tier2")]
    Tier2,
    /// 0.04%
    #[serde(rename = "tier3")]
    Tier3,
}

impl FeeTier {
    pub const ALL: [FeeTier; 4] = [
        FeeTier::Standard,
        FeeTier::Tier1,
        FeeTier::Tier2,
        FeeTier::Tier3,
    ];

    /// Taker fee rate applied to notional
    pub fn rate(&self) -> f64 {
        match self {
            FeeTier::Standard => 0.001,
            FeeTier::Tier1 => 0.0008,
            FeeTier::Tier2 => 0.0006,
            FeeTier::Tier3 => 0.0004,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FeeTier::Standard => "default",
            FeeTier::Tier1 => "tier1",
            FeeTier::Tier2 => "tier2",
            FeeTier::Tier3 => "tier3",
        }
    }
}

impl fmt::Display for FeeTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for FeeTier {
    type Err = ParameterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FeeTier::ALL
            .into_iter()
            .find(|tier| tier.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ParameterError::UnknownFeeTier(s.to_string()))
    }
}
