//! Gas price and gas limit helpers.

use serde::{Deserialize, Serialize};
use std::str::FromStr;
use synthstake_types::Wei;

/// Gas units a transaction may consume.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct GasLimit(pub u64);

impl GasLimit {
    /// Pad an estimate by `buffer_percent`, rounding to the nearest unit.
    pub fn with_buffer(self, buffer_percent: u32) -> Self {
        let padded = u128::from(self.0) * (100 + u128::from(buffer_percent));
        let rounded = (padded + 50) / 100;
        Self(u64::try_from(rounded).unwrap_or(u64::MAX))
    }
}

/// Gas parameters attached to a submitted call.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GasSettings {
    pub gas_price: Wei,
    pub gas_limit: GasLimit,
}

/// Convert a gas price quoted in gwei to wei, as sent with the transaction.
pub fn normalized_gas_price(gwei: u64) -> Wei {
    Wei::from_gwei(gwei)
}

/// User-selectable confirmation speed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GasSpeed {
    Slow,
    #[default]
    Average,
    Fast,
}

impl FromStr for GasSpeed {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "slow" => Ok(Self::Slow),
            "average" => Ok(Self::Average),
            "fast" => Ok(Self::Fast),
            other => Err(format!("unknown gas speed: {other}")),
        }
    }
}

/// Current gas prices in gwei.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GasPrices {
    pub slow: u64,
    pub average: u64,
    pub fast: u64,
}

impl GasPrices {
    pub fn for_speed(&self, speed: GasSpeed) -> u64 {
        match speed {
            GasSpeed::Slow => self.slow,
            GasSpeed::Average => self.average,
            GasSpeed::Fast => self.fast,
        }
    }
}
