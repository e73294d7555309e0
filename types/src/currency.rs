//! Currency keys for the collateral token, synths and ether.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::TypesError;

/// Identifies an asset by its on-chain currency key.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CurrencyKey {
    /// The collateral / governance token.
    #[serde(rename = "SNX")]
    Snx,
    /// The stablecoin minted against collateral.
    #[serde(rename = "sUSD")]
    SUsd,
    #[serde(rename = "sETH")]
    SEth,
    #[serde(rename = "sBTC")]
    SBtc,
    /// Inverse ether synth.
    #[serde(rename = "iETH")]
    IEth,
    #[serde(rename = "ETH")]
    Eth,
}

impl CurrencyKey {
    pub const ALL: [CurrencyKey; 6] = [
        Self::Snx,
        Self::SUsd,
        Self::SEth,
        Self::SBtc,
        Self::IEth,
        Self::Eth,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Snx => "SNX",
            Self::SUsd => "sUSD",
            Self::SEth => "sETH",
            Self::SBtc => "sBTC",
            Self::IEth => "iETH",
            Self::Eth => "ETH",
        }
    }

    /// Whether this asset is a synth issued by the protocol.
    pub fn is_synth(&self) -> bool {
        matches!(self, Self::SUsd | Self::SEth | Self::SBtc | Self::IEth)
    }

    /// The key as a right-padded 32-byte string, the on-chain representation.
    pub fn to_bytes32(&self) -> [u8; 32] {
        let mut out = [0u8; 32];
        let raw = self.as_str().as_bytes();
        out[..raw.len()].copy_from_slice(raw);
        out
    }
}

impl FromStr for CurrencyKey {
    type Err = TypesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|key| key.as_str() == s)
            .ok_or_else(|| TypesError::UnknownCurrency(s.to_string()))
    }
}

impl fmt::Display for CurrencyKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_is_case_sensitive() {
        assert_eq!("sUSD".parse::<CurrencyKey>().unwrap(), CurrencyKey::SUsd);
        assert!("SUSD".parse::<CurrencyKey>().is_err());
    }

    #[test]
    fn bytes32_is_right_padded() {
        let bytes = CurrencyKey::SUsd.to_bytes32();
        assert_eq!(&bytes[..4], b"sUSD");
        assert!(bytes[4..].iter().all(|b| *b == 0));
    }

    #[test]
    fn only_synths_are_synths() {
        assert!(CurrencyKey::SUsd.is_synth());
        assert!(!CurrencyKey::Snx.is_synth());
        assert!(!CurrencyKey::Eth.is_synth());
    }
}
