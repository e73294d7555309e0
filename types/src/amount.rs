//! Token amount types.
//!
//! User-facing amounts are exact decimals ([`TokenAmount`]); amounts sent to
//! contracts are integer wei ([`Wei`], 18 decimals). Conversion between the two
//! never goes through floating point.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::TypesError;

/// Number of decimals of every ERC-20 token this workspace handles.
pub const ETHER_DECIMALS: u32 = 18;

/// A token amount in whole-token units (e.g. `12.5` SNX).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TokenAmount(Decimal);

impl TokenAmount {
    pub const ZERO: Self = Self(Decimal::ZERO);

    pub fn new(value: Decimal) -> Self {
        Self(value)
    }

    /// Parse user input such as `"100"` or `" 0.25 "`.
    ///
    /// Rejects empty input, garbage and negative values.
    pub fn parse(input: &str) -> Result<Self, TypesError> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(TypesError::EmptyAmount);
        }
        let value = Decimal::from_str(trimmed)
            .map_err(|_| TypesError::InvalidAmount(trimmed.to_string()))?;
        if value.is_sign_negative() && !value.is_zero() {
            return Err(TypesError::NegativeAmount(trimmed.to_string()));
        }
        Ok(Self(value))
    }

    pub fn as_decimal(&self) -> Decimal {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    pub fn checked_mul(self, factor: Decimal) -> Option<Self> {
        self.0.checked_mul(factor).map(Self)
    }

    pub fn checked_div(self, divisor: Decimal) -> Option<Self> {
        self.0.checked_div(divisor).map(Self)
    }

    pub fn checked_sub(self, other: Self) -> Option<Self> {
        self.0.checked_sub(other.0).map(Self)
    }

    /// Round to at most `decimals` fractional digits (banker's rounding).
    pub fn round_dp(self, decimals: u32) -> Self {
        Self(self.0.round_dp(decimals))
    }

    /// Convert to integer wei, like `parseEther`.
    ///
    /// Fails when the amount carries more than 18 fractional digits or does
    /// not fit in 128 bits.
    pub fn to_wei(&self) -> Result<Wei, TypesError> {
        let normalized = self.0.normalize();
        if normalized.scale() > ETHER_DECIMALS {
            return Err(TypesError::TooManyDecimals {
                amount: normalized.to_string(),
                max: ETHER_DECIMALS,
            });
        }
        let mantissa = u128::try_from(normalized.mantissa())
            .map_err(|_| TypesError::NegativeAmount(normalized.to_string()))?;
        let factor = 10u128.pow(ETHER_DECIMALS - normalized.scale());
        mantissa
            .checked_mul(factor)
            .map(Wei)
            .ok_or_else(|| TypesError::AmountOverflow(normalized.to_string()))
    }
}

impl From<Decimal> for TokenAmount {
    fn from(value: Decimal) -> Self {
        Self(value)
    }
}

impl FromStr for TokenAmount {
    type Err = TypesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for TokenAmount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.normalize())
    }
}

/// An integer amount of the smallest token unit (10^-18 of a token).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Wei(u128);

impl Wei {
    pub const ZERO: Self = Self(0);

    pub fn new(raw: u128) -> Self {
        Self(raw)
    }

    /// Convert a gas price in gwei to wei.
    pub fn from_gwei(gwei: u64) -> Self {
        Self(u128::from(gwei) * 1_000_000_000)
    }

    pub fn raw(&self) -> u128 {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Convert back to whole-token units.
    pub fn to_token_amount(&self) -> Result<TokenAmount, TypesError> {
        let mantissa =
            i128::try_from(self.0).map_err(|_| TypesError::AmountOverflow(self.0.to_string()))?;
        Decimal::try_from_i128_with_scale(mantissa, ETHER_DECIMALS)
            .map(|d| TokenAmount(d.normalize()))
            .map_err(|_| TypesError::AmountOverflow(self.0.to_string()))
    }
}

impl fmt::Display for Wei {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} wei", self.0)
    }
}
