//! Contract calls the panels can ask the invoker to perform.

use serde::Serialize;
use std::fmt;
use synthstake_types::{CurrencyKey, Wei};

/// A single contract call, before gas settings are attached.
///
/// LP calls are addressed by the synth whose liquidity pool they target; the
/// invoker resolves the contract address.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "method", rename_all = "camelCase")]
pub enum ChainCall {
    /// Mint an explicit amount of sUSD against staked collateral.
    IssueSynths { amount: Wei },
    /// Mint the maximum issuable sUSD; the contract computes the amount.
    IssueMaxSynths,
    /// Burn an explicit amount of sUSD.
    BurnSynths { amount: Wei },
    /// Burn exactly enough sUSD to restore the target ratio.
    BurnSynthsToTarget,
    /// Claim accumulated LP rewards.
    GetReward { pool: CurrencyKey },
    /// Stake LP tokens into the rewards contract.
    Stake { pool: CurrencyKey, amount: Wei },
    /// Withdraw staked LP tokens.
    Withdraw { pool: CurrencyKey, amount: Wei },
    /// Allow the rewards contract to move any amount of LP tokens. The invoker
    /// encodes the allowance as the uint256 maximum, which `Wei` cannot hold.
    ApproveUnlimited { pool: CurrencyKey },
}

impl ChainCall {
    /// Contract method name.
    pub fn method(&self) -> &'static str {
        match self {
            Self::IssueSynths { .. } => "issueSynths",
            Self::IssueMaxSynths => "issueMaxSynths",
            Self::BurnSynths { .. } => "burnSynths",
            Self::BurnSynthsToTarget => "burnSynthsToTarget",
            Self::GetReward { .. } => "getReward",
            Self::Stake { .. } => "stake",
            Self::Withdraw { .. } => "withdraw",
            Self::ApproveUnlimited { .. } => "approve",
        }
    }

    /// The explicit amount argument, if the method takes one.
    pub fn amount(&self) -> Option<Wei> {
        match self {
            Self::IssueSynths { amount }
            | Self::BurnSynths { amount }
            | Self::Stake { amount, .. }
            | Self::Withdraw { amount, .. } => Some(*amount),
            Self::IssueMaxSynths
            | Self::BurnSynthsToTarget
            | Self::GetReward { .. }
            | Self::ApproveUnlimited { .. } => None,
        }
    }
}

impl fmt::Display for ChainCall {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self, self.amount()) {
            (Self::ApproveUnlimited { .. }, _) => write!(f, "{}(uint256 max)", self.method()),
            (_, Some(amount)) => write!(f, "{}({})", self.method(), amount.raw()),
            (_, None) => write!(f, "{}()", self.method()),
        }
    }
}
