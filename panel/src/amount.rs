//! Turning user-entered amounts into contract call parameters.
//!
//! Minting the full collateral goes through `issueMaxSynths`, which lets the
//! contract compute the amount and leaves no dust. That path is chosen by
//! plain equality with the maximum and never touches the ratio formula.

use rust_decimal::Decimal;
use synthstake_chain::ChainCall;
use synthstake_types::amount::ETHER_DECIMALS;
use synthstake_types::{TokenAmount, TypesError};

/// Collateral-ratio math used to derive mint and burn amounts.
pub trait RatioFormula: Send + Sync {
    /// sUSD mintable by staking `stake` collateral at `target_ratio`.
    fn mint_amount(
        &self,
        target_ratio: Decimal,
        stake: TokenAmount,
        collateral_price: Decimal,
    ) -> Option<TokenAmount>;

    /// Collateral unlocked by burning `burn` sUSD at `target_ratio`.
    fn unstake_amount(
        &self,
        target_ratio: Decimal,
        burn: TokenAmount,
        collateral_price: Decimal,
    ) -> Option<TokenAmount>;
}

/// The issuance-ratio formula: `mint = stake × ratio × price`.
///
/// `target_ratio` is the issuance ratio (debt / collateral value), e.g. 0.25
/// for a 400 % collateralization target.
#[derive(Clone, Copy, Debug, Default)]
pub struct IssuanceRatioFormula;

impl RatioFormula for IssuanceRatioFormula {
    fn mint_amount(
        &self,
        target_ratio: Decimal,
        stake: TokenAmount,
        collateral_price: Decimal,
    ) -> Option<TokenAmount> {
        stake
            .checked_mul(target_ratio)?
            .checked_mul(collateral_price)
    }

    fn unstake_amount(
        &self,
        target_ratio: Decimal,
        burn: TokenAmount,
        collateral_price: Decimal,
    ) -> Option<TokenAmount> {
        let divisor = target_ratio.checked_mul(collateral_price)?;
        if divisor.is_zero() {
            return None;
        }
        burn.checked_div(divisor)
    }
}

/// How a mint request is submitted.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MintParameter {
    /// Input equals the maximum: mint everything via the max method.
    Max,
    /// Explicit sUSD amount computed from the formula.
    Exact { stake: TokenAmount, mint: TokenAmount },
}

/// How a burn request is submitted.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BurnParameter {
    /// Burn back to the target ratio; the contract computes the amount.
    ToTarget,
    Exact { burn: TokenAmount },
}

/// Maps inputs to call parameters.
pub struct AmountResolver<F = IssuanceRatioFormula> {
    formula: F,
}

impl AmountResolver<IssuanceRatioFormula> {
    pub fn new() -> Self {
        Self {
            formula: IssuanceRatioFormula,
        }
    }
}

impl Default for AmountResolver<IssuanceRatioFormula> {
    fn default() -> Self {
        Self::new()
    }
}

impl<F: RatioFormula> AmountResolver<F> {
    pub fn with_formula(formula: F) -> Self {
        Self { formula }
    }

    pub fn formula(&self) -> &F {
        &self.formula
    }

    /// Resolve a mint request.
    ///
    /// Returns `None` when the formula overflows.
    pub fn resolve_mint(
        &self,
        stake: TokenAmount,
        max_collateral: TokenAmount,
        target_ratio: Decimal,
        collateral_price: Decimal,
    ) -> Option<MintParameter> {
        if stake == max_collateral {
            return Some(MintParameter::Max);
        }
        let mint = self
            .formula
            .mint_amount(target_ratio, stake, collateral_price)?
            .round_dp(ETHER_DECIMALS);
        Some(MintParameter::Exact { stake, mint })
    }

    /// Resolve a burn request.
    pub fn resolve_burn(&self, burn: TokenAmount, burn_to_target: bool) -> BurnParameter {
        if burn_to_target {
            BurnParameter::ToTarget
        } else {
            BurnParameter::Exact { burn }
        }
    }

    /// sUSD a stake would mint, for previews. Never used to pick the call.
    pub fn mint_preview(
        &self,
        stake: TokenAmount,
        target_ratio: Decimal,
        collateral_price: Decimal,
    ) -> TokenAmount {
        self.formula
            .mint_amount(target_ratio, stake, collateral_price)
            .map(|m| m.round_dp(ETHER_DECIMALS))
            .unwrap_or(TokenAmount::ZERO)
    }

    /// Collateral a burn would unlock, for previews.
    pub fn unstake_preview(
        &self,
        burn: TokenAmount,
        target_ratio: Decimal,
        collateral_price: Decimal,
    ) -> TokenAmount {
        self.formula
            .unstake_amount(target_ratio, burn, collateral_price)
            .map(|m| m.round_dp(ETHER_DECIMALS))
            .unwrap_or(TokenAmount::ZERO)
    }
}

impl MintParameter {
    pub fn to_call(&self) -> Result<ChainCall, TypesError> {
        match self {
            Self::Max => Ok(ChainCall::IssueMaxSynths),
            Self::Exact { mint, .. } => Ok(ChainCall::IssueSynths {
                amount: mint.to_wei()?,
            }),
        }
    }
}

impl BurnParameter {
    pub fn to_call(&self) -> Result<ChainCall, TypesError> {
        match self {
            Self::ToTarget => Ok(ChainCall::BurnSynthsToTarget),
            Self::Exact { burn } => Ok(ChainCall::BurnSynths {
                amount: burn.to_wei()?,
            }),
        }
    }
}
