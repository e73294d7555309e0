//! Preconditions checked before a submission may start.
//!
//! Guards are built fresh from the caller's input snapshot on every submit
//! and never cached. A failing guard is not an error: it carries the
//! [`Remediation`] the screen should present instead of submitting.

use serde::Serialize;
use synthstake_types::{Address, CurrencyKey, TokenAmount, TypesError};

/// What the user has to do (or wait for) before the action can proceed.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub enum Remediation {
    /// Show the approval overlay.
    ApprovalRequired,
    /// The allowance has not been read from the chain yet.
    AllowanceUnknown,
    /// An on-chain waiting period blocks the action.
    WaitingPeriod { message: String },
    InsufficientBalance {
        needed: TokenAmount,
        available: TokenAmount,
    },
    WalletDisconnected,
    InvalidAmount { message: String },
    NothingToClaim,
}

impl Remediation {
    /// Text for an informative banner.
    pub fn message(&self) -> String {
        match self {
            Self::ApprovalRequired => "approval required".to_string(),
            Self::AllowanceUnknown => "allowance not loaded yet".to_string(),
            Self::WaitingPeriod { message } | Self::InvalidAmount { message } => message.clone(),
            Self::InsufficientBalance { needed, available } => {
                format!("insufficient balance: need {needed}, have {available}")
            }
            Self::WalletDisconnected => "connect a wallet first".to_string(),
            Self::NothingToClaim => "no rewards to claim".to_string(),
        }
    }
}

/// A named precondition, already evaluated against the current inputs.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Guard {
    pub name: &'static str,
    pub passed: bool,
    pub remediation: Remediation,
}

impl Guard {
    pub fn check(name: &'static str, passed: bool, remediation: Remediation) -> Self {
        Self {
            name,
            passed,
            remediation,
        }
    }

    /// A wallet must be connected.
    pub fn wallet_connected(address: Option<Address>) -> Self {
        Self::check(
            "wallet_connected",
            address.is_some(),
            Remediation::WalletDisconnected,
        )
    }

    /// The spender allowance must be known and non-zero.
    pub fn allowance_granted(allowance: Option<TokenAmount>) -> Self {
        match allowance {
            None => Self::check("allowance_granted", false, Remediation::AllowanceUnknown),
            Some(a) => Self::check("allowance_granted", !a.is_zero(), Remediation::ApprovalRequired),
        }
    }

    /// The spender allowance must cover `required`.
    pub fn allowance_covers(allowance: Option<TokenAmount>, required: TokenAmount) -> Self {
        match allowance {
            None => Self::check("allowance_covers", false, Remediation::AllowanceUnknown),
            Some(a) => Self::check(
                "allowance_covers",
                !a.is_zero() && a >= required,
                Remediation::ApprovalRequired,
            ),
        }
    }

    /// `available` must cover `needed`.
    pub fn balance_covers(needed: TokenAmount, available: TokenAmount) -> Self {
        Self::check(
            "balance_covers",
            needed <= available,
            Remediation::InsufficientBalance { needed, available },
        )
    }

    /// The waiting period after the last exchange into `currency` has elapsed.
    pub fn waiting_period_elapsed(active: bool, currency: CurrencyKey) -> Self {
        Self::check(
            "waiting_period_elapsed",
            !active,
            Remediation::WaitingPeriod {
                message: format!("Waiting period for {currency} is still ongoing"),
            },
        )
    }

    /// The issuer allows this account to burn right now.
    pub fn burn_permitted(can_burn: bool) -> Self {
        Self::check(
            "burn_permitted",
            can_burn,
            Remediation::WaitingPeriod {
                message: "Waiting period to burn is still ongoing".to_string(),
            },
        )
    }

    /// The parsed amount must be valid and strictly positive.
    pub fn amount_positive(amount: &Result<TokenAmount, TypesError>) -> Self {
        match amount {
            Ok(value) => Self::check(
                "amount_positive",
                !value.is_zero(),
                Remediation::InvalidAmount {
                    message: "amount must be greater than zero".to_string(),
                },
            ),
            Err(e) => Self::check(
                "amount_positive",
                false,
                Remediation::InvalidAmount {
                    message: e.to_string(),
                },
            ),
        }
    }

    /// There must be something to claim.
    pub fn rewards_available(rewards: TokenAmount) -> Self {
        Self::check(
            "rewards_available",
            !rewards.is_zero(),
            Remediation::NothingToClaim,
        )
    }
}

/// A guard that did not pass.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct GuardFailure {
    pub name: &'static str,
    pub remediation: Remediation,
}

impl From<&Guard> for GuardFailure {
    fn from(guard: &Guard) -> Self {
        Self {
            name: guard.name,
            remediation: guard.remediation.clone(),
        }
    }
}

/// Result of evaluating a guard set.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GuardVerdict {
    Pass,
    Blocked(Vec<GuardFailure>),
}

impl GuardVerdict {
    pub fn is_pass(&self) -> bool {
        matches!(self, Self::Pass)
    }

    /// Whether any failure asks for the approval flow.
    pub fn requires_approval(&self) -> bool {
        match self {
            Self::Pass => false,
            Self::Blocked(failures) => failures
                .iter()
                .any(|f| f.remediation == Remediation::ApprovalRequired),
        }
    }
}

/// Evaluates guard sets. All guards must pass.
pub struct GuardEvaluator;

impl GuardEvaluator {
    pub fn evaluate(guards: &[Guard]) -> GuardVerdict {
        let failures: Vec<GuardFailure> = guards
            .iter()
            .filter(|g| !g.passed)
            .map(GuardFailure::from)
            .collect();
        if failures.is_empty() {
            GuardVerdict::Pass
        } else {
            GuardVerdict::Blocked(failures)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn amount(value: rust_decimal::Decimal) -> TokenAmount {
        TokenAmount::new(value)
    }

    #[test]
    fn empty_guard_set_passes() {
        assert_eq!(GuardEvaluator::evaluate(&[]), GuardVerdict::Pass);
    }

    #[test]
    fn every_failure_is_reported_in_order() {
        let verdict = GuardEvaluator::evaluate(&[
            Guard::wallet_connected(None),
            Guard::rewards_available(amount(dec!(5))),
            Guard::allowance_granted(Some(TokenAmount::ZERO)),
        ]);
        match verdict {
            GuardVerdict::Blocked(failures) => {
                let names: Vec<_> = failures.iter().map(|f| f.name).collect();
                assert_eq!(names, vec!["wallet_connected", "allowance_granted"]);
            }
            GuardVerdict::Pass => panic!("expected blocked verdict"),
        }
    }

    #[test]
    fn zero_allowance_requires_approval() {
        assert!(GuardEvaluator::evaluate(&[Guard::allowance_granted(Some(TokenAmount::ZERO))])
            .requires_approval());
        assert!(GuardEvaluator::evaluate(&[Guard::allowance_granted(Some(amount(dec!(1))))])
            .is_pass());
    }

    #[test]
    fn unknown_allowance_blocks_without_asking_for_approval() {
        for guard in [
            Guard::allowance_granted(None),
            Guard::allowance_covers(None, amount(dec!(1))),
        ] {
            assert_eq!(guard.remediation, Remediation::AllowanceUnknown);
            let verdict = GuardEvaluator::evaluate(&[guard]);
            assert!(!verdict.is_pass());
            assert!(!verdict.requires_approval());
        }
    }

    #[test]
    fn allowance_must_cover_required_amount() {
        let allowance = Some(amount(dec!(10)));
        assert!(Guard::allowance_covers(allowance, amount(dec!(10))).passed);
        assert!(!Guard::allowance_covers(allowance, amount(dec!(10.5))).passed);
    }

    #[test]
    fn waiting_period_message_names_currency() {
        let guard = Guard::waiting_period_elapsed(true, CurrencyKey::SUsd);
        assert!(!guard.passed);
        assert_eq!(
            guard.remediation.message(),
            "Waiting period for sUSD is still ongoing"
        );
    }

    #[test]
    fn invalid_amount_carries_parse_error() {
        let guard = Guard::amount_positive(&TokenAmount::parse("abc"));
        assert!(!guard.passed);
        assert!(guard.remediation.message().contains("abc"));
        assert!(!Guard::amount_positive(&TokenAmount::parse("0")).passed);
        assert!(Guard::amount_positive(&TokenAmount::parse("0.1")).passed);
    }
}
