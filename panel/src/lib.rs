//! Transaction-lifecycle panels for the staking screens.
//!
//! The panels coordinate user-initiated chain transactions with feedback:
//! - [`TransactionPanel`] — one action's Idle → AwaitingSignature → Pending →
//!   Success/Failed machine
//! - [`GuardEvaluator`] — preconditions with remediations
//! - [`AmountResolver`] — max call vs. target-ratio formula
//! - [`ConfirmationModal`] — signature / failure dialog
//! - [`MintBurnPanel`] and [`LpRewardsPanel`] — the two screens

pub mod amount;
pub mod config;
pub mod error;
pub mod guard;
pub mod lp;
pub mod metrics;
pub mod mint_burn;
pub mod modal;
pub mod transaction;

pub use amount::{AmountResolver, BurnParameter, IssuanceRatioFormula, MintParameter, RatioFormula};
pub use config::PanelConfig;
pub use error::PanelError;
pub use guard::{Guard, GuardEvaluator, GuardFailure, GuardVerdict, Remediation};
pub use lp::{LpInputs, LpRewardsPanel, LpTabs, LpView, RewardsBox};
pub use metrics::PanelMetrics;
pub use mint_burn::{BurnInputs, MintBurnPanel, MintBurnView, MintInputs};
pub use modal::{AmountLabel, ConfirmationModal, Quote};
pub use transaction::{
    IgnoreReason, PanelSettings, PendingTransaction, SubmitOutcome, SubmitParams,
    TransactionPanel, TxView,
};
