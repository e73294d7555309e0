//! Confirmation modal view model.

use serde::Serialize;
use std::fmt;
use synthstake_types::{CurrencyKey, TokenAmount, TransactionState};

use crate::transaction::TxView;

/// An amount with its currency, e.g. "400 SNX".
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct AmountLabel {
    pub amount: TokenAmount,
    pub currency: CurrencyKey,
}

impl AmountLabel {
    pub fn new(amount: TokenAmount, currency: CurrencyKey) -> Self {
        Self { amount, currency }
    }
}

impl fmt::Display for AmountLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.amount, self.currency)
    }
}

/// What the user is giving (`base`) and getting (`quote`) for a submission.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct Quote {
    pub base: AmountLabel,
    pub quote: AmountLabel,
}

/// Shown while the wallet is asked to sign, and after a failed submission
/// until dismissed. Retry is another submit with the same input.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ConfirmationModal {
    pub action: &'static str,
    /// Waiting on the wallet signature.
    pub awaiting_signature: bool,
    pub tx_error: bool,
    pub error_message: Option<String>,
    pub quote: Option<Quote>,
}

impl ConfirmationModal {
    /// The modal for `view`, or `None` when it is closed.
    pub fn from_view(view: &TxView, quote: Option<Quote>) -> Option<Self> {
        if !view.modal_open {
            return None;
        }
        let awaiting_signature = view.state == TransactionState::AwaitingSignature;
        let tx_error = !awaiting_signature && view.error.is_some();
        Some(Self {
            action: view.action,
            awaiting_signature,
            tx_error,
            error_message: if tx_error { view.error.clone() } else { None },
            quote,
        })
    }

    pub fn can_retry(&self) -> bool {
        self.tx_error
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn view(state: TransactionState, error: Option<&str>, modal_open: bool) -> TxView {
        TxView {
            action: "mint",
            state,
            hash: None,
            explorer_link: None,
            error: error.map(str::to_string),
            pending: None,
            submitted_label: None,
            modal_open,
        }
    }

    #[test]
    fn closed_modal_renders_nothing() {
        assert!(ConfirmationModal::from_view(&view(TransactionState::Idle, None, false), None).is_none());
    }

    #[test]
    fn awaiting_signature_shows_quote_without_error() {
        let quote = Quote {
            base: AmountLabel::new(TokenAmount::new(dec!(400)), CurrencyKey::Snx),
            quote: AmountLabel::new(TokenAmount::new(dec!(200)), CurrencyKey::SUsd),
        };
        let modal = ConfirmationModal::from_view(
            &view(TransactionState::AwaitingSignature, None, true),
            Some(quote),
        )
        .unwrap();
        assert!(modal.awaiting_signature);
        assert!(!modal.can_retry());
        assert_eq!(modal.quote.unwrap().base.to_string(), "400 SNX");
    }

    #[test]
    fn failed_submission_offers_retry() {
        let modal = ConfirmationModal::from_view(
            &view(TransactionState::Idle, Some("User denied"), true),
            None,
        )
        .unwrap();
        assert!(modal.can_retry());
        assert_eq!(modal.error_message.as_deref(), Some("User denied"));
    }
}
