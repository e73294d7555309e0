//! Transaction lifecycle state.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Where a single user action currently is in its on-chain lifecycle.
///
/// Legal edges:
///
/// ```text
/// Idle ──submit──▶ AwaitingSignature ──hash──▶ Pending ──confirmed──▶ Success
///  ▲                      │                      │                     │
///  └──────rejected────────┘                      └──reverted──▶ Failed │
///  ▲                                                              │     │
///  └─────────────────────────dismiss──────────────────────────────┴─────┘
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TransactionState {
    /// Nothing in flight; the form is shown.
    #[default]
    Idle,
    /// The chain action was invoked and the wallet has not answered yet.
    AwaitingSignature,
    /// Broadcast; waiting for the monitor to report the outcome.
    Pending,
    /// Confirmed on chain.
    Success,
    /// Broadcast but reverted on chain.
    Failed,
}

impl TransactionState {
    /// A transaction is in flight: a new submission must not start.
    pub fn is_in_flight(&self) -> bool {
        matches!(self, Self::AwaitingSignature | Self::Pending)
    }

    /// A settled outcome waiting to be dismissed.
    pub fn is_settled(&self) -> bool {
        matches!(self, Self::Success | Self::Failed)
    }

    /// Whether `next` is reachable from `self` in one step.
    pub fn can_transition_to(&self, next: TransactionState) -> bool {
        use TransactionState::*;
        matches!(
            (*self, next),
            (Idle, AwaitingSignature)
                | (AwaitingSignature, Pending)
                | (AwaitingSignature, Idle)
                | (Pending, Success)
                | (Pending, Failed)
                | (Success, Idle)
                | (Failed, Idle)
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::AwaitingSignature => "awaiting_signature",
            Self::Pending => "pending",
            Self::Success => "success",
            Self::Failed => "failed",
        }
    }
}

impl fmt::Display for TransactionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use TransactionState::*;

    const ALL: [TransactionState; 5] = [Idle, AwaitingSignature, Pending, Success, Failed];

    #[test]
    fn success_only_reachable_from_pending() {
        for from in ALL {
            assert_eq!(from.can_transition_to(Success), from == Pending, "{from}");
        }
    }

    #[test]
    fn failed_only_reachable_from_pending() {
        for from in ALL {
            assert_eq!(from.can_transition_to(Failed), from == Pending, "{from}");
        }
    }

    #[test]
    fn pending_cannot_return_to_idle_directly() {
        assert!(!Pending.can_transition_to(Idle));
    }

    #[test]
    fn in_flight_states() {
        let in_flight: Vec<_> = ALL.into_iter().filter(|s| s.is_in_flight()).collect();
        assert_eq!(in_flight, vec![AwaitingSignature, Pending]);
    }
}
