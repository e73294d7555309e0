//! Nullable monitor — settle transactions by hand.

use std::sync::{Mutex, PoisonError};
use synthstake_chain::{SettleCallback, Subscription, TransactionMonitor, TxOutcome, WatchRegistry};
use synthstake_types::TxHash;

/// A monitor whose transactions settle only when the test says so.
pub struct NullMonitor {
    registry: WatchRegistry,
    watched: Mutex<Vec<TxHash>>,
}

impl NullMonitor {
    pub fn new() -> Self {
        Self {
            registry: WatchRegistry::new(),
            watched: Mutex::new(Vec::new()),
        }
    }

    /// Report `hash` as confirmed. Returns how many callbacks ran.
    pub fn confirm(&self, hash: TxHash) -> usize {
        self.registry.settle(hash, TxOutcome::Confirmed)
    }

    /// Report `hash` as reverted. Returns how many callbacks ran.
    pub fn revert(&self, hash: TxHash, reason: impl Into<String>) -> usize {
        self.registry.settle(
            hash,
            TxOutcome::Reverted {
                reason: reason.into(),
            },
        )
    }

    /// Whether a live subscription is waiting on `hash`.
    pub fn is_watching(&self, hash: &TxHash) -> bool {
        self.registry.is_watching(hash)
    }

    /// Every hash ever passed to `watch`, in order.
    pub fn watched(&self) -> Vec<TxHash> {
        self.watched
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl Default for NullMonitor {
    fn default() -> Self {
        Self::new()
    }
}

impl TransactionMonitor for NullMonitor {
    fn watch(&self, hash: TxHash, on_settled: SettleCallback) -> Subscription {
        self.watched
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(hash);
        self.registry.register(hash, on_settled)
    }
}
