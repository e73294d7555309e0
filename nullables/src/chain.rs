//! Nullable chain — record contract calls instead of sending them.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use synthstake_chain::{ChainActionInvoker, ChainCall, ChainError, GasLimit, GasSettings};
use synthstake_types::TxHash;
use tokio::sync::Notify;

/// A test invoker that records calls and answers from a script.
///
/// Submissions succeed with sequential hashes (see [`NullChain::hash_for`])
/// unless a failure was queued. With [`NullChain::hold_submissions`] each
/// submit waits for a [`NullChain::release`] first, which lets tests observe
/// the awaiting-signature window.
pub struct NullChain {
    gas_estimate: AtomicU64,
    estimates: Mutex<Vec<ChainCall>>,
    submitted: Mutex<Vec<(ChainCall, GasSettings)>>,
    estimate_failures: Mutex<VecDeque<ChainError>>,
    submit_failures: Mutex<VecDeque<ChainError>>,
    next_nonce: AtomicU64,
    gate: Mutex<Option<Arc<Notify>>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl NullChain {
    pub fn new() -> Self {
        Self {
            gas_estimate: AtomicU64::new(100_000),
            estimates: Mutex::new(Vec::new()),
            submitted: Mutex::new(Vec::new()),
            estimate_failures: Mutex::new(VecDeque::new()),
            submit_failures: Mutex::new(VecDeque::new()),
            next_nonce: AtomicU64::new(0),
            gate: Mutex::new(None),
        }
    }

    /// The hash the `n`-th successful submission (0-based) returns.
    pub fn hash_for(n: u64) -> TxHash {
        let mut bytes = [0xabu8; 32];
        bytes[24..].copy_from_slice(&n.to_be_bytes());
        TxHash::new(bytes)
    }

    /// Gas units every estimate reports.
    pub fn set_gas_estimate(&self, units: u64) {
        self.gas_estimate.store(units, Ordering::SeqCst);
    }

    /// Make the next `estimate_gas` fail.
    pub fn fail_next_estimate(&self, error: ChainError) {
        lock(&self.estimate_failures).push_back(error);
    }

    /// Make the next `submit` fail (e.g. the user rejects the signature).
    pub fn fail_next_submit(&self, error: ChainError) {
        lock(&self.submit_failures).push_back(error);
    }

    /// Block every subsequent submit until [`release`](Self::release) is called.
    pub fn hold_submissions(&self) {
        *lock(&self.gate) = Some(Arc::new(Notify::new()));
    }

    /// Let one held submission through (or the next one, if none is waiting).
    pub fn release(&self) {
        if let Some(gate) = lock(&self.gate).as_ref() {
            gate.notify_one();
        }
    }

    /// Calls that reached the submit step, in order.
    pub fn submitted(&self) -> Vec<ChainCall> {
        lock(&self.submitted)
            .iter()
            .map(|(call, _)| call.clone())
            .collect()
    }

    /// Gas settings of the most recent submission.
    pub fn last_gas(&self) -> Option<GasSettings> {
        lock(&self.submitted).last().map(|(_, gas)| *gas)
    }

    /// Calls that were gas-estimated, in order.
    pub fn estimated(&self) -> Vec<ChainCall> {
        lock(&self.estimates).clone()
    }

    /// Clear all recorded state.
    pub fn reset(&self) {
        lock(&self.estimates).clear();
        lock(&self.submitted).clear();
        lock(&self.estimate_failures).clear();
        lock(&self.submit_failures).clear();
    }
}

impl Default for NullChain {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ChainActionInvoker for NullChain {
    async fn estimate_gas(&self, call: &ChainCall) -> Result<GasLimit, ChainError> {
        lock(&self.estimates).push(call.clone());
        if let Some(error) = lock(&self.estimate_failures).pop_front() {
            return Err(error);
        }
        Ok(GasLimit(self.gas_estimate.load(Ordering::SeqCst)))
    }

    async fn submit(&self, call: &ChainCall, gas: GasSettings) -> Result<TxHash, ChainError> {
        let gate = lock(&self.gate).clone();
        if let Some(gate) = gate {
            gate.notified().await;
        }
        lock(&self.submitted).push((call.clone(), gas));
        if let Some(error) = lock(&self.submit_failures).pop_front() {
            tracing::debug!(method = call.method(), %error, "null chain rejecting submit");
            return Err(error);
        }
        let nonce = self.next_nonce.fetch_add(1, Ordering::SeqCst);
        Ok(Self::hash_for(nonce))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use synthstake_types::Wei;

    fn gas() -> GasSettings {
        GasSettings {
            gas_price: Wei::from_gwei(1),
            gas_limit: GasLimit(21_000),
        }
    }

    #[tokio::test]
    async fn submissions_get_sequential_hashes() {
        let chain = NullChain::new();
        let first = chain.submit(&ChainCall::IssueMaxSynths, gas()).await.unwrap();
        let second = chain.submit(&ChainCall::IssueMaxSynths, gas()).await.unwrap();
        assert_eq!(first, NullChain::hash_for(0));
        assert_eq!(second, NullChain::hash_for(1));
        assert_eq!(chain.submitted().len(), 2);
    }

    #[tokio::test]
    async fn queued_failure_applies_once() {
        let chain = NullChain::new();
        chain.fail_next_submit(ChainError::UserRejected("denied".into()));
        assert!(chain.submit(&ChainCall::IssueMaxSynths, gas()).await.is_err());
        assert!(chain.submit(&ChainCall::IssueMaxSynths, gas()).await.is_ok());
    }

    #[tokio::test]
    async fn estimate_reports_configured_units() {
        let chain = NullChain::new();
        chain.set_gas_estimate(55_000);
        let limit = chain.estimate_gas(&ChainCall::BurnSynthsToTarget).await.unwrap();
        assert_eq!(limit, GasLimit(55_000));
        assert_eq!(chain.estimated(), vec![ChainCall::BurnSynthsToTarget]);
    }

    #[tokio::test]
    async fn held_submission_waits_for_release() {
        let chain = Arc::new(NullChain::new());
        chain.hold_submissions();
        let submitter = {
            let chain = Arc::clone(&chain);
            tokio::spawn(async move { chain.submit(&ChainCall::IssueMaxSynths, gas()).await })
        };
        tokio::task::yield_now().await;
        assert!(chain.submitted().is_empty());
        chain.release();
        assert!(submitter.await.unwrap().is_ok());
        assert_eq!(chain.submitted().len(), 1);
    }
}
