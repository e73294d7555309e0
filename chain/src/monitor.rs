//! Transaction monitoring as cancellable subscriptions.
//!
//! A monitor calls back exactly once per watched hash, at some unspecified
//! later time. Every watch returns a [`Subscription`]; dropping it (or calling
//! [`Subscription::unsubscribe`]) guarantees the callback will not run
//! afterwards.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use synthstake_types::TxHash;

/// How a broadcast transaction settled.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TxOutcome {
    Confirmed,
    /// Mined but reverted, or dropped by the network.
    Reverted { reason: String },
}

/// Invoked once with the settled hash and its outcome.
pub type SettleCallback = Box<dyn FnOnce(TxHash, TxOutcome) + Send + 'static>;

/// Watches broadcast transactions until they settle.
pub trait TransactionMonitor: Send + Sync {
    fn watch(&self, hash: TxHash, on_settled: SettleCallback) -> Subscription;
}

/// Handle to a registered callback. Cancels it when dropped.
#[must_use = "dropping a Subscription cancels the callback"]
pub struct Subscription {
    cancel: Option<Box<dyn FnOnce() + Send + 'static>>,
}

impl Subscription {
    pub fn new(cancel: impl FnOnce() + Send + 'static) -> Self {
        Self {
            cancel: Some(Box::new(cancel)),
        }
    }

    /// A subscription with nothing to cancel.
    pub fn detached() -> Self {
        Self { cancel: None }
    }

    /// Cancel the callback now.
    pub fn unsubscribe(mut self) {
        self.run_cancel();
    }

    fn run_cancel(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.run_cancel();
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.cancel.is_some())
            .finish()
    }
}

#[derive(Default)]
struct RegistryInner {
    next_id: u64,
    watches: HashMap<u64, (TxHash, SettleCallback)>,
}

/// Bookkeeping shared by monitor implementations: pending callbacks keyed by
/// watch id, settled at most once.
#[derive(Clone, Default)]
pub struct WatchRegistry {
    inner: Arc<Mutex<RegistryInner>>,
}

impl WatchRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(inner: &Mutex<RegistryInner>) -> MutexGuard<'_, RegistryInner> {
        inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Store a callback and return its watch id.
    pub fn insert(&self, hash: TxHash, on_settled: SettleCallback) -> u64 {
        let mut inner = Self::lock(&self.inner);
        let id = inner.next_id;
        inner.next_id += 1;
        inner.watches.insert(id, (hash, on_settled));
        id
    }

    /// Drop a callback without running it. Returns whether it was still pending.
    pub fn cancel(&self, id: u64) -> bool {
        Self::lock(&self.inner).watches.remove(&id).is_some()
    }

    /// Store a callback and return a subscription that cancels it.
    pub fn register(&self, hash: TxHash, on_settled: SettleCallback) -> Subscription {
        let id = self.insert(hash, on_settled);
        let weak: Weak<Mutex<RegistryInner>> = Arc::downgrade(&self.inner);
        Subscription::new(move || {
            if let Some(inner) = weak.upgrade() {
                Self::lock(&inner).watches.remove(&id);
            }
        })
    }

    /// Run and remove every callback watching `hash`. Returns how many ran.
    ///
    /// Callbacks run after the registry lock is released, so they may touch
    /// the registry themselves.
    pub fn settle(&self, hash: TxHash, outcome: TxOutcome) -> usize {
        let due: Vec<SettleCallback> = {
            let mut inner = Self::lock(&self.inner);
            let ids: Vec<u64> = inner
                .watches
                .iter()
                .filter(|(_, (watched, _))| *watched == hash)
                .map(|(id, _)| *id)
                .collect();
            ids.into_iter()
                .filter_map(|id| inner.watches.remove(&id))
                .map(|(_, callback)| callback)
                .collect()
        };
        let count = due.len();
        for callback in due {
            callback(hash, outcome.clone());
        }
        count
    }

    /// Whether any callback is still waiting on `hash`.
    pub fn is_watching(&self, hash: &TxHash) -> bool {
        Self::lock(&self.inner)
            .watches
            .values()
            .any(|(watched, _)| watched == hash)
    }

    /// Number of pending callbacks.
    pub fn len(&self) -> usize {
        Self::lock(&self.inner).watches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn counting_callback(counter: &Arc<AtomicUsize>) -> SettleCallback {
        let counter = Arc::clone(counter);
        Box::new(move |_, _| {
            counter.fetch_add(1, Ordering::SeqCst);
        })
    }

    #[test]
    fn settle_runs_callback_once() {
        let registry = WatchRegistry::new();
        let hits = Arc::new(AtomicUsize::new(0));
        let hash = TxHash::new([1; 32]);
        let _sub = registry.register(hash, counting_callback(&hits));

        assert_eq!(registry.settle(hash, TxOutcome::Confirmed), 1);
        assert_eq!(registry.settle(hash, TxOutcome::Confirmed), 0);
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn dropping_subscription_cancels_callback() {
        let registry = WatchRegistry::new();
        let hits = Arc::new(AtomicUsize::new(0));
        let hash = TxHash::new([2; 32]);
        let sub = registry.register(hash, counting_callback(&hits));
        drop(sub);

        assert!(!registry.is_watching(&hash));
        assert_eq!(registry.settle(hash, TxOutcome::Confirmed), 0);
        assert_eq!(hits.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn settle_only_touches_matching_hash() {
        let registry = WatchRegistry::new();
        let hits = Arc::new(AtomicUsize::new(0));
        let _a = registry.register(TxHash::new([3; 32]), counting_callback(&hits));
        let _b = registry.register(TxHash::new([4; 32]), counting_callback(&hits));

        registry.settle(TxHash::new([3; 32]), TxOutcome::Confirmed);
        assert_eq!(hits.load(Ordering::SeqCst), 1);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn unsubscribe_after_registry_dropped_is_harmless() {
        let registry = WatchRegistry::new();
        let sub = registry.register(TxHash::new([5; 32]), Box::new(|_, _| {}));
        drop(registry);
        sub.unsubscribe();
    }

    #[test]
    fn callback_may_reenter_registry() {
        let registry = WatchRegistry::new();
        let inner = registry.clone();
        let hash = TxHash::new([6; 32]);
        let _sub = registry.register(
            hash,
            Box::new(move |_, _| {
                assert!(inner.is_empty());
            }),
        );
        assert_eq!(registry.settle(hash, TxOutcome::Confirmed), 1);
    }
}
