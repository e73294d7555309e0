//! The per-action transaction lifecycle.
//!
//! A [`TransactionPanel`] owns exactly one [`TransactionState`] machine. The
//! only things that move it are explicit calls (`submit`, `dismiss`, `mount`)
//! and the monitor callback for the hash it is tracking. Rendering through
//! [`TransactionPanel::view`] reads state and never transitions.
//!
//! The lock around the machine is never held across an `.await`: a submission
//! claims the machine (Idle → AwaitingSignature), releases the lock while the
//! wallet is asked to sign, and re-checks that its claim is still current
//! before applying the result. The result is applied even if the panel was
//! unmounted meanwhile, so a signed transaction is never forgotten.

use serde::Serialize;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use synthstake_chain::{
    estimate_with_buffer, normalized_gas_price, ChainActionInvoker, ChainCall, ChainContext,
    ChainError, GasPriceProvider, GasSettings, GasSpeed, SettleCallback, Subscription,
    TransactionMonitor, TxOutcome,
};
use synthstake_types::{Clock, CurrencyKey, Timestamp, TokenAmount, TransactionState, TxHash};
use synthstake_utils::format_elapsed;

use crate::config::PanelConfig;
use crate::guard::{Guard, GuardEvaluator, GuardFailure, GuardVerdict};
use crate::metrics::PanelMetrics;

/// Behaviour knobs for a single panel.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PanelSettings {
    pub gas_limit_buffer_percent: u32,
    pub gas_speed: GasSpeed,
    /// Keep Success on screen until dismissed. Otherwise it resets on mount.
    pub persistent_success: bool,
}

impl Default for PanelSettings {
    fn default() -> Self {
        Self::from(&PanelConfig::default())
    }
}

impl From<&PanelConfig> for PanelSettings {
    fn from(config: &PanelConfig) -> Self {
        Self {
            gas_limit_buffer_percent: config.gas_limit_buffer_percent,
            gas_speed: config.gas_speed,
            persistent_success: config.persistent_success,
        }
    }
}

/// A broadcast transaction this panel is waiting on.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct PendingTransaction {
    pub hash: TxHash,
    pub amount: Option<TokenAmount>,
    pub currency: Option<CurrencyKey>,
    pub created_at: Timestamp,
}

/// What to send once every guard has passed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SubmitParams {
    pub call: ChainCall,
    /// Recorded on the pending transaction for display.
    pub amount: Option<TokenAmount>,
    pub currency: Option<CurrencyKey>,
    /// Explicit gas price; falls back to the panel's gas speed.
    pub gas_price_gwei: Option<u64>,
}

impl SubmitParams {
    pub fn new(call: ChainCall) -> Self {
        Self {
            call,
            amount: None,
            currency: None,
            gas_price_gwei: None,
        }
    }

    pub fn with_amount(mut self, amount: TokenAmount, currency: CurrencyKey) -> Self {
        self.amount = Some(amount);
        self.currency = Some(currency);
        self
    }

    pub fn with_gas_price(mut self, gwei: Option<u64>) -> Self {
        self.gas_price_gwei = gwei;
        self
    }
}

/// Why a submit did nothing.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum IgnoreReason {
    /// Another transaction for this action is awaiting signature or pending.
    InFlight,
    /// The previous outcome has not been dismissed yet.
    AwaitingDismiss,
    Unmounted,
}

/// Result of [`TransactionPanel::submit`]. Submitting never returns `Err`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// The wallet signed and the node accepted; the panel is Pending.
    Submitted(TxHash),
    /// Guards failed; nothing was sent and the panel stayed Idle.
    Blocked(Vec<GuardFailure>),
    /// Gas estimation or submission failed; the panel is back to Idle.
    Failed(String),
    Ignored(IgnoreReason),
}

impl SubmitOutcome {
    pub fn is_submitted(&self) -> bool {
        matches!(self, Self::Submitted(_))
    }

    /// Failed guards, if the submit was blocked.
    pub fn blocked(&self) -> Option<&[GuardFailure]> {
        match self {
            Self::Blocked(failures) => Some(failures),
            _ => None,
        }
    }
}

/// Snapshot of a panel for rendering.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct TxView {
    pub action: &'static str,
    pub state: TransactionState,
    /// Last broadcast hash, kept through Success/Failed for the verify link.
    pub hash: Option<TxHash>,
    pub explorer_link: Option<String>,
    pub error: Option<String>,
    pub pending: Option<PendingTransaction>,
    /// "just now", "2m 5s ago", ... while pending.
    pub submitted_label: Option<String>,
    pub modal_open: bool,
}

#[derive(Default)]
struct Inner {
    state: TransactionState,
    pending: Option<PendingTransaction>,
    last_hash: Option<TxHash>,
    error: Option<String>,
    subscription: Option<Subscription>,
    mounted: bool,
    /// Bumped whenever a submission claims the machine.
    attempt: u64,
    modal_open: bool,
}

impl Inner {
    /// Whether the submission that claimed `attempt` may still apply its result.
    ///
    /// Mount state does not matter: a signed transaction is on its way to the
    /// chain whether or not the panel is on screen.
    fn accepts(&self, attempt: u64) -> bool {
        self.attempt == attempt && self.state == TransactionState::AwaitingSignature
    }

    fn is_tracking(&self, hash: TxHash) -> bool {
        self.state == TransactionState::Pending
            && self.pending.as_ref().is_some_and(|p| p.hash == hash)
    }
}

fn lock(inner: &Mutex<Inner>) -> MutexGuard<'_, Inner> {
    inner.lock().unwrap_or_else(PoisonError::into_inner)
}

fn transition(inner: &mut Inner, action: &'static str, next: TransactionState) {
    debug_assert!(
        inner.state.can_transition_to(next),
        "illegal transition {} -> {}",
        inner.state,
        next
    );
    tracing::debug!(action, from = %inner.state, to = %next, "transaction state changed");
    inner.state = next;
}

/// One user action (claim, stake, mint, ...) and its lifecycle.
pub struct TransactionPanel {
    action: &'static str,
    ctx: ChainContext,
    settings: PanelSettings,
    metrics: Option<Arc<PanelMetrics>>,
    inner: Arc<Mutex<Inner>>,
}

impl TransactionPanel {
    /// Create a mounted, idle panel.
    pub fn new(action: &'static str, ctx: ChainContext, settings: PanelSettings) -> Self {
        Self {
            action,
            ctx,
            settings,
            metrics: None,
            inner: Arc::new(Mutex::new(Inner {
                mounted: true,
                ..Inner::default()
            })),
        }
    }

    pub fn with_metrics(mut self, metrics: Arc<PanelMetrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    pub fn action(&self) -> &'static str {
        self.action
    }

    pub fn context(&self) -> &ChainContext {
        &self.ctx
    }

    pub fn current_state(&self) -> TransactionState {
        lock(&self.inner).state
    }

    pub fn current_error(&self) -> Option<String> {
        lock(&self.inner).error.clone()
    }

    pub fn pending(&self) -> Option<PendingTransaction> {
        lock(&self.inner).pending.clone()
    }

    pub fn is_mounted(&self) -> bool {
        lock(&self.inner).mounted
    }

    /// Evaluate `guards`, then build and send the call.
    ///
    /// `build` runs only when every guard passed; returning a failure from it
    /// blocks the submit like a failed guard.
    pub async fn submit<F>(&self, guards: &[Guard], build: F) -> SubmitOutcome
    where
        F: FnOnce() -> Result<SubmitParams, GuardFailure>,
    {
        let (params, attempt) = {
            let mut inner = lock(&self.inner);
            if !inner.mounted {
                return self.ignore(IgnoreReason::Unmounted);
            }
            if inner.state.is_in_flight() {
                return self.ignore(IgnoreReason::InFlight);
            }
            if inner.state.is_settled() {
                return self.ignore(IgnoreReason::AwaitingDismiss);
            }
            if let GuardVerdict::Blocked(failures) = GuardEvaluator::evaluate(guards) {
                return self.block(failures);
            }
            let params = match build() {
                Ok(params) => params,
                Err(failure) => return self.block(vec![failure]),
            };
            inner.error = None;
            inner.attempt += 1;
            inner.modal_open = true;
            transition(&mut inner, self.action, TransactionState::AwaitingSignature);
            (params, inner.attempt)
        };

        tracing::info!(action = self.action, call = %params.call, "submitting transaction");
        match self.send(&params.call, params.gas_price_gwei).await {
            Ok(hash) => self.on_submitted(attempt, hash, params),
            Err(error) => self.on_submit_failed(attempt, error),
        }
    }

    async fn send(&self, call: &ChainCall, gas_price_gwei: Option<u64>) -> Result<TxHash, ChainError> {
        let gas_limit = estimate_with_buffer(
            self.ctx.invoker.as_ref(),
            call,
            self.settings.gas_limit_buffer_percent,
        )
        .await?;
        let gwei = gas_price_gwei
            .unwrap_or_else(|| self.ctx.gas_prices.price_for(self.settings.gas_speed));
        let gas = GasSettings {
            gas_price: normalized_gas_price(gwei),
            gas_limit,
        };
        self.ctx.invoker.submit(call, gas).await
    }

    fn on_submitted(&self, attempt: u64, hash: TxHash, params: SubmitParams) -> SubmitOutcome {
        let mounted = {
            let mut inner = lock(&self.inner);
            if !inner.accepts(attempt) {
                tracing::debug!(action = self.action, %hash, "discarding result of a voided submission");
                return SubmitOutcome::Submitted(hash);
            }
            transition(&mut inner, self.action, TransactionState::Pending);
            inner.pending = Some(PendingTransaction {
                hash,
                amount: params.amount,
                currency: params.currency,
                created_at: self.ctx.clock.now(),
            });
            inner.last_hash = Some(hash);
            inner.error = None;
            inner.modal_open = false;
            inner.mounted
        };
        tracing::info!(action = self.action, %hash, mounted, "transaction broadcast");
        if let Some(metrics) = &self.metrics {
            metrics.submissions.with_label_values(&[self.action]).inc();
        }
        // An unmounted panel starts watching on its next mount.
        if mounted {
            self.watch(hash);
        }
        SubmitOutcome::Submitted(hash)
    }

    fn on_submit_failed(&self, attempt: u64, error: ChainError) -> SubmitOutcome {
        let message = error.to_string();
        {
            let mut inner = lock(&self.inner);
            if !inner.accepts(attempt) {
                return SubmitOutcome::Failed(message);
            }
            transition(&mut inner, self.action, TransactionState::Idle);
            inner.error = Some(message.clone());
        }
        tracing::warn!(action = self.action, error = %message, "submission failed");
        if let Some(metrics) = &self.metrics {
            metrics
                .submission_failures
                .with_label_values(&[self.action])
                .inc();
        }
        SubmitOutcome::Failed(message)
    }

    fn ignore(&self, reason: IgnoreReason) -> SubmitOutcome {
        tracing::debug!(action = self.action, ?reason, "submit ignored");
        if let Some(metrics) = &self.metrics {
            metrics.ignored_submits.with_label_values(&[self.action]).inc();
        }
        SubmitOutcome::Ignored(reason)
    }

    fn block(&self, failures: Vec<GuardFailure>) -> SubmitOutcome {
        let names: Vec<&str> = failures.iter().map(|f| f.name).collect();
        tracing::info!(action = self.action, guards = ?names, "submit blocked by guards");
        if let Some(metrics) = &self.metrics {
            metrics.guard_blocks.with_label_values(&[self.action]).inc();
        }
        SubmitOutcome::Blocked(failures)
    }

    /// Register `hash` with the monitor and keep the subscription while the
    /// panel still tracks it.
    fn watch(&self, hash: TxHash) {
        let subscription = self.ctx.monitor.watch(hash, self.settle_callback());
        let mut inner = lock(&self.inner);
        if inner.mounted && inner.is_tracking(hash) {
            inner.subscription = Some(subscription);
        } else {
            // Settled synchronously, or unmounted meanwhile.
            drop(inner);
            drop(subscription);
        }
    }

    fn settle_callback(&self) -> SettleCallback {
        let weak = Arc::downgrade(&self.inner);
        let action = self.action;
        let metrics = self.metrics.clone();
        Box::new(move |hash, outcome| {
            let Some(inner) = weak.upgrade() else {
                tracing::debug!(action, %hash, "panel dropped before settlement");
                return;
            };
            settle(&inner, action, metrics.as_deref(), hash, outcome);
        })
    }

    /// Return a settled outcome (Success or Failed) to Idle.
    ///
    /// Returns `false` when there was nothing to dismiss.
    pub fn dismiss(&self) -> bool {
        let mut inner = lock(&self.inner);
        match inner.state {
            TransactionState::Success => {
                transition(&mut inner, self.action, TransactionState::Idle);
                true
            }
            TransactionState::Failed => {
                transition(&mut inner, self.action, TransactionState::Idle);
                inner.error = None;
                true
            }
            _ => false,
        }
    }

    /// Close the confirmation modal and forget the submission error.
    pub fn dismiss_modal(&self) {
        let mut inner = lock(&self.inner);
        inner.modal_open = false;
        if inner.state == TransactionState::Idle {
            inner.error = None;
        }
    }

    /// (Re)attach the panel to the screen.
    ///
    /// A pending transaction is watched again and a non-persistent Success
    /// resets to Idle. A submission still awaiting its signature is left to
    /// finish; it moves to Pending and is watched when the wallet answers.
    pub fn mount(&self) {
        let rewatch = {
            let mut inner = lock(&self.inner);
            if inner.mounted {
                return;
            }
            inner.mounted = true;
            match inner.state {
                TransactionState::Success if !self.settings.persistent_success => {
                    transition(&mut inner, self.action, TransactionState::Idle);
                    None
                }
                TransactionState::Pending => inner.pending.as_ref().map(|p| p.hash),
                _ => None,
            }
        };
        if let Some(hash) = rewatch {
            tracing::debug!(action = self.action, %hash, "re-watching pending transaction");
            self.watch(hash);
        }
    }

    /// Detach from the screen. The on-chain transaction keeps going; its
    /// outcome is no longer applied.
    pub fn unmount(&self) {
        let subscription = {
            let mut inner = lock(&self.inner);
            inner.mounted = false;
            inner.subscription.take()
        };
        tracing::debug!(action = self.action, "panel unmounted");
        drop(subscription);
    }

    pub fn view(&self) -> TxView {
        let inner = lock(&self.inner);
        let now = self.ctx.clock.now();
        let hash = match inner.state {
            TransactionState::Pending | TransactionState::Success | TransactionState::Failed => {
                inner.last_hash
            }
            _ => None,
        };
        TxView {
            action: self.action,
            state: inner.state,
            hash,
            explorer_link: hash.and_then(|h| self.ctx.explorer.as_ref().map(|e| e.tx_link(&h))),
            error: inner.error.clone(),
            pending: inner.pending.clone(),
            submitted_label: inner
                .pending
                .as_ref()
                .map(|p| format_elapsed(p.created_at.age_at(now).as_secs())),
            modal_open: inner.modal_open,
        }
    }
}

fn settle(
    inner: &Mutex<Inner>,
    action: &'static str,
    metrics: Option<&PanelMetrics>,
    hash: TxHash,
    outcome: TxOutcome,
) {
    let subscription = {
        let mut inner = lock(inner);
        if !inner.mounted || !inner.is_tracking(hash) {
            tracing::debug!(action, %hash, "ignoring settlement for untracked transaction");
            return;
        }
        inner.pending = None;
        match outcome {
            TxOutcome::Confirmed => {
                transition(&mut inner, action, TransactionState::Success);
                tracing::info!(action, %hash, "transaction confirmed");
                if let Some(metrics) = metrics {
                    metrics.confirmations.with_label_values(&[action]).inc();
                }
            }
            TxOutcome::Reverted { reason } => {
                transition(&mut inner, action, TransactionState::Failed);
                tracing::warn!(action, %hash, %reason, "transaction reverted");
                inner.error = Some(reason);
                if let Some(metrics) = metrics {
                    metrics.reverts.with_label_values(&[action]).inc();
                }
            }
        }
        inner.subscription.take()
    };
    drop(subscription);
}
