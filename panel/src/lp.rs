//! The LP rewards screen: approve, stake and unstake LP tokens, claim rewards.
//!
//! Each of the four actions is its own [`TransactionPanel`]. The approval
//! overlay is driven by the allowance: it opens whenever the allowance is
//! reported as zero, and whenever a guarded action asks for approval.

use rust_decimal::Decimal;
use serde::Serialize;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use synthstake_chain::{AddressProvider, ChainCall, ChainContext, RateProvider};
use synthstake_types::{CurrencyKey, TokenAmount, TransactionState, TypesError};

use crate::guard::{Guard, GuardFailure, Remediation};
use crate::metrics::PanelMetrics;
use crate::modal::{AmountLabel, ConfirmationModal};
use crate::transaction::{PanelSettings, SubmitOutcome, SubmitParams, TransactionPanel, TxView};

/// Balances and allowance for one pool, as last read from chain.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LpInputs {
    /// `None` until the allowance has been read.
    pub allowance: Option<TokenAmount>,
    /// LP tokens in the wallet.
    pub lp_balance: TokenAmount,
    /// LP tokens staked in the pool.
    pub staked_balance: TokenAmount,
    /// SNX rewards claimable.
    pub token_rewards: TokenAmount,
}

/// Rewards summary next to the stake tabs.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct RewardsBox {
    pub rewards: AmountLabel,
    /// Rewards valued at the current SNX rate; zero when no rate is known.
    pub usd_value: Decimal,
    pub gas_price_gwei: Option<u64>,
    pub claim_modal: Option<ConfirmationModal>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct LpTabs {
    pub pool: CurrencyKey,
    pub rewards: RewardsBox,
    pub stake: TxView,
    pub unstake: TxView,
    pub approve: TxView,
    pub approve_overlay: bool,
}

/// What the screen shows. A claim in flight or settled takes over the screen.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "view", rename_all = "snake_case")]
pub enum LpView {
    Waiting { claim: TxView, rewards: AmountLabel },
    ClaimSuccess { claim: TxView, rewards: AmountLabel },
    ClaimFailed { claim: TxView, rewards: AmountLabel },
    Tabs(LpTabs),
}

#[derive(Default)]
struct Overlay {
    shown: bool,
}

pub struct LpRewardsPanel {
    pool: CurrencyKey,
    claim: TransactionPanel,
    stake: TransactionPanel,
    unstake: TransactionPanel,
    approve: TransactionPanel,
    overlay: Mutex<Overlay>,
    claim_gas_price: Mutex<Option<u64>>,
}

fn invalid_amount(error: &TypesError) -> GuardFailure {
    GuardFailure {
        name: "amount_representable",
        remediation: Remediation::InvalidAmount {
            message: error.to_string(),
        },
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl LpRewardsPanel {
    pub fn new(pool: CurrencyKey, ctx: ChainContext, settings: PanelSettings) -> Self {
        Self {
            pool,
            claim: TransactionPanel::new("claim", ctx.clone(), settings),
            stake: TransactionPanel::new("stake", ctx.clone(), settings),
            unstake: TransactionPanel::new("unstake", ctx.clone(), settings),
            approve: TransactionPanel::new("approve", ctx, settings),
            overlay: Mutex::new(Overlay::default()),
            claim_gas_price: Mutex::new(None),
        }
    }

    pub fn with_metrics(mut self, metrics: Arc<PanelMetrics>) -> Self {
        self.claim = self.claim.with_metrics(metrics.clone());
        self.stake = self.stake.with_metrics(metrics.clone());
        self.unstake = self.unstake.with_metrics(metrics.clone());
        self.approve = self.approve.with_metrics(metrics);
        self
    }

    pub fn pool(&self) -> CurrencyKey {
        self.pool
    }

    pub fn claim_panel(&self) -> &TransactionPanel {
        &self.claim
    }

    pub fn stake_panel(&self) -> &TransactionPanel {
        &self.stake
    }

    pub fn unstake_panel(&self) -> &TransactionPanel {
        &self.unstake
    }

    pub fn approve_panel(&self) -> &TransactionPanel {
        &self.approve
    }

    fn ctx(&self) -> &ChainContext {
        self.claim.context()
    }

    /// Re-evaluate the overlay for a fresh allowance reading.
    pub fn on_allowance_changed(&self, allowance: Option<TokenAmount>) {
        let mut overlay = lock(&self.overlay);
        match allowance {
            Some(a) if a.is_zero() => overlay.shown = true,
            Some(_) => overlay.shown = false,
            None => {}
        }
    }

    pub fn approve_overlay_shown(&self) -> bool {
        lock(&self.overlay).shown
    }

    pub fn close_approve_overlay(&self) {
        lock(&self.overlay).shown = false;
    }

    fn open_overlay_if_needed(&self, outcome: &SubmitOutcome) {
        let needs_approval = outcome
            .blocked()
            .is_some_and(|f| f.iter().any(|f| f.remediation == Remediation::ApprovalRequired));
        if needs_approval {
            tracing::info!(pool = %self.pool, "approval required, showing overlay");
            lock(&self.overlay).shown = true;
        }
    }

    /// Grant the pool an unlimited allowance.
    pub async fn approve(&self) -> SubmitOutcome {
        let guards = [Guard::wallet_connected(self.ctx().address.address())];
        let pool = self.pool;
        self.approve
            .submit(&guards, || {
                Ok(SubmitParams::new(ChainCall::ApproveUnlimited { pool }))
            })
            .await
    }

    /// Gas price the user picked for claiming, in gwei.
    pub fn set_claim_gas_price(&self, gwei: u64) {
        *lock(&self.claim_gas_price) = Some(gwei);
    }

    pub async fn claim(&self, inputs: &LpInputs) -> SubmitOutcome {
        let guards = [
            Guard::wallet_connected(self.ctx().address.address()),
            Guard::allowance_granted(inputs.allowance),
            Guard::rewards_available(inputs.token_rewards),
        ];
        let pool = self.pool;
        let gas_price = *lock(&self.claim_gas_price);
        let outcome = self
            .claim
            .submit(&guards, || {
                Ok(SubmitParams::new(ChainCall::GetReward { pool })
                    .with_amount(inputs.token_rewards, CurrencyKey::Snx)
                    .with_gas_price(gas_price))
            })
            .await;
        self.open_overlay_if_needed(&outcome);
        outcome
    }

    /// Stake `input` LP tokens into the pool.
    pub async fn stake(&self, input: &str, inputs: &LpInputs) -> SubmitOutcome {
        let amount = TokenAmount::parse(input);
        let mut guards = vec![
            Guard::wallet_connected(self.ctx().address.address()),
            Guard::amount_positive(&amount),
        ];
        if let Ok(value) = &amount {
            guards.push(Guard::balance_covers(*value, inputs.lp_balance));
            guards.push(Guard::allowance_covers(inputs.allowance, *value));
        }
        let outcome = self
            .stake
            .submit(&guards, || self.transfer_params(&amount, true))
            .await;
        self.open_overlay_if_needed(&outcome);
        outcome
    }

    /// Withdraw `input` staked LP tokens.
    pub async fn unstake(&self, input: &str, inputs: &LpInputs) -> SubmitOutcome {
        let amount = TokenAmount::parse(input);
        let mut guards = vec![
            Guard::wallet_connected(self.ctx().address.address()),
            Guard::amount_positive(&amount),
        ];
        if let Ok(value) = &amount {
            guards.push(Guard::balance_covers(*value, inputs.staked_balance));
        }
        self.unstake
            .submit(&guards, || self.transfer_params(&amount, false))
            .await
    }

    fn transfer_params(
        &self,
        amount: &Result<TokenAmount, TypesError>,
        stake: bool,
    ) -> Result<SubmitParams, GuardFailure> {
        let value = amount.clone().map_err(|e| invalid_amount(&e))?;
        let wei = value.to_wei().map_err(|e| invalid_amount(&e))?;
        let pool = self.pool;
        let call = if stake {
            ChainCall::Stake { pool, amount: wei }
        } else {
            ChainCall::Withdraw { pool, amount: wei }
        };
        Ok(SubmitParams::new(call).with_amount(value, pool))
    }

    /// Leave the claim success (or failure) view.
    pub fn dismiss_claim(&self) -> bool {
        self.claim.dismiss()
    }

    pub fn dismiss_claim_modal(&self) {
        self.claim.dismiss_modal();
    }

    pub fn mount(&self) {
        for panel in self.panels() {
            panel.mount();
        }
    }

    pub fn unmount(&self) {
        for panel in self.panels() {
            panel.unmount();
        }
    }

    fn panels(&self) -> [&TransactionPanel; 4] {
        [&self.claim, &self.stake, &self.unstake, &self.approve]
    }

    pub fn view(&self, inputs: &LpInputs) -> LpView {
        let claim = self.claim.view();
        let rewards = AmountLabel::new(inputs.token_rewards, CurrencyKey::Snx);
        match claim.state {
            TransactionState::Pending => return LpView::Waiting { claim, rewards },
            TransactionState::Success => return LpView::ClaimSuccess { claim, rewards },
            TransactionState::Failed => return LpView::ClaimFailed { claim, rewards },
            TransactionState::Idle | TransactionState::AwaitingSignature => {}
        }

        let snx_rate = self.ctx().rates.rate_or_zero(CurrencyKey::Snx);
        let usd_value = inputs
            .token_rewards
            .checked_mul(snx_rate)
            .map(|v| v.as_decimal())
            .unwrap_or(Decimal::ZERO);
        let approve = self.approve.view();
        let approve_overlay =
            self.approve_overlay_shown() && approve.state != TransactionState::Success;

        LpView::Tabs(LpTabs {
            pool: self.pool,
            rewards: RewardsBox {
                rewards,
                usd_value,
                gas_price_gwei: *lock(&self.claim_gas_price),
                claim_modal: ConfirmationModal::from_view(&claim, None),
            },
            stake: self.stake.view(),
            unstake: self.unstake.view(),
            approve,
            approve_overlay,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use synthstake_chain::GasPrices;
    use synthstake_nullables::{NullAddress, NullChain, NullGasPrices, NullMonitor, NullRates};
    use synthstake_types::{Address, Wei};

    struct Harness {
        chain: Arc<NullChain>,
        monitor: Arc<NullMonitor>,
        rates: Arc<NullRates>,
        panel: LpRewardsPanel,
    }

    fn harness() -> Harness {
        let chain = Arc::new(NullChain::new());
        let monitor = Arc::new(NullMonitor::new());
        let rates = Arc::new(NullRates::new().with_rate(CurrencyKey::Snx, dec!(2.5)));
        let ctx = ChainContext::new(
            chain.clone(),
            monitor.clone(),
            rates.clone(),
            Arc::new(NullAddress::connected(Address::new([9; 20]))),
            Arc::new(NullGasPrices::new(GasPrices {
                slow: 1,
                average: 2,
                fast: 3,
            })),
        );
        Harness {
            chain,
            monitor,
            rates,
            panel: LpRewardsPanel::new(CurrencyKey::IEth, ctx, PanelSettings::default()),
        }
    }

    fn inputs() -> LpInputs {
        LpInputs {
            allowance: Some(TokenAmount::new(dec!(1000))),
            lp_balance: TokenAmount::new(dec!(100)),
            staked_balance: TokenAmount::new(dec!(40)),
            token_rewards: TokenAmount::new(dec!(12)),
        }
    }

    #[test]
    fn zero_allowance_opens_overlay_until_closed() {
        let h = harness();
        assert!(!h.panel.approve_overlay_shown());
        h.panel.on_allowance_changed(Some(TokenAmount::ZERO));
        assert!(h.panel.approve_overlay_shown());
        h.panel.close_approve_overlay();
        assert!(!h.panel.approve_overlay_shown());
        h.panel.on_allowance_changed(Some(TokenAmount::ZERO));
        assert!(h.panel.approve_overlay_shown());
        h.panel.on_allowance_changed(Some(TokenAmount::new(dec!(5))));
        assert!(!h.panel.approve_overlay_shown());
    }

    #[tokio::test]
    async fn approve_requests_unlimited_allowance() {
        let h = harness();
        assert!(h.panel.approve().await.is_submitted());
        assert_eq!(
            h.chain.submitted(),
            vec![ChainCall::ApproveUnlimited {
                pool: CurrencyKey::IEth
            }]
        );
    }

    #[tokio::test]
    async fn claim_uses_selected_gas_price() {
        let h = harness();
        h.panel.set_claim_gas_price(17);
        assert!(h.panel.claim(&inputs()).await.is_submitted());
        assert_eq!(h.chain.last_gas().unwrap().gas_price, Wei::from_gwei(17));
        assert!(matches!(h.panel.view(&inputs()), LpView::Waiting { .. }));
    }

    #[tokio::test]
    async fn claim_success_view_until_dismissed() {
        let h = harness();
        h.panel.claim(&inputs()).await;
        h.monitor.confirm(NullChain::hash_for(0));
        assert!(matches!(h.panel.view(&inputs()), LpView::ClaimSuccess { .. }));
        assert!(h.panel.dismiss_claim());
        assert!(matches!(h.panel.view(&inputs()), LpView::Tabs(_)));
    }

    #[tokio::test]
    async fn nothing_to_claim_is_blocked_without_overlay() {
        let h = harness();
        let outcome = h
            .panel
            .claim(&LpInputs {
                token_rewards: TokenAmount::ZERO,
                ..inputs()
            })
            .await;
        assert_eq!(
            outcome.blocked().unwrap()[0].remediation,
            Remediation::NothingToClaim
        );
        assert!(!h.panel.approve_overlay_shown());
    }

    #[tokio::test]
    async fn claim_before_allowance_loads_keeps_overlay_closed() {
        let h = harness();
        let loading = LpInputs {
            allowance: None,
            ..inputs()
        };
        h.panel.on_allowance_changed(loading.allowance);
        let outcome = h.panel.claim(&loading).await;
        assert_eq!(
            outcome.blocked().unwrap()[0].remediation,
            Remediation::AllowanceUnknown
        );
        assert!(!h.panel.approve_overlay_shown());
        assert!(h.chain.estimated().is_empty());
    }

    #[tokio::test]
    async fn stake_beyond_allowance_asks_for_approval() {
        let h = harness();
        let outcome = h
            .panel
            .stake(
                "50",
                &LpInputs {
                    allowance: Some(TokenAmount::new(dec!(10))),
                    ..inputs()
                },
            )
            .await;
        assert!(outcome.blocked().is_some());
        assert!(h.panel.approve_overlay_shown());
        assert!(h.chain.submitted().is_empty());
    }

    #[tokio::test]
    async fn stake_and_unstake_send_pool_calls() {
        let h = harness();
        h.panel.stake("2.5", &inputs()).await;
        h.panel.unstake("40", &inputs()).await;
        assert_eq!(
            h.chain.submitted(),
            vec![
                ChainCall::Stake {
                    pool: CurrencyKey::IEth,
                    amount: Wei::new(2_500_000_000_000_000_000)
                },
                ChainCall::Withdraw {
                    pool: CurrencyKey::IEth,
                    amount: Wei::new(40_000_000_000_000_000_000)
                },
            ]
        );
    }

    #[tokio::test]
    async fn unstake_more_than_staked_is_blocked() {
        let h = harness();
        let outcome = h.panel.unstake("41", &inputs()).await;
        assert_eq!(outcome.blocked().unwrap()[0].name, "balance_covers");
    }

    #[tokio::test]
    async fn too_precise_stake_is_blocked_before_signing() {
        let h = harness();
        let outcome = h.panel.stake("0.0000000000000000001", &inputs()).await;
        assert_eq!(outcome.blocked().unwrap()[0].name, "amount_representable");
        assert_eq!(h.panel.stake_panel().current_state(), TransactionState::Idle);
    }

    #[test]
    fn rewards_are_valued_at_snx_rate() {
        let h = harness();
        match h.panel.view(&inputs()) {
            LpView::Tabs(tabs) => assert_eq!(tabs.rewards.usd_value, dec!(30)),
            other => panic!("unexpected view {other:?}"),
        }
        h.rates.clear(CurrencyKey::Snx);
        match h.panel.view(&inputs()) {
            LpView::Tabs(tabs) => assert_eq!(tabs.rewards.usd_value, Decimal::ZERO),
            other => panic!("unexpected view {other:?}"),
        }
    }
}
