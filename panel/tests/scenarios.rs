//! End-to-end panel scenarios against the nullable chain.

use rust_decimal_macros::dec;
use std::sync::Arc;

use synthstake_chain::{ChainCall, ChainContext, ChainError, GasPrices};
use synthstake_nullables::{
    NullAddress, NullChain, NullClock, NullGasPrices, NullMonitor, NullRates,
};
use synthstake_panel::{
    Guard, IgnoreReason, LpInputs, LpRewardsPanel, LpView, MintBurnPanel, MintInputs,
    PanelSettings, SubmitOutcome, SubmitParams, TransactionPanel,
};
use synthstake_types::{Address, CurrencyKey, TokenAmount, TransactionState, Wei};

struct World {
    chain: Arc<NullChain>,
    monitor: Arc<NullMonitor>,
    ctx: ChainContext,
}

fn world() -> World {
    let chain = Arc::new(NullChain::new());
    let monitor = Arc::new(NullMonitor::new());
    let ctx = ChainContext::new(
        chain.clone(),
        monitor.clone(),
        Arc::new(NullRates::new().with_rate(CurrencyKey::Snx, dec!(2))),
        Arc::new(NullAddress::connected(Address::new([0x11; 20]))),
        Arc::new(NullGasPrices::new(GasPrices {
            slow: 1,
            average: 10,
            fast: 50,
        })),
    )
    .with_clock(Arc::new(NullClock::new(1_700_000_000)));
    World {
        chain,
        monitor,
        ctx,
    }
}

fn claim_call() -> Result<SubmitParams, synthstake_panel::GuardFailure> {
    Ok(SubmitParams::new(ChainCall::GetReward {
        pool: CurrencyKey::SEth,
    }))
}

#[tokio::test]
async fn staking_below_max_goes_through_formula_to_pending() {
    let w = world();
    w.chain.hold_submissions();
    let panel = MintBurnPanel::new(w.ctx.clone(), PanelSettings::default());
    let inputs = MintInputs {
        target_ratio: dec!(0.25),
        max_collateral: TokenAmount::new(dec!(1000)),
    };

    let mut seen = Vec::new();
    let (outcome, ()) = tokio::join!(panel.mint("400", &inputs), async {
        seen.push(panel.mint_panel().current_state());
        tokio::task::yield_now().await;
        seen.push(panel.mint_panel().current_state());
        w.chain.release();
    });

    assert_eq!(outcome, SubmitOutcome::Submitted(NullChain::hash_for(0)));
    assert_eq!(
        seen,
        vec![
            TransactionState::AwaitingSignature,
            TransactionState::AwaitingSignature
        ]
    );
    assert_eq!(panel.mint_panel().current_state(), TransactionState::Pending);
    assert_eq!(
        w.chain.submitted(),
        vec![ChainCall::IssueSynths {
            amount: Wei::new(200_000_000_000_000_000_000)
        }]
    );
}

#[tokio::test]
async fn claim_with_zero_allowance_shows_overlay_and_submits_nothing() {
    let w = world();
    let panel = LpRewardsPanel::new(CurrencyKey::SEth, w.ctx.clone(), PanelSettings::default());
    let inputs = LpInputs {
        allowance: Some(TokenAmount::ZERO),
        lp_balance: TokenAmount::new(dec!(10)),
        staked_balance: TokenAmount::new(dec!(10)),
        token_rewards: TokenAmount::new(dec!(3)),
    };
    panel.on_allowance_changed(inputs.allowance);

    let outcome = panel.claim(&inputs).await;

    assert!(outcome.blocked().is_some());
    assert!(w.chain.estimated().is_empty());
    assert!(w.chain.submitted().is_empty());
    assert_eq!(panel.claim_panel().current_state(), TransactionState::Idle);
    match panel.view(&inputs) {
        LpView::Tabs(tabs) => assert!(tabs.approve_overlay),
        other => panic!("expected tabs, got {other:?}"),
    }
}

#[tokio::test]
async fn second_submit_while_awaiting_signature_is_ignored() {
    let w = world();
    w.chain.hold_submissions();
    let panel = TransactionPanel::new("claim", w.ctx.clone(), PanelSettings::default());

    let (first, second, ()) = tokio::join!(
        panel.submit(&[], claim_call),
        panel.submit(&[], claim_call),
        async {
            tokio::task::yield_now().await;
            w.chain.release();
        }
    );

    assert!(first.is_submitted());
    assert_eq!(second, SubmitOutcome::Ignored(IgnoreReason::InFlight));
    assert_eq!(w.chain.submitted().len(), 1);
}

#[tokio::test]
async fn error_is_cleared_before_the_retry_outcome_is_known() {
    let w = world();
    let panel = TransactionPanel::new("claim", w.ctx.clone(), PanelSettings::default());
    w.chain
        .fail_next_submit(ChainError::UserRejected("User denied transaction signature".into()));

    assert!(matches!(
        panel.submit(&[], claim_call).await,
        SubmitOutcome::Failed(_)
    ));
    assert_eq!(panel.current_state(), TransactionState::Idle);
    assert!(panel.current_error().is_some());

    w.chain.hold_submissions();
    let mut during = None;
    let (retry, ()) = tokio::join!(panel.submit(&[], claim_call), async {
        during = Some((panel.current_state(), panel.current_error()));
        w.chain.release();
    });

    assert_eq!(during, Some((TransactionState::AwaitingSignature, None)));
    assert!(retry.is_submitted());
    assert_eq!(panel.current_error(), None);
}

#[tokio::test]
async fn no_transition_unless_every_guard_passes() {
    for mask in 0u8..8 {
        let w = world();
        let panel = TransactionPanel::new("claim", w.ctx.clone(), PanelSettings::default());
        let guards = [
            Guard::wallet_connected((mask & 1 != 0).then_some(Address::new([1; 20]))),
            Guard::allowance_granted((mask & 2 != 0).then_some(TokenAmount::new(dec!(1)))),
            Guard::rewards_available(if mask & 4 != 0 {
                TokenAmount::new(dec!(1))
            } else {
                TokenAmount::ZERO
            }),
        ];
        let outcome = panel.submit(&guards, claim_call).await;
        if mask == 7 {
            assert!(outcome.is_submitted());
            assert_eq!(panel.current_state(), TransactionState::Pending);
        } else {
            assert!(outcome.blocked().is_some(), "mask {mask}");
            assert_eq!(panel.current_state(), TransactionState::Idle);
            assert!(w.chain.estimated().is_empty());
        }
    }
}

#[tokio::test]
async fn confirmation_after_unmount_changes_nothing() {
    let w = world();
    let panel = TransactionPanel::new("claim", w.ctx.clone(), PanelSettings::default());
    panel.submit(&[], claim_call).await;
    let before = panel.view();

    panel.unmount();
    w.monitor.confirm(NullChain::hash_for(0));

    assert_eq!(panel.view(), before);
    assert_eq!(panel.current_state(), TransactionState::Pending);
}

#[tokio::test]
async fn reverted_transaction_fails_and_is_dismissed() {
    let w = world();
    let panel = TransactionPanel::new("claim", w.ctx.clone(), PanelSettings::default());
    panel.submit(&[], claim_call).await;

    w.monitor
        .revert(NullChain::hash_for(0), "execution reverted");

    assert_eq!(panel.current_state(), TransactionState::Failed);
    assert!(panel.pending().is_none());
    assert_eq!(panel.current_error().as_deref(), Some("execution reverted"));
    assert!(panel.dismiss());
    assert_eq!(panel.current_state(), TransactionState::Idle);
    assert!(panel.submit(&[], claim_call).await.is_submitted());
}

#[tokio::test]
async fn callback_for_another_hash_is_ignored() {
    let w = world();
    let first = TransactionPanel::new("stake", w.ctx.clone(), PanelSettings::default());
    let second = TransactionPanel::new("unstake", w.ctx.clone(), PanelSettings::default());
    first.submit(&[], claim_call).await;
    second.submit(&[], claim_call).await;

    w.monitor.confirm(NullChain::hash_for(1));

    assert_eq!(first.current_state(), TransactionState::Pending);
    assert_eq!(second.current_state(), TransactionState::Success);
}
