//! The staking screen: mint sUSD against SNX, burn sUSD to unlock SNX.

use rust_decimal::Decimal;
use serde::Serialize;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use synthstake_chain::{AddressProvider, ChainContext, RateProvider};
use synthstake_types::{CurrencyKey, TokenAmount, TypesError};

use crate::amount::{AmountResolver, MintParameter};
use crate::guard::{Guard, GuardFailure, Remediation};
use crate::metrics::PanelMetrics;
use crate::modal::{AmountLabel, ConfirmationModal, Quote};
use crate::transaction::{PanelSettings, SubmitOutcome, SubmitParams, TransactionPanel, TxView};

/// On-chain figures the mint action reads.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MintInputs {
    /// Issuance ratio, e.g. 0.25.
    pub target_ratio: Decimal,
    /// Unstaked SNX available as collateral.
    pub max_collateral: TokenAmount,
}

/// On-chain figures and issuer flags the burn action reads.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BurnInputs {
    pub target_ratio: Decimal,
    /// sUSD debt that can be burned.
    pub max_burn_amount: TokenAmount,
    /// An exchange into sUSD is still settling.
    pub waiting_period_active: bool,
    /// The issuer allows this account to burn (minimum stake time elapsed).
    pub can_burn: bool,
    /// Burn back to the target ratio instead of an explicit amount.
    pub burn_to_target: bool,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct MintBurnView {
    pub mint: TxView,
    pub burn: TxView,
    pub mint_modal: Option<ConfirmationModal>,
    pub burn_modal: Option<ConfirmationModal>,
}

#[derive(Default)]
struct Quotes {
    mint: Option<Quote>,
    burn: Option<Quote>,
}

fn invalid_amount(message: impl Into<String>) -> GuardFailure {
    GuardFailure {
        name: "amount_representable",
        remediation: Remediation::InvalidAmount {
            message: message.into(),
        },
    }
}

fn parsed(amount: &Result<TokenAmount, TypesError>) -> Result<TokenAmount, GuardFailure> {
    amount.clone().map_err(|e| invalid_amount(e.to_string()))
}

/// Two independent actions sharing read-only inputs.
pub struct MintBurnPanel {
    mint: TransactionPanel,
    burn: TransactionPanel,
    resolver: AmountResolver,
    quotes: Mutex<Quotes>,
}

impl MintBurnPanel {
    pub fn new(ctx: ChainContext, settings: PanelSettings) -> Self {
        Self {
            mint: TransactionPanel::new("mint", ctx.clone(), settings),
            burn: TransactionPanel::new("burn", ctx, settings),
            resolver: AmountResolver::new(),
            quotes: Mutex::new(Quotes::default()),
        }
    }

    pub fn with_metrics(mut self, metrics: Arc<PanelMetrics>) -> Self {
        self.mint = self.mint.with_metrics(metrics.clone());
        self.burn = self.burn.with_metrics(metrics);
        self
    }

    pub fn mint_panel(&self) -> &TransactionPanel {
        &self.mint
    }

    pub fn burn_panel(&self) -> &TransactionPanel {
        &self.burn
    }

    fn quotes(&self) -> MutexGuard<'_, Quotes> {
        self.quotes.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn snx_price(&self) -> Decimal {
        self.mint.context().rates.rate_or_zero(CurrencyKey::Snx)
    }

    /// Stake `input` SNX and mint sUSD against it.
    ///
    /// Staking exactly the available collateral issues the maximum through
    /// the contract; anything else mints `stake × ratio × price` sUSD.
    pub async fn mint(&self, input: &str, inputs: &MintInputs) -> SubmitOutcome {
        let amount = TokenAmount::parse(input);
        let mut guards = vec![
            Guard::wallet_connected(self.mint.context().address.address()),
            Guard::amount_positive(&amount),
        ];
        if let Ok(stake) = &amount {
            guards.push(Guard::balance_covers(*stake, inputs.max_collateral));
        }
        let price = self.snx_price();

        self.mint
            .submit(&guards, || {
                let stake = parsed(&amount)?;
                let param = self
                    .resolver
                    .resolve_mint(stake, inputs.max_collateral, inputs.target_ratio, price)
                    .ok_or_else(|| invalid_amount("mint amount out of range"))?;
                let call = param.to_call().map_err(|e| invalid_amount(e.to_string()))?;
                let minted = match param {
                    MintParameter::Max => {
                        self.resolver
                            .mint_preview(inputs.max_collateral, inputs.target_ratio, price)
                    }
                    MintParameter::Exact { mint, .. } => mint,
                };
                self.quotes().mint = Some(Quote {
                    base: AmountLabel::new(stake, CurrencyKey::Snx),
                    quote: AmountLabel::new(minted, CurrencyKey::SUsd),
                });
                Ok(SubmitParams::new(call).with_amount(stake, CurrencyKey::Snx))
            })
            .await
    }

    /// Burn `input` sUSD, or burn to target when `inputs.burn_to_target`.
    pub async fn burn(&self, input: &str, inputs: &BurnInputs) -> SubmitOutcome {
        let mut guards = vec![
            Guard::wallet_connected(self.burn.context().address.address()),
            Guard::waiting_period_elapsed(inputs.waiting_period_active, CurrencyKey::SUsd),
        ];
        let amount = if inputs.burn_to_target {
            None
        } else {
            guards.push(Guard::burn_permitted(inputs.can_burn));
            let amount = TokenAmount::parse(input);
            guards.push(Guard::amount_positive(&amount));
            if let Ok(burn) = &amount {
                guards.push(Guard::balance_covers(*burn, inputs.max_burn_amount));
            }
            Some(amount)
        };
        let price = self.snx_price();

        self.burn
            .submit(&guards, || {
                let burn = match &amount {
                    Some(amount) => parsed(amount)?,
                    None => inputs.max_burn_amount,
                };
                let param = self.resolver.resolve_burn(burn, inputs.burn_to_target);
                let call = param.to_call().map_err(|e| invalid_amount(e.to_string()))?;
                let unlocked = self
                    .resolver
                    .unstake_preview(burn, inputs.target_ratio, price);
                self.quotes().burn = Some(Quote {
                    base: AmountLabel::new(burn, CurrencyKey::SUsd),
                    quote: AmountLabel::new(unlocked, CurrencyKey::Snx),
                });
                let params = SubmitParams::new(call);
                Ok(if amount.is_some() {
                    params.with_amount(burn, CurrencyKey::SUsd)
                } else {
                    params
                })
            })
            .await
    }

    pub fn dismiss_mint_modal(&self) {
        self.mint.dismiss_modal();
    }

    pub fn dismiss_burn_modal(&self) {
        self.burn.dismiss_modal();
    }

    pub fn mount(&self) {
        self.mint.mount();
        self.burn.mount();
    }

    pub fn unmount(&self) {
        self.mint.unmount();
        self.burn.unmount();
    }

    pub fn view(&self) -> MintBurnView {
        let mint = self.mint.view();
        let burn = self.burn.view();
        let quotes = self.quotes();
        MintBurnView {
            mint_modal: ConfirmationModal::from_view(&mint, quotes.mint),
            burn_modal: ConfirmationModal::from_view(&burn, quotes.burn),
            mint,
            burn,
        }
    }
}
