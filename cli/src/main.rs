//! synthstake — drive the staking panels from the command line.
//!
//! `mint`, `burn` and `claim` run against a simulated chain that signs
//! immediately and settles after a configurable delay. `watch` polls a real
//! node for a receipt.

use anyhow::Context;
use clap::Parser;
use rust_decimal::Decimal;
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use synthstake_chain::{
    ChainContext, ChainError, Explorer, GasPrices, GasSpeed, RpcReceiptMonitor,
    TransactionMonitor, TxOutcome,
};
use synthstake_nullables::{NullAddress, NullChain, NullGasPrices, NullMonitor, NullRates};
use synthstake_panel::{
    BurnInputs, LpInputs, LpRewardsPanel, MintBurnPanel, MintInputs, PanelConfig, PanelMetrics,
    PanelSettings, SubmitOutcome, TransactionPanel,
};
use synthstake_types::{Address, CurrencyKey, NetworkId, TokenAmount, TxHash};
use synthstake_utils::LogFormat;

#[derive(Parser)]
#[command(name = "synthstake", about = "Staking panels for synthetic-asset DeFi")]
struct Cli {
    /// Network: "mainnet", "ropsten", "rinkeby", "goerli" or "kovan".
    #[arg(long, env = "SYNTHSTAKE_NETWORK")]
    network: Option<NetworkId>,

    /// Gas price tier: "slow", "average" or "fast".
    #[arg(long, env = "SYNTHSTAKE_GAS_SPEED")]
    gas_speed: Option<GasSpeed>,

    /// JSON-RPC endpoint used by `watch`.
    #[arg(long, env = "SYNTHSTAKE_RPC_URL")]
    rpc_url: Option<String>,

    /// Log level: "trace", "debug", "info", "warn", "error".
    #[arg(long, env = "SYNTHSTAKE_LOG_LEVEL")]
    log_level: Option<String>,

    /// Log format: "human" or "json".
    #[arg(long, env = "SYNTHSTAKE_LOG_FORMAT")]
    log_format: Option<LogFormat>,

    /// Path to a TOML configuration file. CLI flags and env vars override it.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Print Prometheus metrics after the command.
    #[arg(long)]
    metrics: bool,

    #[command(subcommand)]
    command: Command,
}

/// Knobs of the simulated chain.
#[derive(clap::Args)]
struct SimArgs {
    /// SNX price in USD.
    #[arg(long, default_value = "2")]
    snx_price: Decimal,

    /// Delay before the simulated monitor settles the transaction.
    #[arg(long, default_value_t = 500)]
    settle_after_ms: u64,

    /// Revert the transaction on chain with this reason.
    #[arg(long)]
    revert: Option<String>,

    /// Reject the signature request with this message.
    #[arg(long)]
    reject: Option<String>,

    /// Run without a connected wallet.
    #[arg(long)]
    disconnected: bool,
}

#[derive(clap::Subcommand)]
enum Command {
    /// Stake SNX and mint sUSD.
    Mint {
        /// SNX to stake.
        amount: String,
        /// Unstaked SNX available.
        #[arg(long, default_value = "1000")]
        max_collateral: TokenAmount,
        /// Issuance ratio.
        #[arg(long, default_value = "0.25")]
        target_ratio: Decimal,
        #[command(flatten)]
        sim: SimArgs,
    },
    /// Burn sUSD to unlock SNX.
    Burn {
        /// sUSD to burn. Ignored with --to-target.
        amount: Option<String>,
        /// Burn back to the target ratio.
        #[arg(long)]
        to_target: bool,
        /// sUSD debt that can be burned.
        #[arg(long, default_value = "500")]
        max_burn: TokenAmount,
        #[arg(long, default_value = "0.25")]
        target_ratio: Decimal,
        /// Pretend an exchange into sUSD is still settling.
        #[arg(long)]
        waiting_period: bool,
        /// Pretend the minimum stake time has not elapsed.
        #[arg(long)]
        cannot_burn: bool,
        #[command(flatten)]
        sim: SimArgs,
    },
    /// Claim LP rewards.
    Claim {
        /// Pool, by synth: "sETH", "iETH", "sBTC", ...
        #[arg(long, default_value = "iETH")]
        pool: CurrencyKey,
        /// SNX rewards claimable.
        #[arg(long, default_value = "10")]
        rewards: TokenAmount,
        /// Current LP allowance; 0 shows the approval overlay.
        #[arg(long, default_value = "1000")]
        allowance: TokenAmount,
        /// Gas price in gwei; defaults to the configured gas speed.
        #[arg(long)]
        gas_price: Option<u64>,
        #[command(flatten)]
        sim: SimArgs,
    },
    /// Wait for a transaction receipt on a real node.
    Watch {
        /// Transaction hash (0x-prefixed hex).
        hash: TxHash,
    },
    /// Print the effective configuration as TOML.
    Config,
}

/// Collaborators of a simulated session.
struct Simulation {
    chain: Arc<NullChain>,
    monitor: Arc<NullMonitor>,
    ctx: ChainContext,
    settle_after: Duration,
    revert: Option<String>,
}

impl Simulation {
    fn new(config: &PanelConfig, sim: &SimArgs) -> Self {
        let chain = Arc::new(NullChain::new());
        if let Some(message) = &sim.reject {
            chain.fail_next_submit(ChainError::UserRejected(message.clone()));
        }
        let monitor = Arc::new(NullMonitor::new());
        let address = if sim.disconnected {
            NullAddress::disconnected()
        } else {
            NullAddress::connected(Address::new([0x5a; 20]))
        };
        let ctx = ChainContext::new(
            chain.clone(),
            monitor.clone(),
            Arc::new(NullRates::new().with_rate(CurrencyKey::Snx, sim.snx_price)),
            Arc::new(address),
            Arc::new(NullGasPrices::new(GasPrices {
                slow: 5,
                average: 20,
                fast: 60,
            })),
        )
        .with_explorer(Explorer::new(config.network));
        Self {
            chain,
            monitor,
            ctx,
            settle_after: Duration::from_millis(sim.settle_after_ms),
            revert: sim.revert.clone(),
        }
    }

    /// Settle `outcome`'s transaction later and wait until `panel` has seen it.
    async fn settle(&self, outcome: &SubmitOutcome, panel: &TransactionPanel) {
        let SubmitOutcome::Submitted(hash) = outcome else {
            return;
        };
        let hash = *hash;
        let monitor = Arc::clone(&self.monitor);
        let delay = self.settle_after;
        let revert = self.revert.clone();
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            match revert {
                Some(reason) => monitor.revert(hash, reason),
                None => monitor.confirm(hash),
            };
        });
        while !panel.current_state().is_settled() {
            tokio::time::sleep(Duration::from_millis(25)).await;
        }
        tracing::debug!(submitted = self.chain.submitted().len(), "simulation settled");
    }
}

fn print_json(label: &str, value: &impl Serialize) -> anyhow::Result<()> {
    println!("── {label}");
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn print_outcome(outcome: &SubmitOutcome) {
    match outcome {
        SubmitOutcome::Submitted(hash) => println!("submitted {hash}"),
        SubmitOutcome::Blocked(failures) => {
            for failure in failures {
                println!("blocked by {}: {}", failure.name, failure.remediation.message());
            }
        }
        SubmitOutcome::Failed(message) => println!("failed: {message}"),
        SubmitOutcome::Ignored(reason) => println!("ignored: {reason:?}"),
    }
}

fn load_config(cli: &Cli) -> anyhow::Result<PanelConfig> {
    let mut config = match &cli.config {
        Some(path) => PanelConfig::from_toml_file(path)
            .with_context(|| format!("loading config from {}", path.display()))?,
        None => PanelConfig::default(),
    };
    if let Some(network) = cli.network {
        config.network = network;
    }
    if let Some(speed) = cli.gas_speed {
        config.gas_speed = speed;
    }
    if let Some(url) = &cli.rpc_url {
        config.rpc_url = Some(url.clone());
    }
    if let Some(level) = &cli.log_level {
        config.log_level = level.clone();
    }
    if let Some(format) = cli.log_format {
        config.log_format = format;
    }
    Ok(config)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = load_config(&cli)?;
    synthstake_utils::init_logging(config.log_format, &config.log_level);
    if let Some(path) = &cli.config {
        tracing::info!("Loaded config from {}", path.display());
    }

    let settings = PanelSettings::from(&config);
    let metrics = Arc::new(PanelMetrics::new());

    match cli.command {
        Command::Mint {
            amount,
            max_collateral,
            target_ratio,
            sim,
        } => {
            let sim = Simulation::new(&config, &sim);
            let panel =
                MintBurnPanel::new(sim.ctx.clone(), settings).with_metrics(metrics.clone());
            let inputs = MintInputs {
                target_ratio,
                max_collateral,
            };
            let outcome = panel.mint(&amount, &inputs).await;
            print_outcome(&outcome);
            print_json("submitted", &panel.view())?;
            sim.settle(&outcome, panel.mint_panel()).await;
            print_json("settled", &panel.view())?;
        }
        Command::Burn {
            amount,
            to_target,
            max_burn,
            target_ratio,
            waiting_period,
            cannot_burn,
            sim,
        } => {
            let sim = Simulation::new(&config, &sim);
            let panel =
                MintBurnPanel::new(sim.ctx.clone(), settings).with_metrics(metrics.clone());
            let inputs = BurnInputs {
                target_ratio,
                max_burn_amount: max_burn,
                waiting_period_active: waiting_period,
                can_burn: !cannot_burn,
                burn_to_target: to_target,
            };
            let outcome = panel.burn(amount.as_deref().unwrap_or(""), &inputs).await;
            print_outcome(&outcome);
            print_json("submitted", &panel.view())?;
            sim.settle(&outcome, panel.burn_panel()).await;
            print_json("settled", &panel.view())?;
        }
        Command::Claim {
            pool,
            rewards,
            allowance,
            gas_price,
            sim,
        } => {
            let sim = Simulation::new(&config, &sim);
            let panel =
                LpRewardsPanel::new(pool, sim.ctx.clone(), settings).with_metrics(metrics.clone());
            let inputs = LpInputs {
                allowance: Some(allowance),
                lp_balance: TokenAmount::ZERO,
                staked_balance: TokenAmount::ZERO,
                token_rewards: rewards,
            };
            panel.on_allowance_changed(inputs.allowance);
            if let Some(gwei) = gas_price {
                panel.set_claim_gas_price(gwei);
            }
            let outcome = panel.claim(&inputs).await;
            print_outcome(&outcome);
            print_json("submitted", &panel.view(&inputs))?;
            sim.settle(&outcome, panel.claim_panel()).await;
            print_json("settled", &panel.view(&inputs))?;
        }
        Command::Watch { hash } => {
            let url = config
                .rpc_url
                .clone()
                .context("watch needs --rpc-url or rpc_url in the config file")?;
            let monitor = RpcReceiptMonitor::new(url, config.receipt_poll_interval())?;
            let (tx, rx) = tokio::sync::oneshot::channel::<TxOutcome>();
            let _subscription = monitor.watch(
                hash,
                Box::new(move |_, outcome| {
                    let _ = tx.send(outcome);
                }),
            );
            tracing::info!(%hash, node = monitor.node_url(), "waiting for receipt");
            match rx.await? {
                TxOutcome::Confirmed => println!("{hash} confirmed"),
                TxOutcome::Reverted { reason } => println!("{hash} reverted: {reason}"),
            }
            println!("{}", Explorer::new(config.network).tx_link(&hash));
        }
        Command::Config => {
            print!("{}", config.to_toml_string()?);
        }
    }

    if cli.metrics {
        print!("{}", metrics.encode());
    }
    Ok(())
}
