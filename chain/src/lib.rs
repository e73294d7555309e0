//! Chain collaborator seams for synthstake.
//!
//! Everything that touches the chain sits behind a trait here so panels can be
//! driven by real adapters in production and by nullables in tests:
//! - [`ChainActionInvoker`] — gas estimation and transaction submission
//! - [`TransactionMonitor`] — cancellable confirmation subscriptions
//! - [`RateProvider`], [`AddressProvider`], [`GasPriceProvider`] — read-only inputs
//! - [`Explorer`] — block explorer links
//! - [`RpcReceiptMonitor`] — a monitor that polls a JSON-RPC node for receipts

pub mod call;
pub mod context;
pub mod error;
pub mod explorer;
pub mod gas;
pub mod invoker;
pub mod monitor;
pub mod providers;
pub mod rpc_monitor;

pub use call::ChainCall;
pub use context::ChainContext;
pub use error::ChainError;
pub use explorer::Explorer;
pub use gas::{normalized_gas_price, GasLimit, GasPrices, GasSettings, GasSpeed};
pub use invoker::{estimate_with_buffer, ChainActionInvoker};
pub use monitor::{SettleCallback, Subscription, TransactionMonitor, TxOutcome, WatchRegistry};
pub use providers::{AddressProvider, GasPriceProvider, RateProvider};
pub use rpc_monitor::RpcReceiptMonitor;
