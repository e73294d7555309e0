//! Nullable infrastructure for deterministic testing.
//!
//! All chain collaborators are abstracted behind traits in `synthstake-chain`.
//! This crate provides test-friendly implementations that:
//! - Return deterministic values
//! - Can be controlled programmatically
//! - Never touch the network
//!
//! Usage: swap real implementations for nullables in tests and simulations.

pub mod chain;
pub mod clock;
pub mod monitor;
pub mod providers;

pub use chain::NullChain;
pub use clock::NullClock;
pub use monitor::NullMonitor;
pub use providers::{NullAddress, NullGasPrices, NullRates};
