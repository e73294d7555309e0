//! Fundamental types for synthstake.
//!
//! This crate defines the types shared across every other crate in the workspace:
//! token amounts, transaction hashes, addresses, currency keys, networks,
//! timestamps and the transaction lifecycle state enum.

pub mod address;
pub mod amount;
pub mod currency;
pub mod error;
pub mod hash;
pub mod network;
pub mod state;
pub mod time;

pub use address::Address;
pub use amount::{TokenAmount, Wei};
pub use currency::CurrencyKey;
pub use error::TypesError;
pub use hash::TxHash;
pub use network::NetworkId;
pub use state::TransactionState;
pub use time::{Clock, SystemClock, Timestamp};
