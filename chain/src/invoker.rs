//! The chain action seam: estimate gas, then submit.

use async_trait::async_trait;
use synthstake_types::TxHash;

use crate::call::ChainCall;
use crate::error::ChainError;
use crate::gas::{GasLimit, GasSettings};

/// Performs contract calls on behalf of the connected wallet.
///
/// `submit` resolves once the wallet has signed and the node accepted the
/// transaction; it does not wait for confirmation.
#[async_trait]
pub trait ChainActionInvoker: Send + Sync {
    /// Estimate the gas a call would consume.
    async fn estimate_gas(&self, call: &ChainCall) -> Result<GasLimit, ChainError>;

    /// Sign and broadcast a call. Errors carry a human-readable message.
    async fn submit(&self, call: &ChainCall, gas: GasSettings) -> Result<TxHash, ChainError>;
}

/// Estimate gas for `call` and pad it by `buffer_percent`.
pub async fn estimate_with_buffer(
    invoker: &dyn ChainActionInvoker,
    call: &ChainCall,
    buffer_percent: u32,
) -> Result<GasLimit, ChainError> {
    let estimate = invoker.estimate_gas(call).await?;
    let padded = estimate.with_buffer(buffer_percent);
    tracing::debug!(
        method = call.method(),
        estimate = estimate.0,
        padded = padded.0,
        "estimated gas"
    );
    Ok(padded)
}
