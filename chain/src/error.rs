use thiserror::Error;

/// Failures reported by chain collaborators.
///
/// The `Display` text is what panels surface to the user, so variants carry
/// the underlying human-readable message verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChainError {
    #[error("{0}")]
    UserRejected(String),

    #[error("{0}")]
    Rejected(String),

    #[error("gas estimation failed: {0}")]
    GasEstimation(String),

    #[error("node RPC error: {0}")]
    Rpc(String),

    #[error("invalid node response: {0}")]
    InvalidResponse(String),

    #[error("no tokio runtime available")]
    NoRuntime,

    #[error("invalid configuration: {0}")]
    Config(String),
}
