//! Block explorer links.

use synthstake_types::{Address, NetworkId, TxHash};

/// Builds Etherscan links for a network.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Explorer {
    network: NetworkId,
}

impl Explorer {
    pub fn new(network: NetworkId) -> Self {
        Self { network }
    }

    pub fn network(&self) -> NetworkId {
        self.network
    }

    pub fn base_url(&self) -> String {
        match self.network {
            NetworkId::Mainnet => "https://etherscan.io".to_string(),
            other => format!("https://{}.etherscan.io", other.as_str()),
        }
    }

    pub fn tx_link(&self, hash: &TxHash) -> String {
        format!("{}/tx/{}", self.base_url(), hash)
    }

    pub fn address_link(&self, address: &Address) -> String {
        format!("{}/address/{}", self.base_url(), address)
    }
}
