//! The bundle of injected collaborators a panel works against.

use std::sync::Arc;
use synthstake_types::{Clock, SystemClock};

use crate::explorer::Explorer;
use crate::invoker::ChainActionInvoker;
use crate::monitor::TransactionMonitor;
use crate::providers::{AddressProvider, GasPriceProvider, RateProvider};

/// Everything a panel needs from the outside world, passed in explicitly.
#[derive(Clone)]
pub struct ChainContext {
    pub invoker: Arc<dyn ChainActionInvoker>,
    pub monitor: Arc<dyn TransactionMonitor>,
    pub rates: Arc<dyn RateProvider>,
    pub address: Arc<dyn AddressProvider>,
    pub gas_prices: Arc<dyn GasPriceProvider>,
    pub clock: Arc<dyn Clock>,
    /// `None` when the network has no known explorer.
    pub explorer: Option<Explorer>,
}

impl ChainContext {
    pub fn new(
        invoker: Arc<dyn ChainActionInvoker>,
        monitor: Arc<dyn TransactionMonitor>,
        rates: Arc<dyn RateProvider>,
        address: Arc<dyn AddressProvider>,
        gas_prices: Arc<dyn GasPriceProvider>,
    ) -> Self {
        Self {
            invoker,
            monitor,
            rates,
            address,
            gas_prices,
            clock: Arc::new(SystemClock),
            explorer: None,
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_explorer(mut self, explorer: Explorer) -> Self {
        self.explorer = Some(explorer);
        self
    }
}
