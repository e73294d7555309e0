//! Read-only inputs the panels consume: exchange rates, wallet address, gas prices.

use rust_decimal::Decimal;
use synthstake_types::{Address, CurrencyKey};

use crate::gas::{GasPrices, GasSpeed};

/// Current exchange rates (USD per unit).
pub trait RateProvider: Send + Sync {
    fn rate(&self, currency: CurrencyKey) -> Option<Decimal>;

    /// The rate, or zero while it is unavailable.
    fn rate_or_zero(&self, currency: CurrencyKey) -> Decimal {
        self.rate(currency).unwrap_or(Decimal::ZERO)
    }
}

/// The connected wallet.
pub trait AddressProvider: Send + Sync {
    /// `None` while no wallet is connected.
    fn address(&self) -> Option<Address>;
}

/// Current network gas prices.
pub trait GasPriceProvider: Send + Sync {
    fn gas_prices(&self) -> Option<GasPrices>;

    /// Gas price in gwei for `speed`, or zero while prices are unavailable.
    fn price_for(&self, speed: GasSpeed) -> u64 {
        self.gas_prices()
            .map(|prices| prices.for_speed(speed))
            .unwrap_or(0)
    }
}
