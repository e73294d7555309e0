//! Nullable read-only providers: rates, wallet address, gas prices.

use rust_decimal::Decimal;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};
use synthstake_chain::{AddressProvider, GasPriceProvider, GasPrices, RateProvider};
use synthstake_types::{Address, CurrencyKey};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Exchange rates set by the test. Unknown currencies have no rate.
#[derive(Default)]
pub struct NullRates {
    rates: Mutex<HashMap<CurrencyKey, Decimal>>,
}

impl NullRates {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_rate(self, currency: CurrencyKey, rate: Decimal) -> Self {
        self.set(currency, rate);
        self
    }

    pub fn set(&self, currency: CurrencyKey, rate: Decimal) {
        lock(&self.rates).insert(currency, rate);
    }

    pub fn clear(&self, currency: CurrencyKey) {
        lock(&self.rates).remove(&currency);
    }
}

impl RateProvider for NullRates {
    fn rate(&self, currency: CurrencyKey) -> Option<Decimal> {
        lock(&self.rates).get(&currency).copied()
    }
}

/// A wallet that can be connected and disconnected at will.
#[derive(Default)]
pub struct NullAddress {
    address: Mutex<Option<Address>>,
}

impl NullAddress {
    pub fn connected(address: Address) -> Self {
        Self {
            address: Mutex::new(Some(address)),
        }
    }

    pub fn disconnected() -> Self {
        Self::default()
    }

    pub fn connect(&self, address: Address) {
        *lock(&self.address) = Some(address);
    }

    pub fn disconnect(&self) {
        *lock(&self.address) = None;
    }
}

impl AddressProvider for NullAddress {
    fn address(&self) -> Option<Address> {
        *lock(&self.address)
    }
}

/// Gas prices set by the test.
#[derive(Default)]
pub struct NullGasPrices {
    prices: Mutex<Option<GasPrices>>,
}

impl NullGasPrices {
    pub fn new(prices: GasPrices) -> Self {
        Self {
            prices: Mutex::new(Some(prices)),
        }
    }

    pub fn unavailable() -> Self {
        Self::default()
    }

    pub fn set(&self, prices: GasPrices) {
        *lock(&self.prices) = Some(prices);
    }
}

impl GasPriceProvider for NullGasPrices {
    fn gas_prices(&self) -> Option<GasPrices> {
        *lock(&self.prices)
    }
}
