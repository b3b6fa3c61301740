//! Shipping

use rusty_money::{
    Money,
    iso::{BRL, Currency},
};
use thiserror::Error;

use crate::money::Price;

/// Errors raised while building a shipping policy.
#[derive(Debug, Error, PartialEq)]
pub enum ShippingPolicyError {
    /// Threshold and fee are in different currencies.
    #[error("free-shipping threshold is in {0}, but the flat fee is in {1}")]
    CurrencyMismatch(&'static str, &'static str),

    /// A negative threshold or fee.
    #[error("shipping amounts cannot be negative")]
    NegativeAmount,
}

/// Flat-rate shipping that becomes free above a subtotal threshold.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShippingPolicy {
    free_shipping_threshold: Price,
    flat_fee: Price,
}

impl ShippingPolicy {
    /// Create a shipping policy.
    ///
    /// # Errors
    ///
    /// Returns an error if the amounts are negative or in different currencies.
    pub fn new(free_shipping_threshold: Price, flat_fee: Price) -> Result<Self, ShippingPolicyError> {
        let threshold_currency = free_shipping_threshold.currency();
        let fee_currency = flat_fee.currency();

        if threshold_currency != fee_currency {
            return Err(ShippingPolicyError::CurrencyMismatch(
                threshold_currency.iso_alpha_code,
                fee_currency.iso_alpha_code,
            ));
        }

        if free_shipping_threshold.to_minor_units() < 0 || flat_fee.to_minor_units() < 0 {
            return Err(ShippingPolicyError::NegativeAmount);
        }

        Ok(Self {
            free_shipping_threshold,
            flat_fee,
        })
    }

    /// Subtotals strictly above this ship for free.
    pub fn free_shipping_threshold(&self) -> Price {
        self.free_shipping_threshold
    }

    /// Fee charged at or below the threshold.
    pub fn flat_fee(&self) -> Price {
        self.flat_fee
    }

    /// Currency of the policy amounts.
    pub fn currency(&self) -> &'static Currency {
        self.flat_fee.currency()
    }

    /// Shipping charged on a cart's subtotal.
    pub fn shipping_for(&self, subtotal: Price) -> Price {
        Money::from_minor(self.shipping_minor(subtotal.to_minor_units()), self.currency())
    }

    /// Shipping charged on a subtotal, in minor units.
    pub fn shipping_minor(&self, subtotal_minor: i64) -> i64 {
        if subtotal_minor > self.free_shipping_threshold.to_minor_units() {
            0
        } else {
            self.flat_fee.to_minor_units()
        }
    }

    /// Amount still needed to qualify for free shipping, in minor units.
    pub fn remaining_for_free_shipping_minor(&self, subtotal_minor: i64) -> i64 {
        // "strictly above" means one more minor unit than the threshold
        self.free_shipping_threshold
            .to_minor_units()
            .saturating_add(1)
            .saturating_sub(subtotal_minor)
            .max(0)
    }
}

impl Default for ShippingPolicy {
    /// R$10.00 flat, free above R$100.00.
    fn default() -> Self {
        Self {
            free_shipping_threshold: Money::from_minor(100_00, BRL),
            flat_fee: Money::from_minor(10_00, BRL),
        }
    }
}
