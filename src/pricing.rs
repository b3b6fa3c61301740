//! Pricing rules
//!
//! Everything a cart needs to price itself besides its own lines: the shipping policy and the
//! coupon book, held together as a single configuration value.

use rusty_money::iso::Currency;
use thiserror::Error;

use crate::{
    coupons::{CouponBook, CouponBookError},
    discounts::DiscountError,
    shipping::ShippingPolicy,
};

/// Errors that can occur while pricing a cart.
#[derive(Debug, Error, PartialEq)]
pub enum PricingError {
    /// Minor-unit arithmetic overflowed.
    #[error("amount overflowed while pricing the cart")]
    Overflow,

    /// Wrapped discount calculation error.
    #[error(transparent)]
    Discount(#[from] DiscountError),
}

/// Shipping policy and coupon book for one storefront currency.
#[derive(Debug, Clone)]
pub struct PricingRules {
    /// Flat fee and free-shipping threshold
    pub shipping: ShippingPolicy,

    /// Valid coupons
    pub coupons: CouponBook,
}

impl PricingRules {
    /// Create pricing rules.
    pub fn new(shipping: ShippingPolicy, coupons: CouponBook) -> Self {
        Self { shipping, coupons }
    }

    /// The default policy and coupons in the policy's currency.
    ///
    /// # Errors
    ///
    /// Returns an error if the default coupon book cannot be built.
    pub fn defaults() -> Result<Self, CouponBookError> {
        let shipping = ShippingPolicy::default();
        let coupons = CouponBook::defaults(shipping.currency())?;

        Ok(Self { shipping, coupons })
    }

    /// Currency carts priced by these rules use.
    pub fn currency(&self) -> &'static Currency {
        self.shipping.currency()
    }
}
