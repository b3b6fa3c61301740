//! Cart summary
//!
//! The summary is derived from a cart's lines and coupon every time it is asked for and never
//! stored.

use std::io;

use rusty_money::{Money, iso::Currency};
use tabled::{
    builder::Builder,
    settings::{Alignment, Style, object::Columns},
};
use thiserror::Error;

use crate::{
    cart::{Cart, CartLine},
    coupons::Coupon,
    discounts::coupon_discount_minor,
    money::Price,
    pricing::PricingError,
    shipping::ShippingPolicy,
};

/// Errors that can occur when rendering a summary.
#[derive(Debug, Error)]
pub enum SummaryError {
    /// Error pricing a line.
    #[error(transparent)]
    Pricing(#[from] PricingError),

    /// IO error
    #[error("IO error")]
    IO,
}

/// Derived totals of a cart.
#[derive(Debug, Clone, PartialEq)]
pub struct CartSummary {
    /// Sum of line totals
    pub subtotal: Price,

    /// Coupon discount, never more than the subtotal
    pub discount: Price,

    /// Shipping charged
    pub shipping: Price,

    /// Amount payable, never negative
    pub total: Price,

    /// Units across all lines
    pub item_count: u64,

    /// Code of the applied coupon
    pub coupon_code: Option<String>,

    /// Amount still needed for free shipping (zero once it applies)
    pub remaining_for_free_shipping: Price,
}

impl CartSummary {
    /// Whether shipping is free for this cart.
    pub fn has_free_shipping(&self) -> bool {
        self.shipping.to_minor_units() == 0
    }

    /// Writes the cart lines and totals as a table.
    ///
    /// # Errors
    ///
    /// Returns an error if a line can't be priced or the output can't be written.
    pub fn write_to(&self, mut out: impl io::Write, cart: &Cart) -> Result<(), SummaryError> {
        let mut builder = Builder::default();

        builder.push_record(["Line", "Item", "Qty", "Unit Price", "Total"]);

        for (position, line) in cart.lines().iter().enumerate() {
            builder.push_record([
                (position + 1).to_string(),
                line.name().to_string(),
                line.quantity().to_string(),
                line.unit_price().to_string(),
                line.total_price()?.to_string(),
            ]);
        }

        let mut table = builder.build();

        table.with(Style::modern_rounded());
        table.modify(Columns::new(2..5), Alignment::right());

        writeln!(out, "{table}").map_err(|_err| SummaryError::IO)?;

        let coupon_label = self
            .coupon_code
            .as_deref()
            .map_or_else(|| "Discount:".to_string(), |code| format!("Discount ({code}):"));

        let rows = [
            ("Subtotal:".to_string(), self.subtotal.to_string()),
            (coupon_label, format!("-{}", self.discount)),
            ("Shipping:".to_string(), self.shipping.to_string()),
            ("Total:".to_string(), self.total.to_string()),
        ];

        let label_width = rows.iter().map(|(label, _)| label.len()).max().unwrap_or(0);

        for (label, value) in rows {
            writeln!(out, " {label:<label_width$} {value:>14}").map_err(|_err| SummaryError::IO)?;
        }

        if !cart.is_empty() && !self.has_free_shipping() {
            writeln!(
                out,
                " Add {} more for free shipping.",
                self.remaining_for_free_shipping
            )
            .map_err(|_err| SummaryError::IO)?;
        }

        Ok(())
    }
}

/// Price a set of lines with an optional coupon.
///
/// Free shipping is decided on the subtotal before any discount.
///
/// # Errors
///
/// Returns [`PricingError`] if an amount overflows minor units.
pub fn summarize(
    lines: &[CartLine],
    coupon: Option<&Coupon>,
    shipping: &ShippingPolicy,
    currency: &'static Currency,
) -> Result<CartSummary, PricingError> {
    let subtotal = lines.iter().try_fold(0_i64, |acc, line| {
        acc.checked_add(line.total_minor()?)
            .ok_or(PricingError::Overflow)
    })?;

    let discount = coupon
        .map(|coupon| coupon_discount_minor(coupon.discount(), subtotal))
        .transpose()?
        .unwrap_or(0);

    let shipping_minor = shipping.shipping_minor(subtotal);

    let total = subtotal
        .checked_sub(discount)
        .and_then(|value| value.checked_add(shipping_minor))
        .ok_or(PricingError::Overflow)?
        .max(0);

    let remaining = if shipping_minor == 0 {
        0
    } else {
        shipping.remaining_for_free_shipping_minor(subtotal)
    };

    Ok(CartSummary {
        subtotal: Money::from_minor(subtotal, currency),
        discount: Money::from_minor(discount, currency),
        shipping: Money::from_minor(shipping_minor, currency),
        total: Money::from_minor(total, currency),
        item_count: lines.iter().map(|line| u64::from(line.quantity())).sum(),
        coupon_code: coupon.map(|coupon| coupon.code().to_string()),
        remaining_for_free_shipping: Money::from_minor(remaining, currency),
    })
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use rusty_money::iso::BRL;
    use testresult::TestResult;

    use crate::{
        coupons::CouponBookError,
        pricing::PricingRules,
        products::{Product, ProductId},
    };

    use super::*;

    fn cart() -> Result<Cart, CouponBookError> {
        Ok(Cart::new(Arc::new(PricingRules::defaults()?)))
    }

    fn product(minor: i64) -> Product {
        Product::new(ProductId::new(), "Item", "item", Money::from_minor(minor, BRL))
    }

    #[test]
    fn empty_cart_pays_flat_fee_on_zero_subtotal() -> TestResult {
        let summary = cart()?.summary()?;

        assert_eq!(summary.subtotal, Money::from_minor(0, BRL));
        assert_eq!(summary.shipping, Money::from_minor(10_00, BRL));
        assert_eq!(summary.total, Money::from_minor(10_00, BRL));
        assert_eq!(summary.item_count, 0);

        Ok(())
    }

    #[test]
    fn under_threshold_pays_flat_fee() -> TestResult {
        let mut cart = cart()?;

        cart.add_line(&product(45_00), 2, None)?;

        let summary = cart.summary()?;

        assert_eq!(summary.subtotal, Money::from_minor(90_00, BRL));
        assert_eq!(summary.shipping, Money::from_minor(10_00, BRL));
        assert_eq!(summary.total, Money::from_minor(100_00, BRL));
        assert_eq!(summary.remaining_for_free_shipping, Money::from_minor(10_01, BRL));

        Ok(())
    }

    #[test]
    fn exactly_threshold_still_pays_shipping() -> TestResult {
        let mut cart = cart()?;

        cart.add_line(&product(100_00), 1, None)?;

        assert_eq!(cart.summary()?.shipping, Money::from_minor(10_00, BRL));

        Ok(())
    }

    #[test]
    fn free_shipping_decided_before_discount() -> TestResult {
        let mut cart = cart()?;

        cart.add_line(&product(105_00), 1, None)?;
        cart.apply_coupon("BIUTY10");

        let summary = cart.summary()?;

        assert_eq!(summary.discount, Money::from_minor(10_50, BRL));
        assert!(summary.has_free_shipping());
        assert_eq!(summary.total, Money::from_minor(94_50, BRL));
        assert_eq!(summary.coupon_code.as_deref(), Some("BIUTY10"));

        Ok(())
    }

    #[test]
    fn fixed_coupon_never_makes_total_negative() -> TestResult {
        let mut cart = cart()?;

        cart.add_line(&product(5_00), 1, None)?;
        cart.apply_coupon("BEMVINDO20");

        let summary = cart.summary()?;

        assert_eq!(summary.discount, Money::from_minor(5_00, BRL));
        assert_eq!(summary.total, Money::from_minor(10_00, BRL));

        Ok(())
    }

    #[test]
    fn summary_is_repeatable() -> TestResult {
        let mut cart = cart()?;

        cart.add_line(&product(33_33), 3, None)?;
        cart.apply_coupon("BIUTY15");

        assert_eq!(cart.summary()?, cart.summary()?);

        Ok(())
    }

    #[test]
    fn write_to_renders_lines_and_totals() -> TestResult {
        let mut cart = cart()?;

        cart.add_line(&product(45_00), 2, None)?;
        cart.apply_coupon("BIUTY10");

        let mut out = Vec::new();

        cart.summary()?.write_to(&mut out, &cart)?;

        let rendered = String::from_utf8(out)?;

        assert!(rendered.contains("Item"), "missing item row: {rendered}");
        assert!(rendered.contains("Subtotal:"), "missing subtotal: {rendered}");
        assert!(rendered.contains("Discount (BIUTY10):"), "missing coupon: {rendered}");
        assert!(rendered.contains("free shipping"), "missing shipping hint: {rendered}");

        Ok(())
    }
}
