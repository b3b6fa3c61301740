//! Cart
//!
//! The cart aggregates line items and at most one coupon. Lines are keyed by product and
//! variant: adding a product already in the cart increases that line's quantity. Quantities are
//! validated on the way in, so a stored line always has a quantity of at least one.

use std::sync::Arc;

use rusty_money::iso::Currency;
use thiserror::Error;

use crate::{
    coupons::{Coupon, CouponOutcome},
    pricing::{PricingError, PricingRules},
    products::{Product, ProductId, VariantId},
    summary::{CartSummary, summarize},
};

pub mod lines;
pub mod snapshot;

pub use lines::{CartLine, LineId, LineKey};

use lines::positive_quantity;

/// Errors related to cart mutations.
#[derive(Debug, Error, PartialEq)]
pub enum CartError {
    /// Quantities must be positive integers.
    #[error("quantity must be a positive integer, got {0}")]
    InvalidQuantity(i64),

    /// A product's currency differs from the cart currency (product currency, cart currency).
    #[error("product has currency {0}, but cart has currency {1}")]
    CurrencyMismatch(&'static str, &'static str),

    /// A product with a negative price.
    #[error("product {0} has a negative price")]
    NegativePrice(ProductId),

    /// No line with this id.
    #[error("line {0} not found")]
    LineNotFound(LineId),

    /// Merging would exceed the largest representable quantity.
    #[error("line {0} quantity overflowed")]
    QuantityOverflow(LineId),
}

/// Shopping cart
#[derive(Debug, Clone)]
pub struct Cart {
    lines: Vec<CartLine>,
    coupon: Option<Coupon>,
    rules: Arc<PricingRules>,
}

impl Cart {
    /// Create an empty cart priced by the given rules.
    pub fn new(rules: Arc<PricingRules>) -> Self {
        Self {
            lines: Vec::new(),
            coupon: None,
            rules,
        }
    }

    /// Add `quantity` of a product (variant) to the cart, returning the line it landed on.
    ///
    /// # Errors
    ///
    /// Returns an error if the quantity isn't a positive integer, the product is priced in another
    /// currency or below zero, or the merged quantity overflows.
    pub fn add_line(
        &mut self,
        product: &Product,
        quantity: i64,
        variant_id: Option<VariantId>,
    ) -> Result<LineId, CartError> {
        let quantity = positive_quantity(quantity)?;

        let product_currency = product.price.currency();

        if product_currency != self.currency() {
            return Err(CartError::CurrencyMismatch(
                product_currency.iso_alpha_code,
                self.currency().iso_alpha_code,
            ));
        }

        if product.price.to_minor_units() < 0 {
            return Err(CartError::NegativePrice(product.id));
        }

        let key = LineKey {
            product_id: product.id,
            variant_id,
        };

        if let Some(line) = self.lines.iter_mut().find(|line| line.key() == key) {
            let merged = line
                .quantity()
                .checked_add(quantity)
                .ok_or(CartError::QuantityOverflow(line.id()))?;

            line.set_quantity(merged);

            return Ok(line.id());
        }

        let line = CartLine::new(product, variant_id, quantity);
        let id = line.id();

        self.lines.push(line);

        Ok(id)
    }

    /// Remove a line, returning whether it was in the cart.
    pub fn remove_line(&mut self, id: LineId) -> bool {
        let before = self.lines.len();

        self.lines.retain(|line| line.id() != id);

        self.lines.len() != before
    }

    /// Set a line's quantity; zero or less removes the line.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::LineNotFound`] when setting a positive quantity on an unknown line, or
    /// [`CartError::InvalidQuantity`] if the quantity doesn't fit a line.
    pub fn set_quantity(&mut self, id: LineId, quantity: i64) -> Result<(), CartError> {
        if quantity <= 0 {
            self.remove_line(id);

            return Ok(());
        }

        let quantity = positive_quantity(quantity)?;

        self.line_mut(id)?.set_quantity(quantity);

        Ok(())
    }

    /// Add one to a line's quantity.
    ///
    /// # Errors
    ///
    /// Returns an error if the line doesn't exist or its quantity would overflow.
    pub fn increment(&mut self, id: LineId) -> Result<(), CartError> {
        let line = self.line_mut(id)?;
        let quantity = line
            .quantity()
            .checked_add(1)
            .ok_or(CartError::QuantityOverflow(id))?;

        line.set_quantity(quantity);

        Ok(())
    }

    /// Take one from a line's quantity, removing the line when it reaches zero.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::LineNotFound`] if the line doesn't exist.
    pub fn decrement(&mut self, id: LineId) -> Result<(), CartError> {
        let quantity = self.line_mut(id)?.quantity();

        self.set_quantity(id, i64::from(quantity) - 1)
    }

    /// Apply a coupon code, replacing any active coupon if the code is accepted.
    pub fn apply_coupon(&mut self, code: &str) -> CouponOutcome {
        let outcome = self.rules.coupons.lookup(code, self.currency());

        if let CouponOutcome::Applied(coupon) = &outcome {
            self.coupon = Some(coupon.clone());
        }

        outcome
    }

    /// Remove the active coupon, returning it.
    pub fn remove_coupon(&mut self) -> Option<Coupon> {
        self.coupon.take()
    }

    /// Empty the cart, coupon included.
    pub fn clear(&mut self) {
        self.lines.clear();
        self.coupon = None;
    }

    /// Price the cart.
    ///
    /// # Errors
    ///
    /// Returns [`PricingError`] if an amount overflows minor units.
    pub fn summary(&self) -> Result<CartSummary, PricingError> {
        summarize(
            &self.lines,
            self.coupon.as_ref(),
            &self.rules.shipping,
            self.currency(),
        )
    }

    /// Lines in the order they were added.
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    /// Look up a line.
    pub fn line(&self, id: LineId) -> Option<&CartLine> {
        self.lines.iter().find(|line| line.id() == id)
    }

    /// Look up the line for a product variant.
    pub fn line_for(&self, key: LineKey) -> Option<&CartLine> {
        self.lines.iter().find(|line| line.key() == key)
    }

    /// Active coupon, if any.
    pub fn coupon(&self) -> Option<&Coupon> {
        self.coupon.as_ref()
    }

    /// Rules the cart is priced by.
    pub fn rules(&self) -> &Arc<PricingRules> {
        &self.rules
    }

    /// Number of lines.
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Whether the cart has no lines.
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Total number of units across all lines.
    pub fn item_count(&self) -> u64 {
        self.lines.iter().map(|line| u64::from(line.quantity())).sum()
    }

    /// Currency of the cart.
    pub fn currency(&self) -> &'static Currency {
        self.rules.currency()
    }

    fn line_mut(&mut self, id: LineId) -> Result<&mut CartLine, CartError> {
        self.lines
            .iter_mut()
            .find(|line| line.id() == id)
            .ok_or(CartError::LineNotFound(id))
    }
}

#[cfg(test)]
mod tests {
    use rusty_money::{
        Money,
        iso::{BRL, USD},
    };
    use testresult::TestResult;

    use crate::coupons::{CouponBookError, DeclineReason};

    use super::*;

    fn cart() -> Result<Cart, CouponBookError> {
        Ok(Cart::new(Arc::new(PricingRules::defaults()?)))
    }

    fn product(name: &str, minor: i64) -> Product {
        Product::new(ProductId::new(), name, name.to_lowercase(), Money::from_minor(minor, BRL))
    }

    #[test]
    fn new_cart_is_empty() -> TestResult {
        let cart = cart()?;

        assert!(cart.is_empty());
        assert_eq!(cart.len(), 0);
        assert_eq!(cart.item_count(), 0);
        assert_eq!(cart.currency(), BRL);

        Ok(())
    }

    #[test]
    fn add_line_appends_new_products() -> TestResult {
        let mut cart = cart()?;

        let serum = cart.add_line(&product("Serum", 149_90), 1, None)?;
        let balm = cart.add_line(&product("Balm", 39_90), 2, None)?;

        assert_ne!(serum, balm);
        assert_eq!(cart.len(), 2);
        assert_eq!(cart.item_count(), 3);

        Ok(())
    }

    #[test]
    fn add_line_merges_same_product_and_variant() -> TestResult {
        let mut cart = cart()?;
        let serum = product("Serum", 149_90);
        let shade = VariantId::new();

        let first = cart.add_line(&serum, 1, Some(shade))?;
        let second = cart.add_line(&serum, 2, Some(shade))?;
        let other_shade = cart.add_line(&serum, 1, Some(VariantId::new()))?;

        assert_eq!(first, second);
        assert_ne!(first, other_shade);
        assert_eq!(cart.len(), 2);
        assert_eq!(cart.line(first).map(CartLine::quantity), Some(3));

        Ok(())
    }

    #[test]
    fn add_line_keeps_original_unit_price_on_merge() -> TestResult {
        let mut cart = cart()?;
        let mut serum = product("Serum", 149_90);

        let id = cart.add_line(&serum, 1, None)?;

        serum.price = Money::from_minor(99_90, BRL);
        cart.add_line(&serum, 1, None)?;

        assert_eq!(
            cart.line(id).map(CartLine::unit_price),
            Some(Money::from_minor(149_90, BRL))
        );

        Ok(())
    }

    #[test]
    fn add_line_rejects_non_positive_quantities() -> TestResult {
        let mut cart = cart()?;
        let serum = product("Serum", 149_90);

        assert_eq!(cart.add_line(&serum, 0, None), Err(CartError::InvalidQuantity(0)));
        assert_eq!(cart.add_line(&serum, -1, None), Err(CartError::InvalidQuantity(-1)));
        assert!(cart.is_empty());

        Ok(())
    }

    #[test]
    fn add_line_rejects_other_currency() -> TestResult {
        let mut cart = cart()?;
        let imported = Product::new(ProductId::new(), "Imported", "imported", Money::from_minor(10_00, USD));

        assert_eq!(
            cart.add_line(&imported, 1, None),
            Err(CartError::CurrencyMismatch("USD", "BRL"))
        );

        Ok(())
    }

    #[test]
    fn add_line_rejects_negative_price() -> TestResult {
        let mut cart = cart()?;
        let refund = product("Refund", -5_00);

        assert_eq!(
            cart.add_line(&refund, 1, None),
            Err(CartError::NegativePrice(refund.id))
        );

        Ok(())
    }

    #[test]
    fn add_line_reports_quantity_overflow() -> TestResult {
        let mut cart = cart()?;
        let serum = product("Serum", 1);

        let id = cart.add_line(&serum, i64::from(u32::MAX), None)?;

        assert_eq!(cart.add_line(&serum, 1, None), Err(CartError::QuantityOverflow(id)));

        Ok(())
    }

    #[test]
    fn remove_line_reports_whether_removed() -> TestResult {
        let mut cart = cart()?;
        let id = cart.add_line(&product("Serum", 149_90), 1, None)?;

        assert!(cart.remove_line(id));
        assert!(!cart.remove_line(id));
        assert!(cart.is_empty());

        Ok(())
    }

    #[test]
    fn set_quantity_updates_line() -> TestResult {
        let mut cart = cart()?;
        let id = cart.add_line(&product("Serum", 149_90), 1, None)?;

        cart.set_quantity(id, 4)?;

        assert_eq!(cart.line(id).map(CartLine::quantity), Some(4));

        Ok(())
    }

    #[test]
    fn set_quantity_zero_or_negative_removes_line() -> TestResult {
        let mut cart = cart()?;
        let first = cart.add_line(&product("Serum", 149_90), 1, None)?;
        let second = cart.add_line(&product("Balm", 39_90), 1, None)?;

        cart.set_quantity(first, 0)?;
        cart.set_quantity(second, -2)?;

        assert!(cart.is_empty());

        Ok(())
    }

    #[test]
    fn set_quantity_on_unknown_line_errors() -> TestResult {
        let mut cart = cart()?;
        let id = LineId::new();

        assert_eq!(cart.set_quantity(id, 2), Err(CartError::LineNotFound(id)));
        assert_eq!(cart.set_quantity(id, 0), Ok(()));

        Ok(())
    }

    #[test]
    fn increment_and_decrement() -> TestResult {
        let mut cart = cart()?;
        let id = cart.add_line(&product("Serum", 149_90), 1, None)?;

        cart.increment(id)?;
        assert_eq!(cart.line(id).map(CartLine::quantity), Some(2));

        cart.decrement(id)?;
        assert_eq!(cart.line(id).map(CartLine::quantity), Some(1));

        cart.decrement(id)?;
        assert!(cart.line(id).is_none(), "decrementing to zero removes the line");

        assert_eq!(cart.decrement(id), Err(CartError::LineNotFound(id)));

        Ok(())
    }

    #[test]
    fn apply_coupon_replaces_active_coupon() -> TestResult {
        let mut cart = cart()?;

        assert!(cart.apply_coupon("BIUTY10").is_applied());
        assert!(cart.apply_coupon("BIUTY15").is_applied());

        assert_eq!(cart.coupon().map(Coupon::code), Some("BIUTY15"));

        Ok(())
    }

    #[test]
    fn declined_coupon_keeps_active_coupon() -> TestResult {
        let mut cart = cart()?;

        cart.apply_coupon("BIUTY10");
        let outcome = cart.apply_coupon("FAKE");

        assert_eq!(
            outcome,
            CouponOutcome::Declined(DeclineReason::UnknownCode("FAKE".to_string()))
        );
        assert_eq!(cart.coupon().map(Coupon::code), Some("BIUTY10"));

        Ok(())
    }

    #[test]
    fn remove_coupon_clears_it() -> TestResult {
        let mut cart = cart()?;

        cart.apply_coupon("BIUTY10");

        assert_eq!(cart.remove_coupon().as_ref().map(Coupon::code), Some("BIUTY10"));
        assert!(cart.coupon().is_none());
        assert!(cart.remove_coupon().is_none());

        Ok(())
    }

    #[test]
    fn clear_empties_lines_and_coupon() -> TestResult {
        let mut cart = cart()?;

        cart.add_line(&product("Serum", 149_90), 1, None)?;
        cart.apply_coupon("BIUTY10");
        cart.clear();

        assert!(cart.is_empty());
        assert!(cart.coupon().is_none());

        Ok(())
    }

    #[test]
    fn line_for_finds_by_key() -> TestResult {
        let mut cart = cart()?;
        let serum = product("Serum", 149_90);
        let id = cart.add_line(&serum, 1, None)?;

        let key = LineKey {
            product_id: serum.id,
            variant_id: None,
        };

        assert_eq!(cart.line_for(key).map(CartLine::id), Some(id));

        Ok(())
    }
}
