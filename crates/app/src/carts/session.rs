//! Cart session
//!
//! A session owns one cart and the store it persists to. Every change to the cart is followed by
//! a save; a failed save is logged and the in-memory cart stays authoritative.

use std::sync::Arc;

use biuty::prelude::{
    Cart, CartError, CartSummary, Coupon, CouponOutcome, LineId, PricingError, PricingRules,
    Product, VariantId,
};
use tracing::{debug, warn};

use crate::carts::CartStore;

pub struct CartSession {
    cart: Cart,
    store: Arc<dyn CartStore>,
}

impl CartSession {
    /// Restore the saved cart, or start an empty one if nothing usable was saved.
    pub async fn open(store: Arc<dyn CartStore>, rules: Arc<PricingRules>) -> Self {
        let cart = match store.load().await {
            Ok(Some(snapshot)) => Cart::from_snapshot(snapshot, Arc::clone(&rules))
                .unwrap_or_else(|error| {
                    warn!(%error, "discarding saved cart");
                    Cart::new(Arc::clone(&rules))
                }),
            Ok(None) => Cart::new(rules),
            Err(error) => {
                warn!(%error, "could not load saved cart, starting empty");
                Cart::new(rules)
            }
        };

        debug!(lines = cart.len(), "cart session opened");

        Self { cart, store }
    }

    #[must_use]
    pub fn cart(&self) -> &Cart {
        &self.cart
    }

    /// Current totals.
    ///
    /// # Errors
    ///
    /// Returns an error if an amount overflows.
    pub fn summary(&self) -> Result<CartSummary, PricingError> {
        self.cart.summary()
    }

    /// Add a product and save.
    ///
    /// # Errors
    ///
    /// Returns the cart's rejection of the line; nothing is saved then.
    pub async fn add_line(
        &mut self,
        product: &Product,
        quantity: i64,
        variant_id: Option<VariantId>,
    ) -> Result<LineId, CartError> {
        let line = self.cart.add_line(product, quantity, variant_id)?;

        self.persist().await;

        Ok(line)
    }

    /// Remove a line and save if it was there.
    pub async fn remove_line(&mut self, line: LineId) -> bool {
        let removed = self.cart.remove_line(line);

        if removed {
            self.persist().await;
        }

        removed
    }

    /// Set a line's quantity and save; zero or less removes the line.
    ///
    /// # Errors
    ///
    /// Returns an error for an unknown line with a positive quantity.
    pub async fn set_quantity(&mut self, line: LineId, quantity: i64) -> Result<(), CartError> {
        self.cart.set_quantity(line, quantity)?;
        self.persist().await;

        Ok(())
    }

    /// Add one unit to a line and save.
    ///
    /// # Errors
    ///
    /// Returns an error for an unknown line.
    pub async fn increment(&mut self, line: LineId) -> Result<(), CartError> {
        self.cart.increment(line)?;
        self.persist().await;

        Ok(())
    }

    /// Take one unit off a line and save.
    ///
    /// # Errors
    ///
    /// Returns an error for an unknown line.
    pub async fn decrement(&mut self, line: LineId) -> Result<(), CartError> {
        self.cart.decrement(line)?;
        self.persist().await;

        Ok(())
    }

    /// Try a coupon code, saving when it is applied.
    pub async fn apply_coupon(&mut self, code: &str) -> CouponOutcome {
        let outcome = self.cart.apply_coupon(code);

        if outcome.is_applied() {
            self.persist().await;
        }

        outcome
    }

    /// Drop the coupon and save.
    pub async fn remove_coupon(&mut self) -> Option<Coupon> {
        let removed = self.cart.remove_coupon();

        if removed.is_some() {
            self.persist().await;
        }

        removed
    }

    /// Empty the cart and forget the saved copy.
    pub async fn clear(&mut self) {
        self.cart.clear();

        if let Err(error) = self.store.clear().await {
            warn!(%error, "could not clear saved cart");
        }
    }

    async fn persist(&self) {
        if let Err(error) = self.store.save(&self.cart.snapshot()).await {
            warn!(%error, "could not save cart");
        }
    }
}
