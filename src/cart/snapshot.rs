//! Cart snapshots
//!
//! A snapshot is the persisted form of a cart. Restoring one re-checks every line against the
//! cart invariants and looks the coupon code up again, so a coupon withdrawn since the cart was
//! saved silently drops off.

use std::sync::Arc;

use rusty_money::Money;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    cart::{Cart, CartLine, LineId, LineKey},
    coupons::CouponOutcome,
    money::{MoneyParseError, currency_from_code},
    pricing::PricingRules,
    products::{ProductId, VariantId},
};

/// Errors raised while restoring a cart from a snapshot.
#[derive(Debug, Error, PartialEq)]
pub enum SnapshotError {
    /// The snapshot currency code is unknown.
    #[error(transparent)]
    Currency(#[from] MoneyParseError),

    /// The snapshot was taken in a different currency from the pricing rules.
    #[error("snapshot is in {0}, but the store prices in {1}")]
    CurrencyMismatch(String, &'static str),

    /// A line with a quantity below one.
    #[error("line {0} has quantity zero")]
    ZeroQuantity(LineId),

    /// A line with a negative unit price.
    #[error("line {0} has a negative unit price")]
    NegativePrice(LineId),

    /// Two lines for the same product variant.
    #[error("line {0} duplicates another line's product")]
    DuplicateLine(LineId),
}

/// Persisted cart line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineSnapshot {
    /// Line identifier
    pub id: LineId,

    /// Product identifier
    pub product_id: ProductId,

    /// Variant identifier
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variant_id: Option<VariantId>,

    /// Product name
    pub name: String,

    /// Product slug
    pub slug: String,

    /// Product image URL
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,

    /// Quantity
    pub quantity: u32,

    /// Unit price in minor units
    pub unit_price: i64,
}

/// Persisted cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartSnapshot {
    /// ISO currency code of every amount in the snapshot
    pub currency: String,

    /// Cart lines
    pub lines: Vec<LineSnapshot>,

    /// Applied coupon code
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coupon: Option<String>,
}

impl Cart {
    /// Capture the cart for persistence.
    pub fn snapshot(&self) -> CartSnapshot {
        CartSnapshot {
            currency: self.currency().iso_alpha_code.to_string(),
            lines: self
                .lines()
                .iter()
                .map(|line| LineSnapshot {
                    id: line.id(),
                    product_id: line.product_id(),
                    variant_id: line.variant_id(),
                    name: line.name().to_string(),
                    slug: line.slug().to_string(),
                    image: line.image().map(str::to_string),
                    quantity: line.quantity(),
                    unit_price: line.unit_price().to_minor_units(),
                })
                .collect(),
            coupon: self.coupon().map(|coupon| coupon.code().to_string()),
        }
    }

    /// Rebuild a cart from a snapshot.
    ///
    /// # Errors
    ///
    /// Returns a [`SnapshotError`] if the snapshot breaks a cart invariant or is in another
    /// currency.
    pub fn from_snapshot(
        snapshot: CartSnapshot,
        rules: Arc<PricingRules>,
    ) -> Result<Self, SnapshotError> {
        let currency = currency_from_code(&snapshot.currency)?;

        if currency != rules.currency() {
            return Err(SnapshotError::CurrencyMismatch(
                snapshot.currency,
                rules.currency().iso_alpha_code,
            ));
        }

        let mut cart = Cart::new(rules);
        let mut seen: Vec<LineKey> = Vec::with_capacity(snapshot.lines.len());

        for line in snapshot.lines {
            if line.quantity == 0 {
                return Err(SnapshotError::ZeroQuantity(line.id));
            }

            if line.unit_price < 0 {
                return Err(SnapshotError::NegativePrice(line.id));
            }

            let key = LineKey {
                product_id: line.product_id,
                variant_id: line.variant_id,
            };

            if seen.contains(&key) {
                return Err(SnapshotError::DuplicateLine(line.id));
            }

            seen.push(key);

            cart.lines.push(CartLine::restore(
                line.id,
                line.product_id,
                line.variant_id,
                line.name,
                line.slug,
                line.image,
                line.quantity,
                Money::from_minor(line.unit_price, currency),
            ));
        }

        if let Some(code) = snapshot.coupon
            && let CouponOutcome::Applied(coupon) = cart.rules.coupons.lookup(&code, currency)
        {
            cart.coupon = Some(coupon);
        }

        Ok(cart)
    }
}

#[cfg(test)]
mod tests {
    use rusty_money::iso::BRL;
    use testresult::TestResult;

    use crate::products::Product;

    use super::*;

    fn rules() -> Result<Arc<PricingRules>, crate::coupons::CouponBookError> {
        Ok(Arc::new(PricingRules::defaults()?))
    }

    #[test]
    fn snapshot_restores_lines_and_coupon() -> TestResult {
        let rules = rules()?;
        let mut cart = Cart::new(Arc::clone(&rules));

        let product = Product::new(
            ProductId::new(),
            "Sérum Vitamina C",
            "serum-vitamina-c",
            Money::from_minor(149_90, BRL),
        )
        .with_image("https://cdn.biuty.test/serum.jpg");

        let id = cart.add_line(&product, 2, Some(VariantId::new()))?;
        cart.apply_coupon("BIUTY10");

        let restored = Cart::from_snapshot(cart.snapshot(), rules)?;

        assert_eq!(restored.lines(), cart.lines());
        assert_eq!(restored.line(id).map(CartLine::quantity), Some(2));
        assert_eq!(restored.coupon(), cart.coupon());
        assert_eq!(restored.summary()?, cart.summary()?);

        Ok(())
    }

    #[test]
    fn withdrawn_coupon_is_dropped() -> TestResult {
        let snapshot = CartSnapshot {
            currency: "BRL".to_string(),
            lines: Vec::new(),
            coupon: Some("EXPIRED50".to_string()),
        };

        let cart = Cart::from_snapshot(snapshot, rules()?)?;

        assert!(cart.coupon().is_none());

        Ok(())
    }

    #[test]
    fn zero_quantity_line_is_rejected() -> TestResult {
        let id = LineId::new();
        let snapshot = CartSnapshot {
            currency: "BRL".to_string(),
            lines: vec![LineSnapshot {
                id,
                product_id: ProductId::new(),
                variant_id: None,
                name: "Balm".to_string(),
                slug: "balm".to_string(),
                image: None,
                quantity: 0,
                unit_price: 39_90,
            }],
            coupon: None,
        };

        assert_eq!(
            Cart::from_snapshot(snapshot, rules()?).err(),
            Some(SnapshotError::ZeroQuantity(id))
        );

        Ok(())
    }

    #[test]
    fn negative_price_line_is_rejected() -> TestResult {
        let id = LineId::new();
        let snapshot = CartSnapshot {
            currency: "BRL".to_string(),
            lines: vec![LineSnapshot {
                id,
                product_id: ProductId::new(),
                variant_id: None,
                name: "Balm".to_string(),
                slug: "balm".to_string(),
                image: None,
                quantity: 1,
                unit_price: -1,
            }],
            coupon: None,
        };

        assert_eq!(
            Cart::from_snapshot(snapshot, rules()?).err(),
            Some(SnapshotError::NegativePrice(id))
        );

        Ok(())
    }

    #[test]
    fn duplicate_lines_are_rejected() -> TestResult {
        let product_id = ProductId::new();
        let line = |id: LineId| LineSnapshot {
            id,
            product_id,
            variant_id: None,
            name: "Balm".to_string(),
            slug: "balm".to_string(),
            image: None,
            quantity: 1,
            unit_price: 39_90,
        };

        let second = LineId::new();
        let snapshot = CartSnapshot {
            currency: "BRL".to_string(),
            lines: vec![line(LineId::new()), line(second)],
            coupon: None,
        };

        assert_eq!(
            Cart::from_snapshot(snapshot, rules()?).err(),
            Some(SnapshotError::DuplicateLine(second))
        );

        Ok(())
    }

    #[test]
    fn other_currency_is_rejected() -> TestResult {
        let snapshot = CartSnapshot {
            currency: "USD".to_string(),
            lines: Vec::new(),
            coupon: None,
        };

        assert_eq!(
            Cart::from_snapshot(snapshot, rules()?).err(),
            Some(SnapshotError::CurrencyMismatch("USD".to_string(), "BRL"))
        );

        Ok(())
    }
}
