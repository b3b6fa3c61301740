//! Cart lines

use rusty_money::Money;

use crate::{
    cart::CartError,
    money::Price,
    pricing::PricingError,
    products::{Product, ProductId, VariantId},
    uuids::TypedUuid,
};

/// Marker for cart line identifiers.
#[derive(Debug)]
pub struct LineMarker;

/// Cart line identifier
pub type LineId = TypedUuid<LineMarker>;

/// Identity of a line: one line per product variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LineKey {
    /// Product identifier
    pub product_id: ProductId,

    /// Variant identifier, if the product has variants
    pub variant_id: Option<VariantId>,
}

/// One (product, variant, quantity) entry in a cart.
#[derive(Debug, Clone, PartialEq)]
pub struct CartLine {
    id: LineId,
    product_id: ProductId,
    variant_id: Option<VariantId>,
    name: String,
    slug: String,
    image: Option<String>,
    quantity: u32,
    unit_price: Price,
}

impl CartLine {
    pub(crate) fn new(product: &Product, variant_id: Option<VariantId>, quantity: u32) -> Self {
        Self {
            id: LineId::new(),
            product_id: product.id,
            variant_id,
            name: product.name.clone(),
            slug: product.slug.clone(),
            image: product.image.clone(),
            quantity,
            unit_price: product.price,
        }
    }

    #[expect(
        clippy::too_many_arguments,
        reason = "Rebuilds every persisted field of a line"
    )]
    pub(crate) fn restore(
        id: LineId,
        product_id: ProductId,
        variant_id: Option<VariantId>,
        name: String,
        slug: String,
        image: Option<String>,
        quantity: u32,
        unit_price: Price,
    ) -> Self {
        Self {
            id,
            product_id,
            variant_id,
            name,
            slug,
            image,
            quantity,
            unit_price,
        }
    }

    /// Line identifier
    pub fn id(&self) -> LineId {
        self.id
    }

    /// Product on this line
    pub fn product_id(&self) -> ProductId {
        self.product_id
    }

    /// Variant on this line, if any
    pub fn variant_id(&self) -> Option<VariantId> {
        self.variant_id
    }

    /// Identity key of the line
    pub fn key(&self) -> LineKey {
        LineKey {
            product_id: self.product_id,
            variant_id: self.variant_id,
        }
    }

    /// Product name at the time it was added
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Product slug
    pub fn slug(&self) -> &str {
        &self.slug
    }

    /// Product image URL
    pub fn image(&self) -> Option<&str> {
        self.image.as_deref()
    }

    /// Quantity, always at least one
    pub fn quantity(&self) -> u32 {
        self.quantity
    }

    /// Unit price
    pub fn unit_price(&self) -> Price {
        self.unit_price
    }

    /// Unit price × quantity, in minor units.
    ///
    /// # Errors
    ///
    /// Returns [`PricingError::Overflow`] if the product doesn't fit in minor units.
    pub fn total_minor(&self) -> Result<i64, PricingError> {
        self.unit_price
            .to_minor_units()
            .checked_mul(i64::from(self.quantity))
            .ok_or(PricingError::Overflow)
    }

    /// Unit price × quantity.
    ///
    /// # Errors
    ///
    /// Returns [`PricingError::Overflow`] if the product doesn't fit in minor units.
    pub fn total_price(&self) -> Result<Price, PricingError> {
        Ok(Money::from_minor(
            self.total_minor()?,
            self.unit_price.currency(),
        ))
    }

    pub(crate) fn set_quantity(&mut self, quantity: u32) {
        self.quantity = quantity;
    }
}

/// Check a requested quantity is a positive integer that fits a line.
pub(crate) fn positive_quantity(quantity: i64) -> Result<u32, CartError> {
    u32::try_from(quantity)
        .ok()
        .filter(|quantity| *quantity > 0)
        .ok_or(CartError::InvalidQuantity(quantity))
}
