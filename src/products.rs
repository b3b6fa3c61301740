//! Products

use crate::{money::Price, uuids::TypedUuid};

/// Marker for product identifiers.
#[derive(Debug)]
pub struct ProductMarker;

/// Marker for product variant identifiers (shade, size, ...).
#[derive(Debug)]
pub struct VariantMarker;

/// Product identifier
pub type ProductId = TypedUuid<ProductMarker>;

/// Product variant identifier
pub type VariantId = TypedUuid<VariantMarker>;

/// The slice of a catalog product the cart needs to build a line.
#[derive(Debug, Clone, PartialEq)]
pub struct Product {
    /// Product identifier
    pub id: ProductId,

    /// Display name
    pub name: String,

    /// URL slug
    pub slug: String,

    /// Primary image URL
    pub image: Option<String>,

    /// Unit price
    pub price: Price,
}

impl Product {
    /// Create a product with no image.
    pub fn new(id: ProductId, name: impl Into<String>, slug: impl Into<String>, price: Price) -> Self {
        Self {
            id,
            name: name.into(),
            slug: slug.into(),
            image: None,
            price,
        }
    }

    /// Attach an image URL.
    #[must_use]
    pub fn with_image(mut self, image: impl Into<String>) -> Self {
        self.image = Some(image.into());
        self
    }
}
