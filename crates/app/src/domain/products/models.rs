//! Product Models

use biuty::products::{Product as CartProduct, ProductId, VariantId};
use jiff::Timestamp;
use rusty_money::{Money, iso::Currency};

use crate::domain::products::ProductsServiceError;

/// Catalog product
#[derive(Debug, Clone, PartialEq)]
pub struct Product {
    pub uuid: ProductId,
    pub name: String,
    pub slug: String,
    pub description: String,
    pub category: String,

    /// Price in minor units of the store currency
    pub price: u64,

    /// Previous price shown struck through, in minor units
    pub compare_at_price: Option<u64>,
    pub images: Vec<String>,
    pub variants: Vec<ProductVariant>,
    pub stock: u32,
    pub featured: bool,
    pub sales_count: u64,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Product {
    /// Whether at least one unit can be sold.
    #[must_use]
    pub fn in_stock(&self) -> bool {
        self.stock > 0
    }

    /// Find a variant by its display name, ignoring case.
    #[must_use]
    pub fn variant_named(&self, name: &str) -> Option<&ProductVariant> {
        self.variants
            .iter()
            .find(|variant| variant.name.eq_ignore_ascii_case(name.trim()))
    }

    /// The slice of this product a cart line needs, priced in `currency`.
    ///
    /// # Errors
    ///
    /// Returns an error if the price does not fit a signed minor-unit amount.
    pub fn to_cart_product(
        &self,
        currency: &'static Currency,
    ) -> Result<CartProduct, ProductsServiceError> {
        let price = Money::from_minor(i64::try_from(self.price)?, currency);
        let product = CartProduct::new(self.uuid, self.name.clone(), self.slug.clone(), price);

        Ok(match self.images.first() {
            Some(image) => product.with_image(image.clone()),
            None => product,
        })
    }
}

/// Product variant such as a shade or size
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductVariant {
    pub uuid: VariantId,
    pub name: String,
}

/// New Product Model
#[derive(Debug, Clone, PartialEq)]
pub struct NewProduct {
    /// Identifier to keep, as when importing a catalog; generated when `None`
    pub uuid: Option<ProductId>,
    pub name: String,
    pub description: String,
    pub category: String,
    pub price: u64,
    pub compare_at_price: Option<u64>,
    pub images: Vec<String>,

    pub variants: Vec<NewVariant>,
    pub stock: u32,
    pub featured: bool,
}

/// New Variant Model
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewVariant {
    pub uuid: Option<VariantId>,
    pub name: String,
}

impl From<&str> for NewVariant {
    fn from(name: &str) -> Self {
        Self {
            uuid: None,
            name: name.to_string(),
        }
    }
}

/// Product Update Model
///
/// Fields left as `None` keep their current value. Renaming a product gives it a new slug.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProductUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub price: Option<u64>,
    pub compare_at_price: Option<Option<u64>>,
    pub images: Option<Vec<String>>,
    pub featured: Option<bool>,
}

/// Listing order
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ProductSort {
    #[default]
    Newest,
    PriceAscending,
    PriceDescending,
    Name,
    BestSelling,
}

/// Catalog listing filters
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProductFilters {
    pub category: Option<String>,

    /// Inclusive lower price bound in minor units
    pub min_price: Option<u64>,

    /// Inclusive upper price bound in minor units
    pub max_price: Option<u64>,
    pub in_stock_only: bool,
    pub sort: ProductSort,
}

impl ProductFilters {
    /// Whether `product` passes every filter.
    #[must_use]
    pub fn matches(&self, product: &Product) -> bool {
        self.category
            .as_deref()
            .is_none_or(|category| product.category.eq_ignore_ascii_case(category))
            && self.min_price.is_none_or(|min| product.price >= min)
            && self.max_price.is_none_or(|max| product.price <= max)
            && (!self.in_stock_only || product.in_stock())
    }
}
