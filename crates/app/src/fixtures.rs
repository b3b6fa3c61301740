//! Catalog Fixtures
//!
//! The storefront ships with a small bundled catalog so a fresh install has something to sell.

use biuty::prelude::{MoneyParseError, ProductId, VariantId, parse_amount};
use rusty_money::iso::Currency;
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

use crate::domain::products::{
    ProductsService, ProductsServiceError,
    models::{NewProduct, NewVariant, Product},
};

/// Catalog bundled with the binary.
pub const DEFAULT_CATALOG: &str = include_str!("../fixtures/catalog.yml");

#[derive(Debug, Error)]
pub enum FixtureError {
    #[error("invalid catalog YAML")]
    Yaml(#[from] serde_norway::Error),

    #[error("invalid price for {name}")]
    Price {
        name: String,
        #[source]
        source: MoneyParseError,
    },

    #[error("negative price for {0}")]
    NegativePrice(String),

    #[error(transparent)]
    Products(#[from] ProductsServiceError),
}

/// Wrapper for products in YAML
#[derive(Debug, Deserialize)]
pub struct CatalogFixture {
    pub products: Vec<ProductFixture>,
}

/// Product Fixture
#[derive(Debug, Deserialize)]
pub struct ProductFixture {
    /// Stable identifier; generated when omitted
    #[serde(default)]
    pub id: Option<ProductId>,

    pub name: String,

    #[serde(default)]
    pub description: String,

    pub category: String,

    /// Price in the store currency (e.g., "149.90")
    pub price: String,

    #[serde(default)]
    pub compare_at_price: Option<String>,

    #[serde(default)]
    pub images: Vec<String>,

    #[serde(default)]
    pub variants: Vec<VariantFixture>,

    #[serde(default)]
    pub stock: u32,

    #[serde(default)]
    pub featured: bool,
}

/// Variant Fixture
#[derive(Debug, Deserialize)]
pub struct VariantFixture {
    #[serde(default)]
    pub id: Option<VariantId>,

    pub name: String,
}

impl ProductFixture {
    fn into_new_product(self, currency: &'static Currency) -> Result<NewProduct, FixtureError> {
        let price = minor_units(&self.name, &self.price, currency)?;

        let compare_at_price = self
            .compare_at_price
            .as_deref()
            .map(|amount| minor_units(&self.name, amount, currency))
            .transpose()?;

        Ok(NewProduct {
            uuid: self.id,
            name: self.name,
            description: self.description,
            category: self.category,
            price,
            compare_at_price,
            images: self.images,
            variants: self
                .variants
                .into_iter()
                .map(|variant| NewVariant {
                    uuid: variant.id,
                    name: variant.name,
                })
                .collect(),
            stock: self.stock,
            featured: self.featured,
        })
    }
}

fn minor_units(name: &str, amount: &str, currency: &'static Currency) -> Result<u64, FixtureError> {
    let price = parse_amount(amount, currency).map_err(|source| FixtureError::Price {
        name: name.to_string(),
        source,
    })?;

    u64::try_from(price.to_minor_units())
        .map_err(|_err| FixtureError::NegativePrice(name.to_string()))
}

/// Parse a YAML catalog and add every product to `products`.
///
/// The whole document is validated before anything is created.
///
/// # Errors
///
/// Returns an error if the YAML is malformed, a price doesn't parse, or the products service
/// rejects a product.
pub async fn seed_catalog(
    products: &dyn ProductsService,
    yaml: &str,
    currency: &'static Currency,
) -> Result<Vec<Product>, FixtureError> {
    let fixture: CatalogFixture = serde_norway::from_str(yaml)?;

    let new_products = fixture
        .products
        .into_iter()
        .map(|product| product.into_new_product(currency))
        .collect::<Result<Vec<_>, _>>()?;

    let mut created = Vec::with_capacity(new_products.len());

    for product in new_products {
        created.push(products.create(product).await?);
    }

    debug!(products = created.len(), "catalog seeded");

    Ok(created)
}
