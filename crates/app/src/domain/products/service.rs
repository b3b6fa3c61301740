//! Products service.

use std::cmp::Reverse;

use async_trait::async_trait;
use biuty::products::ProductId;
use jiff::Timestamp;
use mockall::automock;
use rustc_hash::FxHashMap;
use tokio::sync::RwLock;
use tracing::debug;

use crate::{
    domain::{
        Page,
        products::{
            errors::ProductsServiceError,
            models::{
                NewProduct, Product, ProductFilters, ProductSort, ProductUpdate, ProductVariant,
            },
        },
    },
    slugs::{fold, slugify, unique_slug},
};

/// Products held in process memory.
#[derive(Debug, Default)]
pub struct InMemoryProductsService {
    products: RwLock<FxHashMap<ProductId, Product>>,
}

impl InMemoryProductsService {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

fn sort_products(products: &mut [Product], sort: ProductSort) {
    match sort {
        ProductSort::Newest => {
            products.sort_by_key(|product| Reverse((product.created_at, product.uuid)));
        }
        ProductSort::PriceAscending => products.sort_by_key(|product| product.price),
        ProductSort::PriceDescending => products.sort_by_key(|product| Reverse(product.price)),
        ProductSort::Name => products.sort_by_cached_key(|product| fold(&product.name)),
        ProductSort::BestSelling => {
            products.sort_by_key(|product| Reverse(product.sales_count));
        }
    }
}

fn take_sorted(
    products: &FxHashMap<ProductId, Product>,
    keep: impl Fn(&Product) -> bool,
    sort: ProductSort,
    limit: usize,
) -> Vec<Product> {
    let mut selected: Vec<Product> = products
        .values()
        .filter(|&product| keep(product))
        .cloned()
        .collect();

    sort_products(&mut selected, sort);
    selected.truncate(limit);

    selected
}

fn slug_for(
    products: &FxHashMap<ProductId, Product>,
    name: &str,
    except: Option<ProductId>,
) -> String {
    unique_slug(&slugify(name), |candidate| {
        products
            .values()
            .any(|product| product.slug == candidate && Some(product.uuid) != except)
    })
}

#[async_trait]
impl ProductsService for InMemoryProductsService {
    async fn get_by_id(&self, product: ProductId) -> Result<Product, ProductsServiceError> {
        self.products
            .read()
            .await
            .get(&product)
            .cloned()
            .ok_or(ProductsServiceError::NotFound)
    }

    async fn get_by_slug(&self, slug: &str) -> Result<Product, ProductsServiceError> {
        self.products
            .read()
            .await
            .values()
            .find(|product| product.slug == slug)
            .cloned()
            .ok_or(ProductsServiceError::NotFound)
    }

    async fn list(
        &self,
        filters: ProductFilters,
        page: usize,
        page_size: usize,
    ) -> Result<Page<Product>, ProductsServiceError> {
        let products = self.products.read().await;

        let matching = take_sorted(
            &products,
            |product| filters.matches(product),
            filters.sort,
            usize::MAX,
        );

        Ok(Page::paginate(matching, page, page_size))
    }

    async fn featured(&self, limit: usize) -> Result<Vec<Product>, ProductsServiceError> {
        let products = self.products.read().await;

        Ok(take_sorted(
            &products,
            |product| product.featured,
            ProductSort::Newest,
            limit,
        ))
    }

    async fn new_arrivals(&self, limit: usize) -> Result<Vec<Product>, ProductsServiceError> {
        let products = self.products.read().await;

        Ok(take_sorted(&products, |_| true, ProductSort::Newest, limit))
    }

    async fn best_sellers(&self, limit: usize) -> Result<Vec<Product>, ProductsServiceError> {
        let products = self.products.read().await;

        Ok(take_sorted(
            &products,
            |product| product.sales_count > 0,
            ProductSort::BestSelling,
            limit,
        ))
    }

    async fn search(&self, query: &str) -> Result<Vec<Product>, ProductsServiceError> {
        let needle = fold(query.trim());

        if needle.is_empty() {
            return Ok(Vec::new());
        }

        let products = self.products.read().await;

        Ok(take_sorted(
            &products,
            |product| {
                fold(&product.name).contains(&needle)
                    || fold(&product.category).contains(&needle)
                    || fold(&product.description).contains(&needle)
            },
            ProductSort::Name,
            usize::MAX,
        ))
    }

    async fn create(&self, product: NewProduct) -> Result<Product, ProductsServiceError> {
        if product.name.trim().is_empty() {
            return Err(ProductsServiceError::MissingRequiredData("name"));
        }

        let mut products = self.products.write().await;

        let uuid = product.uuid.unwrap_or_default();

        if products.contains_key(&uuid) {
            return Err(ProductsServiceError::AlreadyExists(uuid));
        }

        let now = Timestamp::now();

        let created = Product {
            uuid,
            slug: slug_for(&products, &product.name, None),
            name: product.name.trim().to_string(),
            description: product.description,
            category: product.category,
            price: product.price,
            compare_at_price: product.compare_at_price,
            images: product.images,
            variants: product
                .variants
                .into_iter()
                .map(|variant| ProductVariant {
                    uuid: variant.uuid.unwrap_or_default(),
                    name: variant.name,
                })
                .collect(),
            stock: product.stock,
            featured: product.featured,
            sales_count: 0,
            created_at: now,
            updated_at: now,
        };

        debug!(slug = %created.slug, "created product");

        products.insert(created.uuid, created.clone());

        Ok(created)
    }

    async fn update(
        &self,
        product: ProductId,
        update: ProductUpdate,
    ) -> Result<Product, ProductsServiceError> {
        let mut products = self.products.write().await;

        let slug = match update.name.as_deref() {
            Some(name) if name.trim().is_empty() => {
                return Err(ProductsServiceError::MissingRequiredData("name"));
            }
            Some(name) => Some(slug_for(&products, name, Some(product))),
            None => None,
        };

        let existing = products
            .get_mut(&product)
            .ok_or(ProductsServiceError::NotFound)?;

        if let Some(name) = update.name {
            existing.name = name.trim().to_string();
        }

        if let Some(slug) = slug {
            existing.slug = slug;
        }

        if let Some(description) = update.description {
            existing.description = description;
        }

        if let Some(category) = update.category {
            existing.category = category;
        }

        if let Some(price) = update.price {
            existing.price = price;
        }

        if let Some(compare_at_price) = update.compare_at_price {
            existing.compare_at_price = compare_at_price;
        }

        if let Some(images) = update.images {
            existing.images = images;
        }

        if let Some(featured) = update.featured {
            existing.featured = featured;
        }

        existing.updated_at = Timestamp::now();

        Ok(existing.clone())
    }

    async fn update_stock(
        &self,
        product: ProductId,
        delta: i64,
    ) -> Result<Product, ProductsServiceError> {
        let mut products = self.products.write().await;

        let existing = products
            .get_mut(&product)
            .ok_or(ProductsServiceError::NotFound)?;

        let stock = i64::from(existing.stock)
            .checked_add(delta)
            .ok_or(ProductsServiceError::StockOutOfRange)?;

        if stock < 0 {
            return Err(ProductsServiceError::InsufficientStock {
                requested: delta.unsigned_abs(),
                available: existing.stock,
            });
        }

        existing.stock = u32::try_from(stock).map_err(|_| ProductsServiceError::StockOutOfRange)?;
        existing.updated_at = Timestamp::now();

        debug!(slug = %existing.slug, stock = existing.stock, "updated stock");

        Ok(existing.clone())
    }

    async fn record_sale(
        &self,
        product: ProductId,
        quantity: u32,
    ) -> Result<(), ProductsServiceError> {
        let mut products = self.products.write().await;

        let existing = products
            .get_mut(&product)
            .ok_or(ProductsServiceError::NotFound)?;

        existing.sales_count = existing.sales_count.saturating_add(u64::from(quantity));

        Ok(())
    }

    async fn delete(&self, product: ProductId) -> Result<(), ProductsServiceError> {
        self.products
            .write()
            .await
            .remove(&product)
            .map(|_| ())
            .ok_or(ProductsServiceError::NotFound)
    }
}

#[automock]
#[async_trait]
pub trait ProductsService: Send + Sync {
    /// Retrieve a single product.
    async fn get_by_id(&self, product: ProductId) -> Result<Product, ProductsServiceError>;

    /// Retrieve a product by its URL slug.
    async fn get_by_slug(&self, slug: &str) -> Result<Product, ProductsServiceError>;

    /// List one page of products matching the filters.
    async fn list(
        &self,
        filters: ProductFilters,
        page: usize,
        page_size: usize,
    ) -> Result<Page<Product>, ProductsServiceError>;

    /// Featured products, newest first.
    async fn featured(&self, limit: usize) -> Result<Vec<Product>, ProductsServiceError>;

    /// Most recently added products.
    async fn new_arrivals(&self, limit: usize) -> Result<Vec<Product>, ProductsServiceError>;

    /// Products that have sold at least once, most sold first.
    async fn best_sellers(&self, limit: usize) -> Result<Vec<Product>, ProductsServiceError>;

    /// Products whose name, category or description contains the query, ignoring case and
    /// accents.
    async fn search(&self, query: &str) -> Result<Vec<Product>, ProductsServiceError>;

    /// Create a product with a unique slug derived from its name.
    async fn create(&self, product: NewProduct) -> Result<Product, ProductsServiceError>;

    /// Update a product.
    async fn update(
        &self,
        product: ProductId,
        update: ProductUpdate,
    ) -> Result<Product, ProductsServiceError>;

    /// Add `delta` units (negative to take away) to a product's stock.
    async fn update_stock(
        &self,
        product: ProductId,
        delta: i64,
    ) -> Result<Product, ProductsServiceError>;

    /// Count `quantity` sold units towards a product's best-seller ranking.
    async fn record_sale(
        &self,
        product: ProductId,
        quantity: u32,
    ) -> Result<(), ProductsServiceError>;

    /// Delete a product.
    async fn delete(&self, product: ProductId) -> Result<(), ProductsServiceError>;
}
