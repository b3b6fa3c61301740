//! App Context

use std::sync::Arc;

use biuty::prelude::PricingRules;
use thiserror::Error;
use tracing::info;

use crate::{
    auth::{AuthService, InMemoryAuthService},
    carts::{CartSession, CartStore, JsonFileCartStore},
    checkout::CheckoutService,
    config::{self, AppConfig, ConfigError},
    domain::{
        orders::{InMemoryOrdersService, OrdersService},
        posts::{InMemoryPostsService, PostsService},
        products::{InMemoryProductsService, ProductsService},
    },
    fixtures::{self, DEFAULT_CATALOG, FixtureError},
    storage::{BlobStorage, InMemoryBlobStorage},
};

#[derive(Debug, Error)]
pub enum AppInitError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("failed to load the catalog")]
    Fixture(#[from] FixtureError),
}

#[derive(Clone)]
pub struct AppContext {
    pub products: Arc<dyn ProductsService>,
    pub orders: Arc<dyn OrdersService>,
    pub posts: Arc<dyn PostsService>,
    pub auth: Arc<dyn AuthService>,
    pub storage: Arc<dyn BlobStorage>,
    pub checkout: Arc<CheckoutService>,
    pub rules: Arc<PricingRules>,
    pub cart_store: Arc<dyn CartStore>,
}

impl AppContext {
    /// Build an application context backed by in-memory services, seeded with the configured
    /// catalog. The cart is persisted to the configured JSON file.
    ///
    /// # Errors
    ///
    /// Returns an error if the pricing settings are invalid or the catalog can't be loaded.
    pub async fn in_memory(config: &AppConfig) -> Result<Self, AppInitError> {
        let rules = Arc::new(config.rules()?);

        let catalog = match &config.storage.catalog_file {
            Some(path) => config::read(path)?,
            None => DEFAULT_CATALOG.to_string(),
        };

        let products: Arc<dyn ProductsService> = Arc::new(InMemoryProductsService::new());
        let seeded = fixtures::seed_catalog(products.as_ref(), &catalog, rules.currency()).await?;

        let orders: Arc<dyn OrdersService> = Arc::new(InMemoryOrdersService::new());

        info!(products = seeded.len(), "storefront ready");

        Ok(Self {
            checkout: Arc::new(CheckoutService::new(
                Arc::clone(&products),
                Arc::clone(&orders),
            )),
            products,
            orders,
            posts: Arc::new(InMemoryPostsService::new()),
            auth: Arc::new(InMemoryAuthService::new()),
            storage: Arc::new(InMemoryBlobStorage::new(config.storage.media_base_url.clone())),
            rules,
            cart_store: Arc::new(JsonFileCartStore::new(config.storage.cart_file.clone())),
        })
    }

    /// Open the shopper's cart from the cart store.
    pub async fn open_cart(&self) -> CartSession {
        CartSession::open(Arc::clone(&self.cart_store), Arc::clone(&self.rules)).await
    }
}
