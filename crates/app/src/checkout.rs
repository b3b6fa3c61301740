//! Checkout
//!
//! Turns a cart session into an order. Stock is checked for every product before the order is
//! recorded; once it is recorded, stock and sales bookkeeping failures are logged rather than
//! undoing the order.

use std::sync::Arc;

use biuty::prelude::{PricingError, ProductId};
use rustc_hash::FxHashMap;
use thiserror::Error;
use tracing::{info, warn};

use crate::{
    carts::CartSession,
    domain::{
        orders::{
            OrdersService, OrdersServiceError,
            models::{Customer, NewOrder, Order},
        },
        products::{ProductsService, ProductsServiceError},
    },
};

#[derive(Debug, Error)]
pub enum CheckoutError {
    #[error("your cart is empty")]
    EmptyCart,

    #[error("missing customer {0}")]
    MissingCustomerDetails(&'static str),

    #[error("{0} is no longer available")]
    ProductUnavailable(String),

    #[error("only {available} of {name} left, {requested} in cart")]
    OutOfStock {
        name: String,
        requested: u64,
        available: u32,
    },

    #[error(transparent)]
    Products(#[from] ProductsServiceError),

    #[error(transparent)]
    Orders(#[from] OrdersServiceError),

    #[error(transparent)]
    Pricing(#[from] PricingError),
}

#[derive(Clone)]
pub struct CheckoutService {
    products: Arc<dyn ProductsService>,
    orders: Arc<dyn OrdersService>,
}

fn check_customer(customer: &Customer) -> Result<(), CheckoutError> {
    let fields = [
        ("name", &customer.name),
        ("email", &customer.email),
        ("address", &customer.address),
    ];

    match fields.iter().find(|(_, value)| value.trim().is_empty()) {
        Some((field, _)) => Err(CheckoutError::MissingCustomerDetails(*field)),
        None => Ok(()),
    }
}

impl CheckoutService {
    #[must_use]
    pub fn new(products: Arc<dyn ProductsService>, orders: Arc<dyn OrdersService>) -> Self {
        Self { products, orders }
    }

    /// Place an order for everything in the cart and empty it.
    ///
    /// # Errors
    ///
    /// Returns an error if the cart is empty, a product is gone or short on stock, or the order
    /// can't be recorded. The cart is left untouched then.
    pub async fn place_order(
        &self,
        session: &mut CartSession,
        customer: Customer,
    ) -> Result<Order, CheckoutError> {
        let cart = session.cart();

        if cart.is_empty() {
            return Err(CheckoutError::EmptyCart);
        }

        check_customer(&customer)?;

        let mut wanted: FxHashMap<ProductId, u64> = FxHashMap::default();

        for line in cart.lines() {
            *wanted.entry(line.product_id()).or_default() += u64::from(line.quantity());
        }

        for line in cart.lines() {
            let product = match self.products.get_by_id(line.product_id()).await {
                Ok(product) => product,
                Err(ProductsServiceError::NotFound) => {
                    return Err(CheckoutError::ProductUnavailable(line.name().to_string()));
                }
                Err(error) => return Err(error.into()),
            };

            let requested = wanted.get(&product.uuid).copied().unwrap_or(0);

            if requested > u64::from(product.stock) {
                return Err(CheckoutError::OutOfStock {
                    name: product.name,
                    requested,
                    available: product.stock,
                });
            }
        }

        let order = self
            .orders
            .create(NewOrder::from_cart(customer, cart)?)
            .await?;

        for line in &order.lines {
            let sold = i64::from(line.quantity);

            let product = line.product_uuid;

            if let Err(error) = self.products.update_stock(product, -sold).await {
                warn!(%error, order = %order.number, %product, "stock not decremented");
            }

            if let Err(error) = self.products.record_sale(product, line.quantity).await {
                warn!(%error, order = %order.number, %product, "sale not recorded");
            }
        }

        session.clear().await;

        info!(order = %order.number, total = order.total, "order placed");

        Ok(order)
    }
}
