//! Order Models

use std::{fmt, str::FromStr};

use biuty::{
    cart::Cart,
    pricing::PricingError,
    products::{ProductId, VariantId},
    uuids::TypedUuid,
};
use jiff::Timestamp;
use rustc_hash::FxHashMap;

use crate::domain::orders::OrdersServiceError;

/// Order UUID
pub type OrderUuid = TypedUuid<Order>;

/// Order fulfilment status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OrderStatus {
    Pending,
    Processing,
    Shipped,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    /// Delivered and cancelled orders can't move to another status.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Delivered | Self::Cancelled)
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Processing => "processing",
            Self::Shipped => "shipped",
            Self::Delivered => "delivered",
            Self::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = OrdersServiceError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "pending" => Ok(Self::Pending),
            "processing" => Ok(Self::Processing),
            "shipped" => Ok(Self::Shipped),
            "delivered" => Ok(Self::Delivered),
            "cancelled" | "canceled" => Ok(Self::Cancelled),
            _ => Err(OrdersServiceError::UnknownStatus(value.to_string())),
        }
    }
}

/// Payment status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PaymentStatus {
    Pending,
    Paid,
    Failed,
    Refunded,
}

/// Who the order ships to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Customer {
    pub name: String,
    pub email: String,
    pub address: String,
}

/// Order line, frozen at the price the cart charged
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderLine {
    pub product_uuid: ProductId,
    pub variant_uuid: Option<VariantId>,
    pub name: String,
    pub slug: String,
    pub quantity: u32,

    /// Unit price in minor units
    pub unit_price: i64,

    /// Line total in minor units
    pub total: i64,
}

/// Order Model
#[derive(Debug, Clone, PartialEq)]
pub struct Order {
    pub uuid: OrderUuid,

    /// Human-facing sequential number, `BIU-000001`
    pub number: String,
    pub customer: Customer,
    pub lines: Vec<OrderLine>,
    pub currency: String,
    pub subtotal: i64,
    pub discount: i64,
    pub shipping: i64,
    pub total: i64,
    pub coupon_code: Option<String>,
    pub status: OrderStatus,
    pub payment_status: PaymentStatus,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// New Order Model
#[derive(Debug, Clone, PartialEq)]
pub struct NewOrder {
    pub customer: Customer,
    pub lines: Vec<OrderLine>,
    pub currency: String,
    pub subtotal: i64,
    pub discount: i64,
    pub shipping: i64,
    pub total: i64,
    pub coupon_code: Option<String>,
}

impl NewOrder {
    /// Freeze a cart and its summary into an order.
    ///
    /// # Errors
    ///
    /// Returns an error if the cart can't be priced.
    pub fn from_cart(customer: Customer, cart: &Cart) -> Result<Self, PricingError> {
        let summary = cart.summary()?;

        let lines = cart
            .lines()
            .iter()
            .map(|line| {
                Ok(OrderLine {
                    product_uuid: line.product_id(),
                    variant_uuid: line.variant_id(),
                    name: line.name().to_string(),
                    slug: line.slug().to_string(),
                    quantity: line.quantity(),
                    unit_price: line.unit_price().to_minor_units(),
                    total: line.total_minor()?,
                })
            })
            .collect::<Result<Vec<_>, PricingError>>()?;

        Ok(Self {
            customer,
            lines,
            currency: cart.currency().iso_alpha_code.to_string(),
            subtotal: summary.subtotal.to_minor_units(),
            discount: summary.discount.to_minor_units(),
            shipping: summary.shipping.to_minor_units(),
            total: summary.total.to_minor_units(),
            coupon_code: summary.coupon_code,
        })
    }
}

/// Order dashboard figures
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OrderStats {
    pub orders: usize,
    pub by_status: FxHashMap<OrderStatus, usize>,

    /// Sum of paid order totals in minor units
    pub revenue: i64,

    /// Mean paid order total in minor units
    pub average_order_value: i64,
}

impl OrderStats {
    /// Orders currently in `status`.
    #[must_use]
    pub fn count(&self, status: OrderStatus) -> usize {
        self.by_status.get(&status).copied().unwrap_or(0)
    }
}
