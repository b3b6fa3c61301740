//! Orders service.

use std::cmp::Reverse;

use async_trait::async_trait;
use jiff::Timestamp;
use mockall::automock;
use rustc_hash::FxHashMap;
use tokio::sync::RwLock;
use tracing::info;

use crate::domain::{
    Page,
    orders::{
        errors::OrdersServiceError,
        models::{NewOrder, Order, OrderStats, OrderStatus, OrderUuid, PaymentStatus},
    },
};

/// Prefix of every order number.
pub const ORDER_NUMBER_PREFIX: &str = "BIU";

#[derive(Debug, Default)]
struct OrdersState {
    orders: FxHashMap<OrderUuid, Order>,
    last_number: u64,
}

/// Orders held in process memory.
#[derive(Debug, Default)]
pub struct InMemoryOrdersService {
    state: RwLock<OrdersState>,
}

impl InMemoryOrdersService {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

fn newest_first(orders: &mut [Order]) {
    orders.sort_by_key(|order| Reverse((order.created_at, order.uuid)));
}

#[async_trait]
impl OrdersService for InMemoryOrdersService {
    async fn create(&self, order: NewOrder) -> Result<Order, OrdersServiceError> {
        if order.lines.is_empty() {
            return Err(OrdersServiceError::EmptyOrder);
        }

        let mut state = self.state.write().await;
        let now = Timestamp::now();

        state.last_number += 1;

        let created = Order {
            uuid: OrderUuid::new(),
            number: format!("{ORDER_NUMBER_PREFIX}-{:06}", state.last_number),
            customer: order.customer,
            lines: order.lines,
            currency: order.currency,
            subtotal: order.subtotal,
            discount: order.discount,
            shipping: order.shipping,
            total: order.total,
            coupon_code: order.coupon_code,
            status: OrderStatus::Pending,
            payment_status: PaymentStatus::Pending,
            created_at: now,
            updated_at: now,
        };

        info!(number = %created.number, total = created.total, "order created");

        state.orders.insert(created.uuid, created.clone());

        Ok(created)
    }

    async fn get(&self, order: OrderUuid) -> Result<Order, OrdersServiceError> {
        self.state
            .read()
            .await
            .orders
            .get(&order)
            .cloned()
            .ok_or(OrdersServiceError::NotFound)
    }

    async fn get_by_number(&self, number: &str) -> Result<Order, OrdersServiceError> {
        self.state
            .read()
            .await
            .orders
            .values()
            .find(|order| order.number.eq_ignore_ascii_case(number.trim()))
            .cloned()
            .ok_or(OrdersServiceError::NotFound)
    }

    async fn list(
        &self,
        status: Option<OrderStatus>,
        page: usize,
        page_size: usize,
    ) -> Result<Page<Order>, OrdersServiceError> {
        let mut orders: Vec<Order> = self
            .state
            .read()
            .await
            .orders
            .values()
            .filter(|order| status.is_none_or(|status| order.status == status))
            .cloned()
            .collect();

        newest_first(&mut orders);

        Ok(Page::paginate(orders, page, page_size))
    }

    async fn list_for_customer(&self, email: &str) -> Result<Vec<Order>, OrdersServiceError> {
        let email = email.trim();

        let mut orders: Vec<Order> = self
            .state
            .read()
            .await
            .orders
            .values()
            .filter(|order| order.customer.email.eq_ignore_ascii_case(email))
            .cloned()
            .collect();

        newest_first(&mut orders);

        Ok(orders)
    }

    async fn update_status(
        &self,
        order: OrderUuid,
        status: OrderStatus,
    ) -> Result<Order, OrdersServiceError> {
        let mut state = self.state.write().await;

        let existing = state
            .orders
            .get_mut(&order)
            .ok_or(OrdersServiceError::NotFound)?;

        if existing.status.is_terminal() && existing.status != status {
            return Err(OrdersServiceError::TerminalStatus(existing.status));
        }

        info!(
            number = %existing.number,
            from = %existing.status,
            to = %status,
            "order status changed"
        );

        existing.status = status;
        existing.updated_at = Timestamp::now();

        Ok(existing.clone())
    }

    async fn update_payment_status(
        &self,
        order: OrderUuid,
        payment_status: PaymentStatus,
    ) -> Result<Order, OrdersServiceError> {
        let mut state = self.state.write().await;

        let existing = state
            .orders
            .get_mut(&order)
            .ok_or(OrdersServiceError::NotFound)?;

        existing.payment_status = payment_status;
        existing.updated_at = Timestamp::now();

        Ok(existing.clone())
    }

    async fn stats(&self) -> Result<OrderStats, OrdersServiceError> {
        let state = self.state.read().await;

        let mut stats = OrderStats {
            orders: state.orders.len(),
            ..OrderStats::default()
        };

        let mut paid: i64 = 0;

        for order in state.orders.values() {
            *stats.by_status.entry(order.status).or_default() += 1;

            if order.payment_status == PaymentStatus::Paid {
                stats.revenue = stats.revenue.saturating_add(order.total);
                paid += 1;
            }
        }

        if paid > 0 {
            stats.average_order_value = stats.revenue / paid;
        }

        Ok(stats)
    }
}

#[automock]
#[async_trait]
pub trait OrdersService: Send + Sync {
    /// Record a new pending order and give it the next order number.
    async fn create(&self, order: NewOrder) -> Result<Order, OrdersServiceError>;

    /// Retrieve a single order.
    async fn get(&self, order: OrderUuid) -> Result<Order, OrdersServiceError>;

    /// Retrieve an order by its number.
    async fn get_by_number(&self, number: &str) -> Result<Order, OrdersServiceError>;

    /// List one page of orders, newest first, optionally only those in `status`.
    async fn list(
        &self,
        status: Option<OrderStatus>,
        page: usize,
        page_size: usize,
    ) -> Result<Page<Order>, OrdersServiceError>;

    /// Orders placed with the given email, newest first.
    async fn list_for_customer(&self, email: &str) -> Result<Vec<Order>, OrdersServiceError>;

    /// Move an order to another fulfilment status.
    async fn update_status(
        &self,
        order: OrderUuid,
        status: OrderStatus,
    ) -> Result<Order, OrdersServiceError>;

    /// Change an order's payment status.
    async fn update_payment_status(
        &self,
        order: OrderUuid,
        payment_status: PaymentStatus,
    ) -> Result<Order, OrdersServiceError>;

    /// Dashboard figures across all orders.
    async fn stats(&self) -> Result<OrderStats, OrdersServiceError>;
}
