//! Orders service errors.

use thiserror::Error;

use crate::domain::orders::models::OrderStatus;

#[derive(Debug, Error)]
pub enum OrdersServiceError {
    #[error("order not found")]
    NotFound,

    #[error("an order needs at least one line")]
    EmptyOrder,

    #[error("order is {0} and can no longer change status")]
    TerminalStatus(OrderStatus),

    #[error("unknown order status: {0}")]
    UnknownStatus(String),
}
