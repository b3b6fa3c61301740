//! Products service errors.

use std::num::TryFromIntError;

use biuty::products::ProductId;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProductsServiceError {
    #[error("product not found")]
    NotFound,

    #[error("product {0} already exists")]
    AlreadyExists(ProductId),

    #[error("missing required data: {0}")]
    MissingRequiredData(&'static str),

    #[error("not enough stock: {available} left, {requested} requested")]
    InsufficientStock { requested: u64, available: u32 },

    #[error("stock level out of range")]
    StockOutOfRange,

    #[error("invalid price value")]
    InvalidPrice(#[from] TryFromIntError),
}
