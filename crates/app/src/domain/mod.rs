//! Biuty Domain Concerns

pub mod orders;
pub mod pagination;
pub mod posts;
pub mod products;

pub use pagination::Page;
