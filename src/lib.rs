//! Biuty
//!
//! Cart and pricing core for the Biuty storefront: line items keyed by product variant, a single
//! coupon per cart, and a flat shipping fee that becomes free above a subtotal threshold.

pub mod cart;
pub mod coupons;
pub mod discounts;
pub mod money;
pub mod prelude;
pub mod pricing;
pub mod products;
pub mod shipping;
pub mod summary;
pub mod uuids;
