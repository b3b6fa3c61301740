//! Biuty storefront services: catalog, orders, content, accounts, media, carts and checkout.

pub mod auth;
pub mod carts;
pub mod checkout;
pub mod config;
pub mod context;
pub mod domain;
pub mod fixtures;
pub mod observability;
pub mod slugs;
pub mod storage;
