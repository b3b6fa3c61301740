//! Carts

mod session;
mod store;

pub use session::CartSession;
pub use store::*;
