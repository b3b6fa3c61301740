//! Blog Posts

pub mod errors;
pub mod models;
pub mod service;

pub use errors::PostsServiceError;
pub use service::*;
