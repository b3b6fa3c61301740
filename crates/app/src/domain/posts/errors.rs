//! Posts service errors.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum PostsServiceError {
    #[error("post not found")]
    NotFound,

    #[error("missing required data: {0}")]
    MissingRequiredData(&'static str),
}
