//! Auth service errors.

use thiserror::Error;

use crate::auth::{Access, SessionTokenError};

#[derive(Debug, Error)]
pub enum AuthServiceError {
    #[error("an account with this email already exists")]
    EmailTaken,

    #[error("email address is invalid")]
    InvalidEmail,

    #[error("name is required")]
    MissingName,

    #[error("password must have at least {0} characters")]
    WeakPassword(usize),

    #[error("email or password is incorrect")]
    InvalidCredentials,

    #[error("not signed in")]
    Unauthenticated,

    #[error("not allowed: {0:?}")]
    Forbidden(Access),

    #[error("password reset link is invalid or expired")]
    InvalidResetToken,

    #[error("user not found")]
    UserNotFound,

    #[error("unknown role: {0}")]
    UnknownRole(String),

    #[error("session token processing error")]
    Token(#[from] SessionTokenError),

    #[error("password hashing failed")]
    PasswordHash(#[from] argon2::password_hash::Error),
}
