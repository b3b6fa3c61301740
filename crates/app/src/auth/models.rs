//! Auth data models.

use std::{fmt, str::FromStr};

use biuty::uuids::TypedUuid;
use jiff::Timestamp;

use crate::auth::AuthServiceError;

/// User UUID
pub type UserUuid = TypedUuid<User>;

/// Something a signed-in user may want to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Access {
    /// Browse, keep a cart and place orders.
    Shop,

    /// See one's own order history.
    OwnOrders,

    /// Open the admin dashboard.
    Dashboard,

    /// Create, edit and delete products and upload their images.
    ManageCatalog,

    /// Change order and payment status.
    ManageOrders,

    /// Write, publish and archive blog posts.
    ManageContent,

    /// Promote or demote other users.
    ManageRoles,
}

/// What a user is allowed to do.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Role {
    #[default]
    Customer,
    Admin,
    SuperAdmin,
}

impl Role {
    /// Whether this role grants `access`.
    #[must_use]
    pub const fn permits(self, access: Access) -> bool {
        match access {
            Access::Shop | Access::OwnOrders => true,
            Access::Dashboard
            | Access::ManageCatalog
            | Access::ManageOrders
            | Access::ManageContent => matches!(self, Self::Admin | Self::SuperAdmin),
            Access::ManageRoles => matches!(self, Self::SuperAdmin),
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Customer => "customer",
            Self::Admin => "admin",
            Self::SuperAdmin => "super_admin",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = AuthServiceError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "customer" => Ok(Self::Customer),
            "admin" => Ok(Self::Admin),
            "super_admin" | "superadmin" => Ok(Self::SuperAdmin),
            _ => Err(AuthServiceError::UnknownRole(value.to_string())),
        }
    }
}

/// Account as seen by the rest of the app; never carries the password.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub uuid: UserUuid,
    pub name: String,

    /// Lower-cased email, unique across accounts
    pub email: String,
    pub role: Role,
    pub created_at: Timestamp,
}

impl User {
    #[must_use]
    pub const fn can(&self, access: Access) -> bool {
        self.role.permits(access)
    }
}

/// Sign-up form
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password: String,
}

/// Result of signing in, with the one-time raw session token.
#[derive(Debug, Clone)]
pub struct IssuedSession {
    pub token: String,
    pub user: User,
    pub expires_at: Timestamp,
}
