//! Auth service.

use async_trait::async_trait;
use jiff::{SignedDuration, Timestamp};
use mockall::automock;
use rustc_hash::FxHashMap;
use tokio::sync::RwLock;
use tracing::{debug, info};
use uuid::Uuid;

use crate::auth::{
    Access, AuthServiceError, IssuedSession, NewUser, PasswordDigest, Role, SessionTokenVersion,
    TokenSecret, User, UserUuid, format_session_token, parse_session_token,
};

/// Shortest accepted password, in characters.
pub const MIN_PASSWORD_LENGTH: usize = 8;

const SESSION_TTL: SignedDuration = SignedDuration::from_hours(24 * 30);
const RESET_TTL: SignedDuration = SignedDuration::from_hours(1);

#[derive(Debug)]
struct Account {
    user: User,
    password: PasswordDigest,
}

/// Issued session or password reset token, stored as a digest of its secret.
#[derive(Debug)]
struct TokenRecord {
    user: UserUuid,
    secret_digest: String,
    expires_at: Timestamp,
}

#[derive(Debug, Default)]
struct AuthState {
    accounts: FxHashMap<UserUuid, Account>,
    sessions: FxHashMap<Uuid, TokenRecord>,
    resets: FxHashMap<Uuid, TokenRecord>,
}

impl AuthState {
    fn account_by_email(&self, email: &str) -> Option<&Account> {
        self.accounts
            .values()
            .find(|account| account.user.email == email)
    }
}

/// Issue a token for `user`, returning the raw token and its record.
fn issue_token(user: UserUuid, ttl: SignedDuration) -> (Uuid, String, TokenRecord) {
    let token_uuid = Uuid::now_v7();
    let secret = TokenSecret::generate();
    let token = format_session_token(token_uuid, SessionTokenVersion::V1, &secret);

    let record = TokenRecord {
        user,
        secret_digest: secret.digest(),
        expires_at: Timestamp::now() + ttl,
    };

    (token_uuid, token, record)
}

/// Find the live record a raw token refers to, dropping it if it has expired.
fn redeem(
    records: &mut FxHashMap<Uuid, TokenRecord>,
    token: &str,
) -> Result<Option<(Uuid, UserUuid)>, AuthServiceError> {
    let parsed = parse_session_token(token)?;

    let Some(record) = records.get(&parsed.token_uuid) else {
        return Ok(None);
    };

    if record.secret_digest != parsed.secret.digest() {
        return Ok(None);
    }

    if record.expires_at <= Timestamp::now() {
        records.remove(&parsed.token_uuid);

        return Ok(None);
    }

    Ok(Some((parsed.token_uuid, record.user)))
}

fn normalize_email(email: &str) -> Result<String, AuthServiceError> {
    let email = email.trim().to_lowercase();

    let valid = email.split_once('@').is_some_and(|(local, domain)| {
        !local.is_empty()
            && domain.contains('.')
            && !domain.starts_with('.')
            && !domain.ends_with('.')
    });

    if valid && !email.contains(char::is_whitespace) {
        Ok(email)
    } else {
        Err(AuthServiceError::InvalidEmail)
    }
}

fn check_password(password: &str) -> Result<(), AuthServiceError> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(AuthServiceError::WeakPassword(MIN_PASSWORD_LENGTH));
    }

    Ok(())
}

/// Accounts and sessions held in process memory.
#[derive(Debug)]
pub struct InMemoryAuthService {
    state: RwLock<AuthState>,
    session_ttl: SignedDuration,
}

impl Default for InMemoryAuthService {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryAuthService {
    #[must_use]
    pub fn new() -> Self {
        Self::with_session_ttl(SESSION_TTL)
    }

    #[must_use]
    pub fn with_session_ttl(session_ttl: SignedDuration) -> Self {
        Self {
            state: RwLock::default(),
            session_ttl,
        }
    }

    /// Create an account with a given role, bypassing the customer-only sign-up.
    ///
    /// # Errors
    ///
    /// Returns an error under the same rules as sign-up.
    pub async fn seed_user(&self, user: NewUser, role: Role) -> Result<User, AuthServiceError> {
        let name = user.name.trim().to_string();

        if name.is_empty() {
            return Err(AuthServiceError::MissingName);
        }

        let email = normalize_email(&user.email)?;

        check_password(&user.password)?;

        let password = PasswordDigest::new(&user.password)?;

        let mut state = self.state.write().await;

        if state.account_by_email(&email).is_some() {
            return Err(AuthServiceError::EmailTaken);
        }

        let created = User {
            uuid: UserUuid::new(),
            name,
            email,
            role,
            created_at: Timestamp::now(),
        };

        state.accounts.insert(
            created.uuid,
            Account {
                user: created.clone(),
                password,
            },
        );

        debug!(user = %created.uuid, %role, "account created");

        Ok(created)
    }
}

#[async_trait]
impl AuthService for InMemoryAuthService {
    async fn sign_up(&self, user: NewUser) -> Result<User, AuthServiceError> {
        self.seed_user(user, Role::Customer).await
    }

    async fn sign_in(
        &self,
        email: &str,
        password: &str,
    ) -> Result<IssuedSession, AuthServiceError> {
        let email = email.trim().to_lowercase();
        let mut state = self.state.write().await;

        let user = state
            .account_by_email(&email)
            .filter(|account| account.password.verify(password))
            .map(|account| account.user.clone())
            .ok_or(AuthServiceError::InvalidCredentials)?;

        let (token_uuid, token, record) = issue_token(user.uuid, self.session_ttl);
        let expires_at = record.expires_at;

        state.sessions.insert(token_uuid, record);

        info!(user = %user.uuid, "signed in");

        Ok(IssuedSession {
            token,
            user,
            expires_at,
        })
    }

    async fn sign_out(&self, token: &str) -> Result<(), AuthServiceError> {
        let mut state = self.state.write().await;

        if let Some((token_uuid, user)) = redeem(&mut state.sessions, token)? {
            state.sessions.remove(&token_uuid);

            info!(%user, "signed out");
        }

        Ok(())
    }

    async fn current_user(&self, token: &str) -> Result<User, AuthServiceError> {
        let mut state = self.state.write().await;

        let (_, user) =
            redeem(&mut state.sessions, token)?.ok_or(AuthServiceError::Unauthenticated)?;

        state
            .accounts
            .get(&user)
            .map(|account| account.user.clone())
            .ok_or(AuthServiceError::Unauthenticated)
    }

    async fn authorize(&self, token: &str, access: Access) -> Result<User, AuthServiceError> {
        let user = self.current_user(token).await?;

        if !user.can(access) {
            return Err(AuthServiceError::Forbidden(access));
        }

        Ok(user)
    }

    async fn request_password_reset(
        &self,
        email: &str,
    ) -> Result<Option<String>, AuthServiceError> {
        let email = email.trim().to_lowercase();
        let mut state = self.state.write().await;

        let Some(user) = state.account_by_email(&email).map(|account| account.user.uuid) else {
            debug!("password reset requested for unknown email");

            return Ok(None);
        };

        state.resets.retain(|_, record| record.user != user);

        let (token_uuid, token, record) = issue_token(user, RESET_TTL);

        state.resets.insert(token_uuid, record);

        Ok(Some(token))
    }

    async fn reset_password(&self, token: &str, password: &str) -> Result<(), AuthServiceError> {
        check_password(password)?;

        let digest = PasswordDigest::new(password)?;

        let mut state = self.state.write().await;

        let (token_uuid, user) = redeem(&mut state.resets, token)
            .ok()
            .flatten()
            .ok_or(AuthServiceError::InvalidResetToken)?;

        let account = state
            .accounts
            .get_mut(&user)
            .ok_or(AuthServiceError::UserNotFound)?;

        account.password = digest;

        state.resets.remove(&token_uuid);
        state.sessions.retain(|_, record| record.user != user);

        info!(%user, "password reset, sessions revoked");

        Ok(())
    }

    async fn set_role(
        &self,
        actor_token: &str,
        user: UserUuid,
        role: Role,
    ) -> Result<User, AuthServiceError> {
        let actor = self.authorize(actor_token, Access::ManageRoles).await?;

        let mut state = self.state.write().await;

        let account = state
            .accounts
            .get_mut(&user)
            .ok_or(AuthServiceError::UserNotFound)?;

        account.user.role = role;

        info!(actor = %actor.uuid, %user, %role, "role changed");

        Ok(account.user.clone())
    }
}

#[automock]
#[async_trait]
pub trait AuthService: Send + Sync {
    /// Register a customer account.
    async fn sign_up(&self, user: NewUser) -> Result<User, AuthServiceError>;

    /// Check credentials and open a session.
    async fn sign_in(&self, email: &str, password: &str)
    -> Result<IssuedSession, AuthServiceError>;

    /// End a session. Unknown tokens are ignored.
    async fn sign_out(&self, token: &str) -> Result<(), AuthServiceError>;

    /// The user a session token belongs to.
    async fn current_user(&self, token: &str) -> Result<User, AuthServiceError>;

    /// The session's user, provided their role grants `access`.
    async fn authorize(&self, token: &str, access: Access) -> Result<User, AuthServiceError>;

    /// Issue a one-hour password reset token, or nothing when no account uses `email`.
    async fn request_password_reset(
        &self,
        email: &str,
    ) -> Result<Option<String>, AuthServiceError>;

    /// Set a new password with a reset token and sign the user out everywhere.
    async fn reset_password(&self, token: &str, password: &str) -> Result<(), AuthServiceError>;

    /// Change another user's role. Only super admins may do this.
    async fn set_role(
        &self,
        actor_token: &str,
        user: UserUuid,
        role: Role,
    ) -> Result<User, AuthServiceError>;
}
