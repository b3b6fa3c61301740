//! Session token formatting and parsing, password digests.

use std::{fmt, fmt::Write as _, str::FromStr};

use argon2::{
    Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
    password_hash::{self, SaltString},
};
use rand::{RngCore, rngs::OsRng};
use sha2::{Digest, Sha256};
use thiserror::Error;
use uuid::Uuid;
use zeroize::Zeroize;

/// Session token prefix.
pub const SESSION_TOKEN_PREFIX: &str = "bt";

/// Number of secret bytes encoded in a session token.
pub const TOKEN_SECRET_BYTES: usize = 32;

/// Number of random salt bytes mixed into a password hash.
pub const PASSWORD_SALT_BYTES: usize = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionTokenVersion {
    V1,
}

impl SessionTokenVersion {
    #[must_use]
    pub const fn segment(self) -> &'static str {
        match self {
            Self::V1 => "v1",
        }
    }
}

impl FromStr for SessionTokenVersion {
    type Err = SessionTokenError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "v1" => Ok(Self::V1),
            _ => Err(SessionTokenError::UnsupportedVersion),
        }
    }
}

/// Random secret half of a token. Wiped on drop.
#[derive(Clone)]
pub struct TokenSecret {
    bytes: [u8; TOKEN_SECRET_BYTES],
}

impl TokenSecret {
    #[must_use]
    pub fn generate() -> Self {
        let mut bytes = [0_u8; TOKEN_SECRET_BYTES];

        OsRng.fill_bytes(&mut bytes);

        Self { bytes }
    }

    #[must_use]
    pub const fn from_bytes(bytes: [u8; TOKEN_SECRET_BYTES]) -> Self {
        Self { bytes }
    }

    /// SHA-256 digest of the secret, the only form that is stored.
    #[must_use]
    pub fn digest(&self) -> String {
        format!("{:x}", Sha256::digest(self.bytes))
    }

    fn to_hex(&self) -> String {
        encode_hex(&self.bytes)
    }
}

impl fmt::Debug for TokenSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("TokenSecret(**redacted**)")
    }
}

impl Drop for TokenSecret {
    fn drop(&mut self) {
        self.bytes.zeroize();
    }
}

#[derive(Debug, Clone)]
pub struct ParsedSessionToken {
    pub token_uuid: Uuid,
    pub version: SessionTokenVersion,
    pub secret: TokenSecret,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SessionTokenError {
    #[error("session token format is invalid")]
    InvalidFormat,

    #[error("session token uses an unsupported version")]
    UnsupportedVersion,

    #[error("session token secret encoding is invalid")]
    InvalidSecretEncoding,
}

/// `bt_v1_<uuid>.<hex secret>`
#[must_use]
pub fn format_session_token(
    token_uuid: Uuid,
    version: SessionTokenVersion,
    secret: &TokenSecret,
) -> String {
    format!(
        "{SESSION_TOKEN_PREFIX}_{}_{}.{}",
        version.segment(),
        token_uuid.simple(),
        secret.to_hex()
    )
}

/// Split a session token into its id and secret.
///
/// # Errors
///
/// Returns an error when the prefix, version, id or secret encoding is wrong.
pub fn parse_session_token(token: &str) -> Result<ParsedSessionToken, SessionTokenError> {
    let (head, secret_hex) = token
        .trim()
        .split_once('.')
        .ok_or(SessionTokenError::InvalidFormat)?;

    let mut parts = head.splitn(3, '_');

    let (Some(prefix), Some(version), Some(token_uuid)) = (parts.next(), parts.next(), parts.next())
    else {
        return Err(SessionTokenError::InvalidFormat);
    };

    if prefix != SESSION_TOKEN_PREFIX {
        return Err(SessionTokenError::InvalidFormat);
    }

    let version = SessionTokenVersion::from_str(version)?;
    let token_uuid = Uuid::try_parse(token_uuid).map_err(|_| SessionTokenError::InvalidFormat)?;

    let bytes: [u8; TOKEN_SECRET_BYTES] = decode_hex(secret_hex)
        .and_then(|bytes| bytes.try_into().ok())
        .ok_or(SessionTokenError::InvalidSecretEncoding)?;

    Ok(ParsedSessionToken {
        token_uuid,
        version,
        secret: TokenSecret::from_bytes(bytes),
    })
}

/// Argon2id hash of a password in PHC string form, parameters and salt included.
#[derive(Clone, PartialEq, Eq)]
pub struct PasswordDigest {
    hash: String,
}

impl PasswordDigest {
    /// Hash a password under a fresh random salt.
    ///
    /// # Errors
    ///
    /// Returns an error if the password can't be hashed, e.g. when it exceeds Argon2's limits.
    pub fn new(password: &str) -> Result<Self, password_hash::Error> {
        let mut salt = [0_u8; PASSWORD_SALT_BYTES];

        OsRng.fill_bytes(&mut salt);

        let salt = SaltString::encode_b64(&salt)?;
        let hash = Argon2::default().hash_password(password.as_bytes(), &salt)?;

        Ok(Self {
            hash: hash.to_string(),
        })
    }

    /// Whether `password` matches the stored hash.
    #[must_use]
    pub fn verify(&self, password: &str) -> bool {
        PasswordHash::new(&self.hash).is_ok_and(|hash| {
            Argon2::default()
                .verify_password(password.as_bytes(), &hash)
                .is_ok()
        })
    }

    /// The PHC string, e.g. `$argon2id$v=19$m=19456,t=2,p=1$...`.
    #[must_use]
    pub fn as_phc(&self) -> &str {
        &self.hash
    }
}

impl fmt::Debug for PasswordDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PasswordDigest(**redacted**)")
    }
}

fn encode_hex(bytes: &[u8]) -> String {
    bytes
        .iter()
        .fold(String::with_capacity(bytes.len() * 2), |mut out, byte| {
            let _ = write!(out, "{byte:02x}");
            out
        })
}

fn decode_hex(hex: &str) -> Option<Vec<u8>> {
    if hex.len() % 2 != 0 || !hex.is_ascii() {
        return None;
    }

    hex.as_bytes()
        .chunks_exact(2)
        .map(|pair| {
            let pair = std::str::from_utf8(pair).ok()?;
            u8::from_str_radix(pair, 16).ok()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use super::*;

    #[test]
    fn formatted_token_parses_back_to_same_secret() -> TestResult {
        let token_uuid = Uuid::now_v7();
        let secret = TokenSecret::generate();
        let token = format_session_token(token_uuid, SessionTokenVersion::V1, &secret);

        assert!(token.starts_with("bt_v1_"), "{token}");

        let parsed = parse_session_token(&token)?;

        assert_eq!(parsed.token_uuid, token_uuid);
        assert_eq!(parsed.secret.digest(), secret.digest());

        Ok(())
    }

    #[test]
    fn parse_rejects_malformed_tokens() {
        let secret = "ab".repeat(TOKEN_SECRET_BYTES);
        let uuid = Uuid::nil().simple();

        assert_eq!(
            parse_session_token(&format!("lt_v1_{uuid}.{secret}")).err(),
            Some(SessionTokenError::InvalidFormat)
        );
        assert_eq!(
            parse_session_token(&format!("bt_v9_{uuid}.{secret}")).err(),
            Some(SessionTokenError::UnsupportedVersion)
        );
        assert_eq!(
            parse_session_token(&format!("bt_v1_{uuid}.zz")).err(),
            Some(SessionTokenError::InvalidSecretEncoding)
        );
        assert_eq!(
            parse_session_token("no-dot-here").err(),
            Some(SessionTokenError::InvalidFormat)
        );
    }

    #[test]
    fn stored_password_hash_verifies_only_the_same_password() -> TestResult {
        let digest = PasswordDigest::new("hidratante123")?;

        assert!(digest.as_phc().starts_with("$argon2id$"), "{}", digest.as_phc());
        assert!(digest.verify("hidratante123"));
        assert!(!digest.verify("hidratante124"));
        assert!(!digest.verify(""));

        Ok(())
    }

    #[test]
    fn password_hash_is_salted() -> TestResult {
        let first = PasswordDigest::new("hidratante123")?;
        let second = PasswordDigest::new("hidratante123")?;

        assert_ne!(first, second, "two salts should give two hashes");
        assert!(second.verify("hidratante123"));

        Ok(())
    }

    #[test]
    fn password_hash_is_not_a_plain_sha256() -> TestResult {
        let digest = PasswordDigest::new("hidratante123")?;
        let plain = format!("{:x}", Sha256::digest(b"hidratante123"));

        assert!(!digest.as_phc().contains(&plain));

        Ok(())
    }

    #[test]
    fn debug_output_hides_secrets() -> TestResult {
        let secret = TokenSecret::generate();

        assert_eq!(format!("{secret:?}"), "TokenSecret(**redacted**)");
        assert_eq!(
            format!("{:?}", PasswordDigest::new("segredo123")?),
            "PasswordDigest(**redacted**)"
        );

        Ok(())
    }
}
