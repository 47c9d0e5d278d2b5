//! Short-lived HS256 credentials derived from the node's shared secret.
//!
//! One credential is issued per run and never renewed. Runs are expected to be
//! short relative to [`TOKEN_LIFETIME`], or restarted externally.

use crate::BEARER_PREFIX;
use crate::error::TokenError;

use std::fmt;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use jsonwebtoken::{Algorithm, EncodingKey, Header, encode};
use serde::{Deserialize, Serialize};

pub const TOKEN_LIFETIME: Duration = Duration::from_secs(600);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Issued at (Unix seconds).
    pub iat: u64,
    /// Expiry (Unix seconds), always `iat + 600`.
    pub exp: u64,
}

impl Claims {
    pub fn issued_at(now_secs: u64) -> Self {
        Self {
            iat: now_secs,
            exp: now_secs + TOKEN_LIFETIME.as_secs(),
        }
    }

    pub fn is_expired_at(&self, now_secs: u64) -> bool {
        now_secs >= self.exp
    }
}

/// A signed compact JWS plus the claims it was built from.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential {
    token: String,
    claims: Claims,
}

impl Credential {
    /// The compact token. Only for putting on the wire.
    pub fn token(&self) -> &str {
        &self.token
    }

    pub fn claims(&self) -> Claims {
        self.claims
    }

    /// Value for the `Authorization` header.
    pub fn bearer(&self) -> String {
        format!("{BEARER_PREFIX}{}", self.token)
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("token", &"[REDACTED]")
            .field("claims", &self.claims)
            .finish()
    }
}

impl fmt::Display for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "HS256 token (iat={}, exp={})",
            self.claims.iat, self.claims.exp
        )
    }
}

/// Issue a credential valid from now for [`TOKEN_LIFETIME`].
///
/// # Errors
///
/// - [`TokenError::Decode`] if `secret_hex` is not valid hexadecimal
/// - [`TokenError::Signing`] if the key is empty or signing fails
pub fn issue_token(secret_hex: &str) -> Result<Credential, TokenError> {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_err(|e| TokenError::signing(format!("system clock before Unix epoch: {e}")))?;

    issue_token_at(secret_hex, now.as_secs())
}

/// Issue a credential with an explicit issued-at time.
pub fn issue_token_at(secret_hex: &str, now_secs: u64) -> Result<Credential, TokenError> {
    let key = hex::decode(secret_hex.trim())?;
    if key.is_empty() {
        return Err(TokenError::signing("HMAC key is empty"));
    }

    let claims = Claims::issued_at(now_secs);
    let token = encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(&key),
    )?;

    Ok(Credential { token, claims })
}
