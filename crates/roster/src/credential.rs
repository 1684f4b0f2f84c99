//! Signed, time-limited identity credentials.
//!
//! [`TokenCodec`] issues and verifies HS256 JSON Web Tokens. The signing
//! secret, lifetime and issuer are fixed when the codec is built and never
//! change afterwards, so a single codec can be shared across every in-flight
//! call without locking.
//!
//! Verification does not say why it failed: a malformed token, a bad
//! signature, an expired token and an issuer mismatch all fail with the same
//! [`INVALID_TOKEN`] message. The precise reason is only logged at `debug`.

use crate::error::{Error, Result};
use chrono::{DateTime, Duration, Utc};
use core::fmt;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The only message ever reported for a rejected token.
pub const INVALID_TOKEN: &str = "invalid token";

const ALGORITHM: Algorithm = Algorithm::HS256;

/// Claims carried by every issued token.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject: the user id.
    pub sub: Uuid,
    pub email: String,
    /// Issued-at, seconds since the Unix epoch.
    pub iat: i64,
    /// Expiry, seconds since the Unix epoch.
    pub exp: i64,
    pub iss: String,
}

/// Verified caller identity, handed to protected handlers.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Identity {
    pub user_id: Uuid,
    pub email: String,
}

impl From<Claims> for Identity {
    fn from(claims: Claims) -> Self {
        Self {
            user_id: claims.sub,
            email: claims.email,
        }
    }
}

/// Issues and verifies credentials with a process-wide symmetric key.
#[derive(Clone)]
pub struct TokenCodec {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    ttl: Duration,
    issuer: String,
}

impl TokenCodec {
    /// Builds a codec that signs with `secret`, stamps `issuer` and makes
    /// tokens valid for `ttl`.
    pub fn new(secret: &[u8], ttl: Duration, issuer: impl Into<String>) -> Self {
        let issuer = issuer.into();

        let mut validation = Validation::new(ALGORITHM);
        validation.leeway = 0;
        validation.set_issuer(&[issuer.as_str()]);
        validation.set_required_spec_claims(&["exp", "iat", "iss", "sub"]);

        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            validation,
            ttl,
            issuer,
        }
    }

    pub const fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn issuer(&self) -> &str {
        &self.issuer
    }

    /// Issues a token for `user_id` valid from now until now + ttl.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Internal`] if signing fails.
    pub fn issue(&self, user_id: Uuid, email: &str) -> Result<String> {
        self.issue_at(user_id, email, Utc::now())
    }

    /// Issues a token as if the current time were `now`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Internal`] if signing fails.
    pub fn issue_at(&self, user_id: Uuid, email: &str, now: DateTime<Utc>) -> Result<String> {
        let claims = Claims {
            sub: user_id,
            email: email.to_owned(),
            iat: now.timestamp(),
            exp: (now + self.ttl).timestamp(),
            iss: self.issuer.clone(),
        };

        encode(&Header::new(ALGORITHM), &claims, &self.encoding).map_err(Error::internal)
    }

    /// Verifies signature, expiry and issuer and returns the claims.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Unauthorized`] with [`INVALID_TOKEN`] on any failure.
    pub fn verify(&self, token: &str) -> Result<Claims> {
        let data = decode::<Claims>(token, &self.decoding, &self.validation).map_err(|err| {
            tracing::debug!(error = %err, "token rejected");
            Error::unauthorized(INVALID_TOKEN)
        })?;

        // `exp` must be strictly in the future.
        if data.claims.exp <= Utc::now().timestamp() {
            tracing::debug!(exp = data.claims.exp, "token rejected: expired");
            return Err(Error::unauthorized(INVALID_TOKEN));
        }

        Ok(data.claims)
    }
}

impl fmt::Debug for TokenCodec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenCodec")
            .field("ttl", &self.ttl)
            .field("issuer", &self.issuer)
            .finish_non_exhaustive()
    }
}
