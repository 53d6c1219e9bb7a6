//! Credential, bearer token, and idempotency key types
//!
//! None of these implement `Display`, and their `Debug` output is redacted so
//! secrets cannot leak through structured logging.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Email/password pair exchanged once for a [`Token`].
///
/// Lives only in process memory; never serialized.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential {
    email: String,
    password: String,
}

impl Credential {
    /// Create a credential from an email/password pair
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self { email: email.into(), password: password.into() }
    }

    /// Account email
    #[must_use]
    pub fn email(&self) -> &str {
        &self.email
    }

    /// Account password
    #[must_use]
    pub fn password(&self) -> &str {
        &self.password
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential").field("email", &self.email).field("password", &"***").finish()
    }
}

/// Opaque bearer string. Validity is only ever learned from server responses.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Token(String);

impl Token {
    /// Wrap a bearer string returned by the authentication endpoint
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Raw bearer value, for the `Authorization` header only
    #[must_use]
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Token(***{} chars)", self.0.len())
    }
}

/// Caller-supplied key that makes a mutation safe to resubmit
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IdempotencyKey(String);

impl IdempotencyKey {
    /// Use a caller-chosen key verbatim
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Generate a fresh random key
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Header value
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}
