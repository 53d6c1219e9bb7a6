//! Token manager with serialized, reactive authentication
//!
//! Owns the single cached bearer token and the state machine around it:
//!
//! ```text
//! Unauthenticated ──ensure_valid──▶ Authenticating ──ok──▶ Valid
//!        ▲                               │                   │
//!        └──────────────failure──────────┘        401/403 ──▶ Invalid
//!                                        ▲                   │
//!                                        └───ensure_valid────┘
//! ```
//!
//! - Expiry is never predicted; a token is only dropped when the server
//!   rejects it.
//! - At most one authentication is in flight. Concurrent callers join the
//!   same attempt and all observe its single outcome.
//! - The state lock is never held across an `.await`.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use futures::future::{BoxFuture, FutureExt, Shared};
use parking_lot::Mutex;
use rowbridge_core::Authenticator;
use rowbridge_domain::{Credential, Result, Token};
use tracing::{debug, info, warn};

type AuthAttempt = Shared<BoxFuture<'static, Result<Token>>>;

enum TokenState {
    Unauthenticated,
    Authenticating(AuthAttempt),
    Valid(Token),
    Invalid,
}

/// Observable phase of the token state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthState {
    Unauthenticated,
    Authenticating,
    Valid,
    Invalid,
}

/// Sole owner and mutator of the cached token
pub struct TokenManager {
    authenticator: Arc<dyn Authenticator>,
    credential: Credential,
    state: Mutex<TokenState>,
    authentications: AtomicU64,
}

impl TokenManager {
    /// Create an unauthenticated manager
    ///
    /// # Arguments
    /// * `authenticator` - Performs the credential exchange
    /// * `credential` - Used for every (re-)authentication
    pub fn new(authenticator: Arc<dyn Authenticator>, credential: Credential) -> Self {
        Self {
            authenticator,
            credential,
            state: Mutex::new(TokenState::Unauthenticated),
            authentications: AtomicU64::new(0),
        }
    }

    /// Exchange the credential for a fresh token now
    ///
    /// Joins an attempt already in flight instead of starting another.
    ///
    /// # Errors
    /// `Authentication` for a rejected credential, `TransientNetwork` for
    /// connectivity failures. No internal retry.
    pub async fn authenticate(&self) -> Result<Token> {
        let attempt = {
            let mut state = self.state.lock();
            match &*state {
                TokenState::Authenticating(attempt) if attempt.peek().is_none() => attempt.clone(),
                _ => self.begin_attempt(&mut state),
            }
        };

        self.await_attempt(attempt).await
    }

    /// Return the cached token, authenticating first if there is none
    ///
    /// A no-op while the state is `Valid`.
    ///
    /// # Errors
    /// Propagates the outcome of the shared authentication attempt.
    pub async fn ensure_valid(&self) -> Result<Token> {
        let attempt = {
            let mut state = self.state.lock();
            match &*state {
                TokenState::Valid(token) => return Ok(token.clone()),
                // A finished-but-unsettled failure is stale; start over.
                TokenState::Authenticating(attempt)
                    if !matches!(attempt.peek(), Some(Err(_))) =>
                {
                    attempt.clone()
                }
                _ => self.begin_attempt(&mut state),
            }
        };

        self.await_attempt(attempt).await
    }

    /// Drop the cached token after the server rejected it
    ///
    /// Only clears the cache when `rejected` is the token currently held, so
    /// callers racing with a stale token cannot discard a fresh one.
    ///
    /// # Returns
    /// `true` if the state moved to `Invalid`
    pub fn invalidate(&self, rejected: &Token) -> bool {
        let mut state = self.state.lock();
        let is_current = matches!(&*state, TokenState::Valid(current) if current == rejected);
        if is_current {
            *state = TokenState::Invalid;
            info!("Cached token invalidated after server rejection");
        }
        is_current
    }

    /// Snapshot of the current phase
    pub fn state(&self) -> AuthState {
        match &*self.state.lock() {
            TokenState::Unauthenticated => AuthState::Unauthenticated,
            TokenState::Authenticating(_) => AuthState::Authenticating,
            TokenState::Valid(_) => AuthState::Valid,
            TokenState::Invalid => AuthState::Invalid,
        }
    }

    /// Number of authentication exchanges started so far
    pub fn authentication_count(&self) -> u64 {
        self.authentications.load(Ordering::SeqCst)
    }

    fn begin_attempt(&self, state: &mut TokenState) -> AuthAttempt {
        let authenticator = Arc::clone(&self.authenticator);
        let credential = self.credential.clone();
        let number = self.authentications.fetch_add(1, Ordering::SeqCst) + 1;
        debug!(attempt = number, "Starting authentication");

        let attempt =
            async move { authenticator.authenticate(&credential).await }.boxed().shared();
        *state = TokenState::Authenticating(attempt.clone());
        attempt
    }

    async fn await_attempt(&self, attempt: AuthAttempt) -> Result<Token> {
        let outcome = attempt.clone().await;

        let mut state = self.state.lock();
        let is_current =
            matches!(&*state, TokenState::Authenticating(current) if current.ptr_eq(&attempt));
        if is_current {
            *state = match &outcome {
                Ok(token) => {
                    info!("Authenticated; token cached");
                    TokenState::Valid(token.clone())
                }
                Err(err) => {
                    warn!(error = %err, "Authentication failed");
                    TokenState::Unauthenticated
                }
            };
        }

        outcome
    }
}

impl fmt::Debug for TokenManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenManager")
            .field("state", &self.state())
            .field("authentications", &self.authentication_count())
            .finish_non_exhaustive()
    }
}
