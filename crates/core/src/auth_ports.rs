//! Port interface for exchanging a credential for a bearer token

use async_trait::async_trait;
use rowbridge_domain::{Credential, Result, Token};

/// Exchanges a [`Credential`] for a [`Token`]
///
/// Implementations perform exactly one exchange per call and never retry
/// internally. Bad credentials map to `Authentication`, connectivity
/// failures to `TransientNetwork`.
#[async_trait]
pub trait Authenticator: Send + Sync {
    /// Perform one authentication exchange
    async fn authenticate(&self, credential: &Credential) -> Result<Token>;
}
