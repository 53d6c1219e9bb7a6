//! Credential exchange against the remote login endpoint

use async_trait::async_trait;
use reqwest::{Method, StatusCode};
use rowbridge_core::Authenticator;
use rowbridge_domain::{Credential, DataAccessError, Result, Token};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

use super::endpoints::Endpoints;
use crate::errors::status_error;
use crate::http::HttpClient;

#[derive(Serialize)]
struct LoginRequest<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Deserialize)]
struct LoginResponse {
    #[serde(alias = "access_token")]
    token: String,
}

/// [`Authenticator`] that posts the credential to `{base}/auth/login`
///
/// One HTTP call per `authenticate`; no internal retry.
#[derive(Debug, Clone)]
pub struct HttpAuthenticator {
    http_client: HttpClient,
    endpoints: Endpoints,
}

impl HttpAuthenticator {
    /// Create an authenticator sharing the client's transport and endpoints
    pub fn new(http_client: HttpClient, endpoints: Endpoints) -> Self {
        Self { http_client, endpoints }
    }
}

#[async_trait]
impl Authenticator for HttpAuthenticator {
    #[instrument(skip(self, credential))]
    async fn authenticate(&self, credential: &Credential) -> Result<Token> {
        let url = self.endpoints.login();
        debug!(path = %url.path(), "Authenticating");

        let request = self
            .http_client
            .request(Method::POST, url)
            .json(&LoginRequest { email: credential.email(), password: credential.password() });

        let response = self.http_client.send(request).await?;
        let status = response.status();

        if matches!(
            status,
            StatusCode::BAD_REQUEST | StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN
        ) {
            warn!(%status, "Credential rejected");
            return Err(DataAccessError::Authentication(format!(
                "credential rejected with status {}",
                status.as_u16()
            )));
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(status_error(status, "login", body));
        }

        let body: LoginResponse = response.json().await.map_err(|e| {
            DataAccessError::Schema(format!("login response carries no token: {e}"))
        })?;

        if body.token.is_empty() {
            return Err(DataAccessError::Schema("login response carries an empty token".into()));
        }

        info!("Authentication successful");
        Ok(Token::new(body.token))
    }
}
