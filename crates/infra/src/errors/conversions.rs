//! Conversions from external infrastructure errors into domain errors.

use reqwest::Error as HttpError;
use reqwest::StatusCode;
use rowbridge_domain::DataAccessError;
use serde_json::Error as JsonError;

/// Error newtype that keeps conversions on the infrastructure side and can be
/// converted back into the domain error.
#[derive(Debug)]
pub struct InfraError(pub DataAccessError);

impl From<InfraError> for DataAccessError {
    fn from(value: InfraError) -> Self {
        value.0
    }
}

impl From<DataAccessError> for InfraError {
    fn from(value: DataAccessError) -> Self {
        InfraError(value)
    }
}

/// Extension trait to make the conversion logic explicit in tests and within
/// this module.
trait IntoDataAccessError {
    fn into_data_access(self) -> DataAccessError;
}

/* -------------------------------------------------------------------------- */
/* reqwest::Error → DataAccessError */
/* -------------------------------------------------------------------------- */

impl IntoDataAccessError for HttpError {
    fn into_data_access(self) -> DataAccessError {
        if self.is_timeout() {
            return DataAccessError::TransientNetwork("HTTP request timed out".into());
        }

        #[cfg(not(target_arch = "wasm32"))]
        if self.is_connect() {
            return DataAccessError::TransientNetwork("HTTP connection failure".into());
        }

        if self.is_builder() {
            return DataAccessError::InvalidInput(format!("invalid HTTP request: {self}"));
        }

        if self.is_decode() {
            return DataAccessError::Schema(format!("response body is not valid JSON: {self}"));
        }

        if let Some(status) = self.status() {
            return status_error(status, "", String::new());
        }

        // Request/body errors: the connection broke mid-exchange.
        DataAccessError::TransientNetwork(self.to_string())
    }
}

impl From<HttpError> for InfraError {
    fn from(value: HttpError) -> Self {
        InfraError(value.into_data_access())
    }
}

/* -------------------------------------------------------------------------- */
/* serde_json::Error → DataAccessError */
/* -------------------------------------------------------------------------- */

impl IntoDataAccessError for JsonError {
    fn into_data_access(self) -> DataAccessError {
        DataAccessError::Schema(format!("malformed JSON payload: {self}"))
    }
}

impl From<JsonError> for InfraError {
    fn from(value: JsonError) -> Self {
        InfraError(value.into_data_access())
    }
}

/* -------------------------------------------------------------------------- */
/* HTTP status → DataAccessError */
/* -------------------------------------------------------------------------- */

/// Map a terminal non-success status to its error kind
///
/// `context` names the resource (e.g. the request path); `body` is the
/// response text, possibly empty.
pub fn status_error(status: StatusCode, context: &str, body: String) -> DataAccessError {
    let reason = status.canonical_reason().unwrap_or("unknown status");
    let message = match (context.is_empty(), body.is_empty()) {
        (true, true) => format!("HTTP {} {reason}", status.as_u16()),
        (true, false) => format!("HTTP {} {reason}: {body}", status.as_u16()),
        (false, true) => format!("{context} returned {} {reason}", status.as_u16()),
        (false, false) => format!("{context} returned {} {reason}: {body}", status.as_u16()),
    };

    match status {
        StatusCode::UNAUTHORIZED => DataAccessError::Authentication(message),
        StatusCode::FORBIDDEN => DataAccessError::Authorization(message),
        StatusCode::NOT_FOUND => DataAccessError::NotFound(message),
        _ => DataAccessError::RemoteServer { status: status.as_u16(), message },
    }
}

/* -------------------------------------------------------------------------- */
/* Tests */
/* -------------------------------------------------------------------------- */
