//! Client for the project-scoped tabular REST service
//!
//! Layered bottom-up:
//!
//! - [`endpoints`]: URL construction under `{base}/projects/{project}`
//! - [`auth`]: credential exchange against the login endpoint
//! - [`token_manager`]: the cached token and its state machine
//! - [`executor`]: bearer auth, one re-authentication, bounded read retry
//! - [`normalize`]: wire shapes to canonical rows
//! - [`client`]: the document-level façade

pub mod auth;
pub mod client;
pub mod endpoints;
pub mod executor;
pub mod normalize;
pub mod token_manager;

pub use auth::HttpAuthenticator;
pub use client::{TableClient, TableClientBuilder};
pub use endpoints::Endpoints;
pub use executor::{Execution, RequestExecutor, WireOperation};
pub use normalize::{normalize_row, normalize_rows, normalize_tables};
pub use token_manager::{AuthState, TokenManager};
