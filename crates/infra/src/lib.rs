//! # Rowbridge Infrastructure
//!
//! Implementations of the `rowbridge-core` ports against the tabular REST
//! service.
//!
//! This crate contains:
//! - The HTTP transport and error conversions
//! - Token management, request execution, and response normalization
//! - The [`TableClient`] document façade
//! - Configuration loading
//! - Observability hooks (tracing, in-process metrics)
//!
//! ## Architecture
//! - Implements traits defined in `rowbridge-core`
//! - Contains all "impure" code (network, filesystem, environment)

pub mod api;
pub mod config;
pub mod errors;
pub mod http;
pub mod observability;

// Re-export commonly used items
pub use api::{
    AuthState, Endpoints, HttpAuthenticator, RequestExecutor, TableClient, TableClientBuilder,
    TokenManager,
};
pub use http::{HttpClient, HttpClientBuilder};
pub use observability::{OperationMetrics, TracingHook};
