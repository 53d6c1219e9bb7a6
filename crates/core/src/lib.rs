//! # Rowbridge Core
//!
//! Port interfaces for the data-access client - no HTTP, no I/O.
//!
//! This crate contains:
//! - The CRUD façade contract callers depend on ([`DocumentStore`])
//! - The credential exchange port ([`Authenticator`])
//! - The observability callback port ([`OperationHook`])
//!
//! ## Architecture Principles
//! - Only depends on `rowbridge-domain`
//! - All external dependencies via traits
//! - Implementations live in `rowbridge-infra`

pub mod auth_ports;
pub mod observability_ports;
pub mod store_ports;

pub use auth_ports::Authenticator;
pub use observability_ports::{FanoutHook, NoopHook, OperationHook};
pub use store_ports::{CallOptions, DocumentStore};
