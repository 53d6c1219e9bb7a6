//! # Rowbridge Domain
//!
//! Data types for the rowbridge data-access client.
//!
//! This crate contains:
//! - Credentials, tokens, and idempotency keys
//! - Tables, queries, rows, and documents
//! - Operation events reported to observability hooks
//! - The error taxonomy and `Result` alias
//! - Client configuration structures
//!
//! ## Architecture
//! - No dependencies on other rowbridge crates
//! - No I/O

pub mod config;
pub mod constants;
pub mod errors;
pub mod types;

// Re-export commonly used items
pub use config::*;
pub use errors::*;
pub use types::*;
