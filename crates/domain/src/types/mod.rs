//! Domain types shared by every layer of the client

pub mod auth;
pub mod event;
pub mod query;
pub mod record;
pub mod table;

pub use auth::{Credential, IdempotencyKey, Token};
pub use event::{OperationEvent, OperationKind, OperationOutcome};
pub use query::Query;
pub use record::{Document, DocumentId, Fields, Row};
pub use table::{ProjectScope, TableReference};
