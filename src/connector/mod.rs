//! Business network connector core.
//!
//! This module holds the connector itself and the pieces it is built from:
//!
//! - `core`: the [`Connector`], translating ORM data-access verbs into
//!   registry operations and transaction submission.
//! - `connection`: the connection lifecycle state machine, coalescing
//!   concurrent connect attempts onto one handshake.
//! - `category`: resolution of class declarations into the closed
//!   asset/participant/transaction union.
//! - `schema`: the model-definition and schema descriptors handed to the
//!   host ORM during discovery.
//! - `types`: connector settings and the error taxonomy.

/// Runtime category resolution for declared types
mod category;
/// Connection lifecycle state machine
mod connection;
/// CRUD mediation and discovery entry points
mod core;
/// ORM schema discovery descriptors
mod schema;
/// Connector settings and error taxonomy
mod types;

pub use category::{ResourceCategory, resolve_category};
pub use self::core::Connector;
pub use schema::{ModelDefinition, PropertySchema, SchemaDescriptor, SchemaOptions};
pub use types::{ConnectorError, ConnectorSettings};
