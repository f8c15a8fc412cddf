//! Connector between a distributed-ledger business network and an
//! ORM-style data-access layer.
//!
//! The [`connector`] module owns the connection lifecycle and the
//! CRUD-to-registry mediation; the [`network`] module defines the
//! collaborator contracts (ledger client, registries, introspection,
//! serialization) the connector drives, plus in-memory doubles for testing
//! against it.

pub mod connector;
pub mod network;

pub use connector::{
	Connector, ConnectorError, ConnectorSettings, ModelDefinition, ResourceCategory,
	SchemaDescriptor,
};
pub use network::{
	BusinessNetworkClient, ClassDeclaration, DeclarationKind, Introspector, ModelManager,
	NetworkDefinition, NetworkError, PropertyDeclaration, PropertyType, Registry, Resource,
	Serializer,
};
