//! Collaborator traits for the deployed business network.
//!
//! These are the seams between the connector and the ledger client. The
//! client and registry operations are asynchronous; introspection,
//! model lookup and serialization are synchronous services hanging off the
//! network definition. Failures from either side travel the same `Result`
//! path, so callers never have to distinguish how a collaborator failed.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use super::types::{ClassDeclaration, NetworkError, Resource};

/// Client for a deployed business network.
#[async_trait]
pub trait BusinessNetworkClient: Send + Sync {
	/// Open the network connection.
	///
	/// # Arguments
	/// * `connection_profile` - Named connection profile to open with.
	/// * `business_network` - Identifier of the deployed business network.
	/// * `participant_id` - Participant to authenticate as.
	/// * `participant_pwd` - Credential for the participant.
	///
	/// # Returns
	/// The definition of the connected network, or a `NetworkError` if the
	/// handshake fails.
	async fn connect(
		&self,
		connection_profile: &str,
		business_network: &str,
		participant_id: &str,
		participant_pwd: &str,
	) -> Result<Arc<dyn NetworkDefinition>, NetworkError>;

	/// Tear down the network connection.
	async fn disconnect(&self) -> Result<(), NetworkError>;

	/// Liveness probe against the connected network.
	async fn ping(&self) -> Result<Value, NetworkError>;

	/// Submit a transaction resource for execution.
	async fn submit_transaction(&self, transaction: Resource) -> Result<(), NetworkError>;

	/// Registry holding assets of the given fully-qualified type.
	async fn asset_registry(&self, type_name: &str) -> Result<Arc<dyn Registry>, NetworkError>;

	/// Registry holding participants of the given fully-qualified type.
	async fn participant_registry(&self, type_name: &str)
	-> Result<Arc<dyn Registry>, NetworkError>;

	/// Definition of the currently connected network.
	async fn business_network(&self) -> Result<Arc<dyn NetworkDefinition>, NetworkError>;
}

/// Deployed model and services of a connected business network.
pub trait NetworkDefinition: Send + Sync + std::fmt::Debug {
	fn introspector(&self) -> Arc<dyn Introspector>;
	fn serializer(&self) -> Arc<dyn Serializer>;
	fn model_manager(&self) -> Arc<dyn ModelManager>;
}

/// Metadata service over the deployed model.
pub trait Introspector: Send + Sync {
	/// All class declarations in the deployed model.
	fn class_declarations(&self) -> Result<Vec<ClassDeclaration>, NetworkError>;

	/// The declaration for one fully-qualified type name.
	fn class_declaration(&self, name: &str) -> Result<ClassDeclaration, NetworkError>;
}

/// Type lookup over the deployed model.
pub trait ModelManager: Send + Sync {
	/// Resolve a fully-qualified type name to its declaration.
	fn get_type(&self, name: &str) -> Result<ClassDeclaration, NetworkError>;
}

/// Converts between wire JSON and typed resources.
pub trait Serializer: Send + Sync {
	/// Deserialize wire JSON into a typed resource.
	fn from_json(&self, value: &Value) -> Result<Resource, NetworkError>;

	/// Serialize a typed resource back to plain JSON.
	fn to_json(&self, resource: &Resource) -> Result<Value, NetworkError>;
}

/// Collection endpoint for one declared type.
///
/// `get_all` enumerates in the underlying store's insertion order; callers
/// must not assume the sequence is sorted.
#[async_trait]
pub trait Registry: Send + Sync {
	async fn get(&self, id: &str) -> Result<Resource, NetworkError>;
	async fn get_all(&self) -> Result<Vec<Resource>, NetworkError>;
	async fn add(&self, resource: Resource) -> Result<(), NetworkError>;
	async fn update(&self, resource: Resource) -> Result<(), NetworkError>;
	async fn remove(&self, id: &str) -> Result<(), NetworkError>;
}
