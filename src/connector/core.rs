//! CRUD-to-registry mediation for a deployed business network.
//!
//! The [`Connector`] translates the generic data-access verbs of a host ORM
//! into business network operations. Every verb first ensures the network
//! connection, resolves the target declaration into a record category, and
//! then delegates to the matching registry or to transaction submission.
//! Write verbs resolve the category from the runtime class of the
//! deserialized resource; read verbs resolve it from the declared model
//! name, since no resource instance exists yet to introspect.

use std::sync::Arc;

use serde_json::Value;
use tracing::debug;

use crate::network::{
	BusinessNetworkClient, CLASS_TAG, ClassDeclaration, NetworkDefinition, Registry,
};

use super::category::{ResourceCategory, resolve_category};
use super::connection::Connection;
use super::schema::{self, ModelDefinition, SchemaDescriptor};
use super::types::{ConnectorError, ConnectorSettings};

/// Connector between a business network and an ORM-style data-access layer.
///
/// Constructed once per configuration and kept for the life of the process.
/// All operations are safe to issue concurrently; the only shared mutable
/// state is the connection, and concurrent connect attempts coalesce onto a
/// single handshake.
pub struct Connector {
	client: Arc<dyn BusinessNetworkClient>,
	connection: Connection,
}

impl std::fmt::Debug for Connector {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Connector").finish_non_exhaustive()
	}
}

impl Connector {
	/// Build a connector for one configured business network.
	///
	/// # Arguments
	/// * `client` - The ledger client to mediate for.
	/// * `settings` - Connection settings from the host data source.
	///
	/// # Returns
	/// The connector, or `ConnectorError::Settings` when a required field
	/// is missing.
	pub fn new(
		client: Arc<dyn BusinessNetworkClient>,
		settings: ConnectorSettings,
	) -> Result<Self, ConnectorError> {
		settings.validate()?;
		Ok(Self {
			client: client.clone(),
			connection: Connection::new(client, settings),
		})
	}

	pub fn is_connected(&self) -> bool {
		self.connection.is_connected()
	}

	pub fn is_connecting(&self) -> bool {
		self.connection.is_connecting()
	}

	/// Open the network connection if it is not already open.
	pub async fn connect(&self) -> Result<(), ConnectorError> {
		self.connection.ensure().await.map(|_| ())
	}

	/// Definition of the connected network, connecting first if needed.
	pub async fn ensure_connected(&self) -> Result<Arc<dyn NetworkDefinition>, ConnectorError> {
		self.connection.ensure().await
	}

	/// Tear down the network connection.
	pub async fn disconnect(&self) -> Result<(), ConnectorError> {
		self.connection.disconnect().await
	}

	/// Probe the underlying client, surfacing its response unchanged.
	pub async fn ping(&self) -> Result<Value, ConnectorError> {
		Ok(self.client.ping().await?)
	}

	/// Create a new record from wire JSON.
	///
	/// Untagged data defaults its `$class` tag to `model_name` before
	/// deserialization. Assets and participants are added to their
	/// registries; transactions are submitted for execution.
	pub async fn create(&self, model_name: &str, data: Value) -> Result<(), ConnectorError> {
		let network = self.connection.ensure().await?;
		let data = tag_with_class(data, model_name);
		let resource = network.serializer().from_json(&data)?;
		let declaration = network.model_manager().get_type(resource.class_name())?;
		debug!(model = %model_name, class = %declaration.fully_qualified_name, "Creating resource");
		match resolve_category(&declaration)? {
			ResourceCategory::Asset => {
				let registry = self
					.client
					.asset_registry(&declaration.fully_qualified_name)
					.await?;
				registry.add(resource).await?;
			}
			ResourceCategory::Participant => {
				let registry = self
					.client
					.participant_registry(&declaration.fully_qualified_name)
					.await?;
				registry.add(resource).await?;
			}
			ResourceCategory::Transaction => {
				self.client.submit_transaction(resource).await?;
			}
		}
		Ok(())
	}

	/// Fetch one record by id as plain JSON.
	pub async fn retrieve(&self, model_name: &str, id: &str) -> Result<Value, ConnectorError> {
		let network = self.connection.ensure().await?;
		let declaration = network.model_manager().get_type(model_name)?;
		let registry = self.registry_for(&declaration).await?;
		debug!(model = %model_name, id = %id, "Retrieving resource");
		let resource = registry.get(id).await?;
		Ok(network.serializer().to_json(&resource)?)
	}

	/// Fetch records as plain JSON, in the registry's enumeration order.
	///
	/// A `where` equality on the declaration's identifying field narrows
	/// the result to that single record; any other filter falls back to the
	/// full scan.
	pub async fn all(
		&self,
		model_name: &str,
		filter: Option<&Value>,
	) -> Result<Vec<Value>, ConnectorError> {
		let network = self.connection.ensure().await?;
		let declaration = network.model_manager().get_type(model_name)?;
		let registry = self.registry_for(&declaration).await?;
		let serializer = network.serializer();
		if let Some(id) = identifier_filter(&declaration, filter) {
			debug!(model = %model_name, id = %id, "Listing resources by identifier");
			let resource = registry.get(&id).await?;
			return Ok(vec![serializer.to_json(&resource)?]);
		}
		debug!(model = %model_name, "Listing all resources");
		let mut records = Vec::new();
		for resource in registry.get_all().await? {
			records.push(serializer.to_json(&resource)?);
		}
		Ok(records)
	}

	/// Replace an existing record with the given wire JSON.
	pub async fn update(&self, model_name: &str, data: Value) -> Result<(), ConnectorError> {
		let network = self.connection.ensure().await?;
		let resource = network.serializer().from_json(&data)?;
		let declaration = network.model_manager().get_type(resource.class_name())?;
		debug!(model = %model_name, class = %declaration.fully_qualified_name, "Updating resource");
		let registry = self.registry_for(&declaration).await?;
		registry.update(resource).await?;
		Ok(())
	}

	/// Remove one record by id.
	pub async fn delete(&self, model_name: &str, id: &str) -> Result<(), ConnectorError> {
		let network = self.connection.ensure().await?;
		let declaration = network.model_manager().get_type(model_name)?;
		let registry = self.registry_for(&declaration).await?;
		debug!(model = %model_name, id = %id, "Deleting resource");
		registry.remove(id).await?;
		Ok(())
	}

	/// Table descriptors for every addressable declared type.
	pub async fn discover_model_definitions(&self) -> Result<Vec<ModelDefinition>, ConnectorError> {
		let network = self.connection.ensure().await?;
		let declarations = network.introspector().class_declarations()?;
		debug!(count = declarations.len(), "Discovered class declarations");
		Ok(schema::model_definitions(declarations))
	}

	/// ORM schema descriptor for one declared type.
	pub async fn discover_schemas(
		&self,
		model_name: &str,
	) -> Result<SchemaDescriptor, ConnectorError> {
		let network = self.connection.ensure().await?;
		let declaration = network.introspector().class_declaration(model_name)?;
		Ok(schema::schema_descriptor(&declaration))
	}

	/// Registry backing read-path operations for a declaration.
	///
	/// Only assets and participants live in registries. Transactions are
	/// submit-only and fall out as unsupported here, before any network
	/// call is attempted.
	async fn registry_for(
		&self,
		declaration: &ClassDeclaration,
	) -> Result<Arc<dyn Registry>, ConnectorError> {
		match resolve_category(declaration)? {
			ResourceCategory::Asset => Ok(self
				.client
				.asset_registry(&declaration.fully_qualified_name)
				.await?),
			ResourceCategory::Participant => Ok(self
				.client
				.participant_registry(&declaration.fully_qualified_name)
				.await?),
			ResourceCategory::Transaction => Err(ConnectorError::UnsupportedType(
				declaration.fully_qualified_name.clone(),
			)),
		}
	}
}

/// Default the `$class` tag to the model name when the data carries none.
fn tag_with_class(mut data: Value, model_name: &str) -> Value {
	if let Some(object) = data.as_object_mut() {
		object
			.entry(CLASS_TAG)
			.or_insert_with(|| Value::String(model_name.to_string()));
	}
	data
}

/// Identifier named by a `where` equality filter, if the filter is one.
fn identifier_filter(declaration: &ClassDeclaration, filter: Option<&Value>) -> Option<String> {
	let id_field = declaration.identifier.as_deref()?;
	match filter?.get("where")?.get(id_field)? {
		Value::String(id) => Some(id.clone()),
		Value::Number(id) => Some(id.to_string()),
		_ => None,
	}
}
