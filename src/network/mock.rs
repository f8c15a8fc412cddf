//! In-memory business network used by tests.
//!
//! [`MockBusinessNetwork`] implements the full collaborator surface over an
//! in-memory model and insertion-ordered registries. Connect calls are
//! recorded for assertion, failures can be injected per collaborator, and a
//! gate can hold a connect attempt open to exercise concurrent callers.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::{Value, json};
use tokio::sync::Semaphore;

use super::client::{
	BusinessNetworkClient, Introspector, ModelManager, NetworkDefinition, Registry, Serializer,
};
use super::types::{CLASS_TAG, ClassDeclaration, NetworkError, Resource};

/// One recorded call to [`BusinessNetworkClient::connect`].
#[derive(Debug, Clone, PartialEq)]
pub struct ConnectCall {
	pub connection_profile: String,
	pub business_network: String,
	pub participant_id: String,
	pub participant_pwd: String,
}

/// Deployed model shared by the definition and its services.
#[derive(Debug)]
struct ModelStore {
	declarations: Vec<ClassDeclaration>,
	fail_introspection: Mutex<Option<NetworkError>>,
	fail_serialization: Mutex<Option<NetworkError>>,
}

impl ModelStore {
	fn find(&self, name: &str) -> Option<&ClassDeclaration> {
		self.declarations
			.iter()
			.find(|declaration| declaration.fully_qualified_name == name)
	}
}

/// In-memory network definition over a fixed set of declarations.
#[derive(Debug)]
pub struct MockNetworkDefinition {
	model: Arc<ModelStore>,
}

impl MockNetworkDefinition {
	pub fn new(declarations: Vec<ClassDeclaration>) -> Self {
		Self {
			model: Arc::new(ModelStore {
				declarations,
				fail_introspection: Mutex::new(None),
				fail_serialization: Mutex::new(None),
			}),
		}
	}

	/// Make the next introspection or model lookup fail with `error`.
	pub fn fail_introspection(&self, error: NetworkError) {
		*self.model.fail_introspection.lock().unwrap() = Some(error);
	}

	/// Make the next serializer call fail with `error`.
	pub fn fail_serialization(&self, error: NetworkError) {
		*self.model.fail_serialization.lock().unwrap() = Some(error);
	}
}

impl NetworkDefinition for MockNetworkDefinition {
	fn introspector(&self) -> Arc<dyn Introspector> {
		Arc::new(MockIntrospector {
			model: self.model.clone(),
		})
	}

	fn serializer(&self) -> Arc<dyn Serializer> {
		Arc::new(MockSerializer {
			model: self.model.clone(),
		})
	}

	fn model_manager(&self) -> Arc<dyn ModelManager> {
		Arc::new(MockModelManager {
			model: self.model.clone(),
		})
	}
}

struct MockIntrospector {
	model: Arc<ModelStore>,
}

impl Introspector for MockIntrospector {
	fn class_declarations(&self) -> Result<Vec<ClassDeclaration>, NetworkError> {
		if let Some(error) = self.model.fail_introspection.lock().unwrap().take() {
			return Err(error);
		}
		Ok(self.model.declarations.clone())
	}

	fn class_declaration(&self, name: &str) -> Result<ClassDeclaration, NetworkError> {
		if let Some(error) = self.model.fail_introspection.lock().unwrap().take() {
			return Err(error);
		}
		self.model.find(name).cloned().ok_or_else(|| {
			NetworkError::Introspection(format!("Type {name} is not declared in the model"))
		})
	}
}

struct MockModelManager {
	model: Arc<ModelStore>,
}

impl ModelManager for MockModelManager {
	fn get_type(&self, name: &str) -> Result<ClassDeclaration, NetworkError> {
		if let Some(error) = self.model.fail_introspection.lock().unwrap().take() {
			return Err(error);
		}
		self.model.find(name).cloned().ok_or_else(|| {
			NetworkError::Introspection(format!("Type {name} is not declared in the model"))
		})
	}
}

struct MockSerializer {
	model: Arc<ModelStore>,
}

impl Serializer for MockSerializer {
	fn from_json(&self, value: &Value) -> Result<Resource, NetworkError> {
		if let Some(error) = self.model.fail_serialization.lock().unwrap().take() {
			return Err(error);
		}
		let object = value.as_object().ok_or_else(|| {
			NetworkError::Serialization("Resource JSON must be an object".to_string())
		})?;
		let class_name = object
			.get(CLASS_TAG)
			.and_then(Value::as_str)
			.ok_or_else(|| {
				NetworkError::Serialization("Resource JSON carries no $class type tag".to_string())
			})?;
		if self.model.find(class_name).is_none() {
			return Err(NetworkError::Serialization(format!(
				"Type {class_name} is not declared in the model"
			)));
		}
		Ok(Resource::new(class_name, value.clone()))
	}

	fn to_json(&self, resource: &Resource) -> Result<Value, NetworkError> {
		if let Some(error) = self.model.fail_serialization.lock().unwrap().take() {
			return Err(error);
		}
		Ok(resource.data().clone())
	}
}

/// Insertion-ordered in-memory registry for one declared type.
pub struct MockRegistry {
	type_name: String,
	id_field: String,
	items: Mutex<Vec<Resource>>,
	fail_next: Mutex<Option<NetworkError>>,
}

impl MockRegistry {
	fn new(type_name: impl Into<String>, id_field: impl Into<String>) -> Self {
		Self {
			type_name: type_name.into(),
			id_field: id_field.into(),
			items: Mutex::new(Vec::new()),
			fail_next: Mutex::new(None),
		}
	}

	/// Insert a resource directly, bypassing the registry contract.
	pub fn seed(&self, resource: Resource) {
		self.items.lock().unwrap().push(resource);
	}

	/// Make the next registry operation fail with `error`.
	pub fn fail_next(&self, error: NetworkError) {
		*self.fail_next.lock().unwrap() = Some(error);
	}

	/// Snapshot of the stored resources in insertion order.
	pub fn items(&self) -> Vec<Resource> {
		self.items.lock().unwrap().clone()
	}

	fn take_failure(&self) -> Option<NetworkError> {
		self.fail_next.lock().unwrap().take()
	}

	fn resource_id(&self, resource: &Resource) -> Option<String> {
		match resource.field(&self.id_field)? {
			Value::String(id) => Some(id.clone()),
			Value::Number(id) => Some(id.to_string()),
			_ => None,
		}
	}

	fn missing(&self, id: &str) -> NetworkError {
		NetworkError::Registry(format!(
			"Object with ID '{}' in collection with ID '{}' does not exist",
			id, self.type_name
		))
	}
}

#[async_trait]
impl Registry for MockRegistry {
	async fn get(&self, id: &str) -> Result<Resource, NetworkError> {
		if let Some(error) = self.take_failure() {
			return Err(error);
		}
		self.items
			.lock()
			.unwrap()
			.iter()
			.find(|resource| self.resource_id(resource).as_deref() == Some(id))
			.cloned()
			.ok_or_else(|| self.missing(id))
	}

	async fn get_all(&self) -> Result<Vec<Resource>, NetworkError> {
		if let Some(error) = self.take_failure() {
			return Err(error);
		}
		Ok(self.items())
	}

	async fn add(&self, resource: Resource) -> Result<(), NetworkError> {
		if let Some(error) = self.take_failure() {
			return Err(error);
		}
		self.items.lock().unwrap().push(resource);
		Ok(())
	}

	async fn update(&self, resource: Resource) -> Result<(), NetworkError> {
		if let Some(error) = self.take_failure() {
			return Err(error);
		}
		let id = self.resource_id(&resource).ok_or_else(|| {
			NetworkError::Registry(format!(
				"Resource carries no '{}' identifying field",
				self.id_field
			))
		})?;
		let mut items = self.items.lock().unwrap();
		let existing = items
			.iter_mut()
			.find(|candidate| self.resource_id(candidate).as_deref() == Some(id.as_str()))
			.ok_or_else(|| self.missing(&id))?;
		*existing = resource;
		Ok(())
	}

	async fn remove(&self, id: &str) -> Result<(), NetworkError> {
		if let Some(error) = self.take_failure() {
			return Err(error);
		}
		let mut items = self.items.lock().unwrap();
		let before = items.len();
		items.retain(|resource| self.resource_id(resource).as_deref() != Some(id));
		if items.len() == before {
			return Err(self.missing(id));
		}
		Ok(())
	}
}

/// In-memory [`BusinessNetworkClient`] for the test suite.
pub struct MockBusinessNetwork {
	definition: Arc<MockNetworkDefinition>,
	connect_calls: Mutex<Vec<ConnectCall>>,
	disconnect_calls: Mutex<u32>,
	connect_gate: Mutex<Option<Arc<Semaphore>>>,
	fail_connect: Mutex<Option<NetworkError>>,
	fail_disconnect: Mutex<Option<NetworkError>>,
	fail_submit: Mutex<Option<NetworkError>>,
	ping_result: Mutex<Result<Value, NetworkError>>,
	submitted: Mutex<Vec<Resource>>,
	asset_registries: Mutex<HashMap<String, Arc<MockRegistry>>>,
	participant_registries: Mutex<HashMap<String, Arc<MockRegistry>>>,
}

impl MockBusinessNetwork {
	pub fn new(declarations: Vec<ClassDeclaration>) -> Self {
		Self {
			definition: Arc::new(MockNetworkDefinition::new(declarations)),
			connect_calls: Mutex::new(Vec::new()),
			disconnect_calls: Mutex::new(0),
			connect_gate: Mutex::new(None),
			fail_connect: Mutex::new(None),
			fail_disconnect: Mutex::new(None),
			fail_submit: Mutex::new(None),
			ping_result: Mutex::new(Ok(json!({ "version": "1.0" }))),
			submitted: Mutex::new(Vec::new()),
			asset_registries: Mutex::new(HashMap::new()),
			participant_registries: Mutex::new(HashMap::new()),
		}
	}

	pub fn definition(&self) -> Arc<MockNetworkDefinition> {
		self.definition.clone()
	}

	/// Connect calls recorded so far, in order.
	pub fn connect_calls(&self) -> Vec<ConnectCall> {
		self.connect_calls.lock().unwrap().clone()
	}

	pub fn disconnect_calls(&self) -> u32 {
		*self.disconnect_calls.lock().unwrap()
	}

	/// Transactions submitted so far, in order.
	pub fn submitted(&self) -> Vec<Resource> {
		self.submitted.lock().unwrap().clone()
	}

	/// Hold every connect attempt open until the returned gate receives
	/// permits.
	pub fn hold_connect(&self) -> Arc<Semaphore> {
		let gate = Arc::new(Semaphore::new(0));
		*self.connect_gate.lock().unwrap() = Some(gate.clone());
		gate
	}

	/// Make the next connect attempt fail with `error`.
	pub fn fail_connect(&self, error: NetworkError) {
		*self.fail_connect.lock().unwrap() = Some(error);
	}

	/// Make the next disconnect fail with `error`.
	pub fn fail_disconnect(&self, error: NetworkError) {
		*self.fail_disconnect.lock().unwrap() = Some(error);
	}

	/// Make the next transaction submission fail with `error`.
	pub fn fail_submit(&self, error: NetworkError) {
		*self.fail_submit.lock().unwrap() = Some(error);
	}

	pub fn set_ping(&self, result: Result<Value, NetworkError>) {
		*self.ping_result.lock().unwrap() = result;
	}

	/// Concrete handle to the asset registry for `type_name`.
	pub fn asset_registry_handle(&self, type_name: &str) -> Result<Arc<MockRegistry>, NetworkError> {
		self.registry_in(&self.asset_registries, type_name)
	}

	/// Concrete handle to the participant registry for `type_name`.
	pub fn participant_registry_handle(
		&self,
		type_name: &str,
	) -> Result<Arc<MockRegistry>, NetworkError> {
		self.registry_in(&self.participant_registries, type_name)
	}

	fn registry_in(
		&self,
		registries: &Mutex<HashMap<String, Arc<MockRegistry>>>,
		type_name: &str,
	) -> Result<Arc<MockRegistry>, NetworkError> {
		let mut map = registries.lock().unwrap();
		if let Some(registry) = map.get(type_name) {
			return Ok(registry.clone());
		}
		let declaration = self.definition.model.find(type_name).ok_or_else(|| {
			NetworkError::Registry(format!("No registry exists for type {type_name}"))
		})?;
		let id_field = declaration.identifier.clone().ok_or_else(|| {
			NetworkError::Registry(format!("Type {type_name} declares no identifying field"))
		})?;
		let registry = Arc::new(MockRegistry::new(type_name, id_field));
		map.insert(type_name.to_string(), registry.clone());
		Ok(registry)
	}
}

#[async_trait]
impl BusinessNetworkClient for MockBusinessNetwork {
	async fn connect(
		&self,
		connection_profile: &str,
		business_network: &str,
		participant_id: &str,
		participant_pwd: &str,
	) -> Result<Arc<dyn NetworkDefinition>, NetworkError> {
		self.connect_calls.lock().unwrap().push(ConnectCall {
			connection_profile: connection_profile.to_string(),
			business_network: business_network.to_string(),
			participant_id: participant_id.to_string(),
			participant_pwd: participant_pwd.to_string(),
		});
		let gate = self.connect_gate.lock().unwrap().clone();
		if let Some(gate) = gate {
			let _permit = gate.acquire().await;
		}
		if let Some(error) = self.fail_connect.lock().unwrap().take() {
			return Err(error);
		}
		Ok(self.definition.clone() as Arc<dyn NetworkDefinition>)
	}

	async fn disconnect(&self) -> Result<(), NetworkError> {
		*self.disconnect_calls.lock().unwrap() += 1;
		if let Some(error) = self.fail_disconnect.lock().unwrap().take() {
			return Err(error);
		}
		Ok(())
	}

	async fn ping(&self) -> Result<Value, NetworkError> {
		self.ping_result.lock().unwrap().clone()
	}

	async fn submit_transaction(&self, transaction: Resource) -> Result<(), NetworkError> {
		if let Some(error) = self.fail_submit.lock().unwrap().take() {
			return Err(error);
		}
		self.submitted.lock().unwrap().push(transaction);
		Ok(())
	}

	async fn asset_registry(&self, type_name: &str) -> Result<Arc<dyn Registry>, NetworkError> {
		Ok(self.asset_registry_handle(type_name)? as Arc<dyn Registry>)
	}

	async fn participant_registry(
		&self,
		type_name: &str,
	) -> Result<Arc<dyn Registry>, NetworkError> {
		Ok(self.participant_registry_handle(type_name)? as Arc<dyn Registry>)
	}

	async fn business_network(&self) -> Result<Arc<dyn NetworkDefinition>, NetworkError> {
		Ok(self.definition.clone() as Arc<dyn NetworkDefinition>)
	}
}
