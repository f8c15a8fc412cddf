//! Data types exchanged with the business network.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Wire JSON key carrying the fully-qualified type name of a record.
pub const CLASS_TAG: &str = "$class";

/// A typed record produced by the network serializer.
///
/// The payload keeps its `$class` tag so a resource serializes back to the
/// exact wire JSON it was built from. Resources are ephemeral; one is
/// created per CRUD call and discarded once the call completes.
#[derive(Debug, Clone, PartialEq)]
pub struct Resource {
	class_name: String,
	data: Value,
}

impl Resource {
	pub fn new(class_name: impl Into<String>, data: Value) -> Self {
		Self {
			class_name: class_name.into(),
			data,
		}
	}

	/// Fully-qualified name of the declared type this record carries.
	pub fn class_name(&self) -> &str {
		&self.class_name
	}

	pub fn data(&self) -> &Value {
		&self.data
	}

	/// Value of the named field, if present.
	pub fn field(&self, name: &str) -> Option<&Value> {
		self.data.get(name)
	}
}

/// The modelled kind of a class declaration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeclarationKind {
	Asset,
	Participant,
	Transaction,
	Concept,
	Enumeration,
}

/// Primitive property types the deployed model can declare
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PropertyType {
	String,
	Integer,
	Long,
	Double,
	Boolean,
	DateTime,
}

impl PropertyType {
	/// ORM type name this ledger type maps to.
	pub fn orm_type(&self) -> &'static str {
		match self {
			PropertyType::String => "string",
			PropertyType::Integer | PropertyType::Long | PropertyType::Double => "number",
			PropertyType::Boolean => "boolean",
			PropertyType::DateTime => "date",
		}
	}
}

/// One declared field of a class declaration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertyDeclaration {
	pub name: String,
	pub property_type: PropertyType,
	pub optional: bool,
}

/// Metadata for one type declared by the deployed model.
///
/// Declarations come from the network introspector; the connector never
/// constructs them itself. `identifier` names the field that addresses
/// instances of the type, and is absent for placeholder declarations that
/// cannot be addressed at all.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassDeclaration {
	pub fully_qualified_name: String,
	pub kind: DeclarationKind,
	pub identifier: Option<String>,
	pub properties: Vec<PropertyDeclaration>,
}

impl ClassDeclaration {
	/// Declaration name without its namespace.
	pub fn short_name(&self) -> &str {
		self.fully_qualified_name
			.rsplit('.')
			.next()
			.unwrap_or(&self.fully_qualified_name)
	}
}

/// Errors surfaced by business network collaborators.
///
/// Variants carry the collaborator's own diagnostic text. `Clone` lets a
/// single handshake failure fan out to every caller awaiting the shared
/// connect attempt.
#[derive(Debug, Clone, thiserror::Error)]
pub enum NetworkError {
	#[error("Connection error: {0}")]
	Connection(String),

	#[error("Registry error: {0}")]
	Registry(String),

	#[error("Serialization error: {0}")]
	Serialization(String),

	#[error("Introspection error: {0}")]
	Introspection(String),

	#[error("Transaction error: {0}")]
	Transaction(String),
}

#[cfg(test)]
mod tests {
	use super::*;
	use serde_json::json;

	#[test]
	fn test_orm_type_mapping() {
		assert_eq!(PropertyType::String.orm_type(), "string");
		assert_eq!(PropertyType::Integer.orm_type(), "number");
		assert_eq!(PropertyType::Long.orm_type(), "number");
		assert_eq!(PropertyType::Double.orm_type(), "number");
		assert_eq!(PropertyType::Boolean.orm_type(), "boolean");
		assert_eq!(PropertyType::DateTime.orm_type(), "date");
	}

	#[test]
	fn test_short_name_strips_namespace() {
		let declaration = ClassDeclaration {
			fully_qualified_name: "org.acme.base.BaseAsset".to_string(),
			kind: DeclarationKind::Asset,
			identifier: Some("theValue".to_string()),
			properties: Vec::new(),
		};
		assert_eq!(declaration.short_name(), "BaseAsset");
	}

	#[test]
	fn test_short_name_without_namespace() {
		let declaration = ClassDeclaration {
			fully_qualified_name: "BaseAsset".to_string(),
			kind: DeclarationKind::Asset,
			identifier: None,
			properties: Vec::new(),
		};
		assert_eq!(declaration.short_name(), "BaseAsset");
	}

	#[test]
	fn test_resource_field_access() {
		let resource = Resource::new(
			"org.acme.base.BaseAsset",
			json!({ "$class": "org.acme.base.BaseAsset", "theValue": "a1" }),
		);
		assert_eq!(resource.class_name(), "org.acme.base.BaseAsset");
		assert_eq!(resource.field("theValue"), Some(&json!("a1")));
		assert_eq!(resource.field("missing"), None);
	}
}
