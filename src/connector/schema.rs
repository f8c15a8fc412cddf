//! ORM schema discovery descriptors.
//!
//! Builds the descriptors the host ORM consumes from introspected class
//! declarations. The [`SchemaDescriptor`] shape is a compatibility contract
//! with the host: field names, nesting and the literal
//! `validateUpsert: true` option must serialize exactly as written here.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::network::{ClassDeclaration, DeclarationKind};

/// One discovered model, addressable as a table by the host ORM.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelDefinition {
	/// Descriptor kind; always "table" for discovered ledger types
	#[serde(rename = "type")]
	pub kind: String,
	/// Fully-qualified declared type name
	pub name: String,
}

/// ORM schema for one declared type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchemaDescriptor {
	pub acls: Vec<Value>,
	pub base: String,
	pub description: String,
	pub id_injection: bool,
	pub methods: Map<String, Value>,
	pub name: String,
	pub options: SchemaOptions,
	pub plural: String,
	pub properties: BTreeMap<String, PropertySchema>,
	pub relations: Map<String, Value>,
	pub validations: Vec<Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchemaOptions {
	pub validate_upsert: bool,
}

/// Schema entry for one declared property.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertySchema {
	#[serde(skip_serializing_if = "Option::is_none", default)]
	pub description: Option<String>,
	#[serde(skip_serializing_if = "is_false", default)]
	pub id: bool,
	pub required: bool,
	#[serde(rename = "type")]
	pub property_type: String,
}

fn is_false(value: &bool) -> bool {
	!*value
}

/// Table descriptors for every addressable declaration.
///
/// Declarations without an identifying field are placeholder entries the
/// host ORM cannot address; they are skipped, not errored.
pub(crate) fn model_definitions(declarations: Vec<ClassDeclaration>) -> Vec<ModelDefinition> {
	declarations
		.into_iter()
		.filter(|declaration| declaration.identifier.is_some())
		.map(|declaration| ModelDefinition {
			kind: "table".to_string(),
			name: declaration.fully_qualified_name,
		})
		.collect()
}

/// Build the ORM schema for one declaration.
pub(crate) fn schema_descriptor(declaration: &ClassDeclaration) -> SchemaDescriptor {
	let id_field = declaration.identifier.as_deref();
	let mut properties = BTreeMap::new();
	for property in &declaration.properties {
		let id = id_field == Some(property.name.as_str());
		properties.insert(
			property.name.clone(),
			PropertySchema {
				description: id.then(|| "The instance identifier for this type".to_string()),
				id,
				required: !property.optional,
				property_type: property.property_type.orm_type().to_string(),
			},
		);
	}
	SchemaDescriptor {
		acls: Vec::new(),
		base: "PersistedModel".to_string(),
		description: format!("{} named {}", kind_label(declaration.kind), declaration.short_name()),
		id_injection: true,
		methods: Map::new(),
		name: declaration.short_name().to_string(),
		options: SchemaOptions {
			validate_upsert: true,
		},
		plural: declaration.fully_qualified_name.clone(),
		properties,
		relations: Map::new(),
		validations: Vec::new(),
	}
}

fn kind_label(kind: DeclarationKind) -> &'static str {
	match kind {
		DeclarationKind::Asset => "An asset",
		DeclarationKind::Participant => "A participant",
		DeclarationKind::Transaction => "A transaction",
		DeclarationKind::Concept => "A concept",
		DeclarationKind::Enumeration => "An enumeration",
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::network::{PropertyDeclaration, PropertyType};
	use serde_json::json;

	fn base_asset() -> ClassDeclaration {
		ClassDeclaration {
			fully_qualified_name: "org.acme.base.BaseAsset".to_string(),
			kind: DeclarationKind::Asset,
			identifier: Some("theValue".to_string()),
			properties: vec![PropertyDeclaration {
				name: "theValue".to_string(),
				property_type: PropertyType::String,
				optional: false,
			}],
		}
	}

	#[test]
	fn test_model_definitions_describe_tables() {
		let definitions = model_definitions(vec![base_asset()]);
		assert_eq!(
			serde_json::to_value(&definitions).expect("serialize"),
			json!([{ "type": "table", "name": "org.acme.base.BaseAsset" }])
		);
	}

	#[test]
	fn test_model_definitions_skip_identity_less_declarations() {
		let stub = ClassDeclaration {
			fully_qualified_name: "org.acme.base.Draft".to_string(),
			kind: DeclarationKind::Asset,
			identifier: None,
			properties: Vec::new(),
		};
		let definitions = model_definitions(vec![stub, base_asset()]);
		assert_eq!(definitions.len(), 1);
		assert_eq!(definitions[0].name, "org.acme.base.BaseAsset");
	}

	#[test]
	fn test_schema_descriptor_matches_orm_shape() {
		let descriptor = schema_descriptor(&base_asset());
		assert_eq!(
			serde_json::to_value(&descriptor).expect("serialize"),
			json!({
				"acls": [],
				"base": "PersistedModel",
				"description": "An asset named BaseAsset",
				"idInjection": true,
				"methods": {},
				"name": "BaseAsset",
				"options": { "validateUpsert": true },
				"plural": "org.acme.base.BaseAsset",
				"properties": {
					"theValue": {
						"description": "The instance identifier for this type",
						"id": true,
						"required": true,
						"type": "string",
					},
				},
				"relations": {},
				"validations": [],
			})
		);
	}

	#[test]
	fn test_schema_descriptor_maps_property_types() {
		let declaration = ClassDeclaration {
			fully_qualified_name: "org.acme.base.Member".to_string(),
			kind: DeclarationKind::Participant,
			identifier: Some("memberId".to_string()),
			properties: vec![
				PropertyDeclaration {
					name: "memberId".to_string(),
					property_type: PropertyType::String,
					optional: false,
				},
				PropertyDeclaration {
					name: "age".to_string(),
					property_type: PropertyType::Integer,
					optional: true,
				},
				PropertyDeclaration {
					name: "active".to_string(),
					property_type: PropertyType::Boolean,
					optional: false,
				},
				PropertyDeclaration {
					name: "joined".to_string(),
					property_type: PropertyType::DateTime,
					optional: true,
				},
			],
		};

		let descriptor = schema_descriptor(&declaration);
		assert_eq!(descriptor.description, "A participant named Member");

		let age = &descriptor.properties["age"];
		assert_eq!(age.property_type, "number");
		assert!(!age.required);
		assert!(!age.id);
		assert_eq!(descriptor.properties["active"].property_type, "boolean");
		assert_eq!(descriptor.properties["joined"].property_type, "date");

		// Non-identifying properties serialize without id or description keys.
		let serialized = serde_json::to_value(age).expect("serialize");
		assert_eq!(serialized, json!({ "required": false, "type": "number" }));
	}
}
