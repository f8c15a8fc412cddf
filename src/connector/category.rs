//! Runtime category resolution for declared types.

use crate::network::{ClassDeclaration, DeclarationKind};

use super::types::ConnectorError;

/// The three record categories the ledger model supports.
///
/// Every CRUD operation resolves its target declaration into exactly one of
/// these before touching the network. Declarations outside the union are
/// rejected up front rather than falling through to the wrong registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceCategory {
	Asset,
	Participant,
	Transaction,
}

/// Resolve a declaration to its category.
pub fn resolve_category(
	declaration: &ClassDeclaration,
) -> Result<ResourceCategory, ConnectorError> {
	match declaration.kind {
		DeclarationKind::Asset => Ok(ResourceCategory::Asset),
		DeclarationKind::Participant => Ok(ResourceCategory::Participant),
		DeclarationKind::Transaction => Ok(ResourceCategory::Transaction),
		DeclarationKind::Concept | DeclarationKind::Enumeration => Err(
			ConnectorError::UnsupportedType(declaration.fully_qualified_name.clone()),
		),
	}
}
