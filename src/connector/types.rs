//! Connector settings and error taxonomy.

use serde::Deserialize;

use crate::network::NetworkError;

/// Connection settings for one deployed business network.
///
/// Supplied by the host data source at construction time and never mutated
/// afterwards. The JSON keys match the datasource configuration the host
/// ORM passes through.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectorSettings {
	/// Named connection profile to open the ledger connection with
	pub connection_profile_name: String,
	/// Identifier of the deployed business network
	pub business_network_identifier: String,
	/// Participant to authenticate as
	pub participant_id: String,
	/// Credential for the participant
	pub participant_pwd: String,
}

impl ConnectorSettings {
	/// Reject settings with an empty field before a connector is built.
	pub fn validate(&self) -> Result<(), ConnectorError> {
		let fields = [
			("connectionProfileName", &self.connection_profile_name),
			("businessNetworkIdentifier", &self.business_network_identifier),
			("participantId", &self.participant_id),
			("participantPwd", &self.participant_pwd),
		];
		for (name, value) in fields {
			if value.is_empty() {
				return Err(ConnectorError::Settings(format!("{name} must not be empty")));
			}
		}
		Ok(())
	}
}

/// Errors returned by connector operations.
///
/// Collaborator failures pass through transparently so their diagnostic
/// text reaches the caller unchanged. `Clone` lets a failure resolve every
/// caller of a coalesced connect attempt.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ConnectorError {
	/// The resolved declaration is not an asset, participant or transaction
	#[error("Unable to handle resource of type {0}")]
	UnsupportedType(String),

	/// Collaborator failure, surfaced as-is with no retry
	#[error(transparent)]
	Network(#[from] NetworkError),

	/// Invalid construction-time settings
	#[error("Invalid connector settings: {0}")]
	Settings(String),
}

#[cfg(test)]
mod tests {
	use super::*;
	use serde_json::json;

	fn settings() -> ConnectorSettings {
		ConnectorSettings {
			connection_profile_name: "P".to_string(),
			business_network_identifier: "B".to_string(),
			participant_id: "U".to_string(),
			participant_pwd: "W".to_string(),
		}
	}

	#[test]
	fn test_settings_deserialize_from_datasource_json() {
		let parsed: ConnectorSettings = serde_json::from_value(json!({
			"connectionProfileName": "P",
			"businessNetworkIdentifier": "B",
			"participantId": "U",
			"participantPwd": "W",
		}))
		.expect("datasource config");
		assert_eq!(parsed, settings());
	}

	#[test]
	fn test_validate_accepts_complete_settings() {
		assert!(settings().validate().is_ok());
	}

	#[test]
	fn test_validate_rejects_empty_field() {
		let mut incomplete = settings();
		incomplete.participant_id.clear();
		let error = incomplete.validate().expect_err("empty participantId");
		assert!(error.to_string().contains("participantId"));
	}

	#[test]
	fn test_unsupported_type_message() {
		let error = ConnectorError::UnsupportedType("org.acme.base.Address".to_string());
		assert_eq!(
			error.to_string(),
			"Unable to handle resource of type org.acme.base.Address"
		);
	}

	#[test]
	fn test_network_errors_pass_through_unchanged() {
		let original = NetworkError::Registry("the registry is on fire".to_string());
		let wrapped = ConnectorError::from(original.clone());
		assert_eq!(wrapped.to_string(), original.to_string());
	}
}
