//! Connection lifecycle for the business network client.
//!
//! The connector holds exactly one logical connection. Callers that need
//! the network while a handshake is in flight all await the same shared
//! attempt, so the underlying client sees at most one connect regardless of
//! call concurrency. The handshake itself runs on a spawned task; a caller
//! dropping its future cannot strand the state machine mid-transition. A
//! generation counter stops a stale handshake from resurrecting state once
//! `disconnect` has run.

use std::sync::{Arc, Mutex};

use futures::FutureExt;
use futures::future::{BoxFuture, Shared};
use tracing::{debug, info, warn};

use crate::network::{BusinessNetworkClient, NetworkDefinition, NetworkError};

use super::types::{ConnectorError, ConnectorSettings};

type ConnectResult = Result<Arc<dyn NetworkDefinition>, ConnectorError>;
type PendingConnect = Shared<BoxFuture<'static, ConnectResult>>;

enum ConnectionState {
	Disconnected,
	Connecting(PendingConnect),
	Connected(Arc<dyn NetworkDefinition>),
}

struct Inner {
	generation: u64,
	state: ConnectionState,
}

/// Connection state machine for one connector.
pub(crate) struct Connection {
	client: Arc<dyn BusinessNetworkClient>,
	settings: ConnectorSettings,
	inner: Arc<Mutex<Inner>>,
}

impl Connection {
	pub(crate) fn new(client: Arc<dyn BusinessNetworkClient>, settings: ConnectorSettings) -> Self {
		Self {
			client,
			settings,
			inner: Arc::new(Mutex::new(Inner {
				generation: 0,
				state: ConnectionState::Disconnected,
			})),
		}
	}

	pub(crate) fn is_connected(&self) -> bool {
		matches!(self.inner.lock().unwrap().state, ConnectionState::Connected(_))
	}

	pub(crate) fn is_connecting(&self) -> bool {
		matches!(self.inner.lock().unwrap().state, ConnectionState::Connecting(_))
	}

	/// Definition of the connected network, connecting first if needed.
	///
	/// Idempotent: already Connected returns the cached definition,
	/// Connecting awaits the in-flight attempt, Disconnected starts one.
	pub(crate) async fn ensure(&self) -> ConnectResult {
		let pending = {
			let mut inner = self.inner.lock().unwrap();
			match &inner.state {
				ConnectionState::Connected(definition) => return Ok(definition.clone()),
				ConnectionState::Connecting(pending) => pending.clone(),
				ConnectionState::Disconnected => {
					let pending = self.start_connect(inner.generation);
					inner.state = ConnectionState::Connecting(pending.clone());
					pending
				}
			}
		};
		pending.await
	}

	/// Tear down the connection.
	///
	/// Both the Connected and Connecting flags are cleared even when the
	/// underlying disconnect fails; the failure is still surfaced.
	pub(crate) async fn disconnect(&self) -> Result<(), ConnectorError> {
		let was_connected = {
			let mut inner = self.inner.lock().unwrap();
			let was_connected = matches!(inner.state, ConnectionState::Connected(_));
			inner.generation += 1;
			inner.state = ConnectionState::Disconnected;
			was_connected
		};
		if !was_connected {
			return Ok(());
		}
		match self.client.disconnect().await {
			Ok(()) => {
				info!(
					network = %self.settings.business_network_identifier,
					"Disconnected from business network"
				);
				Ok(())
			}
			Err(error) => {
				warn!("Business network disconnect failed: {error}");
				Err(error.into())
			}
		}
	}

	/// Start the handshake on its own task so it completes and records its
	/// outcome even if every caller drops.
	fn start_connect(&self, generation: u64) -> PendingConnect {
		let client = self.client.clone();
		let settings = self.settings.clone();
		let inner = self.inner.clone();
		debug!(
			network = %settings.business_network_identifier,
			profile = %settings.connection_profile_name,
			"Opening business network connection"
		);
		let handshake = tokio::spawn(async move {
			let result = client
				.connect(
					&settings.connection_profile_name,
					&settings.business_network_identifier,
					&settings.participant_id,
					&settings.participant_pwd,
				)
				.await;
			let mut inner = inner.lock().unwrap();
			if inner.generation != generation {
				// Disconnected while the handshake was in flight; the
				// outcome no longer owns the state.
				return result.map_err(ConnectorError::from);
			}
			match result {
				Ok(definition) => {
					info!(
						network = %settings.business_network_identifier,
						"Connected to business network"
					);
					inner.state = ConnectionState::Connected(definition.clone());
					Ok(definition)
				}
				Err(error) => {
					warn!("Business network connection failed: {error}");
					inner.state = ConnectionState::Disconnected;
					Err(error.into())
				}
			}
		});
		async move {
			match handshake.await {
				Ok(result) => result,
				Err(error) => Err(ConnectorError::Network(NetworkError::Connection(format!(
					"connection task failed: {error}"
				)))),
			}
		}
		.boxed()
		.shared()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::network::mock::{ConnectCall, MockBusinessNetwork};
	use futures::future::join_all;
	use std::time::Duration;
	use tokio::time::sleep;

	fn settings() -> ConnectorSettings {
		ConnectorSettings {
			connection_profile_name: "P".to_string(),
			business_network_identifier: "B".to_string(),
			participant_id: "U".to_string(),
			participant_pwd: "W".to_string(),
		}
	}

	fn connection() -> (Arc<MockBusinessNetwork>, Arc<Connection>) {
		let _ = tracing_subscriber::fmt()
			.with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
			.try_init();
		let network = Arc::new(MockBusinessNetwork::new(Vec::new()));
		let connection = Arc::new(Connection::new(network.clone(), settings()));
		(network, connection)
	}

	#[tokio::test]
	async fn test_connect_transitions_to_connected() {
		let (network, connection) = connection();
		assert!(!connection.is_connected());

		connection.ensure().await.expect("connect");

		assert!(connection.is_connected());
		assert!(!connection.is_connecting());
		assert_eq!(
			network.connect_calls(),
			vec![ConnectCall {
				connection_profile: "P".to_string(),
				business_network: "B".to_string(),
				participant_id: "U".to_string(),
				participant_pwd: "W".to_string(),
			}]
		);
	}

	#[tokio::test]
	async fn test_connect_failure_returns_to_disconnected() {
		let (network, connection) = connection();
		network.fail_connect(NetworkError::Connection("access denied".to_string()));

		let error = connection.ensure().await.expect_err("handshake failure");
		assert!(error.to_string().contains("access denied"));
		assert!(!connection.is_connected());
		assert!(!connection.is_connecting());

		// A later call starts a fresh attempt rather than replaying the failure.
		connection.ensure().await.expect("second attempt");
		assert!(connection.is_connected());
		assert_eq!(network.connect_calls().len(), 2);
	}

	#[tokio::test]
	async fn test_concurrent_ensure_coalesces_to_one_handshake() {
		let (network, connection) = connection();
		let gate = network.hold_connect();

		let callers: Vec<_> = (0..5)
			.map(|_| {
				let connection = connection.clone();
				tokio::spawn(async move { connection.ensure().await })
			})
			.collect();
		sleep(Duration::from_millis(10)).await;
		assert!(connection.is_connecting());
		assert_eq!(network.connect_calls().len(), 1);

		gate.add_permits(5);
		for caller in join_all(callers).await {
			caller.expect("join").expect("ensure");
		}
		assert!(connection.is_connected());
		assert_eq!(network.connect_calls().len(), 1);
	}

	#[tokio::test]
	async fn test_ensure_is_a_no_op_when_connected() {
		let (network, connection) = connection();
		connection.ensure().await.expect("connect");
		connection.ensure().await.expect("second ensure");
		assert_eq!(network.connect_calls().len(), 1);
	}

	#[tokio::test]
	async fn test_abandoned_caller_still_completes_the_handshake() {
		let (network, connection) = connection();
		let gate = network.hold_connect();

		let caller = {
			let connection = connection.clone();
			tokio::spawn(async move { connection.ensure().await })
		};
		sleep(Duration::from_millis(10)).await;
		caller.abort();

		gate.add_permits(1);
		sleep(Duration::from_millis(10)).await;
		assert!(connection.is_connected());
	}

	#[tokio::test]
	async fn test_disconnect_clears_both_flags() {
		let (network, connection) = connection();
		connection.ensure().await.expect("connect");

		connection.disconnect().await.expect("disconnect");

		assert!(!connection.is_connected());
		assert!(!connection.is_connecting());
		assert_eq!(network.disconnect_calls(), 1);
	}

	#[tokio::test]
	async fn test_disconnect_when_disconnected_is_a_no_op() {
		let (network, connection) = connection();
		connection.disconnect().await.expect("disconnect");
		assert_eq!(network.disconnect_calls(), 0);
	}

	#[tokio::test]
	async fn test_disconnect_failure_still_clears_state() {
		let (network, connection) = connection();
		connection.ensure().await.expect("connect");
		network.fail_disconnect(NetworkError::Connection("teardown failed".to_string()));

		let error = connection.disconnect().await.expect_err("failure surfaced");
		assert!(error.to_string().contains("teardown failed"));
		assert!(!connection.is_connected());
		assert!(!connection.is_connecting());
	}

	#[tokio::test]
	async fn test_disconnect_during_handshake_wins_over_the_stale_result() {
		let (network, connection) = connection();
		let gate = network.hold_connect();

		let caller = {
			let connection = connection.clone();
			tokio::spawn(async move { connection.ensure().await })
		};
		sleep(Duration::from_millis(10)).await;
		assert!(connection.is_connecting());

		connection.disconnect().await.expect("disconnect");
		assert!(!connection.is_connecting());

		gate.add_permits(1);
		caller.await.expect("join").expect("handshake result");
		// The stale handshake must not resurrect the connection.
		assert!(!connection.is_connected());
		assert_eq!(network.disconnect_calls(), 0);
	}
}
