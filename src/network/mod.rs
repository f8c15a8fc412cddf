//! Business network collaborator contracts.
//!
//! This module defines the surface the connector uses to talk to a deployed
//! business network: the ledger client, the network definition it returns on
//! connect, per-type registries, and the introspection and serialization
//! services. Production implementations ship with the ledger client; the
//! connector only ever calls through these traits.

/// Collaborator traits for the ledger client and its services
mod client;
/// In-memory collaborator implementations for tests
pub mod mock;
/// Data types exchanged with the business network
mod types;

pub use client::*;
pub use types::*;
