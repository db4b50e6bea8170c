//! Configures the GraphQL gateway so it exposes the todos table to unauthenticated clients.
//!
//! The gateway reads and writes the same table the REST backend uses. Everything here runs once
//! per deployment through the init-gateway binary.

pub mod bootstrap;
pub mod metadata;

pub use bootstrap::{BootstrapError, MetadataBootstrapper};
