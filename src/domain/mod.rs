//! Core domain entities: nodes, connections, and SSH key pairs.
//!
//! Entities validate themselves on construction and are immutable
//! afterwards except through the explicit mutators they expose.
//! Repositories reconstruct entities with server-assigned values
//! (`with_generated`) once a row has been committed.

pub mod connection;
pub mod keys;
pub mod node;

pub use connection::{Connection, ROOT_USER};
pub use keys::ConnectionSshKeyPair;
pub use node::{Node, DEFAULT_SSH_PORT};
