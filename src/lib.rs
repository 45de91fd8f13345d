//! # Nodewarden - Node Inventory and SSH Access Provisioning
//!
//! Nodewarden keeps an inventory of remote hosts ("nodes") and
//! provisions SSH access to accounts on them ("connections"). Creating
//! a connection generates a dedicated RSA key pair, stores it in
//! HashiCorp Vault, and hands the public half back to the caller. A
//! separate operation installs that public key into the remote
//! account's `authorized_keys` over a password-authenticated SSH
//! session, after which key-based access can be verified with a ping.
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────┐
//! │                   REST API (axum)                    │
//! │        nodes / connections / remote operations       │
//! └─────────────────────────────────────────────────────┘
//!                           │
//!                           ▼
//! ┌─────────────────────────────────────────────────────┐
//! │                  Application services                │
//! │    NodeService / ConnectionService / RemoteAccess    │
//! └─────────────────────────────────────────────────────┘
//!          │                │                   │
//!          ▼                ▼                   ▼
//! ┌───────────────┐ ┌───────────────┐ ┌─────────────────┐
//! │ Repositories  │ │  Secret store │ │  SSH executor   │
//! │  (in-memory)  │ │  (Vault KVv2) │ │    (russh)      │
//! └───────────────┘ └───────────────┘ └─────────────────┘
//! ```
//!
//! Key material never touches the relational state: private keys live
//! only in the secret store, optionally sealed with AES-256-GCM under
//! a PBKDF2-derived key.

pub mod api;
pub mod config;
pub mod domain;
pub mod error;
pub mod keygen;
pub mod repository;
pub mod secrets;
pub mod service;
pub mod ssh;

pub use config::Config;
pub use error::{Error, Result};

/// Returns the crate version.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
