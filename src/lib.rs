//! SSH Keysync - public key ingestion and `authorized_keys` synchronization
//!
//! This crate:
//! - Parses user-submitted keys in OpenSSH and SSH2 formats
//! - Enforces a minimum key size per algorithm via `ssh-keygen`
//! - Deduplicates keys by fingerprint
//! - Keeps `authorized_keys` in step with the key registry

pub mod authorized;
pub mod cli;
pub mod config;
pub mod error;
pub mod keys;
pub mod oracle;
pub mod registry;
pub mod service;

#[cfg(test)]
mod testutil;

pub use error::{KeySyncError, Result};
pub use service::{CheckedKey, KeyService};
