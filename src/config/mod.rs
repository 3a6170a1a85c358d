//! Configuration management for ssh-keysync
//!
//! Resolves, once at startup:
//! - The SSH directory holding `authorized_keys`
//! - The executable and config file named in forced commands
//! - The key inspector and its timeout
//! - The key registry location

mod settings;

pub use settings::{ResolvedSettings, Settings};
