//! Shared test helpers

use std::collections::hash_map::DefaultHasher;
use std::collections::HashMap;
use std::fs;
use std::hash::{Hash, Hasher};
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};

use base64::{engine::general_purpose::STANDARD, Engine as _};

use crate::error::Result;
use crate::oracle::{Inspection, KeyInspector};

/// Deterministic stand-in for `ssh-keygen -l`.
///
/// Unless overridden per key, reports every key as `bits`/`label` with a
/// fingerprint derived from the file content.
pub struct FixtureInspector {
    bits: u32,
    label: String,
    listings: HashMap<String, String>,
    calls: AtomicUsize,
}

impl FixtureInspector {
    pub fn new() -> Self {
        Self {
            bits: 256,
            label: "(ED25519)".to_string(),
            listings: HashMap::new(),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn reporting(mut self, bits: u32, label: &str) -> Self {
        self.bits = bits;
        self.label = label.to_string();
        self
    }

    pub fn with_listing(mut self, content: &str, listing: &str) -> Self {
        self.listings.insert(content.to_string(), listing.to_string());
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn fingerprint_of(content: &str) -> String {
        let mut hasher = DefaultHasher::new();
        content.trim().hash(&mut hasher);
        format!("SHA256:{:016x}", hasher.finish())
    }
}

impl Default for FixtureInspector {
    fn default() -> Self {
        Self::new()
    }
}

impl KeyInspector for FixtureInspector {
    fn inspect(&self, path: &Path) -> Result<Inspection> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let content = fs::read_to_string(path)?;
        let content = content.trim();

        let listing = match self.listings.get(content) {
            Some(listing) => listing.clone(),
            None => format!(
                "{} {} fixture ({})\n",
                self.bits,
                Self::fingerprint_of(content),
                self.label
            ),
        };
        Ok(Inspection::new(listing))
    }
}

/// Base64 key blob whose header names `algorithm`; `seed` makes it unique
pub fn key_blob(algorithm: &str, seed: u32) -> String {
    let mut data = Vec::new();
    data.extend_from_slice(&(algorithm.len() as u32).to_be_bytes());
    data.extend_from_slice(algorithm.as_bytes());
    data.extend_from_slice(&4u32.to_be_bytes());
    data.extend_from_slice(&seed.to_be_bytes());
    STANDARD.encode(data)
}

/// Single-line OpenSSH key text built from [`key_blob`]
pub fn openssh_key(algorithm: &str, seed: u32, comment: &str) -> String {
    format!("{} {} {}", algorithm, key_blob(algorithm, seed), comment)
}
