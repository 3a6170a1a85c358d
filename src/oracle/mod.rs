//! External key inspection
//!
//! Key size, algorithm and fingerprint are never computed in-process; they
//! come from an inspector such as `ssh-keygen -l -f <file>`.

mod keygen;

use std::path::Path;

use crate::error::Result;

pub use keygen::{SshKeygen, DEFAULT_PROGRAM, DEFAULT_TIMEOUT};

/// Raw listing produced by an inspector for one key file.
///
/// Expected line shape: `<bits> <fingerprint> <comment...> <(ALGORITHM)>`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Inspection {
    pub stdout: String,
    /// False where the inspector prints no algorithm label (ssh-keygen on Windows)
    pub reports_algorithm: bool,
}

impl Inspection {
    pub fn new(stdout: impl Into<String>) -> Self {
        Self {
            stdout: stdout.into(),
            reports_algorithm: true,
        }
    }

    pub fn without_algorithm(mut self) -> Self {
        self.reports_algorithm = false;
        self
    }

    /// Whitespace separated fields of the listing
    pub fn fields(&self) -> Vec<&str> {
        self.stdout.split_whitespace().collect()
    }
}

/// Trait for key inspectors
pub trait KeyInspector: Send + Sync {
    /// List size, fingerprint and algorithm of the public key stored at `path`
    fn inspect(&self, path: &Path) -> Result<Inspection>;
}
