//! Fingerprint extraction for duplicate detection

use std::fs;

use crate::error::{KeySyncError, Result};
use crate::oracle::KeyInspector;

const KEY_FILE_NAME: &str = "id_rsa.pub";

/// Compute the fingerprint of a canonical public key.
///
/// The key is written into its own fresh temporary directory so concurrent
/// callers never share a path. The fingerprint is the second field of the
/// inspector listing.
pub fn calculate_fingerprint(inspector: &dyn KeyInspector, content: &str) -> Result<String> {
    let dir = tempfile::Builder::new().prefix("keysync").tempdir()?;
    let path = dir.path().join(KEY_FILE_NAME);
    fs::write(&path, content)?;

    let inspection = inspector.inspect(&path)?;
    let fields = inspection.fields();
    if inspection.stdout.trim().len() < 2 || fields.len() < 2 {
        return Err(KeySyncError::OracleOutput(inspection.stdout.clone()));
    }

    Ok(fields[1].to_string())
}
