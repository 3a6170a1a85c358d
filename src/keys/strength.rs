//! Key strength policy
//!
//! The inspector reports `<bits> ... (<ALGORITHM>)`; each algorithm label has a
//! minimum accepted size.

use std::io::Write;

use tracing::debug;

use crate::error::{KeySyncError, Result};
use crate::oracle::{Inspection, KeyInspector};

/// Minimum accepted key size in bits, keyed by the inspector's algorithm label
pub const MINIMUM_KEY_SIZES: &[(&str, u32)] = &[
    ("(ED25519)", 256),
    ("(ECDSA)", 256),
    ("(NTRU)", 1087),
    ("(MCE)", 1702),
    ("(McE)", 1702),
    ("(RSA)", 2048),
    ("(DSA)", 1024),
];

/// Look up the minimum size for an algorithm label
pub fn minimum_key_size(label: &str) -> Option<u32> {
    MINIMUM_KEY_SIZES
        .iter()
        .find(|(name, _)| *name == label)
        .map(|(_, bits)| *bits)
}

/// Check that a single-line public key is recognized by the inspector and
/// meets the minimum size for its algorithm.
pub fn check_public_key_string(inspector: &dyn KeyInspector, content: &str) -> Result<()> {
    let content = content.trim_end_matches(['\n', '\r']);
    if content.contains(['\n', '\r']) {
        return Err(KeySyncError::MultipleLines);
    }

    let mut file = tempfile::Builder::new().prefix("keytest").tempfile()?;
    file.write_all(content.as_bytes())?;
    file.flush()?;
    // Close our handle but keep the file until the path guard drops
    let path = file.into_temp_path();

    let inspection = inspector.inspect(&path)?;
    evaluate(&inspection)
}

/// Apply the size policy to an inspector listing.
pub fn evaluate(inspection: &Inspection) -> Result<()> {
    if inspection.stdout.trim().len() < 2 {
        return Err(KeySyncError::OracleOutput(inspection.stdout.clone()));
    }

    if !inspection.reports_algorithm {
        return Ok(());
    }

    let fields = inspection.fields();
    if fields.len() < 4 {
        return Err(KeySyncError::UnableToVerify);
    }

    let bits: u32 = match fields[0].parse() {
        Ok(bits) if bits > 0 => bits,
        _ => return Err(KeySyncError::KeySizeUnknown),
    };

    let label = fields[fields.len() - 1];
    let minimum = minimum_key_size(label)
        .ok_or_else(|| KeySyncError::UnrecognizedKeyType(label.to_string()))?;

    debug!(algorithm = label, bits, minimum, "key size checked");

    if bits < minimum {
        return Err(KeySyncError::KeyTooWeak {
            algorithm: label.to_string(),
            minimum,
        });
    }

    Ok(())
}
