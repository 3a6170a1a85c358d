//! Public key text parsing
//!
//! Accepts both encodings users paste into the key form:
//!
//! OpenSSH, one line:
//!   `ssh-ed25519 AAAAC3NzaC1lZDI1NTE5AAAAI... user@host`
//!
//! SSH2 (RFC 4716), several lines:
//!   ---- BEGIN SSH2 PUBLIC KEY ----
//!   Comment: "user@host"
//!   AAAAB3NzaC1yc2EAAAADAQABAAABAQ...
//!   ---- END SSH2 PUBLIC KEY ----
//!
//! Both are reduced to the canonical `type base64 [comment]` form that is
//! stored in the registry and written to `authorized_keys`.

use base64::{engine::general_purpose::STANDARD, Engine as _};

use crate::error::{KeySyncError, Result};

/// A public key split into its three textual parts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedKey {
    /// Algorithm name, e.g. `ssh-rsa`
    pub key_type: String,
    /// Base64 encoded key blob
    pub content: String,
    /// Free-form comment, empty when none was given
    pub comment: String,
}

impl ParsedKey {
    /// Canonical single-line form. A key without a comment has no
    /// trailing separator.
    pub fn to_canonical(&self) -> String {
        if self.comment.is_empty() {
            format!("{} {}", self.key_type, self.content)
        } else {
            format!("{} {} {}", self.key_type, self.content, self.comment)
        }
    }
}

/// Read the algorithm name embedded at the start of a key blob.
///
/// Blob layout: `[4 bytes: name length (u32 BE)][name][...]`
pub fn embedded_key_type(content: &str) -> Result<String> {
    let blob = STANDARD
        .decode(content)
        .map_err(|_| KeySyncError::InvalidKeyFormat)?;

    if blob.len() < 4 {
        return Err(KeySyncError::InvalidKeyFormat);
    }

    let name_len = u32::from_be_bytes([blob[0], blob[1], blob[2], blob[3]]) as usize;
    let name = blob
        .get(4..)
        .and_then(|rest| rest.get(..name_len))
        .ok_or(KeySyncError::InvalidKeyFormat)?;

    String::from_utf8(name.to_vec()).map_err(|_| KeySyncError::InvalidKeyFormat)
}

/// Parse any key string in OpenSSH or SSH2 format.
pub fn parse_key_string(raw: &str) -> Result<ParsedKey> {
    // All legal line endings become "\n"
    let normalized = raw.trim().replace("\r\n", "\n").replace('\r', "\n");
    let lines: Vec<&str> = normalized.split('\n').collect();

    if lines.len() == 1 {
        parse_openssh(lines[0])
    } else {
        parse_ssh2(&lines)
    }
}

fn parse_openssh(line: &str) -> Result<ParsedKey> {
    let parts: Vec<&str> = line.split_whitespace().collect();

    let (declared, content, comment) = match parts.as_slice() {
        [] => return Err(KeySyncError::EmptyKey),
        [content] => (None, *content, ""),
        [key_type, content] => (Some(*key_type), *content, ""),
        [key_type, content, comment, ..] => (Some(*key_type), *content, *comment),
    };

    let embedded = embedded_key_type(content)?;
    if let Some(declared) = declared {
        if declared != embedded {
            return Err(KeySyncError::KeyTypeMismatch {
                declared: declared.to_string(),
                embedded,
            });
        }
    }

    Ok(ParsedKey {
        key_type: embedded,
        content: content.to_string(),
        comment: comment.to_string(),
    })
}

fn parse_ssh2(lines: &[&str]) -> Result<ParsedKey> {
    let mut content = String::new();
    let mut continuation = false;

    for line in lines {
        // Header lines contain ':', BEGIN/END markers contain '-'. A header
        // ending in '\' carries on to the next line, which is skipped too.
        if continuation || line.contains([':', '-']) {
            continuation = line.ends_with('\\');
        } else {
            content.push_str(line);
        }
    }

    let key_type = embedded_key_type(&content)?;

    Ok(ParsedKey {
        key_type,
        content,
        comment: String::new(),
    })
}
