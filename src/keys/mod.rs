//! Public key handling
//!
//! This module provides:
//! - Parsing of OpenSSH and SSH2 key text into canonical form
//! - Minimum-size policy per algorithm
//! - Fingerprint extraction for duplicate detection
//! - The registered key record

mod fingerprint;
mod parse;
mod record;
mod strength;

pub use fingerprint::calculate_fingerprint;
pub use parse::{embedded_key_type, parse_key_string, ParsedKey};
pub use record::{PublicKey, RECENT_ACTIVITY_WINDOW_DAYS};
pub use strength::{check_public_key_string, evaluate, minimum_key_size, MINIMUM_KEY_SIZES};
