//! Registered public key record

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::authorized::EntryTemplate;

/// How long after its last use a key still counts as recently active
pub const RECENT_ACTIVITY_WINDOW_DAYS: i64 = 7;

/// A public key registered for SSH access
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicKey {
    /// Registry identity, assigned on insert (0 until then)
    pub id: i64,
    /// Owning user
    pub owner_id: i64,
    /// Human-readable name, unique per owner
    pub name: String,
    /// Inspector fingerprint, unique across all keys
    pub fingerprint: String,
    /// Canonical `type base64 [comment]` line
    pub content: String,
    pub created: DateTime<Utc>,
    pub updated: DateTime<Utc>,
    /// Derived on listing, never stored
    #[serde(skip)]
    pub has_used: bool,
    /// Derived on listing, never stored
    #[serde(skip)]
    pub has_recent_activity: bool,
}

impl PublicKey {
    /// Create an unsaved record
    pub fn new(owner_id: i64, name: impl Into<String>, content: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: 0,
            owner_id,
            name: name.into(),
            fingerprint: String::new(),
            content: content.into(),
            created: now,
            updated: now,
            has_used: false,
            has_recent_activity: false,
        }
    }

    /// Set the fingerprint
    pub fn with_fingerprint(mut self, fingerprint: impl Into<String>) -> Self {
        self.fingerprint = fingerprint.into();
        self
    }

    /// Key content without its trailing comment (usually an e-mail address)
    pub fn omit_comment(&self) -> String {
        self.content
            .split(' ')
            .take(2)
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// The forced-command `authorized_keys` line granting this key access
    pub fn authorized_line(&self, template: &EntryTemplate) -> String {
        template.render(self)
    }

    /// Fill in the derived usage flags relative to `now`
    pub fn refresh_activity(&mut self, now: DateTime<Utc>) {
        self.has_used = self.updated > self.created;
        self.has_recent_activity = self.updated + Duration::days(RECENT_ACTIVITY_WINDOW_DAYS) > now;
    }
}
