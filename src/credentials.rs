//! Credential store
//!
//! Maps opaque bearer tokens to identities. The store is built once at
//! startup from the `API_TOKENS` configuration string and is read-only for
//! the lifetime of the process.

use std::collections::HashMap;

use tracing::debug;

/// Identity resolved from a valid bearer token
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub username: String,
    /// Personal request quota per rate-limit window
    pub requests_per_window: u32,
}

/// Immutable token-to-identity mapping
///
/// The configuration format is `token:username:limit` entries separated by
/// commas. Entries with too few fields, an empty token or username, or a
/// non-numeric limit are skipped; a bad entry never prevents startup.
#[derive(Debug, Default)]
pub struct TokenStore {
    tokens: HashMap<String, Identity>,
}

impl TokenStore {
    /// Parse the configuration string into a store
    pub fn parse(raw: &str) -> Self {
        let mut tokens = HashMap::new();

        for entry in raw.split(',') {
            let entry = entry.trim();
            if entry.is_empty() {
                continue;
            }

            let fields: Vec<&str> = entry.split(':').collect();
            if fields.len() < 3 {
                debug!(entry, "Skipping credential entry with too few fields");
                continue;
            }

            let (token, username, limit) = (fields[0], fields[1], fields[2]);
            let Ok(requests_per_window) = limit.parse::<u32>() else {
                debug!(entry, "Skipping credential entry with invalid limit");
                continue;
            };
            if token.is_empty() || username.is_empty() {
                debug!(entry, "Skipping credential entry with empty token or username");
                continue;
            }

            tokens.insert(
                token.to_string(),
                Identity {
                    username: username.to_string(),
                    requests_per_window,
                },
            );
        }

        Self { tokens }
    }

    /// Look up the identity for a token (exact, case-sensitive match)
    pub fn lookup(&self, token: &str) -> Option<&Identity> {
        self.tokens.get(token)
    }

    /// Number of valid credentials loaded
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    /// Whether no valid credential was loaded
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}
