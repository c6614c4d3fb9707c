//! Identifier and slug rules.
//!
//! Entity ids are 7-character lowercase-alphanumeric strings, immutable once
//! assigned. Slugs match `[a-z0-9-]{1,100}` and are unique per
//! `(organization, entity type)` scope — the scope itself lives in
//! `stanza-lifecycle`.

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::StanzaError;

const ID_LEN: usize = 7;
const ID_ALPHABET: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";

pub const SLUG_MAX_LEN: usize = 100;

/// Immutable entity identifier: exactly 7 lowercase alphanumerics.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct EntityId(String);

impl EntityId {
    /// Generate a fresh random id.
    pub fn generate() -> Self {
        let mut rng = rand::thread_rng();
        let s: String = (0..ID_LEN)
            .map(|_| ID_ALPHABET[rng.gen_range(0..ID_ALPHABET.len())] as char)
            .collect();
        Self(s)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for EntityId {
    type Err = StanzaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let valid = s.len() == ID_LEN
            && s.bytes()
                .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit());
        if valid {
            Ok(Self(s.to_string()))
        } else {
            Err(StanzaError::InvalidInput(format!("invalid entity id '{s}'")))
        }
    }
}

impl TryFrom<String> for EntityId {
    type Error = StanzaError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<EntityId> for String {
    fn from(id: EntityId) -> Self {
        id.0
    }
}

/// Check a candidate slug against `[a-z0-9-]{1,100}`.
pub fn validate_slug(slug: &str) -> Result<(), StanzaError> {
    let ok = !slug.is_empty()
        && slug.len() <= SLUG_MAX_LEN
        && slug
            .bytes()
            .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'-');
    if ok {
        Ok(())
    } else {
        Err(StanzaError::InvalidInput(format!(
            "invalid slug '{slug}': must match [a-z0-9-]{{1,{SLUG_MAX_LEN}}}"
        )))
    }
}

/// Derive a slug from a display name: lowercase, alphanumeric runs joined by
/// single hyphens, truncated to the slug length limit. Import pipelines
/// supply names without slugs, so this must never produce an invalid slug
/// for any non-empty alphanumeric-bearing input.
pub fn slugify(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut pending_hyphen = false;
    for c in name.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_hyphen && !out.is_empty() {
                out.push('-');
            }
            pending_hyphen = false;
            out.push(c.to_ascii_lowercase());
        } else {
            pending_hyphen = true;
        }
        if out.len() >= SLUG_MAX_LEN {
            break;
        }
    }
    out.truncate(SLUG_MAX_LEN);
    out
}
