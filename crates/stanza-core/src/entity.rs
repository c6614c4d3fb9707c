//! The entity model: a single content record with schema-defined dynamic
//! fields plus the system fields the lifecycle core operates on.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

use crate::ids::EntityId;

/// Publication lifecycle status. All movement between these values goes
/// through the transition engine's edge table; nothing else writes `status`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, EnumIter,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum EntityStatus {
    Draft,
    Pending,
    Published,
    Archived,
    Deleted,
}

/// Read exposure, independent of status. The two compose with AND in the
/// visibility resolver.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, EnumIter,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Visibility {
    Public,
    Authenticated,
    Members,
}

/// A content record.
///
/// `organization_id = None` means platform-global scope (superadmin-owned).
/// `version` increments on every successful mutating write and keys the
/// repository's compare-and-write.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Entity {
    pub id: EntityId,
    pub organization_id: Option<String>,
    pub entity_type_id: String,
    pub name: String,
    pub slug: String,
    pub status: EntityStatus,
    pub visibility: Visibility,
    #[serde(default)]
    pub data: serde_json::Map<String, serde_json::Value>,
    pub version: u64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Entity {
    /// True while the entity's fields may still be edited directly.
    pub fn is_mutable(&self) -> bool {
        self.status == EntityStatus::Draft
    }
}

/// Candidate field values for a create, as produced by UI forms or the
/// import pipeline. A missing slug is derived from the name; a missing
/// organization defaults to the creating principal's own.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateRequest {
    pub entity_type_id: String,
    pub name: String,
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default)]
    pub organization_id: Option<String>,
    #[serde(default)]
    pub visibility: Option<Visibility>,
    #[serde(default)]
    pub data: serde_json::Map<String, serde_json::Value>,
}

/// Field changes for a draft update. `None` leaves a field untouched.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default)]
    pub visibility: Option<Visibility>,
    #[serde(default)]
    pub data: Option<serde_json::Map<String, serde_json::Value>>,
}

impl UpdateRequest {
    /// True when the request touches the uniqueness-checked fields.
    pub fn renames(&self) -> bool {
        self.name.is_some() || self.slug.is_some()
    }
}
