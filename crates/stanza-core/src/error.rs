use serde::Serialize;
use thiserror::Error;

use crate::entity::EntityStatus;
use crate::ids::EntityId;
use crate::schema::FieldViolation;

/// Every guard failure in the core maps to exactly one of these kinds.
/// Guard failures are returned before any write happens; nothing here is
/// retried internally except the caller-driven loop on `VersionConflict`.
#[derive(Debug, Error)]
pub enum StanzaError {
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    #[error("cross-tenant access denied: {0}")]
    CrossTenantAccessDenied(String),

    #[error("invalid transition: {action} from {from}")]
    InvalidTransition { action: String, from: EntityStatus },

    #[error("duplicate slug '{slug}' collides with entity {existing}")]
    DuplicateSlug { slug: String, existing: EntityId },

    #[error("not found: {0}")]
    NotFound(String),

    #[error("version conflict: expected {expected}, stored {stored}")]
    VersionConflict { expected: u64, stored: u64 },

    #[error("malformed principal: {0}")]
    MalformedPrincipal(String),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("schema validation failed: {} violation(s)", .0.len())]
    SchemaValidationFailed(Vec<FieldViolation>),

    #[error("internal: {0}")]
    Internal(#[from] anyhow::Error),
}

impl StanzaError {
    /// Status code the (out-of-scope) HTTP layer should answer with.
    pub fn http_status(&self) -> u16 {
        match self {
            Self::Unauthorized(_) | Self::CrossTenantAccessDenied(_) => 403,
            Self::InvalidTransition { .. } => 409,
            Self::DuplicateSlug { .. } | Self::VersionConflict { .. } => 409,
            Self::NotFound(_) => 404,
            Self::MalformedPrincipal(_) | Self::InvalidInput(_) => 400,
            Self::SchemaValidationFailed(_) => 422,
            Self::Internal(_) => 500,
        }
    }

    /// True for the kinds a read path must collapse into `NotFound` so the
    /// response does not leak the existence of another tenant's data.
    pub fn leaks_existence(&self) -> bool {
        matches!(
            self,
            Self::Unauthorized(_) | Self::CrossTenantAccessDenied(_)
        )
    }
}

/// A name collision in the same uniqueness scope. Unlike `DuplicateSlug`
/// this never blocks a write; it rides along in successful outcomes so the
/// caller can surface it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DuplicateNameWarning {
    pub name: String,
    pub existing: EntityId,
}

impl std::fmt::Display for DuplicateNameWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "name '{}' already used by entity {}",
            self.name, self.existing
        )
    }
}
