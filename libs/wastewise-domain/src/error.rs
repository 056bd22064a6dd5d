//! Domain errors shared by the zone and route lifecycles
//!
//! Every operation exposed by the services returns either a populated result or
//! one of these variants. Adapters translate their own failures (S3, HTTP) into
//! this taxonomy so callers see a single contract regardless of which layer
//! caught the problem.

use thiserror::Error;

/// Errors produced by zone and route operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// No entity with this identifier exists
    #[error("{entity} with ID '{id}' not found")]
    NotFound { entity: EntityKind, id: String },

    /// The name is already taken inside its uniqueness scope
    #[error("{entity} with name '{name}' already exists{}", scope_suffix(.scope))]
    DuplicateName {
        entity: EntityKind,
        name: String,
        scope: Option<String>,
    },

    /// The update payload equals the persisted state
    #[error("No changes detected for {entity} with ID '{id}'")]
    NoChangesDetected { entity: EntityKind, id: String },

    /// Zone deletion refused because routes still reference it
    #[error("Cannot delete zone {zone_id} because it has assigned routes: {}", .dependents.join(", "))]
    Blocked {
        zone_id: String,
        dependents: Vec<String>,
    },

    /// A remote collaborator could not be reached or answered garbage
    #[error("Upstream service unavailable: {0}")]
    UpstreamUnavailable(String),

    /// The request carried malformed values
    #[error("Invalid {entity} details: {reason}")]
    InvalidDetails { entity: EntityKind, reason: String },

    /// Persistence refused an identifier that is still live
    #[error("{entity} identifier '{id}' is already in use")]
    IdentifierTaken { entity: EntityKind, id: String },

    /// The storage backend failed
    #[error("Storage operation failed: {0}")]
    StorageFailure(String),

    /// An unexpected internal error occurred
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Which entity an error refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Zone,
    Route,
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EntityKind::Zone => f.write_str("Zone"),
            EntityKind::Route => f.write_str("Route"),
        }
    }
}

fn scope_suffix(scope: &Option<String>) -> String {
    match scope {
        Some(scope) => format!(" in zone '{}'", scope),
        None => String::new(),
    }
}

impl DomainError {
    /// Create a not found error
    pub fn not_found(entity: EntityKind, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity,
            id: id.into(),
        }
    }

    /// Create a duplicate name error for a globally unique name
    pub fn duplicate_name(entity: EntityKind, name: impl Into<String>) -> Self {
        Self::DuplicateName {
            entity,
            name: name.into(),
            scope: None,
        }
    }

    /// Create a duplicate name error for a name unique within a zone
    pub fn duplicate_name_in(
        entity: EntityKind,
        name: impl Into<String>,
        scope: impl Into<String>,
    ) -> Self {
        Self::DuplicateName {
            entity,
            name: name.into(),
            scope: Some(scope.into()),
        }
    }

    /// Create a no-op update error
    pub fn no_changes(entity: EntityKind, id: impl Into<String>) -> Self {
        Self::NoChangesDetected {
            entity,
            id: id.into(),
        }
    }

    /// Create a blocked deletion error
    pub fn blocked(zone_id: impl Into<String>, dependents: Vec<String>) -> Self {
        Self::Blocked {
            zone_id: zone_id.into(),
            dependents,
        }
    }

    /// Create an upstream unavailable error
    pub fn upstream_unavailable(msg: impl Into<String>) -> Self {
        Self::UpstreamUnavailable(msg.into())
    }

    /// Create an invalid details error
    pub fn invalid(entity: EntityKind, reason: impl Into<String>) -> Self {
        Self::InvalidDetails {
            entity,
            reason: reason.into(),
        }
    }

    /// Create an identifier collision error
    pub fn identifier_taken(entity: EntityKind, id: impl Into<String>) -> Self {
        Self::IdentifierTaken {
            entity,
            id: id.into(),
        }
    }

    /// Create a storage failure error with a message
    pub fn storage_failure(msg: impl Into<String>) -> Self {
        Self::StorageFailure(msg.into())
    }

    /// Create an internal error with a message
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Whether this error is an expected business outcome rather than a fault
    pub fn is_business_outcome(&self) -> bool {
        !matches!(self, Self::StorageFailure(_) | Self::Internal(_))
    }
}

/// Result type alias for domain operations
pub type Result<T> = std::result::Result<T, DomainError>;
