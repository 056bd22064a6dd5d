//! Scoped name uniqueness
//!
//! The guard performs an advisory read-then-decide check. It holds no lock, so
//! two racing creates can both pass it; repositories enforce the same rule when
//! writing and report a violation through [`UniquenessGuard::conflict`], giving
//! callers one error shape whichever layer caught the clash.

use std::future::Future;

use tracing::warn;

use crate::error::{DomainError, EntityKind};

/// How two names are compared for equality
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NameMatch {
    Exact,
    CaseInsensitive,
}

impl NameMatch {
    /// Whether `a` and `b` denote the same name
    pub fn same(self, a: &str, b: &str) -> bool {
        match self {
            NameMatch::Exact => a == b,
            NameMatch::CaseInsensitive => a.to_lowercase() == b.to_lowercase(),
        }
    }

    /// Canonical form used as an index key
    pub fn normalize(self, name: &str) -> String {
        match self {
            NameMatch::Exact => name.to_string(),
            NameMatch::CaseInsensitive => name.to_lowercase(),
        }
    }
}

/// Name uniqueness rule for one entity kind
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UniquenessGuard {
    entity: EntityKind,
    matching: NameMatch,
}

impl UniquenessGuard {
    /// Zone names are unique across all zones, compared exactly
    pub const ZONES: Self = Self {
        entity: EntityKind::Zone,
        matching: NameMatch::Exact,
    };

    /// Route names are unique within their zone, compared case-insensitively
    pub const ROUTES: Self = Self {
        entity: EntityKind::Route,
        matching: NameMatch::CaseInsensitive,
    };

    pub fn matching(&self) -> NameMatch {
        self.matching
    }

    /// Fail with `DuplicateName` when `lookup` finds a holder of `candidate`
    ///
    /// `lookup` is the persistence read for the candidate inside `scope`.
    pub async fn ensure_available<T, F>(
        &self,
        scope: Option<&str>,
        candidate: &str,
        lookup: F,
    ) -> Result<(), DomainError>
    where
        F: Future<Output = Result<Option<T>, DomainError>>,
    {
        if lookup.await?.is_some() {
            warn!(entity = %self.entity, name = %candidate, scope = ?scope, "Duplicate name rejected");
            return Err(self.conflict(scope, candidate));
        }
        Ok(())
    }

    /// The error reported for a name clash inside `scope`
    pub fn conflict(&self, scope: Option<&str>, candidate: &str) -> DomainError {
        match scope {
            Some(scope) => DomainError::duplicate_name_in(self.entity, candidate, scope),
            None => DomainError::duplicate_name(self.entity, candidate),
        }
    }
}
