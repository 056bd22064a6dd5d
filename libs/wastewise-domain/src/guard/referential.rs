//! Cross-service referential check run before a zone is deleted
//!
//! Routes live in another service, so the only way to know whether a zone is
//! still referenced is to ask that service. The answer is best-effort: a route
//! created between the check and the delete is not caught.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use tracing::{info, warn};

use crate::error::DomainError;
use crate::zone::{RouteDirectory, ZoneId};

/// Default upper bound on the remote route lookup
pub const DEFAULT_LOOKUP_TIMEOUT: Duration = Duration::from_secs(2);

/// What to do when the route service cannot answer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FallbackPolicy {
    /// Assume no routes reference the zone and allow the delete
    #[default]
    FailOpen,
    /// Refuse the delete with `UpstreamUnavailable`
    FailClosed,
}

impl FromStr for FallbackPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "fail-open" | "open" => Ok(Self::FailOpen),
            "fail-closed" | "closed" => Ok(Self::FailClosed),
            other => Err(format!(
                "unknown fallback policy '{}', expected 'fail-open' or 'fail-closed'",
                other
            )),
        }
    }
}

impl fmt::Display for FallbackPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FallbackPolicy::FailOpen => f.write_str("fail-open"),
            FallbackPolicy::FailClosed => f.write_str("fail-closed"),
        }
    }
}

/// Outcome of a check that allowed the delete
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReferenceCheck {
    /// The route service confirmed no routes reference the zone
    Verified,
    /// The route service was unreachable and the fail-open policy applied
    AssumedClear { reason: String },
}

impl ReferenceCheck {
    pub fn is_verified(&self) -> bool {
        matches!(self, ReferenceCheck::Verified)
    }
}

/// Refuses zone deletion while routes still reference the zone
pub struct ReferentialGuard<D> {
    directory: D,
    policy: FallbackPolicy,
    timeout: Duration,
}

impl<D> ReferentialGuard<D>
where
    D: RouteDirectory,
{
    pub fn new(directory: D, policy: FallbackPolicy, timeout: Duration) -> Self {
        Self {
            directory,
            policy,
            timeout,
        }
    }

    /// Guard with the fail-open policy and the default timeout
    pub fn fail_open(directory: D) -> Self {
        Self::new(directory, FallbackPolicy::FailOpen, DEFAULT_LOOKUP_TIMEOUT)
    }

    pub fn policy(&self) -> FallbackPolicy {
        self.policy
    }

    /// Decide whether `zone_id` may be deleted
    ///
    /// # Errors
    ///
    /// - `DomainError::Blocked` with the referencing route ids
    /// - `DomainError::UpstreamUnavailable` when the lookup fails under
    ///   [`FallbackPolicy::FailClosed`]
    pub async fn check_deletable(&self, zone_id: &ZoneId) -> Result<ReferenceCheck, DomainError> {
        let lookup = tokio::time::timeout(self.timeout, self.directory.route_ids_for_zone(zone_id));

        let reason = match lookup.await {
            Ok(Ok(route_ids)) if route_ids.is_empty() => {
                info!(zone_id = %zone_id, "No routes reference zone");
                return Ok(ReferenceCheck::Verified);
            }
            Ok(Ok(route_ids)) => {
                warn!(zone_id = %zone_id, routes = ?route_ids, "Zone deletion blocked by assigned routes");
                return Err(DomainError::blocked(zone_id.to_string(), route_ids));
            }
            Ok(Err(err)) => err.to_string(),
            Err(_) => format!(
                "route lookup timed out after {}ms",
                self.timeout.as_millis()
            ),
        };

        match self.policy {
            FallbackPolicy::FailOpen => {
                warn!(
                    zone_id = %zone_id,
                    reason = %reason,
                    "Route service unavailable, allowing zone deletion (fail-open)"
                );
                Ok(ReferenceCheck::AssumedClear { reason })
            }
            FallbackPolicy::FailClosed => {
                warn!(
                    zone_id = %zone_id,
                    reason = %reason,
                    "Route service unavailable, refusing zone deletion (fail-closed)"
                );
                Err(DomainError::upstream_unavailable(reason))
            }
        }
    }
}
