//! Per-partition identifier sequences
//!
//! Zones draw from one global sequence, routes from one sequence per zone. The
//! services only see the [`SequenceStore`] port; whether the counters live in
//! process memory ([`PartitionedSequence`]) or in a durable store is an adapter
//! choice made at startup.

mod allocator;

use std::fmt;
use std::future::Future;

use crate::error::DomainError;
use crate::zone::ZoneId;

pub use allocator::PartitionedSequence;

/// Scope under which an identifier sequence is evaluated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Partition {
    /// The single global zone sequence
    Zones,
    /// The route sequence of one zone
    Routes(ZoneId),
}

impl Partition {
    /// Stable textual key, usable as a storage key
    pub fn key(&self) -> String {
        match self {
            Partition::Zones => "zones".to_string(),
            Partition::Routes(zone) => format!("routes/{}", zone),
        }
    }
}

impl fmt::Display for Partition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.key())
    }
}

/// Port for atomically incrementable sequences
///
/// Implementations must guarantee that two concurrent calls for the same
/// partition never yield the same value, and that values never decrease.
pub trait SequenceStore: Send + Sync {
    /// Allocate the next value of `partition`, starting at 1
    fn next_value(
        &self,
        partition: &Partition,
    ) -> impl Future<Output = Result<u32, DomainError>> + Send;
}
