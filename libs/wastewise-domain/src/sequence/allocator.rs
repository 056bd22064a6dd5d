//! In-process sequence allocator seeded from persisted identifiers

use std::collections::HashMap;
use std::future::Future;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, RwLock};

use tracing::{debug, info};

use super::{Partition, SequenceStore};
use crate::error::DomainError;

/// Process-local counters, one per partition
///
/// Built once at startup from the highest suffix found in storage, then lives
/// for the whole process. The map lock is only taken exclusively the first time
/// a partition is seen; after that every allocation is a single atomic
/// increment on that partition's own counter.
///
/// Counters are not shared between processes. Running two instances against
/// the same storage, or deleting the highest-numbered entity and restarting,
/// can hand out an identifier that was used before; persistence rejects the
/// insert when that identifier is still live.
#[derive(Debug, Default)]
pub struct PartitionedSequence {
    counters: RwLock<HashMap<Partition, Arc<AtomicU32>>>,
}

impl PartitionedSequence {
    /// Create an allocator with every partition starting at zero
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an allocator from `(partition, suffix)` pairs found in storage
    ///
    /// Each partition starts at the maximum suffix observed for it.
    pub fn seeded<I>(observed: I) -> Self
    where
        I: IntoIterator<Item = (Partition, u32)>,
    {
        let mut highest: HashMap<Partition, u32> = HashMap::new();
        for (partition, suffix) in observed {
            let entry = highest.entry(partition).or_insert(0);
            *entry = (*entry).max(suffix);
        }

        info!(partitions = highest.len(), "Seeded identifier sequences");

        let counters = highest
            .into_iter()
            .map(|(partition, max)| (partition, Arc::new(AtomicU32::new(max))))
            .collect();

        Self {
            counters: RwLock::new(counters),
        }
    }

    /// Allocate the next value of `partition`
    pub fn allocate(&self, partition: &Partition) -> Result<u32, DomainError> {
        let counter = self.counter(partition)?;
        let previous = counter
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |current| {
                current.checked_add(1)
            })
            .map_err(|_| {
                DomainError::internal(format!("identifier sequence '{}' is exhausted", partition))
            })?;

        let value = previous + 1;
        debug!(partition = %partition, value, "Allocated sequence value");
        Ok(value)
    }

    fn counter(&self, partition: &Partition) -> Result<Arc<AtomicU32>, DomainError> {
        {
            let counters = self.counters.read().map_err(|_| poisoned())?;
            if let Some(counter) = counters.get(partition) {
                return Ok(Arc::clone(counter));
            }
        }

        let mut counters = self.counters.write().map_err(|_| poisoned())?;
        Ok(Arc::clone(counters.entry(*partition).or_default()))
    }
}

fn poisoned() -> DomainError {
    DomainError::internal("identifier sequence lock poisoned")
}

impl SequenceStore for PartitionedSequence {
    fn next_value(
        &self,
        partition: &Partition,
    ) -> impl Future<Output = Result<u32, DomainError>> + Send {
        std::future::ready(self.allocate(partition))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::zone::ZoneId;
    use std::collections::HashSet;
    use std::thread;

    fn routes_of(zone: u32) -> Partition {
        Partition::Routes(ZoneId::from_sequence(zone))
    }

    #[test]
    fn test_fresh_partition_starts_at_one() {
        let sequence = PartitionedSequence::new();
        assert_eq!(sequence.allocate(&Partition::Zones).unwrap(), 1);
        assert_eq!(sequence.allocate(&Partition::Zones).unwrap(), 2);
    }

    #[test]
    fn test_seeded_resumes_after_highest_suffix() {
        let sequence = PartitionedSequence::seeded(vec![
            (Partition::Zones, 3),
            (Partition::Zones, 7),
            (Partition::Zones, 5),
            (routes_of(1), 2),
            (routes_of(2), 9),
        ]);

        assert_eq!(sequence.allocate(&Partition::Zones).unwrap(), 8);
        assert_eq!(sequence.allocate(&routes_of(1)).unwrap(), 3);
        assert_eq!(sequence.allocate(&routes_of(2)).unwrap(), 10);
        assert_eq!(sequence.allocate(&routes_of(3)).unwrap(), 1);
    }

    #[test]
    fn test_partitions_are_independent() {
        let sequence = PartitionedSequence::new();
        sequence.allocate(&routes_of(1)).unwrap();
        sequence.allocate(&routes_of(1)).unwrap();

        assert_eq!(sequence.allocate(&routes_of(2)).unwrap(), 1);
        assert_eq!(sequence.allocate(&routes_of(1)).unwrap(), 3);
    }

    #[test]
    fn test_concurrent_allocation_yields_distinct_values() {
        let sequence = Arc::new(PartitionedSequence::new());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let sequence = Arc::clone(&sequence);
                thread::spawn(move || {
                    (0..250)
                        .map(|_| sequence.allocate(&Partition::Zones).unwrap())
                        .collect::<Vec<_>>()
                })
            })
            .collect();

        let mut seen = HashSet::new();
        for handle in handles {
            for value in handle.join().unwrap() {
                assert!(seen.insert(value), "value {value} allocated twice");
            }
        }

        assert_eq!(seen.len(), 2000);
        assert_eq!(seen.iter().max(), Some(&2000));
    }

    #[test]
    fn test_exhausted_sequence_is_an_error() {
        let sequence = PartitionedSequence::seeded(vec![(Partition::Zones, u32::MAX)]);
        let err = sequence.allocate(&Partition::Zones).unwrap_err();
        assert!(matches!(err, DomainError::Internal(_)));
    }
}
