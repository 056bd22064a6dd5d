use std::future::Future;

use wastewise_domain::{DomainError, Partition, PartitionedSequence, SequenceStore};

use super::S3Sequence;

/// The identifier sequence chosen at startup
///
/// `Rescan` keeps counters in process memory, seeded from storage. `Durable`
/// keeps them in the bucket next to the documents.
pub enum IdSequence {
    Rescan(PartitionedSequence),
    Durable(S3Sequence),
}

impl SequenceStore for IdSequence {
    fn next_value(
        &self,
        partition: &Partition,
    ) -> impl Future<Output = Result<u32, DomainError>> + Send {
        let partition = *partition;
        async move {
            match self {
                IdSequence::Rescan(sequence) => sequence.next_value(&partition).await,
                IdSequence::Durable(sequence) => sequence.next_value(&partition).await,
            }
        }
    }
}
