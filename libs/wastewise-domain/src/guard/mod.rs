//! Guards consulted by the lifecycle services before they write

mod referential;
mod uniqueness;

pub use referential::{FallbackPolicy, ReferenceCheck, ReferentialGuard, DEFAULT_LOOKUP_TIMEOUT};
pub use uniqueness::{NameMatch, UniquenessGuard};
