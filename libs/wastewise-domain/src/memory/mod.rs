//! In-memory repository adapters
//!
//! Used for local development (`STORAGE_BACKEND=memory`) and throughout the
//! tests. They enforce the same constraints as the durable adapters inside a
//! single write lock, so they are a faithful stand-in for the final word on
//! uniqueness.

mod route;
mod zone;

pub use route::InMemoryRouteRepository;
pub use zone::InMemoryZoneRepository;

use crate::error::DomainError;

fn poisoned<T>(_: T) -> DomainError {
    DomainError::internal("in-memory store lock poisoned")
}
