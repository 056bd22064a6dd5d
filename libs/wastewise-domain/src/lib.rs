//! # WasteWise Domain Layer
//!
//! Pure business logic for zones and the routes assigned to them. It follows
//! hexagonal architecture principles:
//!
//! - **Entities**: [`Zone`](zone::Zone) and [`Route`](route::Route) with typed ids
//! - **Ports**: repositories, the identifier sequence, and the remote
//!   directories each service consults in the other
//! - **Guards**: scoped name uniqueness, no-op update detection, and the
//!   referential check before a zone is deleted
//! - **Services**: lifecycle orchestration ([`ZoneService`](zone::ZoneService),
//!   [`RouteService`](route::RouteService))
//!
//! ## Architecture
//!
//! This layer has NO dependencies on infrastructure concerns (S3, HTTP, etc.).
//! Adapters implement the ports; [`memory`] ships in-process implementations
//! used for development and tests.
//!
//! ## Example
//!
//! ```rust
//! use wastewise_domain::zone::{NewZone, RouteDirectory, ZoneRepository, ZoneService};
//! use wastewise_domain::sequence::SequenceStore;
//!
//! async fn example<R, S, D>(service: ZoneService<R, S, D>)
//! where
//!     R: ZoneRepository,
//!     S: SequenceStore,
//!     D: RouteDirectory,
//! {
//!     let zone = service.create_zone(NewZone::new("North", 120)).await.unwrap();
//!     println!("Created zone: {}", zone.id());
//! }
//! ```

pub mod change;
pub mod error;
pub mod guard;
pub mod memory;
pub mod route;
pub mod sequence;
pub mod zone;

// Re-export commonly used types
pub use error::{DomainError, EntityKind, Result};
pub use guard::{FallbackPolicy, ReferenceCheck, ReferentialGuard};
pub use sequence::{Partition, PartitionedSequence, SequenceStore};
