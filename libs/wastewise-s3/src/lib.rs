//! # WasteWise S3 Adapter
//!
//! Implements the domain's persistence and sequence ports on top of S3 (or any
//! S3-compatible store such as MinIO).
//!
//! ## Layout
//!
//! ```text
//! zones/Z001.json                    zone document
//! zone-names/<hex(name)>             name claim: owning zone id, claim time
//! routes/Z001/Z001-R001.json         route document
//! route-names/Z001/<hex(lower(name))> name claim: owning route id, claim time
//! sequences/zones.json               durable counter
//! sequences/routes/Z001.json         durable counter
//! ```
//!
//! Name claims are written with `If-None-Match: *`, which makes S3 itself the
//! authority on name uniqueness. A claim is leased for a short window after it
//! is written, since its owner's document lands after it; only an expired claim
//! whose owner no longer carries the name can be taken over. Documents and
//! counters are replaced with `If-Match: <etag>` so concurrent writers cannot
//! silently overwrite each other.

pub mod infrastructure;

pub use infrastructure::{
    build_client, IdSequence, S3RouteRepository, S3Sequence, S3ZoneRepository,
};
