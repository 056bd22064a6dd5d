//! Route domain module
//!
//! Routes are partitioned by zone: ids come from one sequence per zone and
//! names are unique only inside their zone.

pub mod entity;
pub mod ids;
pub mod ports;
pub mod request;
pub mod service;

pub use entity::Route;
pub use ids::RouteId;
#[cfg(test)]
pub use ports::MockZoneDirectory;
pub use ports::{RouteRepository, ZoneDirectory};
pub use request::{NewRoute, RouteUpdate};
pub use service::{seed_sequence, RouteService};
