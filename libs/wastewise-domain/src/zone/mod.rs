//! Zone domain module
//!
//! Zones are the global partition: their ids come from a single sequence and
//! their names are unique across the whole system.

pub mod entity;
pub mod ids;
pub mod ports;
pub mod request;
pub mod service;

pub use entity::{Zone, ZoneSummary};
pub use ids::ZoneId;
#[cfg(test)]
pub use ports::MockRouteDirectory;
pub use ports::{RouteDirectory, ZoneRepository};
pub use request::{NewZone, ZoneUpdate};
pub use service::{seed_sequence, ZoneService};
