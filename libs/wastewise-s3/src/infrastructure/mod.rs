//! Infrastructure layer - S3 implementations of the domain ports

mod client;
mod id_sequence;
mod objects;
mod s3_route_repository;
#[cfg(test)]
mod s3_fake;
mod s3_sequence;
mod s3_zone_repository;

pub use client::build_client;
pub use id_sequence::IdSequence;
pub use s3_route_repository::S3RouteRepository;
pub use s3_sequence::S3Sequence;
pub use s3_zone_repository::S3ZoneRepository;
