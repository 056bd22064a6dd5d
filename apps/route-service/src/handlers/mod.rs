//! HTTP handlers

pub mod routes;
