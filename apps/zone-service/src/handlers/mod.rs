//! HTTP handlers

pub mod zones;
