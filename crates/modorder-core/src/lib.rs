//! Core data types for modorder.
//!
//! This crate defines the records the resolution engine consumes: modules,
//! their declared relations and identifier claims, activation conditions,
//! global configuration, and the pool file that persists both pools.
//!
//! Resolution itself lives in `modorder-resolver`.

pub mod condition;
pub mod config;
pub mod module;
pub mod poolfile;
pub mod relation;
