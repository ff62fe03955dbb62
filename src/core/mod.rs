//! Core building blocks for release-walker
//!
//! - **config**: tool settings (release-walker.toml) parsing and validation
//! - **context**: per-project execution context (working directory + env overlay)
//! - **error**: error types with contextual help messages
//! - **exec**: process execution seam (system and recording executors)

pub mod config;
pub mod context;
pub mod error;
pub mod exec;
