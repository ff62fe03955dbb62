//! Release manifests and the per-project pipeline
//!
//! - **manifest**: `config.yaml` model, loading and validation
//! - **pipeline**: clone, checkout, stage commands and cleanup for one project

pub mod manifest;
pub mod pipeline;
