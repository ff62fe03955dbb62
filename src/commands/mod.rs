//! CLI commands for release-walker
//!
//! - **walk**: find version directories and run each declared project's release pipeline

pub mod walk;

pub use walk::{WalkArgs, run_walk};
