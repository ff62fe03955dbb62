//! Integration tests for release-walker

mod test_dry_run;
mod test_walk;
