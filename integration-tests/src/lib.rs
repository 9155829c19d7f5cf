//! Shared fixtures for the cohort end-to-end tests.

pub mod test_systems;
