//! Shared test fixtures for planforge crates.
//!
//! This crate provides canned planning tasks and a reference search.
//! It does NOT depend on `planforge-simplifier` to avoid circular dependencies.
//!
//! - [`crank`] - three-variable task with one safely abstractable variable
//! - [`shipping`] - producer/consumer tasks for operator composition
//! - [`search`] - breadth-first reference search standing in for a real planner
//! - [`random`] - seeded random task generator for property tests
//!
//! # Usage
//!
//! Add as a dev-dependency in your crate's `Cargo.toml`:
//!
//! ```toml
//! [dev-dependencies]
//! planforge-test = { workspace = true }
//! ```
//!
//! Then import the fixtures you need:
//!
//! ```ignore
//! use planforge_test::crank;
//! use planforge_test::search::breadth_first_search;
//! ```

pub mod crank;
pub mod random;
pub mod search;
pub mod shipping;

pub use random::random_task;
pub use search::breadth_first_search;
