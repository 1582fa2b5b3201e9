//! planforge Core - task model for the planforge simplifier
//!
//! This crate provides the data shared by every stage of simplification:
//! - Finite-domain task snapshots (variables, operators, goals, mutexes)
//! - A builder for constructing tasks without a parser
//! - Plans and plan checking against a task
//! - The error type

pub mod error;
pub mod plan;
pub mod task;


pub use error::{PlanforgeError, Result};
pub use plan::{OperatorRef, Plan, PlanDisplay, PlanViolation};
pub use task::{
    Effect, FactPair, Operator, TaskBuilder, TaskHandle, TaskParts, TaskSnapshot, Variable,
};
