//! Error types for planforge

use thiserror::Error;

use crate::plan::PlanViolation;

/// Main error type for planforge operations
#[derive(Debug, Error)]
pub enum PlanforgeError {
    /// The task violates a structural invariant
    #[error("Invalid task: {0}")]
    InvalidTask(String),

    /// A variable id outside the task
    #[error("Unknown variable {var} (task has {num_variables} variables)")]
    UnknownVariable { var: usize, num_variables: usize },

    /// An operator id outside the task
    #[error("Unknown operator {index} (task has {num_operators} operators)")]
    UnknownOperator { index: usize, num_operators: usize },

    /// A plan does not solve the task it was checked against
    #[error("Invalid plan: {0}")]
    InvalidPlan(PlanViolation),

    /// A transform was applied to a snapshot it was not computed for
    #[error("Snapshot mismatch: expected {expected} operators, found {found}")]
    SnapshotMismatch { expected: usize, found: usize },

    /// Refinement found no free path; the safety analysis of the layer was wrong
    #[error(
        "Layer {layer}: no free path for variable {variable} from value {from} to value {to}"
    )]
    UnreachableRepair {
        layer: usize,
        variable: usize,
        from: usize,
        to: usize,
    },

    /// Error in simplifier configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// Internal error (should not occur in normal operation)
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias for planforge operations
pub type Result<T> = std::result::Result<T, PlanforgeError>;
