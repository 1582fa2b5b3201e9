//! planforge - Planning Task Simplification in Rust
//!
//! Shrinks a finite-domain planning task by abstracting safe variables and
//! composing producer/consumer operators, hands the reduced task to any
//! search and maps the plan it finds back onto the original task.
//!
//! # Example
//!
//! ```rust
//! use planforge::prelude::*;
//!
//! let task = TaskBuilder::new()
//!     .variable("lever", 2)
//!     .variable("gate", 2)
//!     .operator("pull", &[(0, 0)], &[(0, 1)], 1)
//!     .operator("open", &[(0, 1)], &[(1, 1)], 1)
//!     .goal(1, 1)
//!     .build()
//!     .unwrap();
//!
//! // both variables are safe, so search sees an empty task
//! let plan = plan_with_config(task, SimplifierConfig::default(), |_: &TaskSnapshot| {
//!     Some(Plan::new())
//! })
//! .unwrap()
//! .unwrap();
//! assert_eq!(plan.indices(), vec![0, 1]);
//! ```

// Task model
pub use planforge_core::{
    Effect, FactPair, Operator, OperatorRef, Plan, PlanViolation, PlanforgeError, Result,
    TaskBuilder, TaskHandle, TaskParts, TaskSnapshot, Variable,
};

// Configuration
pub use planforge_config::{
    AbstractionConfig, CompositionConfig, ConfigError, RefinementConfig, SimplifierConfig,
};

// Simplification stages
pub use planforge_simplifier::{
    Abstractor, Composition, Compositor, FreeTransitionGraph, Layer, PlanSearch, Refiner,
    Simplification, SimplificationStatistics, Simplifier,
};

mod planner;
pub use planner::{load_config, plan_with_config, run_planner};

#[cfg(feature = "console")]
pub use planforge_console as console;

pub mod prelude {
    pub use super::{plan_with_config, run_planner};
    pub use super::{FactPair, Plan, PlanforgeError, TaskBuilder, TaskSnapshot};
    pub use super::{PlanSearch, SimplifierConfig, Simplifier};
}
