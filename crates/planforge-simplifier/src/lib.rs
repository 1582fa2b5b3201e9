//! Planforge simplifier - safe abstraction, operator composition and refinement
//!
//! This crate shrinks a planning task before search and maps plans back:
//! - [`FreeTransitionGraph`] - per-variable graphs of self-contained transitions
//! - [`Abstractor`] - finds variables whose demands their free transitions can always meet
//! - [`Compositor`] - fuses producer/consumer operator chains into composite operators
//! - [`transform`] - derives abstracted and composed snapshots
//! - [`Refiner`] - expands composites and repairs plans with free paths
//! - [`Simplifier`] - the layer loop tying it together
//!
//! # Example
//!
//! ```
//! use planforge_config::SimplifierConfig;
//! use planforge_core::{TaskBuilder, TaskSnapshot, Plan};
//! use planforge_simplifier::Simplifier;
//!
//! let task = TaskBuilder::new()
//!     .variable("lever", 2)
//!     .variable("gate", 2)
//!     .operator("pull", &[(0, 0)], &[(0, 1)], 1)
//!     .operator("open", &[(0, 1)], &[(1, 1)], 1)
//!     .goal(1, 1)
//!     .build()
//!     .unwrap()
//!     .into_handle();
//!
//! let simplification = Simplifier::new(SimplifierConfig::default())
//!     .simplify(task)
//!     .unwrap();
//!
//! let mut search = |_reduced: &TaskSnapshot| -> Option<Plan> {
//!     // "open" is the only useful step once the lever is abstracted
//!     Some(Plan::from_indices([1]))
//! };
//! let plan = simplification.solve(&mut search).unwrap().unwrap();
//! assert_eq!(plan.indices(), vec![0, 1]);
//! ```

pub mod abstractor;
pub mod compositor;
pub mod driver;
pub mod graph;
pub mod layer;
pub mod refiner;
pub mod statistics;
pub mod transform;

pub use abstractor::{Abstractor, SafetyVerdict};
pub use compositor::{Composition, CompositionStatistics, CompositionTarget, Compositor};
pub use driver::{PlanSearch, Simplification, Simplifier};
pub use graph::{FreeTransitionGraph, Transition};
pub use layer::{AbstractionStage, CompositionStage, Layer};
pub use refiner::{RefinementStatistics, Refiner};
pub use statistics::{LayerStatistics, SimplificationStatistics};
pub use transform::{abstract_snapshot, compose_snapshot};
