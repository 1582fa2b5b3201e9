//! Simplification layers.
//!
//! A layer records one round of the driver loop: the abstraction applied to
//! a snapshot, then the composition applied to the abstracted snapshot. Each
//! stage keeps handles to the snapshot it read and the snapshot it produced,
//! which is everything refinement needs to undo it.

use planforge_core::TaskHandle;

use crate::compositor::{Composition, CompositionStatistics};
use crate::graph::FreeTransitionGraph;

/// Safe variables removed from `source`, giving `result`.
#[derive(Debug, Clone)]
pub struct AbstractionStage {
    pub source: TaskHandle,
    pub result: TaskHandle,
    /// Variable ids in `source`.
    pub safe_variables: Vec<usize>,
    /// Free transition graphs of every variable of `source`.
    pub graphs: Vec<FreeTransitionGraph>,
}

impl AbstractionStage {
    pub fn is_safe(&self, var: usize) -> bool {
        self.safe_variables.binary_search(&var).is_ok()
    }
}

/// Composites appended to `source`, giving `result`.
#[derive(Debug, Clone)]
pub struct CompositionStage {
    pub source: TaskHandle,
    pub result: TaskHandle,
    pub composition: Composition,
    pub statistics: CompositionStatistics,
}

/// One round of abstraction and composition.
///
/// At least one stage is present.
#[derive(Debug, Clone)]
pub struct Layer {
    pub index: usize,
    pub abstraction: Option<AbstractionStage>,
    pub composition: Option<CompositionStage>,
}

impl Layer {
    /// The snapshot this layer started from.
    pub fn source(&self) -> Option<&TaskHandle> {
        match (&self.abstraction, &self.composition) {
            (Some(stage), _) => Some(&stage.source),
            (None, Some(stage)) => Some(&stage.source),
            (None, None) => None,
        }
    }

    /// The snapshot this layer produced.
    pub fn result(&self) -> Option<&TaskHandle> {
        match (&self.abstraction, &self.composition) {
            (_, Some(stage)) => Some(&stage.result),
            (Some(stage), None) => Some(&stage.result),
            (None, None) => None,
        }
    }

    pub fn abstracted_variables(&self) -> usize {
        self.abstraction
            .as_ref()
            .map_or(0, |stage| stage.safe_variables.len())
    }

    pub fn composites(&self) -> usize {
        self.composition
            .as_ref()
            .map_or(0, |stage| stage.composition.len())
    }
}
