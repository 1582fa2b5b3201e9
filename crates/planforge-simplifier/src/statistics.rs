//! Simplification statistics.
//!
//! Per-layer numbers plus totals for one simplification run.

use std::time::Duration;

use crate::layer::Layer;

/// Numbers for one layer.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct LayerStatistics {
    pub layer: usize,
    /// Variables removed by the abstraction stage.
    pub abstracted_variables: usize,
    /// Accepted composition targets.
    pub targets: usize,
    /// Mean `|A|` over accepted targets.
    pub average_producers: f64,
    /// Mean `|B|` over accepted targets.
    pub average_consumers: f64,
    /// Composite operators appended.
    pub composites: usize,
    /// Mean chain length of those composites.
    pub average_chain_length: f64,
    /// Operators cleared by composition.
    pub cleared_operators: usize,
    /// Variables left after the layer.
    pub remaining_variables: usize,
    /// Non-inert operators left after the layer.
    pub remaining_operators: usize,
}

impl LayerStatistics {
    /// Collects the numbers of `layer`.
    pub fn of(layer: &Layer) -> Self {
        let mut stats = Self {
            layer: layer.index,
            abstracted_variables: layer.abstracted_variables(),
            ..Self::default()
        };
        if let Some(stage) = &layer.composition {
            stats.targets = stage.statistics.targets;
            stats.average_producers = stage.statistics.average_producers;
            stats.average_consumers = stage.statistics.average_consumers;
            stats.composites = stage.statistics.composites;
            stats.average_chain_length = stage.statistics.average_chain_length;
            stats.cleared_operators = stage.statistics.cleared;
        }
        if let Some(result) = layer.result() {
            stats.remaining_variables = result.num_variables();
            stats.remaining_operators = result
                .operators()
                .iter()
                .filter(|op| !op.is_inert())
                .count();
        }
        stats
    }
}

/// Statistics of a whole simplification run.
///
/// # Example
///
/// ```
/// use planforge_simplifier::{LayerStatistics, SimplificationStatistics};
///
/// let mut stats = SimplificationStatistics::default();
/// stats.record(LayerStatistics { abstracted_variables: 2, composites: 3, ..Default::default() });
/// stats.record(LayerStatistics { abstracted_variables: 1, ..Default::default() });
///
/// assert_eq!(stats.layer_count(), 2);
/// assert_eq!(stats.abstracted_variables(), 3);
/// assert_eq!(stats.composites(), 3);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SimplificationStatistics {
    pub layers: Vec<LayerStatistics>,
    /// Wall-clock time spent simplifying.
    pub duration: Duration,
}

impl SimplificationStatistics {
    pub fn record(&mut self, layer: LayerStatistics) {
        self.layers.push(layer);
    }

    pub fn layer_count(&self) -> usize {
        self.layers.len()
    }

    /// Variables removed over all layers.
    pub fn abstracted_variables(&self) -> usize {
        self.layers.iter().map(|l| l.abstracted_variables).sum()
    }

    /// Composite operators created over all layers.
    pub fn composites(&self) -> usize {
        self.layers.iter().map(|l| l.composites).sum()
    }

    /// Operators cleared over all layers.
    pub fn cleared_operators(&self) -> usize {
        self.layers.iter().map(|l| l.cleared_operators).sum()
    }

    /// Returns the elapsed time in milliseconds.
    pub fn duration_ms(&self) -> u64 {
        self.duration.as_millis() as u64
    }
}
