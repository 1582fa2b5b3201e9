//! The simplification loop.
//!
//! Alternates abstraction and composition until a round changes nothing,
//! the task runs out of variables, or the layer bound is hit. The recorded
//! layers turn a plan for the reduced task back into a plan for the
//! original one.

use std::sync::Arc;
use std::time::Instant;

use planforge_config::SimplifierConfig;
use planforge_core::{Plan, Result, TaskHandle, TaskSnapshot};
use tracing::{info, trace};

use crate::abstractor::Abstractor;
use crate::compositor::Compositor;
use crate::layer::{AbstractionStage, CompositionStage, Layer};
use crate::refiner::{RefinementStatistics, Refiner};
use crate::statistics::{LayerStatistics, SimplificationStatistics};
use crate::transform::{abstract_snapshot, compose_snapshot};

/// The search component the simplifier hands the reduced task to.
pub trait PlanSearch {
    /// Returns a plan for `task`, or `None` if none was found.
    fn search(&mut self, task: &TaskSnapshot) -> Option<Plan>;
}

impl<F> PlanSearch for F
where
    F: FnMut(&TaskSnapshot) -> Option<Plan>,
{
    fn search(&mut self, task: &TaskSnapshot) -> Option<Plan> {
        self(task)
    }
}

/// Runs abstraction and composition rounds over a task.
///
/// # Examples
///
/// ```
/// use planforge_config::SimplifierConfig;
/// use planforge_core::{Plan, TaskBuilder};
/// use planforge_simplifier::Simplifier;
///
/// let task = TaskBuilder::new()
///     .variable("light", 2)
///     .operator("switch", &[(0, 0)], &[(0, 1)], 1)
///     .goal(0, 1)
///     .build()
///     .unwrap()
///     .into_handle();
///
/// let simplification = Simplifier::new(SimplifierConfig::default())
///     .simplify(task)
///     .unwrap();
/// assert_eq!(simplification.reduced().num_variables(), 0);
///
/// let plan = simplification.refine(Plan::new()).unwrap();
/// assert_eq!(plan.indices(), vec![0]);
/// ```
#[derive(Debug, Clone, Default)]
pub struct Simplifier {
    config: SimplifierConfig,
}

impl Simplifier {
    pub fn new(config: SimplifierConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SimplifierConfig {
        &self.config
    }

    /// Simplifies `task` layer by layer.
    ///
    /// # Errors
    ///
    /// Fails only if a transform produces an invalid snapshot.
    pub fn simplify(&self, task: TaskHandle) -> Result<Simplification> {
        let start = Instant::now();
        info!(
            event = "simplify_start",
            variables = task.num_variables(),
            operators = task.num_operators(),
            max_layers = self.config.max_layers,
        );

        let mut current = Arc::clone(&task);
        let mut layers: Vec<Layer> = Vec::new();
        let mut statistics = SimplificationStatistics::default();

        while layers.len() < self.config.max_layers && current.num_variables() > 0 {
            let index = layers.len();
            let abstraction = if self.config.abstraction.enabled {
                self.abstract_step(&current)?
            } else {
                None
            };
            let abstracted = abstraction
                .as_ref()
                .map_or_else(|| Arc::clone(&current), |stage| Arc::clone(&stage.result));
            let composition = if self.config.composition.enabled {
                self.compose_step(&abstracted)?
            } else {
                None
            };
            if abstraction.is_none() && composition.is_none() {
                break;
            }

            let layer = Layer {
                index,
                abstraction,
                composition,
            };
            if let Some(result) = layer.result() {
                current = Arc::clone(result);
            }
            let layer_stats = LayerStatistics::of(&layer);
            info!(
                event = "layer_end",
                layer = index,
                safe_variables = layer_stats.abstracted_variables,
                composites = layer_stats.composites,
                variables = layer_stats.remaining_variables,
                operators = layer_stats.remaining_operators,
            );
            statistics.record(layer_stats);
            layers.push(layer);
        }

        statistics.duration = start.elapsed();
        info!(
            event = "simplify_end",
            layers = layers.len(),
            abstracted_variables = statistics.abstracted_variables(),
            composites = statistics.composites(),
            variables = current.num_variables(),
            operators = current.num_operators(),
            duration_ms = statistics.duration_ms(),
        );
        trace!(event = "reduced_task", task = %current);

        Ok(Simplification {
            original: task,
            reduced: current,
            layers,
            statistics,
            verify_plan: self.config.refinement.verify_plan,
        })
    }

    fn abstract_step(&self, task: &TaskHandle) -> Result<Option<AbstractionStage>> {
        let abstractor = Abstractor::new(task);
        let safe_variables = abstractor.find_safe_variables();
        if safe_variables.is_empty() {
            return Ok(None);
        }
        for &var in &safe_variables {
            trace!(
                event = "safe_variable",
                variable = %task.variable_name(var),
                graph = %abstractor.graph(var).display(task),
            );
        }
        let result = abstract_snapshot(task, &safe_variables)?.into_handle();
        Ok(Some(AbstractionStage {
            source: Arc::clone(task),
            result,
            safe_variables,
            graphs: abstractor.into_graphs(),
        }))
    }

    fn compose_step(&self, task: &TaskHandle) -> Result<Option<CompositionStage>> {
        let mut compositor = Compositor::new(task, &self.config.composition);
        let composition = compositor.composite();
        if composition.is_empty() {
            return Ok(None);
        }
        let statistics = *compositor.statistics();
        let result = compose_snapshot(task, &composition)?.into_handle();
        Ok(Some(CompositionStage {
            source: Arc::clone(task),
            result,
            composition,
            statistics,
        }))
    }
}

/// The outcome of [`Simplifier::simplify`].
#[derive(Debug, Clone)]
pub struct Simplification {
    original: TaskHandle,
    reduced: TaskHandle,
    layers: Vec<Layer>,
    statistics: SimplificationStatistics,
    verify_plan: bool,
}

impl Simplification {
    /// The task simplification started from.
    pub fn original(&self) -> &TaskHandle {
        &self.original
    }

    /// The task to hand to search.
    pub fn reduced(&self) -> &TaskHandle {
        &self.reduced
    }

    /// Recorded layers, oldest first.
    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    pub fn statistics(&self) -> &SimplificationStatistics {
        &self.statistics
    }

    /// Turns a plan for [`reduced`](Self::reduced) into a plan for
    /// [`original`](Self::original).
    ///
    /// # Errors
    ///
    /// Propagates refinement failures. With plan verification enabled, a
    /// refined plan that does not solve the original task is reported as
    /// [`PlanforgeError::InvalidPlan`](planforge_core::PlanforgeError::InvalidPlan).
    pub fn refine(&self, plan: Plan) -> Result<Plan> {
        let (refined, stats) = self.refine_with_statistics(plan)?;
        info!(
            event = "refine_end",
            steps = refined.len(),
            cost = refined.cost(&self.original),
            repairs = stats.repairs,
            decomposed = stats.decomposed,
        );
        Ok(refined)
    }

    /// Like [`refine`](Self::refine), also returning what refinement changed.
    pub fn refine_with_statistics(&self, plan: Plan) -> Result<(Plan, RefinementStatistics)> {
        let mut refiner = Refiner::new(&self.layers);
        let refined = refiner.refine(plan)?;
        if self.verify_plan {
            self.original.check_plan(&refined)?;
        }
        Ok((refined, *refiner.statistics()))
    }

    /// Searches the reduced task and refines the result.
    ///
    /// Returns `Ok(None)` if the search finds no plan.
    pub fn solve<S: PlanSearch + ?Sized>(&self, search: &mut S) -> Result<Option<Plan>> {
        match search.search(&self.reduced) {
            Some(plan) => self.refine(plan).map(Some),
            None => {
                info!(event = "search_failed", variables = self.reduced.num_variables());
                Ok(None)
            }
        }
    }
}
