//! Plan refinement.
//!
//! Turns a plan for the most simplified snapshot into a plan for the
//! original task by undoing the layers newest first. Per layer:
//!
//! 1. steps on operators the composition cleared are dropped, and composite
//!    operators are replaced by their chains;
//! 2. steps on operators the abstraction stripped to nothing are dropped;
//! 3. the plan is simulated against the snapshot the abstraction started
//!    from, and every unmet precondition or goal on an abstracted variable
//!    is repaired by splicing in the shortest free path to the needed value.
//!
//! Repair restarts the simulation after every insertion, so a layer costs
//! `O(len²)` simulated steps in the worst case.

#[cfg(test)]
mod tests;

use planforge_core::{Plan, PlanViolation, PlanforgeError, Result, TaskSnapshot};
use tracing::{debug, trace};

use crate::compositor::Composition;
use crate::layer::{AbstractionStage, Layer};

/// Counts of the edits refinement made.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RefinementStatistics {
    /// Composite steps replaced by their chains.
    pub decomposed: usize,
    /// Steps removed because their operator was made inert.
    pub dropped: usize,
    /// Free paths spliced into the plan.
    pub repairs: usize,
    /// Operators inserted by those paths.
    pub inserted_steps: usize,
}

/// Undoes a stack of layers on a plan.
pub struct Refiner<'a> {
    layers: &'a [Layer],
    statistics: RefinementStatistics,
}

impl<'a> Refiner<'a> {
    /// `layers` in the order they were applied.
    pub fn new(layers: &'a [Layer]) -> Self {
        Self {
            layers,
            statistics: RefinementStatistics::default(),
        }
    }

    pub fn statistics(&self) -> &RefinementStatistics {
        &self.statistics
    }

    /// Refines `plan` through every layer, newest first.
    ///
    /// # Errors
    ///
    /// Returns [`PlanforgeError::UnreachableRepair`] if an abstracted variable
    /// cannot reach a needed value, and [`PlanforgeError::InvalidPlan`] if the
    /// plan fails on a variable that was never abstracted.
    pub fn refine(&mut self, mut plan: Plan) -> Result<Plan> {
        for layer in self.layers.iter().rev() {
            self.refine_layer(layer, &mut plan)?;
        }
        Ok(plan)
    }

    fn refine_layer(&mut self, layer: &Layer, plan: &mut Plan) -> Result<()> {
        if let Some(stage) = &layer.composition {
            self.statistics.dropped += drop_inert_steps(plan, &stage.source, &stage.result);
            self.statistics.decomposed += decompose(plan, &stage.composition);
        }
        if let Some(stage) = &layer.abstraction {
            self.statistics.dropped += drop_inert_steps(plan, &stage.source, &stage.result);
            let (repairs, inserted) = repair(plan, stage, layer.index)?;
            self.statistics.repairs += repairs;
            self.statistics.inserted_steps += inserted;
        }
        debug!(
            event = "layer_refined",
            layer = layer.index,
            steps = plan.len(),
        );
        Ok(())
    }
}

/// Removes steps whose operator is inert in `after` but not in `before`.
///
/// Returns the number of removed steps.
pub fn drop_inert_steps(plan: &mut Plan, before: &TaskSnapshot, after: &TaskSnapshot) -> usize {
    let len = plan.len();
    plan.retain(|step| {
        if step.is_axiom {
            return true;
        }
        let made_inert = after
            .operators()
            .get(step.index)
            .is_some_and(|op| op.is_inert())
            && before
                .operators()
                .get(step.index)
                .is_some_and(|op| !op.is_inert());
        !made_inert
    });
    len - plan.len()
}

/// Replaces every composite step by its chain until none remain.
///
/// Returns the number of replaced steps.
pub fn decompose(plan: &mut Plan, composition: &Composition) -> usize {
    let mut replaced = 0;
    loop {
        let mut changed = false;
        let mut at = 0;
        while at < plan.len() {
            let step = plan.steps()[at];
            let chain = if step.is_axiom {
                None
            } else {
                composition.decomposition(step.index)
            };
            match chain {
                Some(chain) => {
                    trace!(
                        event = "decomposition",
                        step = at,
                        composite = step.index,
                        length = chain.len(),
                    );
                    plan.replace(at, chain.iter().copied());
                    at += chain.len();
                    replaced += 1;
                    changed = true;
                }
                None => at += 1,
            }
        }
        if !changed {
            return replaced;
        }
    }
}

/// Makes `plan` valid on `stage.source` by inserting free paths.
///
/// Returns the number of repairs and the number of inserted operators.
pub fn repair(plan: &mut Plan, stage: &AbstractionStage, layer: usize) -> Result<(usize, usize)> {
    let task = &stage.source;
    let mut repairs = 0;
    let mut inserted = 0;

    'simulate: loop {
        let mut state = task.initial_state().to_vec();
        for at in 0..plan.len() {
            let op = task.resolve(plan.steps()[at])?;
            if let Some(pre) = op
                .preconditions
                .iter()
                .find(|pre| state[pre.var] != pre.value)
            {
                let actual = state[pre.var];
                if !stage.is_safe(pre.var) {
                    return Err(PlanforgeError::InvalidPlan(PlanViolation::Precondition {
                        step: at,
                        operator: op.name.clone(),
                        fact: *pre,
                        actual,
                    }));
                }
                let path = free_path(stage, layer, pre.var, actual, pre.value)?;
                trace!(
                    event = "path_insertion",
                    layer,
                    step = at,
                    variable = pre.var,
                    from = actual,
                    to = pre.value,
                    length = path.len(),
                );
                inserted += path.len();
                repairs += 1;
                plan.insert_path(at, path);
                continue 'simulate;
            }
            task.apply(&mut state, op);
        }

        if let Some(goal) = task.goals().iter().find(|goal| state[goal.var] != goal.value) {
            let actual = state[goal.var];
            if !stage.is_safe(goal.var) {
                return Err(PlanforgeError::InvalidPlan(PlanViolation::Goal {
                    fact: *goal,
                    actual,
                }));
            }
            let path = free_path(stage, layer, goal.var, actual, goal.value)?;
            trace!(
                event = "path_insertion",
                layer,
                step = plan.len(),
                variable = goal.var,
                from = actual,
                to = goal.value,
                length = path.len(),
            );
            inserted += path.len();
            repairs += 1;
            let end = plan.len();
            plan.insert_path(end, path);
            continue 'simulate;
        }

        return Ok((repairs, inserted));
    }
}

fn free_path(
    stage: &AbstractionStage,
    layer: usize,
    variable: usize,
    from: usize,
    to: usize,
) -> Result<Vec<usize>> {
    let path = stage
        .graphs
        .get(variable)
        .map(|graph| graph.path(from, to))
        .unwrap_or_default();
    if path.is_empty() {
        return Err(PlanforgeError::UnreachableRepair {
            layer,
            variable,
            from,
            to,
        });
    }
    Ok(path)
}
