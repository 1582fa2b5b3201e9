//! Safe variable detection.
//!
//! The abstractor builds one [`FreeTransitionGraph`] per variable and reports
//! the variables whose free transitions alone can answer every demand the
//! rest of the task places on them. Those variables can be removed from the
//! task and restored by refinement.

#[cfg(test)]
mod tests;

use planforge_core::{Operator, TaskSnapshot};
use tracing::{debug, trace};

use crate::graph::FreeTransitionGraph;

/// Outcome of the three safety checks for one variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SafetyVerdict {
    /// Variable occurs in an axiom or effect condition, or is derived.
    pub pinned: bool,
    /// Externally required values reach each other through free transitions.
    pub required_connected: bool,
    /// Every externally caused value reaches every externally required value.
    pub caused_reach_required: bool,
    /// The goal value, if any, is reachable from every demanded value.
    pub goal_reachable: bool,
}

impl SafetyVerdict {
    #[inline]
    pub fn is_safe(&self) -> bool {
        !self.pinned && self.required_connected && self.caused_reach_required && self.goal_reachable
    }
}

/// Free transition graphs of a task snapshot and the safety analysis on them.
///
/// # Examples
///
/// ```
/// use planforge_core::TaskBuilder;
/// use planforge_simplifier::Abstractor;
///
/// let task = TaskBuilder::new()
///     .variable("lever", 2)
///     .variable("gate", 2)
///     .operator("pull", &[(0, 0)], &[(0, 1)], 1)
///     .operator("push", &[(0, 1)], &[(0, 0)], 1)
///     .operator("open", &[(0, 1)], &[(1, 1)], 1)
///     .goal(1, 1)
///     .build()
///     .unwrap();
///
/// let abstractor = Abstractor::new(&task);
/// assert_eq!(abstractor.find_safe_variables(), vec![0]);
/// ```
#[derive(Debug, Clone)]
pub struct Abstractor {
    graphs: Vec<FreeTransitionGraph>,
    pinned: Vec<bool>,
    goals: Vec<Option<usize>>,
}

impl Abstractor {
    /// Builds the free transition graphs of `task`.
    pub fn new(task: &TaskSnapshot) -> Self {
        let num_variables = task.num_variables();
        let mut graphs: Vec<FreeTransitionGraph> = (0..num_variables)
            .map(|var| FreeTransitionGraph::new(var, task.domain_size(var)))
            .collect();
        let mut pinned: Vec<bool> = task
            .variables()
            .iter()
            .map(|variable| variable.is_derived())
            .collect();

        for (var, &value) in task.initial_state().iter().enumerate() {
            graphs[var].mark_externally_caused(value);
        }

        for (index, op) in task.operators().iter().enumerate() {
            classify(&mut graphs, &mut pinned, index, op);
        }

        for axiom in task.axioms() {
            for var in axiom.variables() {
                pinned[var] = true;
            }
        }

        let goals = (0..num_variables).map(|var| task.goal_value(var)).collect();

        Self {
            graphs,
            pinned,
            goals,
        }
    }

    pub fn num_variables(&self) -> usize {
        self.graphs.len()
    }

    /// Returns the free transition graph of `var`.
    pub fn graph(&self, var: usize) -> &FreeTransitionGraph {
        &self.graphs[var]
    }

    pub fn graphs(&self) -> &[FreeTransitionGraph] {
        &self.graphs
    }

    /// Consumes the abstractor, keeping only its graphs.
    pub fn into_graphs(self) -> Vec<FreeTransitionGraph> {
        self.graphs
    }

    /// Runs the safety checks on `var`.
    pub fn verdict(&self, var: usize) -> SafetyVerdict {
        let graph = &self.graphs[var];
        let required = graph.externally_required_values();
        let caused = graph.externally_caused_values();

        let required_connected = graph.is_strongly_connected(&required);
        let caused_reach_required = caused
            .iter()
            .all(|&value| graph.is_reachable(value, &required));
        let goal_reachable = match self.goals[var] {
            None => true,
            Some(goal) => {
                let sources = if required.is_empty() {
                    &caused
                } else {
                    &required
                };
                sources
                    .iter()
                    .all(|&value| graph.is_reachable(value, &[goal]))
            }
        };

        SafetyVerdict {
            pinned: self.pinned[var],
            required_connected,
            caused_reach_required,
            goal_reachable,
        }
    }

    /// Returns the ids of all safe variables in ascending order.
    pub fn find_safe_variables(&self) -> Vec<usize> {
        let mut safe = Vec::new();
        for var in 0..self.num_variables() {
            let verdict = self.verdict(var);
            debug!(
                event = "variable_verdict",
                variable = var,
                safe = verdict.is_safe(),
                pinned = verdict.pinned,
                required_connected = verdict.required_connected,
                caused_reach_required = verdict.caused_reach_required,
                goal_reachable = verdict.goal_reachable,
            );
            if verdict.is_safe() {
                safe.push(var);
            }
        }
        safe
    }
}

/// Records the transitions and external demands of one operator.
fn classify(
    graphs: &mut [FreeTransitionGraph],
    pinned: &mut [bool],
    index: usize,
    op: &Operator,
) {
    if op.is_inert() {
        return;
    }
    for effect in &op.effects {
        for condition in &effect.conditions {
            pinned[condition.var] = true;
        }
    }

    let vars = op.variables();
    if let [var] = vars[..] {
        add_free_transitions(&mut graphs[var], index, op);
        return;
    }

    for pre in &op.preconditions {
        graphs[pre.var].mark_externally_required(pre.value);
    }
    for fact in op.effect_facts() {
        graphs[fact.var].mark_externally_caused(fact.value);
    }
}

fn add_free_transitions(graph: &mut FreeTransitionGraph, index: usize, op: &Operator) {
    let var = graph.variable();
    let Some(target) = op.effect_on(var) else {
        return;
    };
    match op.precondition_on(var) {
        Some(source) => {
            trace!(
                event = "free_transition",
                variable = var,
                from = source,
                to = target,
                operator = index,
            );
            graph.add_transition(source, target, index);
        }
        None => {
            for source in (0..graph.num_values()).filter(|&value| value != target) {
                trace!(
                    event = "free_transition",
                    variable = var,
                    from = source,
                    to = target,
                    operator = index,
                );
                graph.add_transition(source, target, index);
            }
        }
    }
}
