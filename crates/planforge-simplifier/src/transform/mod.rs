//! Snapshot transforms.
//!
//! Both transforms are pure: they read a parent snapshot and return a new
//! one. Operator indices never shift, so a plan step keeps naming the same
//! operator across every snapshot derived from the one it was found on.

#[cfg(test)]
mod tests;

use std::collections::BTreeSet;

use planforge_core::{Effect, FactPair, Operator, PlanforgeError, Result, TaskSnapshot};
use tracing::debug;

use crate::compositor::Composition;

/// Removes `safe_variables` from `task` and renumbers the rest.
///
/// Preconditions, effects and goals on removed variables are dropped. An
/// operator left without preconditions and effects stays in place as an
/// inert operator.
///
/// # Errors
///
/// Returns [`PlanforgeError::UnknownVariable`] for an id outside the task,
/// and [`PlanforgeError::Internal`] if an effect condition mentions a
/// removed variable.
pub fn abstract_snapshot(task: &TaskSnapshot, safe_variables: &[usize]) -> Result<TaskSnapshot> {
    let num_variables = task.num_variables();
    let mut mapping: Vec<Option<usize>> = (0..num_variables).map(Some).collect();
    for &var in safe_variables {
        if var >= num_variables {
            return Err(PlanforgeError::UnknownVariable { var, num_variables });
        }
        mapping[var] = None;
    }
    let mut next = 0;
    for slot in mapping.iter_mut().flatten() {
        *slot = next;
        next += 1;
    }

    let remap = |fact: &FactPair| mapping[fact.var].map(|var| FactPair::new(var, fact.value));

    let mut parts = task.to_parts();
    parts.variables = keep(parts.variables, &mapping);
    parts.initial_state = keep(parts.initial_state, &mapping);
    parts.mutexes = keep(parts.mutexes, &mapping)
        .into_iter()
        .map(|values| {
            values
                .into_iter()
                .map(|set| set.iter().filter_map(remap).collect::<BTreeSet<_>>())
                .collect::<Vec<_>>()
        })
        .collect();
    parts.goals = parts.goals.iter().filter_map(remap).collect();
    parts.operators = parts
        .operators
        .iter()
        .map(|op| strip(op, &remap))
        .collect::<Result<_>>()?;
    parts.axioms = parts
        .axioms
        .iter()
        .map(|op| strip(op, &remap))
        .collect::<Result<_>>()?;

    let reduced = TaskSnapshot::from_parts(parts)?;
    debug!(
        event = "abstraction_transform",
        removed = safe_variables.len(),
        variables = reduced.num_variables(),
        inert_operators = reduced.operators().iter().filter(|op| op.is_inert()).count(),
    );
    Ok(reduced)
}

/// Clears subsumed operators and appends the composites of `composition`.
///
/// # Errors
///
/// Returns [`PlanforgeError::SnapshotMismatch`] if `composition` was computed
/// for a snapshot with a different number of operators.
pub fn compose_snapshot(task: &TaskSnapshot, composition: &Composition) -> Result<TaskSnapshot> {
    if composition.base_operators() != task.num_operators() {
        return Err(PlanforgeError::SnapshotMismatch {
            expected: composition.base_operators(),
            found: task.num_operators(),
        });
    }

    let mut parts = task.to_parts();
    for &index in composition.cleared() {
        parts.operators[index].clear();
    }
    parts
        .operators
        .extend(composition.composites().iter().cloned());

    let composed = TaskSnapshot::from_parts(parts)?;
    debug!(
        event = "composition_transform",
        cleared = composition.cleared().len(),
        appended = composition.len(),
        operators = composed.num_operators(),
    );
    Ok(composed)
}

fn keep<T>(items: Vec<T>, mapping: &[Option<usize>]) -> Vec<T> {
    items
        .into_iter()
        .zip(mapping)
        .filter_map(|(item, slot)| slot.map(|_| item))
        .collect()
}

fn strip<F>(op: &Operator, remap: &F) -> Result<Operator>
where
    F: Fn(&FactPair) -> Option<FactPair>,
{
    let mut effects = Vec::with_capacity(op.effects.len());
    for effect in &op.effects {
        let Some(fact) = remap(&effect.fact) else {
            continue;
        };
        let mut conditions = Vec::with_capacity(effect.conditions.len());
        for condition in &effect.conditions {
            match remap(condition) {
                Some(c) => conditions.push(c),
                None => {
                    return Err(PlanforgeError::Internal(format!(
                        "operator {} has an effect condition on abstracted variable {}",
                        op.name, condition.var
                    )))
                }
            }
        }
        effects.push(Effect::conditional(fact.var, fact.value, &conditions));
    }

    Ok(Operator {
        preconditions: op.preconditions.iter().filter_map(remap).collect(),
        effects,
        cost: op.cost,
        name: op.name.clone(),
        is_axiom: op.is_axiom,
    })
}
