//! Operator chains and the composite operators built from them.

use std::collections::{BTreeMap, BTreeSet};

use planforge_core::{FactPair, Operator, TaskSnapshot};

/// Structural identity of an operator: its precondition and effect sets.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub(crate) struct Signature {
    preconditions: Vec<FactPair>,
    effects: Vec<FactPair>,
}

impl Signature {
    pub(crate) fn of(op: &Operator) -> Self {
        let mut preconditions = op.preconditions.clone();
        preconditions.sort_unstable();
        let mut effects: Vec<FactPair> = op.effect_facts().collect();
        effects.sort_unstable();
        Self {
            preconditions,
            effects,
        }
    }
}

/// Returns true if no step of `chain` requires a value that contradicts
/// what earlier steps required or produced.
///
/// This is a forward consistency check, not applicability from a state.
pub fn is_executable(task: &TaskSnapshot, chain: &[usize]) -> bool {
    let mut state: BTreeMap<usize, usize> = BTreeMap::new();
    for &index in chain {
        let op = task.operator(index);
        for pre in &op.preconditions {
            match state.get(&pre.var) {
                Some(&value) if value != pre.value => return false,
                Some(_) => {}
                None => {
                    state.insert(pre.var, pre.value);
                }
            }
        }
        for fact in op.effect_facts() {
            state.insert(fact.var, fact.value);
        }
    }
    true
}

/// Fuses an executable chain into one operator.
///
/// Preconditions are those not established by an earlier step, effects are
/// the final value of every written variable, and the cost is the sum of
/// step costs.
pub fn compose(task: &TaskSnapshot, chain: &[usize]) -> Operator {
    let mut written: BTreeMap<usize, usize> = BTreeMap::new();
    let mut preconditions: BTreeSet<FactPair> = BTreeSet::new();
    let mut cost = 0i32;
    let mut names = Vec::with_capacity(chain.len());

    for &index in chain {
        let op = task.operator(index);
        for pre in &op.preconditions {
            if !written.contains_key(&pre.var) {
                preconditions.insert(*pre);
            }
        }
        for fact in op.effect_facts() {
            written.insert(fact.var, fact.value);
        }
        cost = cost.saturating_add(op.cost);
        names.push(op.name.as_str());
    }

    Operator::new(
        format!("[{}]", names.join(" > ")),
        preconditions.into_iter().collect(),
        written
            .into_iter()
            .map(|(var, value)| FactPair::new(var, value))
            .collect(),
        cost,
    )
}

/// Returns true if `op` ends with a different value of `var` than it
/// started with (or writes `var` without requiring it).
pub fn changes(op: &Operator, var: usize) -> bool {
    match op.effect_on(var) {
        Some(value) => op.precondition_on(var) != Some(value),
        None => false,
    }
}
