//! Candidate fact pairs and composition targets.

use std::collections::BTreeSet;

use planforge_core::{FactPair, Operator, TaskSnapshot};

/// A fact pair `c` with its producers `A` and consumers `B`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompositionTarget {
    pub facts: [FactPair; 2],
    /// Operators whose effects contain both facts.
    pub producers: BTreeSet<usize>,
    /// Operators whose preconditions contain both facts.
    pub consumers: BTreeSet<usize>,
}

impl CompositionTarget {
    /// Collects producers and consumers of `facts`.
    ///
    /// Returns `None` if either set is empty. Inert operators and operators
    /// with conditional effects take part in neither set.
    pub fn collect(task: &TaskSnapshot, facts: [FactPair; 2]) -> Option<Self> {
        let mut producers = BTreeSet::new();
        let mut consumers = BTreeSet::new();
        for (index, op) in task.operators().iter().enumerate() {
            if !is_composable(op) {
                continue;
            }
            if facts.iter().all(|f| op.effect_on(f.var) == Some(f.value)) {
                producers.insert(index);
            }
            if facts.iter().all(|f| op.precondition_on(f.var) == Some(f.value)) {
                consumers.insert(index);
            }
        }
        if producers.is_empty() || consumers.is_empty() {
            return None;
        }
        Some(Self {
            facts,
            producers,
            consumers,
        })
    }

    /// Returns true if `index` is a producer or a consumer.
    pub fn involves(&self, index: usize) -> bool {
        self.producers.contains(&index) || self.consumers.contains(&index)
    }

    /// Every operator outside `A ∪ B` that may run while `c` holds commutes
    /// with every operator in `A ∪ B`.
    pub fn outside_operators_commute(&self, task: &TaskSnapshot) -> bool {
        let operators = task.operators();
        for (index, outside) in operators.iter().enumerate() {
            if self.involves(index) || outside.is_inert() || !self.is_consistent_with(outside) {
                continue;
            }
            let conflict = self
                .producers
                .iter()
                .chain(&self.consumers)
                .filter(|&&other| other != index)
                .find(|&&other| !commute(outside, &operators[other]));
            if let Some(&other) = conflict {
                tracing::trace!(
                    event = "target_rejected",
                    reason = "commutativity",
                    c = %format_facts(&self.facts),
                    outside = %outside.name,
                    member = %operators[other].name,
                );
                return false;
            }
        }
        true
    }

    /// Every operator outside `A` either leaves `c`'s variables alone or
    /// writes a value that contradicts `c`.
    pub fn outside_producers_disjoint(&self, task: &TaskSnapshot) -> bool {
        for (index, op) in task.operators().iter().enumerate() {
            if self.producers.contains(&index) {
                continue;
            }
            let touches = self
                .facts
                .iter()
                .any(|fact| op.effect_on(fact.var).is_some());
            let contradicts = self
                .facts
                .iter()
                .any(|fact| op.effect_on(fact.var).is_some_and(|value| value != fact.value));
            if touches && !contradicts {
                tracing::trace!(
                    event = "target_rejected",
                    reason = "partial_producer",
                    c = %format_facts(&self.facts),
                    operator = %op.name,
                );
                return false;
            }
        }
        true
    }

    /// `op` has no precondition contradicting `c`.
    fn is_consistent_with(&self, op: &Operator) -> bool {
        self.facts
            .iter()
            .all(|fact| op.precondition_on(fact.var).map_or(true, |value| value == fact.value))
    }
}

/// Candidate pairs over all variable pairs `i < j` and all their values.
///
/// A pair is dropped when both facts hold initially or both are goal facts.
pub fn candidate_pairs(task: &TaskSnapshot) -> Vec<[FactPair; 2]> {
    let mut candidates = Vec::new();
    for i in 0..task.num_variables() {
        for j in (i + 1)..task.num_variables() {
            candidates.extend(pairs_of(task, i, j));
        }
    }
    candidates
}

/// Candidate pairs over the values of variables `i` and `j`.
pub fn pairs_of(task: &TaskSnapshot, i: usize, j: usize) -> Vec<[FactPair; 2]> {
    let initial = task.initial_state();
    let mut candidates = Vec::new();
    for vi in 0..task.domain_size(i) {
        for vj in 0..task.domain_size(j) {
            let facts = [FactPair::new(i, vi), FactPair::new(j, vj)];
            let initially_true = facts.iter().all(|f| initial[f.var] == f.value);
            let goal_facts = facts.iter().all(|f| task.goal_value(f.var) == Some(f.value));
            if !initially_true && !goal_facts {
                candidates.push(facts);
            }
        }
    }
    candidates
}

/// Returns true if `op` may appear in a composite.
pub(crate) fn is_composable(op: &Operator) -> bool {
    !op.is_axiom && !op.is_inert() && !op.has_conditional_effects()
}

/// Neither operator's effects clobber the other's preconditions or effects.
fn commute(a: &Operator, b: &Operator) -> bool {
    !interferes(a, b) && !interferes(b, a)
}

fn interferes(writer: &Operator, other: &Operator) -> bool {
    writer.effect_facts().any(|fact| {
        other
            .precondition_on(fact.var)
            .is_some_and(|value| value != fact.value)
            || other
                .effect_on(fact.var)
                .is_some_and(|value| value != fact.value)
    })
}

fn format_facts(facts: &[FactPair; 2]) -> String {
    format!("{} {}", facts[0], facts[1])
}
