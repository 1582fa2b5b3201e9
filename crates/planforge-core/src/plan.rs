//! Plans: ordered operator references.

use std::fmt;

use crate::task::{FactPair, TaskSnapshot};

/// Reference to an operator (or axiom) of a task by index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct OperatorRef {
    pub index: usize,
    pub is_axiom: bool,
}

impl OperatorRef {
    /// References a regular operator.
    pub const fn operator(index: usize) -> Self {
        Self {
            index,
            is_axiom: false,
        }
    }

    /// References an axiom.
    pub const fn axiom(index: usize) -> Self {
        Self {
            index,
            is_axiom: true,
        }
    }
}

impl From<usize> for OperatorRef {
    fn from(index: usize) -> Self {
        Self::operator(index)
    }
}

/// An ordered sequence of operator references.
///
/// Produced by a search over the simplified task and rewritten in place
/// during refinement.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Plan {
    steps: Vec<OperatorRef>,
}

impl Plan {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a plan of regular operators from their indices.
    pub fn from_indices<I: IntoIterator<Item = usize>>(indices: I) -> Self {
        Self {
            steps: indices.into_iter().map(OperatorRef::operator).collect(),
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn steps(&self) -> &[OperatorRef] {
        &self.steps
    }

    pub fn iter(&self) -> std::slice::Iter<'_, OperatorRef> {
        self.steps.iter()
    }

    /// Operator indices of the plan, axioms included.
    pub fn indices(&self) -> Vec<usize> {
        self.steps.iter().map(|op| op.index).collect()
    }

    pub fn push(&mut self, op: OperatorRef) {
        self.steps.push(op);
    }

    /// Inserts `ops` before position `at`, keeping their order.
    ///
    /// # Panics
    ///
    /// Panics if `at > len`.
    pub fn insert_path<I: IntoIterator<Item = usize>>(&mut self, at: usize, ops: I) {
        self.steps
            .splice(at..at, ops.into_iter().map(OperatorRef::operator));
    }

    /// Replaces the step at `at` with `ops`, keeping their order.
    ///
    /// # Panics
    ///
    /// Panics if `at >= len`.
    pub fn replace<I: IntoIterator<Item = usize>>(&mut self, at: usize, ops: I) {
        self.steps
            .splice(at..=at, ops.into_iter().map(OperatorRef::operator));
    }

    /// Keeps only the steps matching `keep`.
    pub fn retain<F: FnMut(&OperatorRef) -> bool>(&mut self, keep: F) {
        self.steps.retain(keep);
    }

    /// Sums operator costs against `task`. Unknown operators count as zero.
    pub fn cost(&self, task: &TaskSnapshot) -> i64 {
        self.steps
            .iter()
            .filter_map(|op| task.resolve(*op).ok())
            .map(|op| i64::from(op.cost))
            .sum()
    }

    /// Renders the plan with operator names from `task`, one step per line.
    pub fn display<'a>(&'a self, task: &'a TaskSnapshot) -> PlanDisplay<'a> {
        PlanDisplay { plan: self, task }
    }
}

impl FromIterator<OperatorRef> for Plan {
    fn from_iter<T: IntoIterator<Item = OperatorRef>>(iter: T) -> Self {
        Self {
            steps: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a Plan {
    type Item = &'a OperatorRef;
    type IntoIter = std::slice::Iter<'a, OperatorRef>;

    fn into_iter(self) -> Self::IntoIter {
        self.steps.iter()
    }
}

/// Named rendering of a plan, in the usual `(operator name)` per line form.
pub struct PlanDisplay<'a> {
    plan: &'a Plan,
    task: &'a TaskSnapshot,
}

impl fmt::Display for PlanDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for op in self.plan {
            match self.task.resolve(*op) {
                Ok(operator) => writeln!(f, "({})", operator.name)?,
                Err(_) => writeln!(f, "(<unknown operator {}>)", op.index)?,
            }
        }
        write!(f, "; cost = {}", self.plan.cost(self.task))
    }
}

/// Why a plan fails on a task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlanViolation {
    /// Step `step` requires `fact` but the variable holds `actual`.
    Precondition {
        step: usize,
        operator: String,
        fact: FactPair,
        actual: usize,
    },
    /// The final state misses goal `fact`.
    Goal { fact: FactPair, actual: usize },
}

impl fmt::Display for PlanViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Precondition {
                step,
                operator,
                fact,
                actual,
            } => write!(
                f,
                "step {step} ({operator}) requires {fact} but variable {} is {actual}",
                fact.var
            ),
            Self::Goal { fact, actual } => write!(
                f,
                "goal {fact} unmet, variable {} is {actual}",
                fact.var
            ),
        }
    }
}
