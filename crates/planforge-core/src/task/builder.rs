//! Programmatic task construction.

use std::collections::BTreeSet;

use super::{Effect, FactPair, Operator, TaskParts, TaskSnapshot, Variable};
use crate::error::Result;

/// Builds a [`TaskSnapshot`] step by step.
///
/// Variables without an explicit initial value start at value 0.
///
/// # Example
///
/// ```
/// use planforge_core::{FactPair, TaskBuilder};
///
/// let task = TaskBuilder::new()
///     .variable("door", 2)
///     .variable("robot", 3)
///     .initial(0, 0)
///     .initial(1, 0)
///     .operator("open", &[(0, 0)], &[(0, 1)], 1)
///     .operator("move", &[(0, 1), (1, 0)], &[(1, 2)], 1)
///     .goal(1, 2)
///     .build()
///     .unwrap();
///
/// assert_eq!(task.num_variables(), 2);
/// assert_eq!(task.goal_value(1), Some(2));
/// assert_eq!(task.operator(1).precondition_on(0), Some(1));
/// ```
#[derive(Debug, Clone, Default)]
pub struct TaskBuilder {
    variables: Vec<Variable>,
    initial_state: Vec<usize>,
    operators: Vec<Operator>,
    axioms: Vec<Operator>,
    goals: Vec<FactPair>,
    mutex_groups: Vec<Vec<FactPair>>,
}

impl TaskBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a variable with `domain_size` values.
    pub fn variable(mut self, name: impl Into<String>, domain_size: usize) -> Self {
        self.variables.push(Variable::new(name, domain_size));
        self.initial_state.push(0);
        self
    }

    /// Adds a fully specified variable.
    pub fn with_variable(mut self, variable: Variable) -> Self {
        self.variables.push(variable);
        self.initial_state.push(0);
        self
    }

    /// Sets the initial value of `var`.
    ///
    /// # Panics
    ///
    /// Panics if `var` has not been added yet.
    pub fn initial(mut self, var: usize, value: usize) -> Self {
        self.initial_state[var] = value;
        self
    }

    /// Adds an operator with unconditional effects.
    pub fn operator(
        mut self,
        name: impl Into<String>,
        preconditions: &[(usize, usize)],
        effects: &[(usize, usize)],
        cost: i32,
    ) -> Self {
        self.operators.push(Operator::new(
            name,
            preconditions.iter().copied().map(FactPair::from).collect(),
            effects.iter().copied().map(FactPair::from).collect(),
            cost,
        ));
        self
    }

    /// Adds a fully specified operator.
    pub fn with_operator(mut self, operator: Operator) -> Self {
        self.operators.push(operator);
        self
    }

    /// Adds an axiom deriving `head` when `body` holds.
    pub fn axiom(
        mut self,
        name: impl Into<String>,
        body: &[(usize, usize)],
        head: (usize, usize),
    ) -> Self {
        self.axioms.push(Operator {
            preconditions: Vec::new(),
            effects: vec![Effect::conditional(
                head.0,
                head.1,
                &body.iter().copied().map(FactPair::from).collect::<Vec<_>>(),
            )],
            cost: 0,
            name: name.into(),
            is_axiom: true,
        });
        self
    }

    pub fn goal(mut self, var: usize, value: usize) -> Self {
        self.goals.push(FactPair::new(var, value));
        self
    }

    /// Declares the facts of `group` pairwise mutually exclusive.
    pub fn mutex_group(mut self, group: &[(usize, usize)]) -> Self {
        self.mutex_groups
            .push(group.iter().copied().map(FactPair::from).collect());
        self
    }

    /// Validates and returns the snapshot.
    pub fn build(self) -> Result<TaskSnapshot> {
        let mut mutexes: Vec<Vec<BTreeSet<FactPair>>> = self
            .variables
            .iter()
            .map(|variable| vec![BTreeSet::new(); variable.domain_size])
            .collect();
        for group in &self.mutex_groups {
            for a in group {
                for b in group {
                    if a.var == b.var {
                        continue;
                    }
                    if let Some(set) = mutexes.get_mut(a.var).and_then(|v| v.get_mut(a.value)) {
                        set.insert(*b);
                    }
                }
            }
        }
        TaskSnapshot::from_parts(TaskParts {
            variables: self.variables,
            mutexes,
            operators: self.operators,
            axioms: self.axioms,
            initial_state: self.initial_state,
            goals: self.goals,
        })
    }
}
