//! Immutable task snapshots.

use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

use super::{FactPair, Operator, Variable};
use crate::error::{PlanforgeError, Result};
use crate::plan::{OperatorRef, Plan, PlanViolation};

/// Shared handle to a snapshot.
///
/// Every simplification layer keeps the handle of the snapshot it analyzed,
/// so refinement can replay plans against old layers after the driver has
/// moved on to a newer snapshot.
pub type TaskHandle = Arc<TaskSnapshot>;

/// The owned vectors of a snapshot, open for mutation.
#[derive(Debug, Clone, Default)]
pub struct TaskParts {
    pub variables: Vec<Variable>,
    pub mutexes: Vec<Vec<BTreeSet<FactPair>>>,
    pub operators: Vec<Operator>,
    pub axioms: Vec<Operator>,
    pub initial_state: Vec<usize>,
    pub goals: Vec<FactPair>,
}

/// A complete planning task.
///
/// Snapshots are value types: transforms build new snapshots instead of
/// mutating existing ones.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskSnapshot {
    pub(crate) variables: Vec<Variable>,
    /// `mutexes[var][value]` holds the facts mutually exclusive with `var=value`.
    pub(crate) mutexes: Vec<Vec<BTreeSet<FactPair>>>,
    pub(crate) operators: Vec<Operator>,
    pub(crate) axioms: Vec<Operator>,
    pub(crate) initial_state: Vec<usize>,
    pub(crate) goals: Vec<FactPair>,
}

impl TaskSnapshot {
    /// Assembles a snapshot from its parts and validates it.
    ///
    /// # Errors
    ///
    /// Returns [`PlanforgeError::InvalidTask`] if the parts are inconsistent.
    pub fn from_parts(parts: TaskParts) -> Result<Self> {
        let task = Self {
            variables: parts.variables,
            mutexes: parts.mutexes,
            operators: parts.operators,
            axioms: parts.axioms,
            initial_state: parts.initial_state,
            goals: parts.goals,
        };
        task.validate()?;
        Ok(task)
    }

    /// Copies the snapshot into mutable parts for deriving a new snapshot.
    pub fn to_parts(&self) -> TaskParts {
        TaskParts {
            variables: self.variables.clone(),
            mutexes: self.mutexes.clone(),
            operators: self.operators.clone(),
            axioms: self.axioms.clone(),
            initial_state: self.initial_state.clone(),
            goals: self.goals.clone(),
        }
    }

    /// Wraps the snapshot in a [`TaskHandle`].
    pub fn into_handle(self) -> TaskHandle {
        Arc::new(self)
    }

    /// Checks the structural invariants of the task.
    pub fn validate(&self) -> Result<()> {
        let n = self.variables.len();
        if self.initial_state.len() != n {
            return Err(PlanforgeError::InvalidTask(format!(
                "initial state has {} values for {} variables",
                self.initial_state.len(),
                n
            )));
        }
        if self.mutexes.len() != n {
            return Err(PlanforgeError::InvalidTask(format!(
                "mutex table has {} entries for {} variables",
                self.mutexes.len(),
                n
            )));
        }
        for (var, (variable, &value)) in self.variables.iter().zip(&self.initial_state).enumerate()
        {
            if value >= variable.domain_size {
                return Err(PlanforgeError::InvalidTask(format!(
                    "initial value {value} of variable {var} ({}) is outside its domain",
                    variable.name
                )));
            }
            if self.mutexes[var].len() != variable.domain_size {
                return Err(PlanforgeError::InvalidTask(format!(
                    "mutex table of variable {var} has {} entries for domain size {}",
                    self.mutexes[var].len(),
                    variable.domain_size
                )));
            }
        }
        for set in self.mutexes.iter().flatten() {
            for fact in set {
                self.check_fact(*fact, "mutex")?;
            }
        }
        for goal in &self.goals {
            self.check_fact(*goal, "goal")?;
        }
        for op in self.operators.iter().chain(&self.axioms) {
            let mut seen = BTreeSet::new();
            for pre in &op.preconditions {
                self.check_fact(*pre, &op.name)?;
                if !seen.insert(pre.var) {
                    return Err(PlanforgeError::InvalidTask(format!(
                        "operator {} has two preconditions on variable {}",
                        op.name, pre.var
                    )));
                }
            }
            let mut written = BTreeSet::new();
            for effect in &op.effects {
                self.check_fact(effect.fact, &op.name)?;
                for condition in &effect.conditions {
                    self.check_fact(*condition, &op.name)?;
                }
                if !effect.is_conditional() && !written.insert(effect.fact.var) {
                    return Err(PlanforgeError::InvalidTask(format!(
                        "operator {} writes variable {} twice",
                        op.name, effect.fact.var
                    )));
                }
            }
        }
        Ok(())
    }

    fn check_fact(&self, fact: FactPair, context: &str) -> Result<()> {
        match self.variables.get(fact.var) {
            None => Err(PlanforgeError::UnknownVariable {
                var: fact.var,
                num_variables: self.variables.len(),
            }),
            Some(variable) if fact.value >= variable.domain_size => {
                Err(PlanforgeError::InvalidTask(format!(
                    "{context}: value {} outside the domain of variable {} ({})",
                    fact.value, fact.var, variable.name
                )))
            }
            Some(_) => Ok(()),
        }
    }

    #[inline]
    pub fn num_variables(&self) -> usize {
        self.variables.len()
    }

    pub fn variables(&self) -> &[Variable] {
        &self.variables
    }

    /// # Panics
    ///
    /// Panics if `var` is out of range.
    pub fn variable(&self, var: usize) -> &Variable {
        &self.variables[var]
    }

    pub fn domain_size(&self, var: usize) -> usize {
        self.variables[var].domain_size
    }

    pub fn variable_name(&self, var: usize) -> &str {
        &self.variables[var].name
    }

    pub fn fact_name(&self, fact: FactPair) -> &str {
        &self.variables[fact.var].fact_names[fact.value]
    }

    pub fn mutexes(&self) -> &[Vec<BTreeSet<FactPair>>] {
        &self.mutexes
    }

    /// Returns true if the two facts can never hold together.
    pub fn are_facts_mutex(&self, a: FactPair, b: FactPair) -> bool {
        if a.var == b.var {
            return a.value != b.value;
        }
        self.mutexes[a.var][a.value].contains(&b) || self.mutexes[b.var][b.value].contains(&a)
    }

    #[inline]
    pub fn num_operators(&self) -> usize {
        self.operators.len()
    }

    pub fn operators(&self) -> &[Operator] {
        &self.operators
    }

    /// # Panics
    ///
    /// Panics if `index` is out of range.
    pub fn operator(&self, index: usize) -> &Operator {
        &self.operators[index]
    }

    /// Resolves a plan step to its operator or axiom.
    pub fn resolve(&self, op: OperatorRef) -> Result<&Operator> {
        let list = if op.is_axiom {
            &self.axioms
        } else {
            &self.operators
        };
        list.get(op.index)
            .ok_or(PlanforgeError::UnknownOperator {
                index: op.index,
                num_operators: list.len(),
            })
    }

    pub fn axioms(&self) -> &[Operator] {
        &self.axioms
    }

    pub fn initial_state(&self) -> &[usize] {
        &self.initial_state
    }

    pub fn goals(&self) -> &[FactPair] {
        &self.goals
    }

    /// Returns the goal value of `var`, if the goal mentions it.
    pub fn goal_value(&self, var: usize) -> Option<usize> {
        self.goals
            .iter()
            .find(|goal| goal.var == var)
            .map(|goal| goal.value)
    }

    /// Returns true if every precondition of `op` holds in `state`.
    pub fn is_applicable(&self, state: &[usize], op: &Operator) -> bool {
        op.preconditions
            .iter()
            .all(|pre| state[pre.var] == pre.value)
    }

    /// Applies the effects of `op` to `state`.
    ///
    /// Effect conditions are evaluated in the state before the operator.
    pub fn apply(&self, state: &mut [usize], op: &Operator) {
        let fired: Vec<FactPair> = op
            .effects
            .iter()
            .filter(|effect| effect.conditions.iter().all(|c| state[c.var] == c.value))
            .map(|effect| effect.fact)
            .collect();
        for fact in fired {
            state[fact.var] = fact.value;
        }
    }

    pub fn is_goal_state(&self, state: &[usize]) -> bool {
        self.goals.iter().all(|goal| state[goal.var] == goal.value)
    }

    /// Simulates `plan` from the initial state and returns the final state.
    ///
    /// # Errors
    ///
    /// Returns [`PlanforgeError::InvalidPlan`] naming the first failing step,
    /// or the first unmet goal.
    pub fn check_plan(&self, plan: &Plan) -> Result<Vec<usize>> {
        let mut state = self.initial_state.clone();
        for (step, op_ref) in plan.iter().enumerate() {
            let op = self.resolve(*op_ref)?;
            if let Some(pre) = op
                .preconditions
                .iter()
                .find(|pre| state[pre.var] != pre.value)
            {
                return Err(PlanforgeError::InvalidPlan(PlanViolation::Precondition {
                    step,
                    operator: op.name.clone(),
                    fact: *pre,
                    actual: state[pre.var],
                }));
            }
            self.apply(&mut state, op);
        }
        if let Some(goal) = self.goals.iter().find(|goal| state[goal.var] != goal.value) {
            return Err(PlanforgeError::InvalidPlan(PlanViolation::Goal {
                fact: *goal,
                actual: state[goal.var],
            }));
        }
        Ok(state)
    }
}

impl fmt::Display for TaskSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "variables:")?;
        for (var, variable) in self.variables.iter().enumerate() {
            writeln!(
                f,
                "  {var}: {} (domain {}, initially {})",
                variable.name, variable.domain_size, self.initial_state[var]
            )?;
        }
        writeln!(f, "mutexes:")?;
        for (var, values) in self.mutexes.iter().enumerate() {
            for (value, set) in values.iter().enumerate() {
                if set.is_empty() {
                    continue;
                }
                write!(f, "  {var}={value} excludes")?;
                for fact in set {
                    write!(f, " {fact}")?;
                }
                writeln!(f)?;
            }
        }
        writeln!(f, "operators:")?;
        for (index, op) in self.operators.iter().enumerate() {
            writeln!(f, "  {index}: {op}")?;
        }
        write!(f, "goal:")?;
        for goal in &self.goals {
            write!(f, " {goal}")?;
        }
        Ok(())
    }
}
