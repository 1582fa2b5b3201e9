//! Finite-domain planning task model.
//!
//! A task is a set of multi-valued state variables, operators that read and
//! write them, an initial state and a goal. Everything is addressed by dense
//! integer ids: variable ids index [`TaskSnapshot::variables`], operator ids
//! index [`TaskSnapshot::operators`].

mod builder;
mod snapshot;


use std::fmt;

use smallvec::SmallVec;

pub use builder::TaskBuilder;
pub use snapshot::{TaskHandle, TaskParts, TaskSnapshot};

/// An atomic proposition `var = value`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FactPair {
    pub var: usize,
    pub value: usize,
}

impl FactPair {
    pub const fn new(var: usize, value: usize) -> Self {
        Self { var, value }
    }
}

impl fmt::Display for FactPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.var, self.value)
    }
}

impl From<(usize, usize)> for FactPair {
    fn from((var, value): (usize, usize)) -> Self {
        Self { var, value }
    }
}

/// A state variable with a finite domain `0..domain_size`.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Variable {
    pub name: String,
    pub domain_size: usize,
    pub fact_names: Vec<String>,
    /// `-1` for state variables, the axiom layer for derived variables.
    pub axiom_layer: i32,
    pub axiom_default_value: usize,
}

impl Variable {
    /// Creates a state variable with generated fact names.
    pub fn new(name: impl Into<String>, domain_size: usize) -> Self {
        let name = name.into();
        let fact_names = (0..domain_size)
            .map(|value| format!("{name}={value}"))
            .collect();
        Self {
            name,
            domain_size,
            fact_names,
            axiom_layer: -1,
            axiom_default_value: 0,
        }
    }

    /// Creates a state variable with explicit fact names.
    pub fn with_fact_names<I, S>(name: impl Into<String>, fact_names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let fact_names: Vec<String> = fact_names.into_iter().map(Into::into).collect();
        Self {
            name: name.into(),
            domain_size: fact_names.len(),
            fact_names,
            axiom_layer: -1,
            axiom_default_value: 0,
        }
    }

    /// Returns true if the variable is computed by axioms.
    #[inline]
    pub fn is_derived(&self) -> bool {
        self.axiom_layer >= 0
    }
}

/// An effect `fact`, firing only when all `conditions` hold.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Effect {
    pub fact: FactPair,
    pub conditions: SmallVec<[FactPair; 2]>,
}

impl Effect {
    /// Creates an unconditional effect.
    pub fn new(var: usize, value: usize) -> Self {
        Self {
            fact: FactPair::new(var, value),
            conditions: SmallVec::new(),
        }
    }

    /// Creates a conditional effect.
    pub fn conditional(var: usize, value: usize, conditions: &[FactPair]) -> Self {
        Self {
            fact: FactPair::new(var, value),
            conditions: SmallVec::from_slice(conditions),
        }
    }

    #[inline]
    pub fn is_conditional(&self) -> bool {
        !self.conditions.is_empty()
    }
}

/// An operator (or axiom).
///
/// Preconditions form a consistent partial assignment: no variable occurs
/// twice. Effects never assign two values to one variable.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Operator {
    pub preconditions: Vec<FactPair>,
    pub effects: Vec<Effect>,
    pub cost: i32,
    pub name: String,
    pub is_axiom: bool,
}

impl Operator {
    /// Creates an operator from unconditional effects.
    pub fn new(
        name: impl Into<String>,
        preconditions: Vec<FactPair>,
        effects: Vec<FactPair>,
        cost: i32,
    ) -> Self {
        Self {
            preconditions,
            effects: effects
                .into_iter()
                .map(|fact| Effect::new(fact.var, fact.value))
                .collect(),
            cost,
            name: name.into(),
            is_axiom: false,
        }
    }

    /// Returns the value required for `var`, if any.
    pub fn precondition_on(&self, var: usize) -> Option<usize> {
        self.preconditions
            .iter()
            .find(|fact| fact.var == var)
            .map(|fact| fact.value)
    }

    /// Returns the value written to `var`, if any.
    pub fn effect_on(&self, var: usize) -> Option<usize> {
        self.effects
            .iter()
            .find(|effect| effect.fact.var == var)
            .map(|effect| effect.fact.value)
    }

    /// Iterates over the effect facts, ignoring conditions.
    pub fn effect_facts(&self) -> impl Iterator<Item = FactPair> + '_ {
        self.effects.iter().map(|effect| effect.fact)
    }

    /// An inert operator has neither preconditions nor effects.
    #[inline]
    pub fn is_inert(&self) -> bool {
        self.preconditions.is_empty() && self.effects.is_empty()
    }

    pub fn has_conditional_effects(&self) -> bool {
        self.effects.iter().any(Effect::is_conditional)
    }

    /// Returns true if any precondition, effect or effect condition mentions `var`.
    pub fn touches(&self, var: usize) -> bool {
        self.preconditions.iter().any(|fact| fact.var == var)
            || self.effects.iter().any(|effect| {
                effect.fact.var == var || effect.conditions.iter().any(|c| c.var == var)
            })
    }

    /// Sorted, deduplicated ids of every variable the operator mentions.
    pub fn variables(&self) -> Vec<usize> {
        let mut vars: Vec<usize> = self
            .preconditions
            .iter()
            .map(|fact| fact.var)
            .chain(self.effects.iter().flat_map(|effect| {
                std::iter::once(effect.fact.var).chain(effect.conditions.iter().map(|c| c.var))
            }))
            .collect();
        vars.sort_unstable();
        vars.dedup();
        vars
    }

    /// Removes every precondition and effect, keeping name and cost.
    pub fn clear(&mut self) {
        self.preconditions.clear();
        self.effects.clear();
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [pre:", self.name)?;
        for fact in &self.preconditions {
            write!(f, " {fact}")?;
        }
        write!(f, " | eff:")?;
        for effect in &self.effects {
            write!(f, " {}", effect.fact)?;
            if effect.is_conditional() {
                write!(f, " if")?;
                for condition in &effect.conditions {
                    write!(f, " {condition}")?;
                }
            }
        }
        write!(f, "]")
    }
}
