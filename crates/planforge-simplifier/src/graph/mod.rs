//! Free transition graphs.
//!
//! A free transition graph is the part of a variable's domain transition
//! graph whose edges are enabled by operators that mention no other
//! variable. It also records which values the rest of the task demands
//! (externally required) and which values the rest of the task can leave
//! behind (externally caused).
//!
//! The abstractor proves safety on these graphs; the refiner later reads
//! repair paths out of them.

#[cfg(test)]
mod tests;

use std::collections::VecDeque;
use std::fmt;

use planforge_core::TaskSnapshot;
use smallvec::SmallVec;

/// Outgoing edges of one value.
type Edges = SmallVec<[Transition; 4]>;

/// A labeled edge `source -> destination`, enabled by `operator`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Transition {
    pub destination: usize,
    pub operator: usize,
}

/// Free transitions and external demands of one variable.
///
/// Values are `0..num_values`, edges are directed and may form cycles or
/// self-loops. Parallel edges with different labels are kept.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FreeTransitionGraph {
    variable: usize,
    transitions: Vec<Edges>,
    externally_required: Vec<bool>,
    externally_caused: Vec<bool>,
}

impl FreeTransitionGraph {
    /// Creates an edgeless graph over `num_values` values.
    pub fn new(variable: usize, num_values: usize) -> Self {
        Self {
            variable,
            transitions: vec![Edges::new(); num_values],
            externally_required: vec![false; num_values],
            externally_caused: vec![false; num_values],
        }
    }

    #[inline]
    pub fn variable(&self) -> usize {
        self.variable
    }

    #[inline]
    pub fn num_values(&self) -> usize {
        self.transitions.len()
    }

    /// Adds the edge `from -> to` labeled with `operator`.
    ///
    /// # Panics
    ///
    /// Panics if either value is outside the domain.
    pub fn add_transition(&mut self, from: usize, to: usize, operator: usize) {
        debug_assert!(to < self.num_values(), "destination {to} out of range");
        self.transitions[from].push(Transition {
            destination: to,
            operator,
        });
    }

    /// Outgoing edges of `value`.
    pub fn transitions_from(&self, value: usize) -> &[Transition] {
        &self.transitions[value]
    }

    pub fn edge_count(&self) -> usize {
        self.transitions.iter().map(|edges| edges.len()).sum()
    }

    /// All edges as `(source, destination, operator)`, sorted.
    pub fn edges(&self) -> Vec<(usize, usize, usize)> {
        let mut edges: Vec<(usize, usize, usize)> = self
            .transitions
            .iter()
            .enumerate()
            .flat_map(|(source, list)| {
                list.iter()
                    .map(move |t| (source, t.destination, t.operator))
            })
            .collect();
        edges.sort_unstable();
        edges
    }

    /// Marks `value` as demanded by another variable's operator.
    pub fn mark_externally_required(&mut self, value: usize) {
        self.externally_required[value] = true;
    }

    /// Marks `value` as producible by another variable's operator.
    pub fn mark_externally_caused(&mut self, value: usize) {
        self.externally_caused[value] = true;
    }

    pub fn is_externally_required(&self, value: usize) -> bool {
        self.externally_required[value]
    }

    pub fn is_externally_caused(&self, value: usize) -> bool {
        self.externally_caused[value]
    }

    /// Externally required values in ascending order.
    pub fn externally_required_values(&self) -> Vec<usize> {
        flagged(&self.externally_required)
    }

    /// Externally caused values in ascending order.
    pub fn externally_caused_values(&self) -> Vec<usize> {
        flagged(&self.externally_caused)
    }

    /// Values reachable from `source`, `source` included.
    pub fn reachable_from(&self, source: usize) -> Vec<bool> {
        let mut visited = vec![false; self.num_values()];
        let mut stack = vec![source];
        visited[source] = true;
        while let Some(value) = stack.pop() {
            for transition in &self.transitions[value] {
                if !visited[transition.destination] {
                    visited[transition.destination] = true;
                    stack.push(transition.destination);
                }
            }
        }
        visited
    }

    /// Returns true if every value in `targets` is reachable from `source`.
    ///
    /// Vacuously true for empty `targets`.
    pub fn is_reachable(&self, source: usize, targets: &[usize]) -> bool {
        if targets.is_empty() {
            return true;
        }
        let visited = self.reachable_from(source);
        targets.iter().all(|&target| visited[target])
    }

    /// Returns true if the `targets` can all reach each other.
    ///
    /// Paths may pass through values outside `targets`. The first target acts
    /// as anchor: it must reach every target in this graph and in its
    /// transpose.
    pub fn is_strongly_connected(&self, targets: &[usize]) -> bool {
        let Some(&anchor) = targets.first() else {
            return true;
        };
        self.is_reachable(anchor, targets) && self.transpose().is_reachable(anchor, targets)
    }

    /// Returns the graph with every edge reversed, labels preserved.
    ///
    /// External marks are copied unchanged.
    pub fn transpose(&self) -> Self {
        let mut inverted = Self {
            variable: self.variable,
            transitions: vec![Edges::new(); self.num_values()],
            externally_required: self.externally_required.clone(),
            externally_caused: self.externally_caused.clone(),
        };
        for (source, list) in self.transitions.iter().enumerate() {
            for transition in list {
                inverted.add_transition(transition.destination, source, transition.operator);
            }
        }
        inverted
    }

    /// Operator labels along a shortest path from `source` to `destination`.
    ///
    /// Returned in execution order. Empty if `source == destination` or if
    /// `destination` is unreachable.
    pub fn path(&self, source: usize, destination: usize) -> Vec<usize> {
        if source == destination {
            return Vec::new();
        }
        // (predecessor value, operator) per discovered value
        let mut parent: Vec<Option<(usize, usize)>> = vec![None; self.num_values()];
        let mut visited = vec![false; self.num_values()];
        let mut queue = VecDeque::new();
        visited[source] = true;
        queue.push_back(source);

        while let Some(value) = queue.pop_front() {
            for transition in &self.transitions[value] {
                if visited[transition.destination] {
                    continue;
                }
                visited[transition.destination] = true;
                parent[transition.destination] = Some((value, transition.operator));
                if transition.destination == destination {
                    return self.unwind(&parent, source, destination);
                }
                queue.push_back(transition.destination);
            }
        }
        Vec::new()
    }

    fn unwind(
        &self,
        parent: &[Option<(usize, usize)>],
        source: usize,
        destination: usize,
    ) -> Vec<usize> {
        let mut operators = Vec::new();
        let mut value = destination;
        while value != source {
            let Some((previous, operator)) = parent[value] else {
                break;
            };
            operators.push(operator);
            value = previous;
        }
        operators.reverse();
        operators
    }

    /// Renders the graph with variable and operator names from `task`.
    pub fn display<'a>(&'a self, task: &'a TaskSnapshot) -> NamedGraph<'a> {
        NamedGraph { graph: self, task }
    }
}

fn flagged(flags: &[bool]) -> Vec<usize> {
    flags
        .iter()
        .enumerate()
        .filter_map(|(value, &set)| set.then_some(value))
        .collect()
}

impl fmt::Display for FreeTransitionGraph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "free transitions of variable {}:", self.variable)?;
        for (value, list) in self.transitions.iter().enumerate() {
            write!(f, "  {value} ->")?;
            for transition in list {
                write!(f, " {}", transition.destination)?;
            }
            let mut marks = Vec::new();
            if self.externally_required[value] {
                marks.push("required");
            }
            if self.externally_caused[value] {
                marks.push("caused");
            }
            if !marks.is_empty() {
                write!(f, "  ({})", marks.join(", "))?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

/// [`FreeTransitionGraph`] rendered with names from a task.
pub struct NamedGraph<'a> {
    graph: &'a FreeTransitionGraph,
    task: &'a TaskSnapshot,
}

impl fmt::Display for NamedGraph<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let var = self.graph.variable;
        let variable = self.task.variable(var);
        writeln!(f, "free transitions of {}:", variable.name)?;
        for value in 0..self.graph.num_values() {
            let name = variable
                .fact_names
                .get(value)
                .map(String::as_str)
                .unwrap_or("?");
            write!(f, "  {name}")?;
            if self.graph.is_externally_required(value) {
                write!(f, " [required]")?;
            }
            if self.graph.is_externally_caused(value) {
                write!(f, " [caused]")?;
            }
            writeln!(f)?;
            for transition in self.graph.transitions_from(value) {
                let target = variable
                    .fact_names
                    .get(transition.destination)
                    .map(String::as_str)
                    .unwrap_or("?");
                let label = self
                    .task
                    .operators()
                    .get(transition.operator)
                    .map(|op| op.name.as_str())
                    .unwrap_or("?");
                writeln!(f, "    -> {target} via {label}")?;
            }
        }
        Ok(())
    }
}
