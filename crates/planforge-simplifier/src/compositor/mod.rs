//! Operator composition.
//!
//! The compositor looks for fact pairs `c` that a set of producers `A`
//! establishes and a set of consumers `B` requires, with nothing else in the
//! task able to interfere in between. For such targets it fuses each
//! producer with the consumers that can follow it into composite operators,
//! up to a bounded chain length.
//!
//! Composite ids continue the operator numbering of the task they were
//! computed for. The [`Composition`] maps every composite id back to its
//! chain so refinement can expand it.

mod chain;
mod targets;

#[cfg(test)]
mod tests;

use std::collections::{BTreeMap, BTreeSet, HashSet, VecDeque};

use planforge_config::CompositionConfig;
use planforge_core::{FactPair, Operator, TaskSnapshot};
use tracing::debug;

use chain::Signature;

pub use chain::{changes, compose, is_executable};
pub use targets::{candidate_pairs, pairs_of, CompositionTarget};

/// Numbers reported for one composition run.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CompositionStatistics {
    /// Accepted composition targets.
    pub targets: usize,
    /// Mean `|A|` over accepted targets.
    pub average_producers: f64,
    /// Mean `|B|` over accepted targets.
    pub average_consumers: f64,
    /// Generated composite operators.
    pub composites: usize,
    /// Mean number of original operators per composite.
    pub average_chain_length: f64,
    /// Operators cleared because composites subsume them.
    pub cleared: usize,
}

/// Composite operators and their decomposition.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Composition {
    base_operators: usize,
    composites: Vec<Operator>,
    chains: Vec<Vec<usize>>,
    cleared: BTreeSet<usize>,
}

impl Composition {
    /// An empty composition for a task with `base_operators` operators.
    pub fn empty(base_operators: usize) -> Self {
        Self {
            base_operators,
            ..Self::default()
        }
    }

    /// Number of operators of the task the composition was computed for.
    pub fn base_operators(&self) -> usize {
        self.base_operators
    }

    pub fn len(&self) -> usize {
        self.composites.len()
    }

    pub fn is_empty(&self) -> bool {
        self.composites.is_empty()
    }

    pub fn composites(&self) -> &[Operator] {
        &self.composites
    }

    /// Operator id of the `i`-th composite in the composed task.
    pub fn composite_id(&self, i: usize) -> usize {
        self.base_operators + i
    }

    pub fn is_composite(&self, index: usize) -> bool {
        index >= self.base_operators && index < self.base_operators + self.composites.len()
    }

    /// The chain a composite id stands for.
    pub fn decomposition(&self, index: usize) -> Option<&[usize]> {
        index
            .checked_sub(self.base_operators)
            .and_then(|i| self.chains.get(i))
            .map(Vec::as_slice)
    }

    /// Composite id to chain, for every composite.
    pub fn decomposition_map(&self) -> BTreeMap<usize, Vec<usize>> {
        self.chains
            .iter()
            .enumerate()
            .map(|(i, chain)| (self.composite_id(i), chain.clone()))
            .collect()
    }

    /// Original operators subsumed by composites.
    pub fn cleared(&self) -> &BTreeSet<usize> {
        &self.cleared
    }

    pub fn average_chain_length(&self) -> f64 {
        if self.chains.is_empty() {
            return 0.0;
        }
        let total: usize = self.chains.iter().map(Vec::len).sum();
        total as f64 / self.chains.len() as f64
    }

    fn push(&mut self, chain: Vec<usize>, op: Operator) {
        self.chains.push(chain);
        self.composites.push(op);
    }
}

/// Finds composition targets in a task and generates composite operators.
///
/// # Examples
///
/// ```
/// use planforge_config::CompositionConfig;
/// use planforge_core::TaskBuilder;
/// use planforge_simplifier::Compositor;
///
/// let task = TaskBuilder::new()
///     .variable("x", 3)
///     .variable("y", 3)
///     .operator("produce", &[], &[(0, 1), (1, 1)], 1)
///     .operator("consume", &[(0, 1), (1, 1)], &[(0, 2), (1, 2)], 1)
///     .build()
///     .unwrap();
///
/// let mut compositor = Compositor::new(&task, &CompositionConfig::default());
/// let composition = compositor.composite();
/// assert_eq!(composition.decomposition(2), Some(&[0, 1][..]));
/// ```
pub struct Compositor<'a> {
    task: &'a TaskSnapshot,
    config: CompositionConfig,
    statistics: CompositionStatistics,
}

impl<'a> Compositor<'a> {
    pub fn new(task: &'a TaskSnapshot, config: &CompositionConfig) -> Self {
        Self {
            task,
            config: config.clone(),
            statistics: CompositionStatistics::default(),
        }
    }

    /// Statistics of the last [`composite`](Self::composite) run.
    pub fn statistics(&self) -> &CompositionStatistics {
        &self.statistics
    }

    /// Accepted targets among `candidates`.
    pub fn targets(&self, candidates: &[[FactPair; 2]]) -> Vec<CompositionTarget> {
        candidates
            .iter()
            .filter_map(|&facts| CompositionTarget::collect(self.task, facts))
            .filter(|target| {
                target.outside_operators_commute(self.task)
                    && target.outside_producers_disjoint(self.task)
            })
            .collect()
    }

    /// Generates composite operators for the task.
    ///
    /// In harsh mode only the first variable pair whose composites decouple
    /// the pair contributes; otherwise every accepted target does.
    pub fn composite(&mut self) -> Composition {
        self.statistics = CompositionStatistics::default();
        let base = self.task.num_operators();
        if self.task.num_variables() < 2 {
            return Composition::empty(base);
        }

        let (targets, composition) = if self.config.require_causal_decoupling {
            self.decoupling_composition()
        } else {
            let targets = self.targets(&candidate_pairs(self.task));
            let composition = self.generate(&targets);
            (targets, composition)
        };

        self.record(&targets, &composition);
        composition
    }

    fn decoupling_composition(&self) -> (Vec<CompositionTarget>, Composition) {
        let n = self.task.num_variables();
        for i in 0..n {
            for j in (i + 1)..n {
                let targets = self.targets(&pairs_of(self.task, i, j));
                if targets.is_empty() {
                    continue;
                }
                let composition = self.generate(&targets);
                let decoupled = composition
                    .composites()
                    .iter()
                    .all(|op| !(changes(op, i) && changes(op, j)));
                if !composition.is_empty() && decoupled {
                    debug!(event = "decoupled_pair", first = i, second = j);
                    return (targets, composition);
                }
            }
        }
        (Vec::new(), Composition::empty(self.task.num_operators()))
    }

    /// Expands every producer of every target with consumers, breadth first.
    ///
    /// A consumer is cleared only if it occurs in a composite and no chain
    /// of its target was cut off by the length bound while another consumer
    /// could still follow. Composites duplicating an operator of the task
    /// are not emitted but are still expanded.
    fn generate(&self, targets: &[CompositionTarget]) -> Composition {
        let mut composition = Composition::empty(self.task.num_operators());
        let known: HashSet<Signature> = self
            .task
            .operators()
            .iter()
            .filter(|op| !op.is_inert())
            .map(Signature::of)
            .collect();
        let mut expanded: HashSet<Signature> = HashSet::new();
        let mut used: BTreeSet<usize> = BTreeSet::new();
        let mut kept: BTreeSet<usize> = BTreeSet::new();
        let max_len = self.config.max_chain_length;

        for target in targets {
            for &producer in &target.producers {
                let root = Signature::of(self.task.operator(producer));
                let mut worklist = VecDeque::from([(vec![producer], root)]);

                while let Some((chain, parent)) = worklist.pop_front() {
                    if chain.len() >= max_len {
                        if self.can_continue(target, &chain) {
                            debug!(
                                event = "consumers_kept",
                                producer,
                                consumers = target.consumers.len(),
                                max_chain_length = max_len,
                            );
                            kept.extend(target.consumers.iter().copied());
                        }
                        continue;
                    }
                    for &consumer in &target.consumers {
                        let mut extended = chain.clone();
                        extended.push(consumer);
                        if !is_executable(self.task, &extended) {
                            continue;
                        }
                        let op = compose(self.task, &extended);
                        let signature = Signature::of(&op);
                        if signature == parent || !expanded.insert(signature.clone()) {
                            continue;
                        }
                        if !known.contains(&signature) {
                            used.insert(consumer);
                            composition.push(extended.clone(), op);
                        }
                        worklist.push_back((extended, signature));
                    }
                }
            }
        }
        composition.cleared = used.difference(&kept).copied().collect();
        composition
    }

    /// Returns true if some consumer of `target` can extend `chain`.
    fn can_continue(&self, target: &CompositionTarget, chain: &[usize]) -> bool {
        target.consumers.iter().any(|&consumer| {
            let mut extended = chain.to_vec();
            extended.push(consumer);
            is_executable(self.task, &extended)
        })
    }

    fn record(&mut self, targets: &[CompositionTarget], composition: &Composition) {
        let mut stats = CompositionStatistics {
            targets: targets.len(),
            composites: composition.len(),
            average_chain_length: composition.average_chain_length(),
            cleared: composition.cleared().len(),
            ..CompositionStatistics::default()
        };
        if !targets.is_empty() {
            let count = targets.len() as f64;
            stats.average_producers =
                targets.iter().map(|t| t.producers.len()).sum::<usize>() as f64 / count;
            stats.average_consumers =
                targets.iter().map(|t| t.consumers.len()).sum::<usize>() as f64 / count;
        }
        debug!(
            event = "composition_targets",
            targets = stats.targets,
            average_producers = stats.average_producers,
            average_consumers = stats.average_consumers,
            composites = stats.composites,
            average_chain_length = stats.average_chain_length,
            cleared = stats.cleared,
        );
        self.statistics = stats;
    }
}
