use planforge_config::CompositionConfig;
use planforge_core::{Effect, FactPair, Operator, TaskBuilder};
use planforge_test::shipping;

use super::chain::Signature;
use super::*;
use crate::transform::compose_snapshot;

fn default_config() -> CompositionConfig {
    CompositionConfig::default()
}

#[test]
fn test_load_then_ship_is_composed() {
    let task = shipping::task();
    let mut compositor = Compositor::new(&task, &default_config());
    let composition = compositor.composite();

    assert_eq!(composition.len(), 1);
    let id = composition.composite_id(0);
    assert_eq!(id, task.num_operators());
    assert_eq!(
        composition.decomposition(id),
        Some(&[shipping::LOAD, shipping::SHIP][..])
    );

    let composite = &composition.composites()[0];
    assert_eq!(composite.preconditions, vec![FactPair::new(shipping::DOCK, 0)]);
    assert_eq!(
        composite.effect_facts().collect::<Vec<_>>(),
        vec![FactPair::new(shipping::BOX, 2), FactPair::new(shipping::TRUCK, 2)]
    );
    assert_eq!(composite.cost, 3);
    assert_eq!(composite.name, "[load > ship]");
    assert_eq!(
        composition.cleared().iter().copied().collect::<Vec<_>>(),
        vec![shipping::SHIP]
    );
}

#[test]
fn test_statistics_describe_the_run() {
    let task = shipping::task();
    let mut compositor = Compositor::new(&task, &default_config());
    compositor.composite();

    let stats = compositor.statistics();
    assert_eq!(stats.targets, 1);
    assert_eq!(stats.average_producers, 1.0);
    assert_eq!(stats.average_consumers, 1.0);
    assert_eq!(stats.composites, 1);
    assert_eq!(stats.average_chain_length, 2.0);
    assert_eq!(stats.cleared, 1);
}

#[test]
fn test_interfering_operator_rejects_target() {
    let task = shipping::interfering_task();
    let targets = CompositionTarget::collect(
        &task,
        [FactPair::new(shipping::BOX, 1), FactPair::new(shipping::TRUCK, 1)],
    )
    .unwrap();
    assert!(!targets.outside_operators_commute(&task));
    assert!(targets.outside_producers_disjoint(&task));

    let composition = Compositor::new(&task, &default_config()).composite();
    assert!(composition.is_empty());
}

#[test]
fn test_partial_producer_rejects_target() {
    // "half" produces box=1 without truck=1
    let task = TaskBuilder::new()
        .variable("box", 3)
        .variable("truck", 3)
        .operator("load", &[], &[(0, 1), (1, 1)], 1)
        .operator("ship", &[(0, 1), (1, 1)], &[(0, 2), (1, 2)], 1)
        .operator("half", &[(1, 1)], &[(0, 1)], 1)
        .build()
        .unwrap();
    let target =
        CompositionTarget::collect(&task, [FactPair::new(0, 1), FactPair::new(1, 1)]).unwrap();
    assert!(!target.outside_producers_disjoint(&task));
}

#[test]
fn test_candidates_skip_initial_and_goal_pairs() {
    let task = shipping::task();
    let candidates = candidate_pairs(&task);
    // box x truck (9) + box x dock (6) + truck x dock (6), minus the initial pairs
    assert_eq!(candidates.len(), 21 - 3);
    assert!(!candidates.contains(&[FactPair::new(0, 0), FactPair::new(1, 0)]));

    let both_goals = TaskBuilder::new()
        .variable("a", 2)
        .variable("b", 2)
        .goal(0, 1)
        .goal(1, 1)
        .build()
        .unwrap();
    let candidates = candidate_pairs(&both_goals);
    assert_eq!(candidates.len(), 2);
    assert!(!candidates.contains(&[FactPair::new(0, 1), FactPair::new(1, 1)]));
}

#[test]
fn test_executable_chains() {
    let task = shipping::task();
    assert!(is_executable(&task, &[shipping::LOAD, shipping::SHIP]));
    assert!(!is_executable(&task, &[shipping::SHIP, shipping::SHIP]));
    assert!(!is_executable(&task, &[shipping::LOAD, shipping::SHIP, shipping::SHIP]));
}

#[test]
fn test_composite_reaches_declared_effects() {
    let task = shipping::decoupling_task();
    let composition = Compositor::new(&task, &default_config()).composite();
    assert!(!composition.is_empty());

    for (i, composite) in composition.composites().iter().enumerate() {
        let chain = composition.decomposition(composition.composite_id(i)).unwrap();
        let mut state = vec![0; task.num_variables()];
        for pre in &composite.preconditions {
            state[pre.var] = pre.value;
        }
        let mut expected = state.clone();
        for fact in composite.effect_facts() {
            expected[fact.var] = fact.value;
        }
        for &index in chain {
            let op = task.operator(index);
            assert!(task.is_applicable(&state, op));
            task.apply(&mut state, op);
        }
        assert_eq!(state, expected);
    }
}

#[test]
fn test_harsh_mode_requires_decoupling() {
    let harsh = CompositionConfig::default().harsh();

    let task = shipping::task();
    let mut compositor = Compositor::new(&task, &harsh);
    assert!(compositor.composite().is_empty());
    assert_eq!(compositor.statistics().targets, 0);

    let task = shipping::decoupling_task();
    let composition = Compositor::new(&task, &harsh).composite();
    assert_eq!(composition.len(), 1);
    let composite = &composition.composites()[0];
    assert!(!changes(composite, shipping::HAND));
    assert!(changes(composite, shipping::SHELF));
}

#[test]
fn test_chain_length_is_bounded() {
    // "cycle" keeps c true, so chains grow until the bound
    let task = TaskBuilder::new()
        .variable("x", 2)
        .variable("y", 2)
        .variable("count", 4)
        .operator("start", &[], &[(0, 1), (1, 1)], 1)
        .operator("tick-0", &[(0, 1), (1, 1), (2, 0)], &[(2, 1)], 1)
        .operator("tick-1", &[(0, 1), (1, 1), (2, 1)], &[(2, 2)], 1)
        .operator("tick-2", &[(0, 1), (1, 1), (2, 2)], &[(2, 3)], 1)
        .build()
        .unwrap();

    let composition =
        Compositor::new(&task, &CompositionConfig::with_max_chain_length(3)).composite();
    assert!(!composition.is_empty());
    assert!(composition
        .decomposition_map()
        .values()
        .all(|chain| chain.len() <= 3));
    assert!(composition
        .decomposition_map()
        .values()
        .any(|chain| chain.len() == 3));
}

#[test]
fn test_conditional_effects_are_not_composed() {
    let task = TaskBuilder::new()
        .variable("x", 3)
        .variable("y", 3)
        .variable("z", 2)
        .with_operator(Operator {
            preconditions: vec![],
            effects: vec![
                Effect::new(0, 1),
                Effect::new(1, 1),
                Effect::conditional(2, 1, &[FactPair::new(2, 0)]),
            ],
            cost: 1,
            name: "produce".into(),
            is_axiom: false,
        })
        .operator("consume", &[(0, 1), (1, 1)], &[(0, 2), (1, 2)], 1)
        .build()
        .unwrap();
    let composition = Compositor::new(&task, &default_config()).composite();
    assert!(composition.is_empty());
}

#[test]
fn test_single_variable_task_has_no_candidates() {
    let task = TaskBuilder::new()
        .variable("only", 3)
        .operator("step", &[(0, 0)], &[(0, 1)], 1)
        .build()
        .unwrap();
    let composition = Compositor::new(&task, &default_config()).composite();
    assert!(composition.is_empty());
    assert_eq!(composition.base_operators(), 1);
}

#[test]
fn test_cut_off_chains_keep_their_consumers() {
    let task = shipping::conveyor_task();
    let composition = Compositor::new(&task, &default_config()).composite();

    assert_eq!(composition.len(), 9);
    assert!(composition
        .decomposition_map()
        .values()
        .all(|chain| chain.len() <= 4));
    // advance-4 can still follow the longest chains, so no advance is cleared
    assert!(composition.cleared().is_empty());
}

#[test]
fn test_complete_chains_clear_their_consumers() {
    let task = shipping::conveyor_task();
    let config = CompositionConfig::with_max_chain_length(6);
    let composition = Compositor::new(&task, &config).composite();

    let mut full = vec![shipping::LIFT];
    full.extend(shipping::ADVANCE);
    assert!(composition.decomposition_map().values().any(|chain| *chain == full));
    assert_eq!(
        composition.cleared().iter().copied().collect::<Vec<_>>(),
        shipping::ADVANCE.to_vec()
    );
}

#[test]
fn test_repeated_composition_emits_only_new_operators() {
    let mut task = shipping::conveyor_task();
    let mut rounds = 0;
    loop {
        let composition = Compositor::new(&task, &default_config()).composite();
        if composition.is_empty() {
            break;
        }
        let known: Vec<Signature> = task.operators().iter().map(Signature::of).collect();
        for composite in composition.composites() {
            assert!(!known.contains(&Signature::of(composite)));
        }
        task = compose_snapshot(&task, &composition).unwrap();
        rounds += 1;
        assert!(rounds <= 3, "composition did not saturate");
    }
    assert_eq!(rounds, 2);
}
