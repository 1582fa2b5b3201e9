use planforge_core::{Effect, FactPair, Operator, TaskBuilder};
use planforge_test::{crank, shipping};

use super::*;

#[test]
fn test_crank_is_the_only_safe_variable() {
    let task = crank::task();
    let abstractor = Abstractor::new(&task);
    assert_eq!(abstractor.find_safe_variables(), vec![crank::CRANK]);

    let cart = abstractor.verdict(crank::CART);
    assert!(!cart.required_connected);
    let parcel = abstractor.verdict(crank::PARCEL);
    assert!(!parcel.goal_reachable);
}

#[test]
fn test_free_transitions_and_external_marks() {
    let task = crank::task();
    let abstractor = Abstractor::new(&task);

    let crank_graph = abstractor.graph(crank::CRANK);
    assert_eq!(
        crank_graph.edges(),
        vec![
            (0, 1, crank::TURN_0_1),
            (1, 2, crank::TURN_1_2),
            (2, 0, crank::TURN_2_0)
        ]
    );
    assert_eq!(crank_graph.externally_required_values(), vec![2]);
    assert_eq!(crank_graph.externally_caused_values(), vec![0]);

    let cart_graph = abstractor.graph(crank::CART);
    assert_eq!(cart_graph.edge_count(), 0);
    assert_eq!(cart_graph.externally_required_values(), vec![0, 1]);
    assert_eq!(cart_graph.externally_caused_values(), vec![0, 1]);
}

#[test]
fn test_goal_on_safe_variable_must_be_reachable() {
    let task = crank::task_with_crank_goal(1);
    let abstractor = Abstractor::new(&task);
    assert!(abstractor.verdict(crank::CRANK).is_safe());

    let task = TaskBuilder::new()
        .variable("valve", 3)
        .variable("flow", 2)
        .operator("open", &[(0, 0)], &[(0, 1)], 1)
        .operator("pump", &[(0, 1)], &[(1, 1)], 1)
        .goal(0, 2)
        .build()
        .unwrap();
    let verdict = Abstractor::new(&task).verdict(0);
    assert!(verdict.required_connected);
    assert!(verdict.caused_reach_required);
    assert!(!verdict.goal_reachable);
}

#[test]
fn test_goal_without_required_values_uses_caused_values() {
    let task = TaskBuilder::new()
        .variable("light", 2)
        .operator("switch", &[(0, 0)], &[(0, 1)], 1)
        .goal(0, 1)
        .build()
        .unwrap();
    let abstractor = Abstractor::new(&task);
    assert_eq!(abstractor.find_safe_variables(), vec![0]);
}

#[test]
fn test_operator_without_precondition_reaches_effect_from_everywhere() {
    let task = TaskBuilder::new()
        .variable("dial", 3)
        .operator("zero", &[], &[(0, 0)], 1)
        .build()
        .unwrap();
    let abstractor = Abstractor::new(&task);
    assert_eq!(abstractor.graph(0).edges(), vec![(1, 0, 0), (2, 0, 0)]);
}

#[test]
fn test_required_values_must_be_connected() {
    // a one-way switch demanded in both positions
    let task = TaskBuilder::new()
        .variable("switch", 2)
        .variable("lamp", 3)
        .operator("flip", &[(0, 0)], &[(0, 1)], 1)
        .operator("dim", &[(0, 0)], &[(1, 1)], 1)
        .operator("bright", &[(0, 1)], &[(1, 2)], 1)
        .build()
        .unwrap();
    let verdict = Abstractor::new(&task).verdict(0);
    assert!(!verdict.required_connected);
    assert!(!verdict.is_safe());
}

#[test]
fn test_caused_value_must_reach_required_values() {
    // the reset effect leaves the switch where nothing free leads back
    let task = TaskBuilder::new()
        .variable("switch", 3)
        .variable("lamp", 2)
        .operator("flip", &[(0, 0)], &[(0, 1)], 1)
        .operator("lit", &[(0, 1)], &[(1, 1)], 1)
        .operator("reset", &[(1, 1)], &[(0, 2), (1, 0)], 1)
        .build()
        .unwrap();
    let verdict = Abstractor::new(&task).verdict(0);
    assert!(verdict.required_connected);
    assert!(!verdict.caused_reach_required);
}

#[test]
fn test_untouched_variable_is_trivially_safe() {
    let task = TaskBuilder::new()
        .variable("idle", 4)
        .variable("busy", 2)
        .operator("work", &[(1, 0)], &[(1, 1)], 1)
        .build()
        .unwrap();
    assert_eq!(Abstractor::new(&task).find_safe_variables(), vec![0, 1]);
}

#[test]
fn test_axiom_and_condition_variables_are_pinned() {
    let task = TaskBuilder::new()
        .variable("a", 2)
        .variable("b", 2)
        .variable("c", 2)
        .with_operator(Operator {
            preconditions: vec![],
            effects: vec![Effect::conditional(0, 1, &[FactPair::new(1, 1)])],
            cost: 1,
            name: "maybe".into(),
            is_axiom: false,
        })
        .axiom("derive", &[(0, 1)], (2, 1))
        .build()
        .unwrap();
    let abstractor = Abstractor::new(&task);
    assert!(abstractor.verdict(1).pinned);
    assert!(abstractor.verdict(0).pinned);
    assert!(abstractor.verdict(2).pinned);
    assert!(abstractor.find_safe_variables().is_empty());
}

#[test]
fn test_no_safe_variables_in_tightly_coupled_task() {
    let task = shipping::task();
    let abstractor = Abstractor::new(&task);
    assert_eq!(abstractor.find_safe_variables(), vec![shipping::DOCK]);

    let reduced = crate::transform::abstract_snapshot(&task, &[shipping::DOCK]).unwrap();
    assert!(Abstractor::new(&reduced).find_safe_variables().is_empty());
}
