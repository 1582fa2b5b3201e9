use planforge_config::CompositionConfig;
use planforge_core::{FactPair, PlanforgeError, TaskBuilder};
use planforge_test::{crank, shipping};

use super::*;
use crate::compositor::Compositor;

#[test]
fn test_abstraction_removes_every_reference() {
    let task = crank::task();
    let reduced = abstract_snapshot(&task, &[crank::CRANK]).unwrap();

    assert_eq!(reduced.num_variables(), 2);
    assert_eq!(reduced.variable_name(0), "cart");
    assert_eq!(reduced.variable_name(1), "parcel");
    assert_eq!(reduced.num_operators(), task.num_operators());

    for index in [crank::TURN_0_1, crank::TURN_1_2, crank::TURN_2_0] {
        assert!(reduced.operator(index).is_inert());
        assert_eq!(reduced.operator(index).name, task.operator(index).name);
    }
    let roll = reduced.operator(crank::ROLL);
    assert_eq!(roll.preconditions, vec![FactPair::new(0, 0)]);
    assert_eq!(roll.effect_on(0), Some(1));

    let deliver = reduced.operator(crank::DELIVER);
    assert_eq!(deliver.preconditions, vec![FactPair::new(0, 1)]);
    assert_eq!(deliver.effect_on(1), Some(1));

    assert_eq!(reduced.goals(), &[FactPair::new(1, 1)]);
    assert_eq!(reduced.initial_state(), &[0, 0]);
}

#[test]
fn test_abstraction_drops_goals_on_removed_variables() {
    let task = crank::task_with_crank_goal(1);
    let reduced = abstract_snapshot(&task, &[crank::CRANK]).unwrap();
    assert_eq!(reduced.goals(), &[FactPair::new(1, 1)]);
}

#[test]
fn test_abstraction_renumbers_mutexes() {
    let task = TaskBuilder::new()
        .variable("a", 2)
        .variable("b", 2)
        .variable("c", 2)
        .mutex_group(&[(0, 1), (2, 1)])
        .mutex_group(&[(1, 0), (2, 0)])
        .build()
        .unwrap();
    let reduced = abstract_snapshot(&task, &[1]).unwrap();

    assert_eq!(reduced.mutexes().len(), 2);
    assert!(reduced.are_facts_mutex(FactPair::new(0, 1), FactPair::new(1, 1)));
    assert!(!reduced.are_facts_mutex(FactPair::new(0, 0), FactPair::new(1, 0)));
    // the b=0 exclusion disappears with b
    assert!(reduced.mutexes()[1][0].is_empty());
}

#[test]
fn test_abstraction_rejects_unknown_variable() {
    let err = abstract_snapshot(&crank::task(), &[7]).unwrap_err();
    assert!(matches!(
        err,
        PlanforgeError::UnknownVariable {
            var: 7,
            num_variables: 3
        }
    ));
}

#[test]
fn test_abstracting_nothing_is_identity() {
    let task = crank::task();
    assert_eq!(abstract_snapshot(&task, &[]).unwrap(), task);
}

#[test]
fn test_composition_clears_and_appends() {
    let task = shipping::task();
    let composition = Compositor::new(&task, &CompositionConfig::default()).composite();
    let composed = compose_snapshot(&task, &composition).unwrap();

    assert_eq!(composed.num_operators(), task.num_operators() + 1);
    assert!(composed.operator(shipping::SHIP).is_inert());
    assert_eq!(composed.operator(shipping::LOAD), task.operator(shipping::LOAD));
    assert_eq!(composed.operator(2).name, "[load > ship]");
    assert_eq!(composed.variables(), task.variables());
    assert_eq!(composed.goals(), task.goals());
}

#[test]
fn test_composition_for_other_snapshot_is_rejected() {
    let composition = Compositor::new(&shipping::task(), &CompositionConfig::default()).composite();
    let err = compose_snapshot(&shipping::interfering_task(), &composition).unwrap_err();
    assert!(matches!(
        err,
        PlanforgeError::SnapshotMismatch {
            expected: 2,
            found: 3
        }
    ));
}
