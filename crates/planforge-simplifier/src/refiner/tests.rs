use planforge_config::CompositionConfig;
use planforge_core::{FactPair, Plan, PlanViolation, PlanforgeError, TaskBuilder, TaskSnapshot};
use planforge_test::{crank, shipping};

use super::*;
use crate::abstractor::Abstractor;
use crate::compositor::Compositor;
use crate::graph::FreeTransitionGraph;
use crate::transform::abstract_snapshot;

fn stage_for(task: TaskSnapshot) -> AbstractionStage {
    let abstractor = Abstractor::new(&task);
    let safe_variables = abstractor.find_safe_variables();
    let result = abstract_snapshot(&task, &safe_variables)
        .unwrap()
        .into_handle();
    AbstractionStage {
        source: task.into_handle(),
        result,
        safe_variables,
        graphs: abstractor.into_graphs(),
    }
}

#[test]
fn test_decompose_replaces_composites_in_place() {
    let task = shipping::task();
    let composition = Compositor::new(&task, &CompositionConfig::default()).composite();
    let composite = composition.composite_id(0);

    let mut plan = Plan::from_indices([composite, composite]);
    assert_eq!(decompose(&mut plan, &composition), 2);
    assert_eq!(
        plan.indices(),
        vec![shipping::LOAD, shipping::SHIP, shipping::LOAD, shipping::SHIP]
    );
    assert_eq!(decompose(&mut plan, &composition), 0);
}

#[test]
fn test_drop_inert_steps_removes_stripped_operators() {
    let stage = stage_for(crank::task());
    let mut plan = Plan::from_indices([crank::TURN_0_1, crank::ROLL, crank::DELIVER]);
    assert_eq!(drop_inert_steps(&mut plan, &stage.source, &stage.result), 1);
    assert_eq!(plan.indices(), vec![crank::ROLL, crank::DELIVER]);
}

#[test]
fn test_repair_inserts_path_before_consumer() {
    let stage = stage_for(crank::task());
    assert_eq!(stage.safe_variables, vec![crank::CRANK]);

    let mut plan = Plan::from_indices([crank::ROLL, crank::DELIVER]);
    let (repairs, inserted) = repair(&mut plan, &stage, 0).unwrap();
    assert_eq!((repairs, inserted), (1, 2));
    assert_eq!(
        plan.indices(),
        vec![crank::TURN_0_1, crank::TURN_1_2, crank::ROLL, crank::DELIVER]
    );
    assert!(stage.source.check_plan(&plan).is_ok());
}

#[test]
fn test_repair_appends_path_for_goal() {
    let stage = stage_for(crank::task_with_crank_goal(1));
    let mut plan = Plan::from_indices([crank::ROLL, crank::DELIVER]);
    let (repairs, inserted) = repair(&mut plan, &stage, 0).unwrap();
    assert_eq!((repairs, inserted), (2, 4));
    assert_eq!(
        plan.indices(),
        vec![
            crank::TURN_0_1,
            crank::TURN_1_2,
            crank::ROLL,
            crank::DELIVER,
            crank::TURN_2_0,
            crank::TURN_0_1
        ]
    );
}

#[test]
fn test_repair_fills_empty_plan() {
    let task = TaskBuilder::new()
        .variable("light", 2)
        .operator("switch", &[(0, 0)], &[(0, 1)], 1)
        .goal(0, 1)
        .build()
        .unwrap();
    let stage = stage_for(task);
    let mut plan = Plan::new();
    repair(&mut plan, &stage, 0).unwrap();
    assert_eq!(plan.indices(), vec![0]);
}

#[test]
fn test_missing_free_path_is_fatal() {
    let task = crank::task();
    let graphs = (0..task.num_variables())
        .map(|var| FreeTransitionGraph::new(var, task.domain_size(var)))
        .collect();
    let result = abstract_snapshot(&task, &[crank::CRANK]).unwrap().into_handle();
    let stage = AbstractionStage {
        source: task.into_handle(),
        result,
        safe_variables: vec![crank::CRANK],
        graphs,
    };

    let mut plan = Plan::from_indices([crank::ROLL, crank::DELIVER]);
    let err = repair(&mut plan, &stage, 4).unwrap_err();
    assert!(matches!(
        err,
        PlanforgeError::UnreachableRepair {
            layer: 4,
            variable: crank::CRANK,
            from: 0,
            to: 2
        }
    ));
}

#[test]
fn test_kept_variable_violation_is_invalid_plan() {
    let stage = stage_for(crank::task());
    let mut plan = Plan::from_indices([crank::DELIVER]);
    let err = repair(&mut plan, &stage, 0).unwrap_err();
    match err {
        PlanforgeError::InvalidPlan(PlanViolation::Precondition { step, fact, .. }) => {
            assert_eq!(step, 0);
            assert_eq!(fact, FactPair::new(crank::CART, 1));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_refiner_undoes_layers_newest_first() {
    let stage = stage_for(crank::task());
    let layers = vec![Layer {
        index: 0,
        abstraction: Some(stage),
        composition: None,
    }];

    let mut refiner = Refiner::new(&layers);
    let plan = refiner
        .refine(Plan::from_indices([crank::TURN_1_2, crank::ROLL, crank::DELIVER]))
        .unwrap();
    assert_eq!(
        plan.indices(),
        vec![crank::TURN_0_1, crank::TURN_1_2, crank::ROLL, crank::DELIVER]
    );
    assert_eq!(
        *refiner.statistics(),
        RefinementStatistics {
            decomposed: 0,
            dropped: 1,
            repairs: 1,
            inserted_steps: 2,
        }
    );
}
