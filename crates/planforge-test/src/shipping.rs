//! Producer/consumer tasks for operator composition.
//!
//! `load` establishes the pair `{box=1, truck=1}` and `ship` consumes it.
//! Nothing else touches the pair, so `load` followed by `ship` can be fused.
//!
//! # Example
//!
//! ```
//! use planforge_test::shipping;
//!
//! let task = shipping::task();
//! assert_eq!(task.operator(shipping::LOAD).effects.len(), 2);
//! ```

use planforge_core::{TaskBuilder, TaskSnapshot};

/// Variable ids.
pub const BOX: usize = 0;
pub const TRUCK: usize = 1;
pub const DOCK: usize = 2;

/// Operator ids.
pub const LOAD: usize = 0;
pub const SHIP: usize = 1;
/// Only in [`interfering_task`].
pub const RESET: usize = 2;

/// Variable ids of [`decoupling_task`].
pub const HAND: usize = 0;
pub const SHELF: usize = 1;

/// Operator ids of [`decoupling_task`].
pub const PICK: usize = 0;
pub const PLACE: usize = 1;

/// Variable ids of [`conveyor_task`].
pub const ARM: usize = 0;
pub const GRIP: usize = 1;
pub const BELT: usize = 2;

/// Operator ids of [`conveyor_task`].
pub const LIFT: usize = 0;
pub const ADVANCE: [usize; 4] = [1, 2, 3, 4];

fn builder() -> TaskBuilder {
    TaskBuilder::new()
        .variable("box", 3)
        .variable("truck", 3)
        .variable("dock", 2)
        .operator("load", &[(DOCK, 0)], &[(BOX, 1), (TRUCK, 1)], 1)
        .operator("ship", &[(BOX, 1), (TRUCK, 1)], &[(BOX, 2), (TRUCK, 2)], 2)
}

/// `load` then `ship` moves the box to its destination.
pub fn task() -> TaskSnapshot {
    builder()
        .goal(BOX, 2)
        .build()
        .expect("shipping task is valid")
}

/// Adds `reset`, which can clobber the box between `load` and `ship`.
pub fn interfering_task() -> TaskSnapshot {
    builder()
        .operator("reset", &[], &[(BOX, 0)], 1)
        .goal(BOX, 2)
        .build()
        .expect("shipping task is valid")
}

/// `pick` then `place` leaves the hand where it started and changes only
/// the shelf, so the composite decouples the two variables.
pub fn decoupling_task() -> TaskSnapshot {
    TaskBuilder::new()
        .variable("hand", 2)
        .variable("shelf", 3)
        .operator("pick", &[(HAND, 0), (SHELF, 0)], &[(HAND, 1), (SHELF, 1)], 1)
        .operator("place", &[(HAND, 1), (SHELF, 1)], &[(HAND, 0), (SHELF, 2)], 1)
        .goal(SHELF, 2)
        .build()
        .expect("decoupling task is valid")
}

/// `lift` establishes `{arm=1, grip=1}` once, then four `advance` steps
/// consume it in a row to move the belt from 0 to 4. The full chain is one
/// operator longer than the default chain bound.
pub fn conveyor_task() -> TaskSnapshot {
    let mut builder = TaskBuilder::new()
        .variable("arm", 2)
        .variable("grip", 2)
        .variable("belt", 5)
        .operator("lift", &[(ARM, 0)], &[(ARM, 1), (GRIP, 1)], 1);
    for step in 1..=4 {
        builder = builder.operator(
            format!("advance-{step}"),
            &[(ARM, 1), (GRIP, 1), (BELT, step - 1)],
            &[(BELT, step)],
            1,
        );
    }
    builder
        .goal(BELT, 4)
        .build()
        .expect("conveyor task is valid")
}
