//! Three-variable task with one self-contained variable.
//!
//! A crank cycles through three positions using operators that touch only
//! the crank. A cart may roll once the crank is at position 2, and a parcel
//! is delivered from the rolled cart. The crank is safe to abstract; its
//! position is restored by refinement right before the cart rolls.
//!
//! # Example
//!
//! ```
//! use planforge_test::crank;
//!
//! let task = crank::task();
//! assert_eq!(task.num_variables(), 3);
//! assert_eq!(task.operator(crank::ROLL).name, "roll");
//! ```

use planforge_core::{TaskBuilder, TaskSnapshot};

/// Variable ids.
pub const CRANK: usize = 0;
pub const CART: usize = 1;
pub const PARCEL: usize = 2;

/// Operator ids.
pub const TURN_0_1: usize = 0;
pub const TURN_1_2: usize = 1;
pub const TURN_2_0: usize = 2;
pub const ROLL: usize = 3;
pub const DELIVER: usize = 4;

/// Builds the crank task. Everything starts at value 0, the goal is a
/// delivered parcel.
pub fn task() -> TaskSnapshot {
    builder().build().expect("crank task is valid")
}

/// The crank task with an additional goal on the crank itself.
pub fn task_with_crank_goal(value: usize) -> TaskSnapshot {
    builder()
        .goal(CRANK, value)
        .build()
        .expect("crank task is valid")
}

fn builder() -> TaskBuilder {
    TaskBuilder::new()
        .variable("crank", 3)
        .variable("cart", 2)
        .variable("parcel", 2)
        .operator("turn-0-1", &[(CRANK, 0)], &[(CRANK, 1)], 1)
        .operator("turn-1-2", &[(CRANK, 1)], &[(CRANK, 2)], 1)
        .operator("turn-2-0", &[(CRANK, 2)], &[(CRANK, 0)], 1)
        .operator("roll", &[(CART, 0), (CRANK, 2)], &[(CART, 1)], 2)
        .operator("deliver", &[(CART, 1)], &[(PARCEL, 1)], 1)
        .goal(PARCEL, 1)
}
