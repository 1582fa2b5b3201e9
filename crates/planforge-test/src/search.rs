//! Breadth-first reference search.
//!
//! Finds a plan with the fewest steps by exhaustive state-space search.
//! Only suitable for the small tasks used in tests.
//!
//! # Example
//!
//! ```
//! use planforge_test::{crank, search::breadth_first_search};
//!
//! let task = crank::task();
//! let plan = breadth_first_search(&task).unwrap();
//! assert!(task.check_plan(&plan).is_ok());
//! ```

use std::collections::{HashMap, VecDeque};

use planforge_core::{OperatorRef, Plan, TaskSnapshot};

/// Returns a shortest plan for `task`, or `None` if the goal is unreachable.
///
/// Axioms are ignored; inert operators are never applied.
pub fn breadth_first_search(task: &TaskSnapshot) -> Option<Plan> {
    let initial = task.initial_state().to_vec();
    if task.is_goal_state(&initial) {
        return Some(Plan::new());
    }

    // state -> (predecessor, operator)
    let mut parents: HashMap<Vec<usize>, Option<(Vec<usize>, usize)>> = HashMap::new();
    parents.insert(initial.clone(), None);
    let mut queue = VecDeque::from([initial]);

    while let Some(state) = queue.pop_front() {
        for (index, op) in task.operators().iter().enumerate() {
            if op.is_inert() || !task.is_applicable(&state, op) {
                continue;
            }
            let mut successor = state.clone();
            task.apply(&mut successor, op);
            if parents.contains_key(&successor) {
                continue;
            }
            parents.insert(successor.clone(), Some((state.clone(), index)));
            if task.is_goal_state(&successor) {
                return Some(extract_plan(&parents, successor));
            }
            queue.push_back(successor);
        }
    }
    None
}

fn extract_plan(
    parents: &HashMap<Vec<usize>, Option<(Vec<usize>, usize)>>,
    goal: Vec<usize>,
) -> Plan {
    let mut steps = Vec::new();
    let mut state = goal;
    while let Some(Some((previous, index))) = parents.get(&state) {
        steps.push(OperatorRef::operator(*index));
        state = previous.clone();
    }
    steps.reverse();
    steps.into_iter().collect()
}
