//! Seeded random planning tasks.
//!
//! Tasks are small enough for [`breadth_first_search`](crate::search::breadth_first_search)
//! and mix single-variable operators (candidates for free transitions) with
//! operators spanning two variables.
//!
//! About half of the tasks with three or more variables also carry a relay:
//! a producer setting a fact pair `{p=vp, q=vq}` and one or two consumers
//! requiring it. The other operators never write `p` or `q` and read `p`
//! only at values other than `vp`, so the pair is a composition target.
//!
//! # Example
//!
//! ```
//! use planforge_test::random::random_task;
//!
//! assert_eq!(random_task(3), random_task(3));
//! ```

use planforge_core::{TaskBuilder, TaskSnapshot};
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Producer/consumer pair planted in a random task.
struct Relay {
    p: usize,
    q: usize,
    vp: usize,
    vq: usize,
}

/// Generates a valid task from `seed`. Equal seeds give equal tasks.
pub fn random_task(seed: u64) -> TaskSnapshot {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let num_variables = rng.random_range(2..=4);
    let domains: Vec<usize> = (0..num_variables)
        .map(|_| rng.random_range(2..=3))
        .collect();
    let mut initial: Vec<usize> = domains
        .iter()
        .map(|&size| rng.random_range(0..size))
        .collect();

    let relay = if num_variables >= 3 && rng.random_bool(0.5) {
        let mut vars: Vec<usize> = (0..num_variables).collect();
        vars.shuffle(&mut rng);
        let (p, q) = (vars[0], vars[1]);
        let vp = rng.random_range(0..domains[p]);
        let vq = rng.random_range(0..domains[q]);
        initial[p] = other_value(&mut rng, domains[p], vp);
        Some(Relay { p, q, vp, vq })
    } else {
        None
    };

    let mut builder = TaskBuilder::new();
    for (var, &size) in domains.iter().enumerate() {
        builder = builder
            .variable(format!("v{var}"), size)
            .initial(var, initial[var]);
    }

    let mut index = 0;
    if let Some(relay) = &relay {
        let Relay { p, q, vp, vq } = *relay;
        let from = initial[p];
        builder = builder.operator(
            "produce",
            &[(p, from)],
            &[(p, vp), (q, vq)],
            rng.random_range(1..=3),
        );
        let consumers = rng.random_range(1..=2);
        for consumer in 0..consumers {
            let mut eff = vec![(p, other_value(&mut rng, domains[p], vp))];
            if rng.random_bool(0.5) {
                eff.push((q, rng.random_range(0..domains[q])));
            }
            builder = builder.operator(
                format!("consume{consumer}"),
                &[(p, vp), (q, vq)],
                &eff,
                rng.random_range(1..=3),
            );
        }
        index = 1 + consumers;
    }

    // variables other operators may write
    let writable: Vec<usize> = (0..num_variables)
        .filter(|&var| relay.as_ref().map_or(true, |r| var != r.p && var != r.q))
        .collect();

    let num_operators = rng.random_range(3..=10);
    for _ in 0..num_operators {
        let mut vars = writable.clone();
        vars.shuffle(&mut rng);

        let (mut pre, eff) = if vars.len() < 2 || rng.random_bool(0.5) {
            // single variable
            let var = vars[0];
            let pre = if rng.random_bool(0.8) {
                vec![(var, rng.random_range(0..domains[var]))]
            } else {
                Vec::new()
            };
            (pre, vec![(var, rng.random_range(0..domains[var]))])
        } else {
            let (a, b) = (vars[0], vars[1]);
            let mut pre = vec![(a, rng.random_range(0..domains[a]))];
            if rng.random_bool(0.5) {
                pre.push((b, rng.random_range(0..domains[b])));
            }
            let mut eff = vec![(b, rng.random_range(0..domains[b]))];
            if rng.random_bool(0.3) {
                eff.push((a, rng.random_range(0..domains[a])));
            }
            (pre, eff)
        };
        if let Some(relay) = &relay {
            if rng.random_bool(0.3) {
                pre.push((relay.p, other_value(&mut rng, domains[relay.p], relay.vp)));
            }
        }
        builder = builder.operator(format!("op{index}"), &pre, &eff, rng.random_range(1..=3));
        index += 1;
    }

    let mut goal_vars: Vec<usize> = (0..num_variables).collect();
    goal_vars.shuffle(&mut rng);
    let num_goals = rng.random_range(1..=2);
    for &var in goal_vars.iter().take(num_goals) {
        builder = builder.goal(var, rng.random_range(0..domains[var]));
    }

    builder.build().expect("random task is valid")
}

/// A value of a `size`-valued domain other than `value`.
fn other_value(rng: &mut ChaCha8Rng, size: usize, value: usize) -> usize {
    (value + rng.random_range(1..size)) % size
}
