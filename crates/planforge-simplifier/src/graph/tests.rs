use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use super::*;

/// 0 -> 1 -> 2 -> 0, plus 3 -> 0 and an isolated 4.
fn ring() -> FreeTransitionGraph {
    let mut graph = FreeTransitionGraph::new(0, 5);
    graph.add_transition(0, 1, 10);
    graph.add_transition(1, 2, 11);
    graph.add_transition(2, 0, 12);
    graph.add_transition(3, 0, 13);
    graph
}

fn random_graph(rng: &mut ChaCha8Rng) -> FreeTransitionGraph {
    let num_values = rng.random_range(1..8);
    let mut graph = FreeTransitionGraph::new(0, num_values);
    let num_edges = rng.random_range(0..num_values * 3);
    for label in 0..num_edges {
        let from = rng.random_range(0..num_values);
        let to = rng.random_range(0..num_values);
        graph.add_transition(from, to, label);
    }
    graph
}

#[test]
fn test_empty_targets_are_reachable() {
    let graph = ring();
    for value in 0..graph.num_values() {
        assert!(graph.is_reachable(value, &[]));
    }
    assert!(graph.is_strongly_connected(&[]));
}

#[test]
fn test_reachability_follows_edge_direction() {
    let graph = ring();
    assert!(graph.is_reachable(3, &[0, 1, 2]));
    assert!(!graph.is_reachable(0, &[3]));
    assert!(!graph.is_reachable(0, &[4]));
    assert!(graph.is_reachable(4, &[4]));
}

#[test]
fn test_strong_connectivity_uses_intermediate_values() {
    let graph = ring();
    // 0 and 2 reach each other only through 1
    assert!(graph.is_strongly_connected(&[0, 2]));
    assert!(!graph.is_strongly_connected(&[0, 3]));
    assert!(!graph.is_strongly_connected(&[4, 0]));
    assert!(graph.is_strongly_connected(&[4]));
}

#[test]
fn test_external_marks_are_idempotent() {
    let mut graph = ring();
    graph.mark_externally_required(2);
    graph.mark_externally_required(2);
    graph.mark_externally_caused(0);
    graph.mark_externally_caused(3);
    assert_eq!(graph.externally_required_values(), vec![2]);
    assert_eq!(graph.externally_caused_values(), vec![0, 3]);
    assert!(graph.is_externally_required(2));
    assert!(!graph.is_externally_caused(2));
}

#[test]
fn test_transpose_reverses_and_keeps_labels() {
    let graph = ring();
    let transposed = graph.transpose();
    assert_eq!(transposed.edge_count(), graph.edge_count());
    assert_eq!(
        transposed.transitions_from(0),
        &[
            Transition {
                destination: 2,
                operator: 12
            },
            Transition {
                destination: 3,
                operator: 13
            },
        ]
    );
    assert!(transposed.is_reachable(0, &[3]));
}

#[test]
fn test_path_returns_labels_in_execution_order() {
    let graph = ring();
    assert_eq!(graph.path(3, 2), vec![13, 10, 11]);
    assert_eq!(graph.path(1, 0), vec![11, 12]);
}

#[test]
fn test_path_is_empty_for_same_or_unreachable_value() {
    let graph = ring();
    assert!(graph.path(1, 1).is_empty());
    assert!(graph.path(0, 3).is_empty());
    assert!(graph.path(0, 4).is_empty());
}

#[test]
fn test_path_prefers_fewest_edges() {
    let mut graph = FreeTransitionGraph::new(0, 4);
    graph.add_transition(0, 1, 0);
    graph.add_transition(1, 2, 1);
    graph.add_transition(2, 3, 2);
    graph.add_transition(0, 3, 3);
    assert_eq!(graph.path(0, 3), vec![3]);
}

#[test]
fn test_self_loops_and_parallel_edges() {
    let mut graph = FreeTransitionGraph::new(0, 2);
    graph.add_transition(0, 0, 0);
    graph.add_transition(0, 1, 1);
    graph.add_transition(0, 1, 2);
    assert_eq!(graph.edge_count(), 3);
    assert_eq!(graph.path(0, 1), vec![1]);
    assert!(!graph.is_reachable(1, &[0]));
}

#[test]
fn test_display_lists_marks() {
    let mut graph = ring();
    graph.mark_externally_required(1);
    graph.mark_externally_caused(1);
    let text = graph.to_string();
    assert!(text.contains("free transitions of variable 0"));
    assert!(text.contains("1 -> 2  (required, caused)"));
}

#[test]
fn test_double_transpose_preserves_edges() {
    let mut rng = ChaCha8Rng::seed_from_u64(7);
    for _ in 0..200 {
        let graph = random_graph(&mut rng);
        assert_eq!(graph.transpose().transpose().edges(), graph.edges());
    }
}

#[test]
fn test_strong_connectivity_does_not_depend_on_anchor() {
    let mut rng = ChaCha8Rng::seed_from_u64(11);
    for _ in 0..200 {
        let graph = random_graph(&mut rng);
        let n = graph.num_values();
        let mut targets: Vec<usize> = (0..n).filter(|_| rng.random_bool(0.5)).collect();
        if targets.len() < 2 {
            continue;
        }
        let expected = graph.is_strongly_connected(&targets);
        targets.rotate_left(1);
        assert_eq!(graph.is_strongly_connected(&targets), expected);
    }
}

#[test]
fn test_path_leads_to_destination() {
    let mut rng = ChaCha8Rng::seed_from_u64(23);
    for _ in 0..200 {
        let graph = random_graph(&mut rng);
        // label -> (from, to)
        let edges = graph.edges();
        let n = graph.num_values();
        let source = rng.random_range(0..n);
        let destination = rng.random_range(0..n);
        let path = graph.path(source, destination);

        if source == destination || !graph.is_reachable(source, &[destination]) {
            assert!(path.is_empty());
            continue;
        }
        assert!(!path.is_empty());
        let mut value = source;
        for label in path {
            let &(from, to, _) = edges
                .iter()
                .find(|&&(_, _, op)| op == label)
                .unwrap();
            assert_eq!(from, value);
            value = to;
        }
        assert_eq!(value, destination);
    }
}
