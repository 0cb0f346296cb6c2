//! Property based tests for the dependency graph

use std::collections::HashMap;

use depinject::{DependencyGraph, GraphState, Vertex};
use proptest::prelude::*;

#[derive(Debug, Clone, PartialEq)]
struct Node(String);
impl Vertex for Node {
    fn id(&self) -> &str {
        &self.0
    }
}

fn node(index: usize) -> Node {
    Node(format!("node-{index}"))
}

fn graph_with(vertices: usize, edges: &[(usize, usize)]) -> (DependencyGraph<Node>, Vec<(usize, usize)>) {
    let mut graph = DependencyGraph::new(true);
    for index in 0..vertices {
        graph.add_vertex(node(index)).unwrap();
    }

    let mut accepted = Vec::new();
    for &(from, to) in edges {
        if graph.add_edge(&node(from), &node(to)).is_ok() {
            accepted.push((from, to));
        }
    }
    (graph, accepted)
}

fn arbitrary_edges() -> impl Strategy<Value = (usize, Vec<(usize, usize)>)> {
    (1..24usize).prop_flat_map(|vertices| {
        (
            Just(vertices),
            prop::collection::vec((0..vertices, 0..vertices), 0..64),
        )
    })
}

proptest! {
    // Property: whatever edges are attempted, the graph can always be sorted
    #[test]
    fn graph_stays_acyclic((vertices, edges) in arbitrary_edges()) {
        let (mut graph, _) = graph_with(vertices, &edges);

        let sorted = graph.topological_sort();
        prop_assert!(sorted.is_ok());
        prop_assert_eq!(sorted.unwrap().len(), vertices);
        prop_assert_eq!(graph.state(), GraphState::Sorted);
    }

    // Property: every accepted edge points forward in the order
    #[test]
    fn order_respects_every_edge((vertices, edges) in arbitrary_edges()) {
        let (mut graph, accepted) = graph_with(vertices, &edges);

        let sorted = graph.topological_sort().unwrap();
        let position: HashMap<String, usize> = sorted
            .iter()
            .enumerate()
            .map(|(position, node)| (node.0.clone(), position))
            .collect();

        for (from, to) in accepted {
            prop_assert!(position[&node(from).0] < position[&node(to).0]);
        }
    }

    // Property: a rejected edge leaves the graph unchanged
    #[test]
    fn rejected_edge_changes_nothing((vertices, edges) in arbitrary_edges()) {
        let (mut graph, _) = graph_with(vertices, &edges);
        let before = graph.edges();

        for &(from, to) in &edges {
            let mut candidate = graph.clone();
            if candidate.add_edge(&node(from), &node(to)).is_err() {
                prop_assert_eq!(candidate.edges(), before.clone());
            }
        }
        prop_assert_eq!(graph.edges(), before);
        prop_assert!(graph.topological_sort().is_ok());
    }

    // Property: sorting twice yields the same order
    #[test]
    fn sort_is_repeatable((vertices, edges) in arbitrary_edges()) {
        let (mut graph, _) = graph_with(vertices, &edges);
        let first = graph.topological_sort().unwrap();
        let second = graph.topological_sort().unwrap();
        prop_assert_eq!(first, second);
    }
}
