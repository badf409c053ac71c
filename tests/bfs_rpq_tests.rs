//! BFS regular path queries over the direct-sum frontier matrix, and their
//! agreement with the closure-based engine.

use std::collections::HashSet;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use pathlang::automata::NodeId;
use pathlang::graph::LabeledGraph;
use pathlang::query::{bfs_rpq, rpq};

fn reachable(expr: &str, graph: &LabeledGraph, sources: &[NodeId]) -> HashSet<NodeId> {
    bfs_rpq(expr, graph, false, sources, None, None)
        .unwrap()
        .into_vertices()
        .unwrap()
}

fn pairs(expr: &str, graph: &LabeledGraph, sources: &[NodeId]) -> HashSet<(NodeId, NodeId)> {
    bfs_rpq(expr, graph, true, sources, None, None)
        .unwrap()
        .into_pairs()
        .unwrap()
}

#[test]
fn separate_star_single_edge() {
    let g = LabeledGraph::from_edges([(0, "a", 1)]);
    assert_eq!(pairs("a*", &g, &[0]), HashSet::from([(0, 1)]));
    assert_eq!(reachable("a*", &g, &[0]), HashSet::from([1]));
}

#[test]
fn separate_concatenation() {
    let g = LabeledGraph::from_edges([(0, "a", 1), (1, "b", 2)]);
    assert_eq!(pairs("a.b", &g, &[0]), HashSet::from([(0, 2)]));
    assert_eq!(reachable("a.b", &g, &[0]), HashSet::from([2]));
}

#[test]
fn separate_union() {
    let g = LabeledGraph::from_edges([(0, "c", 1), (0, "a", 1), (1, "b", 2)]);
    assert_eq!(pairs("(a.b)|c", &g, &[0]), HashSet::from([(0, 2), (0, 1)]));
    assert_eq!(reachable("(a.b)|c", &g, &[0]), HashSet::from([2, 1]));
}

#[test]
fn starred_prefix_through_self_loop() {
    let g = LabeledGraph::from_edges([(0, "c", 0), (0, "a", 1), (1, "b", 2)]);
    assert_eq!(pairs("c*.a.b", &g, &[0]), HashSet::from([(0, 2)]));
    assert_eq!(reachable("c*.a.b", &g, &[0]), HashSet::from([2]));
}

#[test]
fn combined_mode_excludes_all_sources() {
    let g = LabeledGraph::from_edges([(0, "a", 1), (1, "a", 2)]);
    assert_eq!(reachable("a*", &g, &[0, 1]), HashSet::from([2]));
}

#[test]
fn separate_mode_tracks_each_source() {
    let g = LabeledGraph::from_edges([(0, "a", 1), (1, "a", 2)]);
    assert_eq!(
        pairs("a*", &g, &[0, 1]),
        HashSet::from([(0, 1), (0, 2), (1, 2)])
    );
}

#[test]
fn final_restriction_applies() {
    let g = LabeledGraph::from_edges([(0, "a", 1), (1, "a", 2)]);
    let restricted = bfs_rpq("a*", &g, false, &[0], Some(&[2]), None)
        .unwrap()
        .into_vertices()
        .unwrap();
    assert_eq!(restricted, HashSet::from([2]));
}

#[test]
fn empty_source_set_is_empty() {
    let g = LabeledGraph::from_edges([(0, "a", 1)]);
    assert!(reachable("a*", &g, &[]).is_empty());
    assert!(pairs("a*", &g, &[]).is_empty());
}

#[test]
fn unmatched_alphabet_reaches_nothing() {
    let g = LabeledGraph::from_edges([(0, "x", 1)]);
    assert!(reachable("a.b", &g, &[0]).is_empty());
}

fn random_graph(rng: &mut StdRng, nodes: u32, labels: &[&str], edges: usize) -> LabeledGraph {
    let mut graph = LabeledGraph::with_nodes(nodes as usize);
    for _ in 0..edges {
        let u = rng.gen_range(0..nodes);
        let v = rng.gen_range(0..nodes);
        let label = labels[rng.gen_range(0..labels.len())];
        graph.add_edge(u, label, v);
    }
    graph
}

/// The BFS engine and the closure engine agree on every random instance:
/// the combined-mode vertex set equals the targets the closure query finds
/// from the same sources, minus the sources themselves.
#[test]
fn bfs_agrees_with_closure_rpq() {
    let regexes = ["a*", "a.b", "(a.b)|c", "c*.a.b", "(a|b)*", "a.(b|c)*"];
    let mut rng = StdRng::seed_from_u64(0x5eed);
    for round in 0..40 {
        let graph = random_graph(&mut rng, 6, &["a", "b", "c"], 10);
        let sources: Vec<NodeId> = (0..6u32).filter(|_| rng.gen_range(0..3) == 0).collect();
        for expr in regexes {
            let via_bfs = reachable(expr, &graph, &sources);
            let closure = rpq(expr, &graph, Some(&sources), None, None).unwrap();
            let source_set: HashSet<NodeId> = sources.iter().copied().collect();
            let via_closure: HashSet<NodeId> = closure
                .into_iter()
                .map(|(_, v)| v)
                .filter(|v| !source_set.contains(v))
                .collect();
            assert_eq!(via_bfs, via_closure, "round {round}, regex {expr:?}");
        }
    }
}

/// Per-source mode refines combined mode: its targets (minus the other
/// sources' own hits) union to the combined answer.
#[test]
fn separate_mode_is_consistent_with_combined() {
    let mut rng = StdRng::seed_from_u64(0xfacade);
    for _ in 0..25 {
        let graph = random_graph(&mut rng, 5, &["a", "b"], 8);
        let sources = [0, 2];
        for expr in ["a*", "(a|b)*", "a.b*"] {
            let combined = reachable(expr, &graph, &sources);
            let per_source = pairs(expr, &graph, &sources);
            let source_set: HashSet<NodeId> = sources.iter().copied().collect();
            let union: HashSet<NodeId> = per_source
                .iter()
                .map(|&(_, v)| v)
                .filter(|v| !source_set.contains(v))
                .collect();
            assert_eq!(union, combined, "regex {expr:?}");
        }
    }
}
