//! Context-free path queries: the Hellings and Matrix back-ends against
//! the expectations table, and their equivalence on random instances.

use std::collections::HashSet;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use pathlang::automata::NodeId;
use pathlang::grammar::Cfg;
use pathlang::graph::LabeledGraph;
use pathlang::query::{Backend, cfpq, cfpq_closure};

fn check_cfpq(grammar: &str, graph: &LabeledGraph, expected: &[(NodeId, NodeId)]) {
    let cfg = Cfg::from_text(grammar).unwrap();
    let expected: HashSet<(NodeId, NodeId)> = expected.iter().copied().collect();
    for backend in [Backend::Hellings, Backend::Matrix] {
        let actual = cfpq(&cfg, graph, None, None, None, backend, None).unwrap();
        assert_eq!(actual, expected, "{backend:?} on {grammar:?}");
    }
}

#[test]
fn two_terminal_chain() {
    let g = LabeledGraph::from_edges([(0, "a", 1), (1, "b", 2)]);
    check_cfpq("S -> A B\nA -> a\nB -> b\n", &g, &[(0, 2)]);
}

#[test]
fn epsilon_grammar_marks_every_vertex() {
    let g = LabeledGraph::from_edges([(0, "a", 1), (1, "b", 0)]);
    check_cfpq("S -> $\n", &g, &[(0, 0), (1, 1)]);
}

#[test]
fn three_symbol_body_is_binarized() {
    let g = LabeledGraph::from_edges([(0, "a", 1), (1, "b", 2), (2, "c", 3)]);
    check_cfpq("S -> A B C\nA -> a\nB -> b\nC -> c\n", &g, &[(0, 3)]);
}

#[test]
fn recursive_grammar_with_terminal_loop() {
    let g = LabeledGraph::from_edges([(0, "s", 0), (0, "a", 1), (1, "b", 2), (2, "c", 3)]);
    check_cfpq(
        "S -> A B C | S S | s\nA -> a\nB -> b\nC -> c\n",
        &g,
        &[(0, 3), (0, 0)],
    );
}

#[test]
fn epsilon_nonterminal_shifts_matches() {
    let g = LabeledGraph::from_edges([(0, "a", 1), (1, "b", 2), (2, "a", 3), (3, "b", 4)]);
    check_cfpq(
        "S -> A B | S S\nA -> a | $\nB -> b\n",
        &g,
        &[(0, 4), (2, 4), (1, 2), (3, 4), (1, 4), (0, 2)],
    );
}

#[test]
fn balanced_brackets_on_a_cycle() {
    // a^n d^n words on the two-cycle graph: classic balanced reachability.
    let g = LabeledGraph::two_cycles(2, 1, ("a", "d"));
    let cfg = Cfg::from_text("S -> a S d | a d\n").unwrap();
    let hellings = cfpq(&cfg, &g, None, None, None, Backend::Hellings, None).unwrap();
    let matrix = cfpq(&cfg, &g, None, None, None, Backend::Matrix, None).unwrap();
    assert_eq!(hellings, matrix);
    assert!(!hellings.is_empty());
    // Every match consumes at least one `a` edge and one `d` edge.
    assert!(hellings.iter().all(|&(u, _)| u <= 2));
}

#[test]
fn closure_exposes_intermediate_nonterminals() {
    let g = LabeledGraph::from_edges([(0, "a", 1), (1, "b", 2)]);
    let cfg = Cfg::from_text("S -> A B\nA -> a\nB -> b\n").unwrap();
    let closure = cfpq_closure(&cfg, &g, Backend::Hellings, None).unwrap();
    assert!(closure.contains(&(0, "A".to_string(), 1)));
    assert!(closure.contains(&(1, "B".to_string(), 2)));
    assert!(closure.contains(&(0, "S".to_string(), 2)));
}

#[test]
fn adding_an_edge_never_shrinks_the_answer() {
    let cfg = Cfg::from_text("S -> A B | S S\nA -> a | $\nB -> b\n").unwrap();
    let mut graph = LabeledGraph::from_edges([(0, "a", 1), (1, "b", 2)]);
    let before = cfpq(&cfg, &graph, None, None, None, Backend::Matrix, None).unwrap();
    graph.add_edge(2, "b", 0);
    let after = cfpq(&cfg, &graph, None, None, None, Backend::Matrix, None).unwrap();
    assert!(before.is_subset(&after));
}

#[test]
fn adding_a_production_never_shrinks_the_answer() {
    let graph = LabeledGraph::from_edges([(0, "a", 1), (1, "b", 2)]);
    let narrow = Cfg::from_text("S -> A B\nA -> a\nB -> b\n").unwrap();
    let wide = Cfg::from_text("S -> A B | b\nA -> a\nB -> b\n").unwrap();
    let before = cfpq(&narrow, &graph, None, None, None, Backend::Hellings, None).unwrap();
    let after = cfpq(&wide, &graph, None, None, None, Backend::Hellings, None).unwrap();
    assert!(before.is_subset(&after));
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

/// Both back-ends converge to the same triple set on random graphs, for a
/// spread of grammar shapes (ε-nonterminals, recursion, long bodies).
#[test]
fn backends_agree_on_random_instances() {
    let grammars = [
        "S -> A B\nA -> a\nB -> b\n",
        "S -> $\n",
        "S -> A B C\nA -> a\nB -> b\nC -> c\n",
        "S -> A B C | S S | s\nA -> a\nB -> b\nC -> c\n",
        "S -> A B | S S\nA -> a | $\nB -> b\n",
        "S -> a S b | $\n",
        "S -> a S | b\n",
    ];
    let mut rng = StdRng::seed_from_u64(0xc0ffee);
    for round in 0..30 {
        let graph = random_graph(&mut rng, 5, &["a", "b", "c", "s"], 9);
        for grammar in grammars {
            let cfg = Cfg::from_text(grammar).unwrap();
            let hellings = cfpq_closure(&cfg, &graph, Backend::Hellings, None).unwrap();
            let matrix = cfpq_closure(&cfg, &graph, Backend::Matrix, None).unwrap();
            assert_eq!(hellings, matrix, "round {round}, grammar {grammar:?}");
        }
    }
}

#[test]
fn queries_are_idempotent() {
    let cfg = Cfg::from_text("S -> a S b | $\n").unwrap();
    let graph = LabeledGraph::two_cycles(2, 2, ("a", "b"));
    for backend in [Backend::Hellings, Backend::Matrix] {
        let first = cfpq(&cfg, &graph, None, None, None, backend, None).unwrap();
        let second = cfpq(&cfg, &graph, None, None, None, backend, None).unwrap();
        assert_eq!(first, second);
    }
}

#[test]
fn explicit_start_variable_selects_sublanguage() {
    let g = LabeledGraph::from_edges([(0, "a", 1), (1, "b", 2)]);
    let cfg = Cfg::from_text("S -> A B\nA -> a\nB -> b\n").unwrap();
    let a_pairs = cfpq(&cfg, &g, Some("A"), None, None, Backend::Hellings, None).unwrap();
    assert_eq!(a_pairs, HashSet::from([(0, 1)]));
}
