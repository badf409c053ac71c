//! Regular path queries via intersection and transitive closure.

use std::collections::HashSet;

use pathlang::automata::{Label, NodeId, sim};
use pathlang::automata::nfa::Nfa;
use pathlang::graph::LabeledGraph;
use pathlang::matrix::Decomposition;
use pathlang::query::{intersect, regex_to_min_dfa, rpq};
use pathlang::regex::Ast;
use pathlang::{CancelToken, QueryError};

fn check_rpq(expr: &str, graph: &LabeledGraph, expected: &[(NodeId, NodeId)]) {
    let actual = rpq(expr, graph, None, None, None).unwrap();
    let expected: HashSet<(NodeId, NodeId)> = expected.iter().copied().collect();
    assert_eq!(actual, expected, "regex {expr:?}");
}

#[test]
fn concatenation_pair() {
    let g = LabeledGraph::from_edges([(0, "a", 1), (1, "b", 2)]);
    check_rpq("a.b", &g, &[(0, 2)]);
}

#[test]
fn star_chain() {
    let g = LabeledGraph::from_edges([(0, "a", 1), (1, "a", 2)]);
    check_rpq("a*", &g, &[(0, 1), (1, 2), (0, 2)]);
}

#[test]
fn star_single_edge() {
    let g = LabeledGraph::from_edges([(0, "a", 1)]);
    check_rpq("a*", &g, &[(0, 1)]);
}

#[test]
fn union_with_self_loop() {
    let g = LabeledGraph::from_edges([(0, "c", 0), (0, "a", 1), (1, "b", 2)]);
    check_rpq("(a.b)|c", &g, &[(0, 2), (0, 0)]);
}

#[test]
fn starred_prefix() {
    let g = LabeledGraph::from_edges([(0, "c", 0), (0, "a", 1), (1, "b", 2)]);
    check_rpq("c*.a.b", &g, &[(0, 2)]);
}

#[test]
fn star_does_not_invent_reflexive_pairs() {
    // The closure never adds the identity: (v, v) appears only when a real
    // cycle matches the regex.
    let g = LabeledGraph::from_edges([(0, "a", 1), (1, "a", 2)]);
    let result = rpq("a*", &g, None, None, None).unwrap();
    assert!(!result.contains(&(0, 0)));

    let cyclic = LabeledGraph::from_edges([(0, "a", 1), (1, "a", 0)]);
    let result = rpq("a*", &cyclic, None, None, None).unwrap();
    assert!(result.contains(&(0, 0)));
}

#[test]
fn start_and_final_restrictions() {
    let g = LabeledGraph::from_edges([(0, "a", 1), (1, "a", 2)]);
    let result = rpq("a*", &g, Some(&[0]), Some(&[2]), None).unwrap();
    assert_eq!(result, HashSet::from([(0, 2)]));
}

#[test]
fn disjoint_alphabets_yield_nothing() {
    let g = LabeledGraph::from_edges([(0, "x", 1)]);
    assert!(rpq("a", &g, None, None, None).unwrap().is_empty());
}

#[test]
fn malformed_regex_is_a_parse_error() {
    let g = LabeledGraph::from_edges([(0, "a", 1)]);
    let err = rpq("(a|b", &g, None, None, None).unwrap_err();
    assert!(matches!(err, QueryError::Regex(_)));
}

#[test]
fn cancelled_rpq_returns_no_result() {
    let token = CancelToken::new();
    token.cancel();
    let g = LabeledGraph::from_edges([(0, "a", 1)]);
    let err = rpq("a*", &g, None, None, Some(&token)).unwrap_err();
    assert!(matches!(err, QueryError::Cancelled));
}

#[test]
fn rerunning_a_query_is_idempotent() {
    let g = LabeledGraph::two_cycles(3, 2, ("a", "d"));
    let first = rpq("a*.d", &g, None, None, None).unwrap();
    let second = rpq("a*.d", &g, None, None, None).unwrap();
    assert_eq!(first, second);
}

#[test]
fn min_dfa_accepts_like_regex() {
    let dfa = regex_to_min_dfa("(a|b)*.a.b.b").unwrap();
    assert!(dfa.accepts_word(&["a", "b", "b"]));
    assert!(dfa.accepts_word(&["a", "a", "b", "b"]));
    assert!(!dfa.accepts_word(&["a", "b"]));
}

fn loop_nfa(label: &str) -> Nfa {
    let mut nfa = Nfa::with_states(1);
    nfa.add_transition(0, Label::sym(label), 0);
    nfa.add_start(0);
    nfa.add_final(0);
    nfa
}

#[test]
fn intersect_equal_loops() {
    let product = intersect(&loop_nfa("a"), &loop_nfa("a"));
    assert!(sim::equivalent(&product, &loop_nfa("a")));
}

#[test]
fn intersect_disjoint_loops_accepts_only_epsilon() {
    let product = intersect(&loop_nfa("a"), &loop_nfa("b"));
    assert!(sim::nfa_accepts(&product, &[]));
    assert!(!sim::nfa_accepts(&product, &["a"]));
    assert!(!sim::nfa_accepts(&product, &["b"]));
}

#[test]
fn intersect_loop_with_chain() {
    // A loop on `a` against the chain 0 -a-> 1 -b-> 2 leaves only the `a`
    // prefix reachable.
    let mut chain = Nfa::with_states(3);
    chain.add_transition(0, Label::sym("a"), 1);
    chain.add_transition(1, Label::sym("b"), 2);
    chain.add_start(0);
    chain.add_final(1);
    chain.add_final(2);

    let product = intersect(&loop_nfa("a"), &chain);
    assert!(sim::nfa_accepts(&product, &["a"]));
    assert!(!sim::nfa_accepts(&product, &["a", "b"]));
}

#[test]
fn intersection_decomposition_matches_kronecker() {
    // Rebuilding the decomposition of the materialized intersection gives
    // the Kronecker product cell for cell; labels the product zeroes out
    // entirely simply have no matrix on the materialized side.
    let lhs = Nfa::from_regex(&Ast::build("(a|b)*").unwrap());
    let rhs = Nfa::from_regex(&Ast::build("a.b").unwrap());
    let product = intersect(&lhs, &rhs);
    let direct = Decomposition::from_nfa(&lhs).kronecker(&Decomposition::from_nfa(&rhs));
    let materialized = Decomposition::from_nfa(&product);
    assert_eq!(materialized.n_states(), direct.n_states());
    for (label, mat) in direct.mats() {
        match materialized.mat(label) {
            Some(m) => assert_eq!(m, mat, "label {label}"),
            None => assert_eq!(mat.nnz(), 0, "label {label}"),
        }
    }
}

#[test]
fn intersect_branching_automata() {
    let mut lhs = Nfa::with_states(3);
    lhs.add_transition(0, Label::sym("a"), 1);
    lhs.add_transition(0, Label::sym("b"), 2);
    lhs.add_start(0);
    lhs.add_final(1);
    lhs.add_final(2);

    let mut rhs = Nfa::with_states(3);
    rhs.add_transition(0, Label::sym("a"), 1);
    rhs.add_transition(0, Label::sym("b"), 2);
    rhs.add_transition(1, Label::sym("a"), 1);
    rhs.add_transition(2, Label::sym("b"), 2);
    rhs.add_start(0);
    rhs.add_final(1);
    rhs.add_final(2);

    let product = intersect(&lhs, &rhs);
    assert!(sim::nfa_accepts(&product, &["a"]));
    assert!(sim::nfa_accepts(&product, &["b"]));
    assert!(!sim::nfa_accepts(&product, &["a", "a"]));
    assert!(sim::equivalent(&product, &lhs));
}
