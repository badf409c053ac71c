//! ECFG construction and recursive automata, checked up to language
//! equivalence of the per-nonterminal components.

use pathlang::automata::nfa::Nfa;
use pathlang::automata::sim;
use pathlang::grammar::{Ecfg, RecursiveAutomaton};
use pathlang::regex::Ast;

/// Asserts that each nonterminal's regex accepts the same language as the
/// expected expression, by compiling both sides to automata.
fn check_ecfg(text: &str, expected: &[(&str, &str)]) {
    let ecfg = Ecfg::from_text(text).unwrap();
    assert_eq!(ecfg.len(), expected.len(), "nonterminal set for {text:?}");
    for (head, expr) in expected {
        let actual = Nfa::from_regex(ecfg.regex(head).unwrap());
        let wanted = Nfa::from_regex(&Ast::build(expr).unwrap());
        assert!(
            sim::equivalent(&actual, &wanted),
            "component {head} of {text:?}"
        );
    }
}

#[test]
fn ecfg_concatenates_bodies() {
    check_ecfg(
        "S -> A B C\nA -> a\nB -> b\nC -> c\n",
        &[("S", "A.B.C"), ("A", "a"), ("B", "b"), ("C", "c")],
    );
}

#[test]
fn ecfg_mixes_terminals_and_nonterminals() {
    check_ecfg(
        "S -> a b c D\nD -> E\nE -> d\n",
        &[("S", "a.b.c.D"), ("D", "E"), ("E", "d")],
    );
}

#[test]
fn ecfg_keeps_heads_with_unreferenced_rules() {
    check_ecfg(
        "S -> A\nA -> a\nB -> b\n",
        &[("S", "A"), ("A", "a"), ("B", "b")],
    );
}

#[test]
fn ecfg_unions_alternatives_with_epsilon() {
    check_ecfg("S -> S S | a b | $\n", &[("S", "(S.S)|(a.b)|$")]);
}

#[test]
fn ecfg_start_symbol_is_carried() {
    let ecfg = Ecfg::from_text("S -> a b\n").unwrap();
    assert_eq!(ecfg.start(), "S");
    assert_eq!(ecfg.len(), 1);
}

fn check_rsa(text: &str, expected: &[(&str, &str)]) {
    let rsa = RecursiveAutomaton::from_text(text).unwrap();
    assert_eq!(rsa.len(), expected.len());
    for (head, expr) in expected {
        let wanted = Nfa::from_regex(&Ast::build(expr).unwrap());
        assert!(
            sim::equivalent(rsa.automaton(head).unwrap(), &wanted),
            "component {head} of {text:?}"
        );
    }
}

#[test]
fn recursive_automaton_components() {
    check_rsa(
        "S -> A B C\nA -> a\nB -> b\nC -> c\n",
        &[("S", "A.B.C"), ("A", "a"), ("B", "b"), ("C", "c")],
    );
    check_rsa(
        "S -> A B\nA -> a\nB -> C\nC -> c\n",
        &[("S", "A.B"), ("A", "a"), ("B", "C"), ("C", "c")],
    );
    check_rsa("S -> S S | a b | $\n", &[("S", "(a.b)|(S.S)|$")]);
}

#[test]
fn minimized_components_keep_their_languages() {
    let rsa = RecursiveAutomaton::from_text("S -> a b c D\nD -> E\nE -> d\n").unwrap();
    let minimized = rsa.minimize();
    for (head, nfa) in rsa.automata() {
        assert!(sim::equivalent(nfa, minimized.automaton(head).unwrap()));
        // Minimization never grows a component.
        assert!(
            minimized.automaton(head).unwrap().state_count() <= nfa.state_count(),
            "component {head}"
        );
    }
}

#[test]
fn decompositions_cover_the_mixed_alphabet() {
    let rsa = RecursiveAutomaton::from_text("S -> a B\nB -> b\n").unwrap();
    let decomps = rsa.decompositions();
    let s = &decomps["S"];
    // Terminal and nonterminal symbols both label transitions.
    let labels: Vec<String> = s.labels().map(ToString::to_string).collect();
    assert!(labels.contains(&"a".to_string()));
    assert!(labels.contains(&"B".to_string()));
}
