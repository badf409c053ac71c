//! Graphviz `dot` rendering for graphs and automata.
//!
//! Output is the standard textual form: one node line per vertex or state,
//! one edge line per transition with the symbol as its `label` attribute.
//! Final states are drawn with doubled peripheries, start states with an
//! arrow from a synthetic invisible point node.

use std::fmt::Write;

use crate::automata::nfa::Nfa;
use crate::graph::LabeledGraph;

/// Quotes and escapes an identifier or label for dot output.
fn quoted(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 2);
    out.push('"');
    for ch in text.chars() {
        if ch == '"' || ch == '\\' {
            out.push('\\');
        }
        out.push(ch);
    }
    out.push('"');
    out
}

/// Renders a labeled multigraph as a `digraph`.
#[must_use]
pub fn graph_to_dot(graph: &LabeledGraph) -> String {
    let mut out = String::from("digraph {\n");
    for node in graph.nodes() {
        let _ = writeln!(out, "\t{node};");
    }
    for (u, label, v) in graph.edges() {
        let _ = writeln!(out, "\t{u} -> {v} [label={}];", quoted(label));
    }
    out.push_str("}\n");
    out
}

/// Renders an automaton as a `digraph`. Final states get
/// `peripheries=2`; every start state gets an entry arrow from a shared
/// invisible node.
#[must_use]
pub fn nfa_to_dot(nfa: &Nfa) -> String {
    let mut out = String::from("digraph {\n");
    if !nfa.starts().is_empty() {
        out.push_str("\t__start [shape=point, style=invis];\n");
    }
    for state in 0..nfa.state_count() as u32 {
        if nfa.is_final(state) {
            let _ = writeln!(out, "\t{state} [peripheries=2];");
        } else {
            let _ = writeln!(out, "\t{state};");
        }
    }
    for &start in nfa.starts() {
        let _ = writeln!(out, "\t__start -> {start};");
    }
    for (from, label, to) in nfa.edges() {
        let _ = writeln!(out, "\t{from} -> {to} [label={}];", quoted(&label.to_string()));
    }
    out.push_str("}\n");
    out
}
