use std::collections::HashSet;

use tracing::debug;

use crate::automata::dfa::{Dfa, determinize};
use crate::automata::min::minimize;
use crate::automata::nfa::Nfa;
use crate::automata::{NodeId, StateId};
use crate::cancel::CancelToken;
use crate::errors::QueryError;
use crate::graph::LabeledGraph;
use crate::matrix::Decomposition;
use crate::regex::Ast;

/// Compiles a label-regex into its minimal DFA: parse, Thompson-construct,
/// subset-construct, then merge equivalent states. Intersections stay small
/// because the regex side is minimal.
pub fn regex_to_min_dfa(expr: &str) -> Result<Dfa, QueryError> {
    let ast = Ast::build(expr)?;
    Ok(minimize(&determinize(&Nfa::from_regex(&ast))))
}

/// Intersection of two automata.
///
/// The result accepts `L(lhs) ∩ L(rhs)`. Its state space is the
/// lexicographic product of the inputs' state spaces (the pair of the
/// states at positions `(i, j)` has id `i · |rhs| + j`), with per-label
/// transition matrices given by the Kronecker product of the two
/// decompositions and the start/final sets by the cross products.
#[must_use]
pub fn intersect(lhs: &Nfa, rhs: &Nfa) -> Nfa {
    let product = Decomposition::from_nfa(lhs).kronecker(&Decomposition::from_nfa(rhs));
    let n_rhs = rhs.state_count() as StateId;

    let mut starts = Vec::new();
    for &sl in lhs.starts() {
        for &sr in rhs.starts() {
            starts.push(sl * n_rhs + sr);
        }
    }
    let mut finals = Vec::new();
    for &fl in lhs.finals() {
        for &fr in rhs.finals() {
            finals.push(fl * n_rhs + fr);
        }
    }
    product.to_nfa(starts, finals)
}

/// Regular path query by matrix closure.
///
/// Returns every pair `(u, v)` of graph vertices connected by a path whose
/// label word matches `expr`, with `u` drawn from `starts` and `v` from
/// `finals` (both default to all vertices). Paths have length at least one;
/// a vertex is not reported as reaching itself on the empty word unless an
/// actual cycle matches.
pub fn rpq(
    expr: &str,
    graph: &LabeledGraph,
    starts: Option<&[NodeId]>,
    finals: Option<&[NodeId]>,
    cancel: Option<&CancelToken>,
) -> Result<HashSet<(NodeId, NodeId)>, QueryError> {
    let regex_nfa = regex_to_min_dfa(expr)?.to_nfa();
    let graph_nfa = graph.to_nfa(starts, finals);

    let product =
        Decomposition::from_nfa(&graph_nfa).kronecker(&Decomposition::from_nfa(&regex_nfa));
    let closure = product.transitive_closure(cancel)?;
    debug!(
        product_states = product.n_states(),
        closure_nnz = closure.nnz(),
        "rpq closure computed"
    );

    let nr = regex_nfa.state_count();
    let graph_starts: HashSet<StateId> = graph_nfa.starts().iter().copied().collect();
    let graph_finals: HashSet<StateId> = graph_nfa.finals().iter().copied().collect();

    let mut results = HashSet::new();
    for (i, j) in closure.iter() {
        let (u, p) = ((i / nr) as NodeId, (i % nr) as StateId);
        let (v, q) = ((j / nr) as NodeId, (j % nr) as StateId);
        if graph_starts.contains(&u)
            && graph_finals.contains(&v)
            && regex_nfa.is_start(p)
            && regex_nfa.is_final(q)
        {
            results.insert((u, v));
        }
    }
    Ok(results)
}
