use std::collections::{HashSet, VecDeque};

use indexmap::{IndexMap, IndexSet};
use tracing::debug;

use crate::automata::NodeId;
use crate::cancel::CancelToken;
use crate::errors::QueryError;
use crate::grammar::cfg::{Cfg, Symbol};
use crate::grammar::wcnf::to_wcnf;
use crate::graph::LabeledGraph;
use crate::matrix::RowMatrix;

/// The closure algorithm backing a context-free path query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    /// Worklist of `(vertex, nonterminal, vertex)` triples.
    Hellings,
    /// Simultaneous fixed point over per-nonterminal boolean matrices.
    Matrix,
}

/// A reachability fact: the nonterminal derives the word of some path
/// between the two vertices.
pub type Triple = (NodeId, String, NodeId);

/// WCNF productions re-indexed by body shape, with nonterminals interned
/// to dense ids.
struct Tables {
    nonterminals: IndexSet<String>,
    /// Heads of ε-productions.
    eps: Vec<usize>,
    /// Terminal -> heads of `A -> t` productions.
    term: IndexMap<String, Vec<usize>>,
    /// `(B, C)` -> heads of `A -> B C` productions.
    pair: IndexMap<(usize, usize), Vec<usize>>,
}

fn classify(wcnf: &Cfg) -> Tables {
    let nonterminals = wcnf.nonterminals().clone();
    let id = |name: &str| {
        nonterminals
            .get_index_of(name)
            .expect("production symbols are registered in the nonterminal table")
    };

    let mut eps = Vec::new();
    let mut term: IndexMap<String, Vec<usize>> = IndexMap::new();
    let mut pair: IndexMap<(usize, usize), Vec<usize>> = IndexMap::new();
    for production in wcnf.productions() {
        let head = id(&production.head);
        match production.body.as_slice() {
            [] => eps.push(head),
            [Symbol::Term(t)] => term.entry(t.clone()).or_default().push(head),
            [Symbol::Nonterm(b), Symbol::Nonterm(c)] => {
                pair.entry((id(b), id(c))).or_default().push(head);
            }
            other => debug_assert!(false, "body {other:?} escaped wcnf normalization"),
        }
    }
    Tables {
        nonterminals,
        eps,
        term,
        pair,
    }
}

/// Dense triples used internally while the nonterminal ids are live.
type RawTriple = (NodeId, usize, NodeId);

fn seed_triples(tables: &Tables, graph: &LabeledGraph) -> IndexSet<RawTriple> {
    let mut seeds = IndexSet::new();
    for (u, label, v) in graph.edges() {
        if let Some(heads) = tables.term.get(label) {
            for &a in heads {
                seeds.insert((u, a, v));
            }
        }
    }
    for v in graph.nodes() {
        for &a in &tables.eps {
            seeds.insert((v, a, v));
        }
    }
    seeds
}

/// Hellings' worklist closure: every popped triple is composed on both
/// sides with every compatible existing triple, and new facts re-enter the
/// queue until nothing fresh appears.
fn hellings_closure(
    tables: &Tables,
    graph: &LabeledGraph,
    cancel: Option<&CancelToken>,
) -> Result<IndexSet<RawTriple>, QueryError> {
    let mut result = seed_triples(tables, graph);
    let mut queue: VecDeque<RawTriple> = result.iter().copied().collect();

    while let Some((v, b, u)) = queue.pop_front() {
        if cancel.is_some_and(CancelToken::is_cancelled) {
            return Err(QueryError::Cancelled);
        }
        let mut fresh: Vec<RawTriple> = Vec::new();
        // Left composition: (w, A, v) then (v, B, u) gives (w, X, u)
        // for every X -> A B.
        for &(w, a, mid) in &result {
            if mid != v {
                continue;
            }
            if let Some(heads) = tables.pair.get(&(a, b)) {
                for &x in heads {
                    let triple = (w, x, u);
                    if !result.contains(&triple) {
                        fresh.push(triple);
                    }
                }
            }
        }
        // Right composition: (v, B, u) then (u, C, w) gives (v, X, w)
        // for every X -> B C.
        for &(mid, c, w) in &result {
            if mid != u {
                continue;
            }
            if let Some(heads) = tables.pair.get(&(b, c)) {
                for &x in heads {
                    let triple = (v, x, w);
                    if !result.contains(&triple) {
                        fresh.push(triple);
                    }
                }
            }
        }
        for triple in fresh {
            if result.insert(triple) {
                queue.push_back(triple);
            }
        }
    }
    debug!(triples = result.len(), "hellings closure converged");
    Ok(result)
}

/// Matrix closure: one boolean `|V|×|V|` matrix per nonterminal, grown by
/// `T[A] += T[B] · T[C]` sweeps until the total nonzero count stabilizes.
fn matrix_closure(
    tables: &Tables,
    graph: &LabeledGraph,
    cancel: Option<&CancelToken>,
) -> Result<IndexSet<RawTriple>, QueryError> {
    let n = graph.node_count();
    let mut mats: Vec<RowMatrix> = (0..tables.nonterminals.len())
        .map(|_| RowMatrix::new(n, n))
        .collect();
    for (u, a, v) in seed_triples(tables, graph) {
        mats[a].insert(u as usize, v as usize);
    }

    let mut rounds = 0usize;
    loop {
        if cancel.is_some_and(CancelToken::is_cancelled) {
            return Err(QueryError::Cancelled);
        }
        let before: usize = mats.iter().map(RowMatrix::nnz).sum();
        for (&(b, c), heads) in &tables.pair {
            let delta = mats[b].to_csr().mul(&mats[c].to_csr())?;
            for &a in heads {
                for (u, v) in delta.iter() {
                    mats[a].insert(u, v);
                }
            }
        }
        rounds += 1;
        let after: usize = mats.iter().map(RowMatrix::nnz).sum();
        if after == before {
            debug!(rounds, nnz = after, "matrix cfpq fixed point reached");
            break;
        }
    }

    let mut result = IndexSet::new();
    for (a, mat) in mats.iter().enumerate() {
        for (u, v) in mat.iter() {
            result.insert((u as NodeId, a, v as NodeId));
        }
    }
    Ok(result)
}

/// Full context-free closure of a graph under a grammar: every triple
/// `(u, A, v)` such that `A` derives the label word of some `u`-to-`v`
/// path. The grammar is normalized to WCNF first; both back-ends reach the
/// same fixed point.
pub fn cfpq_closure(
    cfg: &Cfg,
    graph: &LabeledGraph,
    backend: Backend,
    cancel: Option<&CancelToken>,
) -> Result<HashSet<Triple>, QueryError> {
    let wcnf = to_wcnf(cfg);
    let tables = classify(&wcnf);
    let raw = match backend {
        Backend::Hellings => hellings_closure(&tables, graph, cancel)?,
        Backend::Matrix => matrix_closure(&tables, graph, cancel)?,
    };
    Ok(raw
        .into_iter()
        .map(|(u, a, v)| {
            let name = tables.nonterminals[a].clone();
            (u, name, v)
        })
        .collect())
}

/// Context-free path query.
///
/// Returns the pairs `(u, v)` whose connecting paths derive from
/// `start_var` (defaulting to the grammar's start symbol), with `u` in
/// `starts` and `v` in `finals` (both default to all vertices).
///
/// # Errors
///
/// [`QueryError::UnknownSymbol`] when `start_var` names no nonterminal of
/// the grammar; [`QueryError::Cancelled`] on cooperative cancellation.
pub fn cfpq(
    cfg: &Cfg,
    graph: &LabeledGraph,
    start_var: Option<&str>,
    starts: Option<&[NodeId]>,
    finals: Option<&[NodeId]>,
    backend: Backend,
    cancel: Option<&CancelToken>,
) -> Result<HashSet<(NodeId, NodeId)>, QueryError> {
    let start_var = start_var.unwrap_or_else(|| cfg.start());
    if !cfg.has_nonterminal(start_var) {
        return Err(QueryError::UnknownSymbol(start_var.to_owned()));
    }

    let start_filter: Option<HashSet<NodeId>> = starts.map(|s| s.iter().copied().collect());
    let final_filter: Option<HashSet<NodeId>> = finals.map(|f| f.iter().copied().collect());

    let closure = cfpq_closure(cfg, graph, backend, cancel)?;
    Ok(closure
        .into_iter()
        .filter(|(u, var, v)| {
            var == start_var
                && start_filter.as_ref().is_none_or(|s| s.contains(u))
                && final_filter.as_ref().is_none_or(|f| f.contains(v))
        })
        .map(|(u, _, v)| (u, v))
        .collect())
}
