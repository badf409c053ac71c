use std::collections::HashSet;

use tracing::{debug, trace};

use crate::automata::NodeId;
use crate::cancel::CancelToken;
use crate::errors::QueryError;
use crate::graph::LabeledGraph;
use crate::matrix::{CsrMatrix, Decomposition, RowMatrix};
use crate::query::rpq::regex_to_min_dfa;

/// Result of a [`bfs_rpq`] run: plain reachable vertices in the combined
/// mode, `(source, vertex)` pairs in the per-source mode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BfsRpqResult {
    Vertices(HashSet<NodeId>),
    Pairs(HashSet<(NodeId, NodeId)>),
}

impl BfsRpqResult {
    /// The vertex set of a combined run.
    #[must_use]
    pub fn into_vertices(self) -> Option<HashSet<NodeId>> {
        match self {
            BfsRpqResult::Vertices(v) => Some(v),
            BfsRpqResult::Pairs(_) => None,
        }
    }

    /// The pair set of a per-source run.
    #[must_use]
    pub fn into_pairs(self) -> Option<HashSet<(NodeId, NodeId)>> {
        match self {
            BfsRpqResult::Vertices(_) => None,
            BfsRpqResult::Pairs(p) => Some(p),
        }
    }
}

/// Regular path query by multi-source breadth-first search, without
/// materializing the transitive closure.
///
/// The regex and graph decompositions are combined into one direct sum
/// `S`; the search state is the two-block matrix `[L | R]` whose left block
/// (one identity per source block) routes regex states and whose right
/// block tracks reached graph vertices per regex state. Multiplying the
/// concatenated view by each per-label matrix of `S` advances both sides
/// synchronously; the nonzeros of the left half then say which regex state
/// each result row belongs to, and the right half is folded back onto the
/// canonical row for that state.
///
/// Reachability is computed from the explicit `sources` only. With
/// `separate` set, each source gets its own block of rows and the result
/// pairs vertices with the source that reached them; otherwise one block
/// serves all sources and the result is the union of reached vertices.
/// Sources themselves are excluded from the readout, and `finals`
/// restricts it further when given.
pub fn bfs_rpq(
    expr: &str,
    graph: &LabeledGraph,
    separate: bool,
    sources: &[NodeId],
    finals: Option<&[NodeId]>,
    cancel: Option<&CancelToken>,
) -> Result<BfsRpqResult, QueryError> {
    let regex_nfa = regex_to_min_dfa(expr)?.to_nfa();
    if sources.is_empty() {
        return Ok(if separate {
            BfsRpqResult::Pairs(HashSet::new())
        } else {
            BfsRpqResult::Vertices(HashSet::new())
        });
    }

    let d_regex = Decomposition::from_nfa(&regex_nfa);
    let d_graph = Decomposition::from_nfa(&graph.to_nfa(None, None));
    let sum = d_regex.direct_sum(&d_graph);

    let nr = d_regex.n_states();
    let nv = d_graph.n_states();
    let blocks = if separate { sources.len() } else { 1 };
    let height = blocks * nr;

    // Left block: one identity per source block, constant throughout the
    // search; row i always routes regex state i mod nr.
    let left = CsrMatrix::from_entries(height, nr, (0..height).map(|r| (r, r % nr)));

    let start_state = regex_nfa.starts()[0] as usize;
    let mut visited = RowMatrix::new(height, nv);
    let mut frontier = RowMatrix::new(height, nv);
    if separate {
        for (block, &source) in sources.iter().enumerate() {
            frontier.insert(block * nr + start_state, source as usize);
        }
    } else {
        for &source in sources {
            frontier.insert(start_state, source as usize);
        }
    }

    let mut rounds = 0usize;
    loop {
        if cancel.is_some_and(CancelToken::is_cancelled) {
            return Err(QueryError::Cancelled);
        }
        let prev = visited.nnz();

        // Only cells not yet visited in the graph block keep expanding.
        frontier.subtract(&visited)?;
        let mut next = frontier.clone();

        let combined = left.hstack(&frontier.to_csr())?;
        for (label, mat) in sum.mats() {
            let step = combined.mul(mat)?;
            let (step_left, step_right) = step.split_cols(nr);
            for (i, j) in step_left.iter() {
                // The regex advanced from (i mod nr) to j; fold the graph
                // half of row i onto the canonical row of state j.
                let target = (i / nr) * nr + j;
                next.union_row(target, step_right.row(i).iter().copied());
            }
            trace!(label = %label, step_nnz = step_right.nnz(), "bfs step");
        }

        visited.union(&frontier)?;
        frontier = next;
        rounds += 1;
        if visited.nnz() == prev {
            break;
        }
    }
    debug!(rounds, visited_nnz = visited.nnz(), "bfs rpq converged");

    let finals_filter: Option<HashSet<NodeId>> =
        finals.map(|f| f.iter().copied().collect());
    let admitted = |v: NodeId| finals_filter.as_ref().is_none_or(|f| f.contains(&v));

    if separate {
        let mut pairs = HashSet::new();
        for (block, &source) in sources.iter().enumerate() {
            for &f in regex_nfa.finals() {
                for col in visited.row(block * nr + f as usize) {
                    let v = col as NodeId;
                    if v != source && admitted(v) {
                        pairs.insert((source, v));
                    }
                }
            }
        }
        Ok(BfsRpqResult::Pairs(pairs))
    } else {
        let source_set: HashSet<NodeId> = sources.iter().copied().collect();
        let mut vertices = HashSet::new();
        for &f in regex_nfa.finals() {
            for col in visited.row(f as usize) {
                let v = col as NodeId;
                if !source_set.contains(&v) && admitted(v) {
                    vertices.insert(v);
                }
            }
        }
        Ok(BfsRpqResult::Vertices(vertices))
    }
}
