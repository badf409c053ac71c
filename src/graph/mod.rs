pub mod dot;
pub mod io;

use indexmap::IndexSet;

use crate::automata::nfa::Nfa;
use crate::automata::{Label, NodeId};

/// An edge-labeled directed multigraph over dense vertex ids.
///
/// Vertices are `0..node_count()`. Parallel edges with the same label are
/// idempotent: the edge set is deduplicated on insert, since multiplicity
/// never affects reachability.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LabeledGraph {
    node_count: usize,
    edges: IndexSet<(NodeId, String, NodeId)>,
}

impl LabeledGraph {
    /// An empty graph.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A graph with `n` isolated vertices.
    #[must_use]
    pub fn with_nodes(n: usize) -> Self {
        Self {
            node_count: n,
            edges: IndexSet::new(),
        }
    }

    /// Builds a graph from an edge list, allocating vertices as needed.
    #[must_use]
    pub fn from_edges<'a, I>(edges: I) -> Self
    where
        I: IntoIterator<Item = (NodeId, &'a str, NodeId)>,
    {
        let mut graph = Self::new();
        for (u, label, v) in edges {
            graph.add_edge(u, label, v);
        }
        graph
    }

    /// Adds a labeled edge, growing the vertex range to cover both ends.
    pub fn add_edge(&mut self, from: NodeId, label: &str, to: NodeId) {
        self.node_count = self.node_count.max(from as usize + 1).max(to as usize + 1);
        self.edges.insert((from, label.to_owned(), to));
    }

    /// Ensures the vertex range covers `0..=node`.
    pub fn add_node(&mut self, node: NodeId) {
        self.node_count = self.node_count.max(node as usize + 1);
    }

    #[must_use]
    pub fn node_count(&self) -> usize {
        self.node_count
    }

    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn nodes(&self) -> impl Iterator<Item = NodeId> {
        0..self.node_count as NodeId
    }

    pub fn edges(&self) -> impl Iterator<Item = (NodeId, &str, NodeId)> {
        self.edges.iter().map(|(u, l, v)| (*u, l.as_str(), *v))
    }

    /// The distinct edge labels, sorted.
    #[must_use]
    pub fn labels(&self) -> Vec<String> {
        let mut labels: IndexSet<&str> = IndexSet::new();
        for (_, label, _) in &self.edges {
            labels.insert(label);
        }
        let mut labels: Vec<String> = labels.into_iter().map(str::to_owned).collect();
        labels.sort_unstable();
        labels
    }

    /// Summary counts used by callers that only inspect shape.
    #[must_use]
    pub fn info(&self) -> GraphInfo {
        GraphInfo {
            nodes: self.node_count,
            edges: self.edges.len(),
            labels: self.labels(),
        }
    }

    /// Two cycles sharing the hub vertex `0`: one through `1..=n` under
    /// `label_a`, one through `n+1..=n+m` under `label_d`. The result has
    /// `n + m + 1` vertices.
    #[must_use]
    pub fn two_cycles(n: usize, m: usize, (label_a, label_d): (&str, &str)) -> Self {
        let mut graph = Self::with_nodes(n + m + 1);
        let n = n as NodeId;
        let m = m as NodeId;
        for i in 0..n {
            graph.add_edge(i, label_a, i + 1);
        }
        graph.add_edge(n, label_a, 0);
        for i in 0..m {
            let from = if i == 0 { 0 } else { n + i };
            graph.add_edge(from, label_d, n + i + 1);
        }
        graph.add_edge(n + m, label_d, 0);
        graph
    }

    /// Views the graph as an NFA: every vertex is a state, every labeled
    /// edge a transition. Start and final states default to the full vertex
    /// set; a caller may restrict either side. Pure data re-shaping: ids
    /// are preserved and nothing is minimized.
    #[must_use]
    pub fn to_nfa(&self, starts: Option<&[NodeId]>, finals: Option<&[NodeId]>) -> Nfa {
        let mut nfa = Nfa::with_states(self.node_count);
        for (u, label, v) in self.edges() {
            nfa.add_transition(u, Label::sym(label), v);
        }
        match starts {
            Some(starts) => starts.iter().for_each(|&s| nfa.add_start(s)),
            None => self.nodes().for_each(|s| nfa.add_start(s)),
        }
        match finals {
            Some(finals) => finals.iter().for_each(|&f| nfa.add_final(f)),
            None => self.nodes().for_each(|f| nfa.add_final(f)),
        }
        nfa
    }
}

/// Vertex, edge and label counts of a graph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GraphInfo {
    pub nodes: usize,
    pub edges: usize,
    /// Distinct labels, sorted.
    pub labels: Vec<String>,
}
