use indexmap::IndexMap;
use tracing::debug;

use crate::automata::nfa::Nfa;
use crate::automata::{Label, StateId};
use crate::cancel::CancelToken;
use crate::errors::QueryError;
use crate::matrix::sparse::CsrMatrix;

/// Boolean decomposition of a finite automaton: one square sparse matrix per
/// transition label, over a pinned ordering of the states.
///
/// `mats[label][i, j]` is nonzero iff the automaton steps from `states[i]` to
/// `states[j]` on `label`. A label with no matrix is the zero matrix of the
/// same shape; every operation over a union of alphabets treats it that way
/// rather than as an error. The `states` vector fixes the id ↔ state mapping
/// for all subsequent matrix operations, so derived decompositions document
/// how their ordering follows from the inputs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decomposition {
    states: Vec<StateId>,
    mats: IndexMap<Label, CsrMatrix>,
}

impl Decomposition {
    /// An empty decomposition over the given state ordering.
    #[must_use]
    pub fn new(states: Vec<StateId>) -> Self {
        Self {
            states,
            mats: IndexMap::new(),
        }
    }

    /// Decomposes an automaton. Epsilon transitions get their own matrix
    /// under [`Label::Eps`].
    #[must_use]
    pub fn from_nfa(nfa: &Nfa) -> Self {
        let n = nfa.state_count();
        let mut cells: IndexMap<Label, Vec<(usize, usize)>> = IndexMap::new();
        for from in 0..n {
            for tr in nfa.transitions(from as StateId) {
                cells
                    .entry(tr.label.clone())
                    .or_default()
                    .push((from, tr.to as usize));
            }
        }

        let mats = cells
            .into_iter()
            .map(|(label, entries)| (label, CsrMatrix::from_entries(n, n, entries)))
            .collect();
        Self {
            states: (0..n as StateId).collect(),
            mats,
        }
    }

    #[must_use]
    pub fn states(&self) -> &[StateId] {
        &self.states
    }

    /// Number of states, equal to the row and column count of every matrix.
    #[must_use]
    pub fn n_states(&self) -> usize {
        self.states.len()
    }

    /// The matrix for `label`, if any transition carries it.
    #[must_use]
    pub fn mat(&self, label: &Label) -> Option<&CsrMatrix> {
        self.mats.get(label)
    }

    /// The matrix for `label`, materializing the zero matrix when absent.
    #[must_use]
    pub fn mat_or_zero(&self, label: &Label) -> CsrMatrix {
        self.mats
            .get(label)
            .cloned()
            .unwrap_or_else(|| CsrMatrix::zero(self.n_states(), self.n_states()))
    }

    pub fn labels(&self) -> impl Iterator<Item = &Label> {
        self.mats.keys()
    }

    pub fn mats(&self) -> impl Iterator<Item = (&Label, &CsrMatrix)> {
        self.mats.iter()
    }

    /// Inserts the matrix for a label, replacing any previous one.
    pub fn insert(&mut self, label: Label, mat: CsrMatrix) {
        debug_assert_eq!(mat.shape(), (self.n_states(), self.n_states()));
        self.mats.insert(label, mat);
    }

    /// Block-diagonal composition: per label over the union of alphabets,
    /// `self`'s matrix in the upper-left block and `other`'s in the
    /// lower-right. The result's state list is the concatenation
    /// `states(self) ++ states(other)`; position `i` of `other` becomes
    /// position `n_states(self) + i`.
    #[must_use]
    pub fn direct_sum(&self, other: &Self) -> Self {
        let n1 = self.n_states();
        let n2 = other.n_states();
        let n = n1 + n2;

        let mut states = Vec::with_capacity(n);
        states.extend_from_slice(&self.states);
        states.extend_from_slice(&other.states);

        let mut mats = IndexMap::new();
        for label in self.union_labels(other) {
            let mut entries = Vec::new();
            if let Some(m) = self.mats.get(&label) {
                entries.extend(m.iter());
            }
            if let Some(m) = other.mats.get(&label) {
                entries.extend(m.iter().map(|(r, c)| (r + n1, c + n1)));
            }
            mats.insert(label, CsrMatrix::from_entries(n, n, entries));
        }
        Self { states, mats }
    }

    /// Kronecker product: per label over the union of alphabets, with an
    /// absent side standing in as the zero matrix. The result's ordering is
    /// the lexicographic pairing: the pair at positions `(i, j)` of the
    /// inputs sits at position `i · n_states(other) + j`.
    #[must_use]
    pub fn kronecker(&self, other: &Self) -> Self {
        let n = self.n_states() * other.n_states();
        let mut mats = IndexMap::new();
        for label in self.union_labels(other) {
            let product = match (self.mats.get(&label), other.mats.get(&label)) {
                (Some(a), Some(b)) => a.kron(b),
                // One side is all zero, so the product is too.
                _ => CsrMatrix::zero(n, n),
            };
            mats.insert(label, product);
        }
        Self {
            states: (0..n as StateId).collect(),
            mats,
        }
    }

    /// Reflexive-transitive closure over edges collapsed across labels:
    /// sums every per-label matrix (epsilon included) and squares until the
    /// nonzero count stops growing. No identity is added; callers wanting
    /// reflexive pairs add it explicitly.
    pub fn transitive_closure(
        &self,
        cancel: Option<&CancelToken>,
    ) -> Result<CsrMatrix, QueryError> {
        let n = self.n_states();
        let mut closure = CsrMatrix::zero(n, n);
        for mat in self.mats.values() {
            closure = closure.add(mat)?;
        }

        let mut rounds = 0usize;
        let mut nnz = usize::MAX;
        while nnz != closure.nnz() {
            if cancel.is_some_and(CancelToken::is_cancelled) {
                return Err(QueryError::Cancelled);
            }
            nnz = closure.nnz();
            closure = closure.add(&closure.mul(&closure)?)?;
            rounds += 1;
        }
        debug!(rounds, nnz = closure.nnz(), "transitive closure converged");
        Ok(closure)
    }

    /// Materializes the decomposition back into an automaton with the given
    /// start and final state sets.
    #[must_use]
    pub fn to_nfa(&self, starts: Vec<StateId>, finals: Vec<StateId>) -> Nfa {
        let mut nfa = Nfa::with_states(self.n_states());
        for (label, mat) in &self.mats {
            for (from, to) in mat.iter() {
                nfa.add_transition(from as StateId, label.clone(), to as StateId);
            }
        }
        for s in starts {
            nfa.add_start(s);
        }
        for f in finals {
            nfa.add_final(f);
        }
        nfa
    }

    fn union_labels(&self, other: &Self) -> Vec<Label> {
        let mut labels: Vec<Label> = self.mats.keys().cloned().collect();
        for label in other.mats.keys() {
            if !self.mats.contains_key(label) {
                labels.push(label.clone());
            }
        }
        labels
    }
}
