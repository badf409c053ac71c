use indexmap::IndexSet;

use crate::automata::{Label, StateId, Transition};
use crate::regex::Ast;

/// A nondeterministic finite automaton with epsilon transitions.
///
/// States are dense ids `0..state_count()`. Unlike a textbook automaton the
/// start set may hold many states: a graph viewed as an automaton starts
/// (and accepts) everywhere by default.
#[derive(Debug, Clone, Default)]
pub struct Nfa {
    /// Adjacency lists for efficient traversal.
    adjacency: Vec<Vec<Transition>>,
    starts: Vec<StateId>,
    finals: Vec<StateId>,
}

impl Nfa {
    /// An automaton with no states.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// An automaton with `n` states and no transitions.
    #[must_use]
    pub fn with_states(n: usize) -> Self {
        Self {
            adjacency: vec![Vec::new(); n],
            starts: Vec::new(),
            finals: Vec::new(),
        }
    }

    #[must_use]
    pub fn state_count(&self) -> usize {
        self.adjacency.len()
    }

    /// Adds a fresh state and returns its id.
    pub fn add_state(&mut self) -> StateId {
        let id = self.adjacency.len() as StateId;
        self.adjacency.push(Vec::new());
        id
    }

    /// Adds an edge `from -> to` with the given label. Both endpoints must
    /// already exist.
    pub fn add_transition(&mut self, from: StateId, label: Label, to: StateId) {
        debug_assert!((to as usize) < self.adjacency.len());
        self.adjacency[from as usize].push(Transition { to, label });
    }

    /// Marks a state as a start state. Idempotent.
    pub fn add_start(&mut self, state: StateId) {
        debug_assert!((state as usize) < self.adjacency.len());
        if !self.starts.contains(&state) {
            self.starts.push(state);
        }
    }

    /// Marks a state as a final state. Idempotent.
    pub fn add_final(&mut self, state: StateId) {
        debug_assert!((state as usize) < self.adjacency.len());
        if !self.finals.contains(&state) {
            self.finals.push(state);
        }
    }

    #[must_use]
    pub fn starts(&self) -> &[StateId] {
        &self.starts
    }

    #[must_use]
    pub fn finals(&self) -> &[StateId] {
        &self.finals
    }

    #[must_use]
    pub fn is_start(&self, state: StateId) -> bool {
        self.starts.contains(&state)
    }

    #[must_use]
    pub fn is_final(&self, state: StateId) -> bool {
        self.finals.contains(&state)
    }

    /// The outgoing transitions from the specified state.
    #[must_use]
    pub fn transitions(&self, state: StateId) -> &[Transition] {
        &self.adjacency[state as usize]
    }

    /// Flattened list of `(from, label, to)` edges.
    pub fn edges(&self) -> impl Iterator<Item = (StateId, &Label, StateId)> {
        self.adjacency.iter().enumerate().flat_map(|(from, row)| {
            row.iter().map(move |tr| (from as StateId, &tr.label, tr.to))
        })
    }

    /// Computes the symbol alphabet of this automaton, sorted by name.
    /// Epsilon is not a symbol and never appears here.
    #[must_use]
    pub fn alphabet(&self) -> Vec<String> {
        let mut symbols: IndexSet<&str> = IndexSet::new();
        for row in &self.adjacency {
            for tr in row {
                if let Label::Sym(s) = &tr.label {
                    symbols.insert(s);
                }
            }
        }
        let mut symbols: Vec<String> = symbols.into_iter().map(str::to_owned).collect();
        symbols.sort_unstable();
        symbols
    }

    /// Builds an NFA from a regex AST using Thompson's construction.
    #[must_use]
    pub fn from_regex(ast: &Ast) -> Self {
        let mut builder = Builder::default();
        let fragment = builder.build(ast);
        builder.finalize(fragment)
    }
}

/// Start and accepting states of a partially built NFA component.
#[derive(Debug, Clone)]
struct Fragment {
    start: StateId,
    accepts: Vec<StateId>,
}

/// Internal builder turning an AST into an NFA one fragment at a time.
#[derive(Default)]
struct Builder {
    adjacency: Vec<Vec<Transition>>,
}

impl Builder {
    fn new_state(&mut self) -> StateId {
        let id = self.adjacency.len() as StateId;
        self.adjacency.push(Vec::new());
        id
    }

    fn add_edge(&mut self, from: StateId, to: StateId, label: Label) {
        self.adjacency[from as usize].push(Transition { to, label });
    }

    fn build(&mut self, ast: &Ast) -> Fragment {
        match ast {
            Ast::Epsilon => self.build_leaf(Label::Eps),
            Ast::Sym(name) => self.build_leaf(Label::sym(name.clone())),
            Ast::Concat(lhs, rhs) => self.build_concat(lhs, rhs),
            Ast::Alt(lhs, rhs) => self.build_alternation(lhs, rhs),
            Ast::Star(inner) => self.build_star(inner),
            Ast::Plus(inner) => self.build_plus(inner),
            Ast::Opt(inner) => self.build_opt(inner),
        }
    }

    /// A two-state fragment with a single labeled edge.
    fn build_leaf(&mut self, label: Label) -> Fragment {
        let start = self.new_state();
        let accept = self.new_state();
        self.add_edge(start, accept, label);
        Fragment {
            start,
            accepts: vec![accept],
        }
    }

    fn build_concat(&mut self, lhs: &Ast, rhs: &Ast) -> Fragment {
        let left = self.build(lhs);
        let right = self.build(rhs);
        for &accept in &left.accepts {
            self.add_edge(accept, right.start, Label::Eps);
        }
        Fragment {
            start: left.start,
            accepts: right.accepts,
        }
    }

    fn build_alternation(&mut self, lhs: &Ast, rhs: &Ast) -> Fragment {
        let left = self.build(lhs);
        let right = self.build(rhs);
        let start = self.new_state();
        let accept = self.new_state();

        self.add_edge(start, left.start, Label::Eps);
        self.add_edge(start, right.start, Label::Eps);
        for &state in left.accepts.iter().chain(right.accepts.iter()) {
            self.add_edge(state, accept, Label::Eps);
        }

        Fragment {
            start,
            accepts: vec![accept],
        }
    }

    fn build_star(&mut self, inner: &Ast) -> Fragment {
        let frag = self.build(inner);
        let start = self.new_state();
        let accept = self.new_state();

        self.add_edge(start, frag.start, Label::Eps);
        self.add_edge(start, accept, Label::Eps);
        for &state in &frag.accepts {
            self.add_edge(state, frag.start, Label::Eps);
            self.add_edge(state, accept, Label::Eps);
        }

        Fragment {
            start,
            accepts: vec![accept],
        }
    }

    fn build_plus(&mut self, inner: &Ast) -> Fragment {
        let frag = self.build(inner);
        let start = self.new_state();
        let accept = self.new_state();

        self.add_edge(start, frag.start, Label::Eps);
        for &state in &frag.accepts {
            self.add_edge(state, frag.start, Label::Eps);
            self.add_edge(state, accept, Label::Eps);
        }

        Fragment {
            start,
            accepts: vec![accept],
        }
    }

    fn build_opt(&mut self, inner: &Ast) -> Fragment {
        let frag = self.build(inner);
        let start = self.new_state();
        let accept = self.new_state();

        self.add_edge(start, frag.start, Label::Eps);
        self.add_edge(start, accept, Label::Eps);
        for &state in &frag.accepts {
            self.add_edge(state, accept, Label::Eps);
        }

        Fragment {
            start,
            accepts: vec![accept],
        }
    }

    fn finalize(self, fragment: Fragment) -> Nfa {
        let mut accepts = fragment.accepts;
        accepts.sort_unstable();
        accepts.dedup();
        Nfa {
            adjacency: self.adjacency,
            starts: vec![fragment.start],
            finals: accepts,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::automata::sim;

    fn accepts(expr: &str, word: &[&str]) -> bool {
        let nfa = Nfa::from_regex(&Ast::build(expr).unwrap());
        sim::nfa_accepts(&nfa, word)
    }

    #[test]
    fn symbol_leaf() {
        assert!(accepts("a", &["a"]));
        assert!(!accepts("a", &["b"]));
        assert!(!accepts("a", &[]));
    }

    #[test]
    fn concatenation_orders_symbols() {
        assert!(accepts("a.b", &["a", "b"]));
        assert!(!accepts("a.b", &["b", "a"]));
    }

    #[test]
    fn star_accepts_empty() {
        assert!(accepts("a*", &[]));
        assert!(accepts("a*", &["a", "a", "a"]));
        assert!(!accepts("a*", &["b"]));
    }

    #[test]
    fn plus_requires_one() {
        assert!(!accepts("a+", &[]));
        assert!(accepts("a+", &["a"]));
        assert!(accepts("a+", &["a", "a"]));
    }

    #[test]
    fn opt_is_zero_or_one() {
        assert!(accepts("a?", &[]));
        assert!(accepts("a?", &["a"]));
        assert!(!accepts("a?", &["a", "a"]));
    }

    #[test]
    fn epsilon_matches_empty_word() {
        assert!(accepts("$", &[]));
        assert!(!accepts("$", &["a"]));
    }

    #[test]
    fn multichar_labels_are_atomic() {
        assert!(accepts("go.stop", &["go", "stop"]));
        assert!(!accepts("go.stop", &["g", "o"]));
    }
}
