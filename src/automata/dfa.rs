use std::collections::{HashSet, VecDeque};

use indexmap::IndexMap;

use crate::automata::nfa::Nfa;
use crate::automata::{Label, StateId};
use crate::automata::sim;

/// Deterministic finite automaton produced by subset construction.
#[derive(Debug, Clone)]
pub struct Dfa {
    /// All DFA state identifiers, dense from zero.
    pub states: Vec<StateId>,
    /// Start state identifier.
    pub start: StateId,
    /// Accepting state identifiers.
    pub accepts: Vec<StateId>,
    /// Transition table indexed by state then alphabet position.
    /// [`None`] indicates a transition into the implicit dead state.
    pub trans: Vec<Vec<Option<StateId>>>,
    /// The symbol alphabet the table columns refer to, sorted.
    pub alphabet: Vec<String>,
}

impl Dfa {
    #[must_use]
    pub fn is_accepting(&self, state: StateId) -> bool {
        self.accepts.contains(&state)
    }

    /// Views the DFA as an [`Nfa`]: dense states, one start, labeled
    /// transitions where the table is defined. Dead moves disappear.
    #[must_use]
    pub fn to_nfa(&self) -> Nfa {
        let mut nfa = Nfa::with_states(self.states.len());
        for (from, row) in self.trans.iter().enumerate() {
            for (sym_idx, target) in row.iter().enumerate() {
                if let Some(to) = target {
                    nfa.add_transition(
                        from as StateId,
                        Label::sym(self.alphabet[sym_idx].clone()),
                        *to,
                    );
                }
            }
        }
        nfa.add_start(self.start);
        for &f in &self.accepts {
            nfa.add_final(f);
        }
        nfa
    }

    /// Runs the DFA over a word of labels.
    #[must_use]
    pub fn accepts_word(&self, word: &[&str]) -> bool {
        let mut state = self.start;
        for symbol in word {
            let Ok(idx) = self.alphabet.binary_search_by(|s| s.as_str().cmp(symbol)) else {
                return false;
            };
            match self.trans[state as usize][idx] {
                Some(next) => state = next,
                None => return false,
            }
        }
        self.is_accepting(state)
    }
}

/// Determinizes an NFA via subset construction. The start subset is the
/// epsilon closure of the whole start set.
#[must_use]
pub fn determinize(nfa: &Nfa) -> Dfa {
    Determinizer::new(nfa).run()
}

/// Converts a set of state ids into a sorted vector key.
fn set_to_key(set: HashSet<StateId>) -> Vec<StateId> {
    let mut vec: Vec<StateId> = set.into_iter().collect();
    vec.sort_unstable();
    vec
}

/// Subset-construction worklist over sorted state-set keys.
struct Determinizer<'a> {
    nfa: &'a Nfa,
    alphabet: Vec<String>,
    /// Mapping from NFA state subsets to DFA state ids; insertion order is
    /// the dense id assignment.
    map: IndexMap<Vec<StateId>, StateId>,
    queue: VecDeque<Vec<StateId>>,
    transitions: Vec<Vec<Option<StateId>>>,
}

impl<'a> Determinizer<'a> {
    fn new(nfa: &'a Nfa) -> Self {
        let alphabet = nfa.alphabet();
        let mut map = IndexMap::new();
        let mut queue = VecDeque::new();

        let seed: HashSet<StateId> = nfa.starts().iter().copied().collect();
        let start_key = set_to_key(sim::epsilon_closure(&seed, nfa));
        map.insert(start_key.clone(), 0);
        queue.push_back(start_key);

        Self {
            nfa,
            alphabet,
            map,
            queue,
            transitions: Vec::new(),
        }
    }

    fn run(mut self) -> Dfa {
        while let Some(key) = self.queue.pop_front() {
            let state_id = self.map[&key];
            self.ensure_capacity(state_id as usize + 1);
            let subset: HashSet<StateId> = key.iter().copied().collect();

            for symbol_idx in 0..self.alphabet.len() {
                let symbol = self.alphabet[symbol_idx].clone();
                let next = self.advance_subset(&subset, &symbol);
                self.transitions[state_id as usize][symbol_idx] = next;
            }
        }

        let accepts = self.collect_accepting();
        let states: Vec<StateId> = (0..self.map.len() as StateId).collect();
        Dfa {
            states,
            start: 0,
            accepts,
            trans: self.transitions,
            alphabet: self.alphabet,
        }
    }

    fn ensure_capacity(&mut self, len: usize) {
        while self.transitions.len() < len {
            self.transitions.push(vec![None; self.alphabet.len()]);
        }
    }

    fn advance_subset(&mut self, subset: &HashSet<StateId>, symbol: &str) -> Option<StateId> {
        let moved = sim::move_on(subset, symbol, self.nfa);
        if moved.is_empty() {
            return None;
        }
        let closure = sim::epsilon_closure(&moved, self.nfa);
        Some(self.lookup_or_insert(closure))
    }

    fn lookup_or_insert(&mut self, subset: HashSet<StateId>) -> StateId {
        let key = set_to_key(subset);
        if let Some(id) = self.map.get(&key) {
            *id
        } else {
            let new_id = self.map.len() as StateId;
            self.map.insert(key.clone(), new_id);
            self.queue.push_back(key);
            new_id
        }
    }

    fn collect_accepting(&self) -> Vec<StateId> {
        self.map
            .iter()
            .filter_map(|(subset, id)| {
                let accepting = subset.iter().any(|state| self.nfa.is_final(*state));
                accepting.then_some(*id)
            })
            .collect()
    }
}
