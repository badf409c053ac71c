use std::collections::{HashSet, VecDeque};

use crate::automata::dfa::{Dfa, determinize};
use crate::automata::nfa::Nfa;
use crate::automata::{Label, StateId};

/// All states reachable from `seed` through epsilon transitions alone.
#[must_use]
pub fn epsilon_closure(seed: &HashSet<StateId>, nfa: &Nfa) -> HashSet<StateId> {
    let mut closure = seed.clone();
    let mut stack: Vec<StateId> = seed.iter().copied().collect();
    while let Some(state) = stack.pop() {
        for tr in nfa.transitions(state) {
            if tr.label == Label::Eps && closure.insert(tr.to) {
                stack.push(tr.to);
            }
        }
    }
    closure
}

/// One synchronous step on `symbol` from every state in `states`.
#[must_use]
pub fn move_on(states: &HashSet<StateId>, symbol: &str, nfa: &Nfa) -> HashSet<StateId> {
    let mut frontier = HashSet::new();
    for state in states {
        for tr in nfa.transitions(*state) {
            if tr.label.name() == Some(symbol) {
                frontier.insert(tr.to);
            }
        }
    }
    frontier
}

/// Whether the NFA accepts the given word of labels, starting from its
/// whole start set.
#[must_use]
pub fn nfa_accepts(nfa: &Nfa, word: &[&str]) -> bool {
    let mut current: HashSet<StateId> = nfa.starts().iter().copied().collect();
    current = epsilon_closure(&current, nfa);
    for symbol in word {
        let moved = move_on(&current, symbol, nfa);
        current = epsilon_closure(&moved, nfa);
        if current.is_empty() {
            return false;
        }
    }
    current.iter().any(|state| nfa.is_final(*state))
}

/// Whether two automata accept the same language.
///
/// Both sides are determinized and walked in lockstep over the union
/// alphabet; `None` stands for the dead state of either side. The automata
/// differ exactly when some reachable pair disagrees on acceptance.
#[must_use]
pub fn equivalent(lhs: &Nfa, rhs: &Nfa) -> bool {
    let a = determinize(lhs);
    let b = determinize(rhs);

    let mut alphabet: Vec<String> = a.alphabet.clone();
    for s in &b.alphabet {
        if !alphabet.contains(s) {
            alphabet.push(s.clone());
        }
    }

    let step = |dfa: &Dfa, state: Option<StateId>, symbol: &str| -> Option<StateId> {
        let state = state?;
        let idx = dfa.alphabet.binary_search_by(|s| s.as_str().cmp(symbol)).ok()?;
        dfa.trans[state as usize][idx]
    };
    let accepting = |dfa: &Dfa, state: Option<StateId>| state.is_some_and(|s| dfa.is_accepting(s));

    let start = (Some(a.start), Some(b.start));
    let mut seen = HashSet::new();
    seen.insert(start);
    let mut queue = VecDeque::new();
    queue.push_back(start);
    while let Some((sa, sb)) = queue.pop_front() {
        if accepting(&a, sa) != accepting(&b, sb) {
            return false;
        }
        for symbol in &alphabet {
            let next = (step(&a, sa, symbol), step(&b, sb, symbol));
            if next != (None, None) && seen.insert(next) {
                queue.push_back(next);
            }
        }
    }
    true
}
