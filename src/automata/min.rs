use std::collections::{HashSet, VecDeque};

use crate::automata::StateId;
use crate::automata::dfa::Dfa;

/// Minimizes a DFA using Hopcroft-style partition refinement.
///
/// The refinement runs over a completed transition table (a synthetic dead
/// state absorbs the `None` moves); the dead class is dropped again on the
/// way out, so the result keeps the sparse `Option` table form.
#[must_use]
pub fn minimize(dfa: &Dfa) -> Dfa {
    if dfa.states.len() <= 1 {
        return dfa.clone();
    }
    PartitionRefinement::new(dfa).run()
}

struct PartitionRefinement<'a> {
    dfa: &'a Dfa,
    /// Completed transition table; row `dead` self-loops on every symbol.
    table: Vec<Vec<usize>>,
    /// Index of the synthetic dead state, if one was needed.
    dead: Option<usize>,
    /// Current partitions of states. Blocks are never empty.
    partitions: Vec<Vec<usize>>,
    /// Mapping from state to its partition class (index in `partitions`).
    state_class: Vec<usize>,
    /// Worklist of (partition class, symbol index) pairs to process.
    worklist: VecDeque<(usize, usize)>,
    accepting: HashSet<usize>,
}

impl<'a> PartitionRefinement<'a> {
    fn new(dfa: &'a Dfa) -> Self {
        let n = dfa.states.len();
        let needs_dead = dfa
            .trans
            .iter()
            .any(|row| row.iter().any(Option::is_none));
        let dead = needs_dead.then_some(n);
        let total = n + usize::from(needs_dead);

        let mut table = Vec::with_capacity(total);
        for row in &dfa.trans {
            table.push(
                row.iter()
                    .map(|t| t.map_or(n, |s| s as usize))
                    .collect::<Vec<_>>(),
            );
        }
        if needs_dead {
            table.push(vec![n; dfa.alphabet.len()]);
        }

        let accepting: HashSet<usize> = dfa.accepts.iter().map(|&s| s as usize).collect();
        let mut accepting_block = Vec::new();
        let mut rejecting_block = Vec::new();
        for state in 0..total {
            if accepting.contains(&state) {
                accepting_block.push(state);
            } else {
                rejecting_block.push(state);
            }
        }
        let mut partitions = Vec::new();
        if !accepting_block.is_empty() {
            partitions.push(accepting_block);
        }
        if !rejecting_block.is_empty() {
            partitions.push(rejecting_block);
        }

        let mut state_class = vec![0; total];
        for (class, block) in partitions.iter().enumerate() {
            for &state in block {
                state_class[state] = class;
            }
        }

        let mut worklist = VecDeque::new();
        for class_idx in 0..partitions.len() {
            for symbol_idx in 0..dfa.alphabet.len() {
                worklist.push_back((class_idx, symbol_idx));
            }
        }

        Self {
            dfa,
            table,
            dead,
            partitions,
            state_class,
            worklist,
            accepting,
        }
    }

    fn run(mut self) -> Dfa {
        while let Some((class_idx, symbol_idx)) = self.worklist.pop_front() {
            let involved = self.collect_involved(class_idx, symbol_idx);
            if involved.is_empty() {
                continue;
            }
            let splits = self.split_partitions(&involved);
            self.enqueue_splits(splits);
        }
        self.build_minimized()
    }

    /// States whose move on `symbol_idx` lands inside class `class_idx`.
    fn collect_involved(&self, class_idx: usize, symbol_idx: usize) -> HashSet<usize> {
        let mut involved = HashSet::new();
        for (state, row) in self.table.iter().enumerate() {
            if self.state_class[row[symbol_idx]] == class_idx {
                involved.insert(state);
            }
        }
        involved
    }

    fn split_partitions(&mut self, involved: &HashSet<usize>) -> Vec<usize> {
        let mut split_targets = Vec::new();
        let mut idx = 0;
        while idx < self.partitions.len() {
            let block = self.partitions[idx].as_slice();
            let (in_part, out_part): (Vec<usize>, Vec<usize>) =
                block.iter().copied().partition(|state| involved.contains(state));
            if in_part.is_empty() || out_part.is_empty() {
                idx += 1;
                continue;
            }

            self.partitions[idx] = in_part;
            let new_idx = self.partitions.len();
            self.partitions.push(out_part);
            self.relabel_block(idx);
            self.relabel_block(new_idx);

            // Refining against the smaller half suffices.
            let push_idx = if self.partitions[idx].len() < self.partitions[new_idx].len() {
                idx
            } else {
                new_idx
            };
            split_targets.push(push_idx);
            idx += 1;
        }
        split_targets
    }

    fn relabel_block(&mut self, block_idx: usize) {
        for &state in &self.partitions[block_idx] {
            self.state_class[state] = block_idx;
        }
    }

    fn enqueue_splits(&mut self, splits: Vec<usize>) {
        for idx in splits {
            for symbol_idx in 0..self.dfa.alphabet.len() {
                self.worklist.push_back((idx, symbol_idx));
            }
        }
    }

    fn build_minimized(self) -> Dfa {
        let start_class = self.state_class[self.dfa.start as usize];
        // The class holding the synthetic dead state accepts nothing, so it
        // can vanish, unless the whole language is empty and the start
        // state itself sits in it.
        let dropped = self
            .dead
            .map(|dead| self.state_class[dead])
            .filter(|&dead_class| dead_class != start_class);

        let mut class_to_id = vec![None; self.partitions.len()];
        let mut next = 0 as StateId;
        for class_idx in 0..self.partitions.len() {
            if Some(class_idx) == dropped {
                continue;
            }
            class_to_id[class_idx] = Some(next);
            next += 1;
        }

        let mut trans = Vec::with_capacity(next as usize);
        let mut accepts = Vec::new();
        for (class_idx, block) in self.partitions.iter().enumerate() {
            if Some(class_idx) == dropped {
                continue;
            }
            let repr = block[0];
            let row = self.table[repr]
                .iter()
                .map(|&target| class_to_id[self.state_class[target]])
                .collect();
            trans.push(row);
            if block.iter().any(|state| self.accepting.contains(state)) {
                accepts.push(class_to_id[class_idx].unwrap());
            }
        }
        accepts.sort_unstable();

        Dfa {
            states: (0..next).collect(),
            start: class_to_id[start_class].unwrap(),
            accepts,
            trans,
            alphabet: self.dfa.alphabet.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::automata::dfa::determinize;
    use crate::automata::nfa::Nfa;
    use crate::regex::Ast;

    fn min_dfa(expr: &str) -> Dfa {
        minimize(&determinize(&Nfa::from_regex(&Ast::build(expr).unwrap())))
    }

    #[test]
    fn star_minimizes_to_single_state() {
        let dfa = min_dfa("a*");
        assert_eq!(dfa.states.len(), 1);
        assert_eq!(dfa.accepts, vec![dfa.start]);
        assert!(dfa.accepts_word(&[]));
        assert!(dfa.accepts_word(&["a", "a"]));
    }

    #[test]
    fn language_survives_minimization() {
        let dfa = min_dfa("(a|b)*.a.b.b");
        assert!(dfa.accepts_word(&["a", "b", "b"]));
        assert!(dfa.accepts_word(&["a", "a", "b", "b"]));
        assert!(!dfa.accepts_word(&["a", "b"]));
    }

    #[test]
    fn minimization_merges_equivalent_branches() {
        // (a.c)|(b.c): the two middle states are equivalent.
        let full = determinize(&Nfa::from_regex(&Ast::build("(a.c)|(b.c)").unwrap()));
        let min = minimize(&full);
        assert!(min.states.len() < full.states.len());
        assert!(min.accepts_word(&["a", "c"]));
        assert!(min.accepts_word(&["b", "c"]));
        assert!(!min.accepts_word(&["a", "b"]));
    }

    #[test]
    fn prefix_regex_keeps_loop() {
        let dfa = min_dfa("c*.a.b");
        assert!(dfa.accepts_word(&["a", "b"]));
        assert!(dfa.accepts_word(&["c", "c", "a", "b"]));
        assert!(!dfa.accepts_word(&["c"]));
    }
}
