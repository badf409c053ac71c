use indexmap::IndexMap;

use crate::automata::dfa::determinize;
use crate::automata::min::minimize;
use crate::automata::nfa::Nfa;
use crate::errors::GrammarError;
use crate::grammar::cfg::Cfg;
use crate::grammar::ecfg::Ecfg;
use crate::matrix::Decomposition;

/// A recursive automaton: one NFA per nonterminal, with transitions labeled
/// over the mixed alphabet of terminals and nonterminals.
///
/// Each component automaton accepts exactly the language of the
/// nonterminal's [`Ecfg`] regex.
#[derive(Debug, Clone)]
pub struct RecursiveAutomaton {
    start: String,
    automata: IndexMap<String, Nfa>,
}

impl RecursiveAutomaton {
    /// Compiles every per-nonterminal regex of an ECFG into an NFA.
    #[must_use]
    pub fn from_ecfg(ecfg: &Ecfg) -> Self {
        let automata = ecfg
            .productions()
            .map(|(head, regex)| (head.to_owned(), Nfa::from_regex(regex)))
            .collect();
        Self {
            start: ecfg.start().to_owned(),
            automata,
        }
    }

    /// Convenience composition of [`Ecfg::from_cfg`] and
    /// [`Self::from_ecfg`].
    #[must_use]
    pub fn from_cfg(cfg: &Cfg) -> Self {
        Self::from_ecfg(&Ecfg::from_cfg(cfg))
    }

    /// Parses grammar text and compiles it.
    pub fn from_text(text: &str) -> Result<Self, GrammarError> {
        Ok(Self::from_cfg(&Cfg::from_text(text)?))
    }

    #[must_use]
    pub fn start(&self) -> &str {
        &self.start
    }

    pub fn automata(&self) -> impl Iterator<Item = (&str, &Nfa)> {
        self.automata.iter().map(|(head, nfa)| (head.as_str(), nfa))
    }

    /// The component automaton of one nonterminal.
    #[must_use]
    pub fn automaton(&self, nonterminal: &str) -> Option<&Nfa> {
        self.automata.get(nonterminal)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.automata.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.automata.is_empty()
    }

    /// Minimizes every component automaton. Optional; the query engines
    /// work on the raw Thompson automata too, minimization just shrinks the
    /// matrices derived from them.
    #[must_use]
    pub fn minimize(&self) -> Self {
        let automata = self
            .automata
            .iter()
            .map(|(head, nfa)| (head.clone(), minimize(&determinize(nfa)).to_nfa()))
            .collect();
        Self {
            start: self.start.clone(),
            automata,
        }
    }

    /// Materializes the per-nonterminal boolean decompositions.
    #[must_use]
    pub fn decompositions(&self) -> IndexMap<String, Decomposition> {
        self.automata
            .iter()
            .map(|(head, nfa)| (head.clone(), Decomposition::from_nfa(nfa)))
            .collect()
    }
}
