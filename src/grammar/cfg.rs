use std::collections::{BTreeSet, HashSet, VecDeque};
use std::fmt;

use indexmap::{IndexMap, IndexSet};

use crate::errors::GrammarError;

/// A grammar symbol. The text format distinguishes the two kinds by case:
/// uppercase-leading tokens are nonterminals, everything else is a terminal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Symbol {
    /// A terminal, i.e. an edge label of the queried graph.
    Term(String),
    /// A nonterminal of the grammar.
    Nonterm(String),
}

impl Symbol {
    #[must_use]
    pub fn term(name: impl Into<String>) -> Self {
        Symbol::Term(name.into())
    }

    #[must_use]
    pub fn nonterm(name: impl Into<String>) -> Self {
        Symbol::Nonterm(name.into())
    }

    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Symbol::Term(s) | Symbol::Nonterm(s) => s,
        }
    }

    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Symbol::Term(_))
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// A single production `head -> body`. The empty body derives ε.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Production {
    pub head: String,
    pub body: Vec<Symbol>,
}

impl Production {
    #[must_use]
    pub fn new(head: impl Into<String>, body: Vec<Symbol>) -> Self {
        Self {
            head: head.into(),
            body,
        }
    }
}

/// A context-free grammar with interned symbol tables.
///
/// Grammars are immutable across a query; construction goes through
/// [`Cfg::from_text`] or repeated [`Cfg::add_production`]. Duplicate
/// productions collapse.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cfg {
    start: String,
    productions: IndexSet<Production>,
    nonterminals: IndexSet<String>,
    terminals: IndexSet<String>,
}

impl Cfg {
    /// An empty grammar with the given start symbol.
    #[must_use]
    pub fn new(start: impl Into<String>) -> Self {
        let start = start.into();
        let mut nonterminals = IndexSet::new();
        nonterminals.insert(start.clone());
        Self {
            start,
            productions: IndexSet::new(),
            nonterminals,
            terminals: IndexSet::new(),
        }
    }

    /// Parses grammar text with start symbol `S`.
    ///
    /// One production per line: head and body separated by `->`, body tokens
    /// whitespace-separated, `|` for alternatives and `$` for ε.
    /// `#` starts a comment; blank lines are ignored.
    ///
    /// # Errors
    ///
    /// Returns a [`GrammarError`] naming the offending 1-indexed line.
    pub fn from_text(text: &str) -> Result<Self, GrammarError> {
        Self::from_text_with_start(text, "S")
    }

    /// Parses grammar text with an explicit start symbol.
    pub fn from_text_with_start(text: &str, start: &str) -> Result<Self, GrammarError> {
        let mut cfg = Cfg::new(start);
        for (idx, raw) in text.lines().enumerate() {
            let line_no = idx + 1;
            let line = raw.split('#').next().unwrap_or("").trim();
            if line.is_empty() {
                continue;
            }
            let Some((head, body)) = line.split_once("->") else {
                return Err(GrammarError::new(line_no, "missing `->`"));
            };
            let head = head.trim();
            if head.split_whitespace().count() != 1 {
                return Err(GrammarError::new(line_no, "expected a single head symbol"));
            }
            if !is_nonterminal_token(head) {
                return Err(GrammarError::new(
                    line_no,
                    format!("head {head:?} must be uppercase-leading"),
                ));
            }
            for alternative in body.split('|') {
                let tokens: Vec<&str> = alternative.split_whitespace().collect();
                if tokens.is_empty() {
                    return Err(GrammarError::new(
                        line_no,
                        "empty alternative; write `$` for the empty word",
                    ));
                }
                let body: Vec<Symbol> = tokens
                    .into_iter()
                    .filter(|tok| *tok != "$")
                    .map(|tok| {
                        if is_nonterminal_token(tok) {
                            Symbol::nonterm(tok)
                        } else {
                            Symbol::term(tok)
                        }
                    })
                    .collect();
                cfg.add_production(Production::new(head, body));
            }
        }
        Ok(cfg)
    }

    /// Adds a production, registering its symbols. Duplicates are ignored.
    pub fn add_production(&mut self, production: Production) {
        self.nonterminals.insert(production.head.clone());
        for symbol in &production.body {
            match symbol {
                Symbol::Term(name) => {
                    self.terminals.insert(name.clone());
                }
                Symbol::Nonterm(name) => {
                    self.nonterminals.insert(name.clone());
                }
            }
        }
        self.productions.insert(production);
    }

    #[must_use]
    pub fn start(&self) -> &str {
        &self.start
    }

    pub fn productions(&self) -> impl Iterator<Item = &Production> {
        self.productions.iter()
    }

    #[must_use]
    pub fn production_count(&self) -> usize {
        self.productions.len()
    }

    #[must_use]
    pub fn nonterminals(&self) -> &IndexSet<String> {
        &self.nonterminals
    }

    #[must_use]
    pub fn terminals(&self) -> &IndexSet<String> {
        &self.terminals
    }

    #[must_use]
    pub fn has_nonterminal(&self, name: &str) -> bool {
        self.nonterminals.contains(name)
    }

    /// Enumerates the words of the language up to `max_len` symbols, as
    /// terminal sequences.
    ///
    /// Breadth-first search over leftmost derivations. Sentential forms
    /// whose minimal terminal yield already exceeds `max_len` are pruned
    /// (this also discards forms containing non-generating nonterminals),
    /// and form length is capped at `2·max_len + 4` to bound derivations
    /// that pump ε-nonterminals. Intended for small grammars, tests and
    /// bounded language comparisons.
    #[must_use]
    pub fn words(&self, max_len: usize) -> BTreeSet<Vec<String>> {
        let min_yield = self.min_terminal_yield();
        let form_cap = max_len * 2 + 4;

        let weight = |form: &[Symbol]| -> usize {
            form.iter()
                .map(|s| match s {
                    Symbol::Term(_) => 1,
                    Symbol::Nonterm(n) => min_yield.get(n.as_str()).copied().unwrap_or(usize::MAX),
                })
                .fold(0usize, usize::saturating_add)
        };

        let mut words = BTreeSet::new();
        let start_form = vec![Symbol::nonterm(self.start.clone())];
        if weight(&start_form) > max_len {
            return words;
        }
        let mut seen: HashSet<Vec<Symbol>> = HashSet::new();
        seen.insert(start_form.clone());
        let mut queue: VecDeque<Vec<Symbol>> = VecDeque::new();
        queue.push_back(start_form);

        while let Some(form) = queue.pop_front() {
            let Some(at) = form.iter().position(|s| !s.is_terminal()) else {
                words.insert(form.into_iter().map(|s| s.name().to_owned()).collect());
                continue;
            };
            let head = form[at].name().to_owned();
            for production in &self.productions {
                if production.head != head {
                    continue;
                }
                let mut next = Vec::with_capacity(form.len() + production.body.len());
                next.extend_from_slice(&form[..at]);
                next.extend_from_slice(&production.body);
                next.extend_from_slice(&form[at + 1..]);
                if next.len() > form_cap || weight(&next) > max_len {
                    continue;
                }
                if seen.insert(next.clone()) {
                    queue.push_back(next);
                }
            }
        }
        words
    }

    /// Shortest terminal length derivable from each nonterminal;
    /// non-generating nonterminals stay at `usize::MAX`.
    fn min_terminal_yield(&self) -> IndexMap<&str, usize> {
        let mut min_yield: IndexMap<&str, usize> =
            self.nonterminals.iter().map(|n| (n.as_str(), usize::MAX)).collect();
        loop {
            let mut changed = false;
            for production in &self.productions {
                let total = production
                    .body
                    .iter()
                    .map(|s| match s {
                        Symbol::Term(_) => 1,
                        Symbol::Nonterm(n) => min_yield[n.as_str()],
                    })
                    .fold(0usize, usize::saturating_add);
                let slot = &mut min_yield[production.head.as_str()];
                if total < *slot {
                    *slot = total;
                    changed = true;
                }
            }
            if !changed {
                return min_yield;
            }
        }
    }
}

fn is_nonterminal_token(token: &str) -> bool {
    token.chars().next().is_some_and(char::is_uppercase)
}
