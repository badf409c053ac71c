use indexmap::IndexMap;
use indexmap::map::Entry;

use crate::errors::GrammarError;
use crate::grammar::cfg::Cfg;
use crate::regex::Ast;

/// An extended context-free grammar: one regular expression per
/// nonterminal, over the mixed alphabet of terminals and nonterminals.
///
/// For every nonterminal the regex accepts exactly the production bodies of
/// that nonterminal: alternatives become alternation, bodies become
/// concatenations and the ε-body becomes the empty-word regex.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ecfg {
    start: String,
    productions: IndexMap<String, Ast>,
}

impl Ecfg {
    /// Groups the productions of a grammar by head into per-head regexes.
    #[must_use]
    pub fn from_cfg(cfg: &Cfg) -> Self {
        let mut productions: IndexMap<String, Ast> = IndexMap::new();
        for production in cfg.productions() {
            let body = body_regex(production.body.iter().map(|s| s.name()));
            match productions.entry(production.head.clone()) {
                Entry::Occupied(mut slot) => {
                    let merged = Ast::alt(slot.get().clone(), body);
                    slot.insert(merged);
                }
                Entry::Vacant(slot) => {
                    slot.insert(body);
                }
            }
        }
        Self {
            start: cfg.start().to_owned(),
            productions,
        }
    }

    /// Parses grammar text (see [`Cfg::from_text`]) into an ECFG.
    pub fn from_text(text: &str) -> Result<Self, GrammarError> {
        Ok(Self::from_cfg(&Cfg::from_text(text)?))
    }

    #[must_use]
    pub fn start(&self) -> &str {
        &self.start
    }

    pub fn productions(&self) -> impl Iterator<Item = (&str, &Ast)> {
        self.productions.iter().map(|(head, ast)| (head.as_str(), ast))
    }

    /// The regex of one nonterminal, if it has productions.
    #[must_use]
    pub fn regex(&self, nonterminal: &str) -> Option<&Ast> {
        self.productions.get(nonterminal)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.productions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.productions.is_empty()
    }
}

fn body_regex<'a>(symbols: impl Iterator<Item = &'a str>) -> Ast {
    let mut acc: Option<Ast> = None;
    for name in symbols {
        let node = Ast::sym(name);
        acc = Some(match acc {
            Some(prev) => Ast::concat(prev, node),
            None => node,
        });
    }
    acc.unwrap_or(Ast::Epsilon)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bodies_concatenate() {
        let ecfg = Ecfg::from_text("S -> A B C\nA -> a\nB -> b\nC -> c\n").unwrap();
        assert_eq!(ecfg.len(), 4);
        assert_eq!(
            ecfg.regex("S"),
            Some(&Ast::concat(
                Ast::concat(Ast::sym("A"), Ast::sym("B")),
                Ast::sym("C")
            ))
        );
        assert_eq!(ecfg.regex("A"), Some(&Ast::sym("a")));
    }

    #[test]
    fn alternatives_union() {
        let ecfg = Ecfg::from_text("S -> S S | a b | $\n").unwrap();
        let regex = ecfg.regex("S").unwrap();
        // Three alternatives folded left to right.
        assert_eq!(
            regex,
            &Ast::alt(
                Ast::alt(
                    Ast::concat(Ast::sym("S"), Ast::sym("S")),
                    Ast::concat(Ast::sym("a"), Ast::sym("b"))
                ),
                Ast::Epsilon
            )
        );
    }

    #[test]
    fn heads_without_rules_are_absent() {
        let ecfg = Ecfg::from_text("S -> A b\nA -> a\n").unwrap();
        assert!(ecfg.regex("B").is_none());
        assert_eq!(ecfg.start(), "S");
    }
}
