use std::collections::{HashSet, VecDeque};

use indexmap::{IndexMap, IndexSet};
use tracing::debug;

use crate::grammar::cfg::{Cfg, Production, Symbol};

/// Normalizes a grammar to weak Chomsky normal form.
///
/// After normalization every body has length 0 (ε), 1 (a single terminal)
/// or 2 (two nonterminals). "Weak" means ε-productions of nonterminals
/// other than the start symbol survive instead of being eliminated, so the
/// language is preserved exactly, ε-membership included. The steps run in a
/// fixed order, each one language-preserving:
///
/// 1. eliminate unit productions `A -> B`,
/// 2. drop useless (non-generating or unreachable) symbols,
/// 3. lift terminals out of long bodies behind fresh nonterminals,
/// 4. binarize long bodies right-associatively.
#[must_use]
pub fn to_wcnf(cfg: &Cfg) -> Cfg {
    let stage = eliminate_unit_productions(cfg);
    let stage = remove_useless_symbols(&stage);
    let stage = lift_terminals(&stage);
    let result = binarize(&stage);
    debug!(
        before = cfg.production_count(),
        after = result.production_count(),
        "normalized grammar to weak cnf"
    );
    result
}

/// Whether every production body is one of the three WCNF shapes.
#[must_use]
pub fn is_wcnf(cfg: &Cfg) -> bool {
    cfg.productions().all(|p| match p.body.as_slice() {
        [] => true,
        [Symbol::Term(_)] => true,
        [Symbol::Nonterm(_), Symbol::Nonterm(_)] => true,
        _ => false,
    })
}

/// Splices the bodies of unit-reachable nonterminals into each head,
/// removing every `A -> B` production.
fn eliminate_unit_productions(cfg: &Cfg) -> Cfg {
    let mut result = Cfg::new(cfg.start());
    for head in cfg.nonterminals() {
        for target in unit_closure(cfg, head) {
            for production in cfg.productions() {
                if production.head != target || is_unit(production) {
                    continue;
                }
                result.add_production(Production::new(head.clone(), production.body.clone()));
            }
        }
    }
    result
}

fn is_unit(production: &Production) -> bool {
    matches!(production.body.as_slice(), [Symbol::Nonterm(_)])
}

/// Nonterminals reachable from `from` through chains of unit productions,
/// including `from` itself.
fn unit_closure(cfg: &Cfg, from: &str) -> Vec<String> {
    let mut closure = vec![from.to_owned()];
    let mut queue: VecDeque<String> = VecDeque::new();
    queue.push_back(from.to_owned());
    while let Some(current) = queue.pop_front() {
        for production in cfg.productions() {
            if production.head != current {
                continue;
            }
            if let [Symbol::Nonterm(next)] = production.body.as_slice() {
                if !closure.contains(next) {
                    closure.push(next.clone());
                    queue.push_back(next.clone());
                }
            }
        }
    }
    closure
}

/// Drops productions mentioning non-generating nonterminals, then
/// productions unreachable from the start symbol.
fn remove_useless_symbols(cfg: &Cfg) -> Cfg {
    let mut generating: HashSet<&str> = HashSet::new();
    loop {
        let mut changed = false;
        for production in cfg.productions() {
            if generating.contains(production.head.as_str()) {
                continue;
            }
            let all_generating = production.body.iter().all(|s| match s {
                Symbol::Term(_) => true,
                Symbol::Nonterm(n) => generating.contains(n.as_str()),
            });
            if all_generating {
                generating.insert(&production.head);
                changed = true;
            }
        }
        if !changed {
            break;
        }
    }

    if !generating.contains(cfg.start()) {
        // The language is empty; only the start symbol survives.
        return Cfg::new(cfg.start());
    }

    let generating_production = |p: &Production| {
        generating.contains(p.head.as_str())
            && p.body.iter().all(|s| match s {
                Symbol::Term(_) => true,
                Symbol::Nonterm(n) => generating.contains(n.as_str()),
            })
    };

    let mut reachable: IndexSet<&str> = IndexSet::new();
    reachable.insert(cfg.start());
    loop {
        let mut changed = false;
        for production in cfg.productions() {
            if !reachable.contains(production.head.as_str()) || !generating_production(production) {
                continue;
            }
            for symbol in &production.body {
                if let Symbol::Nonterm(n) = symbol {
                    changed |= reachable.insert(n.as_str());
                }
            }
        }
        if !changed {
            break;
        }
    }

    let mut result = Cfg::new(cfg.start());
    for production in cfg.productions() {
        if reachable.contains(production.head.as_str()) && generating_production(production) {
            result.add_production(production.clone());
        }
    }
    result
}

/// Replaces terminals inside bodies of length two or more with fresh
/// nonterminals `T#t`, adding `T#t -> t` alongside.
///
/// User symbols cannot contain `#` (the text format treats it as a comment
/// marker), so the fresh names are collision-free.
fn lift_terminals(cfg: &Cfg) -> Cfg {
    let mut result = Cfg::new(cfg.start());
    let mut lifted: IndexMap<String, String> = IndexMap::new();
    for production in cfg.productions() {
        if production.body.len() < 2 {
            result.add_production(production.clone());
            continue;
        }
        let body = production
            .body
            .iter()
            .map(|symbol| match symbol {
                Symbol::Nonterm(_) => symbol.clone(),
                Symbol::Term(t) => {
                    let fresh = lifted
                        .entry(t.clone())
                        .or_insert_with(|| format!("T#{t}"))
                        .clone();
                    Symbol::nonterm(fresh)
                }
            })
            .collect();
        result.add_production(Production::new(production.head.clone(), body));
    }
    for (terminal, fresh) in lifted {
        result.add_production(Production::new(fresh, vec![Symbol::term(terminal)]));
    }
    result
}

/// Rewrites bodies of three or more symbols as chains of binary
/// productions, introducing fresh right-spine nonterminals `head#k`.
fn binarize(cfg: &Cfg) -> Cfg {
    let mut result = Cfg::new(cfg.start());
    let mut counter = 0usize;
    for production in cfg.productions() {
        if production.body.len() <= 2 {
            result.add_production(production.clone());
            continue;
        }
        let mut head = production.head.clone();
        let mut rest = production.body.as_slice();
        while rest.len() > 2 {
            let fresh = format!("{}#{counter}", production.head);
            counter += 1;
            result.add_production(Production::new(
                head,
                vec![rest[0].clone(), Symbol::nonterm(fresh.clone())],
            ));
            head = fresh;
            rest = &rest[1..];
        }
        result.add_production(Production::new(head, rest.to_vec()));
    }
    result
}
