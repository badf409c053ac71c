use crate::errors::RegexError;
use crate::regex::{lexer, parser};

/// An abstract syntax tree for a regular expression over label symbols.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Ast {
    /// The empty word.
    Epsilon,
    /// A single label symbol.
    Sym(String),
    /// Concatenation of two expressions.
    Concat(Box<Ast>, Box<Ast>),
    /// Alternation between two expressions.
    Alt(Box<Ast>, Box<Ast>),
    /// Zero-or-more repetition.
    Star(Box<Ast>),
    /// One-or-more repetition.
    Plus(Box<Ast>),
    /// Optional expression.
    Opt(Box<Ast>),
}

impl Ast {
    /// Lexes and parses `input` into an AST.
    ///
    /// # Errors
    ///
    /// Returns a [`RegexError`] when the expression is malformed.
    pub fn build(input: &str) -> Result<Ast, RegexError> {
        parser::parse(&lexer::lex(input))
    }

    /// Creates a symbol node.
    #[must_use]
    pub fn sym(name: impl Into<String>) -> Ast {
        Ast::Sym(name.into())
    }

    /// Creates a concatenation node.
    #[must_use]
    pub fn concat(lhs: Ast, rhs: Ast) -> Ast {
        Ast::Concat(Box::new(lhs), Box::new(rhs))
    }

    /// Creates an alternation node.
    #[must_use]
    pub fn alt(lhs: Ast, rhs: Ast) -> Ast {
        Ast::Alt(Box::new(lhs), Box::new(rhs))
    }

    /// Creates a Kleene star node.
    #[must_use]
    pub fn star(inner: Ast) -> Ast {
        Ast::Star(Box::new(inner))
    }

    /// Creates a Kleene plus node.
    #[must_use]
    pub fn plus(inner: Ast) -> Ast {
        Ast::Plus(Box::new(inner))
    }

    /// Creates an optional node.
    #[must_use]
    pub fn opt(inner: Ast) -> Ast {
        Ast::Opt(Box::new(inner))
    }
}
