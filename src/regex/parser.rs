use crate::errors::{RegexError, RegexErrorKind};
use crate::regex::ast::Ast;
use crate::regex::tokens::{Token, TokenKind};

/// Converts a token stream into an [`Ast`] using recursive descent.
pub fn parse(tokens: &[Token]) -> Result<Ast, RegexError> {
    let mut parser = Parser::new(tokens);
    let ast = parser.parse_alt()?;
    parser.expect_eos()?;
    Ok(ast)
}

/// Stateful parser over a token slice.
///
/// `depth` counts currently open groups, which is what tells an empty
/// group `()` apart from a stray `)` at the same grammar position.
struct Parser<'a> {
    tokens: &'a [Token],
    pos: usize,
    depth: usize,
}

impl<'a> Parser<'a> {
    fn new(tokens: &'a [Token]) -> Self {
        Self {
            tokens,
            pos: 0,
            depth: 0,
        }
    }

    /// Parses an alternation (`lhs | rhs`).
    fn parse_alt(&mut self) -> Result<Ast, RegexError> {
        let mut node = self.parse_concat()?;
        while self.matches(&TokenKind::Or) {
            let rhs = self.parse_concat()?;
            node = Ast::alt(node, rhs);
        }
        Ok(node)
    }

    /// Parses concatenation, written with `.` or by juxtaposition.
    fn parse_concat(&mut self) -> Result<Ast, RegexError> {
        let mut nodes = vec![self.parse_repeat()?];
        loop {
            if self.matches(&TokenKind::Dot) {
                nodes.push(self.parse_repeat()?);
            } else if self.can_start_atom() {
                nodes.push(self.parse_repeat()?);
            } else {
                break;
            }
        }
        let mut it = nodes.into_iter();
        let mut acc = it.next().unwrap_or(Ast::Epsilon);
        for node in it {
            acc = Ast::concat(acc, node);
        }
        Ok(acc)
    }

    /// Parses unary postfix operators (`*`, `+`, `?`).
    fn parse_repeat(&mut self) -> Result<Ast, RegexError> {
        let mut node = self.parse_atom()?;
        loop {
            let apply: fn(Ast) -> Ast = match self.peek_kind() {
                Some(TokenKind::Star) => Ast::star,
                Some(TokenKind::Plus) => Ast::plus,
                Some(TokenKind::QMark) => Ast::opt,
                _ => break,
            };
            self.pos += 1;
            node = apply(node);
        }
        Ok(node)
    }

    /// Determines whether the current token may begin an atom.
    fn can_start_atom(&self) -> bool {
        matches!(
            self.peek_kind(),
            Some(TokenKind::Sym(_) | TokenKind::Epsilon | TokenKind::LParen)
        )
    }

    /// Parses a single atom: a symbol, `$`, or a grouped sub-expression.
    /// Every other token means an operator is missing an operand here.
    fn parse_atom(&mut self) -> Result<Ast, RegexError> {
        match self.peek_kind() {
            Some(TokenKind::Sym(name)) => {
                let node = Ast::Sym(name.clone());
                self.pos += 1;
                Ok(node)
            }
            Some(TokenKind::Epsilon) => {
                self.pos += 1;
                Ok(Ast::Epsilon)
            }
            Some(TokenKind::LParen) => {
                let open = self.error_here(RegexErrorKind::UnclosedGroup);
                self.pos += 1;
                self.depth += 1;
                let node = self.parse_alt()?;
                if self.matches(&TokenKind::RParen) {
                    self.depth -= 1;
                    Ok(node)
                } else {
                    Err(open)
                }
            }
            Some(TokenKind::Star) => Err(self.dangling_postfix('*')),
            Some(TokenKind::Plus) => Err(self.dangling_postfix('+')),
            Some(TokenKind::QMark) => Err(self.dangling_postfix('?')),
            Some(TokenKind::Dot) => {
                Err(self.error_here(RegexErrorKind::MissingOperand { op: '.' }))
            }
            Some(TokenKind::Or) => {
                Err(self.error_here(RegexErrorKind::MissingOperand { op: '|' }))
            }
            Some(TokenKind::RParen) => {
                let kind = if self.depth > 0 {
                    RegexErrorKind::EmptyGroup
                } else {
                    RegexErrorKind::StrayParen
                };
                Err(self.error_here(kind))
            }
            Some(TokenKind::Eos) | None => {
                Err(self.error_here(RegexErrorKind::TruncatedExpression))
            }
        }
    }

    /// Consumes the next token if it matches the provided kind.
    fn matches(&mut self, kind: &TokenKind) -> bool {
        if self.peek_kind() == Some(kind) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    /// After a full parse the only token that can be left over is an
    /// unmatched closing parenthesis.
    fn expect_eos(&mut self) -> Result<(), RegexError> {
        match self.peek_kind() {
            Some(TokenKind::Eos) | None => Ok(()),
            _ => Err(self.error_here(RegexErrorKind::StrayParen)),
        }
    }

    fn peek(&self) -> Option<&'a Token> {
        self.tokens.get(self.pos)
    }

    fn peek_kind(&self) -> Option<&'a TokenKind> {
        self.peek().map(|tok| &tok.kind)
    }

    fn dangling_postfix(&self, op: char) -> RegexError {
        self.error_here(RegexErrorKind::DanglingPostfix { op })
    }

    fn error_here(&self, kind: RegexErrorKind) -> RegexError {
        let column = self
            .peek()
            .map(|t| t.pos)
            .unwrap_or_else(|| self.tokens.last().map(|tok| tok.pos).unwrap_or_default());
        RegexError::new(column, kind)
    }
}
