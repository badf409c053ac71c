use crate::regex::tokens::{Token, TokenKind};

fn is_special(ch: char) -> bool {
    matches!(ch, '.' | '|' | '*' | '+' | '?' | '(' | ')' | '$')
}

/// Splits a label-regex into tokens.
///
/// Whitespace separates symbols and is otherwise ignored; any run of
/// non-special, non-whitespace characters forms one symbol token. Lexing
/// cannot fail: every character belongs either to an operator or to a
/// symbol.
#[must_use]
pub fn lex(input: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut iter = input.char_indices().peekable();

    while let Some(&(idx, ch)) = iter.peek() {
        let column = idx + 1;
        if ch.is_whitespace() {
            iter.next();
            continue;
        }
        if is_special(ch) {
            iter.next();
            let kind = match ch {
                '.' => TokenKind::Dot,
                '|' => TokenKind::Or,
                '*' => TokenKind::Star,
                '+' => TokenKind::Plus,
                '?' => TokenKind::QMark,
                '(' => TokenKind::LParen,
                ')' => TokenKind::RParen,
                _ => TokenKind::Epsilon,
            };
            tokens.push(Token::new(kind, column));
            continue;
        }

        let mut symbol = String::new();
        while let Some(&(_, ch)) = iter.peek() {
            if ch.is_whitespace() || is_special(ch) {
                break;
            }
            symbol.push(ch);
            iter.next();
        }
        tokens.push(Token::new(TokenKind::Sym(symbol), column));
    }

    tokens.push(Token::new(TokenKind::Eos, input.len() + 1));
    tokens
}
