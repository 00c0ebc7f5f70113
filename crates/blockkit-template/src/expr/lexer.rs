/*
 * expr/lexer.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Tokenizer for interpolated expressions.

use crate::error::ExpressionError;

#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    // Literals
    Number(f64),
    Str(String),
    Ident(String),

    // Operators
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    EqEq,       // ==
    EqEqEq,     // ===
    BangEq,     // !=
    BangEqEq,   // !==
    Lt,
    LtEq,
    Gt,
    GtEq,
    AmpAmp,     // &&
    PipePipe,   // ||
    QuestionQuestion, // ??
    Question,
    Colon,
    Bang,
    Dot,
    Comma,

    // Grouping
    LParen,
    RParen,
    LBracket,
    RBracket,

    Eof,
}

/// A token and the byte offset where it starts.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub offset: usize,
}

pub fn tokenize(source: &str) -> Result<Vec<Token>, ExpressionError> {
    let mut lexer = Lexer {
        source,
        chars: source.char_indices().peekable(),
        tokens: Vec::new(),
    };
    lexer.run()?;
    Ok(lexer.tokens)
}

struct Lexer<'a> {
    source: &'a str,
    chars: std::iter::Peekable<std::str::CharIndices<'a>>,
    tokens: Vec<Token>,
}

impl Lexer<'_> {
    fn run(&mut self) -> Result<(), ExpressionError> {
        while let Some(&(offset, c)) = self.chars.peek() {
            if c.is_whitespace() {
                self.chars.next();
                continue;
            }

            let kind = if c.is_ascii_digit()
                || (c == '.' && self.peek_second().is_some_and(|n| n.is_ascii_digit()))
            {
                self.number(offset)?
            } else if c == '"' || c == '\'' {
                self.string(offset, c)?
            } else if is_ident_start(c) {
                self.ident(offset)
            } else {
                self.chars.next();
                self.operator(offset, c)?
            };
            self.tokens.push(Token { kind, offset });
        }
        self.tokens.push(Token {
            kind: TokenKind::Eof,
            offset: self.source.len(),
        });
        Ok(())
    }

    fn peek_second(&self) -> Option<char> {
        let mut it = self.chars.clone();
        it.next();
        it.next().map(|(_, c)| c)
    }

    fn eat(&mut self, expected: char) -> bool {
        if self.chars.peek().is_some_and(|&(_, c)| c == expected) {
            self.chars.next();
            true
        } else {
            false
        }
    }

    fn number(&mut self, start: usize) -> Result<TokenKind, ExpressionError> {
        let mut end = start;
        let mut seen_exponent = false;
        while let Some(&(i, c)) = self.chars.peek() {
            let accept = c.is_ascii_digit()
                || c == '.'
                || (!seen_exponent && (c == 'e' || c == 'E'))
                || ((c == '+' || c == '-')
                    && matches!(self.source[..i].chars().last(), Some('e' | 'E')));
            if !accept {
                break;
            }
            seen_exponent |= c == 'e' || c == 'E';
            end = i + c.len_utf8();
            self.chars.next();
        }
        let text = &self.source[start..end];
        text.parse::<f64>()
            .map(TokenKind::Number)
            .map_err(|_| ExpressionError::syntax(format!("Invalid number `{text}`"), start))
    }

    fn string(&mut self, start: usize, quote: char) -> Result<TokenKind, ExpressionError> {
        self.chars.next();
        let mut value = String::new();
        loop {
            let Some((i, c)) = self.chars.next() else {
                return Err(ExpressionError::syntax("Unterminated string literal", start));
            };
            match c {
                c if c == quote => return Ok(TokenKind::Str(value)),
                '\\' => {
                    let Some((_, escaped)) = self.chars.next() else {
                        return Err(ExpressionError::syntax("Unterminated string literal", start));
                    };
                    match escaped {
                        'n' => value.push('\n'),
                        't' => value.push('\t'),
                        'r' => value.push('\r'),
                        '0' => value.push('\0'),
                        'u' => value.push(self.unicode_escape(i)?),
                        other => value.push(other),
                    }
                }
                c => value.push(c),
            }
        }
    }

    fn unicode_escape(&mut self, at: usize) -> Result<char, ExpressionError> {
        let mut code = 0u32;
        for _ in 0..4 {
            let digit = self
                .chars
                .next()
                .and_then(|(_, c)| c.to_digit(16))
                .ok_or_else(|| ExpressionError::syntax("Invalid \\u escape", at))?;
            code = code * 16 + digit;
        }
        char::from_u32(code).ok_or_else(|| ExpressionError::syntax("Invalid \\u escape", at))
    }

    fn ident(&mut self, start: usize) -> TokenKind {
        let mut end = start;
        while let Some(&(i, c)) = self.chars.peek() {
            if !is_ident_continue(c) {
                break;
            }
            end = i + c.len_utf8();
            self.chars.next();
        }
        TokenKind::Ident(self.source[start..end].to_string())
    }

    fn operator(&mut self, offset: usize, c: char) -> Result<TokenKind, ExpressionError> {
        let kind = match c {
            '+' => TokenKind::Plus,
            '-' => TokenKind::Minus,
            '*' => TokenKind::Star,
            '/' => TokenKind::Slash,
            '%' => TokenKind::Percent,
            '(' => TokenKind::LParen,
            ')' => TokenKind::RParen,
            '[' => TokenKind::LBracket,
            ']' => TokenKind::RBracket,
            ',' => TokenKind::Comma,
            '.' => TokenKind::Dot,
            ':' => TokenKind::Colon,
            '<' if self.eat('=') => TokenKind::LtEq,
            '<' => TokenKind::Lt,
            '>' if self.eat('=') => TokenKind::GtEq,
            '>' => TokenKind::Gt,
            '?' if self.eat('?') => TokenKind::QuestionQuestion,
            '?' => TokenKind::Question,
            '&' if self.eat('&') => TokenKind::AmpAmp,
            '|' if self.eat('|') => TokenKind::PipePipe,
            '=' if self.eat('=') => {
                if self.eat('=') {
                    TokenKind::EqEqEq
                } else {
                    TokenKind::EqEq
                }
            }
            '!' if self.eat('=') => {
                if self.eat('=') {
                    TokenKind::BangEqEq
                } else {
                    TokenKind::BangEq
                }
            }
            '!' => TokenKind::Bang,
            '=' => {
                return Err(ExpressionError::syntax(
                    "Assignment is not allowed in expressions",
                    offset,
                ));
            }
            other => {
                return Err(ExpressionError::syntax(
                    format!("Unexpected character `{other}`"),
                    offset,
                ));
            }
        };
        Ok(kind)
    }
}

fn is_ident_start(c: char) -> bool {
    c.is_alphabetic() || c == '_' || c == '$'
}

fn is_ident_continue(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '$'
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn kinds(source: &str) -> Vec<TokenKind> {
        tokenize(source)
            .unwrap()
            .into_iter()
            .map(|t| t.kind)
            .collect()
    }

    #[test]
    fn test_operators() {
        assert_eq!(
            kinds("a === b !== c ?? d"),
            vec![
                TokenKind::Ident("a".into()),
                TokenKind::EqEqEq,
                TokenKind::Ident("b".into()),
                TokenKind::BangEqEq,
                TokenKind::Ident("c".into()),
                TokenKind::QuestionQuestion,
                TokenKind::Ident("d".into()),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_numbers() {
        assert_eq!(
            kinds("1 2.5 .5 1e3 2E-2"),
            vec![
                TokenKind::Number(1.0),
                TokenKind::Number(2.5),
                TokenKind::Number(0.5),
                TokenKind::Number(1000.0),
                TokenKind::Number(0.02),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_strings_and_escapes() {
        assert_eq!(
            kinds(r#"'it\'s' "a\nb" 'A'"#),
            vec![
                TokenKind::Str("it's".into()),
                TokenKind::Str("a\nb".into()),
                TokenKind::Str("A".into()),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_dollar_identifiers() {
        assert_eq!(
            kinds("$index $parent.x"),
            vec![
                TokenKind::Ident("$index".into()),
                TokenKind::Ident("$parent".into()),
                TokenKind::Dot,
                TokenKind::Ident("x".into()),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_errors() {
        assert!(matches!(
            tokenize("a = 1"),
            Err(ExpressionError::Syntax { offset: 2, .. })
        ));
        assert!(tokenize("'open").is_err());
        assert!(tokenize("a # b").is_err());
        assert!(tokenize("a & b").is_err());
    }
}
