//! Shared lexer for C-like definition languages.
//!
//! IDL and ProtoBuf share the same lexical shape, so one logos lexer serves
//! every grammar; the grammars differ only in which token sequences they
//! recognise as constructs.

use std::ops::Range;

use logos::Logos;

use crate::base::{TextRange, TextSize};

/// Lexical token kinds.
#[derive(Logos, Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[logos(skip r"[ \t\r\n\f]+")]
pub enum TokenKind {
    #[regex(r"//[^\n]*", allow_greedy = true)]
    LineComment,
    #[regex(r"/\*([^*]|\*+[^*/])*\*+/")]
    BlockComment,
    /// Preprocessor line such as `#include "x.idl"`.
    #[regex(r"#[^\n]*", allow_greedy = true)]
    Directive,
    #[regex(r#""([^"\\\n]|\\[^\n])*""#)]
    StringLit,
    #[regex(r"'([^'\\\n]|\\[^\n])*'")]
    CharLit,
    #[regex(r"[A-Za-z_][A-Za-z0-9_]*")]
    Ident,
    #[regex(r"[0-9][0-9A-Za-z_.]*")]
    Number,
    #[token("{")]
    LBrace,
    #[token("}")]
    RBrace,
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token("<")]
    LAngle,
    #[token(">")]
    RAngle,
    #[token(";")]
    Semi,
    #[token(",")]
    Comma,
    #[token("::")]
    ColonColon,
    #[token(":")]
    Colon,
    #[token("=")]
    Eq,
    /// Any character no other rule accepts.
    Unknown,
}

impl TokenKind {
    /// Comments and preprocessor lines, which never take part in constructs.
    pub fn is_trivia(self) -> bool {
        matches!(
            self,
            TokenKind::LineComment | TokenKind::BlockComment | TokenKind::Directive
        )
    }

    pub fn is_literal(self) -> bool {
        matches!(self, TokenKind::StringLit | TokenKind::CharLit)
    }
}

/// A token and the source range it covers.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub range: TextRange,
}

/// Lex `text` into tokens. Whitespace is dropped; unrecognised characters
/// become [`TokenKind::Unknown`].
///
/// Lexing stops at the first token that ends beyond the range a
/// [`TextSize`] can address.
pub fn tokenize(text: &str) -> Vec<Token> {
    TokenKind::lexer(text)
        .spanned()
        .map_while(|(kind, span)| {
            Some(Token {
                kind: kind.unwrap_or(TokenKind::Unknown),
                range: text_range(span)?,
            })
        })
        .collect()
}

fn text_range(span: Range<usize>) -> Option<TextRange> {
    let start = TextSize::try_from(span.start).ok()?;
    let end = TextSize::try_from(span.end).ok()?;
    Some(TextRange::new(start, end))
}
