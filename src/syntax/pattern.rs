//! Named construct patterns over a token stream.
//!
//! A [`Pattern`] is a matcher that, given a token position, either
//! recognises one construct starting exactly there or declines. Grammars
//! list their patterns in priority order; the [`Scanner`](super::Scanner)
//! tries them in that order at every position.

use smol_str::SmolStr;

use super::lexer::{Token, TokenKind, tokenize};
use crate::base::{TextRange, TextSize};
use crate::model::ContainerKind;

const LANDMARK_COUNT: usize = 6;

/// Token kinds whose next occurrence is precomputed for every position.
const LANDMARKS: [TokenKind; LANDMARK_COUNT] = [
    TokenKind::RParen,
    TokenKind::RAngle,
    TokenKind::Semi,
    TokenKind::LBrace,
    TokenKind::RBrace,
    TokenKind::Eq,
];

fn landmark_slot(kind: TokenKind) -> Option<usize> {
    LANDMARKS.iter().position(|&k| k == kind)
}

/// A lexed source text.
#[derive(Clone, Debug)]
pub struct TokenStream<'a> {
    text: &'a str,
    tokens: Vec<Token>,
    /// Row `i` holds, per landmark kind, the index of its first occurrence
    /// at or after token `i` (`tokens.len()` if there is none).
    landmarks: Vec<[usize; LANDMARK_COUNT]>,
}

impl<'a> TokenStream<'a> {
    pub fn new(text: &'a str) -> Self {
        let tokens = tokenize(text);
        let mut landmarks = vec![[tokens.len(); LANDMARK_COUNT]; tokens.len() + 1];
        for index in (0..tokens.len()).rev() {
            let mut row = landmarks[index + 1];
            if let Some(slot) = landmark_slot(tokens[index].kind) {
                row[slot] = index;
            }
            landmarks[index] = row;
        }
        Self {
            text,
            tokens,
            landmarks,
        }
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Token> {
        self.tokens.get(index)
    }

    pub fn kind(&self, index: usize) -> Option<TokenKind> {
        self.tokens.get(index).map(|t| t.kind)
    }

    /// Source text of the token at `index`, or `""` past the end.
    pub fn text_at(&self, index: usize) -> &'a str {
        let text = self.text;
        self.tokens.get(index).map_or("", |t| &text[t.range])
    }

    /// Index of the first `kind` token at or after `from`, or `len()` if
    /// there is none. Constant time for landmark kinds.
    pub fn next_of(&self, kind: TokenKind, from: usize) -> usize {
        let from = from.min(self.len());
        match landmark_slot(kind) {
            Some(slot) => self.landmarks[from][slot],
            None => (from..self.len())
                .find(|&i| self.tokens[i].kind == kind)
                .unwrap_or(self.len()),
        }
    }

    /// Index of the first non-trivia token at or after `index`.
    pub fn skip_trivia(&self, mut index: usize) -> usize {
        while self.kind(index).is_some_and(TokenKind::is_trivia) {
            index += 1;
        }
        index
    }

    /// Join the given tokens' text, dropping trivia and collapsing every gap
    /// between tokens to a single space.
    pub fn join(&self, indices: impl IntoIterator<Item = usize>) -> String {
        let mut out = String::new();
        let mut prev_end: Option<TextSize> = None;
        for tok in indices.into_iter().filter_map(|i| self.tokens.get(i)) {
            if tok.kind.is_trivia() {
                continue;
            }
            if prev_end.is_some_and(|end| end < tok.range.start()) {
                out.push(' ');
            }
            out.push_str(&self.text[tok.range]);
            prev_end = Some(tok.range.end());
        }
        out
    }

    /// Comment-stripped, whitespace-normalized text of tokens `from..to`.
    pub fn clean_text(&self, from: usize, to: usize) -> String {
        self.join(from..to.min(self.len()))
    }

    /// Split tokens `from..to` on commas outside `<...>` and `(...)`.
    ///
    /// Trivia is dropped; each segment lists the remaining token indices.
    pub fn split_commas(&self, from: usize, to: usize) -> Vec<Vec<usize>> {
        let mut segments = vec![Vec::new()];
        let mut nesting = 0usize;
        for index in from..to.min(self.len()) {
            let kind = self.tokens[index].kind;
            match kind {
                _ if kind.is_trivia() => continue,
                TokenKind::LAngle | TokenKind::LParen => nesting += 1,
                TokenKind::RAngle | TokenKind::RParen => nesting = nesting.saturating_sub(1),
                TokenKind::Comma if nesting == 0 => {
                    segments.push(Vec::new());
                    continue;
                }
                _ => {}
            }
            if let Some(segment) = segments.last_mut() {
                segment.push(index);
            }
        }
        segments
    }
}

/// A forward-only reader used by pattern matchers.
///
/// Every lookahead skips trivia, but a failed lookahead never moves the
/// cursor, so optional pieces can be tried freely.
#[derive(Clone, Copy, Debug)]
pub struct Cursor<'s, 'a> {
    stream: &'s TokenStream<'a>,
    pos: usize,
}

impl<'s, 'a> Cursor<'s, 'a> {
    pub fn new(stream: &'s TokenStream<'a>, pos: usize) -> Self {
        Self { stream, pos }
    }

    /// Index of the next unconsumed token.
    pub fn pos(&self) -> usize {
        self.pos
    }

    /// Consume the next token if it has the given kind.
    pub fn eat(&mut self, kind: TokenKind) -> Option<usize> {
        let index = self.stream.skip_trivia(self.pos);
        if self.stream.kind(index)? != kind {
            return None;
        }
        self.pos = index + 1;
        Some(index)
    }

    /// Consume the next token if it is the identifier `keyword`.
    pub fn eat_keyword(&mut self, keyword: &str) -> bool {
        let index = self.stream.skip_trivia(self.pos);
        if self.stream.kind(index) == Some(TokenKind::Ident) && self.stream.text_at(index) == keyword {
            self.pos = index + 1;
            true
        } else {
            false
        }
    }

    /// Consume an identifier and return its text.
    pub fn ident(&mut self) -> Option<&'a str> {
        let index = self.eat(TokenKind::Ident)?;
        Some(self.stream.text_at(index))
    }

    /// Consume a possibly qualified name such as `::Bank::Account`.
    pub fn scoped_name(&mut self) -> Option<String> {
        let mut ahead = *self;
        let mut indices = Vec::new();
        if let Some(index) = ahead.eat(TokenKind::ColonColon) {
            indices.push(index);
        }
        indices.push(ahead.eat(TokenKind::Ident)?);
        loop {
            let mut next = ahead;
            let Some(sep) = next.eat(TokenKind::ColonColon) else {
                break;
            };
            let Some(part) = next.eat(TokenKind::Ident) else {
                break;
            };
            indices.extend([sep, part]);
            ahead = next;
        }
        *self = ahead;
        Some(self.stream.join(indices))
    }

    /// Advance past the next `stop` token, returning the token range in
    /// between. Fails if a `fail_on` token or the end of input comes first.
    pub fn until(&mut self, stop: TokenKind, fail_on: &[TokenKind]) -> Option<(usize, usize)> {
        let start = self.pos;
        let stop_at = self.stream.next_of(stop, start);
        if stop_at >= self.stream.len() {
            return None;
        }
        if fail_on
            .iter()
            .any(|&kind| self.stream.next_of(kind, start) < stop_at)
        {
            return None;
        }
        self.pos = stop_at + 1;
        Some((start, stop_at))
    }
}

/// What a matched pattern means to the outline builder.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Construct {
    /// A string or character literal; skipped.
    StringLiteral,
    /// A comment or uninteresting preprocessor line; skipped.
    Comment,
    /// A reference to another definition file.
    Import { target: String },
    /// A method, RPC or free function.
    Method {
        name: SmolStr,
        signature: String,
        returns: Option<String>,
    },
    /// A keyword container whose `{` is part of the match.
    ContainerOpen {
        kind: ContainerKind,
        name: SmolStr,
        supers: Vec<SmolStr>,
    },
    /// One or more attribute names from a single declaration.
    Attribute { names: Vec<SmolStr>, readonly: bool },
    /// A module-scoped constant.
    Global { name: SmolStr },
    /// Any other `{`.
    OpenBrace,
    /// A `}` with an optional trailing `;`.
    CloseBrace,
}

/// Matcher signature: on success, the construct and the index one past the
/// last consumed token.
pub type MatchFn = fn(&TokenStream<'_>, usize) -> Option<(Construct, usize)>;

/// A named entry in a grammar's pattern table.
#[derive(Clone, Copy)]
pub struct Pattern {
    name: &'static str,
    matcher: MatchFn,
}

impl Pattern {
    pub const fn new(name: &'static str, matcher: MatchFn) -> Self {
        Self { name, matcher }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Try to match a construct starting at token `at`.
    pub fn try_match(&self, stream: &TokenStream<'_>, at: usize) -> Option<Match> {
        let (construct, next) = (self.matcher)(stream, at)?;
        let first = stream.get(at)?;
        let last = stream.get(next.checked_sub(1)?)?;
        Some(Match {
            pattern: self.name,
            construct,
            range: TextRange::new(first.range.start(), last.range.end().max(first.range.end())),
            next: next.max(at + 1),
        })
    }
}

impl std::fmt::Debug for Pattern {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pattern").field("name", &self.name).finish()
    }
}

/// One recognised construct.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Match {
    /// Name of the pattern that matched.
    pub pattern: &'static str,
    pub construct: Construct,
    /// Source range from the first to the last consumed token.
    pub range: TextRange,
    /// Token index where scanning resumes.
    pub next: usize,
}

// Matchers shared by every grammar.

/// `"..."` or `'...'`.
pub fn string_literal(stream: &TokenStream<'_>, at: usize) -> Option<(Construct, usize)> {
    stream
        .kind(at)?
        .is_literal()
        .then_some((Construct::StringLiteral, at + 1))
}

/// `// ...`, `/* ... */` or a preprocessor line.
pub fn comment(stream: &TokenStream<'_>, at: usize) -> Option<(Construct, usize)> {
    stream
        .kind(at)?
        .is_trivia()
        .then_some((Construct::Comment, at + 1))
}

/// `{`
pub fn open_brace(stream: &TokenStream<'_>, at: usize) -> Option<(Construct, usize)> {
    (stream.kind(at)? == TokenKind::LBrace).then_some((Construct::OpenBrace, at + 1))
}

/// `}` optionally followed by `;`.
pub fn close_brace(stream: &TokenStream<'_>, at: usize) -> Option<(Construct, usize)> {
    if stream.kind(at)? != TokenKind::RBrace {
        return None;
    }
    let mut cursor = Cursor::new(stream, at + 1);
    cursor.eat(TokenKind::Semi);
    Some((Construct::CloseBrace, cursor.pos()))
}

/// `<keyword> Name {`, producing a container of `kind`.
pub fn keyword_container(
    stream: &TokenStream<'_>,
    at: usize,
    keyword: &str,
    kind: ContainerKind,
) -> Option<(Construct, usize)> {
    let mut cursor = Cursor::new(stream, at);
    if !cursor.eat_keyword(keyword) {
        return None;
    }
    let name = cursor.ident()?;
    cursor.eat(TokenKind::LBrace)?;
    Some((
        Construct::ContainerOpen {
            kind,
            name: name.into(),
            supers: Vec::new(),
        },
        cursor.pos(),
    ))
}

/// Strip the surrounding quotes from a string literal.
pub fn unquote(literal: &str) -> &str {
    let inner = literal.strip_prefix('"').unwrap_or(literal);
    inner.strip_suffix('"').unwrap_or(inner)
}
