//! Left-to-right construct scanner shared by every grammar.

use super::grammar::Grammar;
use super::pattern::{Match, TokenStream};

/// Finds successive construct matches in a source text.
///
/// At each token position the grammar's patterns are tried in table order
/// and the first one that matches wins; when none matches, scanning moves
/// on to the next token. Matches never overlap, so the text of a string
/// literal or comment is never rescanned for constructs.
pub struct Scanner<'g, 'a> {
    grammar: &'g dyn Grammar,
    stream: TokenStream<'a>,
    cursor: usize,
}

impl<'g, 'a> Scanner<'g, 'a> {
    pub fn new(grammar: &'g dyn Grammar, text: &'a str) -> Self {
        Self {
            grammar,
            stream: TokenStream::new(text),
            cursor: 0,
        }
    }

    /// Find the next match at or after the cursor.
    pub fn next_match(&mut self) -> Option<Match> {
        while self.cursor < self.stream.len() {
            let at = self.cursor;
            let found = self
                .grammar
                .patterns()
                .iter()
                .find_map(|pattern| pattern.try_match(&self.stream, at));
            if let Some(m) = found {
                self.cursor = m.next;
                return Some(m);
            }
            self.cursor += 1;
        }
        None
    }
}

impl Iterator for Scanner<'_, '_> {
    type Item = Match;

    fn next(&mut self) -> Option<Match> {
        self.next_match()
    }
}
