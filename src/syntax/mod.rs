//! Grammar scanners for the supported definition languages.
//!
//! Source text is lexed once with [`logos`] into a token stream; each
//! [`Grammar`] then supplies an ordered table of [`Pattern`]s that the
//! [`Scanner`] applies left to right.

mod grammar;
mod idl;
pub mod lexer;
pub mod pattern;
mod proto;
mod scanner;

pub use grammar::Grammar;
pub use idl::IdlGrammar;
pub use lexer::{Token, TokenKind, tokenize};
pub use pattern::{Construct, Match, Pattern, TokenStream};
pub use proto::ProtoGrammar;
pub use scanner::Scanner;
