//! CORBA IDL grammar.
//!
//! Recognises modules, interfaces (with their inheritance lists), structs,
//! exceptions, enums, operations, attributes, module constants and
//! `#include` lines. Everything else is skipped token by token.

use smol_str::SmolStr;

use super::grammar::Grammar;
use super::lexer::TokenKind;
use super::pattern::{self, Construct, Cursor, Pattern, TokenStream};
use crate::model::ContainerKind;

/// Identifiers that can never start an operation declaration.
const RESERVED: &[&str] = &[
    "abstract",
    "attribute",
    "const",
    "context",
    "enum",
    "exception",
    "in",
    "inout",
    "interface",
    "local",
    "module",
    "native",
    "oneway",
    "out",
    "raises",
    "readonly",
    "struct",
    "typedef",
    "union",
    "valuetype",
];

static PATTERNS: &[Pattern] = &[
    Pattern::new("String", pattern::string_literal),
    Pattern::new("Include", include),
    Pattern::new("Comment", pattern::comment),
    Pattern::new("Method", method),
    Pattern::new("Interface", interface),
    Pattern::new("Module", module),
    Pattern::new("Struct", structure),
    Pattern::new("Exception", exception),
    Pattern::new("Enum", enumeration),
    Pattern::new("Attribute", attribute),
    Pattern::new("Const", constant),
    Pattern::new("Begin", pattern::open_brace),
    Pattern::new("End", pattern::close_brace),
];

/// The CORBA IDL grammar.
#[derive(Clone, Copy, Debug, Default)]
pub struct IdlGrammar;

impl Grammar for IdlGrammar {
    fn name(&self) -> &'static str {
        "idl"
    }

    fn extensions(&self) -> &'static [&'static str] {
        &["idl"]
    }

    fn patterns(&self) -> &'static [Pattern] {
        PATTERNS
    }

    fn accepts_methods(&self, kind: ContainerKind) -> bool {
        matches!(kind, ContainerKind::Interface | ContainerKind::Module)
    }

    fn accepts_attributes(&self, kind: ContainerKind) -> bool {
        matches!(kind, ContainerKind::Interface | ContainerKind::Module)
    }

    fn accepts_globals(&self, kind: ContainerKind) -> bool {
        kind == ContainerKind::Module
    }
}

/// `#include "file.idl"` or `#include <file.idl>`.
fn include(stream: &TokenStream<'_>, at: usize) -> Option<(Construct, usize)> {
    if stream.kind(at)? != TokenKind::Directive {
        return None;
    }
    let rest = stream.text_at(at).strip_prefix('#')?.trim_start();
    let rest = rest.strip_prefix("include")?.trim();
    let target = if let Some(quoted) = rest.strip_prefix('"') {
        quoted.split('"').next()?
    } else {
        rest.strip_prefix('<')?.split('>').next()?
    };
    Some((
        Construct::Import {
            target: target.trim().to_owned(),
        },
        at + 1,
    ))
}

/// `[oneway] Type name(params) [raises(...)] [context(...)];`
fn method(stream: &TokenStream<'_>, at: usize) -> Option<(Construct, usize)> {
    let mut cursor = Cursor::new(stream, at);
    cursor.eat_keyword("oneway");
    let return_type = cursor.scoped_name()?;
    if RESERVED.contains(&return_type.as_str()) {
        return None;
    }
    if cursor.eat(TokenKind::LAngle).is_some() {
        cursor.until(TokenKind::RAngle, BLOCK_TOKENS)?;
    }
    let name = cursor.ident()?;
    cursor.eat(TokenKind::LParen)?;
    let (from, to) = cursor.until(TokenKind::RParen, BLOCK_TOKENS)?;
    while cursor.eat_keyword("raises") || cursor.eat_keyword("context") {
        cursor.eat(TokenKind::LParen)?;
        cursor.until(TokenKind::RParen, BLOCK_TOKENS)?;
    }
    cursor.eat(TokenKind::Semi)?;
    Some((
        Construct::Method {
            name: name.into(),
            signature: stream.clean_text(from, to),
            returns: None,
        },
        cursor.pos(),
    ))
}

/// Tokens that end any search for a closing `)` or `;`.
const BLOCK_TOKENS: &[TokenKind] = &[TokenKind::LBrace, TokenKind::RBrace, TokenKind::Semi];

fn module(stream: &TokenStream<'_>, at: usize) -> Option<(Construct, usize)> {
    pattern::keyword_container(stream, at, "module", ContainerKind::Module)
}

fn structure(stream: &TokenStream<'_>, at: usize) -> Option<(Construct, usize)> {
    pattern::keyword_container(stream, at, "struct", ContainerKind::Struct)
}

fn exception(stream: &TokenStream<'_>, at: usize) -> Option<(Construct, usize)> {
    pattern::keyword_container(stream, at, "exception", ContainerKind::Exception)
}

fn enumeration(stream: &TokenStream<'_>, at: usize) -> Option<(Construct, usize)> {
    pattern::keyword_container(stream, at, "enum", ContainerKind::Enum)
}

/// `[abstract|local] interface Name [: Base, ...] {`
fn interface(stream: &TokenStream<'_>, at: usize) -> Option<(Construct, usize)> {
    let mut cursor = Cursor::new(stream, at);
    if !cursor.eat_keyword("abstract") {
        cursor.eat_keyword("local");
    }
    if !cursor.eat_keyword("interface") {
        return None;
    }
    let name = cursor.ident()?;
    let supers = if cursor.eat(TokenKind::Colon).is_some() {
        let (from, to) = cursor.until(TokenKind::LBrace, &[TokenKind::Semi, TokenKind::RBrace])?;
        stream
            .split_commas(from, to)
            .into_iter()
            .map(|segment| SmolStr::from(stream.join(segment)))
            .filter(|name| !name.is_empty())
            .collect()
    } else {
        cursor.eat(TokenKind::LBrace)?;
        Vec::new()
    };
    Some((
        Construct::ContainerOpen {
            kind: ContainerKind::Interface,
            name: name.into(),
            supers,
        },
        cursor.pos(),
    ))
}

/// `[readonly] attribute Type name[, name...];`
fn attribute(stream: &TokenStream<'_>, at: usize) -> Option<(Construct, usize)> {
    let mut cursor = Cursor::new(stream, at);
    let readonly = cursor.eat_keyword("readonly");
    if !cursor.eat_keyword("attribute") {
        return None;
    }
    let (from, to) = cursor.until(TokenKind::Semi, &[TokenKind::LBrace, TokenKind::RBrace])?;

    let mut segments = stream.split_commas(from, to).into_iter();
    let first = declarator_idents(stream, &segments.next()?);
    // The first declarator needs a type in front of the name.
    if first.len() < 2 {
        return None;
    }
    let mut names: Vec<SmolStr> = first.last().map(|&n| SmolStr::from(n)).into_iter().collect();
    for segment in segments {
        if let Some(&name) = declarator_idents(stream, &segment).last() {
            names.push(name.into());
        }
    }
    Some((Construct::Attribute { names, readonly }, cursor.pos()))
}

/// Identifiers of one comma-separated declarator, ignoring any
/// `getraises(...)`/`setraises(...)` tail.
fn declarator_idents<'a>(stream: &TokenStream<'a>, segment: &[usize]) -> Vec<&'a str> {
    segment
        .iter()
        .copied()
        .take_while(|&i| stream.kind(i) != Some(TokenKind::LParen))
        .filter(|&i| stream.kind(i) == Some(TokenKind::Ident))
        .map(|i| stream.text_at(i))
        .filter(|&text| !matches!(text, "getraises" | "setraises"))
        .collect()
}

/// `const Type NAME = value;`
fn constant(stream: &TokenStream<'_>, at: usize) -> Option<(Construct, usize)> {
    let mut cursor = Cursor::new(stream, at);
    if !cursor.eat_keyword("const") {
        return None;
    }
    let (from, to) = cursor.until(TokenKind::Eq, BLOCK_TOKENS)?;
    let idents: Vec<&str> = (from..to)
        .filter(|&i| stream.kind(i) == Some(TokenKind::Ident))
        .map(|i| stream.text_at(i))
        .collect();
    if idents.len() < 2 {
        return None;
    }
    let name = idents.last()?;
    cursor.until(TokenKind::Semi, &[TokenKind::LBrace, TokenKind::RBrace])?;
    Some((Construct::Global { name: (*name).into() }, cursor.pos()))
}
