//! Protocol Buffer schema grammar.
//!
//! Recognises messages, enums, services, oneofs, RPC methods and imports.
//! Field declarations and options are skipped.

use super::grammar::Grammar;
use super::lexer::TokenKind;
use super::pattern::{self, Construct, Cursor, Pattern, TokenStream};
use crate::model::ContainerKind;

static PATTERNS: &[Pattern] = &[
    Pattern::new("String", pattern::string_literal),
    Pattern::new("Comment", pattern::comment),
    Pattern::new("Import", import),
    Pattern::new("Method", rpc),
    Pattern::new("Message", message),
    Pattern::new("Enum", enumeration),
    Pattern::new("Service", service),
    Pattern::new("OneOf", oneof),
    Pattern::new("Begin", pattern::open_brace),
    Pattern::new("End", pattern::close_brace),
];

/// The ProtoBuf grammar.
#[derive(Clone, Copy, Debug, Default)]
pub struct ProtoGrammar;

impl Grammar for ProtoGrammar {
    fn name(&self) -> &'static str {
        "protobuf"
    }

    fn extensions(&self) -> &'static [&'static str] {
        &["proto"]
    }

    fn patterns(&self) -> &'static [Pattern] {
        PATTERNS
    }

    fn accepts_methods(&self, kind: ContainerKind) -> bool {
        kind == ContainerKind::Service
    }
}

/// `import [public|weak] "path.proto";`
fn import(stream: &TokenStream<'_>, at: usize) -> Option<(Construct, usize)> {
    let mut cursor = Cursor::new(stream, at);
    if !cursor.eat_keyword("import") {
        return None;
    }
    if !cursor.eat_keyword("public") {
        cursor.eat_keyword("weak");
    }
    let literal = cursor.eat(TokenKind::StringLit)?;
    cursor.eat(TokenKind::Semi)?;
    Some((
        Construct::Import {
            target: pattern::unquote(stream.text_at(literal)).to_owned(),
        },
        cursor.pos(),
    ))
}

/// `rpc Name (Request) returns (Response)`
fn rpc(stream: &TokenStream<'_>, at: usize) -> Option<(Construct, usize)> {
    const STOP: &[TokenKind] = &[TokenKind::LBrace, TokenKind::RBrace, TokenKind::Semi];

    let mut cursor = Cursor::new(stream, at);
    if !cursor.eat_keyword("rpc") {
        return None;
    }
    let name = cursor.ident()?;
    cursor.eat(TokenKind::LParen)?;
    let request = cursor.until(TokenKind::RParen, STOP)?;
    if !cursor.eat_keyword("returns") {
        return None;
    }
    cursor.eat(TokenKind::LParen)?;
    let response = cursor.until(TokenKind::RParen, STOP)?;
    let signature = stream.clean_text(request.0, request.1);
    let returns = stream.clean_text(response.0, response.1);
    if signature.is_empty() || returns.is_empty() {
        return None;
    }
    Some((
        Construct::Method {
            name: name.into(),
            signature,
            returns: Some(returns),
        },
        cursor.pos(),
    ))
}

fn message(stream: &TokenStream<'_>, at: usize) -> Option<(Construct, usize)> {
    pattern::keyword_container(stream, at, "message", ContainerKind::Message)
}

fn enumeration(stream: &TokenStream<'_>, at: usize) -> Option<(Construct, usize)> {
    pattern::keyword_container(stream, at, "enum", ContainerKind::Enum)
}

fn service(stream: &TokenStream<'_>, at: usize) -> Option<(Construct, usize)> {
    pattern::keyword_container(stream, at, "service", ContainerKind::Service)
}

fn oneof(stream: &TokenStream<'_>, at: usize) -> Option<(Construct, usize)> {
    pattern::keyword_container(stream, at, "oneof", ContainerKind::OneOf)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::Scanner;

    fn constructs(text: &str) -> Vec<Construct> {
        Scanner::new(&ProtoGrammar, text).map(|m| m.construct).collect()
    }

    #[test]
    fn test_service_with_rpcs() {
        let found = constructs(
            "service Search {\n  rpc Find(stream Query) returns (stream Result);\n  rpc Ping(Empty) returns (Empty) {}\n}",
        );
        assert_eq!(
            found,
            vec![
                Construct::ContainerOpen {
                    kind: ContainerKind::Service,
                    name: "Search".into(),
                    supers: vec![],
                },
                Construct::Method {
                    name: "Find".into(),
                    signature: "stream Query".into(),
                    returns: Some("stream Result".into()),
                },
                Construct::Method {
                    name: "Ping".into(),
                    signature: "Empty".into(),
                    returns: Some("Empty".into()),
                },
                Construct::OpenBrace,
                Construct::CloseBrace,
                Construct::CloseBrace,
            ]
        );
    }

    #[test]
    fn test_rpc_requires_request_and_response() {
        assert!(constructs("rpc Broken() returns (Res);").is_empty());
        assert!(constructs("rpc Half(Req);").is_empty());
    }

    #[test]
    fn test_message_enum_oneof() {
        let found = constructs(
            "message Shape {\n  enum Kind { CIRCLE = 0; }\n  oneof geometry { double radius = 2; }\n  string name = 3;\n}",
        );
        let opened: Vec<_> = found
            .iter()
            .filter_map(|c| match c {
                Construct::ContainerOpen { kind, name, .. } => Some((*kind, name.as_str())),
                _ => None,
            })
            .collect();
        assert_eq!(
            opened,
            vec![
                (ContainerKind::Message, "Shape"),
                (ContainerKind::Enum, "Kind"),
                (ContainerKind::OneOf, "geometry"),
            ]
        );
        assert_eq!(found.iter().filter(|c| **c == Construct::CloseBrace).count(), 3);
    }

    #[test]
    fn test_imports() {
        let found = constructs(
            "syntax = \"proto3\";\nimport \"common/types.proto\";\nimport public \"other.proto\";",
        );
        assert_eq!(
            found,
            vec![
                Construct::StringLiteral,
                Construct::Import {
                    target: "common/types.proto".into()
                },
                Construct::Import {
                    target: "other.proto".into()
                },
            ]
        );
    }

    #[test]
    fn test_keywords_inside_strings_are_ignored() {
        let found = constructs("option note = \"message Fake { }\";");
        assert_eq!(found, vec![Construct::StringLiteral]);
    }
}
