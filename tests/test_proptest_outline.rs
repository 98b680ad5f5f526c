//! Property-based tests for the outline builder.
//!
//! Generates well-formed nested IDL and checks that every entity is closed
//! inside the file, then throws arbitrary text at both grammars to check
//! that scanning never panics.
#![cfg(feature = "proptest")]

use outliner::{IdlGrammar, OutlineBuilder, ProtoGrammar};
use proptest::prelude::*;

// ============================================================================
// PROPTEST STRATEGIES
// ============================================================================

#[derive(Clone, Debug)]
enum Decl {
    Module(String, Vec<Decl>),
    Interface {
        name: String,
        methods: Vec<String>,
        attributes: Vec<String>,
    },
}

/// Capitalized names never collide with IDL keywords.
fn arb_type_name() -> impl Strategy<Value = String> {
    "[A-Z][a-zA-Z0-9_]{0,8}"
}

fn arb_member_name() -> impl Strategy<Value = String> {
    "m_[a-z0-9]{0,6}"
}

fn arb_interface() -> impl Strategy<Value = Decl> {
    (
        arb_type_name(),
        prop::collection::vec(arb_member_name(), 0..4),
        prop::collection::vec(arb_member_name(), 0..3),
    )
        .prop_map(|(name, methods, attributes)| Decl::Interface {
            name,
            methods,
            attributes,
        })
}

fn arb_decl() -> impl Strategy<Value = Decl> {
    arb_interface().prop_recursive(4, 24, 4, |inner| {
        (arb_type_name(), prop::collection::vec(inner, 0..4))
            .prop_map(|(name, children)| Decl::Module(name, children))
    })
}

fn render(decl: &Decl, indent: usize, out: &mut String) {
    let pad = "  ".repeat(indent);
    match decl {
        Decl::Module(name, children) => {
            out.push_str(&format!("{pad}module {name} {{\n"));
            for child in children {
                render(child, indent + 1, out);
            }
            out.push_str(&format!("{pad}}};\n"));
        }
        Decl::Interface {
            name,
            methods,
            attributes,
        } => {
            out.push_str(&format!("{pad}interface {name} {{\n"));
            for attribute in attributes {
                out.push_str(&format!("{pad}  attribute long {attribute};\n"));
            }
            for method in methods {
                out.push_str(&format!("{pad}  void {method}(in long a,\n{pad}      in string b);\n"));
            }
            out.push_str(&format!("{pad}}};\n"));
        }
    }
}

const SOUP: &[&str] = &[
    "module", "interface", "message", "service", "rpc", "returns", "attribute",
    "readonly", "const", "enum", "oneof", "X", "y", "{", "}", "};", "(", ")", ";",
    ",", ":", "=", "\n", "\"s\"", "//c\n",
];

// ============================================================================
// PROPERTIES
// ============================================================================

proptest! {
    #[test]
    fn well_formed_idl_closes_every_entity(decls in prop::collection::vec(arb_decl(), 1..4)) {
        let mut text = String::new();
        for decl in &decls {
            render(decl, 0, &mut text);
        }
        let line_count = text.lines().count() as u32;

        let outline = OutlineBuilder::new(&IdlGrammar, "gen.idl", "gen.idl").build(&text);
        prop_assert!(!outline.is_empty());
        prop_assert!(outline.len() <= decls.len());

        for entity in outline.entities() {
            let info = entity.info();
            let end = info.end_line;
            prop_assert!(end.is_some(), "{} left open in:\n{}", info.name, text);
            let end = end.unwrap_or_default();
            prop_assert!(end + 1 >= info.start_line);
            prop_assert!(end <= line_count);
        }
        for item in &outline.superseded {
            prop_assert!(item.info().is_closed());
        }
    }

    #[test]
    fn arbitrary_text_never_panics(text in any::<String>()) {
        let idl = OutlineBuilder::new(&IdlGrammar, "any.idl", "any.idl").build(&text);
        let proto = OutlineBuilder::new(&ProtoGrammar, "any.proto", "any.proto").build(&text);
        prop_assert!(idl.len() + proto.len() <= text.len());
    }

    #[test]
    fn token_soup_never_panics(
        parts in prop::collection::vec(
            prop::sample::select(SOUP),
            0..80,
        )
    ) {
        let text = parts.join(" ");
        let idl = OutlineBuilder::new(&IdlGrammar, "soup.idl", "soup.idl").build(&text);
        let proto = OutlineBuilder::new(&ProtoGrammar, "soup.proto", "soup.proto").build(&text);
        let lines = text.lines().count() as u32 + 1;
        for entity in idl.entities().into_iter().chain(proto.entities()) {
            prop_assert!(entity.info().start_line <= lines);
        }
    }
}
