//! The shared outline-building algorithm.
//!
//! The builder drives a grammar's [`Scanner`] over the source and keeps
//! three pieces of state while doing so:
//!
//! - a nesting depth, raised by every container keyword and bare `{` and
//!   lowered by every `}`;
//! - a scope stack of `(entity or placeholder, depth)` pairs recording which
//!   constructs are still open;
//! - a [`LineCounter`] that only moves forward.
//!
//! Entities live in an arena while the scan runs so that children can be
//! attached to a parent that is still open; the arena is folded into an
//! owned tree when the scan finishes.

use std::path::PathBuf;

use indexmap::IndexMap;
use smol_str::{SmolStr, format_smolstr};
use tracing::debug;

use super::Outline;
use crate::base::{DecodedText, LineCounter, TextSize};
use crate::model::{Attribute, Container, ContainerKind, EntityInfo, Function, Item, Visibility};
use crate::syntax::{Construct, Grammar, Scanner};

/// Builds the [`Outline`] of one module with one grammar.
pub struct OutlineBuilder<'g> {
    grammar: &'g dyn Grammar,
    module: SmolStr,
    file: PathBuf,
    separator: String,
}

impl<'g> OutlineBuilder<'g> {
    pub fn new(grammar: &'g dyn Grammar, module: impl Into<SmolStr>, file: impl Into<PathBuf>) -> Self {
        Self {
            grammar,
            module: module.into(),
            file: file.into(),
            separator: ",".to_owned(),
        }
    }

    /// Set the string method parameter lists are split on.
    pub fn separator(mut self, separator: impl Into<String>) -> Self {
        self.separator = separator.into();
        self
    }

    /// The outline substituted when the source cannot be read.
    pub fn empty(&self) -> Outline {
        Outline::empty(self.module.clone(), self.file.clone(), self.grammar.name())
    }

    /// Scan `text` and build its outline.
    pub fn build(&self, text: &str) -> Outline {
        let mut scan = Scan::new(self);
        for m in Scanner::new(self.grammar, text) {
            let line = scan.lines.advance_to(text, m.range.start());
            scan.apply(m.construct, line);
        }
        let end = TextSize::try_from(text.len()).unwrap_or(TextSize::from(u32::MAX));
        let lines = scan.lines.advance_to(text, end);
        let outline = scan.finish();
        debug!(
            module = %self.module,
            grammar = self.grammar.name(),
            entries = outline.len(),
            lines,
            "scanned module"
        );
        outline
    }

    /// Build from decoded file contents, recording the encoding and hash.
    pub fn build_decoded(&self, source: &DecodedText) -> Outline {
        let mut outline = self.build(&source.text);
        outline.encoding = Some(source.encoding);
        outline.content_hash = Some(source.hash);
        outline
    }
}

type NodeId = usize;

enum Node {
    Container(ContainerNode),
    Function(Function),
}

/// A container whose children are still arena references.
struct ContainerNode {
    container: Container,
    methods: IndexMap<SmolStr, NodeId>,
    classes: IndexMap<SmolStr, NodeId>,
}

impl Node {
    fn info_mut(&mut self) -> &mut EntityInfo {
        match self {
            Node::Container(node) => &mut node.container.info,
            Node::Function(function) => &mut function.info,
        }
    }
}

/// An open construct. `node` is `None` for placeholders that only keep
/// depth bookkeeping.
#[derive(Clone, Copy, Debug)]
struct Scope {
    node: Option<NodeId>,
    depth: i32,
}

/// State of one scan.
struct Scan<'b, 'g> {
    builder: &'b OutlineBuilder<'g>,
    nodes: Vec<Node>,
    stack: Vec<Scope>,
    depth: i32,
    lines: LineCounter,
    top_level: IndexMap<SmolStr, NodeId>,
    superseded: Vec<NodeId>,
    /// Most recent top-level entity, closed when the next one appears.
    last_global: Option<NodeId>,
    /// Most recent method, closed by the next method or container.
    current_function: Option<NodeId>,
    imports: Vec<String>,
}

impl<'b, 'g> Scan<'b, 'g> {
    fn new(builder: &'b OutlineBuilder<'g>) -> Self {
        Self {
            builder,
            nodes: Vec::new(),
            stack: Vec::new(),
            depth: 0,
            lines: LineCounter::new(),
            top_level: IndexMap::new(),
            superseded: Vec::new(),
            last_global: None,
            current_function: None,
            imports: Vec::new(),
        }
    }

    fn apply(&mut self, construct: Construct, line: u32) {
        match construct {
            Construct::ContainerOpen { kind, name, supers } => {
                self.open_container(kind, name, supers, line)
            }
            Construct::Method {
                name,
                signature,
                returns,
            } => self.open_method(name, &signature, returns, line),
            Construct::Attribute { names, readonly } => self.attribute(names, readonly, line),
            Construct::Global { name } => self.global(name, line),
            Construct::OpenBrace => self.depth += 1,
            Construct::CloseBrace => self.close_brace(line),
            Construct::Import { target } => self.imports.push(target),
            Construct::StringLiteral | Construct::Comment => {}
        }
    }

    fn open_container(&mut self, kind: ContainerKind, name: SmolStr, supers: Vec<SmolStr>, line: u32) {
        let depth = self.depth;
        self.depth += 1;
        self.close_superseded(depth, line);

        let container = Container::new(kind, self.info(name.clone(), line)).with_supers(supers);
        let id = self.alloc(Node::Container(ContainerNode {
            container,
            methods: IndexMap::new(),
            classes: IndexMap::new(),
        }));

        let grammar = self.builder.grammar;
        match self.stack.last().copied() {
            None => self.insert_top_level(name, id, line),
            Some(Scope {
                node: Some(parent), ..
            }) => {
                if let Node::Container(parent) = &mut self.nodes[parent] {
                    if grammar.may_nest(parent.container.kind, kind) {
                        parent.classes.insert(name, id);
                    }
                }
            }
            Some(_) => {}
        }

        self.close_current_function(line);
        self.stack.push(Scope {
            node: Some(id),
            depth,
        });
    }

    fn open_method(&mut self, name: SmolStr, signature: &str, returns: Option<String>, line: u32) {
        let depth = self.depth;
        self.close_superseded(depth, line);

        let grammar = self.builder.grammar;
        let parent = match self.stack.last().copied() {
            None => None,
            Some(Scope { node: Some(top), .. }) if self.kind(top).is_some() => {
                match self.enclosing(|kind| grammar.accepts_methods(kind)) {
                    Some(parent) => Some(parent),
                    None => {
                        self.close_current_function(line);
                        return self.push_placeholder(depth);
                    }
                }
            }
            // Functions do not nest.
            Some(_) => {
                self.close_current_function(line);
                return self.push_placeholder(depth);
            }
        };

        let mut function = Function::new(self.info(name.clone(), line), signature, &self.builder.separator);
        if let Some(returns) = returns {
            function = function.with_annotation(format!("-> {returns}"));
        }
        let id = self.alloc(Node::Function(function));

        match parent {
            Some(parent) => {
                if let Node::Container(parent) = &mut self.nodes[parent] {
                    parent.methods.insert(name, id);
                }
            }
            None => {
                let key = self.free_function_key(&name);
                self.insert_top_level(key, id, line);
            }
        }

        self.close_current_function(line);
        self.current_function = Some(id);
        self.stack.push(Scope {
            node: Some(id),
            depth,
        });
    }

    fn attribute(&mut self, names: Vec<SmolStr>, readonly: bool, line: u32) {
        let grammar = self.builder.grammar;
        let Some(target) = self.enclosing(|kind| grammar.accepts_attributes(kind)) else {
            self.finalize_last_global(line);
            return;
        };
        let visibility = if readonly {
            Visibility::Private
        } else {
            Visibility::Public
        };
        for name in names {
            let attribute = Attribute::new(self.info(name, line).with_visibility(visibility));
            if let Node::Container(node) = &mut self.nodes[target] {
                node.container.add_attribute(attribute);
            }
        }
    }

    fn global(&mut self, name: SmolStr, line: u32) {
        let grammar = self.builder.grammar;
        let Some(target) = self.enclosing(|kind| grammar.accepts_globals(kind)) else {
            return;
        };
        let global = Attribute::new(self.info(name, line));
        if let Node::Container(node) = &mut self.nodes[target] {
            node.container.add_global(global);
        }
    }

    /// Leave one nesting level, closing every scope opened at or below it.
    fn close_brace(&mut self, line: u32) {
        self.depth -= 1;
        while let Some(scope) = self.stack.last().copied() {
            if scope.depth < self.depth {
                break;
            }
            self.stack.pop();
            let Some(id) = scope.node else { continue };
            let node = &mut self.nodes[id];
            let end = match node {
                Node::Container(_) => line,
                Node::Function(function) => line.saturating_sub(1).max(function.info.start_line),
            };
            node.info_mut().close(end);
        }
    }

    /// Pop every scope opened at `depth` or deeper; a construct starting on
    /// `line` ends them on the line before.
    fn close_superseded(&mut self, depth: i32, line: u32) {
        while let Some(scope) = self.stack.last().copied() {
            if scope.depth < depth {
                break;
            }
            self.stack.pop();
            if let Some(id) = scope.node {
                self.close(id, line.saturating_sub(1));
            }
        }
    }

    fn insert_top_level(&mut self, key: SmolStr, id: NodeId, line: u32) {
        if let Some(previous) = self.top_level.insert(key, id) {
            self.superseded.push(previous);
        }
        self.finalize_last_global(line);
        self.last_global = Some(id);
    }

    fn finalize_last_global(&mut self, line: u32) {
        if let Some(id) = self.last_global.take() {
            self.close(id, line.saturating_sub(1));
        }
    }

    fn close_current_function(&mut self, line: u32) {
        if let Some(id) = self.current_function.take() {
            self.close(id, line.saturating_sub(1));
        }
    }

    fn push_placeholder(&mut self, depth: i32) {
        self.stack.push(Scope { node: None, depth });
    }

    /// Nearest open container below the current depth whose kind passes
    /// `accepts`.
    fn enclosing(&self, accepts: impl Fn(ContainerKind) -> bool) -> Option<NodeId> {
        self.stack
            .iter()
            .rev()
            .filter(|scope| scope.depth < self.depth)
            .filter_map(|scope| scope.node)
            .find(|&id| self.kind(id).is_some_and(&accepts))
    }

    /// `name`, or `name_1`, `name_2`, ... if that is already taken.
    fn free_function_key(&self, name: &SmolStr) -> SmolStr {
        let mut key = name.clone();
        let mut index = 0;
        while self.top_level.contains_key(&key) {
            index += 1;
            key = format_smolstr!("{name}_{index}");
        }
        key
    }

    fn kind(&self, id: NodeId) -> Option<ContainerKind> {
        match &self.nodes[id] {
            Node::Container(node) => Some(node.container.kind),
            Node::Function(_) => None,
        }
    }

    fn close(&mut self, id: NodeId, end_line: u32) {
        self.nodes[id].info_mut().close(end_line);
    }

    fn info(&self, name: SmolStr, line: u32) -> EntityInfo {
        EntityInfo::new(self.builder.module.clone(), name, self.builder.file.clone(), line)
    }

    fn alloc(&mut self, node: Node) -> NodeId {
        self.nodes.push(node);
        self.nodes.len() - 1
    }

    fn finish(self) -> Outline {
        let Scan {
            builder,
            nodes,
            top_level,
            superseded,
            imports,
            ..
        } = self;
        let mut arena: Vec<Option<Node>> = nodes.into_iter().map(Some).collect();

        let entries = top_level
            .into_iter()
            .filter_map(|(key, id)| Some((key, take_item(&mut arena, id)?)))
            .collect();
        let superseded = superseded
            .into_iter()
            .filter_map(|id| take_item(&mut arena, id))
            .collect();

        Outline {
            imports,
            entries,
            superseded,
            ..builder.empty()
        }
    }
}

fn take_item(arena: &mut [Option<Node>], id: NodeId) -> Option<Item> {
    match arena.get_mut(id)?.take()? {
        Node::Container(node) => Some(Item::Container(assemble(arena, node))),
        Node::Function(function) => Some(Item::Function(function)),
    }
}

fn assemble(arena: &mut [Option<Node>], node: ContainerNode) -> Container {
    let ContainerNode {
        mut container,
        methods,
        classes,
    } = node;
    for (name, id) in methods {
        if let Some(Item::Function(function)) = take_item(arena, id) {
            container.add_method(name, function);
        }
    }
    for (name, id) in classes {
        if let Some(Item::Container(class)) = take_item(arena, id) {
            container.add_class(name, class);
        }
    }
    container
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::base::Encoding;
    use crate::model::EntityRef;
    use crate::syntax::{IdlGrammar, ProtoGrammar};

    fn idl(text: &str) -> Outline {
        OutlineBuilder::new(&IdlGrammar, "Bank.idl", "/idl/Bank.idl").build(text)
    }

    fn proto(text: &str) -> Outline {
        OutlineBuilder::new(&ProtoGrammar, "search.proto", "/proto/search.proto").build(text)
    }

    fn assert_all_closed(outline: &Outline) {
        for entity in outline.entities() {
            let info = entity.info();
            let end = info
                .end_line
                .unwrap_or_else(|| panic!("{} was never closed", info.name));
            assert!(end + 1 >= info.start_line, "{} ends at {end} before it starts", info.name);
        }
    }

    #[test]
    fn test_single_line_nesting() {
        let outline = idl("module A { interface B { void f(); }; };");
        let a = outline.container("A").unwrap();
        assert_eq!(a.kind, ContainerKind::Module);
        assert_eq!(a.info.end_line, Some(1));
        let b = a.class("B").unwrap();
        assert_eq!(b.kind, ContainerKind::Interface);
        let f = b.method("f").unwrap();
        assert!(f.parameters.is_empty());
        assert_eq!(f.info.module, "Bank.idl");
        assert_eq!(outline.len(), 1);
        assert_all_closed(&outline);
    }

    #[test]
    fn test_closing_lines_follow_braces() {
        let outline = idl("module A {\n  interface B {\n    void f();\n  };\n};\n");
        let a = outline.container("A").unwrap();
        let b = a.class("B").unwrap();
        assert_eq!(b.method("f").unwrap().info.end_line, Some(3));
        assert_eq!(b.info.end_line, Some(4));
        assert_eq!(a.info.end_line, Some(5));
        assert_eq!((a.info.start_line, b.info.start_line), (1, 2));
    }

    #[test]
    fn test_sequential_methods_close_each_other() {
        let outline = idl("interface I {\n  void a();\n\n  void b(in long x,\n         in long y);\n};");
        let i = outline.container("I").unwrap();
        assert_eq!(i.method("a").unwrap().info.end_line, Some(3));
        let b = i.method("b").unwrap();
        assert_eq!(b.parameters, vec!["in long x", "in long y"]);
        assert_eq!(b.info.end_line, Some(5));
    }

    #[test]
    fn test_custom_separator() {
        let outline = OutlineBuilder::new(&IdlGrammar, "m", "m.idl")
            .separator(";")
            .build("interface I { void f(in long a, in long b); };");
        let f = outline.container("I").unwrap().method("f").unwrap();
        assert_eq!(f.parameters, vec!["in long a, in long b"]);
    }

    #[test]
    fn test_redeclared_attribute_merges() {
        let outline = idl(
            "interface Account {\n  attribute long balance;\n  void touch();\n  attribute long balance;\n  attribute long owner; attribute long owner;\n};",
        );
        let account = outline.container("Account").unwrap();
        assert_eq!(account.attributes.len(), 2);
        assert_eq!(account.attribute("balance").unwrap().line_numbers, vec![2, 4]);
        assert_eq!(account.attribute("owner").unwrap().line_numbers, vec![5]);
    }

    #[test]
    fn test_readonly_attributes_are_private() {
        let outline = idl("interface A {\n  readonly attribute long id, code;\n  attribute string label;\n};");
        let a = outline.container("A").unwrap();
        assert!(a.attribute("id").unwrap().info.visibility.is_private());
        assert!(a.attribute("code").unwrap().info.visibility.is_private());
        assert!(a.attribute("label").unwrap().info.visibility.is_public());
    }

    #[test]
    fn test_duplicate_top_level_containers() {
        let outline = idl("interface X {\n};\ninterface X {\n  void op();\n};");
        assert_eq!(outline.len(), 1);
        let x = outline.container("X").unwrap();
        assert_eq!(x.info.start_line, 3);
        assert!(x.method("op").is_some());

        assert_eq!(outline.superseded.len(), 1);
        let earlier = outline.superseded[0].info();
        assert_eq!((earlier.start_line, earlier.end_line), (1, Some(2)));

        let closed = outline
            .entities()
            .into_iter()
            .filter(|e| matches!(e, EntityRef::Container(_)) && e.info().is_closed())
            .count()
            + outline.superseded.iter().filter(|i| i.info().is_closed()).count();
        assert_eq!(closed, 2);
    }

    #[test]
    fn test_free_functions_are_disambiguated() {
        let outline = idl("void f();\nvoid f(in long a);\nvoid f();\n");
        let keys: Vec<_> = outline.entries.keys().map(SmolStr::as_str).collect();
        assert_eq!(keys, vec!["f", "f_1", "f_2"]);
        assert_eq!(outline.function("f").unwrap().info.end_line, Some(1));
        let second = outline.function("f_1").unwrap();
        assert_eq!(second.info.name, "f");
        assert_eq!(second.parameters, vec!["in long a"]);
        assert_eq!(second.info.end_line, Some(2));
        assert!(outline.superseded.is_empty());
    }

    #[test]
    fn test_free_function_does_not_replace_container() {
        let outline = idl("interface f {};\nvoid f();");
        assert!(outline.container("f").is_some());
        assert!(outline.function("f_1").is_some());
    }

    #[test]
    fn test_top_level_attribute_is_dropped() {
        let outline = idl("attribute long stray;\ninterface I {\n};\nreadonly attribute long x;\n");
        assert_eq!(outline.len(), 1);
        assert!(
            outline
                .entities()
                .into_iter()
                .all(|e| !matches!(e, EntityRef::Attribute(_)))
        );
        assert_all_closed(&outline);
    }

    #[test]
    fn test_unterminated_input_leaves_scopes_open() {
        let outline = idl("module M {\n  interface I {\n    void f();\n");
        let m = outline.container("M").unwrap();
        let i = m.class("I").unwrap();
        assert_eq!(m.info.end_line, None);
        assert_eq!(i.info.end_line, None);
        assert_eq!(i.method("f").unwrap().info.end_line, None);
    }

    #[test]
    fn test_module_constants_become_globals() {
        let outline = idl(
            "module M {\n  const long MAX = 10;\n  const long MAX = 11;\n  interface I { const long LOCAL = 1; };\n};\nconst long TOP = 1;",
        );
        let m = outline.container("M").unwrap();
        assert_eq!(m.global("MAX").unwrap().line_numbers, vec![2, 3]);
        assert_eq!(m.global("LOCAL").unwrap().line_numbers, vec![4]);
        assert!(m.class("I").unwrap().globals.is_empty());
        assert_eq!(outline.len(), 1);
    }

    #[test]
    fn test_interface_supers_are_recorded() {
        let outline = idl("interface Checking : Account, Audited {\n};");
        let checking = outline.container("Checking").unwrap();
        assert_eq!(checking.supers, vec!["Account", "Audited"]);
    }

    #[test]
    fn test_includes_are_recorded() {
        let outline = idl("#include \"orb.idl\"\n#include <Common.idl>\nmodule M {};");
        assert_eq!(outline.imports, vec!["orb.idl", "Common.idl"]);
    }

    #[test]
    fn test_service_rpc_annotation() {
        let outline = proto("service S {\n  rpc Get(Req) returns (Res);\n}\n");
        let s = outline.container("S").unwrap();
        let get = s.method("Get").unwrap();
        assert_eq!(get.parameters, vec!["Req"]);
        assert_eq!(get.annotation.as_deref(), Some("-> Res"));
        assert_eq!(get.info.end_line, Some(2));
        assert_eq!(s.info.end_line, Some(3));
    }

    #[test]
    fn test_rpc_inside_message_attaches_to_service() {
        let outline = proto("service S {\n  message M { rpc Get(Req) returns (Res); }\n}");
        let s = outline.container("S").unwrap();
        assert!(s.class("M").unwrap().methods.is_empty());
        assert!(s.method("Get").unwrap().annotation.as_deref().unwrap().ends_with("Res"));
    }

    #[test]
    fn test_rpc_outside_service_is_dropped() {
        let outline = proto("message M {\n  rpc Get(Req) returns (Res);\n}\n");
        let m = outline.container("M").unwrap();
        assert!(m.methods.is_empty());
        assert_eq!(m.info.end_line, Some(3));
        assert_eq!(outline.len(), 1);
    }

    #[test]
    fn test_method_in_anonymous_block_closes_current_method() {
        let outline = idl("interface I {\n  void f();\n  {\n    void g();\n\n  }\n};\n");
        let i = outline.container("I").unwrap();
        let methods: Vec<_> = i.methods.keys().map(|k| k.as_str()).collect();
        assert_eq!(methods, vec!["f"]);
        assert_eq!(i.method("f").unwrap().info.end_line, Some(3));
        assert_eq!(i.info.end_line, Some(7));
        assert_all_closed(&outline);
    }

    #[test]
    fn test_rpc_in_rpc_body_closes_outer_rpc() {
        let outline = proto(
            "service S {\n  rpc A(X) returns (Y) {\n    rpc B(X) returns (Y);\n\n  }\n}\n",
        );
        let s = outline.container("S").unwrap();
        assert_eq!(s.methods.len(), 1);
        assert_eq!(s.method("A").unwrap().info.end_line, Some(2));
        assert_eq!(s.info.end_line, Some(6));
    }

    #[test]
    fn test_rpc_bodies_are_anonymous_blocks() {
        let outline = proto(
            "service S {\n  rpc A(X) returns (Y) {\n    option deprecated = true;\n  }\n  rpc B(X) returns (Y);\n}\n",
        );
        let s = outline.container("S").unwrap();
        assert_eq!(s.method("A").unwrap().info.end_line, Some(3));
        assert_eq!(s.method("B").unwrap().info.end_line, Some(5));
        assert_eq!(s.info.end_line, Some(6));
        assert_all_closed(&outline);
    }

    #[test]
    fn test_proto_nested_containers() {
        let outline = proto(
            "syntax = \"proto3\";\nimport \"common.proto\";\n\nmessage Shape {\n  enum Kind {\n    CIRCLE = 0;\n  }\n  oneof geometry {\n    double radius = 2;\n  }\n  message Point { int32 x = 1; }\n}\n",
        );
        assert_eq!(outline.imports, vec!["common.proto"]);
        let shape = outline.container("Shape").unwrap();
        assert_eq!(shape.info.start_line, 4);
        assert_eq!(shape.info.end_line, Some(12));
        let kind = shape.class("Kind").unwrap();
        assert!(kind.is_enum());
        assert_eq!(kind.info.end_line, Some(7));
        assert_eq!(shape.class("geometry").unwrap().kind, ContainerKind::OneOf);
        assert_eq!(shape.class("Point").unwrap().info.end_line, Some(11));
        assert_all_closed(&outline);
    }

    #[test]
    fn test_build_decoded_records_source_details() {
        let source = DecodedText {
            text: Arc::from("message M {}"),
            encoding: Encoding::Utf8Bom,
            hash: 7,
        };
        let outline = OutlineBuilder::new(&ProtoGrammar, "m.proto", "m.proto").build_decoded(&source);
        assert_eq!(outline.encoding, Some(Encoding::Utf8Bom));
        assert_eq!(outline.content_hash, Some(7));
        assert_eq!(outline.grammar, "protobuf");
        assert!(outline.container("M").is_some());
    }

    #[test]
    fn test_empty_source() {
        let outline = idl("");
        assert!(outline.is_empty());
        assert!(outline.imports.is_empty());
    }
}
