//! Container entities: modules, interfaces, messages, services and enums.

use std::fmt;

use indexmap::IndexMap;
use indexmap::map::Entry;
use smol_str::SmolStr;

use super::{Attribute, EntityInfo, Function};

/// The construct that opened a container.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ContainerKind {
    Module,
    Interface,
    Struct,
    Exception,
    Enum,
    Message,
    Service,
    OneOf,
}

impl ContainerKind {
    /// The definition-language keyword for this kind.
    pub fn keyword(self) -> &'static str {
        match self {
            Self::Module => "module",
            Self::Interface => "interface",
            Self::Struct => "struct",
            Self::Exception => "exception",
            Self::Enum => "enum",
            Self::Message => "message",
            Self::Service => "service",
            Self::OneOf => "oneof",
        }
    }
}

impl fmt::Display for ContainerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

/// An entity that owns methods, attributes, globals and nested containers.
///
/// Enums are containers too; their member lists are not collected, so their
/// maps stay empty.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Container {
    pub info: EntityInfo,
    pub kind: ContainerKind,
    /// Inherited names, in declaration order.
    pub supers: Vec<SmolStr>,
    pub methods: IndexMap<SmolStr, Function>,
    pub attributes: IndexMap<SmolStr, Attribute>,
    pub classes: IndexMap<SmolStr, Container>,
    /// Module-scoped constants; only module containers fill this.
    pub globals: IndexMap<SmolStr, Attribute>,
}

impl Container {
    pub fn new(kind: ContainerKind, info: EntityInfo) -> Self {
        Self {
            info,
            kind,
            supers: Vec::new(),
            methods: IndexMap::new(),
            attributes: IndexMap::new(),
            classes: IndexMap::new(),
            globals: IndexMap::new(),
        }
    }

    pub fn with_supers(mut self, supers: Vec<SmolStr>) -> Self {
        self.supers = supers;
        self
    }

    pub fn name(&self) -> &str {
        &self.info.name
    }

    pub fn is_enum(&self) -> bool {
        self.kind == ContainerKind::Enum
    }

    /// Add a method, replacing any method of the same name.
    pub fn add_method(&mut self, name: impl Into<SmolStr>, function: Function) {
        self.methods.insert(name.into(), function);
    }

    pub fn method(&self, name: &str) -> Option<&Function> {
        self.methods.get(name)
    }

    /// Add an attribute; a repeated name records another line on the
    /// existing attribute instead.
    pub fn add_attribute(&mut self, attribute: Attribute) {
        merge_into(&mut self.attributes, attribute);
    }

    pub fn attribute(&self, name: &str) -> Option<&Attribute> {
        self.attributes.get(name)
    }

    /// Add a module-scoped global, merging repeated names like attributes.
    pub fn add_global(&mut self, attribute: Attribute) {
        merge_into(&mut self.globals, attribute);
    }

    pub fn global(&self, name: &str) -> Option<&Attribute> {
        self.globals.get(name)
    }

    /// Add a nested container, replacing any container of the same name.
    pub fn add_class(&mut self, name: impl Into<SmolStr>, container: Container) {
        self.classes.insert(name.into(), container);
    }

    pub fn class(&self, name: &str) -> Option<&Container> {
        self.classes.get(name)
    }
}

fn merge_into(map: &mut IndexMap<SmolStr, Attribute>, attribute: Attribute) {
    match map.entry(attribute.info.name.clone()) {
        Entry::Occupied(entry) => entry.into_mut().add_assignment(attribute.info.start_line),
        Entry::Vacant(entry) => {
            entry.insert(attribute);
        }
    }
}
