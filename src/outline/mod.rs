//! Outlines: the per-module result of a scan.
//!
//! An [`Outline`] maps every top-level name in a module to its entity
//! graph. It is produced by the [`OutlineBuilder`] and memoized by the
//! [`ModuleCache`].

mod builder;
mod cache;

pub use builder::OutlineBuilder;
pub use cache::ModuleCache;

use std::path::PathBuf;

use indexmap::IndexMap;
use smol_str::SmolStr;

use crate::base::Encoding;
use crate::model::{Container, EntityRef, Function, Item};

/// The top-level entities of one module.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Outline {
    /// Module identifier the outline was requested under.
    pub module: SmolStr,
    /// The file that was scanned.
    pub path: PathBuf,
    /// Name of the grammar used for the scan.
    pub grammar: SmolStr,
    /// Detected encoding; `None` when the source could not be read.
    pub encoding: Option<Encoding>,
    /// Hash of the raw source bytes; `None` when the source could not be read.
    pub content_hash: Option<u64>,
    /// Top-level entries keyed by name. Free functions whose names collide
    /// are stored under `name_1`, `name_2`, ...
    pub entries: IndexMap<SmolStr, Item>,
    /// Top-level containers replaced by a later definition of the same name,
    /// in the order they were replaced.
    pub superseded: Vec<Item>,
    /// Referenced modules in encounter order.
    pub imports: Vec<String>,
}

impl Outline {
    /// An outline with no entries, as returned for unreadable sources.
    pub fn empty(module: impl Into<SmolStr>, path: impl Into<PathBuf>, grammar: impl Into<SmolStr>) -> Self {
        Self {
            module: module.into(),
            path: path.into(),
            grammar: grammar.into(),
            encoding: None,
            content_hash: None,
            entries: IndexMap::new(),
            superseded: Vec::new(),
            imports: Vec::new(),
        }
    }

    pub fn get(&self, name: &str) -> Option<&Item> {
        self.entries.get(name)
    }

    pub fn container(&self, name: &str) -> Option<&Container> {
        self.get(name).and_then(Item::as_container)
    }

    pub fn function(&self, name: &str) -> Option<&Function> {
        self.get(name).and_then(Item::as_function)
    }

    /// Follow a path of names through nested containers, e.g.
    /// `["Bank", "Account"]`.
    pub fn find_container(&self, path: &[&str]) -> Option<&Container> {
        let (first, rest) = path.split_first()?;
        rest.iter()
            .try_fold(self.container(first)?, |container, name| container.class(name))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&SmolStr, &Item)> {
        self.entries.iter()
    }

    /// Every entity reachable from the top-level entries, depth first:
    /// containers, their methods, attributes, globals and nested containers.
    pub fn entities(&self) -> Vec<EntityRef<'_>> {
        let mut out = Vec::new();
        for item in self.entries.values() {
            match item {
                Item::Container(container) => collect(container, &mut out),
                Item::Function(function) => out.push(EntityRef::Function(function)),
            }
        }
        out
    }
}

fn collect<'a>(container: &'a Container, out: &mut Vec<EntityRef<'a>>) {
    out.push(EntityRef::Container(container));
    out.extend(container.methods.values().map(EntityRef::Function));
    out.extend(container.attributes.values().map(EntityRef::Attribute));
    out.extend(container.globals.values().map(EntityRef::Attribute));
    for class in container.classes.values() {
        collect(class, out);
    }
}
