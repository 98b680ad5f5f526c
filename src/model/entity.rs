//! Common entity record and visibility.

use std::fmt;
use std::path::{Path, PathBuf};

use smol_str::SmolStr;

use super::{Attribute, Container, Function};

/// Visibility of a parsed construct.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Visibility {
    Private,
    Protected,
    #[default]
    Public,
}

impl Visibility {
    pub fn is_private(self) -> bool {
        self == Visibility::Private
    }

    pub fn is_protected(self) -> bool {
        self == Visibility::Protected
    }

    pub fn is_public(self) -> bool {
        self == Visibility::Public
    }
}

impl fmt::Display for Visibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Private => write!(f, "private"),
            Self::Protected => write!(f, "protected"),
            Self::Public => write!(f, "public"),
        }
    }
}

/// Location and identity shared by every parsed construct.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EntityInfo {
    /// Name of the module (source file identifier) owning this entity.
    pub module: SmolStr,
    /// The entity's own name.
    pub name: SmolStr,
    /// Path of the file the entity was read from.
    pub file: PathBuf,
    /// 1-indexed line of the definition.
    pub start_line: u32,
    /// 1-indexed last line, `None` until the builder closes the entity.
    pub end_line: Option<u32>,
    pub visibility: Visibility,
}

impl EntityInfo {
    /// Create an open, public entity record.
    pub fn new(
        module: impl Into<SmolStr>,
        name: impl Into<SmolStr>,
        file: impl Into<PathBuf>,
        start_line: u32,
    ) -> Self {
        Self {
            module: module.into(),
            name: name.into(),
            file: file.into(),
            start_line,
            end_line: None,
            visibility: Visibility::Public,
        }
    }

    /// Set the visibility.
    pub fn with_visibility(mut self, visibility: Visibility) -> Self {
        self.visibility = visibility;
        self
    }

    pub fn file(&self) -> &Path {
        &self.file
    }

    /// Whether an end line has been recorded.
    pub fn is_closed(&self) -> bool {
        self.end_line.is_some()
    }

    /// Record the end line unless one is already set.
    ///
    /// Returns `true` if this call closed the entity.
    pub(crate) fn close(&mut self, end_line: u32) -> bool {
        if self.end_line.is_some() {
            return false;
        }
        self.end_line = Some(end_line);
        true
    }
}

/// A top-level outline entry.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Item {
    Container(Container),
    Function(Function),
}

impl Item {
    pub fn info(&self) -> &EntityInfo {
        match self {
            Item::Container(container) => &container.info,
            Item::Function(function) => &function.info,
        }
    }

    pub fn name(&self) -> &str {
        &self.info().name
    }

    pub fn as_container(&self) -> Option<&Container> {
        match self {
            Item::Container(container) => Some(container),
            Item::Function(_) => None,
        }
    }

    pub fn as_function(&self) -> Option<&Function> {
        match self {
            Item::Function(function) => Some(function),
            Item::Container(_) => None,
        }
    }
}

/// Borrowed view of any entity in an outline, used when walking the graph.
#[derive(Clone, Copy, Debug)]
pub enum EntityRef<'a> {
    Container(&'a Container),
    Function(&'a Function),
    Attribute(&'a Attribute),
}

impl<'a> EntityRef<'a> {
    pub fn info(self) -> &'a EntityInfo {
        match self {
            EntityRef::Container(container) => &container.info,
            EntityRef::Function(function) => &function.info,
            EntityRef::Attribute(attribute) => &attribute.info,
        }
    }
}

impl<'a> From<&'a Item> for EntityRef<'a> {
    fn from(item: &'a Item) -> Self {
        match item {
            Item::Container(container) => EntityRef::Container(container),
            Item::Function(function) => EntityRef::Function(function),
        }
    }
}
