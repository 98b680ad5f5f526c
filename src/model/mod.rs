//! Entity model: the records an outline is made of.
//!
//! Every parsed construct carries an [`EntityInfo`] (owning module, name,
//! file, start line and an end line that stays `None` until the builder
//! closes it). [`Container`]s own methods, attributes, globals and nested
//! containers; [`Function`]s and [`Attribute`]s are leaves.

mod container;
mod entity;
mod leaf;

pub use container::{Container, ContainerKind};
pub use entity::{EntityInfo, EntityRef, Item, Visibility};
pub use leaf::{Attribute, Function, Modifier, split_parameters};
