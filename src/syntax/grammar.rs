//! The per-language capability consulted by the scanner and the builder.

use super::pattern::Pattern;
use crate::model::ContainerKind;

/// A definition language: its pattern table plus the rules deciding which
/// containers accept which children.
///
/// New languages are added by implementing this trait and registering the
/// implementation with a [`GrammarRegistry`](crate::project::GrammarRegistry);
/// the outline builder itself never branches on the language.
pub trait Grammar: Send + Sync {
    /// Stable name used in configuration and on outlines (e.g. `"idl"`).
    fn name(&self) -> &'static str;

    /// File extensions claimed by default, lowercase and without the dot.
    fn extensions(&self) -> &'static [&'static str];

    /// Patterns in priority order; at a given position the earliest-listed
    /// pattern that matches wins.
    fn patterns(&self) -> &'static [Pattern];

    /// Whether methods may be attached to a container of this kind.
    fn accepts_methods(&self, kind: ContainerKind) -> bool;

    /// Whether attributes may be attached to a container of this kind.
    fn accepts_attributes(&self, _kind: ContainerKind) -> bool {
        false
    }

    /// Whether module-scoped globals may be attached to this kind.
    fn accepts_globals(&self, _kind: ContainerKind) -> bool {
        false
    }

    /// Whether `child` may be nested inside `parent`.
    fn may_nest(&self, _parent: ContainerKind, _child: ContainerKind) -> bool {
        true
    }
}
