//! Memoized outlines keyed by module identity.

use std::sync::Arc;

use rustc_hash::FxHashMap;
use smol_str::SmolStr;
use tracing::debug;

use super::Outline;

/// Completed outlines by module name.
///
/// The cache is a plain value with no interior locking: mutation needs
/// `&mut self`, so callers sharing one cache across threads must wrap it in
/// their own lock. Outlines are handed out as `Arc`s; a cached module is
/// returned as the same instance until its entry is cleared.
#[derive(Debug, Default)]
pub struct ModuleCache {
    entries: FxHashMap<SmolStr, Arc<Outline>>,
}

impl ModuleCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// The cached outline for `module`, if any.
    pub fn get(&self, module: &str) -> Option<Arc<Outline>> {
        let hit = self.entries.get(module).cloned();
        if hit.is_some() {
            debug!(module, "outline cache hit");
        }
        hit
    }

    /// Store an outline, returning the shared handle now in the cache.
    pub fn put(&mut self, module: impl Into<SmolStr>, outline: impl Into<Arc<Outline>>) -> Arc<Outline> {
        let outline = outline.into();
        self.entries.insert(module.into(), Arc::clone(&outline));
        outline
    }

    /// Drop one module's outline. Returns whether an entry was removed.
    pub fn clear(&mut self, module: &str) -> bool {
        let removed = self.entries.remove(module).is_some();
        if removed {
            debug!(module, "cleared cached outline");
        }
        removed
    }

    /// Drop every cached outline.
    pub fn clear_all(&mut self) {
        debug!(count = self.entries.len(), "cleared outline cache");
        self.entries.clear();
    }

    pub fn contains(&self, module: &str) -> bool {
        self.entries.contains_key(module)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Names of every cached module, in no particular order.
    pub fn modules(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(SmolStr::as_str)
    }
}
