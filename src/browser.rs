//! The dispatch front end.
//!
//! [`Browser`] ties the pieces together: it resolves a module on a search
//! path, picks the grammar, runs the [`OutlineBuilder`] and memoizes the
//! result in its [`ModuleCache`].

use std::path::Path;
use std::sync::Arc;

use indexmap::IndexMap;
use rayon::prelude::*;
use rustc_hash::FxHashSet;
use smol_str::SmolStr;
use tracing::{debug, warn};

use crate::base::{FsSourceReader, SourceReader};
use crate::config::BrowserConfig;
use crate::error::{OutlineError, Result};
use crate::outline::{ModuleCache, Outline, OutlineBuilder};
use crate::project::{GrammarRegistry, ModuleResolver, ResolvedModule};

/// Reads outlines for modules and caches them.
///
/// A `Browser` is not internally synchronized; every call that may fill or
/// clear the cache takes `&mut self`.
pub struct Browser {
    config: BrowserConfig,
    registry: GrammarRegistry,
    reader: Arc<dyn SourceReader>,
    cache: ModuleCache,
}

impl Browser {
    /// A browser with the stock grammars reading from the filesystem.
    pub fn new() -> Self {
        Self {
            config: BrowserConfig::default(),
            registry: GrammarRegistry::default(),
            reader: Arc::new(FsSourceReader),
            cache: ModuleCache::new(),
        }
    }

    /// A browser configured by `config`.
    ///
    /// Fails if the configuration names a grammar that is not registered.
    pub fn from_config(config: BrowserConfig) -> Result<Self> {
        let registry = GrammarRegistry::from_config(&config)?;
        Ok(Self {
            config,
            registry,
            ..Self::new()
        })
    }

    /// Read sources through `reader` instead of the filesystem.
    pub fn with_reader(mut self, reader: impl SourceReader + 'static) -> Self {
        self.reader = Arc::new(reader);
        self
    }

    pub fn config(&self) -> &BrowserConfig {
        &self.config
    }

    pub fn registry(&self) -> &GrammarRegistry {
        &self.registry
    }

    pub fn cache(&self) -> &ModuleCache {
        &self.cache
    }

    /// The outline of `module`, scanning it if it is not cached.
    ///
    /// Only a failed resolution is an error. A module that resolves but
    /// cannot be read or decoded gets an empty outline.
    pub fn read_outline<P: AsRef<Path>>(&mut self, module: &str, search_path: &[P]) -> Result<Arc<Outline>> {
        if let Some(outline) = self.cache.get(module) {
            return Ok(outline);
        }
        let resolved = ModuleResolver::new(&self.registry).resolve(module, search_path)?;
        let outline = self.scan(module, &resolved);
        Ok(self.cache.put(module, outline))
    }

    /// The outline of `module` and of every module it imports, directly or
    /// transitively, keyed by module name in discovery order.
    ///
    /// Each module is visited once per call. Imports that cannot be
    /// resolved are skipped; only the root module must exist.
    pub fn read_outline_recursive<P: AsRef<Path>>(
        &mut self,
        module: &str,
        search_path: &[P],
    ) -> Result<IndexMap<SmolStr, Arc<Outline>>> {
        let mut session = IndexMap::new();
        let root = self.read_outline(module, search_path)?;
        let mut pending: Vec<String> = root.imports.iter().rev().cloned().collect();
        session.insert(SmolStr::from(module), root);

        while let Some(import) = pending.pop() {
            if session.contains_key(import.as_str()) {
                continue;
            }
            match self.read_outline(&import, search_path) {
                Ok(outline) => {
                    pending.extend(outline.imports.iter().rev().cloned());
                    session.insert(SmolStr::from(import), outline);
                }
                Err(err) => debug!(module, import, error = %err, "skipping unresolved import"),
            }
        }
        Ok(session)
    }

    /// Outlines for a batch of modules, in input order.
    ///
    /// Cached modules are returned directly; the rest are resolved in turn,
    /// scanned in parallel and then cached. A module named twice is scanned
    /// once.
    pub fn read_outlines<P: AsRef<Path>>(
        &mut self,
        modules: &[&str],
        search_path: &[P],
    ) -> Vec<Result<Arc<Outline>>> {
        let mut results: Vec<Option<Result<Arc<Outline>>>> = Vec::with_capacity(modules.len());
        let mut misses: Vec<(&str, ResolvedModule)> = Vec::new();
        let mut seen = FxHashSet::default();

        let resolver = ModuleResolver::new(&self.registry);
        for &module in modules {
            if let Some(outline) = self.cache.get(module) {
                results.push(Some(Ok(outline)));
            } else if !seen.insert(module) {
                results.push(None);
            } else {
                match resolver.resolve(module, search_path) {
                    Ok(resolved) => {
                        misses.push((module, resolved));
                        results.push(None);
                    }
                    Err(err) => results.push(Some(Err(err))),
                }
            }
        }

        debug!(requested = modules.len(), scanning = misses.len(), "reading outline batch");
        let this: &Self = self;
        let scanned: Vec<(&str, Outline)> = misses
            .par_iter()
            .map(|(module, resolved)| (*module, this.scan(module, resolved)))
            .collect();
        for (module, outline) in scanned {
            self.cache.put(module, outline);
        }

        results
            .into_iter()
            .zip(modules)
            .map(|(result, &module)| {
                result.unwrap_or_else(|| {
                    self.cache.get(module).ok_or_else(|| OutlineError::ModuleNotFound {
                        module: module.to_owned(),
                        searched: search_path.iter().map(|dir| dir.as_ref().to_path_buf()).collect(),
                    })
                })
            })
            .collect()
    }

    /// Forget `module`'s outline so the next read scans it again.
    pub fn clear(&mut self, module: &str) -> bool {
        self.cache.clear(module)
    }

    pub fn clear_all(&mut self) {
        self.cache.clear_all();
    }

    /// Clear `module` from the cache if its file no longer hashes to the
    /// cached content. Returns whether the entry was cleared.
    pub fn refresh_if_changed(&mut self, module: &str) -> bool {
        let Some(cached) = self.cache.get(module) else {
            return false;
        };
        let current = self.reader.read(&cached.path).ok().map(|source| source.hash);
        if current == cached.content_hash {
            return false;
        }
        debug!(module, "source changed on disk");
        self.cache.clear(module)
    }

    fn scan(&self, module: &str, resolved: &ResolvedModule) -> Outline {
        let Some(grammar) = self.registry.get(resolved.grammar) else {
            return Outline::empty(module, resolved.path.clone(), resolved.grammar);
        };
        let builder = OutlineBuilder::new(grammar, module, resolved.path.clone())
            .separator(self.config.separator(grammar.name()));
        match self.reader.read(&resolved.path) {
            Ok(source) => builder.build_decoded(&source),
            Err(err) => {
                warn!(module, error = %err, "unreadable source, using an empty outline");
                builder.empty()
            }
        }
    }
}

impl Default for Browser {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Browser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Browser")
            .field("config", &self.config)
            .field("registry", &self.registry)
            .field("cache", &self.cache)
            .finish_non_exhaustive()
    }
}
