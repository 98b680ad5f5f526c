//! Locating module sources on a search path.

use std::fs::File;
use std::path::{Path, PathBuf};

use tracing::debug;

use super::GrammarRegistry;
use crate::error::{OutlineError, Result};

/// A module source that exists and could be opened.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResolvedModule {
    pub path: PathBuf,
    /// Name of the grammar the file is scanned with.
    pub grammar: &'static str,
}

/// Finds module files by name in an ordered list of directories.
#[derive(Clone, Copy, Debug)]
pub struct ModuleResolver<'r> {
    registry: &'r GrammarRegistry,
}

impl<'r> ModuleResolver<'r> {
    pub fn new(registry: &'r GrammarRegistry) -> Self {
        Self { registry }
    }

    /// Resolve `module` against `search_path`, first directory first.
    ///
    /// A name whose extension is claimed by a grammar is looked up as is.
    /// Any other name goes to the default grammar: first as is, then with
    /// each of that grammar's extensions appended. The first candidate that
    /// opens for reading wins.
    pub fn resolve<P: AsRef<Path>>(&self, module: &str, search_path: &[P]) -> Result<ResolvedModule> {
        let not_found = || OutlineError::ModuleNotFound {
            module: module.to_owned(),
            searched: search_path.iter().map(|dir| dir.as_ref().to_path_buf()).collect(),
        };
        let (grammar, candidates) = self.candidates(module).ok_or_else(not_found)?;

        for dir in search_path {
            for candidate in &candidates {
                let path = dir.as_ref().join(candidate);
                if is_readable(&path) {
                    debug!(module, path = %path.display(), grammar, "resolved module");
                    return Ok(ResolvedModule { path, grammar });
                }
            }
        }
        Err(not_found())
    }

    fn candidates(&self, module: &str) -> Option<(&'static str, Vec<String>)> {
        let claimed = Path::new(module)
            .extension()
            .and_then(|extension| extension.to_str())
            .and_then(|extension| self.registry.for_extension(extension));
        if let Some(grammar) = claimed {
            return Some((grammar.name(), vec![module.to_owned()]));
        }

        let grammar = self.registry.default_grammar()?;
        let mut candidates = vec![module.to_owned()];
        candidates.extend(
            self.registry
                .extensions_of(grammar.name())
                .into_iter()
                .map(|extension| format!("{module}.{extension}")),
        );
        Some((grammar.name(), candidates))
    }
}

/// Open and immediately release the file to prove it can be read.
fn is_readable(path: &Path) -> bool {
    path.is_file() && File::open(path).is_ok()
}
