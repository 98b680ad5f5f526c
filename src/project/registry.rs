//! Extension-based grammar dispatch.

use indexmap::IndexMap;
use rustc_hash::FxHashMap;

use crate::config::BrowserConfig;
use crate::error::{OutlineError, Result};
use crate::syntax::{Grammar, IdlGrammar, ProtoGrammar};

/// The grammars known to a front end, indexed by name and by extension.
///
/// Adding a language means registering another [`Grammar`]; nothing else
/// in the crate branches on the language.
pub struct GrammarRegistry {
    grammars: IndexMap<&'static str, Box<dyn Grammar>>,
    by_extension: FxHashMap<String, &'static str>,
    default: Option<&'static str>,
}

impl GrammarRegistry {
    /// An empty registry with no default grammar.
    pub fn new() -> Self {
        Self {
            grammars: IndexMap::new(),
            by_extension: FxHashMap::default(),
            default: None,
        }
    }

    /// The stock registry adjusted by `config`.
    pub fn from_config(config: &BrowserConfig) -> Result<Self> {
        let mut registry = Self::default();
        for (grammar, extensions) in &config.extensions {
            registry.set_extensions(grammar, extensions)?;
        }
        registry.set_default(&config.default_grammar)?;
        Ok(registry)
    }

    /// Register a grammar under its name, claiming its stock extensions.
    ///
    /// A grammar registered later takes over extensions already claimed.
    pub fn register(&mut self, grammar: impl Grammar + 'static) {
        let name = grammar.name();
        for extension in grammar.extensions() {
            self.by_extension.insert(normalize(extension), name);
        }
        self.grammars.insert(name, Box::new(grammar));
    }

    /// Replace the extensions claimed by `grammar`.
    pub fn set_extensions<S: AsRef<str>>(&mut self, grammar: &str, extensions: &[S]) -> Result<()> {
        let name = self.name_of(grammar)?;
        self.by_extension.retain(|_, owner| *owner != name);
        for extension in extensions {
            self.by_extension.insert(normalize(extension.as_ref()), name);
        }
        Ok(())
    }

    /// Make `grammar` the catch-all for unclaimed extensions.
    pub fn set_default(&mut self, grammar: &str) -> Result<()> {
        self.default = Some(self.name_of(grammar)?);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&dyn Grammar> {
        self.grammars.get(name).map(|grammar| &**grammar)
    }

    /// The grammar claiming `extension`, ignoring case and a leading dot.
    pub fn for_extension(&self, extension: &str) -> Option<&dyn Grammar> {
        let name = self.by_extension.get(&normalize(extension))?;
        self.get(name)
    }

    pub fn default_grammar(&self) -> Option<&dyn Grammar> {
        self.get(self.default?)
    }

    /// Extensions currently claimed by `grammar`, sorted.
    pub fn extensions_of(&self, grammar: &str) -> Vec<&str> {
        let mut extensions: Vec<&str> = self
            .by_extension
            .iter()
            .filter(|(_, owner)| **owner == grammar)
            .map(|(extension, _)| extension.as_str())
            .collect();
        extensions.sort_unstable();
        extensions
    }

    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.grammars.keys().copied()
    }

    fn name_of(&self, grammar: &str) -> Result<&'static str> {
        self.grammars
            .get_key_value(grammar)
            .map(|(name, _)| *name)
            .ok_or_else(|| OutlineError::UnknownGrammar(grammar.to_owned()))
    }
}

impl Default for GrammarRegistry {
    /// IDL for `.idl` (and as the catch-all), ProtoBuf for `.proto`.
    fn default() -> Self {
        let mut registry = Self::new();
        registry.register(IdlGrammar);
        registry.register(ProtoGrammar);
        registry.default = Some(IdlGrammar.name());
        registry
    }
}

impl std::fmt::Debug for GrammarRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GrammarRegistry")
            .field("grammars", &self.grammars.keys().collect::<Vec<_>>())
            .field("by_extension", &self.by_extension)
            .field("default", &self.default)
            .finish()
    }
}

fn normalize(extension: &str) -> String {
    extension.trim_start_matches('.').to_ascii_lowercase()
}
