//! Front-end configuration.

use indexmap::IndexMap;

/// Separator used to split parameter lists when none is configured.
pub const DEFAULT_SEPARATOR: &str = ",";

/// Settings for a [`Browser`](crate::Browser).
///
/// The default configuration uses the stock grammars with their stock
/// extensions, falls back to IDL for unrecognised files and splits
/// parameters on `,`.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct BrowserConfig {
    /// Extension sets replacing a grammar's stock extensions, by grammar name.
    pub extensions: IndexMap<String, Vec<String>>,
    /// Grammar used for files whose extension no grammar claims.
    pub default_grammar: String,
    /// Parameter separators by grammar name.
    pub separators: IndexMap<String, String>,
}

impl BrowserConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim `extensions` for `grammar` instead of its stock set.
    pub fn with_extensions<I, S>(mut self, grammar: impl Into<String>, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.extensions
            .insert(grammar.into(), extensions.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_default_grammar(mut self, grammar: impl Into<String>) -> Self {
        self.default_grammar = grammar.into();
        self
    }

    pub fn with_separator(mut self, grammar: impl Into<String>, separator: impl Into<String>) -> Self {
        self.separators.insert(grammar.into(), separator.into());
        self
    }

    /// Parameter separator for `grammar`.
    pub fn separator(&self, grammar: &str) -> &str {
        self.separators
            .get(grammar)
            .map_or(DEFAULT_SEPARATOR, String::as_str)
    }
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            extensions: IndexMap::new(),
            default_grammar: "idl".to_owned(),
            separators: IndexMap::new(),
        }
    }
}
