//! Leaf entities: methods and attributes.

use super::EntityInfo;

/// How a function is bound to its container.
///
/// The definition languages handled here only produce `General`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Modifier {
    #[default]
    General,
    Static,
    Class,
}

/// A method, RPC or free function.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Function {
    pub info: EntityInfo,
    /// Trimmed parameter strings in declaration order.
    pub parameters: Vec<String>,
    pub modifier: Modifier,
    /// Return annotation, e.g. `-> Response` for an RPC.
    pub annotation: Option<String>,
}

impl Function {
    /// Create a function from a raw parameter list split on `separator`.
    pub fn new(info: EntityInfo, signature: &str, separator: &str) -> Self {
        Self {
            info,
            parameters: split_parameters(signature, separator),
            modifier: Modifier::General,
            annotation: None,
        }
    }

    pub fn with_modifier(mut self, modifier: Modifier) -> Self {
        self.modifier = modifier;
        self
    }

    pub fn with_annotation(mut self, annotation: impl Into<String>) -> Self {
        self.annotation = Some(annotation.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.info.name
    }
}

/// Split a raw parameter list into trimmed parameters.
///
/// A blank list yields no parameters at all rather than one empty entry.
pub fn split_parameters(signature: &str, separator: &str) -> Vec<String> {
    if signature.trim().is_empty() {
        return Vec::new();
    }
    if separator.is_empty() {
        return vec![signature.trim().to_owned()];
    }
    signature
        .split(separator)
        .map(|parameter| parameter.trim().to_owned())
        .collect()
}

/// An attribute or global, remembering every line that (re-)declared it.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Attribute {
    pub info: EntityInfo,
    /// Declaration lines in encounter order; the first is `info.start_line`.
    pub line_numbers: Vec<u32>,
}

impl Attribute {
    /// A declaration spans one line, so the attribute is closed on it.
    pub fn new(mut info: EntityInfo) -> Self {
        info.close(info.start_line);
        let line_numbers = vec![info.start_line];
        Self { info, line_numbers }
    }

    pub fn name(&self) -> &str {
        &self.info.name
    }

    /// Record another declaration line, ignoring lines already seen.
    pub fn add_assignment(&mut self, line: u32) {
        if !self.line_numbers.contains(&line) {
            self.line_numbers.push(line);
        }
    }
}
