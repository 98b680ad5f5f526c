//! Error types for outline extraction.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::base::Encoding;

/// Errors surfaced to callers of the outline front end.
#[derive(Debug, Error)]
pub enum OutlineError {
    /// No search directory yielded a readable file for the module.
    #[error("module not found: {module} (searched {} directories)", .searched.len())]
    ModuleNotFound {
        module: String,
        searched: Vec<PathBuf>,
    },

    /// Configuration referred to a grammar that is not registered.
    #[error("unknown grammar: {0}")]
    UnknownGrammar(String),
}

/// Faults raised by a [`SourceReader`](crate::base::SourceReader).
///
/// The outline builder never propagates these; an unreadable source yields
/// an empty outline instead.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("{} is not valid {encoding}", .path.display())]
    Decode { path: PathBuf, encoding: Encoding },
}

/// Result alias for outline operations.
pub type Result<T, E = OutlineError> = std::result::Result<T, E>;
