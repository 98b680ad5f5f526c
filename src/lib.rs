//! # outliner-base
//!
//! Structural outlines for block-structured definition files: CORBA IDL and
//! Protocol Buffer schemas.
//!
//! A scan reads one module and produces the nested table of its modules,
//! interfaces, services, messages, enums, methods, RPCs and attributes, each
//! tagged with the lines it starts and ends on. Scanning is a single
//! left-to-right pass over prioritized token patterns; it never validates
//! the grammar and degrades to partial or empty results on malformed input.
//!
//! ## Module Structure (dependency order)
//!
//! ```text
//! browser  → Front end: resolve, dispatch, cache
//!   ↓
//! project  → Grammar registry + module resolver
//!   ↓
//! outline  → Outline builder and module cache
//!   ↓
//! syntax   → Lexer, pattern tables, one grammar per language
//!   ↓
//! model    → Entities: containers, functions, attributes
//!   ↓
//! base     → Primitives (spans, line counting, source decoding)
//! ```
//!
//! ## Usage
//!
//! ```no_run
//! use outliner::Browser;
//!
//! let mut browser = Browser::new();
//! let outline = browser.read_outline("Bank.idl", &["idl"])?;
//! for (name, item) in outline.iter() {
//!     println!("{name}: lines {}..{:?}", item.info().start_line, item.info().end_line);
//! }
//! browser.clear("Bank.idl");
//! # Ok::<(), outliner::OutlineError>(())
//! ```

/// Foundation types: text positions, line counting, source decoding
pub mod base;

pub mod browser;
pub mod config;
pub mod error;
pub mod model;
pub mod outline;
pub mod project;
pub mod syntax;

pub use base::{DecodedText, Encoding, FsSourceReader, LineCounter, SourceReader, TextRange, TextSize};
pub use browser::Browser;
pub use config::BrowserConfig;
pub use error::{OutlineError, Result, SourceError};
pub use model::{Attribute, Container, ContainerKind, EntityInfo, EntityRef, Function, Item, Modifier, Visibility};
pub use outline::{ModuleCache, Outline, OutlineBuilder};
pub use project::{GrammarRegistry, ModuleResolver, ResolvedModule};
pub use syntax::{Grammar, IdlGrammar, ProtoGrammar};
