//! Finding module sources and choosing the grammar to scan them with.

mod registry;
mod resolver;

pub use registry::GrammarRegistry;
pub use resolver::{ModuleResolver, ResolvedModule};
