/// Tree resolution module.
///
/// Walks a parsed abbreviation tree, attaches the resource each node matches
/// and inlines referenced abbreviations in place of the nodes that point at
/// them.
mod adapter;
mod resolver;

pub use adapter::{AbbreviationParser, ResourceResolver};
pub use resolver::TreeResolver;
