use crate::errors::Result;
use crate::types::{AbbreviationNode, Resource};

/// Looks up the resource a node matches under a given syntax.
///
/// Implementations must not mutate the node. Failures should be reported as
/// `ResolveError::Lookup`; they are passed to the caller of the resolver
/// unchanged.
pub trait ResourceResolver {
    fn resolve_resource(&self, node: &AbbreviationNode, syntax: &str) -> Result<Resource>;
}

/// Parses an abbreviation string into a tree.
///
/// The returned node is an unnamed root whose children are the top-level
/// elements. The resolver calls this while it is itself in the middle of a
/// resolution pass, so implementations must be reentrant.
pub trait AbbreviationParser {
    fn parse(&self, source: &str, syntax: &str) -> Result<AbbreviationNode>;
}
