use tracing::{debug, trace};

use crate::config::{
    ResolveOptions, ResolverConfig, SyntaxDefaults, DEFAULT_MAX_EXPANSION_DEPTH,
};
use crate::errors::{ResolveError, Result};
use crate::types::{AbbreviationNode, NodeResource, Resource};

use super::adapter::{AbbreviationParser, ResourceResolver};

/// Resolves an abbreviation tree in place.
///
/// Every node below the root gets the resource its adapter reports attached.
/// Nodes that resolve to a reference are replaced by the top-level nodes of
/// the referenced abbreviation, which inherit the referencing node's
/// attributes, children and (where implicit) repeat count.
pub struct TreeResolver<'a> {
    resources: &'a dyn ResourceResolver,
    parser: &'a dyn AbbreviationParser,
    max_expansion_depth: usize,
}

impl<'a> TreeResolver<'a> {
    /// Creates a resolver with the default expansion depth limit.
    pub fn new(resources: &'a dyn ResourceResolver, parser: &'a dyn AbbreviationParser) -> Self {
        Self {
            resources,
            parser,
            max_expansion_depth: DEFAULT_MAX_EXPANSION_DEPTH,
        }
    }

    /// Creates a resolver whose limits come from `config`.
    pub fn with_config(
        resources: &'a dyn ResourceResolver,
        parser: &'a dyn AbbreviationParser,
        config: &ResolverConfig,
    ) -> Self {
        Self {
            resources,
            parser,
            max_expansion_depth: config.max_expansion_depth,
        }
    }

    pub fn max_expansion_depth(&self) -> usize {
        self.max_expansion_depth
    }

    /// Pipeline entry point: resolves `tree` under the syntax named in
    /// `options`, falling back to `defaults` when none is given.
    pub fn postprocess(
        &self,
        tree: &mut AbbreviationNode,
        options: &ResolveOptions,
        defaults: &dyn SyntaxDefaults,
    ) -> Result<()> {
        let syntax = options.effective_syntax(defaults);
        debug!(syntax, nodes = tree.node_count(), "resolving abbreviation tree");
        self.resolve(tree, syntax)
    }

    /// Resolves every descendant of `node` under `syntax`.
    ///
    /// Adapter and parser failures are returned as-is. On failure every node
    /// of the caller's tree is still in place, but may be only partially
    /// resolved. Nodes produced by the failing expansion are discarded.
    pub fn resolve(&self, node: &mut AbbreviationNode, syntax: &str) -> Result<()> {
        self.resolve_children(node, syntax, 0)
    }

    fn resolve_children(
        &self,
        node: &mut AbbreviationNode,
        syntax: &str,
        depth: usize,
    ) -> Result<()> {
        // Expansion rewrites the child list, so work from a detached copy and
        // rebuild the live list as each original child is settled.
        let snapshot = std::mem::take(&mut node.children);
        node.children.reserve(snapshot.len());

        let mut pending = snapshot.into_iter();
        while let Some(mut child) = pending.next() {
            match self.resolve_child(&mut child, syntax, depth) {
                Ok(None) => node.children.push(child),
                Ok(Some(replacement)) => node.children.extend(replacement),
                Err(err) => {
                    node.children.push(child);
                    node.children.extend(pending);
                    return Err(err);
                }
            }
        }

        Ok(())
    }

    /// Settles a single child. Returns `Some(nodes)` when the child was a
    /// reference and must be replaced by `nodes`, `None` when it stays.
    fn resolve_child(
        &self,
        child: &mut AbbreviationNode,
        syntax: &str,
        depth: usize,
    ) -> Result<Option<Vec<AbbreviationNode>>> {
        let resource = self.resources.resolve_resource(child, syntax)?;
        trace!(
            node = child.name.as_deref().unwrap_or(""),
            kind = resource.kind_str(),
            "matched resource"
        );

        if let Resource::Reference(source) = resource {
            return self.expand(child, &source, syntax, depth).map(Some);
        }
        child.resource = NodeResource::from_resource(resource);
        self.resolve_children(child, syntax, depth)?;
        Ok(None)
    }

    /// Parses the referenced abbreviation and returns its top-level nodes,
    /// fully resolved and carrying what they inherit from `child`.
    ///
    /// Nodes from the parsed abbreviation are resolved one expansion level
    /// deeper. The children of `child` belong to the caller's tree, so they
    /// are resolved at the caller's level and only grafted once everything
    /// has succeeded; on failure they are still attached to `child`.
    fn expand(
        &self,
        child: &mut AbbreviationNode,
        source: &str,
        syntax: &str,
        depth: usize,
    ) -> Result<Vec<AbbreviationNode>> {
        if depth >= self.max_expansion_depth {
            return Err(ResolveError::ExpansionTooDeep {
                source_text: source.to_string(),
                limit: self.max_expansion_depth,
            });
        }

        let mut subtree = self.parser.parse(source, syntax)?;
        debug!(
            source,
            syntax,
            repeat = child.repeat_count,
            grafted = child.children.len(),
            "expanding reference"
        );

        // Runs before grafting, so the caller's own children are never touched.
        if child.repeat_count > 1 {
            let repeat = child.repeat_count;
            subtree.for_each_descendant_mut(|node| {
                if node.has_implicit_repeat {
                    node.repeat_count = repeat;
                    node.has_implicit_repeat = false;
                }
            });
        }

        if child.has_children() && !subtree.has_children() {
            return Err(orphaned(source, child));
        }

        // Attributes on the referencing node win over the reference's own.
        for top in subtree.children.iter_mut() {
            for attr in &child.attributes {
                top.set_attribute(attr.name.clone(), attr.value.clone());
            }
        }

        let mut replacement = Vec::with_capacity(subtree.children.len());
        for mut node in subtree.children {
            match self.resolve_child(&mut node, syntax, depth + 1)? {
                None => replacement.push(node),
                Some(nested) => replacement.extend(nested),
            }
        }

        self.resolve_children(child, syntax, depth)?;
        if child.has_children() {
            let Some(target) = deepest_in(&mut replacement) else {
                return Err(orphaned(source, child));
            };
            target.children.append(&mut child.children);
        }

        Ok(replacement)
    }
}

/// The grafting point of a resolved expansion: the leaf reached by following
/// the last node and then its last children.
fn deepest_in(nodes: &mut [AbbreviationNode]) -> Option<&mut AbbreviationNode> {
    let last = nodes.last_mut()?;
    if last.has_children() {
        last.deepest_child_mut()
    } else {
        Some(last)
    }
}

fn orphaned(source: &str, child: &AbbreviationNode) -> ResolveError {
    ResolveError::OrphanedChildren {
        source_text: source.to_string(),
        count: child.children.len(),
    }
}
