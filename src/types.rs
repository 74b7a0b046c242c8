use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Index path from a root node down to one of its descendants. The empty
/// path addresses the root itself.
pub type NodePath = Vec<usize>;

/// A single attribute on an abbreviation node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attribute {
    pub name: String,
    pub value: String,
}

/// What a resource adapter reports for a node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Resource {
    /// Literal output fragment.
    Snippet(String),
    /// Pre-structured descriptor, passed through untouched.
    Element(Value),
    /// Another abbreviation that must be parsed and inlined.
    Reference(String),
    /// No match.
    Absent,
}

impl Resource {
    /// Returns the string representation of this resource kind.
    pub fn kind_str(&self) -> &'static str {
        match self {
            Resource::Snippet(_) => "snippet",
            Resource::Element(_) => "element",
            Resource::Reference(_) => "reference",
            Resource::Absent => "absent",
        }
    }
}

/// The resource attached to a node once it has been resolved. References are
/// always expanded away, so they have no representation here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum NodeResource {
    Snippet(String),
    Element(Value),
    Absent,
}

impl NodeResource {
    /// Converts an adapter result into a storable resource. Returns `None`
    /// for `Resource::Reference`.
    pub fn from_resource(resource: Resource) -> Option<NodeResource> {
        match resource {
            Resource::Snippet(text) => Some(NodeResource::Snippet(text)),
            Resource::Element(descriptor) => Some(NodeResource::Element(descriptor)),
            Resource::Absent => Some(NodeResource::Absent),
            Resource::Reference(_) => None,
        }
    }
}

fn default_repeat_count() -> u32 {
    1
}

fn is_one(n: &u32) -> bool {
    *n == 1
}

/// Repeat counts start at 1; a zero count has no meaning and is rejected.
fn deserialize_repeat_count<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let count = u32::deserialize(deserializer)?;
    if count == 0 {
        return Err(serde::de::Error::custom("repeat_count must be at least 1"));
    }
    Ok(count)
}

/// A node of a parsed abbreviation tree.
///
/// Children are owned exclusively by their parent. The parse root is an
/// unnamed node whose children are the top-level abbreviation elements.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AbbreviationNode {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attributes: Vec<Attribute>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<AbbreviationNode>,
    #[serde(
        default = "default_repeat_count",
        deserialize_with = "deserialize_repeat_count",
        skip_serializing_if = "is_one"
    )]
    pub repeat_count: u32,
    /// Set when the repeat count was not given explicitly and may be taken
    /// from an enclosing repeated context.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub has_implicit_repeat: bool,
    /// `None` until the node has been resolved.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource: Option<NodeResource>,
}

impl Default for AbbreviationNode {
    fn default() -> Self {
        Self {
            name: None,
            attributes: Vec::new(),
            children: Vec::new(),
            repeat_count: 1,
            has_implicit_repeat: false,
            resource: None,
        }
    }
}

impl AbbreviationNode {
    /// Creates a named node with no attributes or children.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    /// Creates an unnamed root node, as produced by a parser.
    pub fn root() -> Self {
        Self::default()
    }

    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_attribute(name, value);
        self
    }

    pub fn with_child(mut self, child: AbbreviationNode) -> Self {
        self.add_child(child);
        self
    }

    pub fn with_repeat(mut self, count: u32, implicit: bool) -> Self {
        self.repeat_count = count.max(1);
        self.has_implicit_repeat = implicit;
        self
    }

    /// Returns the value of the named attribute, if present.
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|a| a.name == name)
            .map(|a| a.value.as_str())
    }

    /// Sets an attribute. An existing attribute with the same name keeps its
    /// position and takes the new value.
    pub fn set_attribute(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.attributes.iter_mut().find(|a| a.name == name) {
            Some(existing) => existing.value = value,
            None => self.attributes.push(Attribute { name, value }),
        }
    }

    pub fn add_child(&mut self, child: AbbreviationNode) {
        self.children.push(child);
    }

    pub fn has_children(&self) -> bool {
        !self.children.is_empty()
    }

    /// Follows the last child until reaching a leaf.
    ///
    /// Returns `None` when this node has no children at all.
    pub fn deepest_child_mut(&mut self) -> Option<&mut AbbreviationNode> {
        let mut current = self.children.last_mut()?;
        while !current.children.is_empty() {
            current = current.children.last_mut()?;
        }
        Some(current)
    }

    /// Returns every descendant matching `predicate`, depth-first in
    /// document order. The node itself is never included.
    pub fn find_all<F>(&self, predicate: F) -> Vec<&AbbreviationNode>
    where
        F: Fn(&AbbreviationNode) -> bool,
    {
        let mut found = Vec::new();
        collect_matching(self, &predicate, &mut found);
        found
    }

    /// Visits every descendant mutably, depth-first in document order.
    pub fn for_each_descendant_mut<F>(&mut self, mut visit: F)
    where
        F: FnMut(&mut AbbreviationNode),
    {
        visit_descendants(self, &mut visit);
    }

    /// Number of nodes in this subtree, including this one.
    pub fn node_count(&self) -> usize {
        1 + self.children.iter().map(|c| c.node_count()).sum::<usize>()
    }

    pub fn node_at(&self, path: &[usize]) -> Option<&AbbreviationNode> {
        let mut current = self;
        for &index in path {
            current = current.children.get(index)?;
        }
        Some(current)
    }

    pub fn node_at_mut(&mut self, path: &[usize]) -> Option<&mut AbbreviationNode> {
        let mut current = self;
        for &index in path {
            current = current.children.get_mut(index)?;
        }
        Some(current)
    }
}

/// Path of the parent of the node at `path`, or `None` for the root.
pub fn parent_path(path: &[usize]) -> Option<&[usize]> {
    path.split_last().map(|(_, parent)| parent)
}

fn collect_matching<'a, F>(
    node: &'a AbbreviationNode,
    predicate: &F,
    out: &mut Vec<&'a AbbreviationNode>,
) where
    F: Fn(&AbbreviationNode) -> bool,
{
    for child in &node.children {
        if predicate(child) {
            out.push(child);
        }
        collect_matching(child, predicate, out);
    }
}

fn visit_descendants<F>(node: &mut AbbreviationNode, visit: &mut F)
where
    F: FnMut(&mut AbbreviationNode),
{
    for child in node.children.iter_mut() {
        visit(child);
        visit_descendants(child, visit);
    }
}
