use std::collections::HashMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::errors::{ResolveError, Result};
use crate::resolution::ResourceResolver;
use crate::types::{AbbreviationNode, Resource};

/// Resource entries defined for one syntax.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyntaxResources {
    /// Parent syntax whose entries apply when this one has no match.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extends: Option<String>,
    /// Literal output text, keyed by node name.
    pub snippets: HashMap<String, String>,
    /// Abbreviations that a node name expands into.
    pub references: HashMap<String, String>,
    /// Pre-structured element descriptors.
    pub elements: HashMap<String, Value>,
}

impl SyntaxResources {
    fn lookup(&self, name: &str) -> Option<Resource> {
        if let Some(text) = self.snippets.get(name) {
            return Some(Resource::Snippet(text.clone()));
        }
        if let Some(source) = self.references.get(name) {
            return Some(Resource::Reference(source.clone()));
        }
        self.elements
            .get(name)
            .map(|descriptor| Resource::Element(descriptor.clone()))
    }
}

/// Read-only resource lookup keyed by syntax and node name.
///
/// Loaded from JSON shaped like:
///
/// ```json
/// {
///   "html": { "snippets": { "cc:ie": "<!--[if IE]>...<![endif]-->" },
///             "references": { "ul+": "ul>li" } },
///   "xsl":  { "extends": "html" }
/// }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResourceTable {
    syntaxes: HashMap<String, SyntaxResources>,
}

impl ResourceTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a table from a JSON document.
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Reads and parses a table from a JSON file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        Self::from_json_str(&contents)
    }

    pub fn insert_syntax(&mut self, syntax: impl Into<String>, resources: SyntaxResources) {
        self.syntaxes.insert(syntax.into(), resources);
    }

    pub fn has_syntax(&self, syntax: &str) -> bool {
        self.syntaxes.contains_key(syntax)
    }

    /// Looks up `name` under `syntax`, walking the `extends` chain.
    ///
    /// Returns `Ok(None)` when no syntax in the chain defines `name`, and an
    /// error when the chain names an unknown syntax or loops.
    pub fn lookup(&self, name: &str, syntax: &str) -> Result<Option<Resource>> {
        let mut current = syntax;
        // A chain longer than the number of syntaxes must revisit one.
        for _ in 0..=self.syntaxes.len() {
            let resources = self.syntaxes.get(current).ok_or_else(|| ResolveError::Lookup {
                message: format!("no resources defined for syntax '{}'", current),
                syntax: syntax.to_string(),
            })?;

            if let Some(found) = resources.lookup(name) {
                return Ok(Some(found));
            }

            match resources.extends.as_deref() {
                Some(parent) => current = parent,
                None => return Ok(None),
            }
        }

        Err(ResolveError::Lookup {
            message: format!("syntax '{}' has a cyclic 'extends' chain", syntax),
            syntax: syntax.to_string(),
        })
    }
}

impl ResourceResolver for ResourceTable {
    fn resolve_resource(&self, node: &AbbreviationNode, syntax: &str) -> Result<Resource> {
        let Some(name) = node.name.as_deref() else {
            return Ok(Resource::Absent);
        };
        Ok(self.lookup(name, syntax)?.unwrap_or(Resource::Absent))
    }
}
