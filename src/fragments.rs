use std::collections::HashMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::errors::{ResolveError, Result};
use crate::resolution::AbbreviationParser;
use crate::types::AbbreviationNode;

/// A parser backed by a table of already-parsed abbreviations.
///
/// Each entry maps an abbreviation source string to the tree a real parser
/// would produce for it. `parse` hands out a fresh copy on every call, so
/// repeated references never share nodes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PreparsedAbbreviations {
    trees: HashMap<String, AbbreviationNode>,
}

impl PreparsedAbbreviations {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        Self::from_json_str(&contents)
    }

    /// Registers the tree for `source`, replacing any previous entry.
    pub fn insert(&mut self, source: impl Into<String>, tree: AbbreviationNode) {
        self.trees.insert(source.into(), tree);
    }

    pub fn len(&self) -> usize {
        self.trees.len()
    }

    pub fn is_empty(&self) -> bool {
        self.trees.is_empty()
    }
}

impl AbbreviationParser for PreparsedAbbreviations {
    fn parse(&self, source: &str, syntax: &str) -> Result<AbbreviationNode> {
        self.trees
            .get(source)
            .cloned()
            .ok_or_else(|| ResolveError::Parse {
                message: "no parsed tree registered for this abbreviation".to_string(),
                source_text: source.to_string(),
                syntax: syntax.to_string(),
            })
    }
}
