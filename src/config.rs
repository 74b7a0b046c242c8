use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::errors::{ResolveError, Result};

/// Name of the configuration file looked up in a project directory.
pub const CONFIG_FILENAME: &str = "abbrev-resolve.json";

/// Syntax used when neither the caller nor the config names one.
pub const DEFAULT_SYNTAX: &str = "html";

/// Default limit on how deeply references may expand into other references.
pub const DEFAULT_MAX_EXPANSION_DEPTH: usize = 32;

/// Supplies a fallback syntax identifier when the caller's options omit one.
pub trait SyntaxDefaults {
    fn default_syntax(&self) -> &str;
}

/// Configuration for tree resolution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolverConfig {
    /// Schema version of the configuration.
    pub version: u32,
    /// Syntax applied when a resolve call does not specify one.
    pub default_syntax: String,
    /// Maximum nesting of reference expansions before resolution fails.
    pub max_expansion_depth: usize,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            version: 1,
            default_syntax: DEFAULT_SYNTAX.to_string(),
            max_expansion_depth: DEFAULT_MAX_EXPANSION_DEPTH,
        }
    }
}

impl SyntaxDefaults for ResolverConfig {
    fn default_syntax(&self) -> &str {
        &self.default_syntax
    }
}

/// Per-call options for the postprocess entry point.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolveOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub syntax: Option<String>,
}

impl ResolveOptions {
    pub fn with_syntax(syntax: impl Into<String>) -> Self {
        Self {
            syntax: Some(syntax.into()),
        }
    }

    /// The syntax to resolve under: the explicit option if set, otherwise
    /// whatever `defaults` provides.
    pub fn effective_syntax<'a>(&'a self, defaults: &'a dyn SyntaxDefaults) -> &'a str {
        self.syntax
            .as_deref()
            .unwrap_or_else(|| defaults.default_syntax())
    }
}

/// Returns the path to the configuration file within the given directory.
pub fn get_config_path(dir: &Path) -> PathBuf {
    dir.join(CONFIG_FILENAME)
}

fn config_error(action: &str, path: &Path, err: impl std::fmt::Display) -> ResolveError {
    ResolveError::Config {
        message: format!("cannot {} resolver config at {}: {}", action, path.display(), err),
    }
}

/// Loads the resolver configuration from `dir`.
///
/// A directory without a config file resolves with the built-in defaults.
/// A file that names an empty default syntax is rejected, since every
/// `postprocess` call without an explicit syntax would then fail lookups.
pub fn load_config(dir: &Path) -> Result<ResolverConfig> {
    let path = get_config_path(dir);
    if !path.exists() {
        return Ok(ResolverConfig::default());
    }

    let raw = fs::read_to_string(&path).map_err(|e| config_error("read", &path, e))?;
    let config: ResolverConfig =
        serde_json::from_str(&raw).map_err(|e| config_error("decode", &path, e))?;

    if config.default_syntax.trim().is_empty() {
        return Err(config_error("use", &path, "default_syntax is empty"));
    }
    Ok(config)
}

/// Writes `config` into `dir`, creating the directory if needed.
///
/// The file is staged next to its final name and renamed into place, so a
/// reader never sees a half-written config.
pub fn save_config(dir: &Path, config: &ResolverConfig) -> Result<()> {
    fs::create_dir_all(dir).map_err(|e| config_error("create directory for", dir, e))?;

    let path = get_config_path(dir);
    let staged = path.with_extension("tmp");
    let json = serde_json::to_string_pretty(config).map_err(|e| config_error("encode", &path, e))?;

    fs::write(&staged, json).map_err(|e| config_error("stage", &staged, e))?;
    fs::rename(&staged, &path).map_err(|e| config_error("install", &path, e))?;
    Ok(())
}
