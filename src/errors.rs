use thiserror::Error;

/// Errors that can occur while resolving an abbreviation tree.
#[derive(Error, Debug)]
pub enum ResolveError {
    /// The resource adapter failed to look up a node.
    #[error("lookup error: {message} (syntax: {syntax})")]
    Lookup { message: String, syntax: String },

    /// A referenced abbreviation could not be parsed.
    #[error("parse error: {message} (source: {source_text:?}, syntax: {syntax})")]
    Parse {
        message: String,
        source_text: String,
        syntax: String,
    },

    /// A reference expanded to nothing while the referencing node still had
    /// children that needed a place to go.
    #[error("reference {source_text:?} expanded to an empty tree, {count} child node(s) would be dropped")]
    OrphanedChildren { source_text: String, count: usize },

    #[error("reference {source_text:?} exceeds the expansion depth limit of {limit}")]
    ExpansionTooDeep { source_text: String, limit: usize },

    #[error("config error: {message}")]
    Config { message: String },

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Convenience alias for results using `ResolveError`.
pub type Result<T> = std::result::Result<T, ResolveError>;
