//! Error types for lineage-core.

use thiserror::Error;

/// Result type for lineage-core operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while constructing a graph engine.
///
/// All failures are detected during construction; queries on a successfully
/// built [`crate::GraphEngine`] are total and cannot fail.
#[derive(Debug, Error)]
pub enum Error {
    /// Input string was empty or contained only whitespace.
    #[error("empty input: no node declarations found")]
    EmptyInput,

    /// A declared or referenced node name is not ASCII alphanumeric.
    #[error("invalid node name: {0:?}")]
    InvalidNodeName(String),

    /// A node name appeared on the left-hand side of two declaration lines.
    #[error("duplicate node declaration: {0:?}")]
    DuplicateNode(String),

    /// The edge set, once fully built, contains a cycle.
    #[error("cycle detected: {0}")]
    CycleDetected(String),
}

impl Error {
    /// Format the error with a one-line recovery hint for CLI display.
    pub fn with_hint(&self) -> String {
        let hint = match self {
            Error::EmptyInput => "provide at least one line of the form `NODE` or `NODE: PARENT, ...`",
            Error::InvalidNodeName(_) => "node names must match [A-Za-z0-9]+ (no dashes, underscores, or spaces)",
            Error::DuplicateNode(_) => "declare each node on exactly one line; merge its parent lists",
            Error::CycleDetected(_) => "remove one of the listed parent references to break the cycle",
        };
        format!("{self}\n  hint: {hint}")
    }
}
