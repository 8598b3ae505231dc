//! Error types for matmul-add-fusion
//!
//! Failing to match a pattern is not an error: matchers answer `None` and
//! the walk moves on. The variants here cover the conditions that do abort
//! a pass.

use thiserror::Error;

/// Main error type for graph transformation operations
#[derive(Error, Debug)]
pub enum TransformError {
    /// A fusion plan no longer matches the graph it was computed against
    #[error("Stale fusion plan for '{pattern}': {reason}")]
    StalePlan {
        /// Pattern that produced the plan
        pattern: String,
        /// Which re-check failed
        reason: String,
    },

    /// Graph invariant violated (cycle, dangling edge, lost output)
    #[error("Invalid graph: {0}")]
    InvalidGraph(String),

    /// A pass over a nested subgraph failed
    #[error("Subgraph '{attribute}' of node '{node}' failed: {source}")]
    Subgraph {
        /// Name of the node owning the subgraph
        node: String,
        /// Attribute under which the subgraph is stored
        attribute: String,
        /// Underlying failure
        #[source]
        source: Box<TransformError>,
    },

    /// Generic internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias for graph transformation operations
pub type OnnxResult<T> = Result<T, TransformError>;
