//! Mining errors definition.

use am_ir::errors::IrError;
use am_ir::nodes::NodeId;
use rayon::ThreadPoolBuildError;
use thiserror::Error;

pub type MinerResult<T> = Result<T, MinerError>;

#[derive(Debug, Error)]
pub enum MinerError {
    #[error("program model error: {0}")]
    Ir(#[from] IrError),

    /// The operands of a node do not match the shape of its expression.
    #[error("node {node}: {reason}")]
    Shape { node: NodeId, reason: String },

    #[error("node {0}: too many substitution groups")]
    Overflow(NodeId),

    #[error("node {0}: attempting to access the data of a finished and cleared node")]
    ClearedNode(NodeId),

    #[error("node {0}: unsupported start node")]
    UnsupportedStartNode(NodeId),

    #[error("node {0}: could not determine the type of the node")]
    UnresolvableType(NodeId),

    #[error("equals call {pair} has {args} args instead of 2")]
    MalformedEquals { pair: String, args: usize },

    #[error("attempted to add more than two values to a pair")]
    PairOverflow,

    #[error("the string '{0}' contains the quoting character '`'")]
    Quoting(String),

    #[error("failed to parse pair {0}")]
    PairParse(String),

    #[error("worker pool error: {0}")]
    Pool(#[from] ThreadPoolBuildError),

    #[error("mining group '{group}' failed with {errors} error(s)")]
    GroupFailed { group: String, errors: usize },

    /// A failure that was already logged and recorded, the group is aborted.
    #[error("already reported failure")]
    Reported,
}
