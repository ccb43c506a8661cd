//! Program model errors definition.

use crate::nodes::NodeId;
use std::io;
use thiserror::Error;

/// An alias for result that can be an [`IrError`].
pub type IrResult<T> = Result<T, IrError>;

/// The program model error type.
#[derive(Debug, Error)]
pub enum IrError {
    /// Error that can be returned when reading a graph document.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Error that can be returned when decoding a graph document.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("could not convert {} into {}", from, to)]
    Conversion { from: String, to: String },

    #[error("node {0} is defined twice")]
    DuplicateNode(NodeId),

    #[error("node {0} not found in graph")]
    UnknownNode(NodeId),

    #[error("type {0} is not a primitive type")]
    NotPrimitive(String),

    #[error("value {0} cannot be used in primitive arithmetic")]
    NonPrimitiveOperand(String),

    #[error("neither an identifier nor a value were given")]
    MissingValue,
}
