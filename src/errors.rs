//! Global error handling.
//!
//! Each sub-crate of the project defines its own type error.
//! Their types can be unified, for example in a main function,
//! when winding results at the top-level.
//!
//! ```rust
//! use acminer::prelude::*;
//!
//! fn main() -> AmResult<()> { // can return an AmError
//!    let _doc = acminer::ir::open("demos/uid_check.json")?; // can return an IrError
//!    Ok(())
//! }
//! ```

use am_ir::errors::IrError;
use am_miner::errors::MinerError;
use std::io;
use thiserror::Error;

/// An alias for result that can be an [`AmError`].
pub type AmResult<T> = Result<T, AmError>;

/// The main error type for error winding at the top-level.
/// It mainly consists of transparent wrapper over error types that
/// are defined in dependencies.
#[derive(Debug, Error)]
pub enum AmError {
    /// Custom error for reporting bad command line arguments usage.
    #[error("bad arguments: {0}")]
    BadArguments(String),

    /// Error that can be returned from [I/O operations](std::io).
    #[error(transparent)]
    IO(#[from] io::Error),

    /// Error that can be returned when writing JSON results.
    #[error(transparent)]
    Json(#[from] serde_json::Error),

    /// Error that can be returned from regex compilation.
    #[error(transparent)]
    Regex(#[from] regex::Error),

    /// Error that can be returned from [`am_ir`] functions.
    #[error(transparent)]
    Ir(#[from] IrError),

    /// Error that can be returned from [`am_miner`] functions.
    #[error(transparent)]
    Miner(#[from] MinerError),
}
