//! Abstract values the miner resolves locals to.
//!
//! A [`DataWrapper`] is either one of the `ALL`/`NO`/`NULL` sentinels, a
//! constant, or a symbolic value described by an [`Identifier`](crate::identifier::Identifier)
//! whose local parts have been substituted by other wrappers.

mod primitive;
mod wrapper;

pub use primitive::PrimitiveConstant;
pub use wrapper::{DataWrapper, ExprOp, Expression, ALL_VALUE, NO_VALUE, NULL_VALUE};
