//! Mining of the values compared by the control predicates of system
//! service entry points.
//!
//! For each start node of a def-use graph, every value its operands may
//! take is resolved by a parallel visit of the graph, and the comparisons
//! that may implement access control checks are reported as
//! [`ValuePair`]s.

pub mod binder;
pub mod data_node;
pub mod errors;
pub mod gating;
pub mod miner;
pub mod pair_set;
pub mod runner;
pub mod simplify;
pub mod value_pair;

#[cfg(test)]
mod testutils;

pub use miner::{AcMiner, MinerConfig, MiningResults, MiningSummary};
pub use pair_set::ValuePairSet;
pub use value_pair::ValuePair;
