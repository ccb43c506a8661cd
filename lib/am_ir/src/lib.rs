//! # `am_ir`
//!
//! Program model consumed by the access-control miner: Java-like types,
//! method and field references, def-use graph nodes and the graph itself,
//! entry points, and the [`DataWrapper`](data::DataWrapper) abstraction
//! of the values locals may hold.
//!
//! Graphs are built by an upstream analysis and handed over as JSON
//! documents (see [`document`]).

pub mod data;
pub mod document;
pub mod entrypoints;
pub mod errors;
pub mod graph;
pub mod identifier;
pub mod methods;
pub mod nodes;
pub mod types;
pub mod values;

pub use document::open;
pub use entrypoints::{BinderMap, DataAccessor, EntryPoint};
pub use graph::DefUseGraph;
