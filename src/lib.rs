//! # `ACMiner`
//!
//! `acminer` is the main crate of the `ACMiner` project. It mines, for each
//! entry point of an Android system service, the values that may be compared
//! by the control predicates guarding it, so that access control checks
//! (calling uid, permission names, user ids, ...) can be recovered. The project
//! is subdivided into multiple crates, `acminer` acts as entry point by
//! reexporting important structs and functions from those sub-crates. Most of
//! the reexport are done within the `acminer::prelude` namespace.
//!
//! ## Library basics
//!
//! The def-use graph of an entry point is produced by an upstream analysis
//! and stored as a JSON document, along with the binder table used to
//! replace remote calls by the entry points they reach:
//!
//! ```rust
//! use acminer::prelude::*;
//!
//! let (ep, graph, binder) = acminer::ir::open("demos/uid_check.json")?.into_parts()?;
//! let miner = AcMiner::new()?;
//! let results = miner.mine_data(&ep, &graph, &binder)?;
//! println!("{}", MiningSummary::from_results(&results));
//! # Ok::<(), AmError>(())
//! ```
//!
//! ## Sub-crates
//!
//!  - [`am_ir`] contains the program model the miner reads: types, method and
//!    field references, def-use graph nodes, the graph itself and the
//!    abstraction of the values locals may hold,
//!  - [`am_miner`] contains the mining engine and the pair simplification
//!    pipeline, and relies heavily on the previously cited crate.

mod errors;

pub mod am_graph;
pub mod am_mine;
pub mod cli;

pub use am_ir as ir;
pub use am_miner as miner;

/// Reexport module of commonly used structures and functions from `ACMiner` project
/// sub-crates:
///
/// ```rust
/// use acminer::prelude::*;
/// ```
pub mod prelude {
    pub use crate::errors::{AmError, AmResult};

    pub use am_ir::data::DataWrapper;
    pub use am_ir::document::GraphDocument;
    pub use am_ir::errors::IrError;
    pub use am_ir::nodes::{Node, NodeId};
    pub use am_ir::{BinderMap, DataAccessor, DefUseGraph, EntryPoint};

    pub use am_miner::errors::MinerError;
    pub use am_miner::{AcMiner, MinerConfig, MiningResults, MiningSummary, ValuePair};

    use clap::ArgMatches;

    pub fn init_logger(args: &ArgMatches) {
        let env = env_logger::Env::new()
            .filter_or("AM_LOG", "info")
            .write_style("AM_LOG_STYLE");

        let mut builder = env_logger::Builder::from_env(env);
        if args.get_flag("verbose") {
            builder.filter_level(log::LevelFilter::Trace);
        } else if args.get_flag("debug") {
            builder.filter_level(log::LevelFilter::Debug);
        }
        if args.get_flag("ecslog") {
            builder.format(ecs_logger::format);
        }
        builder.init();
    }
}
