//! Mining entry point: one call per entry point and def-use graph.

use crate::errors::{MinerError, MinerResult};
use crate::runner::{MinerRunner, NodeCache, StartNodeResults};
use crate::value_pair::ValuePair;
use am_ir::entrypoints::{DataAccessor, EntryPoint};
use am_ir::graph::DefUseGraph;
use am_ir::nodes::{Node, NodeId};
use log::{debug, error};
use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::{Mutex, PoisonError};

/// Sorted pairs of every mined start node, by ascending node.
pub type MiningResults = BTreeMap<NodeId, Vec<ValuePair>>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MinerConfig {
    threads: usize,
    thread_name: String,
    stack_size: usize,
    sub_capture: bool,
}

impl Default for MinerConfig {
    fn default() -> Self {
        Self {
            threads: std::thread::available_parallelism().map_or(1, usize::from),
            thread_name: "acminer".to_string(),
            stack_size: 8 * 1024 * 1024,
            sub_capture: false,
        }
    }
}

impl MinerConfig {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of worker threads, 0 keeps the default.
    #[must_use]
    pub fn with_threads(mut self, threads: usize) -> Self {
        if threads > 0 {
            self.threads = threads;
        }
        self
    }

    #[must_use]
    pub fn with_thread_name<S: Into<String>>(mut self, prefix: S) -> Self {
        self.thread_name = prefix.into();
        self
    }

    /// Stack size of the worker threads.
    #[must_use]
    pub const fn with_stack_size(mut self, stack_size: usize) -> Self {
        self.stack_size = stack_size;
        self
    }

    /// Keep the parameters of the mined entry point as variables.
    #[must_use]
    pub const fn with_sub_capture(mut self, sub_capture: bool) -> Self {
        self.sub_capture = sub_capture;
        self
    }

    #[inline]
    #[must_use]
    pub const fn threads(&self) -> usize {
        self.threads
    }

    #[inline]
    #[must_use]
    pub fn thread_name(&self) -> &str {
        &self.thread_name
    }

    #[inline]
    #[must_use]
    pub const fn stack_size(&self) -> usize {
        self.stack_size
    }

    #[inline]
    #[must_use]
    pub const fn sub_capture(&self) -> bool {
        self.sub_capture
    }
}

/// Miner of the values compared by the control predicates of entry points.
///
/// Owns the worker pool. Node values are only cached for the duration of
/// one mining call.
pub struct AcMiner {
    name: String,
    pool: ThreadPool,
    exceptions: Mutex<Vec<MinerError>>,
    config: MinerConfig,
}

impl AcMiner {
    pub fn new() -> MinerResult<Self> {
        Self::with_config(MinerConfig::default())
    }

    pub fn with_config(config: MinerConfig) -> MinerResult<Self> {
        let prefix = config.thread_name.clone();
        let pool = ThreadPoolBuilder::new()
            .num_threads(config.threads)
            .stack_size(config.stack_size)
            .thread_name(move |i| format!("{prefix}-{i}"))
            .build()?;
        debug!("started miner with {} worker threads", pool.current_num_threads());
        Ok(Self {
            name: "ACMiner".to_string(),
            pool,
            exceptions: Mutex::default(),
            config,
        })
    }

    #[inline]
    #[must_use]
    pub const fn config(&self) -> &MinerConfig {
        &self.config
    }

    /// Mines every start node of the graph, with the configured sub-capture mode.
    pub fn mine_data(
        &self,
        ep: &EntryPoint,
        graph: &DefUseGraph,
        accessor: &dyn DataAccessor,
    ) -> MinerResult<MiningResults> {
        self.mine_data_with(ep, graph, self.config.sub_capture, accessor)
    }

    pub fn mine_data_with(
        &self,
        ep: &EntryPoint,
        graph: &DefUseGraph,
        sub_capture: bool,
        accessor: &dyn DataAccessor,
    ) -> MinerResult<MiningResults> {
        debug!("{}: mining data for ep '{}'", self.name, ep);
        let starts: Vec<NodeId> = graph.start_nodes().map(Node::id).collect();
        let res = self.mine(ep, graph, &starts, sub_capture, false, accessor)?;
        debug!("{}: successfully mined data for ep '{}'", self.name, ep);
        Ok(res)
    }

    /// Mines arbitrary nodes of the graph, each one resolved as a value
    /// giving single operand pairs.
    pub fn mine_additional_data(
        &self,
        ep: &EntryPoint,
        graph: &DefUseGraph,
        start_nodes: &[NodeId],
        accessor: &dyn DataAccessor,
    ) -> MinerResult<MiningResults> {
        debug!("{}: mining additional data for ep '{}'", self.name, ep);
        let res = self.mine(ep, graph, start_nodes, false, true, accessor)?;
        debug!("{}: successfully mined additional data for ep '{}'", self.name, ep);
        Ok(res)
    }

    fn mine(
        &self,
        ep: &EntryPoint,
        graph: &DefUseGraph,
        start_nodes: &[NodeId],
        sub_capture: bool,
        additional: bool,
        accessor: &dyn DataAccessor,
    ) -> MinerResult<MiningResults> {
        let group = if additional {
            format!("{ep}_additionalACMiner")
        } else {
            format!("{ep}_ACMiner")
        };
        let cache = NodeCache::default();
        let results: StartNodeResults = start_nodes
            .iter()
            .map(|id| (*id, Mutex::default()))
            .collect();
        let runner = MinerRunner {
            name: &self.name,
            ep,
            graph,
            accessor,
            cache: &cache,
            results: &results,
            exceptions: &self.exceptions,
            sub_capture,
            additional,
        };

        let keys: Vec<NodeId> = results.keys().copied().collect();
        let failures = self.pool.install(|| {
            keys.par_iter()
                .map(|sn| runner.run(*sn))
                .filter(Result::is_err)
                .count()
        });
        if failures > 0 {
            error!("{}: failed to mine data for group '{}'", self.name, group);
            return Err(MinerError::GroupFailed {
                group,
                errors: failures,
            });
        }

        Ok(results
            .into_iter()
            .map(|(id, pairs)| {
                let pairs = pairs.into_inner().unwrap_or_else(PoisonError::into_inner);
                (id, pairs.into_sorted_vec())
            })
            .collect())
    }

    /// Failures recorded since the last call.
    pub fn get_and_clear_exceptions(&self) -> Vec<MinerError> {
        std::mem::take(&mut *self.exceptions.lock().unwrap_or_else(PoisonError::into_inner))
    }

    /// Stops the workers, returns false if failures were never collected.
    pub fn shutdown_when_finished(self) -> bool {
        let pending = self
            .exceptions
            .into_inner()
            .unwrap_or_else(PoisonError::into_inner);
        debug!("{}: shutting down, {} pending failure(s)", self.name, pending.len());
        pending.is_empty()
    }
}

/// Counters over the results of a mining call.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct MiningSummary {
    pub start_nodes: usize,
    pub empty_start_nodes: usize,
    pub pairs: usize,
    /// Pairs with zero, one and two operands.
    pub by_arity: [usize; 3],
}

impl MiningSummary {
    #[must_use]
    pub fn from_results(results: &MiningResults) -> Self {
        let mut res = Self::default();
        for pairs in results.values() {
            res.start_nodes += 1;
            if pairs.is_empty() {
                res.empty_start_nodes += 1;
            }
            res.pairs += pairs.len();
            for pair in pairs {
                res.by_arity[pair.size()] += 1;
            }
        }
        res
    }

    /// Accumulates the counters of another call.
    pub fn merge(&mut self, other: &Self) {
        self.start_nodes += other.start_nodes;
        self.empty_start_nodes += other.empty_start_nodes;
        self.pairs += other.pairs;
        for (a, b) in self.by_arity.iter_mut().zip(other.by_arity) {
            *a += b;
        }
    }
}

impl fmt::Display for MiningSummary {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{} start nodes ({} without pairs), {} pairs ({} single, {} double)",
            self.start_nodes,
            self.empty_start_nodes,
            self.pairs,
            self.by_arity[1],
            self.by_arity[2]
        )
    }
}
