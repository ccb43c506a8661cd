//! Two pass visit of the nodes reachable from a start node.
//!
//! The first pass of a node gathers what its children already provide
//! (cache hits, gated locals, cycles) and spawns a visit for each other
//! child. The last child to hand over its values spawns the second pass of
//! its parent, which finalizes the node and hands its values up in turn,
//! or to the results of the start node.
//!
//! Visits are tasks of a [`rayon::Scope`], the depth of a def-use chain
//! does not grow the worker stacks.

use crate::data_node::DataNode;
use crate::errors::{MinerError, MinerResult};
use crate::gating::is_allowed_type;
use crate::pair_set::ValuePairSet;
use crate::value_pair::ValuePair;
use am_ir::data::DataWrapper;
use am_ir::entrypoints::{DataAccessor, EntryPoint};
use am_ir::errors::IrError;
use am_ir::graph::DefUseGraph;
use am_ir::nodes::{LocalWrapper, NodeId};
use log::{debug, error, trace};
use rayon::Scope;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError, RwLock};

/// Nodes from the start node down to the node being visited.
#[derive(Debug)]
pub struct ExpansionPath {
    node: NodeId,
    start: NodeId,
    parent: Option<Arc<ExpansionPath>>,
}

impl ExpansionPath {
    #[must_use]
    pub fn root(node: NodeId) -> Arc<Self> {
        Arc::new(Self {
            node,
            start: node,
            parent: None,
        })
    }

    #[must_use]
    pub fn child(self: &Arc<Self>, node: NodeId) -> Arc<Self> {
        Arc::new(Self {
            node,
            start: self.start,
            parent: Some(Arc::clone(self)),
        })
    }

    #[inline]
    #[must_use]
    pub const fn node(&self) -> NodeId {
        self.node
    }

    /// The node is on the path, visiting it again would loop.
    #[must_use]
    pub fn seen_before(&self, node: NodeId) -> bool {
        std::iter::successors(Some(self), |p| p.parent.as_deref()).any(|p| p.node == node)
    }

    #[inline]
    #[must_use]
    pub const fn start_node(&self) -> NodeId {
        self.start
    }
}

impl Drop for ExpansionPath {
    // unlinks long paths without recursing
    fn drop(&mut self) {
        let mut parent = self.parent.take();
        while let Some(path) = parent {
            parent = Arc::try_unwrap(path).ok().and_then(|mut p| p.parent.take());
        }
    }
}

/// Values of the inner nodes already resolved during a mining call.
#[derive(Debug, Default)]
pub struct NodeCache {
    inner: RwLock<HashMap<NodeId, Arc<BTreeSet<DataWrapper>>>>,
}

impl NodeCache {
    #[must_use]
    pub fn get(&self, id: NodeId) -> Option<Arc<BTreeSet<DataWrapper>>> {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&id)
            .cloned()
    }

    /// Stores the values unless some are already stored, returns true if
    /// they were stored.
    pub fn insert_if_absent(&self, id: NodeId, data: Arc<BTreeSet<DataWrapper>>) -> bool {
        let mut cache = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        if cache.contains_key(&id) {
            false
        } else {
            cache.insert(id, data);
            true
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

pub type StartNodeResults = BTreeMap<NodeId, Mutex<ValuePairSet>>;

/// A node waiting for its children, and the node waiting for it.
struct Visit<'g> {
    data: DataNode<'g>,
    path: Arc<ExpansionPath>,
    parent: Option<Arc<Visit<'g>>>,
}

impl Drop for Visit<'_> {
    // a failed chain releases all its waiting ancestors at once
    fn drop(&mut self) {
        let mut parent = self.parent.take();
        while let Some(visit) = parent {
            parent = Arc::try_unwrap(visit).ok().and_then(|mut v| v.parent.take());
        }
    }
}

fn parent_text(parent: Option<&Arc<Visit<'_>>>) -> String {
    parent.map_or_else(|| "NULL".to_string(), |p| p.data.node().to_string())
}

/// Everything shared by the visits of one mining call.
pub struct MinerRunner<'a> {
    pub name: &'a str,
    pub ep: &'a EntryPoint,
    pub graph: &'a DefUseGraph,
    pub accessor: &'a dyn DataAccessor,
    pub cache: &'a NodeCache,
    pub results: &'a StartNodeResults,
    pub exceptions: &'a Mutex<Vec<MinerError>>,
    pub sub_capture: bool,
    /// Start nodes are resolved as plain values rather than as predicates.
    pub additional: bool,
}

impl<'a> MinerRunner<'a> {
    /// Mines one start node into its result set, returns once every visit
    /// it spawned is over.
    ///
    /// Failures are logged and recorded when they happen, the caller only
    /// gets [`MinerError::Reported`].
    pub fn run(&self, start: NodeId) -> MinerResult<()> {
        let failed = AtomicBool::new(false);
        rayon::scope(|s| self.first_pass(s, &failed, ExpansionPath::root(start), None));
        if failed.load(Ordering::SeqCst) {
            Err(MinerError::Reported)
        } else {
            Ok(())
        }
    }

    fn first_pass<'s>(
        &'s self,
        scope: &Scope<'s>,
        failed: &'s AtomicBool,
        path: Arc<ExpansionPath>,
        parent: Option<(Arc<Visit<'a>>, LocalWrapper)>,
    ) {
        if failed.load(Ordering::SeqCst) {
            return;
        }
        if let Err(err) = self.try_first_pass(scope, failed, &path, parent) {
            self.report(err, &path, failed);
        }
    }

    fn try_first_pass<'s>(
        &'s self,
        scope: &Scope<'s>,
        failed: &'s AtomicBool,
        path: &Arc<ExpansionPath>,
        parent: Option<(Arc<Visit<'a>>, LocalWrapper)>,
    ) -> MinerResult<()> {
        let id = path.node();
        let node = self.graph.node(id)?;
        let children_map = self.graph.children_by_local(id)?;
        let (parent, parent_local) = match parent {
            Some((visit, lw)) => (Some(visit), Some(lw)),
            None => (None, None),
        };
        let cur = DataNode::new(
            node,
            parent_local,
            &children_map,
            self.graph.inline_constants(id)?,
            self.sub_capture,
        );

        debug!(
            "{}: visiting first node='{}' parent='{}' start node='{}' ep='{}'",
            self.name,
            node,
            parent_text(parent.as_ref()),
            self.node_text(path.start_node()),
            self.ep
        );
        let mut scheduled: Vec<(LocalWrapper, NodeId)> = Vec::new();
        for (lw, children) in &children_map {
            if !is_allowed_type(lw.ty()) {
                trace!(
                    "    local '{}' has denied type '{}', skipping {} children",
                    lw,
                    lw.ty(),
                    children.len()
                );
                cur.add_resolved_data(lw, DataWrapper::All)?;
                for _ in children {
                    cur.inc_count()?;
                }
            } else if children.is_empty() {
                trace!("    no child nodes for local '{}'", lw);
                cur.add_resolved_data(lw, DataWrapper::No)?;
            } else {
                for child in children {
                    if let Some(data) = self.cache.get(*child) {
                        trace!("    already computed data for child '{}' of '{}'", child, lw);
                        cur.add_resolved_set(lw, &data)?;
                        cur.inc_count()?;
                    } else if path.seen_before(*child) {
                        trace!("    cycle detected, child '{}' of '{}' seen before", child, lw);
                        cur.add_resolved_data(lw, DataWrapper::All)?;
                        cur.inc_count()?;
                    } else {
                        trace!("    visiting child '{}' of '{}'", child, lw);
                        scheduled.push((lw.clone(), *child));
                    }
                }
            }
        }

        let visit = Arc::new(Visit {
            data: cur,
            path: Arc::clone(path),
            parent,
        });
        if scheduled.is_empty() {
            if !visit.data.children_finished()? {
                return Err(MinerError::Shape {
                    node: id,
                    reason: "second pass reached with unfinished children".to_string(),
                });
            }
            return self.try_second_pass(scope, failed, &visit);
        }
        for (lw, child) in scheduled {
            let child_path = path.child(child);
            let parent = Some((Arc::clone(&visit), lw));
            scope.spawn(move |s| self.first_pass(s, failed, child_path, parent));
        }
        Ok(())
    }

    fn second_pass<'s>(&'s self, scope: &Scope<'s>, failed: &'s AtomicBool, visit: Arc<Visit<'a>>) {
        if failed.load(Ordering::SeqCst) {
            return;
        }
        if let Err(err) = self.try_second_pass(scope, failed, &visit) {
            self.report(err, &visit.path, failed);
        }
    }

    fn try_second_pass<'s>(
        &'s self,
        scope: &Scope<'s>,
        failed: &'s AtomicBool,
        visit: &Arc<Visit<'a>>,
    ) -> MinerResult<()> {
        let cur = &visit.data;
        let node = cur.node();
        let id = cur.id();
        debug!(
            "{}: visiting second node='{}' parent='{}' start node='{}' ep='{}'",
            self.name,
            node,
            parent_text(visit.parent.as_ref()),
            self.node_text(visit.path.start_node()),
            self.ep
        );
        cur.finalize_results(self.accessor)?;
        match (&visit.parent, cur.parent_local()) {
            (None, _) => {
                let pairs: Vec<ValuePair> = if self.additional {
                    cur.resolved_strings(self.ep)?
                        .into_iter()
                        .map(|dw| ValuePair::from_node(dw, None, node))
                        .collect()
                } else {
                    cur.resolved_strings_for_start_nodes(self.accessor)?
                };
                let results = self
                    .results
                    .get(&id)
                    .ok_or(MinerError::Ir(IrError::UnknownNode(id)))?;
                results
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .extend(pairs);
            }
            (Some(parent), Some(lw)) => {
                let data = Arc::new(cur.resolved_strings(self.ep)?);
                self.cache.insert_if_absent(id, Arc::clone(&data));
                parent.data.add_resolved_set(lw, &data)?;
                if parent.data.inc_count()? {
                    trace!("    last child of '{}' finished", parent.data.node());
                    let parent = Arc::clone(parent);
                    scope.spawn(move |s| self.second_pass(s, failed, parent));
                }
            }
            (Some(_), None) => {
                return Err(MinerError::Shape {
                    node: id,
                    reason: "child node visited without a parent local".to_string(),
                })
            }
        }
        Ok(())
    }

    fn node_text(&self, id: NodeId) -> String {
        self.graph
            .node(id)
            .map_or_else(|_| id.to_string(), ToString::to_string)
    }

    /// Logs and records a failure, then stops the other visits of the
    /// start node.
    fn report(&self, err: MinerError, path: &ExpansionPath, failed: &AtomicBool) {
        failed.store(true, Ordering::SeqCst);
        error!(
            "{}: unexpected error while processing node '{}' of start node '{}' for ep '{}': {}",
            self.name,
            self.node_text(path.node()),
            self.node_text(path.start_node()),
            self.ep,
            err
        );
        self.exceptions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(err);
    }
}
