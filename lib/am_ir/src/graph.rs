//! Def-use graph of one entry point.
//!
//! Edges go from a node to the nodes defining the locals it uses, and are
//! labelled with the local they define. The graph may be cyclic.

use crate::errors::{IrError, IrResult};
use crate::nodes::{InlineConstantLeafNode, InlineConstantLocalWrapper, LocalWrapper, Node, NodeId};
use petgraph::dot::{Config, Dot};
use petgraph::prelude::*;
use petgraph::visit::NodeRef;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt::Write;

pub type InlineConstants = BTreeMap<InlineConstantLocalWrapper, InlineConstantLeafNode>;

#[derive(Debug, Clone, Default)]
pub struct DefUseGraph {
    inner: DiGraph<Node, LocalWrapper>,
    indices: BTreeMap<NodeId, NodeIndex>,
    inline_constants: BTreeMap<NodeId, InlineConstants>,
}

impl DefUseGraph {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_node(&mut self, node: Node) -> IrResult<()> {
        let id = node.id();
        if self.indices.contains_key(&id) {
            return Err(IrError::DuplicateNode(id));
        }
        let idx = self.inner.add_node(node);
        self.indices.insert(id, idx);
        Ok(())
    }

    /// Records that `child` defines `local`, used by `parent`.
    pub fn add_edge(&mut self, parent: NodeId, local: LocalWrapper, child: NodeId) -> IrResult<()> {
        let from = self.index(parent)?;
        let to = self.index(child)?;
        self.inner.add_edge(from, to, local);
        Ok(())
    }

    pub fn add_inline_constant(
        &mut self,
        node: NodeId,
        local: InlineConstantLocalWrapper,
        leaf: InlineConstantLeafNode,
    ) -> IrResult<()> {
        self.index(node)?;
        self.inline_constants
            .entry(node)
            .or_default()
            .insert(local, leaf);
        Ok(())
    }

    fn index(&self, id: NodeId) -> IrResult<NodeIndex> {
        self.indices
            .get(&id)
            .copied()
            .ok_or(IrError::UnknownNode(id))
    }

    pub fn node(&self, id: NodeId) -> IrResult<&Node> {
        Ok(&self.inner[self.index(id)?])
    }

    #[must_use]
    pub fn nb_nodes(&self) -> usize {
        self.inner.node_count()
    }

    #[must_use]
    pub fn nb_edges(&self) -> usize {
        self.inner.edge_count()
    }

    /// Nodes sorted by id.
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.indices.values().map(|idx| &self.inner[*idx])
    }

    /// Start nodes sorted by id.
    pub fn start_nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes().filter(|n| n.is_start())
    }

    /// For each local the node uses, the nodes that may define it.
    ///
    /// Locals of the node identifier are always present, possibly
    /// mapped to an empty set when nothing defines them.
    pub fn children_by_local(&self, id: NodeId) -> IrResult<BTreeMap<LocalWrapper, BTreeSet<NodeId>>> {
        let idx = self.index(id)?;
        let mut res: BTreeMap<LocalWrapper, BTreeSet<NodeId>> = self.inner[idx]
            .identifier()
            .locals()
            .map(|l| (l.clone(), BTreeSet::new()))
            .collect();
        for edge in self.inner.edges_directed(idx, Direction::Outgoing) {
            res.entry(edge.weight().clone())
                .or_default()
                .insert(self.inner[edge.target()].id());
        }
        Ok(res)
    }

    /// Inline constants of a node, empty when it has none.
    pub fn inline_constants(&self, id: NodeId) -> IrResult<InlineConstants> {
        self.index(id)?;
        Ok(self.inline_constants.get(&id).cloned().unwrap_or_default())
    }

    /// Sub-graph made of the start nodes matching `keep` and every node
    /// reachable from them.
    pub fn filtered<F: Fn(&Node) -> bool>(&self, keep: F) -> IrResult<Self> {
        let mut reachable = BTreeSet::new();
        for sn in self.start_nodes().filter(|n| keep(n)) {
            let mut dfs = Dfs::new(&self.inner, self.index(sn.id())?);
            while let Some(idx) = dfs.next(&self.inner) {
                reachable.insert(idx);
            }
        }

        let mut res = Self::new();
        for idx in &reachable {
            res.add_node(self.inner[*idx].clone())?;
        }
        for edge in self.inner.edge_references() {
            if reachable.contains(&edge.source()) && reachable.contains(&edge.target()) {
                res.add_edge(
                    self.inner[edge.source()].id(),
                    edge.weight().clone(),
                    self.inner[edge.target()].id(),
                )?;
            }
        }
        for (id, constants) in &self.inline_constants {
            if res.indices.contains_key(id) {
                res.inline_constants.insert(*id, constants.clone());
            }
        }
        Ok(res)
    }

    #[must_use]
    pub fn to_dot(&self) -> String {
        let mut res = String::new();
        res.push_str("digraph {\n");
        res.push_str("  rankdir=LR;\n");
        let _ = write!(
            res,
            "{}",
            Dot::with_attr_getters(
                &self.inner,
                &[Config::GraphContentOnly, Config::EdgeNoLabel],
                &|_, edge| format!("label=\"{}\"", edge.weight().name()),
                &|_, node| {
                    let n = node.weight();
                    let color = if n.is_start() { "red" } else { "black" };
                    format!("color={color},shape=box")
                }
            )
        );
        res.push('}');
        res
    }
}
