//! JSON interchange format for a def-use graph and its binder table.
//!
//! ```json
//! {
//!   "entry_point": { "stub": "a.IFoo$Stub", "entry_point": "<a.Foo: int get()>" },
//!   "nodes": [ { "id": 1, "kind": "if_start", "identifier": [...], ... } ],
//!   "edges": [ { "parent": 1, "local": { "num": 0, "name": "$i0", "ty": "int" }, "child": 2 } ],
//!   "inline_constants": [],
//!   "binder": { "<a.IFoo$Stub$Proxy: int get()>": ["<a.Foo: int get()>"] }
//! }
//! ```

use crate::entrypoints::{BinderMap, EntryPoint};
use crate::errors::IrResult;
use crate::graph::DefUseGraph;
use crate::nodes::{InlineConstantLeafNode, InlineConstantLocalWrapper, LocalWrapper, Node, NodeId};
use log::debug;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EdgeDocument {
    pub parent: NodeId,
    pub local: LocalWrapper,
    pub child: NodeId,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InlineConstantDocument {
    pub node: NodeId,
    pub local: InlineConstantLocalWrapper,
    pub leaf: InlineConstantLeafNode,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphDocument {
    pub entry_point: EntryPoint,
    pub nodes: Vec<Node>,
    #[serde(default)]
    pub edges: Vec<EdgeDocument>,
    #[serde(default)]
    pub inline_constants: Vec<InlineConstantDocument>,
    #[serde(default)]
    pub binder: BinderMap,
}

impl GraphDocument {
    pub fn from_reader<R: Read>(reader: R) -> IrResult<Self> {
        Ok(serde_json::from_reader(reader)?)
    }

    pub fn from_json(s: &str) -> IrResult<Self> {
        Ok(serde_json::from_str(s)?)
    }

    /// Builds the graph, checking that every referenced node exists.
    pub fn into_parts(self) -> IrResult<(EntryPoint, DefUseGraph, BinderMap)> {
        let mut graph = DefUseGraph::new();
        for node in self.nodes {
            graph.add_node(node)?;
        }
        for edge in self.edges {
            graph.add_edge(edge.parent, edge.local, edge.child)?;
        }
        for ic in self.inline_constants {
            graph.add_inline_constant(ic.node, ic.local, ic.leaf)?;
        }
        debug!(
            "loaded def-use graph of {}: {} nodes, {} edges, {} binder methods",
            self.entry_point,
            graph.nb_nodes(),
            graph.nb_edges(),
            self.binder.len()
        );
        Ok((self.entry_point, graph, self.binder))
    }
}

/// Opens and decodes a graph document file.
pub fn open<P: AsRef<Path>>(path: P) -> IrResult<GraphDocument> {
    let file = File::open(path)?;
    GraphDocument::from_reader(BufReader::new(file))
}
