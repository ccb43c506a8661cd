//! Builder of small def-use graphs.

use am_ir::entrypoints::EntryPoint;
use am_ir::graph::DefUseGraph;
use am_ir::identifier::{Identifier, Part};
use am_ir::methods::{FieldRef, MethodRef};
use am_ir::nodes::{
    InlineConstantLeafNode, InlineConstantLocalWrapper, LocalWrapper, Node, NodeId, NodeKind, Stmt,
};
use am_ir::types::Type;
use am_ir::values::{Constant, Value};

pub fn local<S: Into<String>>(num: u32, name: S, ty: Type) -> LocalWrapper {
    LocalWrapper::new(num, name, ty)
}

pub fn local_part(lw: &LocalWrapper) -> Part {
    Part::Local { local: lw.clone() }
}

pub struct GraphBuilder {
    graph: DefUseGraph,
    next: u32,
}

impl GraphBuilder {
    pub fn new() -> Self {
        Self {
            graph: DefUseGraph::new(),
            next: 1,
        }
    }

    /// Method every node belongs to, also the mined entry point.
    pub fn source(&self) -> MethodRef {
        MethodRef::new("a.FooService", "check", Type::Boolean, vec![Type::Int])
    }

    pub fn entry_point(&self) -> EntryPoint {
        EntryPoint::new("a.IFoo$Stub", self.source())
    }

    fn add(&mut self, kind: NodeKind, parts: Vec<Part>, value: Option<Value>, prefix: &str) -> NodeId {
        let id = NodeId(self.next);
        self.next += 1;
        let identifier = Identifier::new(parts);
        let stmt = Stmt::new(id.0, format!("{prefix}{identifier}"));
        let node = Node::new(id, kind, identifier, value, self.source(), stmt);
        self.graph.add_node(node).unwrap();
        id
    }

    /// `if a == b`
    pub fn if_start(&mut self, a: Part, b: Part) -> NodeId {
        self.add(NodeKind::IfStart, vec![a, Part::literal(" == "), b], None, "if ")
    }

    pub fn switch_start(&mut self, key: Part, key_type: Type, cases: Vec<Option<i32>>) -> NodeId {
        self.add(NodeKind::SwitchStart { key_type, cases }, vec![key], None, "switch ")
    }

    /// `target(args)`
    pub fn invoke_start(&mut self, target: MethodRef, args: Vec<Part>) -> NodeId {
        let mut parts = vec![
            Part::MethodRef {
                method: target.clone(),
            },
            Part::literal("("),
        ];
        parts.extend(args);
        parts.push(Part::literal(")"));
        self.add(NodeKind::InvokeStart { target }, parts, None, "")
    }

    pub fn field_start(&mut self, field: FieldRef) -> NodeId {
        let parts = vec![Part::FieldRef {
            field: field.clone(),
        }];
        self.add(NodeKind::FieldStart { field }, parts, None, "")
    }

    pub fn constant(&mut self, c: Constant) -> NodeId {
        let parts = Identifier::of_constant(&c).iter().cloned().collect();
        self.add(NodeKind::Inner, parts, Some(Value::Constant { constant: c }), "")
    }

    pub fn inner(&mut self, parts: Vec<Part>, value: Value) -> NodeId {
        self.add(NodeKind::Inner, parts, Some(value), "")
    }

    /// `child` defines `local`, used by `parent`.
    pub fn edge(&mut self, parent: NodeId, local: &LocalWrapper, child: NodeId) {
        self.graph.add_edge(parent, local.clone(), child).unwrap();
    }

    pub fn inline(&mut self, node: NodeId, num: u32, leaf: InlineConstantLeafNode) {
        self.graph
            .add_inline_constant(node, InlineConstantLocalWrapper::new(num), leaf)
            .unwrap();
    }

    pub fn build(self) -> DefUseGraph {
        self.graph
    }
}
