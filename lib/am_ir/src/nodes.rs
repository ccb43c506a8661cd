//! Def-use graph nodes and the locals labelling their edges.

use crate::identifier::Identifier;
use crate::methods::{FieldRef, MethodRef};
use crate::types::Type;
use crate::values::{Constant, Value};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// Unique identifier of a node inside a def-use graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(pub u32);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "n{}", self.0)
    }
}

/// A local of the method body a node comes from.
///
/// The number makes locals of different methods distinct even when
/// their names collide.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct LocalWrapper {
    num: u32,
    name: String,
    ty: Type,
}

impl LocalWrapper {
    #[must_use]
    pub fn new<S: Into<String>>(num: u32, name: S, ty: Type) -> Self {
        Self {
            num,
            name: name.into(),
            ty,
        }
    }

    #[inline]
    #[must_use]
    pub const fn num(&self) -> u32 {
        self.num
    }

    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    #[must_use]
    pub const fn ty(&self) -> &Type {
        &self.ty
    }
}

impl fmt::Display for LocalWrapper {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}#{}", self.name, self.num)
    }
}

/// Synthetic local standing for a constant inlined in a statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct InlineConstantLocalWrapper {
    num: u32,
}

impl InlineConstantLocalWrapper {
    #[must_use]
    pub const fn new(num: u32) -> Self {
        Self { num }
    }
}

impl fmt::Display for InlineConstantLocalWrapper {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "$c{}", self.num)
    }
}

/// Leaf holding an inlined constant and the identifier position it occupies.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct InlineConstantLeafNode {
    index: usize,
    value: Constant,
}

impl InlineConstantLeafNode {
    #[must_use]
    pub const fn new(index: usize, value: Constant) -> Self {
        Self { index, value }
    }

    #[inline]
    #[must_use]
    pub const fn index(&self) -> usize {
        self.index
    }

    #[inline]
    #[must_use]
    pub const fn value(&self) -> &Constant {
        &self.value
    }
}

/// The statement a node was built from.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Stmt {
    index: u32,
    text: String,
}

impl Stmt {
    #[must_use]
    pub fn new<S: Into<String>>(index: u32, text: S) -> Self {
        Self {
            index,
            text: text.into(),
        }
    }

    #[inline]
    #[must_use]
    pub const fn index(&self) -> u32 {
        self.index
    }

    #[inline]
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }
}

impl fmt::Display for Stmt {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.text)
    }
}

/// Role of a node in the graph. Everything but `Inner` is a start node.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum NodeKind {
    /// Invocation used directly as a control predicate or context query.
    InvokeStart { target: MethodRef },
    /// Field read used directly as a control predicate or context query.
    FieldStart { field: FieldRef },
    /// Conditional jump, the identifier holds both compared operands.
    IfStart,
    /// Switch, `None` denotes the default case.
    SwitchStart {
        key_type: Type,
        cases: Vec<Option<i32>>,
    },
    /// Definition of a local some other node uses.
    Inner,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Node {
    id: NodeId,
    #[serde(flatten)]
    kind: NodeKind,
    identifier: Identifier,
    #[serde(default)]
    value: Option<Value>,
    source: MethodRef,
    stmt: Stmt,
}

impl Node {
    #[must_use]
    pub const fn new(
        id: NodeId,
        kind: NodeKind,
        identifier: Identifier,
        value: Option<Value>,
        source: MethodRef,
        stmt: Stmt,
    ) -> Self {
        Self {
            id,
            kind,
            identifier,
            value,
            source,
            stmt,
        }
    }

    #[inline]
    #[must_use]
    pub const fn id(&self) -> NodeId {
        self.id
    }

    #[inline]
    #[must_use]
    pub const fn kind(&self) -> &NodeKind {
        &self.kind
    }

    #[inline]
    #[must_use]
    pub const fn identifier(&self) -> &Identifier {
        &self.identifier
    }

    #[inline]
    #[must_use]
    pub const fn value(&self) -> Option<&Value> {
        self.value.as_ref()
    }

    /// Method whose body contains the statement of this node.
    #[inline]
    #[must_use]
    pub const fn source(&self) -> &MethodRef {
        &self.source
    }

    #[inline]
    #[must_use]
    pub const fn stmt(&self) -> &Stmt {
        &self.stmt
    }

    #[must_use]
    pub const fn is_start(&self) -> bool {
        !matches!(self.kind, NodeKind::Inner)
    }

    /// Target method when the node stands for an invocation, start node or not.
    #[must_use]
    pub fn invoked_method(&self) -> Option<&MethodRef> {
        match (&self.kind, &self.value) {
            (NodeKind::InvokeStart { target }, _) => Some(target),
            (_, Some(Value::Invoke { method })) => Some(method),
            _ => None,
        }
    }
}

impl PartialEq for Node {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Node {}

impl PartialOrd for Node {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Node {
    fn cmp(&self, other: &Self) -> Ordering {
        self.id.cmp(&other.id)
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.stmt)
    }
}
