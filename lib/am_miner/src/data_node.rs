//! Per node accumulation of the values of its operands, and substitution of
//! those values into the node identifier.

use crate::binder::{replace_binder_invokes, replace_binder_invokes_with_eps};
use crate::errors::{MinerError, MinerResult};
use crate::gating::is_untrackable;
use crate::simplify::simplify_pairs;
use crate::value_pair::ValuePair;
use am_ir::data::{DataWrapper, PrimitiveConstant};
use am_ir::entrypoints::{DataAccessor, EntryPoint};
use am_ir::graph::InlineConstants;
use am_ir::identifier::{Identifier, Part};
use am_ir::nodes::{LocalWrapper, Node, NodeId, NodeKind};
use am_ir::types::Type;
use am_ir::values::{BinopKind, Constant, Value};
use log::{debug, trace};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Mutex, PoisonError};

/// Mutable part of a [`DataNode`], dropped once its values are extracted.
#[derive(Debug)]
struct State {
    resolved: BTreeMap<LocalWrapper, BTreeSet<DataWrapper>>,
    inline_constants: InlineConstants,
    count: usize,
}

/// Operand slot of an identifier.
#[derive(Debug, Clone)]
enum Slot {
    Local(LocalWrapper),
    Inline(Constant),
}

/// A slot and the position of the identifier part it replaces.
#[derive(Debug, Clone)]
struct UsedSlot {
    position: usize,
    slot: Slot,
}

/// Kind of expression a node stands for, as far as substitution goes.
enum Shape<'v> {
    Binop(BinopKind),
    Neg,
    /// Length, instance-of and allocations: never comparable.
    Opaque,
    Cast,
    ArrayRef(&'v Type),
    Default,
}

impl<'v> Shape<'v> {
    fn of(value: Option<&'v Value>) -> Self {
        match value {
            Some(Value::Binop { op, .. }) => Self::Binop(*op),
            Some(Value::Neg { .. }) => Self::Neg,
            Some(Value::Length | Value::InstanceOf { .. } | Value::New { .. }) => Self::Opaque,
            Some(Value::Cast { .. }) => Self::Cast,
            Some(Value::ArrayRef { ty }) => Self::ArrayRef(ty),
            _ => Self::Default,
        }
    }
}

pub type SubstitutionGroups = BTreeSet<Vec<DataWrapper>>;

/// A graph node being mined.
///
/// Children push their values with [`DataNode::add_resolved_set`] and
/// [`DataNode::inc_count`], possibly from different threads. Once every
/// child is accounted for, the node is finalized and its values are
/// extracted exactly once: any later access fails with
/// [`MinerError::ClearedNode`].
#[derive(Debug)]
pub struct DataNode<'g> {
    node: &'g Node,
    parent_local: Option<LocalWrapper>,
    total: usize,
    sub_capture: bool,
    state: Mutex<Option<State>>,
}

impl<'g> DataNode<'g> {
    /// `children` maps each local of the node to its defining nodes, the
    /// node waits for one contribution per child.
    #[must_use]
    pub fn new(
        node: &'g Node,
        parent_local: Option<LocalWrapper>,
        children: &BTreeMap<LocalWrapper, BTreeSet<NodeId>>,
        inline_constants: InlineConstants,
        sub_capture: bool,
    ) -> Self {
        let resolved = children
            .keys()
            .map(|lw| (lw.clone(), BTreeSet::new()))
            .collect();
        Self {
            node,
            parent_local,
            total: children.values().map(BTreeSet::len).sum(),
            sub_capture,
            state: Mutex::new(Some(State {
                resolved,
                inline_constants,
                count: 0,
            })),
        }
    }

    #[inline]
    #[must_use]
    pub const fn node(&self) -> &'g Node {
        self.node
    }

    #[inline]
    #[must_use]
    pub const fn id(&self) -> NodeId {
        self.node.id()
    }

    /// Local of the parent this node defines, `None` for the root.
    #[must_use]
    pub const fn parent_local(&self) -> Option<&LocalWrapper> {
        self.parent_local.as_ref()
    }

    fn with_state<T, F: FnOnce(&mut State) -> T>(&self, f: F) -> MinerResult<T> {
        let mut guard = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        guard
            .as_mut()
            .map(f)
            .ok_or_else(|| MinerError::ClearedNode(self.id()))
    }

    fn take_state(&self) -> MinerResult<State> {
        self.state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
            .ok_or_else(|| MinerError::ClearedNode(self.id()))
    }

    /// Accounts for one finished child, returns true if it was the last one.
    pub fn inc_count(&self) -> MinerResult<bool> {
        let total = self.total;
        self.with_state(|s| {
            s.count += 1;
            s.count >= total
        })
    }

    pub fn children_finished(&self) -> MinerResult<bool> {
        let total = self.total;
        self.with_state(|s| s.count >= total)
    }

    /// Values of locals the node does not use are ignored.
    pub fn add_resolved_data(&self, lw: &LocalWrapper, dw: DataWrapper) -> MinerResult<()> {
        self.with_state(|s| {
            if let Some(data) = s.resolved.get_mut(lw) {
                data.insert(dw);
            }
        })
    }

    pub fn add_resolved_set(&self, lw: &LocalWrapper, set: &BTreeSet<DataWrapper>) -> MinerResult<()> {
        self.with_state(|s| {
            if let Some(data) = s.resolved.get_mut(lw) {
                data.extend(set.iter().cloned());
            }
        })
    }

    /// Values accumulated so far for a local.
    pub fn resolved_data(&self, lw: &LocalWrapper) -> MinerResult<Option<BTreeSet<DataWrapper>>> {
        self.with_state(|s| s.resolved.get(lw).cloned())
    }

    /// Normalizes the accumulated values of every local.
    ///
    /// A set mixing ALL or NO with primitive constants only becomes `{ALL}`.
    /// Otherwise NULL is dropped from sets that hold something else.
    /// Binder invocations are then replaced by the entry points they reach.
    pub fn finalize_results(&self, accessor: &dyn DataAccessor) -> MinerResult<()> {
        self.with_state(|s| {
            for data in s.resolved.values_mut() {
                let has_all = data
                    .iter()
                    .any(|dw| dw.is_all_value_constant() || dw.is_no_value_constant());
                let all_other_numbers = data.iter().all(|dw| {
                    dw.is_all_value_constant()
                        || dw.is_no_value_constant()
                        || dw.is_primitive_constant()
                });
                let has_null = data.iter().any(DataWrapper::is_null_constant);
                let others_besides_null = data.iter().any(|dw| !dw.is_null_constant());
                if has_all && all_other_numbers {
                    *data = BTreeSet::from([DataWrapper::All]);
                } else if has_null && others_besides_null {
                    data.retain(|dw| !dw.is_null_constant());
                }
                *data = data
                    .iter()
                    .flat_map(|dw| replace_binder_invokes_with_eps(dw, accessor))
                    .collect();
            }
        })
    }

    /// Pairs compared at a start node, simplified. Clears the node.
    pub fn resolved_strings_for_start_nodes(
        &self,
        accessor: &dyn DataAccessor,
    ) -> MinerResult<Vec<ValuePair>> {
        let state = self.take_state()?;
        let node = self.node;
        if !node.is_start() {
            return Err(self.shape_error("start node values requested for an inner node"));
        }
        debug!("getting start node strings for '{}'", node);

        let slots = self.used_slots(&state)?;
        let pairs: Vec<ValuePair> = match node.kind() {
            NodeKind::InvokeStart { .. } | NodeKind::FieldStart { .. } => {
                if slots.is_empty() {
                    let dw = DataWrapper::from_value(Some(node.identifier()), None, &self.node_type()?)?;
                    vec![ValuePair::from_node(dw, None, node)]
                } else {
                    let groups = self.substitution_groups(&state, &slots)?;
                    self.perform_substitution(&slots, &groups)?
                        .into_iter()
                        .map(|dw| ValuePair::from_node(dw, None, node))
                        .collect()
                }
            }
            NodeKind::IfStart => {
                if slots.len() != 2 {
                    return Err(self.shape_error(format!(
                        "if statement with {} substitution slots instead of 2",
                        slots.len()
                    )));
                }
                let groups = self.substitution_groups(&state, &slots)?;
                if groups.is_empty() {
                    vec![ValuePair::from_node(DataWrapper::No, Some(DataWrapper::No), node)]
                } else {
                    groups
                        .into_iter()
                        .map(|group| match <[DataWrapper; 2]>::try_from(group) {
                            Ok([a, b]) => Ok(ValuePair::from_node(a, Some(b), node)),
                            Err(group) => Err(self.group_size_error(2, group.len())),
                        })
                        .collect::<MinerResult<_>>()?
                }
            }
            NodeKind::SwitchStart { cases, .. } => {
                if slots.len() != 1 {
                    return Err(self.shape_error(format!(
                        "switch statement with {} substitution slots instead of 1",
                        slots.len()
                    )));
                }
                let groups = self.substitution_groups(&state, &slots)?;
                let keys: Vec<ValuePair> = if groups.is_empty() {
                    vec![ValuePair::from_node(DataWrapper::No, None, node)]
                } else {
                    groups
                        .into_iter()
                        .map(|group| match <[DataWrapper; 1]>::try_from(group) {
                            Ok([a]) => Ok(ValuePair::from_node(a, None, node)),
                            Err(group) => Err(self.group_size_error(1, group.len())),
                        })
                        .collect::<MinerResult<_>>()?
                };
                let mut res = Vec::with_capacity(keys.len() * cases.len());
                for key in &keys {
                    for case in cases.iter().flatten() {
                        let label = DataWrapper::Primitive(PrimitiveConstant::Int(*case));
                        res.push(ValuePair::derived(
                            key.op1().cloned().unwrap_or(DataWrapper::No),
                            Some(label),
                            key,
                        ));
                    }
                }
                res
            }
            NodeKind::Inner => return Err(MinerError::UnsupportedStartNode(self.id())),
        };

        let pairs = simplify_pairs(replace_binder_invokes(pairs, accessor))?;
        debug!("start node strings for '{}':", node);
        for pair in &pairs {
            debug!("    value pair '{}'", pair);
        }
        Ok(pairs)
    }

    /// Values the node may take. Clears the node.
    pub fn resolved_strings(&self, ep: &EntryPoint) -> MinerResult<BTreeSet<DataWrapper>> {
        let state = self.take_state()?;
        let node = self.node;
        if node.is_start() {
            return Err(self.shape_error("inner node values requested for a start node"));
        }
        debug!("getting resolved strings for '{}'", node);

        if let Some(method) = node.invoked_method() {
            if is_untrackable(method) {
                debug!(
                    "resolved string is ALL because '{}' is an ignored class",
                    method.declaring_class()
                );
                return Ok(BTreeSet::from([DataWrapper::All]));
            }
        }

        let slots = self.used_slots(&state)?;
        if slots.is_empty() {
            let value = node
                .value()
                .ok_or_else(|| MinerError::UnresolvableType(self.id()))?;
            let captured = self.sub_capture && ep.entry_point() == node.source();
            let dw = if value.is_parameter_ref() && !captured {
                DataWrapper::All
            } else {
                DataWrapper::from_value(Some(node.identifier()), Some(value), &value.ty())?
            };
            debug!("resolved string is leaf node '{}'", dw);
            return Ok(BTreeSet::from([dw]));
        }

        let groups = self.substitution_groups(&state, &slots)?;
        for group in &groups {
            trace!("    group {:?}", group);
        }
        let res = self.perform_substitution(&slots, &groups)?;
        for dw in &res {
            trace!("    resolved string '{}'", dw);
        }
        Ok(res)
    }

    fn shape_error<S: Into<String>>(&self, reason: S) -> MinerError {
        MinerError::Shape {
            node: self.id(),
            reason: reason.into(),
        }
    }

    fn group_size_error(&self, expected: usize, found: usize) -> MinerError {
        self.shape_error(format!(
            "substitution group of size {found} instead of {expected} for '{}'",
            self.node
        ))
    }

    /// Locals and inline constants of the identifier, in order.
    fn used_slots(&self, state: &State) -> MinerResult<Vec<UsedSlot>> {
        let mut res = Vec::new();
        for (position, part) in self.node.identifier().iter().enumerate() {
            match part {
                Part::Local { local } => res.push(UsedSlot {
                    position,
                    slot: Slot::Local(local.clone()),
                }),
                Part::Constant { value } => {
                    let inline = state
                        .inline_constants
                        .values()
                        .find(|leaf| leaf.index() == position && leaf.value() == value);
                    if let Some(leaf) = inline {
                        res.push(UsedSlot {
                            position,
                            slot: Slot::Inline(leaf.value().clone()),
                        });
                    }
                }
                Part::RawLocal { name } => {
                    return Err(self.shape_error(format!("untracked local '{name}'")))
                }
                _ => (),
            }
        }
        Ok(res)
    }

    /// Cartesian product of the possible values of every slot.
    ///
    /// A local without any value takes the NO value.
    fn substitution_groups(&self, state: &State, slots: &[UsedSlot]) -> MinerResult<SubstitutionGroups> {
        let mut choices = Vec::with_capacity(slots.len());
        let mut nb_groups: usize = 1;
        for used in slots {
            let values: Vec<DataWrapper> = match &used.slot {
                Slot::Local(lw) => match state.resolved.get(lw) {
                    Some(data) if !data.is_empty() => data.iter().cloned().collect(),
                    _ => vec![DataWrapper::No],
                },
                Slot::Inline(c) => vec![DataWrapper::from_constant(c, &c.ty())?],
            };
            nb_groups = nb_groups
                .checked_mul(values.len())
                .ok_or_else(|| MinerError::Overflow(self.id()))?;
            choices.push(values);
        }

        let mut groups: Vec<Vec<DataWrapper>> = Vec::with_capacity(nb_groups);
        groups.push(Vec::with_capacity(slots.len()));
        for values in &choices {
            groups = groups
                .into_iter()
                .flat_map(|group| {
                    values.iter().map(move |dw| {
                        let mut next = group.clone();
                        next.push(dw.clone());
                        next
                    })
                })
                .collect();
        }
        Ok(groups.into_iter().collect())
    }

    /// Identifier of the node with each slot replaced by the group value.
    fn substitute(&self, slots: &[UsedSlot], group: &[DataWrapper]) -> Identifier {
        let mut id = self.node.identifier().clone();
        for (used, dw) in slots.iter().zip(group) {
            id.set(used.position, Part::data(dw.clone()));
        }
        id
    }

    fn parent_type(&self) -> MinerResult<&Type> {
        self.parent_local
            .as_ref()
            .map(LocalWrapper::ty)
            .ok_or_else(|| self.shape_error("arithmetic node without a parent local"))
    }

    /// Type of the node value, or of the predicate for start nodes.
    fn node_type(&self) -> MinerResult<Type> {
        if let Some(value) = self.node.value() {
            return Ok(value.ty());
        }
        match self.node.kind() {
            NodeKind::InvokeStart { target } => Ok(target.return_type().clone()),
            NodeKind::FieldStart { field } => Ok(field.ty().clone()),
            NodeKind::IfStart => Ok(Type::Boolean),
            NodeKind::SwitchStart { key_type, .. } => Ok(key_type.clone()),
            NodeKind::Inner => Err(MinerError::UnresolvableType(self.id())),
        }
    }

    fn perform_substitution(
        &self,
        slots: &[UsedSlot],
        groups: &SubstitutionGroups,
    ) -> MinerResult<BTreeSet<DataWrapper>> {
        let mut res = BTreeSet::new();
        match Shape::of(self.node.value()) {
            Shape::Binop(op) => {
                let ty = self.parent_type()?;
                for group in groups {
                    match group.as_slice() {
                        [a, b] => res.insert(DataWrapper::from_binop(a, b, ty, op)?),
                        other => return Err(self.group_size_error(2, other.len())),
                    };
                }
            }
            Shape::Neg => {
                let ty = self.parent_type()?;
                for group in groups {
                    match group.as_slice() {
                        [a] => res.insert(DataWrapper::from_neg(a, ty)?),
                        other => return Err(self.group_size_error(1, other.len())),
                    };
                }
            }
            Shape::Opaque => {
                res.insert(DataWrapper::All);
            }
            Shape::Cast => {
                for group in groups {
                    match group.as_slice() {
                        [a] => res.insert(a.clone()),
                        other => return Err(self.group_size_error(1, other.len())),
                    };
                }
            }
            Shape::ArrayRef(ty) => {
                for group in groups {
                    match group.as_slice() {
                        [a, _] if a.is_all_value_constant() || a.is_no_value_constant() => {
                            res.insert(a.clone())
                        }
                        [_, _] => {
                            let id = self.substitute(slots, group);
                            res.insert(DataWrapper::from_value(Some(&id), None, ty)?)
                        }
                        other => return Err(self.group_size_error(2, other.len())),
                    };
                }
            }
            Shape::Default => {
                let ty = self.node_type()?;
                for group in groups {
                    let id = self.substitute(slots, group);
                    res.insert(DataWrapper::from_value(Some(&id), None, &ty)?);
                }
            }
        }

        if res.len() > 1 {
            let has_all = res
                .iter()
                .any(|dw| dw.is_all_value_constant() || dw.is_no_value_constant());
            let all_prim = res.iter().all(|dw| {
                dw.is_all_value_constant() || dw.is_no_value_constant() || dw.is_primitive_constant()
            });
            if has_all && all_prim {
                return Ok(BTreeSet::from([DataWrapper::All]));
            }
        }
        Ok(res)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutils::{local, local_part, GraphBuilder};
    use am_ir::entrypoints::BinderMap;
    use am_ir::graph::DefUseGraph;
    use am_ir::methods::{FieldRef, MethodRef};
    use am_ir::nodes::InlineConstantLeafNode;

    fn int(v: i32) -> DataWrapper {
        DataWrapper::Primitive(PrimitiveConstant::Int(v))
    }

    fn data_node<'g>(graph: &'g DefUseGraph, id: NodeId, parent: Option<LocalWrapper>) -> DataNode<'g> {
        DataNode::new(
            graph.node(id).unwrap(),
            parent,
            &graph.children_by_local(id).unwrap(),
            graph.inline_constants(id).unwrap(),
            false,
        )
    }

    #[test]
    fn count_reaches_total() {
        let mut b = GraphBuilder::new();
        let x = local(0, "$i0", Type::Int);
        let y = local(1, "$i1", Type::Int);
        let sn = b.if_start(local_part(&x), local_part(&y));
        let c1 = b.constant(Constant::Int(1));
        let c2 = b.constant(Constant::Int(2));
        let c3 = b.constant(Constant::Int(3));
        b.edge(sn, &x, c1);
        b.edge(sn, &x, c2);
        b.edge(sn, &y, c3);
        let graph = b.build();

        let dn = data_node(&graph, sn, None);
        assert!(!dn.children_finished().unwrap());
        assert!(!dn.inc_count().unwrap());
        assert!(!dn.inc_count().unwrap());
        assert!(dn.inc_count().unwrap());
        assert!(dn.children_finished().unwrap());
    }

    #[test]
    fn accumulation_ignores_unknown_locals() {
        let mut b = GraphBuilder::new();
        let x = local(0, "$i0", Type::Int);
        let sn = b.switch_start(local_part(&x), Type::Int, vec![Some(1)]);
        let graph = b.build();
        let dn = data_node(&graph, sn, None);
        dn.add_resolved_data(&x, DataWrapper::No).unwrap();
        dn.add_resolved_data(&local(9, "$z", Type::Int), int(3)).unwrap();
        assert_eq!(dn.resolved_data(&x).unwrap(), Some(BTreeSet::from([DataWrapper::No])));
        assert_eq!(dn.resolved_data(&local(9, "$z", Type::Int)).unwrap(), None);
    }

    #[test]
    fn collapse_law() {
        let mut b = GraphBuilder::new();
        let x = local(0, "$i0", Type::Int);
        let sn = b.switch_start(local_part(&x), Type::Int, vec![]);
        let graph = b.build();
        for sentinel in [DataWrapper::All, DataWrapper::No] {
            let dn = data_node(&graph, sn, None);
            dn.add_resolved_set(&x, &BTreeSet::from([sentinel, int(1), int(2), int(3)]))
                .unwrap();
            dn.finalize_results(&BinderMap::new()).unwrap();
            assert_eq!(dn.resolved_data(&x).unwrap(), Some(BTreeSet::from([DataWrapper::All])));
        }
    }

    #[test]
    fn null_suppression_law() {
        let mut b = GraphBuilder::new();
        let s = local(0, "$r0", Type::string());
        let sn = b.switch_start(local_part(&s), Type::Int, vec![]);
        let graph = b.build();

        let dn = data_node(&graph, sn, None);
        let perm = DataWrapper::Str("perm".into());
        dn.add_resolved_set(&s, &BTreeSet::from([DataWrapper::Null, perm.clone()]))
            .unwrap();
        dn.finalize_results(&BinderMap::new()).unwrap();
        assert_eq!(dn.resolved_data(&s).unwrap(), Some(BTreeSet::from([perm])));

        let dn = data_node(&graph, sn, None);
        dn.add_resolved_data(&s, DataWrapper::Null).unwrap();
        dn.finalize_results(&BinderMap::new()).unwrap();
        assert_eq!(dn.resolved_data(&s).unwrap(), Some(BTreeSet::from([DataWrapper::Null])));
    }

    #[test]
    fn finalize_replaces_binder_invokes() {
        let mut b = GraphBuilder::new();
        let x = local(0, "$z0", Type::Boolean);
        let sn = b.switch_start(local_part(&x), Type::Boolean, vec![]);
        let graph = b.build();
        let proxy = MethodRef::new("a.IFoo$Stub$Proxy", "check", Type::Boolean, vec![]);
        let service = MethodRef::new("a.FooService", "check", Type::Boolean, vec![]);
        let mut binder = BinderMap::new();
        binder.insert(proxy.clone(), service.clone());

        let dn = data_node(&graph, sn, None);
        let call = DataWrapper::variable(
            Identifier::new(vec![Part::MethodRef { method: proxy }]),
            Type::Boolean,
        );
        dn.add_resolved_data(&x, call).unwrap();
        dn.finalize_results(&binder).unwrap();
        let expected = DataWrapper::variable(
            Identifier::new(vec![Part::MethodRef { method: service }]),
            Type::Boolean,
        );
        assert_eq!(dn.resolved_data(&x).unwrap(), Some(BTreeSet::from([expected])));
    }

    #[test]
    fn cleared_node_access_fails() {
        let mut b = GraphBuilder::new();
        let c = b.constant(Constant::Int(4));
        let graph = b.build();
        let dn = data_node(&graph, c, Some(local(0, "$i0", Type::Int)));
        let res = dn.resolved_strings(&GraphBuilder::new().entry_point()).unwrap();
        assert_eq!(res, BTreeSet::from([int(4)]));
        assert!(matches!(dn.inc_count(), Err(MinerError::ClearedNode(_))));
        assert!(matches!(
            dn.resolved_strings(&GraphBuilder::new().entry_point()),
            Err(MinerError::ClearedNode(_))
        ));
    }

    #[test]
    fn binop_substitution_folds_and_collapses() {
        let mut b = GraphBuilder::new();
        let x = local(0, "$i0", Type::Int);
        let y = local(1, "$i1", Type::Int);
        let add = b.inner(
            vec![local_part(&x), Part::literal(" + "), local_part(&y)],
            Value::Binop {
                op: BinopKind::Add,
                ty: Type::Int,
            },
        );
        let graph = b.build();
        let ep = GraphBuilder::new().entry_point();

        let dn = data_node(&graph, add, Some(local(2, "$i2", Type::Int)));
        dn.add_resolved_set(&x, &BTreeSet::from([int(1), int(2)])).unwrap();
        dn.add_resolved_data(&y, int(10)).unwrap();
        assert_eq!(dn.resolved_strings(&ep).unwrap(), BTreeSet::from([int(11), int(12)]));

        let dn = data_node(&graph, add, Some(local(2, "$i2", Type::Int)));
        dn.add_resolved_set(&x, &BTreeSet::from([int(1), DataWrapper::All])).unwrap();
        dn.add_resolved_data(&y, int(10)).unwrap();
        assert_eq!(dn.resolved_strings(&ep).unwrap(), BTreeSet::from([DataWrapper::All]));
    }

    #[test]
    fn binop_without_parent_is_a_shape_error() {
        let mut b = GraphBuilder::new();
        let x = local(0, "$i0", Type::Int);
        let neg = b.inner(vec![Part::literal("-"), local_part(&x)], Value::Neg { ty: Type::Int });
        let graph = b.build();
        let dn = data_node(&graph, neg, None);
        dn.add_resolved_data(&x, int(3)).unwrap();
        assert!(matches!(
            dn.resolved_strings(&GraphBuilder::new().entry_point()),
            Err(MinerError::Shape { .. })
        ));
    }

    #[test]
    fn opaque_and_cast_values() {
        let mut b = GraphBuilder::new();
        let r = local(0, "$r0", Type::string());
        let len = b.inner(vec![Part::literal("lengthof "), local_part(&r)], Value::Length);
        let cast = b.inner(
            vec![Part::literal("(java.lang.String) "), local_part(&r)],
            Value::Cast { ty: Type::string() },
        );
        let graph = b.build();
        let ep = GraphBuilder::new().entry_point();
        let s = DataWrapper::Str("x".into());

        let dn = data_node(&graph, len, Some(local(1, "$i0", Type::Int)));
        dn.add_resolved_data(&r, s.clone()).unwrap();
        assert_eq!(dn.resolved_strings(&ep).unwrap(), BTreeSet::from([DataWrapper::All]));

        let dn = data_node(&graph, cast, Some(local(1, "$r1", Type::string())));
        dn.add_resolved_data(&r, s.clone()).unwrap();
        assert_eq!(dn.resolved_strings(&ep).unwrap(), BTreeSet::from([s]));
    }

    #[test]
    fn array_ref_substitution() {
        let mut b = GraphBuilder::new();
        let arr = local(0, "$r0", Type::array_of(Type::Int, 1));
        let idx = local(1, "$i0", Type::Int);
        let node = b.inner(
            vec![local_part(&arr), Part::literal("["), local_part(&idx), Part::literal("]")],
            Value::ArrayRef { ty: Type::Int },
        );
        let graph = b.build();
        let ep = GraphBuilder::new().entry_point();
        let field = DataWrapper::variable(
            Identifier::new(vec![Part::FieldRef {
                field: FieldRef::new("a.Foo", "UIDS", Type::array_of(Type::Int, 1)),
            }]),
            Type::array_of(Type::Int, 1),
        );

        let dn = data_node(&graph, node, Some(local(2, "$i1", Type::Int)));
        dn.add_resolved_data(&arr, field).unwrap();
        dn.add_resolved_data(&idx, int(0)).unwrap();
        let res = dn.resolved_strings(&ep).unwrap();
        let text: Vec<String> = res.iter().map(ToString::to_string).collect();
        assert_eq!(text, vec!["<a.Foo: int[] UIDS>[0]"]);

        let dn = data_node(&graph, node, Some(local(2, "$i1", Type::Int)));
        dn.add_resolved_data(&arr, DataWrapper::All).unwrap();
        dn.add_resolved_data(&idx, int(0)).unwrap();
        assert_eq!(dn.resolved_strings(&ep).unwrap(), BTreeSet::from([DataWrapper::All]));
    }

    #[test]
    fn parameters_are_all_unless_captured() {
        let mut b = GraphBuilder::new();
        let p = b.inner(
            vec![Part::literal("@parameter0: int")],
            Value::ParameterRef {
                index: 0,
                ty: Type::Int,
            },
        );
        let graph = b.build();
        let ep = GraphBuilder::new().entry_point();
        let lw = Some(local(0, "$i0", Type::Int));
        let dn = data_node(&graph, p, lw.clone());
        assert_eq!(dn.resolved_strings(&ep).unwrap(), BTreeSet::from([DataWrapper::All]));

        let node = graph.node(p).unwrap();
        let dn = DataNode::new(node, lw, &BTreeMap::new(), InlineConstants::new(), true);
        let res = dn.resolved_strings(&ep).unwrap();
        assert_eq!(res.iter().next().unwrap().to_string(), "@parameter0: int");
    }

    #[test]
    fn bundle_invokes_are_all() {
        let mut b = GraphBuilder::new();
        let bundle = local(0, "$r0", Type::class("android.os.Bundle"));
        let get = MethodRef::new("android.os.Bundle", "getInt", Type::Int, vec![Type::string()]);
        let call = b.inner(
            vec![
                local_part(&bundle),
                Part::literal("."),
                Part::MethodRef { method: get.clone() },
                Part::literal("(\"uid\")"),
            ],
            Value::Invoke { method: get },
        );
        let graph = b.build();
        let dn = data_node(&graph, call, Some(local(1, "$i0", Type::Int)));
        assert_eq!(
            dn.resolved_strings(&GraphBuilder::new().entry_point()).unwrap(),
            BTreeSet::from([DataWrapper::All])
        );
    }

    #[test]
    fn inline_constants_are_substituted() {
        let mut b = GraphBuilder::new();
        let x = local(0, "$i0", Type::Int);
        let sn = b.if_start(local_part(&x), Part::Constant { value: Constant::Int(1000) });
        b.inline(sn, 0, InlineConstantLeafNode::new(2, Constant::Int(1000)));
        let graph = b.build();
        let dn = data_node(&graph, sn, None);
        let uid = DataWrapper::variable(
            Identifier::new(vec![Part::literal("getCallingUid()")]),
            Type::Int,
        );
        dn.add_resolved_data(&x, uid.clone()).unwrap();
        let res = dn.resolved_strings_for_start_nodes(&BinderMap::new()).unwrap();
        assert_eq!(res, vec![ValuePair::new(uid, Some(int(1000)))]);
    }

    #[test]
    fn switch_explosion() {
        let mut b = GraphBuilder::new();
        let x = local(0, "$i0", Type::Int);
        let sn = b.switch_start(local_part(&x), Type::Int, vec![Some(1), None, Some(2)]);
        let graph = b.build();
        let dn = data_node(&graph, sn, None);
        let g1 = DataWrapper::variable(Identifier::new(vec![Part::literal("a()")]), Type::Int);
        let g2 = DataWrapper::variable(Identifier::new(vec![Part::literal("b()")]), Type::Int);
        dn.add_resolved_set(&x, &BTreeSet::from([g1.clone(), g2.clone()])).unwrap();
        let mut res = dn.resolved_strings_for_start_nodes(&BinderMap::new()).unwrap();
        res.sort();
        let mut expected = vec![
            ValuePair::new(g1.clone(), Some(int(1))),
            ValuePair::new(g1, Some(int(2))),
            ValuePair::new(g2.clone(), Some(int(1))),
            ValuePair::new(g2, Some(int(2))),
        ];
        expected.sort();
        assert_eq!(res, expected);
        assert!(res.iter().all(|vp| !vp.sources().is_empty()));
    }

    #[test]
    fn if_with_three_slots_is_rejected() {
        let parts = ["$i0", "$i1", "$i2"]
            .iter()
            .enumerate()
            .map(|(i, name)| local_part(&local(i as u32, *name, Type::Int)))
            .collect();
        let b = GraphBuilder::new();
        let odd = Node::new(
            NodeId(1),
            NodeKind::IfStart,
            Identifier::new(parts),
            None,
            b.source(),
            am_ir::nodes::Stmt::new(0, "if odd"),
        );
        let dn = DataNode::new(&odd, None, &BTreeMap::new(), InlineConstants::new(), false);
        assert!(matches!(
            dn.resolved_strings_for_start_nodes(&BinderMap::new()),
            Err(MinerError::Shape { .. })
        ));
    }

    #[test]
    fn invoke_start_without_operands() {
        let mut b = GraphBuilder::new();
        let target = MethodRef::new("android.os.Build", "isDebuggable", Type::Boolean, vec![]);
        let sn = b.invoke_start(target, vec![]);
        let graph = b.build();
        let dn = data_node(&graph, sn, None);
        let res = dn.resolved_strings_for_start_nodes(&BinderMap::new()).unwrap();
        assert_eq!(res.len(), 1);
        assert_eq!(res[0].size(), 1);
        assert_eq!(res[0].to_string(), "`<android.os.Build: boolean isDebuggable()>()`");
    }

    #[test]
    fn overflowing_groups_are_reported() {
        let mut b = GraphBuilder::new();
        let locals: Vec<LocalWrapper> = (0..8).map(|i| local(i, format!("$i{i}"), Type::Int)).collect();
        let mut parts = Vec::new();
        for lw in &locals {
            parts.push(local_part(lw));
            parts.push(Part::literal(","));
        }
        let sn = b.invoke_start(MethodRef::new("a.B", "f", Type::Boolean, vec![]), parts);
        let graph = b.build();
        let dn = data_node(&graph, sn, None);
        let wide: BTreeSet<DataWrapper> = (0..1 << 9).map(int).collect();
        for lw in &locals {
            dn.add_resolved_set(lw, &wide).unwrap();
        }
        let state = dn.take_state().unwrap();
        let slots = dn.used_slots(&state).unwrap();
        assert!(matches!(
            dn.substitution_groups(&state, &slots),
            Err(MinerError::Overflow(_))
        ));
    }
}
