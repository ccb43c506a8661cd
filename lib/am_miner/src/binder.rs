//! Replacement of binder invocations by the entry points they reach.

use crate::value_pair::ValuePair;
use am_ir::data::DataWrapper;
use am_ir::entrypoints::DataAccessor;
use am_ir::identifier::Part;

/// One clone of `dw` per entry point reachable from the first method
/// referenced by its identifier, or `dw` itself when that method is not a
/// binder invocation.
#[must_use]
pub fn replace_binder_invokes_with_eps(dw: &DataWrapper, accessor: &dyn DataAccessor) -> Vec<DataWrapper> {
    let Some((index, method)) = dw.identifier().and_then(|id| id.first_method_ref()) else {
        return vec![dw.clone()];
    };
    let eps = accessor.entry_points_from_binder_method(method);
    if eps.is_empty() {
        return vec![dw.clone()];
    }
    eps.into_iter()
        .map(|ep| {
            let mut res = dw.clone();
            if let Some(id) = res.identifier_mut() {
                id.set(index, Part::MethodRef { method: ep });
            }
            res
        })
        .collect()
}

/// Applies [`replace_binder_invokes_with_eps`] to every operand, the
/// derived pairs keep the provenance of the original one.
#[must_use]
pub fn replace_binder_invokes(pairs: Vec<ValuePair>, accessor: &dyn DataAccessor) -> Vec<ValuePair> {
    let mut res = Vec::with_capacity(pairs.len());
    for pair in pairs {
        match (pair.op1(), pair.op2()) {
            (Some(op), None) | (None, Some(op)) => {
                for a in replace_binder_invokes_with_eps(op, accessor) {
                    res.push(ValuePair::derived(a, None, &pair));
                }
            }
            (Some(op1), Some(op2)) => {
                let op2s = replace_binder_invokes_with_eps(op2, accessor);
                for a in replace_binder_invokes_with_eps(op1, accessor) {
                    for b in &op2s {
                        res.push(ValuePair::derived(a.clone(), Some(b.clone()), &pair));
                    }
                }
            }
            (None, None) => res.push(pair),
        }
    }
    res
}

#[cfg(test)]
mod tests {
    use super::*;
    use am_ir::entrypoints::BinderMap;
    use am_ir::identifier::Identifier;
    use am_ir::methods::MethodRef;
    use am_ir::types::Type;

    fn proxy() -> MethodRef {
        MethodRef::new("a.IFoo$Stub$Proxy", "isAllowed", Type::Boolean, vec![])
    }

    fn call(method: MethodRef) -> DataWrapper {
        DataWrapper::variable(
            Identifier::new(vec![Part::MethodRef { method }, Part::literal("()")]),
            Type::Boolean,
        )
    }

    fn binder() -> BinderMap {
        let mut map = BinderMap::new();
        map.insert(proxy(), MethodRef::new("a.FooService", "isAllowed", Type::Boolean, vec![]));
        map.insert(proxy(), MethodRef::new("a.FooService2", "isAllowed", Type::Boolean, vec![]));
        map
    }

    #[test]
    fn binder_call_expands_to_entry_points() {
        let res = replace_binder_invokes_with_eps(&call(proxy()), &binder());
        let text: Vec<String> = res.iter().map(ToString::to_string).collect();
        assert_eq!(
            text,
            vec![
                "<a.FooService: boolean isAllowed()>()",
                "<a.FooService2: boolean isAllowed()>()"
            ]
        );
    }

    #[test]
    fn other_values_pass_through() {
        let other = call(MethodRef::new("a.Bar", "f", Type::Boolean, vec![]));
        assert_eq!(replace_binder_invokes_with_eps(&other, &binder()), vec![other.clone()]);
        assert_eq!(
            replace_binder_invokes_with_eps(&DataWrapper::All, &binder()),
            vec![DataWrapper::All]
        );
    }

    #[test]
    fn pairs_take_the_cross_product() {
        let pair = ValuePair::new(call(proxy()), Some(call(proxy())));
        let res = replace_binder_invokes(vec![pair], &binder());
        assert_eq!(res.len(), 4);
        let single = ValuePair::new(call(proxy()), None);
        assert_eq!(replace_binder_invokes(vec![single], &binder()).len(), 2);
    }
}
