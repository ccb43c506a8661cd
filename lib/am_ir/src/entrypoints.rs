//! Entry points being mined and binder method resolution.

use crate::methods::MethodRef;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// A method of a system service stub reachable from other processes.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EntryPoint {
    stub: String,
    entry_point: MethodRef,
}

impl EntryPoint {
    #[must_use]
    pub fn new<S: Into<String>>(stub: S, entry_point: MethodRef) -> Self {
        Self {
            stub: stub.into(),
            entry_point,
        }
    }

    /// Fully-qualified name of the binder stub class.
    #[inline]
    #[must_use]
    pub fn stub(&self) -> &str {
        &self.stub
    }

    #[inline]
    #[must_use]
    pub const fn entry_point(&self) -> &MethodRef {
        &self.entry_point
    }
}

impl fmt::Display for EntryPoint {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{{{} : {}}}", self.stub, self.entry_point)
    }
}

/// Lookups the miner needs from the rest of the analysis.
pub trait DataAccessor: Send + Sync {
    /// Entry points that may execute when the given binder method is invoked.
    /// An empty set means the method is not a binder invocation.
    fn entry_points_from_binder_method(&self, method: &MethodRef) -> BTreeSet<MethodRef>;
}

/// Binder method to entry points table.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BinderMap {
    inner: BTreeMap<MethodRef, BTreeSet<MethodRef>>,
}

impl BinderMap {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, binder_method: MethodRef, entry_point: MethodRef) {
        self.inner
            .entry(binder_method)
            .or_default()
            .insert(entry_point);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

impl DataAccessor for BinderMap {
    fn entry_points_from_binder_method(&self, method: &MethodRef) -> BTreeSet<MethodRef> {
        self.inner.get(method).cloned().unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Type;

    #[test]
    fn binder_lookup() {
        let proxy = MethodRef::new("a.IFoo$Stub$Proxy", "foo", Type::Int, vec![]);
        let ep = MethodRef::new("a.FooService", "foo", Type::Int, vec![]);
        let mut map = BinderMap::new();
        map.insert(proxy.clone(), ep.clone());
        assert_eq!(map.len(), 1);
        assert_eq!(
            map.entry_points_from_binder_method(&proxy),
            BTreeSet::from([ep.clone()])
        );
        assert!(map.entry_points_from_binder_method(&ep).is_empty());
    }
}
