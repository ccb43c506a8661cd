use crate::value_pair::ValuePair;
use std::collections::HashMap;

/// Insertion-ordered set of pairs.
///
/// Adding a pair equal to a stored one merges its sources into the
/// stored pair.
#[derive(Debug, Clone, Default)]
pub struct ValuePairSet {
    pairs: Vec<ValuePair>,
    positions: HashMap<ValuePair, usize>,
}

impl ValuePairSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true if no equal pair was stored yet.
    pub fn insert(&mut self, pair: ValuePair) -> bool {
        if let Some(&pos) = self.positions.get(&pair) {
            self.pairs[pos].add_sources(pair.sources());
            false
        } else {
            self.positions.insert(pair.clone(), self.pairs.len());
            self.pairs.push(pair);
            true
        }
    }

    #[must_use]
    pub fn get(&self, pair: &ValuePair) -> Option<&ValuePair> {
        self.positions.get(pair).map(|&pos| &self.pairs[pos])
    }

    #[must_use]
    pub fn contains(&self, pair: &ValuePair) -> bool {
        self.positions.contains_key(pair)
    }

    #[must_use]
    pub fn first(&self) -> Option<&ValuePair> {
        self.pairs.first()
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ValuePair> {
        self.pairs.iter()
    }

    #[must_use]
    pub fn into_sorted_vec(self) -> Vec<ValuePair> {
        let mut res = self.pairs;
        res.sort();
        res
    }
}

impl Extend<ValuePair> for ValuePairSet {
    fn extend<I: IntoIterator<Item = ValuePair>>(&mut self, iter: I) {
        for pair in iter {
            self.insert(pair);
        }
    }
}

impl FromIterator<ValuePair> for ValuePairSet {
    fn from_iter<I: IntoIterator<Item = ValuePair>>(iter: I) -> Self {
        let mut res = Self::new();
        res.extend(iter);
        res
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use am_ir::data::DataWrapper;
    use am_ir::identifier::{Identifier, Part};
    use am_ir::methods::MethodRef;
    use am_ir::nodes::Stmt;
    use am_ir::types::Type;

    fn var(name: &str) -> DataWrapper {
        DataWrapper::variable(Identifier::new(vec![Part::literal(name)]), Type::Int)
    }

    fn sourced(op1: DataWrapper, op2: DataWrapper, stmt: &str) -> ValuePair {
        let mut vp = ValuePair::new(op1, Some(op2));
        vp.add_source(
            &MethodRef::new("a.B", "f", Type::Void, vec![]),
            stmt.to_string(),
            &Stmt::new(0, stmt),
        );
        vp
    }

    #[test]
    fn equal_pairs_merge_sources() {
        let mut set = ValuePairSet::new();
        assert!(set.insert(sourced(var("a"), var("b"), "s1")));
        assert!(!set.insert(sourced(var("b"), var("a"), "s2")));
        assert_eq!(set.len(), 1);
        let stored = set.first().unwrap();
        assert_eq!(stored.sources().values().next().unwrap().len(), 2);
        assert!(set.contains(&ValuePair::new(var("a"), Some(var("b")))));
    }

    #[test]
    fn insertion_order_and_sorting() {
        let set: ValuePairSet = vec![
            ValuePair::new(var("z"), Some(var("y"))),
            ValuePair::new(var("c"), None),
        ]
        .into_iter()
        .collect();
        assert_eq!(set.first().unwrap().size(), 2);
        let sorted = set.into_sorted_vec();
        assert_eq!(sorted[0].size(), 1);
    }
}
