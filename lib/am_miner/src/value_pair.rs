//! Unordered pairs of values observed at a decision point.

use crate::errors::{MinerError, MinerResult};
use am_ir::data::DataWrapper;
use am_ir::methods::MethodRef;
use am_ir::nodes::{Node, Stmt};
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;
use std::hash::{Hash, Hasher};

/// Quoting character of the textual pair form.
pub const QUOTE: char = '`';

/// Provenance of a pair: source method, then node text, then statement.
pub type Sources = BTreeMap<MethodRef, BTreeMap<String, Stmt>>;

/// Zero, one or two operands compared at a decision point, and the
/// statements they were observed at.
///
/// Equality, hashing and ordering only consider the operands, and do not
/// depend on their order: `{a, b} == {b, a}`.
#[derive(Debug, Clone, Default)]
pub struct ValuePair {
    op1: Option<DataWrapper>,
    op2: Option<DataWrapper>,
    sources: Sources,
}

impl ValuePair {
    #[must_use]
    pub fn new(op1: DataWrapper, op2: Option<DataWrapper>) -> Self {
        Self {
            op1: Some(op1),
            op2,
            sources: Sources::new(),
        }
    }

    /// Pair observed at the given node.
    #[must_use]
    pub fn from_node(op1: DataWrapper, op2: Option<DataWrapper>, node: &Node) -> Self {
        let mut vp = Self::new(op1, op2);
        vp.add_source(node.source(), node.to_string(), node.stmt());
        vp
    }

    /// Pair with new operands and the provenance of `cur`.
    #[must_use]
    pub fn derived(op1: DataWrapper, op2: Option<DataWrapper>, cur: &Self) -> Self {
        let mut vp = Self::new(op1, op2);
        vp.add_sources(&cur.sources);
        vp
    }

    pub fn push_operand(&mut self, dw: DataWrapper) -> MinerResult<()> {
        if self.op1.is_none() {
            self.op1 = Some(dw);
        } else if self.op2.is_none() {
            self.op2 = Some(dw);
        } else {
            return Err(MinerError::PairOverflow);
        }
        Ok(())
    }

    /// Returns true if the source was not known yet.
    pub fn add_source(&mut self, method: &MethodRef, text: String, stmt: &Stmt) -> bool {
        let stmts = self.sources.entry(method.clone()).or_default();
        if stmts.contains_key(&text) {
            false
        } else {
            stmts.insert(text, stmt.clone());
            true
        }
    }

    /// Returns true if at least one of the sources was not known yet.
    pub fn add_sources(&mut self, sources: &Sources) -> bool {
        let mut modified = false;
        for (method, stmts) in sources {
            for (text, stmt) in stmts {
                if self.add_source(method, text.clone(), stmt) {
                    modified = true;
                }
            }
        }
        modified
    }

    #[inline]
    #[must_use]
    pub const fn sources(&self) -> &Sources {
        &self.sources
    }

    #[must_use]
    pub const fn size(&self) -> usize {
        match (&self.op1, &self.op2) {
            (None, None) => 0,
            (Some(_), None) | (None, Some(_)) => 1,
            (Some(_), Some(_)) => 2,
        }
    }

    #[inline]
    #[must_use]
    pub const fn op1(&self) -> Option<&DataWrapper> {
        self.op1.as_ref()
    }

    #[inline]
    #[must_use]
    pub const fn op2(&self) -> Option<&DataWrapper> {
        self.op2.as_ref()
    }

    pub fn operands(&self) -> impl Iterator<Item = &DataWrapper> {
        self.op1.iter().chain(self.op2.iter())
    }

    /// Operands with the smallest first.
    fn ordered(&self) -> (Option<&DataWrapper>, Option<&DataWrapper>) {
        match (&self.op1, &self.op2) {
            (Some(a), Some(b)) if a > b => (Some(b), Some(a)),
            (None, Some(b)) => (Some(b), None),
            (a, b) => (a.as_ref(), b.as_ref()),
        }
    }

    /// Both operands (or the single one) are constants or sentinels.
    #[must_use]
    pub fn is_primitive_vs_primitive_check(&self) -> bool {
        let is_prim = |dw: &DataWrapper| {
            dw.is_all_value_constant() || dw.is_no_value_constant() || dw.is_primitive_constant()
        };
        match &self.op1 {
            Some(op1) => is_prim(op1) && self.op2.as_ref().map_or(true, is_prim),
            None => false,
        }
    }

    #[must_use]
    pub fn is_pair_with_same_values(&self) -> bool {
        matches!((&self.op1, &self.op2), (Some(a), Some(b)) if a == b)
    }

    #[must_use]
    pub fn is_null_check(&self) -> bool {
        self.operands().any(DataWrapper::is_null_constant)
    }

    /// Textual form, failing if an operand contains the quoting character.
    pub fn to_quoted_string(&self) -> MinerResult<String> {
        Ok(match self.ordered() {
            (None, _) => String::new(),
            (Some(a), None) => quote(&a.to_string())?,
            (Some(a), Some(b)) => format!("{{{}, {}}}", quote(&a.to_string())?, quote(&b.to_string())?),
        })
    }

    /// Splits the textual form of a pair into its operands.
    pub fn parse_pair(pair: &str) -> MinerResult<(String, Option<String>)> {
        let parse_error = || MinerError::PairParse(pair.to_string());
        let mut first_symbol = true;
        let mut in_symbol = false;
        let mut op1 = String::new();
        let mut op2 = String::new();
        let mut chars = pair.chars().peekable();
        while let Some(c) = chars.next() {
            match c {
                QUOTE => in_symbol = !in_symbol,
                ',' if !in_symbol => first_symbol = false,
                '{' if !in_symbol => first_symbol = true,
                '}' if !in_symbol => {
                    if chars.peek().is_some() {
                        return Err(parse_error());
                    }
                    break;
                }
                c if in_symbol => {
                    if first_symbol {
                        op1.push(c);
                    } else {
                        op2.push(c);
                    }
                }
                _ => (),
            }
        }
        if in_symbol || op1.is_empty() {
            return Err(parse_error());
        }
        Ok((op1, (!op2.is_empty()).then_some(op2)))
    }
}

fn quote(s: &str) -> MinerResult<String> {
    if s.contains(QUOTE) {
        Err(MinerError::Quoting(s.to_string()))
    } else {
        Ok(format!("{QUOTE}{s}{QUOTE}"))
    }
}

impl PartialEq for ValuePair {
    fn eq(&self, other: &Self) -> bool {
        self.ordered() == other.ordered()
    }
}

impl Eq for ValuePair {}

impl Hash for ValuePair {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.ordered().hash(state);
    }
}

impl PartialOrd for ValuePair {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ValuePair {
    /// Operand count first, then the smallest operands, then the largest ones.
    fn cmp(&self, other: &Self) -> Ordering {
        self.size()
            .cmp(&other.size())
            .then_with(|| self.ordered().cmp(&other.ordered()))
    }
}

/// Same layout as [`ValuePair::to_quoted_string`], but operands holding a
/// [`QUOTE`] are printed as they are. Only meant for logs: use
/// [`ValuePair::to_quoted_string`] for text read back by [`ValuePair::parse_pair`].
impl fmt::Display for ValuePair {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.ordered() {
            (None, _) => Ok(()),
            (Some(a), None) => write!(f, "{QUOTE}{a}{QUOTE}"),
            (Some(a), Some(b)) => write!(f, "{{{QUOTE}{a}{QUOTE}, {QUOTE}{b}{QUOTE}}}"),
        }
    }
}
