//! Textual derivation of a node value, as an ordered list of parts.

use crate::data::DataWrapper;
use crate::methods::{FieldRef, MethodRef};
use crate::nodes::LocalWrapper;
use crate::values::Constant;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Index;

/// One element of an [`Identifier`].
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Part {
    /// Plain text (operators, punctuation, method names of unresolved calls...).
    Literal { text: String },
    /// A local defined by the children of the node.
    Local { local: LocalWrapper },
    /// A local not tracked by the graph. Never expected in a mined node.
    RawLocal { name: String },
    /// A constant operand inlined in the statement.
    Constant { value: Constant },
    MethodRef { method: MethodRef },
    FieldRef { field: FieldRef },
    /// An already resolved value substituted to a local or a constant.
    #[serde(skip)]
    Data { data: Box<DataWrapper> },
}

impl Part {
    #[must_use]
    pub fn literal<S: Into<String>>(text: S) -> Self {
        Self::Literal { text: text.into() }
    }

    #[must_use]
    pub fn data(data: DataWrapper) -> Self {
        Self::Data {
            data: Box::new(data),
        }
    }

    /// Parts that are replaced by resolved values during substitution.
    #[inline]
    #[must_use]
    pub const fn is_substitutable(&self) -> bool {
        matches!(self, Self::Local { .. } | Self::Constant { .. })
    }
}

impl fmt::Display for Part {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Literal { text } => write!(f, "{text}"),
            Self::Local { local } => write!(f, "{}", local.name()),
            Self::RawLocal { name } => write!(f, "{name}"),
            Self::Constant { value } => write!(f, "{value}"),
            Self::MethodRef { method } => write!(f, "{method}"),
            Self::FieldRef { field } => write!(f, "{field}"),
            Self::Data { data } => write!(f, "{data}"),
        }
    }
}

/// Ordered sequence of parts describing how a value was derived.
///
/// Identifiers are plain values: substitution always works on a clone.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Identifier(Vec<Part>);

impl Identifier {
    #[must_use]
    pub const fn new(parts: Vec<Part>) -> Self {
        Self(parts)
    }

    /// Identifier made of the textual form of a single constant.
    #[must_use]
    pub fn of_constant(constant: &Constant) -> Self {
        Self(vec![Part::Constant {
            value: constant.clone(),
        }])
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Part> {
        self.0.iter()
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Part> {
        self.0.get(index)
    }

    /// Replaces the part at the given position, returns the replaced one.
    pub fn set(&mut self, index: usize, part: Part) -> Option<Part> {
        self.0
            .get_mut(index)
            .map(|slot| std::mem::replace(slot, part))
    }

    pub fn push(&mut self, part: Part) {
        self.0.push(part);
    }

    /// Locals referenced by the identifier, in order of appearance.
    pub fn locals(&self) -> impl Iterator<Item = &LocalWrapper> {
        self.0.iter().filter_map(|p| match p {
            Part::Local { local } => Some(local),
            _ => None,
        })
    }

    /// Position of the first method reference part.
    #[must_use]
    pub fn first_method_ref(&self) -> Option<(usize, &MethodRef)> {
        self.0.iter().enumerate().find_map(|(i, p)| match p {
            Part::MethodRef { method } => Some((i, method)),
            _ => None,
        })
    }
}

impl Index<usize> for Identifier {
    type Output = Part;

    fn index(&self, index: usize) -> &Part {
        &self.0[index]
    }
}

impl From<Vec<Part>> for Identifier {
    fn from(parts: Vec<Part>) -> Self {
        Self(parts)
    }
}

impl<'a> IntoIterator for &'a Identifier {
    type Item = &'a Part;
    type IntoIter = std::slice::Iter<'a, Part>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for part in &self.0 {
            part.fmt(f)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Type;

    fn uid_call() -> Identifier {
        Identifier::new(vec![
            Part::MethodRef {
                method: MethodRef::new("android.os.Binder", "getCallingUid", Type::Int, vec![]),
            },
            Part::literal("()"),
        ])
    }

    #[test]
    fn display_concatenates_parts() {
        assert_eq!(
            uid_call().to_string(),
            "<android.os.Binder: int getCallingUid()>()"
        );
    }

    #[test]
    fn set_replaces_on_clone_only() {
        let id = Identifier::new(vec![
            Part::Local {
                local: LocalWrapper::new(0, "$i0", Type::Int),
            },
            Part::literal(" + 1"),
        ]);
        let mut cur = id.clone();
        cur.set(0, Part::data(DataWrapper::All));
        assert_eq!(cur.to_string(), "ALL + 1");
        assert_eq!(id.to_string(), "$i0 + 1");
        assert_eq!(id.locals().count(), 1);
        assert_eq!(cur.locals().count(), 0);
    }

    #[test]
    fn first_method_ref_position() {
        let mut id = Identifier::new(vec![Part::literal("!")]);
        for p in uid_call().iter() {
            id.push(p.clone());
        }
        assert_eq!(id.first_method_ref().map(|(i, _)| i), Some(1));
        assert!(Identifier::default().first_method_ref().is_none());
    }

    #[test]
    fn decode_parts() {
        let id: Identifier = serde_json::from_str(
            r#"[{"kind":"local","local":{"num":3,"name":"$r1","ty":"java.lang.String"}},
                {"kind":"literal","text":".equals("},
                {"kind":"constant","value":{"kind":"string","value":"android"}},
                {"kind":"literal","text":")"}]"#,
        )
        .unwrap();
        assert_eq!(id.len(), 4);
        assert_eq!(id.to_string(), "$r1.equals(\"android\")");
    }
}
