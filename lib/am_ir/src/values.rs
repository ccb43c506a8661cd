//! Constants and expression kinds attached to def-use graph nodes.

use crate::methods::{FieldRef, MethodRef};
use crate::types::Type;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

/// Constant operand, as it appears in a statement.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Constant {
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    String(String),
    Null,
    /// Class literal, fully-qualified class name.
    Class(String),
}

impl Constant {
    #[must_use]
    pub fn ty(&self) -> Type {
        match self {
            Self::Int(_) => Type::Int,
            Self::Long(_) => Type::Long,
            Self::Float(_) => Type::Float,
            Self::Double(_) => Type::Double,
            Self::String(_) => Type::string(),
            Self::Null => Type::Null,
            Self::Class(_) => Type::class("java.lang.Class"),
        }
    }

    #[must_use]
    pub const fn is_numeric(&self) -> bool {
        matches!(
            self,
            Self::Int(_) | Self::Long(_) | Self::Float(_) | Self::Double(_)
        )
    }

    const fn rank(&self) -> u8 {
        match self {
            Self::Int(_) => 0,
            Self::Long(_) => 1,
            Self::Float(_) => 2,
            Self::Double(_) => 3,
            Self::String(_) => 4,
            Self::Null => 5,
            Self::Class(_) => 6,
        }
    }
}

impl PartialEq for Constant {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Constant {}

impl PartialOrd for Constant {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Constant {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Self::Int(a), Self::Int(b)) => a.cmp(b),
            (Self::Long(a), Self::Long(b)) => a.cmp(b),
            (Self::Float(a), Self::Float(b)) => a.to_bits().cmp(&b.to_bits()),
            (Self::Double(a), Self::Double(b)) => a.to_bits().cmp(&b.to_bits()),
            (Self::String(a), Self::String(b)) | (Self::Class(a), Self::Class(b)) => a.cmp(b),
            _ => self.rank().cmp(&other.rank()),
        }
    }
}

impl Hash for Constant {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.rank().hash(state);
        match self {
            Self::Int(v) => v.hash(state),
            Self::Long(v) => v.hash(state),
            Self::Float(v) => v.to_bits().hash(state),
            Self::Double(v) => v.to_bits().hash(state),
            Self::String(s) | Self::Class(s) => s.hash(state),
            Self::Null => (),
        }
    }
}

impl fmt::Display for Constant {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Int(v) => write!(f, "{v}"),
            Self::Long(v) => write!(f, "{v}L"),
            Self::Float(v) => write!(f, "{v:?}F"),
            Self::Double(v) => write!(f, "{v:?}"),
            Self::String(s) => write!(f, "{s:?}"),
            Self::Null => write!(f, "null"),
            Self::Class(c) => write!(f, "class \"{c}\""),
        }
    }
}

/// Binary operators of the expressions found in def-use graph nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BinopKind {
    Add,
    And,
    Cmp,
    Cmpg,
    Cmpl,
    Eq,
    Ge,
    Gt,
    Le,
    Lt,
    Ne,
    Div,
    Mul,
    Or,
    Rem,
    Shl,
    Shr,
    Sub,
    Ushr,
    Xor,
}

impl BinopKind {
    #[must_use]
    pub const fn symbol(self) -> &'static str {
        match self {
            Self::Add => "+",
            Self::And => "&",
            Self::Cmp => "cmp",
            Self::Cmpg => "cmpg",
            Self::Cmpl => "cmpl",
            Self::Eq => "==",
            Self::Ge => ">=",
            Self::Gt => ">",
            Self::Le => "<=",
            Self::Lt => "<",
            Self::Ne => "!=",
            Self::Div => "/",
            Self::Mul => "*",
            Self::Or => "|",
            Self::Rem => "%",
            Self::Shl => "<<",
            Self::Shr => ">>",
            Self::Sub => "-",
            Self::Ushr => ">>>",
            Self::Xor => "^",
        }
    }
}

impl fmt::Display for BinopKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

/// The value computed by the statement a def-use graph node stands for.
///
/// Only the kind of the expression matters to the miner, operands are
/// described by the node identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Value {
    Constant { constant: Constant },
    ParameterRef { index: usize, ty: Type },
    Binop { op: BinopKind, ty: Type },
    Neg { ty: Type },
    Length,
    InstanceOf { check: Type },
    New { ty: Type },
    Cast { ty: Type },
    ArrayRef { ty: Type },
    Invoke { method: MethodRef },
    FieldRef { field: FieldRef },
    Other { ty: Type },
}

impl Value {
    /// Static type of the value.
    #[must_use]
    pub fn ty(&self) -> Type {
        match self {
            Self::Constant { constant } => constant.ty(),
            Self::ParameterRef { ty, .. }
            | Self::Binop { ty, .. }
            | Self::Neg { ty }
            | Self::New { ty }
            | Self::Cast { ty }
            | Self::ArrayRef { ty }
            | Self::Other { ty } => ty.clone(),
            Self::Length => Type::Int,
            Self::InstanceOf { .. } => Type::Boolean,
            Self::Invoke { method } => method.return_type().clone(),
            Self::FieldRef { field } => field.ty().clone(),
        }
    }

    #[inline]
    #[must_use]
    pub const fn is_parameter_ref(&self) -> bool {
        matches!(self, Self::ParameterRef { .. })
    }
}
