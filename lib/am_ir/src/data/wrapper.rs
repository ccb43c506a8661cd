use crate::data::primitive::PrimitiveConstant;
use crate::errors::{IrError, IrResult};
use crate::identifier::{Identifier, Part};
use crate::types::Type;
use crate::values::{BinopKind, Constant, Value};
use std::cmp::Ordering;
use std::fmt;

/// Textual form of the "any value" sentinel.
pub const ALL_VALUE: &str = "ALL";
/// Textual form of the "no value" sentinel.
pub const NO_VALUE: &str = "NO";
/// Textual form of the null constant.
pub const NULL_VALUE: &str = "NULL";

/// Operator of a symbolic [`Expression`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ExprOp {
    Binop(BinopKind),
    Neg,
}

/// Symbolic arithmetic over primitive values that could not be folded.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Expression {
    op: ExprOp,
    args: Vec<DataWrapper>,
    ty: Type,
}

impl Expression {
    #[inline]
    #[must_use]
    pub const fn op(&self) -> ExprOp {
        self.op
    }

    #[inline]
    #[must_use]
    pub fn args(&self) -> &[DataWrapper] {
        &self.args
    }

    #[inline]
    #[must_use]
    pub const fn ty(&self) -> &Type {
        &self.ty
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match (&self.op, self.args.as_slice()) {
            (ExprOp::Binop(op), [a, b]) => write!(f, "({a} {op} {b})"),
            (ExprOp::Neg, [a]) => write!(f, "-({a})"),
            (op, args) => write!(f, "{op:?}{args:?}"),
        }
    }
}

/// Abstraction of the value a local or an expression may hold.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DataWrapper {
    /// Any value: unknown or not representable.
    All,
    /// No value at all, e.g. a local without any definition.
    No,
    Null,
    Primitive(PrimitiveConstant),
    Str(String),
    /// Constant that is neither numeric nor a string (class literals).
    Unknown(Identifier),
    /// Symbolic value, primitive, string or reference depending on its type.
    Variable { id: Identifier, ty: Type },
    Expr(Expression),
}

impl DataWrapper {
    #[inline]
    #[must_use]
    pub const fn is_all_value_constant(&self) -> bool {
        matches!(self, Self::All)
    }

    #[inline]
    #[must_use]
    pub const fn is_no_value_constant(&self) -> bool {
        matches!(self, Self::No)
    }

    #[inline]
    #[must_use]
    pub const fn is_null_constant(&self) -> bool {
        matches!(self, Self::Null)
    }

    #[inline]
    #[must_use]
    pub const fn is_primitive_constant(&self) -> bool {
        matches!(self, Self::Primitive(_))
    }

    #[inline]
    #[must_use]
    pub const fn is_string_constant(&self) -> bool {
        matches!(self, Self::Str(_))
    }

    /// Values usable in primitive arithmetic.
    #[must_use]
    pub fn is_primitive(&self) -> bool {
        match self {
            Self::Primitive(_) | Self::Expr(_) => true,
            Self::Variable { ty, .. } => ty.is_primitive(),
            _ => false,
        }
    }

    #[must_use]
    pub fn is_string_variable(&self) -> bool {
        matches!(self, Self::Variable { ty, .. } if ty.is_string())
    }

    /// Identifier of symbolic values, `None` for constants and sentinels.
    #[must_use]
    pub const fn identifier(&self) -> Option<&Identifier> {
        match self {
            Self::Unknown(id) | Self::Variable { id, .. } => Some(id),
            _ => None,
        }
    }

    pub fn identifier_mut(&mut self) -> Option<&mut Identifier> {
        match self {
            Self::Unknown(id) | Self::Variable { id, .. } => Some(id),
            _ => None,
        }
    }

    /// Parts of the identifier, empty for constants and sentinels.
    pub fn parts(&self) -> impl Iterator<Item = &Part> {
        self.identifier().into_iter().flat_map(Identifier::iter)
    }

    pub fn from_constant(constant: &Constant, ty: &Type) -> IrResult<Self> {
        let value = Value::Constant {
            constant: constant.clone(),
        };
        Self::from_value(None, Some(&value), ty)
    }

    /// Wrapper for a node value or identifier, typed with `ty`.
    ///
    /// Numeric constants are converted to `ty`, which must then be
    /// primitive. Non-constant values become variables, unless their
    /// textual form is one of the sentinels.
    pub fn from_value(
        identifier: Option<&Identifier>,
        value: Option<&Value>,
        ty: &Type,
    ) -> IrResult<Self> {
        if let Some(Value::Constant { constant }) = value {
            if let Some(p) = PrimitiveConstant::from_constant(constant) {
                return Ok(Self::Primitive(p.cast_to(ty)?));
            }
            return Ok(match constant {
                Constant::String(s) => Self::Str(s.clone()),
                Constant::Null => Self::Null,
                _ => {
                    let id = identifier
                        .cloned()
                        .unwrap_or_else(|| Identifier::of_constant(constant));
                    Self::sentinel_or(id, Self::Unknown)
                }
            });
        }
        let id = identifier.cloned().ok_or(IrError::MissingValue)?;
        let ty = ty.clone();
        Ok(Self::sentinel_or(id, |id| Self::Variable { id, ty }))
    }

    /// Symbolic variable of the given type.
    #[must_use]
    pub fn variable(id: Identifier, ty: Type) -> Self {
        Self::sentinel_or(id, |id| Self::Variable { id, ty })
    }

    fn sentinel_or<F: FnOnce(Identifier) -> Self>(id: Identifier, f: F) -> Self {
        let text = id.to_string();
        if text == ALL_VALUE {
            Self::All
        } else if text == NO_VALUE {
            Self::No
        } else {
            f(id)
        }
    }

    fn check_primitive(&self) -> IrResult<()> {
        if self.is_primitive() {
            Ok(())
        } else {
            Err(IrError::NonPrimitiveOperand(self.to_string()))
        }
    }

    /// Result of a binary operation typed with `ty`.
    pub fn from_binop(a: &Self, b: &Self, ty: &Type, op: BinopKind) -> IrResult<Self> {
        if a.is_all_value_constant() || b.is_all_value_constant() {
            return Ok(Self::All);
        }
        if a.is_no_value_constant() || b.is_no_value_constant() {
            return Ok(Self::No);
        }
        if !ty.is_primitive() {
            return Err(IrError::NotPrimitive(ty.to_string()));
        }
        if let (Self::Primitive(pa), Self::Primitive(pb)) = (a, b) {
            if let Some(folded) = pa.fold(op, pb) {
                return Ok(Self::Primitive(folded.cast_to(ty)?));
            }
        }
        a.check_primitive()?;
        b.check_primitive()?;

        let zero_right = matches!(b, Self::Primitive(p) if p.is_zero());
        let zero_left = matches!(a, Self::Primitive(p) if p.is_zero());
        match op {
            BinopKind::Add | BinopKind::Or | BinopKind::Xor if zero_left => return Ok(b.clone()),
            BinopKind::Add
            | BinopKind::Sub
            | BinopKind::Or
            | BinopKind::Xor
            | BinopKind::Shl
            | BinopKind::Shr
            | BinopKind::Ushr
                if zero_right =>
            {
                return Ok(a.clone())
            }
            BinopKind::And if zero_left || zero_right => {
                return Ok(Self::Primitive(PrimitiveConstant::Int(0).cast_to(ty)?))
            }
            _ => (),
        }

        Ok(Self::Expr(Expression {
            op: ExprOp::Binop(op),
            args: vec![a.clone(), b.clone()],
            ty: ty.clone(),
        }))
    }

    /// Negation of a value typed with `ty`.
    pub fn from_neg(a: &Self, ty: &Type) -> IrResult<Self> {
        match a {
            Self::All | Self::No => Ok(a.clone()),
            Self::Primitive(p) => Ok(Self::Primitive(p.negate().cast_to(ty)?)),
            other => {
                other.check_primitive()?;
                if !ty.is_primitive() {
                    return Err(IrError::NotPrimitive(ty.to_string()));
                }
                Ok(Self::Expr(Expression {
                    op: ExprOp::Neg,
                    args: vec![other.clone()],
                    ty: ty.clone(),
                }))
            }
        }
    }

    const fn rank(&self) -> u8 {
        match self {
            Self::Primitive(_) => 0,
            Self::All => 1,
            Self::No => 2,
            Self::Null => 3,
            Self::Str(_) => 4,
            Self::Unknown(_) => 5,
            Self::Variable { .. } => 6,
            Self::Expr(_) => 7,
        }
    }
}

impl PartialOrd for DataWrapper {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for DataWrapper {
    /// Primitive constants first, then the sentinels, then strings, then
    /// everything else by textual form.
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Self::Primitive(a), Self::Primitive(b)) => a.cmp(b),
            (Self::Str(a), Self::Str(b)) => a.cmp(b),
            _ if self.rank() <= 4 || other.rank() <= 4 => self.rank().cmp(&other.rank()),
            _ => self
                .to_string()
                .cmp(&other.to_string())
                .then_with(|| self.rank().cmp(&other.rank()))
                .then_with(|| match (self, other) {
                    (Self::Unknown(a), Self::Unknown(b)) => a.cmp(b),
                    (Self::Variable { id: a, ty: ta }, Self::Variable { id: b, ty: tb }) => {
                        a.cmp(b).then_with(|| ta.cmp(tb))
                    }
                    (Self::Expr(a), Self::Expr(b)) => a.cmp(b),
                    _ => Ordering::Equal,
                }),
        }
    }
}

impl fmt::Display for DataWrapper {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::All => write!(f, "{ALL_VALUE}"),
            Self::No => write!(f, "{NO_VALUE}"),
            Self::Null => write!(f, "{NULL_VALUE}"),
            Self::Primitive(p) => write!(f, "{p}"),
            Self::Str(s) => write!(f, "{s:?}"),
            Self::Unknown(id) | Self::Variable { id, .. } => write!(f, "{id}"),
            Self::Expr(e) => write!(f, "{e}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::methods::MethodRef;

    fn var(name: &str, ty: Type) -> DataWrapper {
        DataWrapper::variable(Identifier::new(vec![Part::literal(name)]), ty)
    }

    fn int(v: i32) -> DataWrapper {
        DataWrapper::Primitive(PrimitiveConstant::Int(v))
    }

    #[test]
    fn total_order() {
        let mut v = vec![
            var("b", Type::Int),
            DataWrapper::Str("x".into()),
            DataWrapper::Null,
            DataWrapper::No,
            DataWrapper::All,
            int(7),
            int(-1),
            var("a", Type::Int),
        ];
        v.sort();
        assert_eq!(
            v,
            vec![
                int(-1),
                int(7),
                DataWrapper::All,
                DataWrapper::No,
                DataWrapper::Null,
                DataWrapper::Str("x".into()),
                var("a", Type::Int),
                var("b", Type::Int),
            ]
        );
    }

    #[test]
    fn order_consistent_with_equality() {
        let a = var("a", Type::Int);
        let b = var("a", Type::Long);
        assert_ne!(a, b);
        assert_ne!(a.cmp(&b), Ordering::Equal);
    }

    #[test]
    fn from_value_constants() {
        let five = Value::Constant {
            constant: Constant::Int(5),
        };
        assert_eq!(
            DataWrapper::from_value(None, Some(&five), &Type::Long).unwrap(),
            DataWrapper::Primitive(PrimitiveConstant::Long(5))
        );
        assert!(DataWrapper::from_value(None, Some(&five), &Type::string()).is_err());
        let null = Value::Constant {
            constant: Constant::Null,
        };
        assert_eq!(
            DataWrapper::from_value(None, Some(&null), &Type::Null).unwrap(),
            DataWrapper::Null
        );
        let class = Constant::Class("a.B".into());
        assert!(matches!(
            DataWrapper::from_constant(&class, &class.ty()).unwrap(),
            DataWrapper::Unknown(_)
        ));
    }

    #[test]
    fn from_value_variables_and_sentinels() {
        let id = Identifier::new(vec![Part::literal("ALL")]);
        assert_eq!(
            DataWrapper::from_value(Some(&id), None, &Type::Int).unwrap(),
            DataWrapper::All
        );
        let call = Identifier::new(vec![Part::MethodRef {
            method: MethodRef::new("a.B", "f", Type::Int, vec![]),
        }]);
        let v = DataWrapper::from_value(Some(&call), None, &Type::Int).unwrap();
        assert!(v.is_primitive());
        assert!(DataWrapper::from_value(None, None, &Type::Int).is_err());
    }

    #[test]
    fn binop_sentinels_dominate() {
        let x = var("x", Type::Int);
        assert_eq!(
            DataWrapper::from_binop(&DataWrapper::No, &DataWrapper::All, &Type::Int, BinopKind::Add)
                .unwrap(),
            DataWrapper::All
        );
        assert_eq!(
            DataWrapper::from_binop(&x, &DataWrapper::No, &Type::Int, BinopKind::Add).unwrap(),
            DataWrapper::No
        );
    }

    #[test]
    fn binop_folds_constants() {
        assert_eq!(
            DataWrapper::from_binop(&int(2), &int(3), &Type::Int, BinopKind::Mul).unwrap(),
            int(6)
        );
        let div = DataWrapper::from_binop(&int(2), &int(0), &Type::Int, BinopKind::Div).unwrap();
        assert!(matches!(div, DataWrapper::Expr(_)));
    }

    #[test]
    fn binop_identities_and_expressions() {
        let x = var("x", Type::Int);
        assert_eq!(
            DataWrapper::from_binop(&x, &int(0), &Type::Int, BinopKind::Add).unwrap(),
            x
        );
        assert_eq!(
            DataWrapper::from_binop(&int(0), &x, &Type::Int, BinopKind::And).unwrap(),
            int(0)
        );
        let e = DataWrapper::from_binop(&x, &int(4), &Type::Int, BinopKind::And).unwrap();
        assert_eq!(e.to_string(), "(x & 4)");
        let s = DataWrapper::Str("s".into());
        assert!(DataWrapper::from_binop(&x, &s, &Type::Int, BinopKind::Add).is_err());
    }

    #[test]
    fn negation() {
        assert_eq!(
            DataWrapper::from_neg(&int(3), &Type::Int).unwrap(),
            int(-3)
        );
        assert_eq!(
            DataWrapper::from_neg(&DataWrapper::All, &Type::Int).unwrap(),
            DataWrapper::All
        );
        let e = DataWrapper::from_neg(&var("x", Type::Int), &Type::Int).unwrap();
        assert_eq!(e.to_string(), "-(x)");
        assert!(DataWrapper::from_neg(&DataWrapper::Null, &Type::Int).is_err());
    }
}
