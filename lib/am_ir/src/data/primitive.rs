//! Primitive constants with Java arithmetic semantics.

use crate::errors::{IrError, IrResult};
use crate::types::Type;
use crate::values::{BinopKind, Constant};
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

/// A constant of one of the eight Java primitive types.
#[derive(Debug, Clone, Copy)]
pub enum PrimitiveConstant {
    Boolean(bool),
    Byte(i8),
    Char(u16),
    Short(i16),
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
}

/// Arithmetic category two operands are promoted to.
enum Promoted {
    Int,
    Long,
    Float,
    Double,
}

fn java_float(f: &mut fmt::Formatter, v: f64) -> fmt::Result {
    if v.is_nan() {
        write!(f, "NaN")
    } else if v.is_infinite() {
        write!(f, "{}", if v > 0.0 { "Infinity" } else { "-Infinity" })
    } else if v.fract() == 0.0 && v.abs() < 1e7 {
        write!(f, "{v:.1}")
    } else {
        write!(f, "{v}")
    }
}

fn ordering_to_int(o: Option<Ordering>, unordered: i32) -> PrimitiveConstant {
    PrimitiveConstant::Int(match o {
        Some(Ordering::Less) => -1,
        Some(Ordering::Equal) => 0,
        Some(Ordering::Greater) => 1,
        None => unordered,
    })
}

impl PrimitiveConstant {
    /// Numeric constants only, other constants are not primitives.
    #[must_use]
    pub const fn from_constant(c: &Constant) -> Option<Self> {
        match c {
            Constant::Int(v) => Some(Self::Int(*v)),
            Constant::Long(v) => Some(Self::Long(*v)),
            Constant::Float(v) => Some(Self::Float(*v)),
            Constant::Double(v) => Some(Self::Double(*v)),
            _ => None,
        }
    }

    const fn rank(&self) -> u8 {
        match self {
            Self::Boolean(_) => 0,
            Self::Byte(_) => 1,
            Self::Char(_) => 2,
            Self::Short(_) => 3,
            Self::Int(_) => 4,
            Self::Long(_) => 5,
            Self::Float(_) => 6,
            Self::Double(_) => 7,
        }
    }

    #[must_use]
    pub const fn ty(&self) -> Type {
        match self {
            Self::Boolean(_) => Type::Boolean,
            Self::Byte(_) => Type::Byte,
            Self::Char(_) => Type::Char,
            Self::Short(_) => Type::Short,
            Self::Int(_) => Type::Int,
            Self::Long(_) => Type::Long,
            Self::Float(_) => Type::Float,
            Self::Double(_) => Type::Double,
        }
    }

    #[must_use]
    pub fn as_int(&self) -> i32 {
        match *self {
            Self::Boolean(b) => i32::from(b),
            Self::Byte(v) => i32::from(v),
            Self::Char(v) => i32::from(v),
            Self::Short(v) => i32::from(v),
            Self::Int(v) => v,
            Self::Long(v) => v as i32,
            Self::Float(v) => v as i32,
            Self::Double(v) => v as i32,
        }
    }

    #[must_use]
    pub fn as_long(&self) -> i64 {
        match *self {
            Self::Long(v) => v,
            Self::Float(v) => v as i64,
            Self::Double(v) => v as i64,
            _ => i64::from(self.as_int()),
        }
    }

    #[must_use]
    pub fn as_float(&self) -> f32 {
        match *self {
            Self::Long(v) => v as f32,
            Self::Float(v) => v,
            Self::Double(v) => v as f32,
            _ => self.as_int() as f32,
        }
    }

    #[must_use]
    pub fn as_double(&self) -> f64 {
        match *self {
            Self::Long(v) => v as f64,
            Self::Float(v) => f64::from(v),
            Self::Double(v) => v,
            _ => f64::from(self.as_int()),
        }
    }

    pub fn as_boolean(&self) -> IrResult<bool> {
        match *self {
            Self::Boolean(b) => Ok(b),
            _ => match self.as_long() {
                0 => Ok(false),
                1 => Ok(true),
                _ => Err(IrError::Conversion {
                    from: self.to_string(),
                    to: "boolean".to_string(),
                }),
            },
        }
    }

    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.as_double() == 0.0
    }

    #[must_use]
    pub fn is_negative(&self) -> bool {
        self.as_double() < 0.0
    }

    /// Java primitive conversion to the given type.
    pub fn cast_to(&self, ty: &Type) -> IrResult<Self> {
        Ok(match ty {
            Type::Boolean => Self::Boolean(self.as_boolean()?),
            Type::Byte => Self::Byte(self.as_int() as i8),
            Type::Char => Self::Char(self.as_int() as u16),
            Type::Short => Self::Short(self.as_int() as i16),
            Type::Int => Self::Int(self.as_int()),
            Type::Long => Self::Long(self.as_long()),
            Type::Float => Self::Float(self.as_float()),
            Type::Double => Self::Double(self.as_double()),
            other => return Err(IrError::NotPrimitive(other.to_string())),
        })
    }

    fn promoted(&self, other: &Self) -> Promoted {
        let upper = if self.rank() >= other.rank() {
            self
        } else {
            other
        };
        match upper {
            Self::Double(_) => Promoted::Double,
            Self::Float(_) => Promoted::Float,
            Self::Long(_) => Promoted::Long,
            _ => Promoted::Int,
        }
    }

    /// Bitwise operators work on long for double and long operands, on int otherwise.
    fn bitwise_is_long(&self, other: &Self) -> bool {
        matches!(self.promoted(other), Promoted::Long | Promoted::Double)
    }

    /// Negation, booleans are inverted.
    #[must_use]
    pub fn negate(&self) -> Self {
        match *self {
            Self::Boolean(b) => Self::Boolean(!b),
            Self::Double(v) => Self::Double(-v),
            Self::Float(v) => Self::Float(-v),
            Self::Long(v) => Self::Long(v.wrapping_neg()),
            _ => Self::Int(self.as_int().wrapping_neg()),
        }
    }

    /// Folds a binary operation on two constants.
    ///
    /// Returns `None` when Java would raise at runtime (integer division
    /// or remainder by zero).
    #[must_use]
    pub fn fold(&self, op: BinopKind, other: &Self) -> Option<Self> {
        let promoted = self.promoted(other);
        let res = match op {
            BinopKind::Add | BinopKind::Sub | BinopKind::Mul | BinopKind::Div | BinopKind::Rem => {
                match promoted {
                    Promoted::Double => {
                        let (a, b) = (self.as_double(), other.as_double());
                        Self::Double(match op {
                            BinopKind::Add => a + b,
                            BinopKind::Sub => a - b,
                            BinopKind::Mul => a * b,
                            BinopKind::Div => a / b,
                            _ => a % b,
                        })
                    }
                    Promoted::Float => {
                        let (a, b) = (self.as_float(), other.as_float());
                        Self::Float(match op {
                            BinopKind::Add => a + b,
                            BinopKind::Sub => a - b,
                            BinopKind::Mul => a * b,
                            BinopKind::Div => a / b,
                            _ => a % b,
                        })
                    }
                    Promoted::Long => {
                        let (a, b) = (self.as_long(), other.as_long());
                        Self::Long(match op {
                            BinopKind::Add => a.wrapping_add(b),
                            BinopKind::Sub => a.wrapping_sub(b),
                            BinopKind::Mul => a.wrapping_mul(b),
                            BinopKind::Div => a.checked_div(b).or_else(|| (b == -1).then(|| a.wrapping_neg()))?,
                            _ => a.checked_rem(b).or_else(|| (b == -1).then_some(0))?,
                        })
                    }
                    Promoted::Int => {
                        let (a, b) = (self.as_int(), other.as_int());
                        Self::Int(match op {
                            BinopKind::Add => a.wrapping_add(b),
                            BinopKind::Sub => a.wrapping_sub(b),
                            BinopKind::Mul => a.wrapping_mul(b),
                            BinopKind::Div => a.checked_div(b).or_else(|| (b == -1).then(|| a.wrapping_neg()))?,
                            _ => a.checked_rem(b).or_else(|| (b == -1).then_some(0))?,
                        })
                    }
                }
            }
            BinopKind::And | BinopKind::Or | BinopKind::Xor => {
                if self.bitwise_is_long(other) {
                    let (a, b) = (self.as_long(), other.as_long());
                    Self::Long(match op {
                        BinopKind::And => a & b,
                        BinopKind::Or => a | b,
                        _ => a ^ b,
                    })
                } else {
                    let (a, b) = (self.as_int(), other.as_int());
                    Self::Int(match op {
                        BinopKind::And => a & b,
                        BinopKind::Or => a | b,
                        _ => a ^ b,
                    })
                }
            }
            BinopKind::Shl | BinopKind::Shr | BinopKind::Ushr => {
                if self.bitwise_is_long(other) {
                    let (a, b) = (self.as_long(), other.as_long() as u32);
                    Self::Long(match op {
                        BinopKind::Shl => a.wrapping_shl(b),
                        BinopKind::Shr => a.wrapping_shr(b),
                        _ => (a as u64).wrapping_shr(b) as i64,
                    })
                } else {
                    let (a, b) = (self.as_int(), other.as_int() as u32);
                    Self::Int(match op {
                        BinopKind::Shl => a.wrapping_shl(b),
                        BinopKind::Shr => a.wrapping_shr(b),
                        _ => (a as u32).wrapping_shr(b) as i32,
                    })
                }
            }
            BinopKind::Eq
            | BinopKind::Ne
            | BinopKind::Ge
            | BinopKind::Gt
            | BinopKind::Le
            | BinopKind::Lt => {
                let o = match promoted {
                    Promoted::Double => self.as_double().partial_cmp(&other.as_double()),
                    Promoted::Float => self.as_float().partial_cmp(&other.as_float()),
                    Promoted::Long => Some(self.as_long().cmp(&other.as_long())),
                    Promoted::Int => Some(self.as_int().cmp(&other.as_int())),
                };
                Self::Boolean(match op {
                    BinopKind::Eq => o == Some(Ordering::Equal),
                    BinopKind::Ne => o != Some(Ordering::Equal),
                    BinopKind::Ge => matches!(o, Some(Ordering::Greater | Ordering::Equal)),
                    BinopKind::Gt => o == Some(Ordering::Greater),
                    BinopKind::Le => matches!(o, Some(Ordering::Less | Ordering::Equal)),
                    _ => o == Some(Ordering::Less),
                })
            }
            BinopKind::Cmp | BinopKind::Cmpg | BinopKind::Cmpl => {
                let unordered = if op == BinopKind::Cmpg { 1 } else { -1 };
                let o = match promoted {
                    Promoted::Double => self.as_double().partial_cmp(&other.as_double()),
                    Promoted::Float => self.as_float().partial_cmp(&other.as_float()),
                    Promoted::Long => Some(self.as_long().cmp(&other.as_long())),
                    Promoted::Int => Some(self.as_int().cmp(&other.as_int())),
                };
                ordering_to_int(o, unordered)
            }
        };
        Some(res)
    }

    fn bits(&self) -> u64 {
        match *self {
            Self::Float(v) => u64::from(v.to_bits()),
            Self::Double(v) => v.to_bits(),
            _ => self.as_long() as u64,
        }
    }
}

impl PartialEq for PrimitiveConstant {
    fn eq(&self, other: &Self) -> bool {
        self.rank() == other.rank() && self.bits() == other.bits()
    }
}

impl Eq for PrimitiveConstant {}

impl Hash for PrimitiveConstant {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.rank().hash(state);
        self.bits().hash(state);
    }
}

impl PartialOrd for PrimitiveConstant {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for PrimitiveConstant {
    /// Numeric order first, then type, so that it stays consistent with equality.
    fn cmp(&self, other: &Self) -> Ordering {
        self.as_double()
            .total_cmp(&other.as_double())
            .then_with(|| self.rank().cmp(&other.rank()))
            .then_with(|| self.bits().cmp(&other.bits()))
    }
}

impl fmt::Display for PrimitiveConstant {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Self::Boolean(b) => write!(f, "{b}"),
            Self::Byte(v) => write!(f, "{v}"),
            Self::Char(v) => match char::from_u32(u32::from(v)) {
                Some(c) => write!(f, "{c}"),
                None => write!(f, "\\u{v:04x}"),
            },
            Self::Short(v) => write!(f, "{v}"),
            Self::Int(v) => write!(f, "{v}"),
            Self::Long(v) => write!(f, "{v}"),
            Self::Float(v) => java_float(f, f64::from(v)),
            Self::Double(v) => java_float(f, v),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integer_arithmetic_wraps() {
        let max = PrimitiveConstant::Int(i32::MAX);
        let one = PrimitiveConstant::Int(1);
        assert_eq!(
            max.fold(BinopKind::Add, &one),
            Some(PrimitiveConstant::Int(i32::MIN))
        );
        assert_eq!(
            PrimitiveConstant::Int(i32::MIN).fold(BinopKind::Div, &PrimitiveConstant::Int(-1)),
            Some(PrimitiveConstant::Int(i32::MIN))
        );
    }

    #[test]
    fn integer_division_by_zero_does_not_fold() {
        let zero = PrimitiveConstant::Int(0);
        assert_eq!(PrimitiveConstant::Int(5).fold(BinopKind::Div, &zero), None);
        assert_eq!(PrimitiveConstant::Long(5).fold(BinopKind::Rem, &zero), None);
        let d = PrimitiveConstant::Double(1.0).fold(BinopKind::Div, &zero);
        assert_eq!(d, Some(PrimitiveConstant::Double(f64::INFINITY)));
    }

    #[test]
    fn widening_to_the_larger_operand() {
        let r = PrimitiveConstant::Int(2).fold(BinopKind::Mul, &PrimitiveConstant::Long(3));
        assert_eq!(r, Some(PrimitiveConstant::Long(6)));
        let r = PrimitiveConstant::Char(65).fold(BinopKind::Add, &PrimitiveConstant::Byte(1));
        assert_eq!(r, Some(PrimitiveConstant::Int(66)));
    }

    #[test]
    fn shifts_are_masked() {
        let r = PrimitiveConstant::Int(1).fold(BinopKind::Shl, &PrimitiveConstant::Int(33));
        assert_eq!(r, Some(PrimitiveConstant::Int(2)));
        let r = PrimitiveConstant::Int(-1).fold(BinopKind::Ushr, &PrimitiveConstant::Int(28));
        assert_eq!(r, Some(PrimitiveConstant::Int(15)));
    }

    #[test]
    fn comparisons() {
        let a = PrimitiveConstant::Int(3);
        let b = PrimitiveConstant::Int(5);
        assert_eq!(
            a.fold(BinopKind::Lt, &b),
            Some(PrimitiveConstant::Boolean(true))
        );
        assert_eq!(a.fold(BinopKind::Cmp, &b), Some(PrimitiveConstant::Int(-1)));
        let nan = PrimitiveConstant::Double(f64::NAN);
        assert_eq!(nan.fold(BinopKind::Cmpg, &a), Some(PrimitiveConstant::Int(1)));
        assert_eq!(nan.fold(BinopKind::Cmpl, &a), Some(PrimitiveConstant::Int(-1)));
    }

    #[test]
    fn casts() {
        let c = PrimitiveConstant::Int(300);
        assert_eq!(c.cast_to(&Type::Byte).unwrap(), PrimitiveConstant::Byte(44));
        assert_eq!(
            PrimitiveConstant::Int(1).cast_to(&Type::Boolean).unwrap(),
            PrimitiveConstant::Boolean(true)
        );
        assert!(c.cast_to(&Type::Boolean).is_err());
        assert!(c.cast_to(&Type::string()).is_err());
    }

    #[test]
    fn order_is_numeric_then_typed() {
        let mut v = vec![
            PrimitiveConstant::Long(1),
            PrimitiveConstant::Double(-2.5),
            PrimitiveConstant::Int(1),
        ];
        v.sort();
        assert_eq!(
            v,
            vec![
                PrimitiveConstant::Double(-2.5),
                PrimitiveConstant::Int(1),
                PrimitiveConstant::Long(1)
            ]
        );
        assert_ne!(PrimitiveConstant::Int(1), PrimitiveConstant::Long(1));
    }

    #[test]
    fn java_display() {
        assert_eq!(PrimitiveConstant::Double(1.0).to_string(), "1.0");
        assert_eq!(PrimitiveConstant::Float(0.5).to_string(), "0.5");
        assert_eq!(PrimitiveConstant::Char(97).to_string(), "a");
        assert_eq!(PrimitiveConstant::Boolean(false).to_string(), "false");
    }
}
