//! Java typing informations data structures.

use crate::errors::{IrError, IrResult};
use serde::{Deserialize, Serialize};
use std::convert::TryFrom;
use std::fmt;

/// Java concrete type, as found in the declared type of locals, fields
/// and method return values.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Type {
    /// `void` type, only valid for return types.
    Void,
    /// `boolean` type.
    Boolean,
    /// `byte` type.
    Byte,
    /// `short` type.
    Short,
    /// `char` type.
    Char,
    /// `int` type.
    Int,
    /// `long` type.
    Long,
    /// `float` type.
    Float,
    /// `double` type.
    Double,
    /// Array of the given base type with the given number of dimensions.
    Array(usize, Box<Self>),
    /// Type of a fully-qualified class, dot separated.
    Class(String),
    /// Type of the `null` constant.
    Null,
}

impl Type {
    #[must_use]
    pub fn class<S: Into<String>>(name: S) -> Self {
        Self::Class(name.into())
    }

    #[must_use]
    pub fn string() -> Self {
        Self::Class("java.lang.String".to_string())
    }

    #[must_use]
    pub fn array_of(base: Self, dims: usize) -> Self {
        match base {
            Self::Array(n, inner) => Self::Array(n + dims, inner),
            base => Self::Array(dims, Box::new(base)),
        }
    }

    /// Primitive types, as opposed to reference types. `void` is not one of them.
    #[must_use]
    pub const fn is_primitive(&self) -> bool {
        matches!(
            self,
            Self::Boolean
                | Self::Byte
                | Self::Short
                | Self::Char
                | Self::Int
                | Self::Long
                | Self::Float
                | Self::Double
        )
    }

    #[inline]
    #[must_use]
    pub const fn is_boolean(&self) -> bool {
        matches!(self, Self::Boolean)
    }

    #[must_use]
    pub fn is_string(&self) -> bool {
        matches!(self, Self::Class(name) if name == "java.lang.String")
    }

    /// Element type of an array type, the type itself otherwise.
    #[must_use]
    pub fn base_type(&self) -> &Self {
        match self {
            Self::Array(_, base) => base,
            other => other,
        }
    }

    pub fn as_class_name(&self) -> IrResult<&str> {
        if let Self::Class(name) = self {
            Ok(name)
        } else {
            Err(IrError::Conversion {
                from: self.to_string(),
                to: "class name".to_string(),
            })
        }
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Void => write!(f, "void"),
            Self::Boolean => write!(f, "boolean"),
            Self::Byte => write!(f, "byte"),
            Self::Short => write!(f, "short"),
            Self::Char => write!(f, "char"),
            Self::Int => write!(f, "int"),
            Self::Long => write!(f, "long"),
            Self::Float => write!(f, "float"),
            Self::Double => write!(f, "double"),
            Self::Array(n, inner) => {
                write!(f, "{inner}")?;
                for _ in 0..*n {
                    write!(f, "[]")?;
                }
                Ok(())
            }
            Self::Class(classname) => write!(f, "{classname}"),
            Self::Null => write!(f, "null_type"),
        }
    }
}

impl TryFrom<&str> for Type {
    type Error = IrError;

    fn try_from(s: &str) -> IrResult<Self> {
        let conversion_error = || IrError::Conversion {
            from: format!("&str ({s:?})"),
            to: "Type".to_string(),
        };

        let s = s.trim();
        if s.is_empty() {
            return Err(conversion_error());
        }

        let mut base = s;
        let mut dims: usize = 0;
        while let Some(stripped) = base.strip_suffix("[]") {
            base = stripped.trim_end();
            dims += 1;
        }
        if base.is_empty() || dims >= 255 {
            return Err(conversion_error());
        }

        let t = match base {
            "void" if dims == 0 => Self::Void,
            "boolean" => Self::Boolean,
            "byte" => Self::Byte,
            "short" => Self::Short,
            "char" => Self::Char,
            "int" => Self::Int,
            "long" => Self::Long,
            "float" => Self::Float,
            "double" => Self::Double,
            "null_type" if dims == 0 => Self::Null,
            name => {
                if name
                    .chars()
                    .all(|c| c.is_alphanumeric() || c == '.' || c == '_' || c == '$')
                {
                    Self::Class(name.to_string())
                } else {
                    return Err(conversion_error());
                }
            }
        };
        if dims == 0 {
            Ok(t)
        } else {
            Ok(Self::Array(dims, Box::new(t)))
        }
    }
}

impl TryFrom<String> for Type {
    type Error = IrError;

    fn try_from(s: String) -> IrResult<Self> {
        Self::try_from(s.as_str())
    }
}

impl From<Type> for String {
    fn from(t: Type) -> Self {
        t.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_primitive_types() {
        assert_eq!(Type::try_from("int").unwrap(), Type::Int);
        assert_eq!(Type::try_from("boolean").unwrap(), Type::Boolean);
        assert_eq!(Type::try_from("void").unwrap(), Type::Void);
    }

    #[test]
    fn parse_array_types() {
        assert_eq!(
            Type::try_from("java.lang.String[][]").unwrap(),
            Type::Array(2, Box::new(Type::string()))
        );
        assert!(Type::try_from("void[]").is_err());
        assert!(Type::try_from("[]").is_err());
    }

    #[test]
    fn display_round_trip() {
        let t = Type::array_of(Type::Int, 3);
        assert_eq!(t.to_string(), "int[][][]");
        assert_eq!(Type::try_from(t.to_string()).unwrap(), t);
    }

    #[test]
    fn base_type_of_array() {
        let t = Type::array_of(Type::array_of(Type::Long, 1), 1);
        assert_eq!(t, Type::Array(2, Box::new(Type::Long)));
        assert_eq!(t.base_type(), &Type::Long);
    }
}
