//! Method and field references, printed and parsed with the usual
//! `<declaring.Class: type name>` signature syntax.

use crate::errors::{IrError, IrResult};
use crate::types::Type;
use serde::{Deserialize, Serialize};
use std::convert::TryFrom;
use std::fmt;

/// Full description of a method: declaring class, name, and prototype.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct MethodRef {
    declaring_class: String,
    name: String,
    return_type: Type,
    parameters_types: Vec<Type>,
}

impl MethodRef {
    #[must_use]
    pub fn new<C: Into<String>, N: Into<String>>(
        declaring_class: C,
        name: N,
        return_type: Type,
        parameters_types: Vec<Type>,
    ) -> Self {
        Self {
            declaring_class: declaring_class.into(),
            name: name.into(),
            return_type,
            parameters_types,
        }
    }

    #[inline]
    #[must_use]
    pub fn declaring_class(&self) -> &str {
        &self.declaring_class
    }

    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    #[must_use]
    pub fn return_type(&self) -> &Type {
        &self.return_type
    }

    #[inline]
    #[must_use]
    pub fn parameters_types(&self) -> &[Type] {
        &self.parameters_types
    }

    /// Signature without the declaring class, e.g. `boolean equals(java.lang.Object)`.
    #[must_use]
    pub fn sub_signature(&self) -> String {
        let parameters = self
            .parameters_types
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(",");
        format!("{} {}({})", self.return_type, self.name, parameters)
    }
}

impl fmt::Display for MethodRef {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "<{}: {}>", self.declaring_class, self.sub_signature())
    }
}

fn strip_signature<'a>(s: &'a str, what: &str) -> IrResult<(&'a str, &'a str)> {
    s.trim()
        .strip_prefix('<')
        .and_then(|s| s.strip_suffix('>'))
        .and_then(|s| s.split_once(": "))
        .ok_or_else(|| IrError::Conversion {
            from: format!("&str ({s:?})"),
            to: what.to_string(),
        })
}

impl TryFrom<&str> for MethodRef {
    type Error = IrError;

    fn try_from(s: &str) -> IrResult<Self> {
        let conversion_error = || IrError::Conversion {
            from: format!("&str ({s:?})"),
            to: "MethodRef".to_string(),
        };

        let (declaring_class, sub_signature) = strip_signature(s, "MethodRef")?;
        let (return_type, rest) = sub_signature
            .split_once(' ')
            .ok_or_else(conversion_error)?;
        let (name, parameters) = rest
            .strip_suffix(')')
            .and_then(|r| r.split_once('('))
            .ok_or_else(conversion_error)?;
        if name.is_empty() {
            return Err(conversion_error());
        }
        let parameters_types = if parameters.trim().is_empty() {
            Vec::new()
        } else {
            parameters
                .split(',')
                .map(Type::try_from)
                .collect::<IrResult<Vec<_>>>()?
        };

        Ok(Self {
            declaring_class: declaring_class.to_string(),
            name: name.to_string(),
            return_type: Type::try_from(return_type)?,
            parameters_types,
        })
    }
}

impl TryFrom<String> for MethodRef {
    type Error = IrError;

    fn try_from(s: String) -> IrResult<Self> {
        Self::try_from(s.as_str())
    }
}

impl From<MethodRef> for String {
    fn from(m: MethodRef) -> Self {
        m.to_string()
    }
}

/// Full description of a field: declaring class, type and name.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct FieldRef {
    declaring_class: String,
    name: String,
    ty: Type,
}

impl FieldRef {
    #[must_use]
    pub fn new<C: Into<String>, N: Into<String>>(declaring_class: C, name: N, ty: Type) -> Self {
        Self {
            declaring_class: declaring_class.into(),
            name: name.into(),
            ty,
        }
    }

    #[inline]
    #[must_use]
    pub fn declaring_class(&self) -> &str {
        &self.declaring_class
    }

    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    #[must_use]
    pub fn ty(&self) -> &Type {
        &self.ty
    }
}

impl fmt::Display for FieldRef {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "<{}: {} {}>", self.declaring_class, self.ty, self.name)
    }
}

impl TryFrom<&str> for FieldRef {
    type Error = IrError;

    fn try_from(s: &str) -> IrResult<Self> {
        let (declaring_class, rest) = strip_signature(s, "FieldRef")?;
        let (ty, name) = rest.split_once(' ').ok_or_else(|| IrError::Conversion {
            from: format!("&str ({s:?})"),
            to: "FieldRef".to_string(),
        })?;
        Ok(Self {
            declaring_class: declaring_class.to_string(),
            name: name.to_string(),
            ty: Type::try_from(ty)?,
        })
    }
}

impl TryFrom<String> for FieldRef {
    type Error = IrError;

    fn try_from(s: String) -> IrResult<Self> {
        Self::try_from(s.as_str())
    }
}

impl From<FieldRef> for String {
    fn from(f: FieldRef) -> Self {
        f.to_string()
    }
}
