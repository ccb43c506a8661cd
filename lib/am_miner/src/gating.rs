//! Static tables deciding which values are worth tracking.

use am_ir::methods::MethodRef;
use am_ir::types::Type;
use lazy_static::lazy_static;
use std::collections::BTreeSet;

lazy_static! {
    /// Reference types whose values can be compared symbolically.
    pub static ref ALLOWED_CLASS_TYPES: BTreeSet<&'static str> = [
        "java.lang.String",
        "java.lang.Integer",
        "java.lang.Long",
        "java.lang.Short",
        "java.lang.Byte",
        "java.lang.Float",
        "java.lang.Double",
        "java.lang.Boolean",
        "java.lang.Character",
        "java.math.BigDecimal",
        "java.math.BigInteger",
        "java.lang.Number",
        "java.util.concurrent.atomic.AtomicInteger",
        "java.util.concurrent.atomic.AtomicLong",
    ]
    .into_iter()
    .collect();

    /// Classes whose method results are never tracked.
    pub static ref UNTRACKABLE_CLASSES: BTreeSet<&'static str> =
        ["android.os.Bundle"].into_iter().collect();
}

/// Primitive types, allowed classes, and arrays of those.
#[must_use]
pub fn is_allowed_type(ty: &Type) -> bool {
    match ty.base_type() {
        Type::Class(name) => ALLOWED_CLASS_TYPES.contains(name.as_str()),
        base => base.is_primitive(),
    }
}

#[must_use]
pub fn is_untrackable(method: &MethodRef) -> bool {
    UNTRACKABLE_CLASSES.contains(method.declaring_class())
}
