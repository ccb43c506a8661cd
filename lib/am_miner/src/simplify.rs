//! Post-processing of the pairs extracted at a start node.

use crate::errors::{MinerError, MinerResult};
use crate::value_pair::ValuePair;
use am_ir::data::DataWrapper;
use am_ir::identifier::Part;

/// Sub-signature of `Object.equals`.
pub const EQUALS_SUB_SIGNATURE: &str = "boolean equals(java.lang.Object)";

/// Resolved values nested in `op` when its identifier calls exactly one
/// method with the given sub-signature.
#[must_use]
pub fn args_of_method_sub_signature(op: &DataWrapper, sub_signature: &str) -> Option<Vec<DataWrapper>> {
    let mut args = Vec::new();
    let mut found = 0;
    for part in op.parts() {
        match part {
            Part::Data { data } => args.push((**data).clone()),
            Part::MethodRef { method } if method.sub_signature() == sub_signature => found += 1,
            _ => (),
        }
    }
    (found == 1).then_some(args)
}

fn unwrap_equals(args: Vec<DataWrapper>, pair: &ValuePair) -> MinerResult<ValuePair> {
    match <[DataWrapper; 2]>::try_from(args) {
        Ok([a, b]) => Ok(ValuePair::derived(a, Some(b), pair)),
        Err(args) => Err(MinerError::MalformedEquals {
            pair: pair.to_string(),
            args: args.len(),
        }),
    }
}

/// Replaces `a.equals(b)` operands with the `(a, b)` comparison they stand for.
///
/// Two-operand pairs are only unwrapped when exactly one operand is an
/// equals call.
pub fn simplify_equals_pairs(pairs: Vec<ValuePair>) -> MinerResult<Vec<ValuePair>> {
    pairs
        .into_iter()
        .map(|pair| match (pair.op1(), pair.op2()) {
            (Some(op), None) | (None, Some(op)) => {
                match args_of_method_sub_signature(op, EQUALS_SUB_SIGNATURE) {
                    Some(args) => unwrap_equals(args, &pair),
                    None => Ok(pair),
                }
            }
            (Some(op1), Some(op2)) => {
                let eq1 = args_of_method_sub_signature(op1, EQUALS_SUB_SIGNATURE);
                let eq2 = args_of_method_sub_signature(op2, EQUALS_SUB_SIGNATURE);
                match (eq1, eq2) {
                    (Some(args), None) | (None, Some(args)) => unwrap_equals(args, &pair),
                    _ => Ok(pair),
                }
            }
            (None, None) => Ok(pair),
        })
        .collect()
}

/// A value read from a boolean method or field.
#[must_use]
pub fn is_boolean_check(dw: &DataWrapper) -> bool {
    dw.parts().any(|part| match part {
        Part::MethodRef { method } => method.return_type().is_boolean(),
        Part::FieldRef { field } => field.ty().is_boolean(),
        _ => false,
    })
}

/// Keeps only the boolean flag of pairs comparing it to a non boolean value.
#[must_use]
pub fn simplify_boolean_checks(pairs: Vec<ValuePair>) -> Vec<ValuePair> {
    pairs
        .into_iter()
        .map(|pair| match (pair.op1(), pair.op2()) {
            (Some(op1), Some(op2)) => match (is_boolean_check(op1), is_boolean_check(op2)) {
                (true, false) => ValuePair::derived(op1.clone(), None, &pair),
                (false, true) => ValuePair::derived(op2.clone(), None, &pair),
                _ => pair,
            },
            _ => pair,
        })
        .collect()
}

/// Drops pairs that cannot be part of an access control check.
#[must_use]
pub fn remove_unwanted_pairs(mut pairs: Vec<ValuePair>) -> Vec<ValuePair> {
    pairs.retain(|p| {
        !(p.is_pair_with_same_values()
            || p.is_primitive_vs_primitive_check()
            || p.is_null_check()
            || p.size() == 0)
    });
    pairs
}

/// The whole simplification pipeline, unwanted pair removal last.
pub fn simplify_pairs(pairs: Vec<ValuePair>) -> MinerResult<Vec<ValuePair>> {
    let pairs = simplify_equals_pairs(pairs)?;
    let pairs = simplify_boolean_checks(pairs);
    Ok(remove_unwanted_pairs(pairs))
}
