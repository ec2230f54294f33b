//! Membership resolution: `instanceof` over native and foreign operands.
//!
//! Two entry points with deliberately different failure behavior:
//!
//! - [`MembershipResolver::resolve`] is the operator path.  It is strict: a
//!   right-hand operand that is not a valid membership target raises the
//!   single error kind, `TypeError`.
//! - [`MembershipResolver::has_instance`] is the direct hook invocation (the
//!   guest-level `Function.prototype[@@hasInstance].call(T, v)`).  It is a
//!   permissive query primitive and never raises; anything the operator
//!   would reject degrades to `false`.
//!
//! Operator precedence, in order:
//!
//! 1. native function with a custom membership hook: delegate to the hook;
//! 2. foreign right operand: meta objects dispatch to the host's
//!    `instance_check`, everything else is a `TypeError`;
//! 3. native non-invocable object: `TypeError`;
//! 4. native function without a hook: ordinary prototype-chain membership.
//!
//! The resolver is stateless and pure: no caching, no mutation, identical
//! inputs give identical answers.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::native_heap::{NativeFunction, NativeHeap};
use crate::value::Value;

// ---------------------------------------------------------------------------
// MembershipError
// ---------------------------------------------------------------------------

/// The single error kind of the membership engine.
///
/// Raised synchronously on the operator path, never caught or transformed
/// internally, never produced by the hook path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
pub enum MembershipError {
    #[error("TypeError: {0}")]
    TypeError(String),
}

fn type_error(message: &str) -> MembershipError {
    MembershipError::TypeError(message.to_string())
}

// ---------------------------------------------------------------------------
// MembershipResolver
// ---------------------------------------------------------------------------

/// Stateless decision procedure for membership tests.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MembershipResolver;

impl MembershipResolver {
    pub fn new() -> Self {
        Self
    }

    /// The `left instanceof right` operator path.
    pub fn resolve(
        &self,
        heap: &NativeHeap,
        left: &Value,
        right: &Value,
    ) -> Result<bool, MembershipError> {
        match right {
            Value::Function(id) => {
                let function = heap
                    .function(*id)
                    .ok_or_else(|| type_error("dangling function handle on right-hand side of instanceof"))?;
                if let Some(hook) = &function.membership_hook {
                    return Ok(hook.call(left));
                }
                self.ordinary_has_instance(heap, function, left)
            }
            Value::Foreign(object) => match object.descriptor().meta_object() {
                Some(meta) => {
                    // Only foreign candidates can be members of a foreign
                    // type; everything else short-circuits before the host
                    // boundary, so no host-side coercion can occur.
                    if left.is_foreign() {
                        Ok(meta.instance_check(left))
                    } else {
                        Ok(false)
                    }
                }
                None => Err(type_error("right-hand side of instanceof is not a meta object")),
            },
            Value::Object(_) => Err(type_error("right-hand side of instanceof is not callable")),
            Value::Undefined
            | Value::Null
            | Value::Bool(_)
            | Value::Number(_)
            | Value::BigInt(_)
            | Value::Str(_)
            | Value::Symbol(_) => Err(type_error("right-hand side of instanceof is not an object")),
        }
    }

    /// Direct invocation of the membership hook with an arbitrary candidate
    /// type: `hasInstance(candidate_type, instance)`.
    ///
    /// Never raises.  In particular, a foreign candidate type yields `false`
    /// for every facet combination, instantiable and meta included: foreign
    /// types never participate in ordinary native membership, and this entry
    /// point is the ordinary mechanism.  The operator path above throws for
    /// some of the same operands; that asymmetry is part of the contract.
    pub fn has_instance(&self, heap: &NativeHeap, candidate_type: &Value, instance: &Value) -> bool {
        match candidate_type {
            Value::Function(id) => {
                let Some(function) = heap.function(*id) else {
                    return false;
                };
                if let Some(hook) = &function.membership_hook {
                    return hook.call(instance);
                }
                self.ordinary_has_instance(heap, function, instance)
                    .unwrap_or(false)
            }
            Value::Foreign(_) => false,
            Value::Undefined
            | Value::Null
            | Value::Bool(_)
            | Value::Number(_)
            | Value::BigInt(_)
            | Value::Str(_)
            | Value::Symbol(_)
            | Value::Object(_) => false,
        }
    }

    /// Ordinary membership: does `left`'s prototype chain contain the
    /// function's `.prototype` object?
    fn ordinary_has_instance(
        &self,
        heap: &NativeHeap,
        function: &NativeFunction,
        left: &Value,
    ) -> Result<bool, MembershipError> {
        let target = function
            .prototype
            .ok_or_else(|| type_error("function has non-object prototype in instanceof check"))?;
        match left {
            Value::Object(handle) => Ok(heap.prototype_chain(*handle).any(|h| h == target)),
            _ => Ok(false),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
