//! Runtime value model for the membership resolution engine.
//!
//! The engine only ever *inspects* values: it reads tags, follows handles
//! into the native heap, and reads foreign descriptors.  It never mutates a
//! value, so everything here is cheap to clone and free of interior
//! mutability.
//!
//! Tags cover the full guest-language surface plus the foreign boundary:
//!
//! - primitives: `Undefined`, `Null`, `Bool`, `Number`, `BigInt`, `Str`,
//!   `Symbol`
//! - native heap references: `Object`, `Function`
//! - host boundary: `Foreign` (opaque handle + descriptor, see
//!   [`crate::foreign`])

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::foreign::ForeignObject;

// ---------------------------------------------------------------------------
// Id newtypes
// ---------------------------------------------------------------------------

/// Unique symbol identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SymbolId(pub u32);

/// Opaque handle referencing a native object on the managed heap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ObjectHandle(pub u32);

/// Opaque handle referencing a native function on the managed heap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct FunctionId(pub u32);

/// Opaque handle into the host environment.  The engine never interprets
/// this beyond identity comparison; only the host boundary can dereference
/// it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ForeignHandle(pub u64);

// ---------------------------------------------------------------------------
// Value — the guest-language runtime value
// ---------------------------------------------------------------------------

/// A guest-language runtime value.
///
/// `Number` carries an `f64`, so the enum is `PartialEq` but not `Eq`.
/// `Foreign` carries a descriptor trait object, so the enum is not
/// serializable; identity of foreign values is by [`ForeignHandle`].
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Undefined,
    Null,
    Bool(bool),
    Number(f64),
    BigInt(i64),
    Str(String),
    Symbol(SymbolId),
    Object(ObjectHandle),
    Function(FunctionId),
    Foreign(ForeignObject),
}

impl Value {
    /// Is this a native (non-foreign) object?
    pub fn is_object(&self) -> bool {
        matches!(self, Self::Object(_))
    }

    /// Is this a native invocable value?
    pub fn is_callable(&self) -> bool {
        matches!(self, Self::Function(_))
    }

    /// Did this value cross the host boundary?
    pub fn is_foreign(&self) -> bool {
        matches!(self, Self::Foreign(_))
    }

    /// `typeof`-style tag name.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Undefined => "undefined",
            Self::Null => "null",
            Self::Bool(_) => "boolean",
            Self::Number(_) => "number",
            Self::BigInt(_) => "bigint",
            Self::Str(_) => "string",
            Self::Symbol(_) => "symbol",
            Self::Object(_) => "object",
            Self::Function(_) => "function",
            Self::Foreign(_) => "foreign",
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Undefined => write!(f, "undefined"),
            Self::Null => write!(f, "null"),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Number(n) => write!(f, "{n}"),
            Self::BigInt(n) => write!(f, "{n}n"),
            Self::Str(s) => write!(f, "{s}"),
            Self::Symbol(id) => write!(f, "Symbol({})", id.0),
            Self::Object(h) => write!(f, "[object#{}]", h.0),
            Self::Function(id) => write!(f, "[function#{}]", id.0),
            Self::Foreign(obj) => write!(f, "[foreign#{}]", obj.handle().0),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
