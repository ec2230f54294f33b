//! Host boundary: foreign objects and their descriptors.
//!
//! A foreign value is an opaque handle into the host environment plus a
//! [`ForeignDescriptor`] produced by the host's `describe` when the value is
//! wrapped.  The descriptor has two independent facets:
//!
//! - **instantiable**: the value can be invoked as a constructor;
//! - **meta object**: the value denotes a type (class or interface) and may
//!   legally appear as the right-hand operand of a membership test.
//!
//! The facets are independent booleans; all four combinations are legal.
//! The membership predicate itself lives on [`MetaObject`] and is reachable
//! only through [`ForeignDescriptor::meta_object`], so a descriptor that is
//! not a meta object structurally cannot expose a usable `instance_check`.
//!
//! Descriptor facets must be stable for the lifetime of the object identity
//! they describe: the engine may read them any number of times and assumes
//! no facet changes between reads.

use std::fmt;
use std::sync::Arc;

use crate::value::{ForeignHandle, Value};

// ---------------------------------------------------------------------------
// MetaObject — the host-side membership predicate
// ---------------------------------------------------------------------------

/// A foreign type (class or interface) as seen by the engine.
///
/// `instance_check` carries the whole transitivity burden: a concrete-class
/// instance is a member of every superclass, every implemented interface,
/// and the universal root type, and the host must account for all of that
/// itself.  The engine never walks foreign hierarchies.
///
/// The predicate is total over every [`Value`] tag and never panics.
/// Non-foreign candidates (primitives, native objects, native functions)
/// are never members of a foreign type, so the host must answer `false` for
/// them without attempting any coercion.
pub trait MetaObject: fmt::Debug {
    /// Is `candidate` a member of the type this meta object represents?
    fn instance_check(&self, candidate: &Value) -> bool;
}

// ---------------------------------------------------------------------------
// ForeignDescriptor — stable facets of a foreign value
// ---------------------------------------------------------------------------

/// Metadata about a foreign value, produced by the host boundary.
pub trait ForeignDescriptor: fmt::Debug {
    /// Can this foreign value be invoked as a constructor?
    ///
    /// Independent of [`Self::meta_object`]: "can be constructed" and "is a
    /// type usable as a membership target" must never be conflated.
    fn is_instantiable(&self) -> bool;

    /// The type this value denotes, if it denotes one.
    ///
    /// `None` means the value is not a meta object and cannot legally stand
    /// on the right of a membership operator.
    fn meta_object(&self) -> Option<&dyn MetaObject>;

    /// Does this foreign value denote a type?
    fn is_meta_object(&self) -> bool {
        self.meta_object().is_some()
    }
}

// ---------------------------------------------------------------------------
// ForeignObject — handle + descriptor
// ---------------------------------------------------------------------------

/// A guest-visible wrapper around a host value.
///
/// Identity is the handle; the descriptor is carried alongside so the engine
/// never has to call back into the host just to learn the facets.
#[derive(Clone)]
pub struct ForeignObject {
    handle: ForeignHandle,
    descriptor: Arc<dyn ForeignDescriptor + Send + Sync>,
}

impl ForeignObject {
    /// Wrap a host handle with the descriptor the host's `describe`
    /// produced for it.
    pub fn new(handle: ForeignHandle, descriptor: Arc<dyn ForeignDescriptor + Send + Sync>) -> Self {
        Self { handle, descriptor }
    }

    /// The opaque host handle.
    pub fn handle(&self) -> ForeignHandle {
        self.handle
    }

    /// The host-produced descriptor.
    pub fn descriptor(&self) -> &dyn ForeignDescriptor {
        self.descriptor.as_ref()
    }
}

impl fmt::Debug for ForeignObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ForeignObject")
            .field("handle", &self.handle)
            .field("descriptor", &self.descriptor)
            .finish()
    }
}

impl PartialEq for ForeignObject {
    fn eq(&self, other: &Self) -> bool {
        self.handle == other.handle
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
