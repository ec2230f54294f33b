//! Minimal native object store: just enough of the guest object model for
//! prototype-chain membership.
//!
//! Native objects carry only a `[[Prototype]]` slot; native functions carry
//! a `.prototype` object plus an optional per-function membership hook (the
//! guest language's overridable has-instance slot, modeled as a field
//! instead of a mutable well-known-symbol table).
//!
//! Chain walks are guarded the same way the full object model guards them:
//! a visited set for cycles and a hard depth cap.

use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

use crate::value::{FunctionId, ObjectHandle, SymbolId, Value};

/// Maximum prototype chain depth to prevent runaway walks.
pub const MAX_PROTOTYPE_CHAIN_DEPTH: u32 = 1024;

// ---------------------------------------------------------------------------
// MembershipHook — per-function custom has-instance
// ---------------------------------------------------------------------------

/// A per-function custom membership predicate.
///
/// When present on a [`NativeFunction`], it takes precedence over every
/// other membership rule, foreign dispatch included.
#[derive(Clone)]
pub struct MembershipHook(Arc<dyn Fn(&Value) -> bool + Send + Sync>);

impl MembershipHook {
    pub fn new(hook: impl Fn(&Value) -> bool + Send + Sync + 'static) -> Self {
        Self(Arc::new(hook))
    }

    /// Invoke the hook with the left-hand operand.
    pub fn call(&self, left: &Value) -> bool {
        (self.0)(left)
    }
}

impl fmt::Debug for MembershipHook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("MembershipHook(..)")
    }
}

// ---------------------------------------------------------------------------
// NativeObject / NativeFunction
// ---------------------------------------------------------------------------

/// An ordinary native object, reduced to its `[[Prototype]]` slot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NativeObject {
    /// `[[Prototype]]` internal slot (`None` means end of chain).
    pub prototype: Option<ObjectHandle>,
}

/// A native invocable value.
#[derive(Debug, Clone, Default)]
pub struct NativeFunction {
    /// The function's `.prototype` object, compared against left-operand
    /// chains by ordinary membership.
    pub prototype: Option<ObjectHandle>,
    /// Custom membership hook; overrides ordinary membership when set.
    pub membership_hook: Option<MembershipHook>,
}

// ---------------------------------------------------------------------------
// NativeHeap — arena of native objects and functions
// ---------------------------------------------------------------------------

/// Arena store for native objects and functions.
///
/// Handles are indices; the heap never frees, so a handle it issued stays
/// valid for the heap's lifetime.  Lookups are still checked: a handle from
/// a different heap returns `None` instead of panicking.
#[derive(Debug, Clone, Default)]
pub struct NativeHeap {
    objects: Vec<NativeObject>,
    functions: Vec<NativeFunction>,
    next_symbol: u32,
}

impl NativeHeap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate an object with no prototype.
    pub fn alloc_object(&mut self) -> ObjectHandle {
        self.alloc_object_with_prototype(None)
    }

    /// Allocate an object with the given prototype.
    pub fn alloc_object_with_prototype(&mut self, proto: Option<ObjectHandle>) -> ObjectHandle {
        let handle = ObjectHandle(self.objects.len() as u32);
        self.objects.push(NativeObject { prototype: proto });
        handle
    }

    /// Allocate a plain function with a fresh `.prototype` object.
    pub fn alloc_function(&mut self) -> FunctionId {
        let proto = self.alloc_object();
        self.alloc_function_raw(NativeFunction {
            prototype: Some(proto),
            membership_hook: None,
        })
    }

    /// Allocate a function with a custom membership hook and a fresh
    /// `.prototype` object.
    pub fn alloc_function_with_hook(&mut self, hook: MembershipHook) -> FunctionId {
        let proto = self.alloc_object();
        self.alloc_function_raw(NativeFunction {
            prototype: Some(proto),
            membership_hook: Some(hook),
        })
    }

    /// Allocate a function exactly as described (e.g. without a
    /// `.prototype`, for exercising the degenerate paths).
    pub fn alloc_function_raw(&mut self, function: NativeFunction) -> FunctionId {
        let id = FunctionId(self.functions.len() as u32);
        self.functions.push(function);
        id
    }

    /// Allocate a new unique symbol id.
    pub fn alloc_symbol(&mut self) -> SymbolId {
        let id = SymbolId(self.next_symbol);
        self.next_symbol += 1;
        id
    }

    /// Checked object lookup.
    pub fn object(&self, handle: ObjectHandle) -> Option<&NativeObject> {
        self.objects.get(handle.0 as usize)
    }

    /// Checked function lookup.
    pub fn function(&self, id: FunctionId) -> Option<&NativeFunction> {
        self.functions.get(id.0 as usize)
    }

    /// Mutable function lookup (for wiring hooks after allocation).
    pub fn function_mut(&mut self, id: FunctionId) -> Option<&mut NativeFunction> {
        self.functions.get_mut(id.0 as usize)
    }

    /// Number of objects allocated.
    pub fn object_count(&self) -> usize {
        self.objects.len()
    }

    /// Number of functions allocated.
    pub fn function_count(&self) -> usize {
        self.functions.len()
    }

    /// Walk the prototype chain starting *above* `start`, yielding each
    /// ancestor handle.  Stops at a dangling handle, at chain end, on a
    /// cycle, or at the depth cap.
    pub fn prototype_chain(&self, start: ObjectHandle) -> PrototypeChain<'_> {
        PrototypeChain {
            heap: self,
            current: self.object(start).and_then(|o| o.prototype),
            visited: BTreeSet::from([start]),
            depth: 0,
        }
    }
}

/// Iterator over the ancestors of an object, cycle- and depth-guarded.
#[derive(Debug)]
pub struct PrototypeChain<'a> {
    heap: &'a NativeHeap,
    current: Option<ObjectHandle>,
    visited: BTreeSet<ObjectHandle>,
    depth: u32,
}

impl Iterator for PrototypeChain<'_> {
    type Item = ObjectHandle;

    fn next(&mut self) -> Option<ObjectHandle> {
        let handle = self.current?;
        if self.depth >= MAX_PROTOTYPE_CHAIN_DEPTH || !self.visited.insert(handle) {
            self.current = None;
            return None;
        }
        let Some(object) = self.heap.object(handle) else {
            self.current = None;
            return None;
        };
        self.depth += 1;
        self.current = object.prototype;
        Some(handle)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
