#![forbid(unsafe_code)]
//! Cross-language `instanceof` membership resolution.
//!
//! When a guest scripting language interoperates with a foreign object
//! system, the right-hand side of a membership test can be a native
//! constructor, a foreign class or interface object, or an arbitrary
//! foreign object that is not type-like at all.  This crate implements the
//! decision procedure that sorts those cases out:
//!
//! - [`value::Value`] — the guest value model, primitives through foreign
//!   wrappers;
//! - [`native_heap::NativeHeap`] — the minimal native object store
//!   (prototype chains, per-function membership hooks);
//! - [`foreign`] — the host boundary: descriptors and the host-side
//!   membership predicate;
//! - [`resolver::MembershipResolver`] — the strict operator path and the
//!   permissive direct-hook path;
//! - [`conformance`] — the serializable conformance catalog, scripted host
//!   universe, and report runner.

pub mod conformance;
pub mod foreign;
pub mod native_heap;
pub mod resolver;
pub mod value;

pub use foreign::{ForeignDescriptor, ForeignObject, MetaObject};
pub use native_heap::{MembershipHook, NativeHeap};
pub use resolver::{MembershipError, MembershipResolver};
pub use value::Value;
