//! Conformance catalog for the membership engine.
//!
//! The catalog is a serde-described list of membership cases distilled from
//! the cross-language `instanceof` interop surface: the primitive-left false
//! grid, transitive class/interface/root membership, the strict operator
//! `TypeError` cases, and the permissive direct-hook cases.  Each case names
//! its operands symbolically so the whole catalog is serializable, stable,
//! and digestible; [`catalog_digest`] fingerprints the canonical JSON
//! encoding so drift is detectable.
//!
//! [`run_catalog`] executes cases against a scripted host universe and the
//! resolver, producing a serializable report.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::foreign::{ForeignDescriptor, ForeignObject, MetaObject};
use crate::native_heap::NativeHeap;
use crate::resolver::{MembershipError, MembershipResolver};
use crate::value::{ForeignHandle, Value};

pub const CATALOG_SCHEMA_VERSION: &str = "membrane-engine.membership-conformance.v1";

// ---------------------------------------------------------------------------
// HostUniverse — scripted host type system
// ---------------------------------------------------------------------------

/// Index of a type defined in a [`HostUniverse`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TypeIndex(usize);

#[derive(Debug)]
enum HostTypeKind {
    Class {
        superclass: Option<TypeIndex>,
        constructible: bool,
    },
    Interface {
        extends: Vec<TypeIndex>,
    },
}

#[derive(Debug)]
struct HostTypeDef {
    name: String,
    kind: HostTypeKind,
    /// Interfaces a class directly implements (empty for interfaces).
    implements: Vec<TypeIndex>,
    /// Stable foreign identity of the type object itself.
    handle: ForeignHandle,
}

#[derive(Debug, Default)]
struct UniverseState {
    types: Vec<HostTypeDef>,
    /// Instance identity -> concrete class.
    instances: BTreeMap<ForeignHandle, TypeIndex>,
    next_handle: u64,
}

impl UniverseState {
    fn fresh_handle(&mut self) -> ForeignHandle {
        let handle = ForeignHandle(self.next_handle);
        self.next_handle += 1;
        handle
    }

    /// Transitive subtype check: class/interface graph reachability from
    /// `subject` up through superclasses, implemented interfaces, and
    /// superinterfaces.
    fn is_subtype(&self, subject: TypeIndex, target: TypeIndex) -> bool {
        let mut pending = vec![subject];
        let mut seen = vec![false; self.types.len()];
        while let Some(current) = pending.pop() {
            if current == target {
                return true;
            }
            if seen[current.0] {
                continue;
            }
            seen[current.0] = true;
            let def = &self.types[current.0];
            match &def.kind {
                HostTypeKind::Class { superclass, .. } => {
                    if let Some(parent) = superclass {
                        pending.push(*parent);
                    }
                    pending.extend(def.implements.iter().copied());
                }
                HostTypeKind::Interface { extends } => {
                    pending.extend(extends.iter().copied());
                }
            }
        }
        false
    }
}

/// A scripted host type system: classes with single inheritance, implemented
/// interfaces, interface extension, and a universal root class.  Membership
/// is computed transitively on this side of the boundary, honoring the
/// descriptor contract that the engine never walks foreign hierarchies.
#[derive(Debug, Clone, Default)]
pub struct HostUniverse {
    state: Arc<Mutex<UniverseState>>,
}

impl HostUniverse {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, UniverseState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Define the universal root class (no superclass, constructible).
    pub fn define_root_class(&self, name: &str) -> TypeIndex {
        self.define(name, HostTypeKind::Class { superclass: None, constructible: true }, vec![])
    }

    /// Define a class.  `constructible: false` models utility classes that
    /// are types but cannot be constructed from guest code.
    pub fn define_class(
        &self,
        name: &str,
        superclass: TypeIndex,
        implements: &[TypeIndex],
        constructible: bool,
    ) -> TypeIndex {
        self.define(
            name,
            HostTypeKind::Class {
                superclass: Some(superclass),
                constructible,
            },
            implements.to_vec(),
        )
    }

    /// Define an interface, optionally extending other interfaces.
    pub fn define_interface(&self, name: &str, extends: &[TypeIndex]) -> TypeIndex {
        self.define(
            name,
            HostTypeKind::Interface {
                extends: extends.to_vec(),
            },
            vec![],
        )
    }

    fn define(&self, name: &str, kind: HostTypeKind, implements: Vec<TypeIndex>) -> TypeIndex {
        let mut state = self.state();
        let handle = state.fresh_handle();
        let index = TypeIndex(state.types.len());
        state.types.push(HostTypeDef {
            name: name.to_string(),
            kind,
            implements,
            handle,
        });
        index
    }

    /// Look up a type by name.
    pub fn type_by_name(&self, name: &str) -> Option<TypeIndex> {
        self.state()
            .types
            .iter()
            .position(|def| def.name == name)
            .map(TypeIndex)
    }

    /// The guest-visible value for a type: a foreign meta object.
    pub fn type_value(&self, index: TypeIndex) -> Value {
        let handle = self.state().types[index.0].handle;
        Value::Foreign(ForeignObject::new(
            handle,
            Arc::new(HostTypeDescriptor {
                universe: self.clone(),
                index,
            }),
        ))
    }

    /// Construct a fresh instance of a class: a foreign value that is
    /// neither a meta object nor instantiable.
    pub fn new_instance(&self, class: TypeIndex) -> Value {
        let handle = {
            let mut state = self.state();
            let handle = state.fresh_handle();
            state.instances.insert(handle, class);
            handle
        };
        Value::Foreign(ForeignObject::new(handle, Arc::new(HostInstanceDescriptor)))
    }

    /// A foreign value that is invocable as a constructor but denotes no
    /// type (a host factory function).
    pub fn new_factory(&self) -> Value {
        let handle = self.state().fresh_handle();
        Value::Foreign(ForeignObject::new(handle, Arc::new(HostFactoryDescriptor)))
    }
}

/// Descriptor for a host type object: a meta object, instantiable iff the
/// underlying class is constructible.
#[derive(Debug)]
struct HostTypeDescriptor {
    universe: HostUniverse,
    index: TypeIndex,
}

impl ForeignDescriptor for HostTypeDescriptor {
    fn is_instantiable(&self) -> bool {
        let state = self.universe.state();
        match state.types[self.index.0].kind {
            HostTypeKind::Class { constructible, .. } => constructible,
            HostTypeKind::Interface { .. } => false,
        }
    }

    fn meta_object(&self) -> Option<&dyn MetaObject> {
        Some(self)
    }
}

impl MetaObject for HostTypeDescriptor {
    fn instance_check(&self, candidate: &Value) -> bool {
        let Value::Foreign(object) = candidate else {
            return false;
        };
        let state = self.universe.state();
        match state.instances.get(&object.handle()) {
            Some(class) => state.is_subtype(*class, self.index),
            None => false,
        }
    }
}

/// Descriptor for a host instance: no facets at all.
#[derive(Debug)]
struct HostInstanceDescriptor;

impl ForeignDescriptor for HostInstanceDescriptor {
    fn is_instantiable(&self) -> bool {
        false
    }

    fn meta_object(&self) -> Option<&dyn MetaObject> {
        None
    }
}

/// Descriptor for a host factory: instantiable, but not a meta object.
#[derive(Debug)]
struct HostFactoryDescriptor;

impl ForeignDescriptor for HostFactoryDescriptor {
    fn is_instantiable(&self) -> bool {
        true
    }

    fn meta_object(&self) -> Option<&dyn MetaObject> {
        None
    }
}

// ---------------------------------------------------------------------------
// Case records
// ---------------------------------------------------------------------------

/// Symbolic description of an operand, resolvable against the scenario
/// fixture.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperandSpec {
    Null,
    Undefined,
    BoolTrue,
    NumberFortyTwo,
    BigIntFortyTwo,
    StrFoo,
    FreshSymbol,
    PlainObject,
    NativeFunction,
    /// The foreign meta object for the named scenario type.
    HostType(String),
    /// The shared scenario instance of the named class (one per class,
    /// memoized across cases).
    HostInstance(String),
    /// A freshly constructed instance of the named class.
    FreshHostInstance(String),
}

/// Which entry point a case exercises.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CaseOperation {
    /// `left instanceof right` — strict.
    Operator,
    /// `hasInstance(right, left)` — permissive.
    DirectHook,
}

/// Expected (or observed) outcome of a case.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CaseOutcome {
    Holds,
    DoesNotHold,
    TypeError,
}

/// One membership conformance case.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MembershipCaseSpec {
    pub case_id: String,
    pub operation: CaseOperation,
    pub left: OperandSpec,
    pub right: OperandSpec,
    pub expected: CaseOutcome,
}

impl MembershipCaseSpec {
    fn operator(id: &str, left: OperandSpec, right: OperandSpec, expected: CaseOutcome) -> Self {
        Self {
            case_id: id.to_string(),
            operation: CaseOperation::Operator,
            left,
            right,
            expected,
        }
    }

    fn direct_hook(id: &str, left: OperandSpec, right: OperandSpec, expected: CaseOutcome) -> Self {
        Self {
            case_id: id.to_string(),
            operation: CaseOperation::DirectHook,
            left,
            right,
            expected,
        }
    }
}

// ---------------------------------------------------------------------------
// The catalog
// ---------------------------------------------------------------------------

/// Scenario type names used by the catalog.
pub const ROOT_CLASS: &str = "AnyRef";
pub const SLICE_INTERFACE: &str = "TextSlice";
pub const BUILDER_CLASS: &str = "TextBuilder";
pub const TASK_INTERFACE: &str = "Task";
pub const INSPECTOR_INTERFACE: &str = "Inspector";
pub const CALCULATOR_CLASS: &str = "Calculator";

/// The standard scenario universe: a root class, two unrelated interfaces,
/// a non-constructible utility class, and a concrete class implementing an
/// interface.
pub fn scenario_universe() -> HostUniverse {
    let universe = HostUniverse::new();
    let root = universe.define_root_class(ROOT_CLASS);
    let slice = universe.define_interface(SLICE_INTERFACE, &[]);
    universe.define_class(BUILDER_CLASS, root, &[slice], true);
    universe.define_interface(TASK_INTERFACE, &[]);
    universe.define_interface(INSPECTOR_INTERFACE, &[]);
    universe.define_class(CALCULATOR_CLASS, root, &[], false);
    universe
}

/// The full membership conformance catalog.
pub fn membership_conformance_catalog() -> Vec<MembershipCaseSpec> {
    use CaseOutcome::{DoesNotHold, Holds, TypeError};
    use OperandSpec::*;

    let mut cases = Vec::new();

    // Primitive / native left operands are never members of a foreign type,
    // across an interface, an unrelated interface, and a utility class.
    let primitives: [(&str, OperandSpec); 9] = [
        ("null", Null),
        ("undefined", Undefined),
        ("bool", BoolTrue),
        ("number", NumberFortyTwo),
        ("bigint", BigIntFortyTwo),
        ("string", StrFoo),
        ("symbol", FreshSymbol),
        ("plain-object", PlainObject),
        ("native-function", NativeFunction),
    ];
    for type_name in [TASK_INTERFACE, INSPECTOR_INTERFACE, CALCULATOR_CLASS] {
        for (label, operand) in &primitives {
            cases.push(MembershipCaseSpec::operator(
                &format!("{label}-not-member-of-{}", type_name.to_lowercase()),
                operand.clone(),
                HostType(type_name.to_string()),
                DoesNotHold,
            ));
        }
    }

    // Transitive membership of a concrete-class instance.
    cases.push(MembershipCaseSpec::operator(
        "builder-instance-of-its-class",
        HostInstance(BUILDER_CLASS.to_string()),
        HostType(BUILDER_CLASS.to_string()),
        Holds,
    ));
    cases.push(MembershipCaseSpec::operator(
        "builder-instance-of-implemented-interface",
        HostInstance(BUILDER_CLASS.to_string()),
        HostType(SLICE_INTERFACE.to_string()),
        Holds,
    ));
    cases.push(MembershipCaseSpec::operator(
        "builder-instance-of-root-class",
        HostInstance(BUILDER_CLASS.to_string()),
        HostType(ROOT_CLASS.to_string()),
        Holds,
    ));
    cases.push(MembershipCaseSpec::operator(
        "builder-not-instance-of-unrelated-interface",
        HostInstance(BUILDER_CLASS.to_string()),
        HostType(TASK_INTERFACE.to_string()),
        DoesNotHold,
    ));

    // A fresh instance on the right is not a meta object.
    cases.push(MembershipCaseSpec::operator(
        "fresh-instance-right-operand-throws",
        HostInstance(BUILDER_CLASS.to_string()),
        FreshHostInstance(ROOT_CLASS.to_string()),
        TypeError,
    ));

    // Direct hook invocations stay permissive: false, never a throw, for an
    // instantiable meta type and for a non-instantiable interface alike.
    cases.push(MembershipCaseSpec::direct_hook(
        "hook-false-for-instantiable-root-class",
        HostInstance(BUILDER_CLASS.to_string()),
        HostType(ROOT_CLASS.to_string()),
        DoesNotHold,
    ));
    cases.push(MembershipCaseSpec::direct_hook(
        "hook-false-for-non-instantiable-interface",
        HostInstance(BUILDER_CLASS.to_string()),
        HostType(TASK_INTERFACE.to_string()),
        DoesNotHold,
    ));

    cases
}

/// Hex sha-256 over the canonical JSON encoding of the catalog.
pub fn catalog_digest(cases: &[MembershipCaseSpec]) -> String {
    let bytes = serde_json::to_vec(cases).unwrap_or_default();
    sha256_hex(&bytes)
}

fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    let digest = hasher.finalize();
    let mut out = String::with_capacity(digest.len() * 2);
    for byte in digest {
        out.push_str(&format!("{byte:02x}"));
    }
    out
}

// ---------------------------------------------------------------------------
// Running the catalog
// ---------------------------------------------------------------------------

/// Verdict for one executed case.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaseVerdict {
    pub case_id: String,
    pub expected: CaseOutcome,
    pub actual: CaseOutcome,
    pub pass: bool,
    /// Error message when the actual outcome was a `TypeError`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Full report over a catalog run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConformanceReport {
    pub schema_version: String,
    pub catalog_digest: String,
    pub case_count: usize,
    pub failed_count: usize,
    pub verdicts: Vec<CaseVerdict>,
}

impl ConformanceReport {
    pub fn all_passed(&self) -> bool {
        self.failed_count == 0
    }
}

/// Execute the catalog against the standard scenario universe.
pub fn run_catalog(cases: &[MembershipCaseSpec]) -> ConformanceReport {
    let universe = scenario_universe();
    let mut heap = NativeHeap::new();
    let resolver = MembershipResolver::new();
    // Shared instances, one per class, reused across cases.
    let mut shared_instances: BTreeMap<String, Value> = BTreeMap::new();

    let mut verdicts = Vec::with_capacity(cases.len());
    for case in cases {
        let left = build_operand(&case.left, &universe, &mut heap, &mut shared_instances);
        let right = build_operand(&case.right, &universe, &mut heap, &mut shared_instances);
        let (actual, error) = match case.operation {
            CaseOperation::Operator => match resolver.resolve(&heap, &left, &right) {
                Ok(true) => (CaseOutcome::Holds, None),
                Ok(false) => (CaseOutcome::DoesNotHold, None),
                Err(MembershipError::TypeError(msg)) => (CaseOutcome::TypeError, Some(msg)),
            },
            CaseOperation::DirectHook => {
                if resolver.has_instance(&heap, &right, &left) {
                    (CaseOutcome::Holds, None)
                } else {
                    (CaseOutcome::DoesNotHold, None)
                }
            }
        };
        verdicts.push(CaseVerdict {
            case_id: case.case_id.clone(),
            expected: case.expected,
            actual,
            pass: actual == case.expected,
            error,
        });
    }

    let failed_count = verdicts.iter().filter(|v| !v.pass).count();
    ConformanceReport {
        schema_version: CATALOG_SCHEMA_VERSION.to_string(),
        catalog_digest: catalog_digest(cases),
        case_count: verdicts.len(),
        failed_count,
        verdicts,
    }
}

fn build_operand(
    spec: &OperandSpec,
    universe: &HostUniverse,
    heap: &mut NativeHeap,
    shared_instances: &mut BTreeMap<String, Value>,
) -> Value {
    match spec {
        OperandSpec::Null => Value::Null,
        OperandSpec::Undefined => Value::Undefined,
        OperandSpec::BoolTrue => Value::Bool(true),
        OperandSpec::NumberFortyTwo => Value::Number(42.0),
        OperandSpec::BigIntFortyTwo => Value::BigInt(42),
        OperandSpec::StrFoo => Value::Str("foo".to_string()),
        OperandSpec::FreshSymbol => Value::Symbol(heap.alloc_symbol()),
        OperandSpec::PlainObject => Value::Object(heap.alloc_object()),
        OperandSpec::NativeFunction => Value::Function(heap.alloc_function()),
        OperandSpec::HostType(name) => {
            // An unknown name is a catalog authoring bug; surface it as a
            // value no case expects so the verdict fails loudly.
            match universe.type_by_name(name) {
                Some(index) => universe.type_value(index),
                None => Value::Undefined,
            }
        }
        OperandSpec::HostInstance(name) => shared_instances
            .entry(name.clone())
            .or_insert_with(|| fresh_instance(universe, name))
            .clone(),
        OperandSpec::FreshHostInstance(name) => fresh_instance(universe, name),
    }
}

fn fresh_instance(universe: &HostUniverse, class_name: &str) -> Value {
    match universe.type_by_name(class_name) {
        Some(index) => universe.new_instance(index),
        None => Value::Undefined,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
