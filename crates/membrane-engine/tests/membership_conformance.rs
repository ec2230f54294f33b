#![forbid(unsafe_code)]
//! Integration tests for cross-language membership resolution.
//!
//! Replicates the foreign-interop `instanceof` surface end to end against
//! the scripted host universe, from outside the crate boundary: the
//! primitive false grid, transitive class/interface/root membership, the
//! strict operator errors, and the permissive direct-hook asymmetry.

use membrane_engine::conformance::{
    BUILDER_CLASS, CALCULATOR_CLASS, HostUniverse, INSPECTOR_INTERFACE, ROOT_CLASS,
    SLICE_INTERFACE, TASK_INTERFACE, scenario_universe,
};
use membrane_engine::native_heap::MembershipHook;
use membrane_engine::resolver::MembershipError;
use membrane_engine::{MembershipResolver, NativeHeap, Value};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

struct Scenario {
    universe: HostUniverse,
    heap: NativeHeap,
    resolver: MembershipResolver,
    /// The shared concrete-class instance, analogous to the builder the
    /// original interop scenario constructs once and probes repeatedly.
    builder: Value,
}

impl Scenario {
    fn new() -> Self {
        let universe = scenario_universe();
        let builder_class = universe.type_by_name(BUILDER_CLASS).unwrap();
        let builder = universe.new_instance(builder_class);
        Self {
            universe,
            heap: NativeHeap::new(),
            resolver: MembershipResolver::new(),
            builder,
        }
    }

    fn host_type(&self, name: &str) -> Value {
        self.universe.type_value(self.universe.type_by_name(name).unwrap())
    }

    fn resolve(&self, left: &Value, right: &Value) -> Result<bool, MembershipError> {
        self.resolver.resolve(&self.heap, left, right)
    }

    fn has_instance(&self, candidate_type: &Value, instance: &Value) -> bool {
        self.resolver.has_instance(&self.heap, candidate_type, instance)
    }
}

fn non_foreign_values(heap: &mut NativeHeap) -> Vec<Value> {
    vec![
        Value::Null,
        Value::Undefined,
        Value::Bool(true),
        Value::Number(42.0),
        Value::BigInt(42),
        Value::Str("foo".to_string()),
        Value::Symbol(heap.alloc_symbol()),
        Value::Object(heap.alloc_object()),
        Value::Function(heap.alloc_function()),
    ]
}

fn assert_type_error(result: Result<bool, MembershipError>) {
    assert!(
        matches!(result, Err(MembershipError::TypeError(_))),
        "expected TypeError, got {result:?}"
    );
}

// ---------------------------------------------------------------------------
// 1. Primitive and native lefts are never members of a foreign type
// ---------------------------------------------------------------------------

#[test]
fn no_non_foreign_value_is_member_of_any_foreign_type() {
    let mut scenario = Scenario::new();
    let lefts = non_foreign_values(&mut scenario.heap);
    for type_name in [TASK_INTERFACE, INSPECTOR_INTERFACE, CALCULATOR_CLASS] {
        let ty = scenario.host_type(type_name);
        for left in &lefts {
            assert!(
                !scenario.resolve(left, &ty).unwrap(),
                "{left:?} instanceof {type_name}"
            );
        }
    }
}

// ---------------------------------------------------------------------------
// 2. Transitive membership through the host hierarchy
// ---------------------------------------------------------------------------

#[test]
fn builder_is_member_of_class_interface_and_root() {
    let scenario = Scenario::new();
    for type_name in [BUILDER_CLASS, SLICE_INTERFACE, ROOT_CLASS] {
        let ty = scenario.host_type(type_name);
        assert!(
            scenario.resolve(&scenario.builder, &ty).unwrap(),
            "builder instanceof {type_name}"
        );
    }
}

#[test]
fn builder_is_not_member_of_unrelated_type() {
    let scenario = Scenario::new();
    let task = scenario.host_type(TASK_INTERFACE);
    assert!(!scenario.resolve(&scenario.builder, &task).unwrap());
}

// ---------------------------------------------------------------------------
// 3. Strict operator path: invalid right operands throw
// ---------------------------------------------------------------------------

#[test]
fn fresh_foreign_instance_as_right_operand_throws() {
    let scenario = Scenario::new();
    let root_class = scenario.universe.type_by_name(ROOT_CLASS).unwrap();
    let fresh = scenario.universe.new_instance(root_class);
    assert_type_error(scenario.resolve(&scenario.builder, &fresh));
}

#[test]
fn instantiable_non_meta_foreign_right_operand_throws() {
    let scenario = Scenario::new();
    let factory = scenario.universe.new_factory();
    assert_type_error(scenario.resolve(&scenario.builder, &factory));
}

#[test]
fn native_non_invocable_right_operand_throws() {
    let mut scenario = Scenario::new();
    let plain = Value::Object(scenario.heap.alloc_object());
    assert_type_error(scenario.resolve(&scenario.builder, &plain));
    assert_type_error(scenario.resolve(&scenario.builder, &Value::Number(42.0)));
}

// ---------------------------------------------------------------------------
// 4. Permissive direct hook: false instead of throwing
// ---------------------------------------------------------------------------

#[test]
fn direct_hook_is_false_for_instantiable_host_class() {
    // The operator path accepts this right operand (and answers true); the
    // direct hook still answers false, because foreign types never
    // participate in ordinary native membership.
    let scenario = Scenario::new();
    let root = scenario.host_type(ROOT_CLASS);
    assert!(scenario.resolve(&scenario.builder, &root).unwrap());
    assert!(!scenario.has_instance(&root, &scenario.builder));
}

#[test]
fn direct_hook_is_false_for_non_instantiable_interface() {
    let scenario = Scenario::new();
    let task = scenario.host_type(TASK_INTERFACE);
    assert!(!scenario.has_instance(&task, &scenario.builder));
}

#[test]
fn direct_hook_is_false_where_operator_throws() {
    let scenario = Scenario::new();
    let factory = scenario.universe.new_factory();
    let root_class = scenario.universe.type_by_name(ROOT_CLASS).unwrap();
    let fresh = scenario.universe.new_instance(root_class);
    assert_type_error(scenario.resolve(&scenario.builder, &factory));
    assert_type_error(scenario.resolve(&scenario.builder, &fresh));
    assert!(!scenario.has_instance(&factory, &scenario.builder));
    assert!(!scenario.has_instance(&fresh, &scenario.builder));
}

// ---------------------------------------------------------------------------
// 5. Native semantics are undisturbed by the foreign machinery
// ---------------------------------------------------------------------------

#[test]
fn native_constructor_membership_still_works() {
    let mut scenario = Scenario::new();
    let ctor = scenario.heap.alloc_function();
    let proto = scenario.heap.function(ctor).unwrap().prototype.unwrap();
    let instance = scenario.heap.alloc_object_with_prototype(Some(proto));
    let ctor = Value::Function(ctor);
    assert!(scenario.resolve(&Value::Object(instance), &ctor).unwrap());
    assert!(!scenario.resolve(&scenario.builder, &ctor).unwrap());
}

#[test]
fn custom_hook_takes_precedence_over_everything() {
    let mut scenario = Scenario::new();
    let hooked = scenario
        .heap
        .alloc_function_with_hook(MembershipHook::new(|v| v.is_foreign()));
    let hooked = Value::Function(hooked);
    assert!(scenario.resolve(&scenario.builder, &hooked).unwrap());
    assert!(!scenario.resolve(&Value::Null, &hooked).unwrap());
    assert!(scenario.has_instance(&hooked, &scenario.builder));
}

// ---------------------------------------------------------------------------
// 6. Purity across repeated evaluation
// ---------------------------------------------------------------------------

#[test]
fn verdicts_are_stable_across_repeated_calls() {
    let scenario = Scenario::new();
    let builder_type = scenario.host_type(BUILDER_CLASS);
    let task = scenario.host_type(TASK_INTERFACE);
    for _ in 0..5 {
        assert!(scenario.resolve(&scenario.builder, &builder_type).unwrap());
        assert!(!scenario.resolve(&scenario.builder, &task).unwrap());
        assert!(!scenario.has_instance(&task, &scenario.builder));
    }
}
