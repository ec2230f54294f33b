#![no_main]

use membrane_engine::conformance::{BUILDER_CLASS, ROOT_CLASS, TASK_INTERFACE, scenario_universe};
use membrane_engine::native_heap::MembershipHook;
use membrane_engine::resolver::MembershipError;
use membrane_engine::{MembershipResolver, NativeHeap, Value};
use libfuzzer_sys::fuzz_target;

const MAX_OPERAND_POOL: usize = 32;

fuzz_target!(|data: &[u8]| {
    if data.len() < 4 {
        return;
    }

    let mut heap = NativeHeap::new();
    let universe = scenario_universe();
    let resolver = MembershipResolver::new();

    // Byte-driven operand pool drawn from every tag the engine knows.
    let mut pool: Vec<Value> = vec![
        Value::Undefined,
        Value::Null,
        Value::Bool(byte(data, 0) & 1 == 0),
        Value::Number(f64::from(byte(data, 1))),
        Value::BigInt(i64::from(byte(data, 2))),
        Value::Str(String::from_utf8_lossy(&data[..data.len().min(8)]).into_owned()),
        Value::Symbol(heap.alloc_symbol()),
    ];
    for chunk in data.chunks(3).take(MAX_OPERAND_POOL) {
        match chunk[0] % 8 {
            0 => pool.push(Value::Object(heap.alloc_object())),
            1 => {
                let proto = heap.alloc_object();
                pool.push(Value::Object(heap.alloc_object_with_prototype(Some(proto))));
            }
            2 => pool.push(Value::Function(heap.alloc_function())),
            3 => {
                let wanted = chunk.get(1).copied().unwrap_or(0) & 1 == 0;
                pool.push(Value::Function(heap.alloc_function_with_hook(
                    MembershipHook::new(move |_| wanted),
                )));
            }
            4 => {
                let class = universe.type_by_name(BUILDER_CLASS).unwrap();
                pool.push(universe.new_instance(class));
            }
            5 => {
                let name = if chunk.get(1).copied().unwrap_or(0) & 1 == 0 {
                    ROOT_CLASS
                } else {
                    TASK_INTERFACE
                };
                let ty = universe.type_by_name(name).unwrap();
                pool.push(universe.type_value(ty));
            }
            6 => pool.push(universe.new_factory()),
            _ => {
                let root = universe.type_by_name(ROOT_CLASS).unwrap();
                pool.push(universe.new_instance(root));
            }
        }
    }

    for pair in data.chunks(2) {
        let left = &pool[usize::from(pair[0]) % pool.len()];
        let right = &pool[usize::from(pair.get(1).copied().unwrap_or(0)) % pool.len()];

        // Operator path: never panics, only ever the single TypeError kind,
        // and pure across repeated evaluation.
        let first = resolver.resolve(&heap, left, right);
        let second = resolver.resolve(&heap, left, right);
        assert_eq!(first, second);
        if let Err(MembershipError::TypeError(message)) = &first {
            assert!(!message.is_empty());
        }

        // Hook path: total, never errors, pure.
        let hook_first = resolver.has_instance(&heap, right, left);
        let hook_second = resolver.has_instance(&heap, right, left);
        assert_eq!(hook_first, hook_second);

        // Foreign candidate types never hold on the hook path.
        if right.is_foreign() {
            assert!(!hook_first);
        }
    }
});

fn byte(data: &[u8], index: usize) -> u8 {
    data.get(index).copied().unwrap_or(0)
}
