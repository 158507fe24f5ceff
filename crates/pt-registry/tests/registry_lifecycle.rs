//! Registry lifecycle: built once, extended, then shared read-only.

use std::sync::Arc;
use std::thread;

use pt_core::Category;
use pt_registry::{ComponentTypeDescriptor, OptionShape, OptionSpec, TypeKind, TypeRegistry};

#[test]
fn custom_types_extend_the_builtin_catalogue() {
    let mut registry = TypeRegistry::builtin();
    let descriptor = ComponentTypeDescriptor::new("supercapacitor", Category::Storage)
        .input("dc_current_out", "A")
        .output("dc_voltage_out", "V")
        .output("energy_consumed_t", "kW*h")
        .watch("dc_voltage_out")
        .consumes("energy_consumed_t")
        .option(OptionSpec::required("number_of_points", OptionShape::Scalar));

    assert!(registry.register("supercapacitor", descriptor).unwrap().is_none());
    let entry = registry.resolve("supercapacitor").unwrap();
    assert_eq!(entry.kind, TypeKind::Custom);

    let tags: Vec<&str> = registry.iter().map(|(tag, _)| tag).collect();
    let mut sorted = tags.clone();
    sorted.sort_unstable();
    assert_eq!(tags, sorted, "entries are listed in tag order");
}

#[test]
fn frozen_registry_is_read_concurrently() {
    let registry = Arc::new(TypeRegistry::builtin());

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let registry = Arc::clone(&registry);
            thread::spawn(move || registry.resolve("pmsm").map(|e| e.descriptor.outputs.len()))
        })
        .collect();

    for handle in handles {
        assert_eq!(handle.join().unwrap().unwrap(), 3);
    }
}
