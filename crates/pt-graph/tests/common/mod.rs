#![allow(dead_code)]

use pt_core::Category;
use pt_graph::{
    Assembly, Diagnostics, EquilibriumPolicy, GraphBuilder, ValidatedGraph, ValidationOptions,
    VariableNamer, validate,
};
use pt_registry::{ComponentTypeDescriptor, TypeRegistry};

/// Built-in catalogue plus generic category-named types.
pub fn registry() -> TypeRegistry {
    let mut registry = TypeRegistry::builtin();
    let custom = [
        ComponentTypeDescriptor::new("source", Category::Source)
            .output("output_voltage", "V")
            .output("energy_consumed_t", "kW*h")
            .watch("output_voltage")
            .consumes("energy_consumed_t"),
        ComponentTypeDescriptor::new("bus", Category::Bus)
            .input("input_voltage_1", "V")
            .optional_input("input_voltage_2", "V", 0.0)
            .optional_input("voltage_setting", "V", 0.0)
            .output("output_voltage", "V"),
        ComponentTypeDescriptor::new("converter", Category::Converter)
            .input("input_voltage", "V")
            .output("output_voltage", "V")
            .output("voltage_setting", "V"),
        ComponentTypeDescriptor::new("load", Category::Load)
            .input("input_voltage", "V")
            .output("output_voltage", "V")
            .output("power", "kW")
            .watch("power"),
        // Four optional inputs, one output; used for random graphs.
        ComponentTypeDescriptor::new("node", Category::Bus)
            .optional_input("in_0", "-", 0.0)
            .optional_input("in_1", "-", 0.0)
            .optional_input("in_2", "-", 0.0)
            .optional_input("in_3", "-", 0.0)
            .output("out", "-"),
        ComponentTypeDescriptor::new("sink", Category::Load)
            .input("required", "-")
            .optional_input("extra", "-", 0.0),
    ];
    for descriptor in custom {
        let tag = descriptor.type_tag.clone();
        registry.register(tag, descriptor).unwrap();
    }
    registry
}

pub fn check(builder: GraphBuilder) -> Result<ValidatedGraph, Diagnostics> {
    validate(&builder.build(), &registry(), &ValidationOptions::default())
}

pub fn assemble(builder: GraphBuilder, policy: &EquilibriumPolicy) -> Assembly {
    let graph = check(builder).unwrap();
    Assembly::assemble(graph, policy, &VariableNamer::default()).unwrap()
}
