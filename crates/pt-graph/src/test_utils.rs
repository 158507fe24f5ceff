//! Small registry of generic component types for unit tests.

use pt_core::Category;
use pt_registry::{ComponentTypeDescriptor, OptionShape, OptionSpec, TypeRegistry};

pub(crate) fn test_registry() -> TypeRegistry {
    let mut registry = TypeRegistry::new();
    let descriptors = [
        ComponentTypeDescriptor::new("test_source", Category::Source)
            .optional_input("demand", "kW", 0.0)
            .output("output_voltage", "V")
            .output("fuel_consumed_t", "kg")
            .watch("output_voltage")
            .consumes("fuel_consumed_t"),
        ComponentTypeDescriptor::new("test_bus", Category::Bus)
            .input("input_voltage_1", "V")
            .optional_input("input_voltage_2", "V", 0.0)
            .optional_input("control_voltage", "V", 0.0)
            .output("output_voltage", "V"),
        ComponentTypeDescriptor::new("test_converter", Category::Converter)
            .input("input_voltage", "V")
            .output("output_voltage", "V")
            .output("voltage_setpoint", "V")
            .option(OptionSpec::with_default("efficiency", OptionShape::Scalar, 0.95))
            .option(OptionSpec::with_default("power_split", OptionShape::ScalarOrPerPoint, 0.5))
            .option(OptionSpec::choice("mode", &["buck", "boost"], "buck")),
        ComponentTypeDescriptor::new("test_load", Category::Load)
            .input("input_voltage", "V")
            .output("power", "kW")
            .watch("power"),
        ComponentTypeDescriptor::new("test_gearbox", Category::MechanicalLink)
            .optional_input("shaft_in", "kW", 0.0)
            .output("shaft_out", "kW")
            .option(OptionSpec::required("ratio", OptionShape::Scalar))
            .option(OptionSpec::required("number_of_points", OptionShape::Scalar)),
    ];
    for descriptor in descriptors {
        let tag = descriptor.type_tag.clone();
        registry
            .register(tag, descriptor)
            .expect("test descriptors are consistent");
    }
    registry
}
