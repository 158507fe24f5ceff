//! Built-in catalogue of hybrid-electric power-train component types.
//!
//! Each supported type is a variant of [`ComponentKind`]; the engine that
//! instantiates the numeric components matches on the variant instead of
//! looking implementations up by name at run time.

use pt_core::{Category, OptionValue};
use serde::{Deserialize, Serialize};

use crate::descriptor::{ComponentTypeDescriptor, OptionShape, OptionSpec};

const FUEL_TYPES: [&str; 4] = ["jet_fuel", "jet_a1", "avgas", "diesel"];

/// Closed set of built-in component types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComponentKind {
    BatteryPack,
    FuelCellStack,
    Turboshaft,
    InternalCombustionEngine,
    Generator,
    FuelTank,
    FuelSystem,
    DcBus,
    DcSplitter,
    DcDcConverter,
    DcSspc,
    Inverter,
    Rectifier,
    Pmsm,
    Gearbox,
    Propeller,
    AuxiliaryLoad,
}

impl ComponentKind {
    pub const ALL: [ComponentKind; 17] = [
        ComponentKind::BatteryPack,
        ComponentKind::FuelCellStack,
        ComponentKind::Turboshaft,
        ComponentKind::InternalCombustionEngine,
        ComponentKind::Generator,
        ComponentKind::FuelTank,
        ComponentKind::FuelSystem,
        ComponentKind::DcBus,
        ComponentKind::DcSplitter,
        ComponentKind::DcDcConverter,
        ComponentKind::DcSspc,
        ComponentKind::Inverter,
        ComponentKind::Rectifier,
        ComponentKind::Pmsm,
        ComponentKind::Gearbox,
        ComponentKind::Propeller,
        ComponentKind::AuxiliaryLoad,
    ];

    pub fn type_tag(self) -> &'static str {
        match self {
            ComponentKind::BatteryPack => "battery_pack",
            ComponentKind::FuelCellStack => "fuel_cell_stack",
            ComponentKind::Turboshaft => "turboshaft",
            ComponentKind::InternalCombustionEngine => "internal_combustion_engine",
            ComponentKind::Generator => "generator",
            ComponentKind::FuelTank => "fuel_tank",
            ComponentKind::FuelSystem => "fuel_system",
            ComponentKind::DcBus => "dc_bus",
            ComponentKind::DcSplitter => "dc_splitter",
            ComponentKind::DcDcConverter => "dc_dc_converter",
            ComponentKind::DcSspc => "dc_sspc",
            ComponentKind::Inverter => "inverter",
            ComponentKind::Rectifier => "rectifier",
            ComponentKind::Pmsm => "pmsm",
            ComponentKind::Gearbox => "gearbox",
            ComponentKind::Propeller => "propeller",
            ComponentKind::AuxiliaryLoad => "auxiliary_load",
        }
    }

    pub fn from_type_tag(tag: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.type_tag() == tag)
    }

    /// Port and constructor contract of this kind.
    pub fn descriptor(self) -> ComponentTypeDescriptor {
        let tag = self.type_tag();
        match self {
            ComponentKind::BatteryPack => ComponentTypeDescriptor::new(tag, Category::Storage)
                .input("dc_current_out", "A")
                .output("dc_voltage_out", "V")
                .output("state_of_charge", "%")
                .output("energy_consumed_t", "kW*h")
                .watch("state_of_charge")
                .watch("dc_voltage_out")
                .consumes("energy_consumed_t")
                .option(number_of_points())
                .option(OptionSpec::with_default("cell_capacity_ah", OptionShape::Scalar, 3.0))
                .option(OptionSpec::with_default("number_of_modules", OptionShape::Scalar, 1_i64))
                .option(OptionSpec::with_default("soc_min", OptionShape::Scalar, 20.0)),
            ComponentKind::FuelCellStack => ComponentTypeDescriptor::new(tag, Category::Source)
                .input("dc_current_out", "A")
                .output("dc_voltage_out", "V")
                .output("hydrogen_consumed_t", "kg")
                .watch("dc_voltage_out")
                .consumes("hydrogen_consumed_t")
                .option(number_of_points())
                .option(OptionSpec::with_default("number_of_cells", OptionShape::Scalar, 400_i64)),
            ComponentKind::Turboshaft => thermal_engine(tag, "jet_fuel")
                .option(OptionSpec::with_default("power_rating_kw", OptionShape::Scalar, 500.0)),
            ComponentKind::InternalCombustionEngine => thermal_engine(tag, "avgas")
                .option(OptionSpec::with_default(
                    "displacement_volume_l",
                    OptionShape::Scalar,
                    2.0,
                )),
            ComponentKind::Generator => ComponentTypeDescriptor::new(tag, Category::Converter)
                .input("ac_current_rms_out", "A")
                .optional_input("rpm", "min**-1", 6000.0)
                .output("ac_voltage_rms_out", "V")
                .output("shaft_power_in", "kW")
                .output("efficiency", "-")
                .watch("efficiency")
                .option(number_of_points()),
            ComponentKind::FuelTank => ComponentTypeDescriptor::new(tag, Category::Storage)
                .input("fuel_consumed_t", "kg")
                .output("fuel_remaining_t", "kg")
                .watch("fuel_remaining_t")
                .option(OptionSpec::with_default("capacity_kg", OptionShape::Scalar, 200.0)),
            ComponentKind::FuelSystem => ComponentTypeDescriptor::new(tag, Category::Bus)
                .input("fuel_consumed_out_t_1", "kg")
                .optional_input("fuel_consumed_out_t_2", "kg", 0.0)
                .output("fuel_consumed_in_t", "kg"),
            ComponentKind::DcBus => ComponentTypeDescriptor::new(tag, Category::Bus)
                .input("dc_voltage_in_1", "V")
                .optional_input("dc_voltage_in_2", "V", 0.0)
                .input("dc_current_out_1", "A")
                .optional_input("dc_current_out_2", "A", 0.0)
                .output("dc_voltage_out", "V")
                .output("dc_current_in_1", "A")
                .output("dc_current_in_2", "A")
                .watch("dc_voltage_out")
                .option(number_of_points()),
            ComponentKind::DcSplitter => ComponentTypeDescriptor::new(tag, Category::Bus)
                .input("dc_voltage_in_1", "V")
                .input("dc_voltage_in_2", "V")
                .input("dc_current_out", "A")
                .output("dc_voltage_out", "V")
                .output("dc_current_in_1", "A")
                .output("dc_current_in_2", "A")
                .option(number_of_points())
                .option(OptionSpec::with_default(
                    "power_split",
                    OptionShape::ScalarOrPerPoint,
                    50.0,
                )),
            ComponentKind::DcDcConverter => electrical_converter(
                tag,
                "dc_voltage_in",
                "dc_current_in",
                "dc_voltage_out",
                "dc_current_out",
            )
                .optional_input("voltage_out_target", "V", 800.0)
                .option(OptionSpec::with_default(
                    "voltage_out_target_mission",
                    OptionShape::ScalarOrPerPoint,
                    800.0,
                )),
            ComponentKind::DcSspc => ComponentTypeDescriptor::new(tag, Category::Converter)
                .input("dc_voltage_in", "V")
                .input("dc_current_out", "A")
                .output("dc_voltage_out", "V")
                .output("dc_current_in", "A")
                .option(OptionSpec::with_default("efficiency", OptionShape::Scalar, 0.99))
                .option(OptionSpec::with_default("at_bus_output", OptionShape::Scalar, true)),
            ComponentKind::Inverter => electrical_converter(
                tag,
                "dc_voltage_in",
                "dc_current_in",
                "ac_voltage_rms_out",
                "ac_current_rms_out",
            )
                .option(OptionSpec::with_default(
                    "switching_frequency",
                    OptionShape::ScalarOrPerPoint,
                    15_000.0,
                )),
            ComponentKind::Rectifier => electrical_converter(
                tag,
                "ac_voltage_rms_in",
                "ac_current_rms_in",
                "dc_voltage_out",
                "dc_current_out",
            ),
            ComponentKind::Pmsm => ComponentTypeDescriptor::new(tag, Category::Converter)
                .input("shaft_power_out", "kW")
                .input("rpm", "min**-1")
                .input("ac_voltage_rms_in", "V")
                .output("ac_current_rms_in", "A")
                .output("torque_out", "N*m")
                .output("efficiency", "-")
                .watch("torque_out")
                .watch("efficiency")
                .option(number_of_points())
                .option(OptionSpec::with_default("pole_pairs", OptionShape::Scalar, 4_i64)),
            ComponentKind::Gearbox => ComponentTypeDescriptor::new(tag, Category::MechanicalLink)
                .input("shaft_power_out", "kW")
                .input("rpm_out", "min**-1")
                .output("shaft_power_in", "kW")
                .output("rpm_in", "min**-1")
                .option(OptionSpec::with_default("gear_ratio", OptionShape::Scalar, 2.0))
                .option(OptionSpec::with_default("efficiency", OptionShape::Scalar, 0.98)),
            ComponentKind::Propeller => ComponentTypeDescriptor::new(tag, Category::Propulsor)
                .input("thrust", "N")
                .optional_input("true_airspeed", "m/s", 0.0)
                .optional_input("altitude", "m", 0.0)
                .output("shaft_power_in", "kW")
                .output("rpm", "min**-1")
                .output("efficiency", "-")
                .watch("shaft_power_in")
                .watch("efficiency")
                .option(number_of_points())
                .option(OptionSpec::with_default("diameter_m", OptionShape::Scalar, 1.8))
                .option(OptionSpec::with_default(
                    "efficiency_coefficients",
                    OptionShape::Fixed(3),
                    OptionValue::Array(vec![0.85, -0.1, 0.02]),
                )),
            ComponentKind::AuxiliaryLoad => ComponentTypeDescriptor::new(tag, Category::Load)
                .input("dc_voltage_in", "V")
                .optional_input("power_demand", "kW", 5.0)
                .output("dc_current_in", "A")
                .watch("dc_current_in"),
        }
    }
}

fn number_of_points() -> OptionSpec {
    OptionSpec::required("number_of_points", OptionShape::Scalar)
}

fn thermal_engine(tag: &str, default_fuel: &str) -> ComponentTypeDescriptor {
    ComponentTypeDescriptor::new(tag, Category::Source)
        .input("shaft_power_out", "kW")
        .optional_input("rpm", "min**-1", 6000.0)
        .output("fuel_consumed_t", "kg")
        .output("fuel_flow", "kg/h")
        .watch("fuel_flow")
        .consumes("fuel_consumed_t")
        .option(number_of_points())
        .option(OptionSpec::choice("fuel_type", &FUEL_TYPES, default_fuel))
}

/// Two-sided power converter: voltage flows downstream, current upstream.
fn electrical_converter(
    tag: &str,
    voltage_in: &str,
    current_in: &str,
    voltage_out: &str,
    current_out: &str,
) -> ComponentTypeDescriptor {
    ComponentTypeDescriptor::new(tag, Category::Converter)
        .input(voltage_in, "V")
        .input(current_out, "A")
        .output(voltage_out, "V")
        .output(current_in, "A")
        .output("efficiency", "-")
        .watch("efficiency")
        .option(number_of_points())
}
